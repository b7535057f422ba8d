use super::{non_blank, FormInput, ValidationErrors};
use crate::models::{AccountStatus, NewClient, NewNutritionist};

/// Add/edit nutritionist form
#[derive(Debug, Clone, Default)]
pub struct NutritionistForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub specialization: String,
    /// "active" / "inactive"; blank means active
    pub status: String,
    /// Only sent when creating an account
    pub password: String,
}

impl FormInput for NutritionistForm {
    type Output = NewNutritionist;

    fn validate(&self) -> Result<NewNutritionist, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = errors.required("name", &self.name);
        let email = errors.email("email", &self.email);
        let phone = errors.required("phone", &self.phone);
        let address = self.address.trim().to_string();
        let specialization = errors.required("specialization", &self.specialization);
        let status = errors
            .parse_optional::<AccountStatus>("status", &self.status, "active or inactive")
            .unwrap_or_default();

        errors.finish(|| NewNutritionist {
            name,
            email,
            phone,
            address,
            specialization,
            status,
            password: (!self.password.is_empty()).then(|| self.password.clone()),
        })
    }
}

impl From<&crate::models::Nutritionist> for NutritionistForm {
    /// Prefill an edit form from the cached record
    fn from(n: &crate::models::Nutritionist) -> Self {
        Self {
            name: n.name.clone(),
            email: n.email.clone(),
            phone: n.phone.clone(),
            address: n.address.clone(),
            specialization: n.specialization.clone(),
            status: n.status.to_string(),
            password: String::new(),
        }
    }
}

/// Add/edit client form
#[derive(Debug, Clone, Default)]
pub struct ClientForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub age: String,
    pub gender: String,
    pub nutritionist_id: String,
    pub plan: String,
    pub status: String,
    pub password: String,
}

impl FormInput for ClientForm {
    type Output = NewClient;

    fn validate(&self) -> Result<NewClient, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = errors.required("name", &self.name);
        let email = errors.email("email", &self.email);
        let phone = errors.required("phone", &self.phone);
        let address = self.address.trim().to_string();
        let age = errors.parse_optional::<u32>("age", &self.age, "a whole number");
        if let Some(age) = age {
            if !(1..=120).contains(&age) {
                errors.push("age", "must be between 1 and 120");
            }
        }
        let status = errors
            .parse_optional::<AccountStatus>("status", &self.status, "active or inactive")
            .unwrap_or_default();

        errors.finish(|| NewClient {
            name,
            email,
            phone,
            address,
            age,
            gender: non_blank(&self.gender),
            nutritionist_id: non_blank(&self.nutritionist_id),
            plan: non_blank(&self.plan),
            status,
            password: (!self.password.is_empty()).then(|| self.password.clone()),
        })
    }
}

impl From<&crate::models::Client> for ClientForm {
    fn from(c: &crate::models::Client) -> Self {
        Self {
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            address: c.address.clone(),
            age: c.age.map(|a| a.to_string()).unwrap_or_default(),
            gender: c.gender.clone().unwrap_or_default(),
            nutritionist_id: c.nutritionist_id.clone().unwrap_or_default(),
            plan: c.plan.clone().unwrap_or_default(),
            status: c.status.to_string(),
            password: String::new(),
        }
    }
}
