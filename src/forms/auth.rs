use super::{FormInput, ValidationErrors};
use crate::models::{LoginRequest, MailRequest};

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl FormInput for LoginForm {
    type Output = LoginRequest;

    fn validate(&self) -> Result<LoginRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let email = errors.email("email", &self.email);
        if self.password.is_empty() {
            errors.push("password", "is required");
        }
        errors.finish(|| LoginRequest {
            email,
            password: self.password.clone(),
        })
    }
}

/// Contact form
#[derive(Debug, Clone, Default)]
pub struct MailForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl FormInput for MailForm {
    type Output = MailRequest;

    fn validate(&self) -> Result<MailRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = errors.required("name", &self.name);
        let email = errors.email("email", &self.email);
        let subject = errors.required("subject", &self.subject);
        let message = errors.required("message", &self.message);
        errors.finish(|| MailRequest {
            name,
            email,
            subject,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_keeps_password_verbatim() {
        let form = LoginForm {
            email: " ana@nutri.io ".into(),
            password: " spaced ".into(),
        };
        let req = form.validate().unwrap();
        assert_eq!(req.email, "ana@nutri.io");
        assert_eq!(req.password, " spaced ");
    }

    #[test]
    fn test_login_requires_both() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert!(errors.has("email"));
        assert!(errors.has("password"));
    }

    #[test]
    fn test_mail_form() {
        let form = MailForm {
            name: "Bo".into(),
            email: "bo@x.io".into(),
            subject: "Pricing".into(),
            message: "  ".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.to_string(), "message is required");
    }
}
