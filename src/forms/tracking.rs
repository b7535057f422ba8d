//! Goal, progress and meal plan forms

use super::{non_blank, FormInput, ValidationErrors};
use crate::models::{GoalStatus, MealType, NewGoal, NewMealPlanEntry, NewProgress};

#[derive(Debug, Clone, Default)]
pub struct GoalForm {
    pub client_id: String,
    pub title: String,
    pub target: String,
    /// Optional, "YYYY-MM-DD"
    pub deadline: String,
}

impl FormInput for GoalForm {
    type Output = NewGoal;

    fn validate(&self) -> Result<NewGoal, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let client_id = errors.required("client", &self.client_id);
        let title = errors.required("title", &self.title);
        let deadline = errors.date("deadline", &self.deadline, false);

        errors.finish(|| NewGoal {
            client_id,
            title,
            target: non_blank(&self.target),
            deadline,
            status: GoalStatus::InProgress,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressForm {
    pub client_id: String,
    /// "YYYY-MM-DD"
    pub date: String,
    /// Kilograms
    pub weight: String,
    /// Percent
    pub body_fat: String,
    pub notes: String,
}

impl FormInput for ProgressForm {
    type Output = NewProgress;

    fn validate(&self) -> Result<NewProgress, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let client_id = errors.required("client", &self.client_id);
        let date = errors.date("date", &self.date, true);
        let weight = errors.parse_required::<f64>("weight", &self.weight, "a number");
        if let Some(w) = weight {
            if !(w > 0.0 && w.is_finite()) {
                errors.push("weight", "must be greater than zero");
            }
        }
        let body_fat = errors.parse_optional::<f64>("body fat", &self.body_fat, "a number");
        if let Some(bf) = body_fat {
            if !(0.0..=100.0).contains(&bf) {
                errors.push("body fat", "must be a percentage");
            }
        }

        match (date, weight) {
            (Some(date), Some(weight)) => errors.finish(|| NewProgress {
                client_id,
                date,
                weight,
                body_fat,
                notes: non_blank(&self.notes),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MealPlanForm {
    pub client_id: String,
    pub day: String,
    /// breakfast / lunch / dinner / snack
    pub meal: String,
    pub description: String,
    pub calories: String,
}

impl FormInput for MealPlanForm {
    type Output = NewMealPlanEntry;

    fn validate(&self) -> Result<NewMealPlanEntry, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let client_id = errors.required("client", &self.client_id);
        let day = errors.required("day", &self.day);
        let meal = errors.parse_required::<MealType>(
            "meal",
            &self.meal,
            "breakfast, lunch, dinner or snack",
        );
        let description = errors.required("description", &self.description);
        let calories = errors.parse_optional::<u32>("calories", &self.calories, "a whole number");

        match meal {
            Some(meal) => errors.finish(|| NewMealPlanEntry {
                client_id,
                day,
                meal,
                description,
                calories,
            }),
            None => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_form() {
        let form = GoalForm {
            client_id: "c1".into(),
            title: "Run 5k".into(),
            target: "".into(),
            deadline: "2026-12-31".into(),
        };
        let goal = form.validate().unwrap();
        assert_eq!(goal.status, GoalStatus::InProgress);
        assert_eq!(goal.deadline.unwrap().to_string(), "2026-12-31");
        assert_eq!(goal.target, None);

        let errors = GoalForm {
            client_id: "c1".into(),
            deadline: "31/12/2026".into(),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(errors.has("title"));
        assert!(errors.has("deadline"));
    }

    #[test]
    fn test_progress_form() {
        let mut form = ProgressForm {
            client_id: "c1".into(),
            date: "2026-02-10".into(),
            weight: "72.4".into(),
            body_fat: "".into(),
            notes: "after holidays".into(),
        };
        let entry = form.validate().unwrap();
        assert_eq!(entry.weight, 72.4);
        assert_eq!(entry.notes.as_deref(), Some("after holidays"));

        form.weight = "-3".into();
        form.body_fat = "140".into();
        let errors = form.validate().unwrap_err();
        assert!(errors.has("weight"));
        assert!(errors.has("body fat"));

        form.weight = "".into();
        assert!(form.validate().unwrap_err().has("weight"));
    }

    #[test]
    fn test_meal_plan_form() {
        let form = MealPlanForm {
            client_id: "c1".into(),
            day: "Monday".into(),
            meal: "Lunch".into(),
            description: "Grilled salmon, quinoa".into(),
            calories: "540".into(),
        };
        let entry = form.validate().unwrap();
        assert_eq!(entry.meal, MealType::Lunch);
        assert_eq!(entry.calories, Some(540));

        let errors = MealPlanForm {
            meal: "brunch".into(),
            ..form
        }
        .validate()
        .unwrap_err();
        assert!(errors.has("meal"));
    }
}
