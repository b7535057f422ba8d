use super::{FormInput, ValidationErrors};

/// Longest message the compose box accepts
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Compose box; sender and receiver come from the dashboard context
#[derive(Debug, Clone, Default)]
pub struct MessageForm {
    pub content: String,
}

impl MessageForm {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl FormInput for MessageForm {
    type Output = String;

    fn validate(&self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let content = errors.required("message", &self.content);
        if content.chars().count() > MAX_MESSAGE_LEN {
            errors.push("message", format!("must be at most {} characters", MAX_MESSAGE_LEN));
        }
        errors.finish(|| content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_content() {
        assert_eq!(MessageForm::new("  hi  ").validate().unwrap(), "hi");
        assert!(MessageForm::new(" \n").validate().is_err());
        assert!(MessageForm::new("x".repeat(MAX_MESSAGE_LEN + 1)).validate().is_err());
    }
}
