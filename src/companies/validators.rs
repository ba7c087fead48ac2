use super::models::{AddMemberRequest, CreateCompanyRequest};
use super::services::MemberIdentifier;
use crate::common::validation::require_non_empty;
use crate::common::{is_valid_email, ApiError, ValidationResult, Validator};

impl Validator<CreateCompanyRequest> for CreateCompanyRequest {
    fn validate(&self, data: &CreateCompanyRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        require_non_empty(&mut result, "name", &data.name, "Company name is required");

        if data.name.len() > 255 {
            result.add_error("name", "Company name must not exceed 255 characters");
        }

        result
    }
}

impl Validator<AddMemberRequest> for AddMemberRequest {
    fn validate(&self, data: &AddMemberRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let email = data.email.as_deref().map(str::trim).unwrap_or("");
        let username = data.username.as_deref().map(str::trim).unwrap_or("");

        match (email.is_empty(), username.is_empty()) {
            (true, true) => result.add_error("email", "email or username is required"),
            (false, false) => result.add_error("email", "give either email or username, not both"),
            (false, true) if !is_valid_email(email) => {
                result.add_error("email", "email is not a valid address")
            }
            _ => {}
        }

        result
    }
}

impl AddMemberRequest {
    /// Validates the request and returns who to add.
    pub fn identifier(&self) -> Result<MemberIdentifier, ApiError> {
        self.validate(self).into_result()?;

        match (&self.email, &self.username) {
            (Some(email), _) if !email.trim().is_empty() => {
                Ok(MemberIdentifier::Email(email.trim().to_string()))
            }
            (_, Some(username)) => Ok(MemberIdentifier::Username(username.trim().to_string())),
            _ => Err(ApiError::BadRequest("email or username is required".to_string())),
        }
    }
}
