use super::models::{LoginRequest, SignupRequest};
use super::password::MAX_PASSWORD_BYTES;
use crate::common::validation::require_non_empty;
use crate::common::{is_valid_email, ValidationResult, Validator};

impl Validator<SignupRequest> for SignupRequest {
    fn validate(&self, data: &SignupRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        require_non_empty(&mut result, "firstname", &data.firstname, "firstname cannot be empty");
        require_non_empty(&mut result, "lastname", &data.lastname, "lastname cannot be empty");
        require_non_empty(&mut result, "username", &data.username, "username cannot be empty");
        require_non_empty(&mut result, "email", &data.email, "email cannot be empty");
        require_non_empty(&mut result, "password", &data.password, "password cannot be empty");

        if !data.email.trim().is_empty() && !is_valid_email(&data.email) {
            result.add_error("email", "email is not a valid address");
        }

        if data.username.contains('@') {
            result.add_error("username", "username cannot contain @");
        }

        if data.password.len() > MAX_PASSWORD_BYTES {
            result.add_error("password", "password must be at most 72 bytes");
        }

        result
    }
}

impl Validator<LoginRequest> for LoginRequest {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        require_non_empty(&mut result, "email", &data.email, "email cannot be empty");
        require_non_empty(&mut result, "password", &data.password, "password cannot be empty");
        result
    }
}
