use super::models::FeedbackRequest;
use crate::common::validation::require_non_empty;
use crate::common::{ValidationResult, Validator};

impl Validator<FeedbackRequest> for FeedbackRequest {
    fn validate(&self, data: &FeedbackRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        require_non_empty(&mut result, "title", &data.title, "title cannot be empty");
        require_non_empty(
            &mut result,
            "description",
            &data.description,
            "description cannot be empty",
        );

        if data.title.len() > 255 {
            result.add_error("title", "title must not exceed 255 characters");
        }

        result
    }
}
