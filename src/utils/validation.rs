use std::sync::LazyLock;

use regex::Regex;

use crate::blog::blog_model::{CreateBlogRequest, UpdateBlogRequest};
use crate::user::model::{LoginRequest, SignupRequest};
use crate::utils::error::CustomError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub fn validate_signup(request: &SignupRequest) -> Result<(), CustomError> {
    if !EMAIL_PATTERN.is_match(request.email.trim()) {
        return Err(CustomError::ValidationError(
            "Please enter a valid email address.".into(),
        ));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CustomError::ValidationError(format!(
            "Password must be at least {} characters long.",
            MIN_PASSWORD_LENGTH
        )));
    }
    if request.first_name.trim().is_empty() {
        return Err(CustomError::ValidationError("First name is required.".into()));
    }
    if request.last_name.trim().is_empty() {
        return Err(CustomError::ValidationError("Last name is required.".into()));
    }

    Ok(())
}

pub fn validate_login(request: &LoginRequest) -> Result<(), CustomError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(CustomError::BadRequestError(
            "Please provide email and password.".into(),
        ));
    }

    Ok(())
}

pub fn validate_new_blog(request: &CreateBlogRequest) -> Result<(), CustomError> {
    if request.title.trim().is_empty() {
        return Err(CustomError::ValidationError("Title is required.".into()));
    }
    if request.body.trim().is_empty() {
        return Err(CustomError::ValidationError("Body is required.".into()));
    }

    Ok(())
}

/// Fields may be omitted from an update, but a title or body that is sent must not be blank.
pub fn validate_blog_update(request: &UpdateBlogRequest) -> Result<(), CustomError> {
    if request.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(CustomError::ValidationError("Title cannot be empty.".into()));
    }
    if request.body.as_deref().is_some_and(|b| b.trim().is_empty()) {
        return Err(CustomError::ValidationError("Body cannot be empty.".into()));
    }

    Ok(())
}
