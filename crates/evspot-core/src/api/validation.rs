//! Local input checks run before any request is sent.

use super::ApiError;
use crate::models::StationId;

/// Minimum accepted password length for registration
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const MSG_FILL_ALL_FIELDS: &str = "Please fill in all fields";
pub const MSG_PASSWORDS_DIFFER: &str = "Passwords do not match";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters long";

/// Registration form contents
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

pub fn validate_login(username: &str, password: &str) -> Result<(), ApiError> {
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(MSG_FILL_ALL_FIELDS.to_string()));
    }
    Ok(())
}

pub fn validate_registration(form: &RegistrationForm) -> Result<(), ApiError> {
    if form.username.is_empty()
        || form.email.is_empty()
        || form.password.is_empty()
        || form.password_confirm.is_empty()
    {
        return Err(ApiError::Validation(MSG_FILL_ALL_FIELDS.to_string()));
    }
    if form.password != form.password_confirm {
        return Err(ApiError::Validation(MSG_PASSWORDS_DIFFER.to_string()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(MSG_PASSWORD_TOO_SHORT.to_string()));
    }
    Ok(())
}

pub fn validate_search(latitude: f64, longitude: f64, radius_km: u32) -> Result<(), ApiError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(ApiError::Validation("Latitude must be between -90 and 90".to_string()));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(ApiError::Validation("Longitude must be between -180 and 180".to_string()));
    }
    if radius_km == 0 {
        return Err(ApiError::Validation("Search radius must be positive".to_string()));
    }
    Ok(())
}

pub fn validate_station(station: &StationId) -> Result<(), ApiError> {
    if station.is_empty() {
        return Err(ApiError::Validation("No station selected".to_string()));
    }
    Ok(())
}
