//! Client-side form checks, run before any request is sent

use crate::core::error::{PortalError, Result};
use std::ops::RangeInclusive;

pub const MIN_PASSWORD_LEN: usize = 6;

pub const ENROLLMENT_YEARS: RangeInclusive<i32> = 2000..=2030;

pub fn required(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PortalError::ValidationError(format!("{} is required", label)));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<()> {
    required("Email", value)?;
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(()),
        _ => Err(PortalError::ValidationError(format!("{} is not a valid email address", value))),
    }
}

pub fn password(value: &str) -> Result<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(PortalError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn enrollment_year(year: i32) -> Result<()> {
    if !ENROLLMENT_YEARS.contains(&year) {
        return Err(PortalError::ValidationError(format!(
            "Enrollment year must be between {} and {}",
            ENROLLMENT_YEARS.start(),
            ENROLLMENT_YEARS.end()
        )));
    }
    Ok(())
}

/// Calendar year used to seed empty enrollment-year fields
pub fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Local::now().year()
}
