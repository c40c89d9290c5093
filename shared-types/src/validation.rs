//! Field rules shared by the API handlers and the client forms.
//!
//! Lengths are counted in characters, not bytes.

use thiserror::Error;

pub const TITLE_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 1000;
pub const PROJECT_NAME_MAX_LEN: usize = 200;
pub const EMAIL_MAX_LEN: usize = 255;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const DEFAULT_PROJECT_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Task title is required")]
    TitleRequired,
    #[error("Task title must be 200 characters or less")]
    TitleTooLong,
    #[error("Description must be 1000 characters or less")]
    DescriptionTooLong,
    #[error("Project name is required")]
    NameRequired,
    #[error("Project name must be 200 characters or less")]
    NameTooLong,
    #[error("Color must be a hex code such as #3b82f6")]
    InvalidColor,
    #[error("A valid email address is required")]
    InvalidEmail,
    #[error("Password must be at least 8 characters")]
    PasswordTooShort,
    #[error("Password must contain at least one number")]
    PasswordNeedsNumber,
    #[error("Password must contain at least one special character")]
    PasswordNeedsSpecial,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}

pub fn validate_description(description: Option<&str>) -> Result<(), ValidationError> {
    match description {
        Some(d) if d.chars().count() > DESCRIPTION_MAX_LEN => {
            Err(ValidationError::DescriptionTooLong)
        }
        _ => Ok(()),
    }
}

pub fn validate_project_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if name.chars().count() > PROJECT_NAME_MAX_LEN {
        return Err(ValidationError::NameTooLong);
    }
    Ok(())
}

/// Accepts `#rgb` and `#rrggbb`
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    let hex = color
        .strip_prefix('#')
        .ok_or(ValidationError::InvalidColor)?;

    if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidColor);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty()
        || email.chars().count() > EMAIL_MAX_LEN
        || email.chars().any(char::is_whitespace)
    {
        return Err(ValidationError::InvalidEmail);
    }

    let (local, domain) = email.split_once('@').ok_or(ValidationError::InvalidEmail)?;
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidEmail),
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Stricter rule applied when a user picks a new password in a form.
/// The server only enforces [`validate_password`].
pub fn validate_new_password(password: &str) -> Result<(), ValidationError> {
    validate_password(password)?;
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordNeedsNumber);
    }
    if password.chars().all(char::is_alphanumeric) {
        return Err(ValidationError::PasswordNeedsSpecial);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_rules() {
        assert_eq!(validate_title("   "), Err(ValidationError::TitleRequired));
        assert_eq!(validate_title(""), Err(ValidationError::TitleRequired));
        assert!(validate_title("Buy milk").is_ok());
        assert!(validate_title(&"x".repeat(200)).is_ok());
        assert_eq!(
            validate_title(&"x".repeat(201)),
            Err(ValidationError::TitleTooLong)
        );
    }

    #[test]
    fn test_title_length_counts_characters() {
        assert!(validate_title(&"é".repeat(200)).is_ok());
    }

    #[test]
    fn test_description_rules() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some(&"d".repeat(1000))).is_ok());
        assert_eq!(
            validate_description(Some(&"d".repeat(1001))),
            Err(ValidationError::DescriptionTooLong)
        );
    }

    #[test]
    fn test_project_name_rules() {
        assert_eq!(validate_project_name(""), Err(ValidationError::NameRequired));
        assert_eq!(
            validate_project_name(&"n".repeat(201)),
            Err(ValidationError::NameTooLong)
        );
        assert!(validate_project_name("Website relaunch").is_ok());
    }

    #[test]
    fn test_color_rules() {
        assert!(validate_color("#3b82f6").is_ok());
        assert!(validate_color("#FFF").is_ok());
        assert!(validate_color("3b82f6").is_err());
        assert!(validate_color("#3b82f").is_err());
        assert!(validate_color("#zzzzzz").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada example@example.com").is_err());
        assert!(validate_email("ada@@example.com").is_err());
        assert!(validate_email("ada@example.").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert_eq!(
            validate_password("short"),
            Err(ValidationError::PasswordTooShort)
        );
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_new_password_rules() {
        assert_eq!(
            validate_new_password("abcdefgh!"),
            Err(ValidationError::PasswordNeedsNumber)
        );
        assert_eq!(
            validate_new_password("abcdefg1"),
            Err(ValidationError::PasswordNeedsSpecial)
        );
        assert_eq!(
            validate_new_password("a1!"),
            Err(ValidationError::PasswordTooShort)
        );
        assert!(validate_new_password("garden-42").is_ok());
    }
}
