//! Input validation for users and characters.
//!
//! Every function returns [`CoreError::Validation`] with a human-readable
//! message so handlers can surface it as a 400 without further mapping.

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Display name bounds (after trimming).
pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 100;

/// Inclusive bounds for every character attribute.
pub const ATTRIBUTE_MIN: i32 = 0;
pub const ATTRIBUTE_MAX: i32 = 20;

/// Maximum length of free-text character fields (race, class, faction).
pub const MAX_SHORT_FIELD_LENGTH: usize = 60;

/// Maximum length of a character description.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// The four core attributes of a character sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub charisma: i32,
}

impl Attributes {
    /// Iterate over `(name, value)` pairs, in sheet order.
    pub fn entries(&self) -> [(&'static str, i32); 4] {
        [
            ("strength", self.strength),
            ("dexterity", self.dexterity),
            ("intelligence", self.intelligence),
            ("charisma", self.charisma),
        ]
    }
}

/// Trim and lowercase an email address, rejecting malformed input.
pub fn normalize_email(email: &str) -> Result<String, CoreError> {
    let normalized = email.trim().to_lowercase();
    if !normalized.validate_email() {
        return Err(CoreError::Validation("Invalid email format".into()));
    }
    Ok(normalized)
}

/// Trim a display name and enforce its length bounds.
pub fn validate_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len < MIN_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name must be at least {MIN_NAME_LENGTH} characters long"
        )));
    }
    if len > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LENGTH} characters long"
        )));
    }
    Ok(trimmed.to_string())
}

/// Enforce the minimum password policy: length, plus at least one letter or digit.
pub fn validate_password_strength(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    let has_alphanumeric = password.chars().any(|c| c.is_alphanumeric());
    if !has_alphanumeric {
        return Err(CoreError::Validation(
            "Password must contain letters or numbers".into(),
        ));
    }
    Ok(())
}

/// Check every attribute is within `[ATTRIBUTE_MIN, ATTRIBUTE_MAX]`.
pub fn validate_attributes(attributes: &Attributes) -> Result<(), CoreError> {
    for (name, value) in attributes.entries() {
        if !(ATTRIBUTE_MIN..=ATTRIBUTE_MAX).contains(&value) {
            return Err(CoreError::Validation(format!(
                "Attribute '{name}' must be between {ATTRIBUTE_MIN} and {ATTRIBUTE_MAX}, got {value}"
            )));
        }
    }
    Ok(())
}

/// Validate a required short text field (race, class, ...), returning it trimmed.
pub fn validate_required_field(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("'{field}' must not be empty")));
    }
    if trimmed.chars().count() > MAX_SHORT_FIELD_LENGTH {
        return Err(CoreError::Validation(format!(
            "'{field}' must be at most {MAX_SHORT_FIELD_LENGTH} characters long"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trimmed `(name, race, class)` of a character sheet.
pub fn validate_character_fields(
    name: &str,
    race: &str,
    class: &str,
) -> Result<(String, String, String), CoreError> {
    Ok((
        validate_name(name)?,
        validate_required_field("race", race)?,
        validate_required_field("class", class)?,
    ))
}

/// Validate the optional description length.
pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description must be at most {MAX_DESCRIPTION_LENGTH} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn attrs(strength: i32, dexterity: i32, intelligence: i32, charisma: i32) -> Attributes {
        Attributes {
            strength,
            dexterity,
            intelligence,
            charisma,
        }
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let email = normalize_email("  Vitor@Neon.City ").unwrap();
        assert_eq!(email, "vitor@neon.city");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["", "not-an-email", "a@", "@neon.city", "two@@neon.city"] {
            assert_matches!(normalize_email(bad), Err(CoreError::Validation(_)), "{bad}");
        }
    }

    #[test]
    fn name_bounds() {
        assert_eq!(validate_name("  Nyx  ").unwrap(), "Nyx");
        assert!(validate_name("N").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        // Two multi-byte characters meet the minimum.
        assert!(validate_name("Zé").is_ok());
    }

    #[test]
    fn password_policy() {
        assert!(validate_password_strength("abc12").is_err());
        assert!(validate_password_strength("abcdef").is_ok());
        assert!(validate_password_strength("123456").is_ok());
        let err = validate_password_strength("!!!!!!").unwrap_err();
        assert!(err.to_string().contains("letters or numbers"));
    }

    #[test]
    fn attributes_within_range_pass() {
        assert!(validate_attributes(&attrs(0, 20, 10, 5)).is_ok());
    }

    #[test]
    fn attributes_out_of_range_name_the_field() {
        let err = validate_attributes(&attrs(8, 21, 10, 5)).unwrap_err();
        assert!(err.to_string().contains("dexterity"));
        assert!(validate_attributes(&attrs(-1, 0, 0, 0)).is_err());
    }

    #[test]
    fn required_field_rejects_blank() {
        assert_eq!(validate_required_field("race", " Humano ").unwrap(), "Humano");
        assert_matches!(
            validate_required_field("class", "   "),
            Err(CoreError::Validation(msg)) if msg.contains("class")
        );
    }

    #[test]
    fn character_fields_are_trimmed_together() {
        let (name, race, class) = validate_character_fields(" Nyx ", "Humano", " Ladino").unwrap();
        assert_eq!((name.as_str(), race.as_str(), class.as_str()), ("Nyx", "Humano", "Ladino"));
        assert!(validate_character_fields("Nyx", "", "Ladino").is_err());
    }

    #[test]
    fn description_limit() {
        assert!(validate_description("Netrunner em Neon City.").is_ok());
        assert!(validate_description(&"a".repeat(MAX_DESCRIPTION_LENGTH + 1)).is_err());
    }
}
