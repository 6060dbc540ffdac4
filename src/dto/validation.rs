//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a room code is exactly 4 uppercase ASCII letters.
pub fn validate_room_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != 4 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        let mut err = ValidationError::new("room_code_format");
        err.message = Some("Room code must be exactly 4 uppercase letters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a client-chosen player identifier: 1 to 64 characters drawn from
/// alphanumerics, `-` and `_`.
pub fn validate_player_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > 64 {
        let mut err = ValidationError::new("player_id_length");
        err.message = Some(format!("Player ID must be 1-64 characters (got {})", id.len()).into());
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        let mut err = ValidationError::new("player_id_format");
        err.message =
            Some("Player ID must contain only alphanumerics, hyphens and underscores".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a display nickname: non-blank, at most 24 characters.
pub fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    if nickname.trim().is_empty() {
        let mut err = ValidationError::new("nickname_blank");
        err.message = Some("Nickname must not be blank".into());
        return Err(err);
    }

    if nickname.chars().count() > 24 {
        let mut err = ValidationError::new("nickname_length");
        err.message = Some("Nickname must be at most 24 characters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a stored image identifier (a hyphenated UUID in practice).
pub fn validate_image_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty()
        || id.len() > 64
        || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        let mut err = ValidationError::new("image_id_format");
        err.message = Some("Invalid image identifier".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_room_code() {
        assert!(validate_room_code("ABCD").is_ok());
        assert!(validate_room_code("ZZZZ").is_ok());
        assert!(validate_room_code("abcd").is_err()); // lowercase
        assert!(validate_room_code("ABC").is_err()); // too short
        assert!(validate_room_code("ABCDE").is_err()); // too long
        assert!(validate_room_code("AB1D").is_err()); // digit
        assert!(validate_room_code("").is_err());
    }

    #[test]
    fn test_validate_player_id() {
        assert!(validate_player_id("p1").is_ok());
        assert!(validate_player_id("player_42-x").is_ok());
        assert!(validate_player_id(&"a".repeat(64)).is_ok());
        assert!(validate_player_id("").is_err());
        assert!(validate_player_id(&"a".repeat(65)).is_err());
        assert!(validate_player_id("has space").is_err());
        assert!(validate_player_id("éclair").is_err());
    }

    #[test]
    fn test_validate_nickname() {
        assert!(validate_nickname("Sam").is_ok());
        assert!(validate_nickname("The Muffin Man").is_ok());
        assert!(validate_nickname("").is_err());
        assert!(validate_nickname("   ").is_err());
        assert!(validate_nickname(&"n".repeat(25)).is_err());
    }

    #[test]
    fn test_validate_image_id() {
        assert!(validate_image_id("0b547d1f-12ab-4f00-9c6e-aaaaaaaaaaaa").is_ok());
        assert!(validate_image_id("abc123").is_ok());
        assert!(validate_image_id("").is_err());
        assert!(validate_image_id("../../etc/passwd").is_err());
        assert!(validate_image_id("abc_123").is_err()); // underscore not part of UUIDs
    }
}
