//! Validation helpers for wire input.

use validator::ValidationError;

/// Maximum accepted nickname length in characters.
const NICKNAME_MAX: usize = 24;

/// Validates that a game code is exactly 8 lowercase hexadecimal characters.
pub fn validate_game_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != 8 {
        let mut err = ValidationError::new("game_code_length");
        err.message =
            Some(format!("Game code must be exactly 8 characters (got {})", code.len()).into());
        return Err(err);
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    {
        let mut err = ValidationError::new("game_code_format");
        err.message = Some("Game code must contain only lowercase hexadecimal characters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a nickname is non-blank and at most 24 characters.
pub fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    if nickname.trim().is_empty() {
        let mut err = ValidationError::new("nickname_blank");
        err.message = Some("Nickname must not be blank".into());
        return Err(err);
    }

    if nickname.chars().count() > NICKNAME_MAX {
        let mut err = ValidationError::new("nickname_length");
        err.message = Some(format!("Nickname must be at most {NICKNAME_MAX} characters").into());
        return Err(err);
    }

    Ok(())
}
