//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a game name still has content once surrounding whitespace is removed.
///
/// # Examples
///
/// ```ignore
/// validate_game_name("Chess")   // Ok
/// validate_game_name(" Chess ") // Ok - trimmed before storage
/// validate_game_name("   ")     // Err - blank
/// ```
pub fn validate_game_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("game_name_blank");
        err.message = Some("Game name must not be blank".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_game_name_valid() {
        assert!(validate_game_name("Chess").is_ok());
        assert!(validate_game_name("  Chess ").is_ok());
        assert!(validate_game_name("7").is_ok());
    }

    #[test]
    fn test_validate_game_name_blank() {
        assert!(validate_game_name("").is_err());
        assert!(validate_game_name("   ").is_err());
        assert!(validate_game_name("\t\n").is_err());
    }
}
