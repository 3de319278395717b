// Admission-time structural validation
//
// Runs before the depth check: invalid requests are never counted against
// queue capacity. Voice-identifier legality is deliberately NOT checked here;
// unrecognized voices fall through to the processor default.

use crate::domain::error::{DomainError, Result};
use crate::domain::NotificationRequest;

/// Maximum notification text length, in characters
pub const MAX_TEXT_LEN: usize = 500;

/// Maximum voice selector length, in characters
pub const MAX_VOICE_LEN: usize = 64;

/// Allowed playback volume range
pub const VOLUME_RANGE: std::ops::RangeInclusive<f64> = 0.0..=1.0;

/// Allowed rate/pitch multiplier range
pub const PROSODY_RANGE: std::ops::RangeInclusive<f64> = 0.5..=2.0;

/// Validate the structural shape of a notification request.
pub fn validate_request(req: &NotificationRequest) -> Result<()> {
    if req.text.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Notification text must not be empty".to_string(),
        ));
    }

    if req.text.chars().count() > MAX_TEXT_LEN {
        return Err(DomainError::ValidationError(format!(
            "Notification text too long (max {} characters)",
            MAX_TEXT_LEN
        )));
    }

    if let Some(voice) = &req.voice {
        if voice.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Voice selector must not be empty".to_string(),
            ));
        }
        if voice.chars().count() > MAX_VOICE_LEN {
            return Err(DomainError::ValidationError(format!(
                "Voice selector too long (max {} characters)",
                MAX_VOICE_LEN
            )));
        }
        if !voice
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ' ')
        {
            return Err(DomainError::ValidationError(
                "Voice selector must be alphanumeric (plus '_', '-', ' ')".to_string(),
            ));
        }
    }

    if let Some(volume) = req.volume {
        if !VOLUME_RANGE.contains(&volume) {
            return Err(DomainError::ValidationError(format!(
                "Volume out of range ({:.1}..={:.1})",
                VOLUME_RANGE.start(),
                VOLUME_RANGE.end()
            )));
        }
    }

    for (name, value) in [("Rate", req.rate), ("Pitch", req.pitch)] {
        if let Some(v) = value {
            if !PROSODY_RANGE.contains(&v) {
                return Err(DomainError::ValidationError(format!(
                    "{} out of range ({:.1}..={:.1})",
                    name,
                    PROSODY_RANGE.start(),
                    PROSODY_RANGE.end()
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> NotificationRequest {
        NotificationRequest {
            text: "build finished".to_string(),
            voice: Some("samantha".to_string()),
            volume: Some(0.8),
            rate: Some(1.0),
            pitch: None,
        }
    }

    #[test]
    fn test_validate_text_empty() {
        let mut req = base_request();
        req.text = "   ".to_string();

        let result = validate_request(&req);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_validate_text_too_long() {
        let mut req = base_request();
        req.text = "a".repeat(MAX_TEXT_LEN + 1);

        let result = validate_request(&req);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too long"));
    }

    #[test]
    fn test_validate_voice_invalid_chars() {
        let mut req = base_request();
        req.voice = Some("alice@home!".to_string());

        let result = validate_request(&req);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("alphanumeric"));
    }

    #[test]
    fn test_validate_volume_out_of_range() {
        let mut req = base_request();
        req.volume = Some(1.5);

        let result = validate_request(&req);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("out of range"));
    }

    #[test]
    fn test_validate_rate_out_of_range() {
        let mut req = base_request();
        req.rate = Some(3.0);

        let result = validate_request(&req);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("out of range"));
    }

    #[test]
    fn test_unrecognized_voice_passes_validation() {
        // Voice legality is a processing-time concern; the fallback voice
        // handles names the platform does not know.
        let mut req = base_request();
        req.voice = Some("definitely-not-a-real-voice".to_string());

        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_validate_valid_request() {
        assert!(validate_request(&base_request()).is_ok());
    }
}
