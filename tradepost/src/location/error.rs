//! Error types for the location provider.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while acquiring the user's location.
///
/// None of these trigger an automatic retry: re-prompting after a
/// refusal would contradict the explicit-consent permission model, so
/// every error is reported to the caller and acted on there.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    /// The user has not granted location permission.
    #[error("location permission denied")]
    PermissionDenied,

    /// No fix arrived within the caller's deadline.
    #[error("location acquisition timed out after {0:?}")]
    AcquisitionTimeout(Duration),

    /// The platform could not produce a usable position.
    #[error("position unavailable: {0}")]
    PositionUnavailable(String),

    /// A newer acquisition superseded this one (single-flight).
    ///
    /// Never shown to users and never broadcast; it only tells the
    /// superseded caller that the result belongs to someone else now.
    #[error("acquisition superseded by a newer request")]
    Superseded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            LocationError::PermissionDenied.to_string(),
            "location permission denied"
        );
        assert!(LocationError::AcquisitionTimeout(Duration::from_secs(10))
            .to_string()
            .contains("10s"));
        assert!(
            LocationError::PositionUnavailable("no satellites".into())
                .to_string()
                .contains("no satellites")
        );
    }
}
