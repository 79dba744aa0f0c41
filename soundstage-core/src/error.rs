//! Error taxonomy for the editor core.
//!
//! Nothing here is fatal. Every error degrades to "no visible state change"
//! plus a log line; callers decide which level.

use std::fmt;

use soundstage_types::EntityId;

/// Failure reported by a media-device collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaError {
    /// The user or platform refused microphone access.
    PermissionDenied(String),
    /// The requested device is gone or could not be opened.
    DeviceUnavailable(String),
    /// Any other backend failure.
    Backend(String),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied(e) => write!(f, "permission denied: {}", e),
            Self::DeviceUnavailable(e) => write!(f, "device unavailable: {}", e),
            Self::Backend(e) => write!(f, "media backend error: {}", e),
        }
    }
}

impl std::error::Error for MediaError {}

#[derive(Debug, Clone, PartialEq)]
pub enum EditError {
    /// Typed input failed the numeric check; the keystroke or entry is discarded.
    ValidationRejection(String),
    /// Asset exceeds the upload ceiling; rejected before load.
    AssetTooLarge { size_kb: u64, limit_kb: u64 },
    /// Media permission refused; the negotiator stays idle.
    DeviceAccessDenied(String),
    /// The audio engine could not decode an asset.
    LoadFailed(String),
    /// An async completion arrived after its target changed; dropped silently.
    StaleAsyncResult,
    UnknownEntity(EntityId),
    /// A drag started while another is still live.
    GestureActive,
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationRejection(input) => write!(f, "rejected input {:?}", input),
            Self::AssetTooLarge { size_kb, limit_kb } => write!(
                f,
                "asset is {} KB, larger than the {} KB limit",
                size_kb, limit_kb
            ),
            Self::DeviceAccessDenied(e) => write!(f, "device access denied: {}", e),
            Self::LoadFailed(e) => write!(f, "could not load sound: {}", e),
            Self::StaleAsyncResult => write!(f, "stale async result discarded"),
            Self::UnknownEntity(id) => write!(f, "unknown entity {}", id),
            Self::GestureActive => write!(f, "a gesture is already in progress"),
        }
    }
}

impl std::error::Error for EditError {}

impl From<MediaError> for EditError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::PermissionDenied(msg) => Self::DeviceAccessDenied(msg),
            other => Self::DeviceAccessDenied(other.to_string()),
        }
    }
}

pub type EditResult<T = ()> = Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_errors_map_to_access_denied() {
        let e: EditError = MediaError::PermissionDenied("NotAllowedError".into()).into();
        assert_eq!(e, EditError::DeviceAccessDenied("NotAllowedError".into()));
        let e: EditError = MediaError::DeviceUnavailable("mic".into()).into();
        assert!(matches!(e, EditError::DeviceAccessDenied(_)));
    }

    #[test]
    fn too_large_message_names_both_sizes() {
        let msg = EditError::AssetTooLarge { size_kb: 60_000, limit_kb: 51_200 }.to_string();
        assert!(msg.contains("60000") && msg.contains("51200"));
    }
}
