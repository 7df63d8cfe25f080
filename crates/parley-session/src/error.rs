//! Session error types.
//!
//! All session operations return [`Result<T>`] which uses
//! [`SessionError`] as the error type. None of these are fatal: every
//! failure is session-local and recoverable by user-initiated retry
//! (re-toggling listening, re-selecting a language).

use thiserror::Error;

use parley_assets::AssetError;
use parley_engine::EngineError;

/// Errors surfaced by a participant session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The recognizer reported a failure.
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// The recognizer gave up waiting for speech.
    #[error("recognition timed out")]
    RecognitionTimeout,

    /// Provisioning a recognizer model failed.
    #[error("recognizer provisioning failed: {0}")]
    Provisioning(#[from] AssetError),

    /// The synthesizer does not support the requested locale.
    #[error("speech synthesis does not support locale {0}")]
    TtsUnsupported(String),

    /// The synthesizer failed to initialize.
    #[error("speech synthesis init failed: {0}")]
    TtsInit(String),

    /// The shared translation engine failed.
    #[error("engine: {0}")]
    Engine(#[from] EngineError),
}

/// A convenience type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use parley_engine::EngineState;

    #[test]
    fn display_recognition() {
        let err = SessionError::Recognition("microphone unavailable".into());
        assert_eq!(err.to_string(), "recognition failed: microphone unavailable");
    }

    #[test]
    fn display_timeout() {
        assert_eq!(
            SessionError::RecognitionTimeout.to_string(),
            "recognition timed out"
        );
    }

    #[test]
    fn display_tts_unsupported() {
        let err = SessionError::TtsUnsupported("ar".into());
        assert_eq!(
            err.to_string(),
            "speech synthesis does not support locale ar"
        );
    }

    #[test]
    fn display_tts_init() {
        let err = SessionError::TtsInit("service died".into());
        assert_eq!(err.to_string(), "speech synthesis init failed: service died");
    }

    #[test]
    fn provisioning_from_asset_error() {
        let err: SessionError = AssetError::Missing(PathBuf::from("/model")).into();
        assert!(matches!(err, SessionError::Provisioning(_)));
        assert_eq!(
            err.to_string(),
            "recognizer provisioning failed: asset missing: /model"
        );
    }

    #[test]
    fn engine_from_engine_error() {
        let err: SessionError = EngineError::NotReady(EngineState::Loading).into();
        assert!(matches!(err, SessionError::Engine(_)));
        assert_eq!(err.to_string(), "engine: engine not ready (state: loading)");
    }
}
