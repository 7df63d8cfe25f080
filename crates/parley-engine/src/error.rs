//! Engine error types.
//!
//! All engine operations return [`Result<T>`] which uses [`EngineError`]
//! as the error type.

use thiserror::Error;

use parley_assets::AssetError;

use crate::engine::EngineState;

/// Errors that can occur when loading or running the translation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A weights-file precondition failed (missing or empty).
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Native engine construction failed.
    #[error("engine load failed: {0}")]
    LoadFailed(String),

    /// A generation was requested while the engine was not Ready.
    #[error("engine not ready (state: {0})")]
    NotReady(EngineState),

    /// The native generation stream failed mid-flight.
    #[error("generation failed: {0}")]
    Generation(String),
}

/// A convenience type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn display_asset() {
        let err = EngineError::Asset(AssetError::Missing(PathBuf::from("/m.gguf")));
        assert_eq!(err.to_string(), "asset error: asset missing: /m.gguf");
    }

    #[test]
    fn display_load_failed() {
        let err = EngineError::LoadFailed("bad magic".into());
        assert_eq!(err.to_string(), "engine load failed: bad magic");
    }

    #[test]
    fn display_not_ready() {
        let err = EngineError::NotReady(EngineState::Unloaded);
        assert_eq!(err.to_string(), "engine not ready (state: unloaded)");
        let err = EngineError::NotReady(EngineState::Failed);
        assert_eq!(err.to_string(), "engine not ready (state: failed)");
    }

    #[test]
    fn display_generation() {
        let err = EngineError::Generation("stream closed".into());
        assert_eq!(err.to_string(), "generation failed: stream closed");
    }

    #[test]
    fn asset_error_from_conversion() {
        let asset_err = AssetError::Empty(PathBuf::from("/m.gguf"));
        let err: EngineError = asset_err.into();
        assert!(matches!(err, EngineError::Asset(_)));
    }
}
