//! The core [`LanguageModel`] seam trait for the native inference backend.
//!
//! Implementations handle the details of a concrete backend (llama.cpp
//! bindings, a local inference server, a test fake). The
//! [`TranslationEngine`](crate::engine::TranslationEngine) wrapper
//! guarantees that `load` completes before any `generate` call and that
//! generations never overlap, so implementations may assume exclusive
//! access for the duration of a call.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;

/// A native text-generation engine that loads weights once and streams
/// completion fragments for a prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Construct the native model from a weights file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::LoadFailed`](crate::error::EngineError::LoadFailed)
    /// when native initialization fails.
    async fn load(&self, weights: &Path) -> Result<()>;

    /// Run one generation, pushing each produced text fragment into `tx`.
    ///
    /// The fragment stream is finite: the implementation returns once the
    /// model stops producing tokens. The consumer may drop the receiver
    /// early (it has seen an end-of-turn marker); implementations treat a
    /// closed channel as normal early termination, not an error.
    async fn generate(&self, prompt: &str, tx: mpsc::Sender<String>) -> Result<()>;
}
