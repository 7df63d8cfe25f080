//! The speech-recognition seam.
//!
//! The recognizer is push-based: once started, it delivers
//! [`RecognitionEvent`]s into the session's bounded queue from whatever
//! thread or task it runs on. The session's consumer task is the only
//! place those events mutate observable state.

use async_trait::async_trait;
use tokio::sync::mpsc;

use parley_types::Language;

use crate::error::Result;

/// An event pushed by the recognizer into a session's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Provisional transcript for the open utterance; may be revised.
    Partial(String),

    /// Settled text for one utterance segment.
    Final(String),

    /// The utterance is complete; translation may begin.
    Finalized,

    /// The recognizer failed.
    Error(String),

    /// The recognizer gave up waiting for speech.
    Timeout,
}

/// A push-based speech recognition engine.
///
/// Implementations own the acoustic decoding; the session only sees text
/// events. `configure` may be slow (it provisions the per-language model)
/// and is always invoked off the command path.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Re-provision the recognizer for a language, materializing its model
    /// if necessary.
    async fn configure(&self, language: &Language) -> Result<()>;

    /// Begin a recognition session, pushing events into `sink` until
    /// stopped.
    async fn start(&self, sink: mpsc::Sender<RecognitionEvent>) -> Result<()>;

    /// Stop the active recognition session, if any.
    async fn stop(&self);
}
