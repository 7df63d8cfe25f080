//! The speech-synthesis seam.

use async_trait::async_trait;

use crate::error::Result;

/// A speech synthesis engine.
///
/// Implementations own the acoustic synthesis; the session only hands
/// them text and a locale.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Prepare the synthesizer for a locale.
    ///
    /// # Errors
    ///
    /// [`SessionError::TtsUnsupported`](crate::error::SessionError::TtsUnsupported)
    /// when the locale has no voice,
    /// [`SessionError::TtsInit`](crate::error::SessionError::TtsInit) when
    /// the underlying service fails to come up.
    async fn init(&self, locale: &str) -> Result<()>;

    /// Speak `text` aloud. Returns once playback has been started.
    async fn speak(&self, text: &str) -> Result<()>;

    /// Stop any active playback.
    async fn stop(&self);
}
