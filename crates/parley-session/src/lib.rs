//! Per-participant session orchestration for parley.
//!
//! A [`SessionController`] drives one participant's capture ->
//! accumulation -> translation -> playback loop: recognition events flow
//! through a bounded queue into a single consumer task that owns all
//! observable state, finalized utterances are translated through the
//! shared engine under a per-utterance sequence id, and playback reads
//! the stored translation on demand.
//!
//! Two controllers are kept cross-wired by the
//! [`LanguagePairCoordinator`]: each participant's output language tracks
//! the other's input language.
//!
//! The speech engines themselves live behind the [`SpeechRecognizer`] and
//! [`SpeechSynthesizer`] seam traits; this crate never touches audio.

pub mod coordinator;
pub mod error;
pub mod events;
pub mod recognizer;
pub mod session;
pub mod synthesizer;

pub use coordinator::LanguagePairCoordinator;
pub use error::{Result, SessionError};
pub use events::{SessionEvent, SessionStatus};
pub use recognizer::{RecognitionEvent, SpeechRecognizer};
pub use session::{SessionController, SessionSnapshot};
pub use synthesizer::SpeechSynthesizer;
