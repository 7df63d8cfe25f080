//! Observable session status and the event stream consumed by the UI.

use serde::{Deserialize, Serialize};

/// Coarse activity state of a session.
///
/// Playback is orthogonal and reported separately (see
/// [`SessionEvent::PlayingChanged`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Not capturing and nothing in flight.
    Idle,
    /// Capturing speech.
    Listening,
    /// At least one translation is in flight; capture may continue.
    Translating,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Listening => write!(f, "listening"),
            Self::Translating => write!(f, "translating"),
        }
    }
}

/// Event emitted on a session's event stream whenever observable state
/// changes.
///
/// Delivery is best-effort: a full or dropped receiver loses events but
/// never blocks the session (the snapshot accessor is the source of
/// truth).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Capture started or stopped.
    ListeningChanged {
        /// New listening flag.
        listening: bool,
    },

    /// Playback started or stopped.
    PlayingChanged {
        /// New playing flag.
        playing: bool,
    },

    /// The provisional transcript changed.
    PartialTranscript {
        /// The latest provisional text.
        text: String,
    },

    /// An utterance was finalized and handed to the engine.
    TranslationStarted {
        /// Sequence id of the utterance.
        utterance: u64,
    },

    /// A translation landed in the session.
    TranslationReady {
        /// Sequence id of the utterance.
        utterance: u64,
        /// The trimmed translated text.
        text: String,
    },

    /// The input or output language changed.
    LanguageChanged {
        /// Current input (recognition) language label.
        asr: String,
        /// Current output (synthesis) language label.
        tts: String,
    },

    /// A session-local failure, rendered for the user.
    Error {
        /// Human-readable description.
        message: String,
    },
}
