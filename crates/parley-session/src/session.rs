//! The per-participant session controller.
//!
//! One controller exists per participant view. Recognition events flow
//! through a bounded queue into a single consumer task, which is the only
//! place observable state is mutated; capture, provisioning, and
//! translation all run on background tasks bound to the session's
//! cancellation token.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use parley_engine::TranslationEngine;
use parley_types::Language;

use crate::error::Result;
use crate::events::{SessionEvent, SessionStatus};
use crate::recognizer::{RecognitionEvent, SpeechRecognizer};
use crate::synthesizer::SpeechSynthesizer;

/// How many recognition events may queue before the emitting side blocks.
const RECOGNITION_BUFFER: usize = 64;

/// How many session events may queue for a slow observer.
const EVENT_BUFFER: usize = 32;

/// Observable fields of a session, captured at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// Stable identifier of the participant ("doctor", "patient", ...).
    pub participant_id: String,
    /// Whether capture is running.
    pub listening: bool,
    /// Whether playback is running.
    pub playing: bool,
    /// The latest provisional transcript (or rendered error text).
    pub partial_transcript: String,
    /// The latest stored translation (or rendered error text).
    pub translated_text: String,
    /// Current input (recognition) language.
    pub asr_language: Language,
    /// Current output (synthesis) language.
    pub tts_language: Language,
}

#[derive(Debug, Default)]
struct SessionState {
    listening: bool,
    playing: bool,
    partial_transcript: String,
    final_transcript: String,
    translated_text: String,
}

struct SessionInner {
    participant_id: String,
    engine: Arc<TranslationEngine>,
    recognizer: Arc<dyn SpeechRecognizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    state: StdMutex<SessionState>,
    asr_language: watch::Sender<Language>,
    tts_language: watch::Sender<Language>,
    recognition_tx: mpsc::Sender<RecognitionEvent>,
    events: mpsc::Sender<SessionEvent>,
    cancel: CancellationToken,
    /// Highest utterance id handed to the engine.
    utterance_seq: AtomicU64,
    /// Highest utterance id whose result landed in the session.
    applied_seq: AtomicU64,
}

/// Drives one participant's capture -> accumulation -> translation ->
/// playback loop.
///
/// Cheap to clone; all clones share the same session. The controller must
/// be created inside a Tokio runtime (it spawns its consumer task), and
/// [`shutdown`](Self::shutdown) tears the session down: capture and
/// playback stop and any in-flight translation is prevented from writing
/// into the dead session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<SessionInner>,
}

impl SessionController {
    /// Create a controller and its event stream.
    ///
    /// The recognizer is provisioned for `asr_language` and the
    /// synthesizer initialized for `tts_language` asynchronously; failures
    /// surface on the event stream rather than here.
    pub fn new(
        participant_id: impl Into<String>,
        asr_language: Language,
        tts_language: Language,
        engine: Arc<TranslationEngine>,
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (recognition_tx, recognition_rx) = mpsc::channel(RECOGNITION_BUFFER);
        let (asr_tx, _) = watch::channel(asr_language.clone());
        let (tts_tx, _) = watch::channel(tts_language.clone());

        let inner = Arc::new(SessionInner {
            participant_id: participant_id.into(),
            engine,
            recognizer,
            synthesizer,
            state: StdMutex::new(SessionState::default()),
            asr_language: asr_tx,
            tts_language: tts_tx,
            recognition_tx,
            events: events_tx,
            cancel: CancellationToken::new(),
            utterance_seq: AtomicU64::new(0),
            applied_seq: AtomicU64::new(0),
        });

        tokio::spawn(Arc::clone(&inner).run(recognition_rx));
        Arc::clone(&inner).spawn_recognizer_provisioning(asr_language);
        Arc::clone(&inner).spawn_synthesizer_init(tts_language);

        (Self { inner }, events_rx)
    }

    /// The participant this session belongs to.
    pub fn participant_id(&self) -> &str {
        &self.inner.participant_id
    }

    /// Capture the observable fields at this instant.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state_guard();
        SessionSnapshot {
            participant_id: self.inner.participant_id.clone(),
            listening: state.listening,
            playing: state.playing,
            partial_transcript: state.partial_transcript.clone(),
            translated_text: state.translated_text.clone(),
            asr_language: self.inner.asr_language.borrow().clone(),
            tts_language: self.inner.tts_language.borrow().clone(),
        }
    }

    /// Coarse activity state: translating while any utterance is in
    /// flight, otherwise listening or idle.
    pub fn status(&self) -> SessionStatus {
        let issued = self.inner.utterance_seq.load(Ordering::SeqCst);
        let applied = self.inner.applied_seq.load(Ordering::SeqCst);
        if issued > applied {
            SessionStatus::Translating
        } else if self.inner.state_guard().listening {
            SessionStatus::Listening
        } else {
            SessionStatus::Idle
        }
    }

    /// Current input language.
    pub fn asr_language(&self) -> Language {
        self.inner.asr_language.borrow().clone()
    }

    /// Current output language.
    pub fn tts_language(&self) -> Language {
        self.inner.tts_language.borrow().clone()
    }

    /// Subscribe to input-language changes (used by the pair coordinator).
    pub fn asr_language_watch(&self) -> watch::Receiver<Language> {
        self.inner.asr_language.subscribe()
    }

    /// Switch the input language and re-provision the recognizer for it.
    ///
    /// The watch value updates immediately; provisioning runs in the
    /// background and renders a visible error on failure.
    pub fn set_asr_language(&self, language: Language) {
        info!(
            participant = %self.inner.participant_id,
            language = %language,
            "input language changed"
        );
        self.inner.asr_language.send_replace(language.clone());
        self.inner.emit_language_changed();
        Arc::clone(&self.inner).spawn_recognizer_provisioning(language);
    }

    /// Switch the output language and re-initialize the synthesizer for
    /// it. Never feeds back into the input language, so cross-wiring two
    /// sessions cannot cycle.
    pub fn set_tts_language(&self, language: Language) {
        debug!(
            participant = %self.inner.participant_id,
            language = %language,
            "output language changed"
        );
        self.inner.tts_language.send_replace(language.clone());
        self.inner.emit_language_changed();
        Arc::clone(&self.inner).spawn_synthesizer_init(language);
    }

    /// Start or stop capture.
    pub async fn toggle_listening(&self) -> Result<()> {
        if self.inner.state_guard().listening {
            self.stop_listening().await;
            Ok(())
        } else {
            self.start_listening().await
        }
    }

    /// Begin a recognition session. No-op when already listening.
    pub async fn start_listening(&self) -> Result<()> {
        if self.inner.state_guard().listening {
            return Ok(());
        }
        self.inner
            .recognizer
            .start(self.inner.recognition_tx.clone())
            .await?;
        self.inner.state_guard().listening = true;
        info!(participant = %self.inner.participant_id, "listening");
        self.inner.emit(SessionEvent::ListeningChanged { listening: true });
        Ok(())
    }

    /// Stop the recognition session. No-op when not listening.
    pub async fn stop_listening(&self) {
        if !self.inner.state_guard().listening {
            return;
        }
        self.inner.recognizer.stop().await;
        self.inner.state_guard().listening = false;
        info!(participant = %self.inner.participant_id, "stopped listening");
        self.inner.emit(SessionEvent::ListeningChanged { listening: false });
    }

    /// Start or stop playback of the stored translation.
    ///
    /// Starting is a no-op while no translation is stored.
    pub async fn toggle_playback(&self) -> Result<()> {
        if self.inner.state_guard().playing {
            self.inner.synthesizer.stop().await;
            self.inner.state_guard().playing = false;
            self.inner.emit(SessionEvent::PlayingChanged { playing: false });
            return Ok(());
        }

        let text = self.inner.state_guard().translated_text.clone();
        if text.is_empty() {
            debug!(
                participant = %self.inner.participant_id,
                "playback requested with no translation stored"
            );
            return Ok(());
        }

        self.inner.synthesizer.speak(&text).await?;
        self.inner.state_guard().playing = true;
        self.inner.emit(SessionEvent::PlayingChanged { playing: true });
        Ok(())
    }

    /// Tear the session down: stop capture and playback and cancel the
    /// application of any in-flight translation.
    pub async fn shutdown(&self) {
        info!(participant = %self.inner.participant_id, "session shutting down");
        self.inner.cancel.cancel();
        self.inner.recognizer.stop().await;
        self.inner.synthesizer.stop().await;
        let mut state = self.inner.state_guard();
        state.listening = false;
        state.playing = false;
    }
}

impl SessionInner {
    fn state_guard(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Best-effort event delivery; a slow observer never blocks the session.
    fn emit(&self, event: SessionEvent) {
        if let Err(e) = self.events.try_send(event) {
            debug!(
                participant = %self.participant_id,
                error = %e,
                "session event dropped (receiver full or closed)"
            );
        }
    }

    fn emit_language_changed(&self) {
        let asr = self.asr_language.borrow().label.clone();
        let tts = self.tts_language.borrow().label.clone();
        self.emit(SessionEvent::LanguageChanged { asr, tts });
    }

    /// Consume recognition events until the session is cancelled. This
    /// task is the sole mutator of observable state.
    async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<RecognitionEvent>) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                event = rx.recv() => match event {
                    Some(event) => Arc::clone(&self).handle_recognition(event),
                    None => break,
                },
            }
        }
        debug!(participant = %self.participant_id, "session event loop ended");
    }

    fn handle_recognition(self: Arc<Self>, event: RecognitionEvent) {
        match event {
            RecognitionEvent::Partial(text) => {
                self.state_guard().partial_transcript = text.clone();
                self.emit(SessionEvent::PartialTranscript { text });
            }
            RecognitionEvent::Final(text) => {
                if text.trim().is_empty() {
                    return;
                }
                let mut state = self.state_guard();
                if state.final_transcript.is_empty() {
                    state.final_transcript = text;
                } else {
                    state.final_transcript.push_str(". ");
                    state.final_transcript.push_str(&text);
                }
            }
            RecognitionEvent::Finalized => self.finalize_utterance(),
            RecognitionEvent::Error(cause) => {
                warn!(participant = %self.participant_id, cause = %cause, "recognition error");
                self.state_guard().partial_transcript = format!("Error: {cause}");
                self.emit(SessionEvent::Error {
                    message: format!("recognition failed: {cause}"),
                });
            }
            RecognitionEvent::Timeout => {
                warn!(participant = %self.participant_id, "recognition timeout");
                self.state_guard().partial_transcript = "Timeout".to_string();
                self.emit(SessionEvent::Error {
                    message: "recognition timed out".to_string(),
                });
            }
        }
    }

    /// Snapshot the utterance text and hand it to the engine.
    ///
    /// The finalized transcript is preferred; when it is blank the latest
    /// partial stands in for it. Translation never starts from partial
    /// updates alone.
    fn finalize_utterance(self: Arc<Self>) {
        let snapshot = {
            let mut state = self.state_guard();
            let text = if !state.final_transcript.trim().is_empty() {
                state.final_transcript.clone()
            } else {
                state.partial_transcript.clone()
            };
            state.final_transcript.clear();
            text
        };

        if snapshot.trim().is_empty() {
            debug!(participant = %self.participant_id, "utterance finalized with no text");
            return;
        }

        let utterance = self.utterance_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let source = self.asr_language.borrow().label.clone();
        let target = self.tts_language.borrow().label.clone();
        debug!(
            participant = %self.participant_id,
            utterance,
            source = %source,
            target = %target,
            "utterance finalized"
        );
        self.emit(SessionEvent::TranslationStarted { utterance });

        let cancel = self.cancel.child_token();
        let inner = self;
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return,
                outcome = inner
                    .engine
                    .translate(&source, &target, &snapshot) => outcome,
            };
            inner.apply_translation(utterance, outcome);
        });
    }

    /// Land a translation result, discarding it when a newer utterance's
    /// result already landed.
    fn apply_translation(&self, utterance: u64, outcome: parley_engine::Result<String>) {
        let mut applied = self.applied_seq.load(Ordering::SeqCst);
        loop {
            if utterance <= applied {
                debug!(
                    participant = %self.participant_id,
                    utterance,
                    applied,
                    "discarding stale translation result"
                );
                return;
            }
            match self.applied_seq.compare_exchange(
                applied,
                utterance,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break,
                Err(current) => applied = current,
            }
        }

        match outcome {
            Ok(text) => {
                self.state_guard().translated_text = text.clone();
                self.emit(SessionEvent::TranslationReady { utterance, text });
            }
            Err(err) => {
                warn!(
                    participant = %self.participant_id,
                    utterance,
                    error = %err,
                    "translation failed"
                );
                let message = err.to_string();
                self.state_guard().translated_text = message.clone();
                self.emit(SessionEvent::Error { message });
            }
        }
    }

    /// Stop capture and re-provision the recognizer for `language`,
    /// rendering a visible error on failure.
    fn spawn_recognizer_provisioning(self: Arc<Self>, language: Language) {
        let cancel = self.cancel.child_token();
        let inner = self;
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = cancel.cancelled() => return,
                result = async {
                    inner.recognizer.stop().await;
                    inner.recognizer.configure(&language).await
                } => result,
            };
            match result {
                Ok(()) => {
                    info!(
                        participant = %inner.participant_id,
                        language = %language,
                        model = %language.asset.file_name,
                        "recognizer ready"
                    );
                }
                Err(err) => {
                    warn!(
                        participant = %inner.participant_id,
                        language = %language,
                        error = %err,
                        "recognizer provisioning failed"
                    );
                    inner.state_guard().partial_transcript = "Model switch failed".to_string();
                    inner.emit(SessionEvent::Error {
                        message: err.to_string(),
                    });
                }
            }
        });
    }

    /// Re-initialize the synthesizer for `language`'s locale.
    fn spawn_synthesizer_init(self: Arc<Self>, language: Language) {
        let cancel = self.cancel.child_token();
        let inner = self;
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = cancel.cancelled() => return,
                result = inner.synthesizer.init(&language.locale) => result,
            };
            match result {
                Ok(()) => {
                    debug!(
                        participant = %inner.participant_id,
                        locale = %language.locale,
                        "synthesizer ready"
                    );
                }
                Err(err) => {
                    warn!(
                        participant = %inner.participant_id,
                        locale = %language.locale,
                        error = %err,
                        "synthesizer init failed"
                    );
                    inner.emit(SessionEvent::Error {
                        message: err.to_string(),
                    });
                }
            }
        });
    }
}
