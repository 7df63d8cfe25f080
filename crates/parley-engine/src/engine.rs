//! The shared translation engine: load lifecycle and serialized streaming
//! generation.

use std::path::Path;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use parley_assets::AssetError;

use crate::error::{EngineError, Result};
use crate::model::LanguageModel;
use crate::prompt::{ChatTemplate, trim_at_stop};

/// How many fragments may queue between the backend and the consumer.
const FRAGMENT_BUFFER: usize = 32;

/// Lifecycle state of the shared engine.
///
/// Transitions are monotonic (Unloaded -> Loading -> Ready) except that
/// Failed may be retried by a fresh [`TranslationEngine::load`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// No load has been attempted yet.
    Unloaded,
    /// A load is in flight.
    Loading,
    /// The model is loaded and can generate.
    Ready,
    /// The last load attempt failed.
    Failed,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unloaded => write!(f, "unloaded"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// The single shared translation engine.
///
/// Exactly one engine exists per process; both participant sessions hold
/// an `Arc` to it. Only the engine itself mutates [`EngineState`]: `load`
/// is the sole writer and is mutually exclusive across all callers.
pub struct TranslationEngine {
    model: Arc<dyn LanguageModel>,
    template: ChatTemplate,
    state: StdMutex<EngineState>,
    load_section: Mutex<()>,
    generation: Mutex<()>,
}

impl TranslationEngine {
    /// Create an engine over a native backend, in the Unloaded state.
    pub fn new(model: Arc<dyn LanguageModel>, template: ChatTemplate) -> Self {
        Self {
            model,
            template,
            state: StdMutex::new(EngineState::Unloaded),
            load_section: Mutex::new(()),
            generation: Mutex::new(()),
        }
    }

    /// The template variant this engine renders prompts with.
    pub fn template(&self) -> ChatTemplate {
        self.template
    }

    /// Current lifecycle state, for display. May be stale by the time the
    /// caller acts on it; `translate` re-checks.
    pub fn state(&self) -> EngineState {
        *self.state_guard()
    }

    fn state_guard(&self) -> MutexGuard<'_, EngineState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, next: EngineState) {
        *self.state_guard() = next;
    }

    /// Load the model weights.
    ///
    /// Ready -> returns immediately. Otherwise every caller serializes on
    /// an exclusive section and the state is re-checked inside it, so
    /// exactly one physical load runs no matter how many callers race; the
    /// rest observe the same terminal state. A failed load leaves the
    /// engine in Failed; a later call retries from scratch.
    ///
    /// # Errors
    ///
    /// [`EngineError::Asset`] when the weights file is missing or empty,
    /// [`EngineError::LoadFailed`] when native initialization fails.
    pub async fn load(&self, weights: &Path) -> Result<()> {
        if self.state() == EngineState::Ready {
            return Ok(());
        }

        let _section = self.load_section.lock().await;
        if self.state() == EngineState::Ready {
            return Ok(());
        }

        self.set_state(EngineState::Loading);
        info!(weights = %weights.display(), "loading translation model");

        match self.try_load(weights).await {
            Ok(()) => {
                self.set_state(EngineState::Ready);
                info!("translation model ready");
                Ok(())
            }
            Err(err) => {
                self.set_state(EngineState::Failed);
                warn!(error = %err, "translation model load failed");
                Err(err)
            }
        }
    }

    async fn try_load(&self, weights: &Path) -> Result<()> {
        let meta = tokio::fs::metadata(weights)
            .await
            .map_err(|_| AssetError::Missing(weights.to_path_buf()))?;
        if meta.len() == 0 {
            return Err(AssetError::Empty(weights.to_path_buf()).into());
        }

        self.model.load(weights).await
    }

    /// Translate `text` from `source` into `target`, returning the trimmed
    /// generation output.
    pub async fn translate(&self, source: &str, target: &str, text: &str) -> Result<String> {
        debug!(source, target, chars = text.len(), "translation queued");
        let prompt = self.template.render(source, target, text);
        self.generate(&prompt).await
    }

    /// Run one generation for an already-rendered prompt.
    ///
    /// The native engine supports a single generation in flight, so
    /// concurrent callers queue on an engine-wide lock in acquisition
    /// order; generations never interleave at the native level.
    ///
    /// Fragments are concatenated until the stream ends or a configured
    /// stop literal has appeared, then the concatenation is truncated at
    /// the earliest stop-literal occurrence and whitespace-trimmed.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotReady`] when the engine is not in the Ready
    /// state, [`EngineError::Generation`] when the backend fails
    /// mid-stream.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let state = self.state();
        if state != EngineState::Ready {
            return Err(EngineError::NotReady(state));
        }

        let stops = self.template.stop_literals();
        let _turn = self.generation.lock().await;

        let (tx, mut rx) = mpsc::channel(FRAGMENT_BUFFER);
        let model = Arc::clone(&self.model);
        let prompt = prompt.to_string();
        let producer = tokio::spawn(async move { model.generate(&prompt, tx).await });

        let mut raw = String::new();
        while let Some(fragment) = rx.recv().await {
            raw.push_str(&fragment);
            if stops.iter().any(|stop| raw.contains(stop)) {
                break;
            }
        }
        drop(rx);

        producer
            .await
            .map_err(|e| EngineError::Generation(format!("generation task failed: {e}")))??;

        let answer = trim_at_stop(&raw, stops).to_string();
        debug!(chars = answer.len(), "generation complete");
        Ok(answer)
    }
}
