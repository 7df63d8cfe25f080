//! The shared translation engine for parley.
//!
//! One language model serves both participant sessions. This crate owns
//! the hazards that come with that sharing:
//!
//! - [`TranslationEngine`] -- lazy, exclusively-initialized load lifecycle
//!   (exactly one physical load no matter how many callers race) and
//!   engine-wide serialization of generations (the native engine supports
//!   a single generation in flight)
//! - [`LanguageModel`] -- the seam trait behind which the native inference
//!   backend lives
//! - [`ChatTemplate`] -- per-model-family prompt rendering and the stop
//!   literals that terminate a turn
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use parley_engine::{ChatTemplate, TranslationEngine};
//!
//! let engine = TranslationEngine::new(backend, ChatTemplate::Gemma);
//! engine.load(&weights_path).await?;
//! let answer = engine.translate("French", "English", "Bonjour").await?;
//! ```

pub mod engine;
pub mod error;
pub mod model;
pub mod prompt;

pub use engine::{EngineState, TranslationEngine};
pub use error::{EngineError, Result};
pub use model::LanguageModel;
pub use prompt::{ChatTemplate, trim_at_stop};
