//! The language and model-asset catalog.
//!
//! Pure data: each supported language carries a display label, a BCP-47
//! locale tag, and the recognizer model archive that must be materialized
//! before that language can be captured. The catalog is fixed -- languages
//! are added here, not discovered at runtime.

use serde::{Deserialize, Serialize};

/// A downloadable model asset: what the provisioner must materialize.
///
/// The asset's lifecycle (absent, downloading, present, extracted) is owned
/// entirely by `parley-assets`; this descriptor only identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAsset {
    /// Base name of the asset, without the source URI's extension.
    pub file_name: String,

    /// Where the asset is fetched from when absent.
    pub source_url: String,
}

impl ModelAsset {
    /// Create an asset descriptor.
    pub fn new(file_name: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            source_url: source_url.into(),
        }
    }

    /// The extension of the source URI, or `""` when it has none.
    ///
    /// Archive extensions (`zip`) tell the provisioner to extract the
    /// download instead of using it directly.
    pub fn uri_extension(&self) -> &str {
        self.source_url
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("")
    }
}

/// A supported language: display label, locale, and recognizer model.
///
/// Immutable, drawn from the fixed catalog below. The `label` is what the
/// translation prompt names the language by; the `locale` is what speech
/// synthesis is initialized with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Human-readable name, e.g. `"French"`.
    pub label: String,

    /// BCP-47 locale tag, e.g. `"fr-FR"`.
    pub locale: String,

    /// The recognizer model archive for this language.
    pub asset: ModelAsset,
}

impl Language {
    fn new(label: &str, locale: &str, file_name: &str, source_url: &str) -> Self {
        Self {
            label: label.to_string(),
            locale: locale.to_string(),
            asset: ModelAsset::new(file_name, source_url),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

pub fn english() -> Language {
    Language::new(
        "English",
        "en-US",
        "vosk-model-small-en-us-0.15",
        "https://alphacephei.com/vosk/models/vosk-model-small-en-us-0.15.zip",
    )
}

pub fn french() -> Language {
    Language::new(
        "French",
        "fr-FR",
        "vosk-model-small-fr-0.22",
        "https://alphacephei.com/vosk/models/vosk-model-small-fr-0.22.zip",
    )
}

pub fn german() -> Language {
    Language::new(
        "German",
        "de-DE",
        "vosk-model-small-de-0.15",
        "https://alphacephei.com/vosk/models/vosk-model-small-de-0.15.zip",
    )
}

pub fn italian() -> Language {
    Language::new(
        "Italian",
        "it-IT",
        "vosk-model-small-it-0.22",
        "https://alphacephei.com/vosk/models/vosk-model-it-0.22.zip",
    )
}

pub fn turkish() -> Language {
    Language::new(
        "Turkish",
        "tr",
        "vosk-model-small-tr-0.3",
        "https://alphacephei.com/vosk/models/vosk-model-small-tr-0.3.zip",
    )
}

pub fn arabic() -> Language {
    Language::new(
        "Arabic",
        "ar",
        "vosk-model-ar-mgb2-0.4",
        "https://alphacephei.com/vosk/models/vosk-model-ar-mgb2-0.4.zip",
    )
}

/// Every language the application supports, in display order.
pub fn all() -> Vec<Language> {
    vec![english(), french(), german(), italian(), turkish(), arabic()]
}

/// Translation-model weight files known to the application.
pub mod weights {
    use super::ModelAsset;

    pub fn gemma3_1b_q4() -> ModelAsset {
        ModelAsset::new(
            "gemma-3-1b-it-Q4_K_M.gguf",
            "https://huggingface.co/ggml-org/gemma-3-1b-it-GGUF/resolve/main/gemma-3-1b-it-Q4_K_M.gguf",
        )
    }

    pub fn gemma3_4b_q8() -> ModelAsset {
        ModelAsset::new(
            "gemma-3-4b-it-Q8_0.gguf",
            "https://huggingface.co/ggml-org/gemma-3-4b-it-GGUF/resolve/main/gemma-3-4b-it-Q8_0.gguf",
        )
    }

    pub fn gemma3n_4b_q8() -> ModelAsset {
        ModelAsset::new(
            "gemma-3n-E2B-it-Q8_0.gguf",
            "https://huggingface.co/ggml-org/gemma-3n-E2B-it-GGUF/resolve/main/gemma-3n-E2B-it-Q8_0.gguf",
        )
    }

    pub fn qwen3_4b_q8() -> ModelAsset {
        ModelAsset::new(
            "Qwen3-4B-Q8_0.gguf",
            "https://huggingface.co/ggml-org/Qwen3-4B-GGUF/resolve/main/Qwen3-4B-Q8_0.gguf",
        )
    }

    /// The weights the application loads by default.
    pub fn default_weights() -> ModelAsset {
        gemma3_4b_q8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_six_languages() {
        let langs = all();
        assert_eq!(langs.len(), 6);
        let labels: Vec<_> = langs.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["English", "French", "German", "Italian", "Turkish", "Arabic"]
        );
    }

    #[test]
    fn recognizer_assets_are_zip_archives() {
        for lang in all() {
            assert_eq!(
                lang.asset.uri_extension(),
                "zip",
                "{} model is not a zip archive",
                lang.label
            );
        }
    }

    #[test]
    fn uri_extension_of_weights_is_gguf() {
        assert_eq!(weights::default_weights().uri_extension(), "gguf");
        assert_eq!(weights::qwen3_4b_q8().uri_extension(), "gguf");
    }

    #[test]
    fn uri_extension_missing() {
        let asset = ModelAsset::new("plain", "https://example");
        assert_eq!(asset.uri_extension(), "");
    }

    #[test]
    fn language_display_is_label() {
        assert_eq!(french().to_string(), "French");
    }

    #[test]
    fn language_serde_roundtrip() {
        let lang = german();
        let json = serde_json::to_string(&lang).unwrap();
        let restored: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, lang);
    }

    #[test]
    fn model_asset_serde_roundtrip() {
        let asset = weights::gemma3_1b_q4();
        let json = serde_json::to_string(&asset).unwrap();
        let restored: ModelAsset = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, asset);
    }
}
