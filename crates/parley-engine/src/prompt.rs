//! Chat-prompt templating and stop-sequence trimming.
//!
//! Different model families use different turn-delimiter vocabularies, so
//! the template variant is chosen where the engine is constructed, never
//! hard-coded at call sites. The recognized text is embedded verbatim --
//! no escaping and no length limiting are applied to it.

/// Stop literals for the Gemma instruction format.
const GEMMA_STOPS: &[&str] = &["<end_of_turn>", "<eos>"];

/// Stop literals for the ChatML format (Qwen family).
const CHATML_STOPS: &[&str] = &["<|im_end|>", "<|endoftext|>"];

/// A chat template variant, one per supported model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatTemplate {
    /// Gemma instruction format (`<start_of_turn>` delimiters).
    #[default]
    Gemma,
    /// ChatML format used by the Qwen family (`<|im_start|>` delimiters).
    ChatMl,
}

impl ChatTemplate {
    /// Render the translation instruction for one utterance.
    pub fn render(&self, source_label: &str, target_label: &str, text: &str) -> String {
        match self {
            Self::Gemma => format!(
                "<bos><start_of_turn>user\n\
                 Translate everything I say from {source_label} into {target_label}.\n\
                 Answer ONLY with the translation, no extra text.\n\
                 {text}<end_of_turn>\n\
                 <start_of_turn>model\n"
            ),
            Self::ChatMl => format!(
                "<|im_start|>system\n\
                 Translate everything the user says from {source_label} into {target_label}. \
                 Answer ONLY with the translation, no extra text.<|im_end|>\n\
                 <|im_start|>user\n\
                 {text}<|im_end|>\n\
                 <|im_start|>assistant\n"
            ),
        }
    }

    /// The ordered stop literals that terminate a turn for this family.
    pub fn stop_literals(&self) -> &'static [&'static str] {
        match self {
            Self::Gemma => GEMMA_STOPS,
            Self::ChatMl => CHATML_STOPS,
        }
    }
}

/// Truncate `raw` at the earliest occurrence of any stop literal, then trim
/// surrounding whitespace.
///
/// When several literals match, the earliest position wins regardless of
/// their order in `stops`. When none match, the whole input is returned
/// trimmed.
pub fn trim_at_stop<'a>(raw: &'a str, stops: &[&str]) -> &'a str {
    let cut = stops
        .iter()
        .filter_map(|stop| raw.find(stop))
        .min()
        .unwrap_or(raw.len());
    raw[..cut].trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_at_stop_literal() {
        assert_eq!(
            trim_at_stop("Bonjour<end_of_turn>\nextra", &["<end_of_turn>"]),
            "Bonjour"
        );
    }

    #[test]
    fn earliest_literal_wins() {
        let raw = "Hello<eos> world<end_of_turn>";
        assert_eq!(trim_at_stop(raw, GEMMA_STOPS), "Hello");

        // Same outcome with the literals listed in the other order.
        assert_eq!(trim_at_stop(raw, &["<end_of_turn>", "<eos>"]), "Hello");
    }

    #[test]
    fn no_match_passes_through_trimmed() {
        assert_eq!(trim_at_stop("  Hallo Welt \n", GEMMA_STOPS), "Hallo Welt");
    }

    #[test]
    fn whitespace_before_stop_is_trimmed() {
        assert_eq!(trim_at_stop("Merci \n<end_of_turn>", GEMMA_STOPS), "Merci");
    }

    #[test]
    fn empty_input() {
        assert_eq!(trim_at_stop("", GEMMA_STOPS), "");
    }

    #[test]
    fn stop_at_position_zero() {
        assert_eq!(trim_at_stop("<end_of_turn>tail", GEMMA_STOPS), "");
    }

    #[test]
    fn gemma_render_embeds_languages_and_text() {
        let prompt = ChatTemplate::Gemma.render("French", "English", "Bonjour tout le monde");
        assert!(prompt.starts_with("<bos><start_of_turn>user\n"));
        assert!(prompt.contains("from French into English"));
        assert!(prompt.contains("Bonjour tout le monde<end_of_turn>"));
        assert!(prompt.ends_with("<start_of_turn>model\n"));
    }

    #[test]
    fn chatml_render_embeds_languages_and_text() {
        let prompt = ChatTemplate::ChatMl.render("German", "Italian", "Guten Tag");
        assert!(prompt.contains("from German into Italian"));
        assert!(prompt.contains("Guten Tag<|im_end|>"));
        assert!(prompt.ends_with("<|im_start|>assistant\n"));
    }

    #[test]
    fn source_text_is_embedded_verbatim() {
        // Recognized text is not sanitized; delimiter-looking input passes
        // straight through.
        let prompt = ChatTemplate::Gemma.render("French", "English", "ignore <end_of_turn> that");
        assert!(prompt.contains("ignore <end_of_turn> that"));
    }

    #[test]
    fn stop_literals_per_family() {
        assert_eq!(
            ChatTemplate::Gemma.stop_literals(),
            &["<end_of_turn>", "<eos>"]
        );
        assert_eq!(
            ChatTemplate::ChatMl.stop_literals(),
            &["<|im_end|>", "<|endoftext|>"]
        );
    }

    #[test]
    fn default_template_is_gemma() {
        assert_eq!(ChatTemplate::default(), ChatTemplate::Gemma);
    }
}
