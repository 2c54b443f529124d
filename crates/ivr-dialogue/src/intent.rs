//! Human-handoff detection.

use crate::config::{HandoffConfig, KeywordMatch};
use ivr_types::Intent;

/// Decides whether a turn's input asks for a human agent.
///
/// Keywords are compared against the lower-cased utterance. In
/// [`KeywordMatch::Substring`] mode a keyword may appear inside a longer
/// word, so "deshumanizado" counts as a request for "humano".
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    digit: String,
    keywords: Vec<String>,
    match_mode: KeywordMatch,
}

impl IntentClassifier {
    pub fn new(config: &HandoffConfig) -> Self {
        let keywords = config
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            digit: config.digit.trim().to_string(),
            keywords,
            match_mode: config.match_mode,
        }
    }

    pub fn classify(&self, utterance: &str, keypress: &str) -> Intent {
        if !self.digit.is_empty() && keypress.trim() == self.digit {
            return Intent::Handoff;
        }

        let text = utterance.to_lowercase();
        let hit = match self.match_mode {
            KeywordMatch::Substring => self.keywords.iter().any(|k| text.contains(k.as_str())),
            KeywordMatch::Word => text
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| self.keywords.iter().any(|k| k == word)),
        };

        if hit {
            Intent::Handoff
        } else {
            Intent::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new(&HandoffConfig::default())
    }

    #[test]
    fn handoff_digit_wins_over_text() {
        let c = classifier();
        assert_eq!(c.classify("", "0"), Intent::Handoff);
        assert_eq!(c.classify("mi router no funciona", "0"), Intent::Handoff);
        assert_eq!(c.classify("", " 0 "), Intent::Handoff);
        assert_eq!(c.classify("", "1"), Intent::Normal);
        assert_eq!(c.classify("", "00"), Intent::Normal);
    }

    #[test]
    fn keywords_are_case_folded() {
        let c = classifier();
        assert_eq!(c.classify("quiero hablar con un agente", ""), Intent::Handoff);
        assert_eq!(c.classify("Quiero un HUMANO", ""), Intent::Handoff);
        assert_eq!(c.classify("Agente, por favor", ""), Intent::Handoff);
        assert_eq!(c.classify("necesito ayuda con mi router", ""), Intent::Normal);
    }

    #[test]
    fn substring_mode_matches_inside_words() {
        let c = classifier();
        assert_eq!(c.classify("me siento deshumanizado", ""), Intent::Handoff);
    }

    #[test]
    fn word_mode_needs_whole_words() {
        let config = HandoffConfig {
            match_mode: KeywordMatch::Word,
            ..HandoffConfig::default()
        };
        let c = IntentClassifier::new(&config);
        assert_eq!(c.classify("me siento deshumanizado", ""), Intent::Normal);
        assert_eq!(c.classify("¿me pasas con un humano?", ""), Intent::Handoff);
        assert_eq!(c.classify("AGENTE.", ""), Intent::Handoff);
    }

    #[test]
    fn empty_digit_disables_keypress_handoff() {
        let config = HandoffConfig {
            digit: String::new(),
            ..HandoffConfig::default()
        };
        let c = IntentClassifier::new(&config);
        assert_eq!(c.classify("", ""), Intent::Normal);
        assert_eq!(c.classify("", "0"), Intent::Normal);
    }
}
