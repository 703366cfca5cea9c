//! Literal phrase rewriting driven by tone guidelines
//!
//! Every `{preferred, avoid}` pair of a tone guideline becomes one
//! case-insensitive rule. Coverage is limited to registered pairs and the
//! replacement is inserted exactly as stored in the guideline.

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::knowledge::{GuidelineCategory, LanguageGuideline};

/// How an avoided phrase is located in the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Phrase must start and end on a word boundary.
    #[default]
    WordBoundary,
    /// Plain substring search. Can rewrite text inside unrelated longer
    /// words ("unlazy" -> "undisengaged").
    Substring,
}

impl std::str::FromStr for MatchMode {
    type Err = crate::error::CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word_boundary" | "word" => Ok(MatchMode::WordBoundary),
            "substring" => Ok(MatchMode::Substring),
            other => Err(crate::error::CoachError::Config {
                message: format!("unknown normalizer match mode '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone)]
struct Rewrite {
    pattern: Regex,
    preferred: String,
}

#[derive(Debug, Clone, Default)]
pub struct LanguageNormalizer {
    rewrites: Vec<Rewrite>,
}

impl LanguageNormalizer {
    /// Build rules from the tone guidelines in `guidelines`, in stored order.
    pub fn from_guidelines<'a>(
        guidelines: impl IntoIterator<Item = &'a LanguageGuideline>,
        mode: MatchMode,
    ) -> Self {
        let mut rewrites = Vec::new();
        for guideline in guidelines
            .into_iter()
            .filter(|g| g.category == GuidelineCategory::Tone)
        {
            for pair in &guideline.examples {
                let avoid: String = pair.avoid.nfc().collect();
                if avoid.trim().is_empty() {
                    continue;
                }
                match Regex::new(&pattern_for(&avoid, mode)) {
                    Ok(pattern) => rewrites.push(Rewrite {
                        pattern,
                        preferred: pair.preferred.clone(),
                    }),
                    Err(e) => tracing::warn!(
                        guideline = %guideline.id,
                        avoid = %pair.avoid,
                        "skipping unbuildable rewrite: {}",
                        e
                    ),
                }
            }
        }
        Self { rewrites }
    }

    pub fn rule_count(&self) -> usize {
        self.rewrites.len()
    }

    /// Rewrite every registered avoided phrase in `text`.
    pub fn normalize(&self, text: &str) -> String {
        let mut out: String = text.nfc().collect();
        for rewrite in &self.rewrites {
            if rewrite.pattern.is_match(&out) {
                out = rewrite
                    .pattern
                    .replace_all(&out, NoExpand(&rewrite.preferred))
                    .into_owned();
            }
        }
        out
    }
}

fn pattern_for(avoid: &str, mode: MatchMode) -> String {
    let escaped = regex::escape(avoid);
    match mode {
        MatchMode::Substring => format!("(?i){escaped}"),
        MatchMode::WordBoundary => {
            // \b only holds next to a word character; phrases that start or
            // end in punctuation keep that edge unanchored.
            let lead = if avoid.chars().next().is_some_and(is_word_char) {
                r"\b"
            } else {
                ""
            };
            let trail = if avoid.chars().last().is_some_and(is_word_char) {
                r"\b"
            } else {
                ""
            };
            format!("(?i){lead}{escaped}{trail}")
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
