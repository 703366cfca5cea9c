//! Parent-facing family letters in English and Spanish
//!
//! The rich path fills a per-locale letter skeleton from a behavior log
//! (and the structured response stored on it, when there is one). Any
//! failure on that path degrades to a short deterministic letter built
//! from local fields only; callers always get a non-empty script.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::context::{ChildRef, Severity, TimeOfDay, tags};
use crate::error::{CoachError, Result};
use crate::language::LanguageNormalizer;
use crate::pipeline::{GeneratedResponse, SectionKey};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Spanish => "spanish",
        }
    }

    fn locale(&self) -> &'static Locale {
        match self {
            Language::English => &ENGLISH,
            Language::Spanish => &SPANISH,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = CoachError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "spanish" | "es" | "español" | "espanol" => Ok(Language::Spanish),
            other => Err(CoachError::Validation {
                message: format!("unsupported language '{other}' (english or spanish)"),
            }),
        }
    }
}

/// A recorded observation, as the persistence layer hands it over.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorLog {
    pub description: String,
    #[serde(default)]
    pub context_tag: Option<String>,
    #[serde(default)]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub strategies_used: Vec<String>,
    #[serde(default)]
    pub logged_on: Option<NaiveDate>,
    /// Structured response generated for this log, if any
    #[serde(default)]
    pub response: Option<GeneratedResponse>,
}

struct Locale {
    greeting: &'static str,
    default_parent: &'static str,
    default_child: &'static str,
    today: &'static str,
    context_phrases: &'static [(&'static str, &'static str)],
    generic_context: &'static str,
    emotion_rules: &'static [(&'static [&'static str], &'static str)],
    default_emotion: &'static str,
    skeleton: &'static str,
    observation: &'static str,
    observation_unknown: &'static str,
    feeling: &'static str,
    response_default: &'static str,
    response_listed: &'static str,
    meaning: &'static str,
    strengths: &'static str,
    home: &'static str,
    looking_ahead: &'static str,
    notes: &'static str,
    signature: &'static str,
    fallback: &'static str,
}

impl Locale {
    fn context_phrase(&self, tag: Option<&str>) -> &'static str {
        tag.and_then(|t| {
            self.context_phrases
                .iter()
                .find(|(key, _)| *key == t)
                .map(|(_, phrase)| *phrase)
        })
        .unwrap_or(self.generic_context)
    }

    /// Keywords are stems matched at the start of a word ("hit" matches
    /// "hitting" but not "white").
    fn emotion(&self, description: &str) -> &'static str {
        let lowered = description.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        self.emotion_rules
            .iter()
            .find(|(keywords, _)| {
                keywords
                    .iter()
                    .any(|k| words.iter().any(|w| w.starts_with(k)))
            })
            .map(|(_, word)| *word)
            .unwrap_or(self.default_emotion)
    }
}

const EN_SKELETON: &str = "{greeting} {parent},\nI wanted to share a moment with {child} {when} while we were {context}.\n\n{observation}\n\n{feeling}\n\n{response}\n\n{meaning}\n\n{strengths}\n\n{home}\n\n{looking_ahead}{notes}\n\nPlease reach out anytime with questions or ideas.\n\nWarmly,\n{signature}";

const ES_SKELETON: &str = "{greeting} {parent},\nQuería compartir un momento con {child} {when} mientras estábamos {context}.\n\n{observation}\n\n{feeling}\n\n{response}\n\n{meaning}\n\n{strengths}\n\n{home}\n\n{looking_ahead}{notes}\n\nNo dude en escribirme con cualquier pregunta o idea.\n\nCon cariño,\n{signature}";

static ENGLISH: Locale = Locale {
    greeting: "Hi",
    default_parent: "there",
    default_child: "your child",
    today: "today",
    context_phrases: &[
        (tags::TRANSITION, "moving between activities"),
        (tags::CIRCLE_TIME, "gathered for circle time"),
        (tags::MEAL_TIME, "eating together"),
        (tags::NAP_TIME, "getting ready for rest"),
        (tags::DROP_OFF, "saying goodbye at drop-off"),
        (tags::PICKUP, "getting ready to go home"),
        (tags::OUTDOOR_PLAY, "playing outside"),
        (tags::CLEANUP, "cleaning up"),
        (tags::GROUP_WORK, "working in a small group"),
        (tags::FREE_PLAY, "enjoying free play"),
    ],
    generic_context: "spending time together in class",
    emotion_rules: &[
        (&["meltdown", "overwhelm", "scream", "chaotic", "tantrum"], "overwhelmed"),
        (&["frustrat", "angry", "hit", "threw", "kick"], "frustrated"),
        (&["cry", "cried", "sad", "tears"], "sad"),
        (&["scared", "afraid", "anxious", "worried", "nervous", "separation"], "worried"),
    ],
    default_emotion: "some big feelings",
    skeleton: EN_SKELETON,
    observation: "Here is what we noticed: {description}",
    observation_unknown: "{child} had a hard moment and needed some extra support.",
    feeling: "It looked like {child} was feeling {emotion}, which is a completely normal part of growing up.",
    response_default: "We stayed close, helped {child} calm down, and talked about what happened once things felt better.",
    response_listed: "Here is how we supported {child}: {strategies}.",
    meaning: "Moments like this are how children practice handling big feelings, and each one is a chance to grow.",
    strengths: "{child} brings so much to our classroom, and we see real strengths every day.",
    home: "Something you might try at home: name feelings out loud together during calm moments, like \"You look excited!\" or \"That was frustrating.\"",
    looking_ahead: "We'll keep using these strategies in class and will let you know how things go.",
    notes: "\n\nA note from me: {notes}",
    signature: "Your child's teacher",
    fallback: "Hi {parent},\n\nToday {child} had a challenging moment while we were {context}. We supported {child} with patience and care, and we'll keep working on it together.\n\nWarmly,\n{signature}",
};

static SPANISH: Locale = Locale {
    greeting: "Hola",
    default_parent: "familia",
    default_child: "su hijo/a",
    today: "hoy",
    context_phrases: &[
        (tags::TRANSITION, "cambiando de actividad"),
        (tags::CIRCLE_TIME, "reunidos en el círculo"),
        (tags::MEAL_TIME, "comiendo juntos"),
        (tags::NAP_TIME, "preparándonos para descansar"),
        (tags::DROP_OFF, "despidiéndonos a la llegada"),
        (tags::PICKUP, "preparándonos para ir a casa"),
        (tags::OUTDOOR_PLAY, "jugando afuera"),
        (tags::CLEANUP, "recogiendo el salón"),
        (tags::GROUP_WORK, "trabajando en grupo pequeño"),
        (tags::FREE_PLAY, "en el juego libre"),
    ],
    generic_context: "compartiendo tiempo en clase",
    emotion_rules: &[
        (
            &["meltdown", "overwhelm", "scream", "chaotic", "tantrum", "berrinche", "grit"],
            "mucho agobio",
        ),
        (
            &["frustrat", "angry", "hit", "threw", "kick", "enoj", "golpe"],
            "mucha frustración",
        ),
        (&["cry", "cried", "sad", "tears", "llor", "triste"], "mucha tristeza"),
        (
            &["scared", "afraid", "anxious", "worried", "nervous", "miedo", "preocup"],
            "mucha preocupación",
        ),
    ],
    default_emotion: "emociones muy grandes",
    skeleton: ES_SKELETON,
    observation: "Esto es lo que observamos: {description}",
    observation_unknown: "{child} tuvo un momento difícil y necesitó un poco más de apoyo.",
    feeling: "Parecía que {child} estaba sintiendo {emotion}, algo completamente normal mientras crecen.",
    response_default: "Nos quedamos cerca, ayudamos a {child} a calmarse y hablamos de lo que pasó cuando se sintió mejor.",
    response_listed: "Así acompañamos a {child}: {strategies}.",
    meaning: "Momentos como este son la manera en que los niños practican cómo manejar sus emociones, y cada uno es una oportunidad para crecer.",
    strengths: "{child} aporta mucho a nuestra clase, y vemos sus fortalezas todos los días.",
    home: "Algo que podrían probar en casa: nombrar las emociones en voz alta en momentos tranquilos, como \"¡Te ves emocionado!\" o \"Eso fue frustrante.\"",
    looking_ahead: "Seguiremos usando estas estrategias en clase y les contaré cómo va todo.",
    notes: "\n\nUna nota de mi parte: {notes}",
    signature: "El equipo de la clase",
    fallback: "Hola {parent},\n\nHoy {child} tuvo un momento difícil mientras estábamos {context}. Lo acompañamos con paciencia y cariño, y seguiremos trabajando juntos.\n\nCon cariño,\n{signature}",
};

/// Uppercase the first character; `{child}` may open a sentence with
/// "your child" or "su hijo/a".
fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex should compile"));

/// Substitute every `{name}`; an unknown name is a generation failure.
/// Values are inserted verbatim and never re-scanned.
fn render(template: &str, values: &HashMap<&str, String>) -> Result<String> {
    if let Some(missing) = PLACEHOLDER
        .captures_iter(template)
        .map(|c| c.get(1).map_or("", |m| m.as_str()))
        .find(|name| !values.contains_key(name))
    {
        return Err(CoachError::generation(format!(
            "unresolved placeholder '{{{missing}}}'"
        )));
    }
    Ok(PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            caps.get(1)
                .and_then(|m| values.get(m.as_str()))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned())
}

/// Builds family letters. Holds optional per-locale skeleton overrides and
/// a signature line.
#[derive(Debug, Clone, Default)]
pub struct FamilyScriptGenerator {
    skeletons: HashMap<Language, String>,
    signature: Option<String>,
}

impl FamilyScriptGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        let signature = signature.into();
        if !signature.trim().is_empty() {
            self.signature = Some(signature);
        }
        self
    }

    /// Replace the letter skeleton for `language`. Placeholders: greeting,
    /// parent, child, when, context, observation, feeling, response,
    /// meaning, strengths, home, looking_ahead, notes, signature.
    pub fn with_skeleton(mut self, language: Language, skeleton: impl Into<String>) -> Self {
        self.skeletons.insert(language, skeleton.into());
        self
    }

    /// Always returns a non-empty letter opening with the locale greeting.
    pub fn generate(
        &self,
        child: Option<&ChildRef>,
        log: Option<&BehaviorLog>,
        parent_name: &str,
        language: Language,
        notes: Option<&str>,
        normalizer: &LanguageNormalizer,
    ) -> String {
        let synthesized;
        let log = match log {
            Some(log) => log,
            None => {
                synthesized = BehaviorLog::default();
                &synthesized
            }
        };

        match self.generate_rich(child, log, parent_name, language, notes, normalizer) {
            Ok(script) => script,
            Err(e) => {
                tracing::warn!(%language, "family script falling back to simple template: {}", e);
                self.generate_fallback(child, log, parent_name, language)
            }
        }
    }

    fn names(
        &self,
        child: Option<&ChildRef>,
        parent_name: &str,
        locale: &Locale,
    ) -> (String, String, String) {
        let child_name = child
            .map(|c| c.name.trim())
            .filter(|n| !n.is_empty())
            .unwrap_or(locale.default_child)
            .to_string();
        let parent = match parent_name.trim() {
            "" => locale.default_parent.to_string(),
            name => name.to_string(),
        };
        let signature = self
            .signature
            .clone()
            .unwrap_or_else(|| locale.signature.to_string());
        (child_name, parent, signature)
    }

    fn generate_rich(
        &self,
        child: Option<&ChildRef>,
        log: &BehaviorLog,
        parent_name: &str,
        language: Language,
        notes: Option<&str>,
        normalizer: &LanguageNormalizer,
    ) -> Result<String> {
        let locale = language.locale();
        let (child_name, parent, signature) = self.names(child, parent_name, locale);
        let with_child = |text: &str| text.replace("{child}", &child_name);

        // Stored responses and logged strategies are English prose; other
        // locales keep their own phrasing. Only the parent-readable parts of
        // a stored response are used, inside the locale's own framing.
        let prior = log
            .response
            .as_ref()
            .filter(|_| language == Language::English);
        let prior_section = |key: SectionKey| -> Result<Option<String>> {
            let Some(response) = prior else {
                return Ok(None);
            };
            match response.section(key) {
                Some(text) if !text.trim().is_empty() => Ok(Some(text.to_string())),
                _ => Err(CoachError::generation(format!(
                    "stored response is missing section '{}'",
                    key.as_str()
                ))),
            }
        };

        let description = normalizer.normalize(log.description.trim());
        let observation = if description.is_empty() {
            upper_first(&with_child(locale.observation_unknown))
        } else {
            locale.observation.replace("{description}", &description)
        };

        let feeling = with_child(locale.feeling).replace("{emotion}", locale.emotion(&log.description));

        let stored_strategies: Vec<String> = match prior_section(SectionKey::PracticalStrategies)? {
            Some(_) => prior
                .map(|r| r.practical_strategies.iter().take(2).cloned().collect())
                .unwrap_or_default(),
            None => Vec::new(),
        };
        let strategies: Vec<String> = if language != Language::English {
            Vec::new()
        } else if !log.strategies_used.is_empty() {
            log.strategies_used
                .iter()
                .map(|s| normalizer.normalize(s.trim()))
                .filter(|s| !s.is_empty())
                .collect()
        } else {
            stored_strategies
        };
        let response = if strategies.is_empty() {
            with_child(locale.response_default)
        } else {
            with_child(locale.response_listed).replace(
                "{strategies}",
                &strategies
                    .iter()
                    .map(|s| s.trim_end_matches('.'))
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        };

        let looking_ahead = match prior_section(SectionKey::FutureReadinessBenefit)? {
            Some(benefit) => format!("{} {}", locale.looking_ahead, benefit.trim()),
            None => locale.looking_ahead.to_string(),
        };

        let notes_block = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| locale.notes.replace("{notes}", &normalizer.normalize(n)))
            .unwrap_or_default();

        let when = match (log.logged_on, language) {
            (None, _) => locale.today.to_string(),
            (Some(date), Language::English) => date.format("on %B %-d").to_string(),
            (Some(date), Language::Spanish) => date.format("el %-d/%-m/%Y").to_string(),
        };

        let values: HashMap<&str, String> = HashMap::from([
            ("greeting", locale.greeting.to_string()),
            ("parent", parent),
            ("child", child_name.clone()),
            ("when", when),
            (
                "context",
                locale.context_phrase(log.context_tag.as_deref()).to_string(),
            ),
            ("observation", observation),
            ("feeling", feeling),
            ("response", response),
            ("meaning", locale.meaning.to_string()),
            ("strengths", upper_first(&with_child(locale.strengths))),
            ("home", locale.home.to_string()),
            ("looking_ahead", looking_ahead),
            ("notes", notes_block),
            ("signature", signature),
        ]);

        let skeleton = self
            .skeletons
            .get(&language)
            .map(String::as_str)
            .unwrap_or(locale.skeleton);
        let script = render(skeleton, &values)?;

        if !script.starts_with(locale.greeting) {
            return Err(CoachError::generation(format!(
                "letter does not open with '{}'",
                locale.greeting
            )));
        }
        Ok(script)
    }

    /// Plain letter from local fields only. Cannot fail.
    fn generate_fallback(
        &self,
        child: Option<&ChildRef>,
        log: &BehaviorLog,
        parent_name: &str,
        language: Language,
    ) -> String {
        let locale = language.locale();
        let (child_name, parent, signature) = self.names(child, parent_name, locale);
        locale
            .fallback
            .replace("{parent}", &parent)
            .replace("{child}", &child_name)
            .replace("{context}", locale.context_phrase(log.context_tag.as_deref()))
            .replace("{signature}", &signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use crate::language::MatchMode;

    fn normalizer() -> LanguageNormalizer {
        let kb = KnowledgeBase::seeded();
        let snapshot = kb.snapshot();
        LanguageNormalizer::from_guidelines(&snapshot.guidelines, MatchMode::WordBoundary)
    }

    fn meal_log() -> BehaviorLog {
        BehaviorLog {
            description: "Threw his spoon and cried at lunch".into(),
            context_tag: Some("meal_time".into()),
            ..Default::default()
        }
    }

    #[test]
    fn spanish_meal_time_letter() {
        let script = FamilyScriptGenerator::new().generate(
            Some(&ChildRef::named("Mateo")),
            Some(&meal_log()),
            "Ana",
            Language::Spanish,
            None,
            &normalizer(),
        );
        assert!(script.starts_with("Hola"));
        let first = script.split("\n\n").next().unwrap();
        assert!(first.contains("comiendo juntos"), "{first}");
    }

    #[test]
    fn english_letter_uses_locale_phrase_and_emotion() {
        let script = FamilyScriptGenerator::new().generate(
            Some(&ChildRef::named("Mateo")),
            Some(&meal_log()),
            "Ana",
            Language::English,
            Some("He loved the new song today."),
            &normalizer(),
        );
        assert!(script.starts_with("Hi Ana,"));
        assert!(script.contains("eating together"));
        assert!(script.contains("Mateo was feeling frustrated"));
        assert!(script.contains("A note from me: He loved the new song today."));
    }

    #[test]
    fn unmapped_context_uses_generic_phrase() {
        let log = BehaviorLog {
            context_tag: Some("field_trip".into()),
            ..Default::default()
        };
        let script = FamilyScriptGenerator::new().generate(
            None,
            Some(&log),
            "",
            Language::English,
            None,
            &normalizer(),
        );
        assert!(script.starts_with("Hi there,"));
        assert!(script.contains("spending time together in class"));
        assert!(script.contains("your child"));
    }

    #[test]
    fn default_child_is_capitalized_at_sentence_start() {
        let en = FamilyScriptGenerator::new().generate(
            None,
            None,
            "",
            Language::English,
            None,
            &normalizer(),
        );
        assert!(en.contains("\n\nYour child brings so much"), "{en}");
        assert!(en.contains("\n\nYour child had a hard moment"), "{en}");
        assert!(!en.contains("\n\nyour child"));

        let es = FamilyScriptGenerator::new().generate(
            None,
            None,
            "",
            Language::Spanish,
            None,
            &normalizer(),
        );
        assert!(es.contains("\n\nSu hijo/a aporta mucho"), "{es}");
        assert!(!es.contains("\n\nsu hijo/a"));
    }

    #[test]
    fn emotion_keywords_match_whole_word_starts() {
        let locale = Language::English.locale();
        assert_eq!(locale.emotion("Drew a white house and made a card"), "some big feelings");
        assert_eq!(locale.emotion("Kept hitting the table"), "frustrated");
        assert_eq!(locale.emotion("Threw his spoon"), "frustrated");
        assert_eq!(Language::Spanish.locale().emotion("Lloró mucho"), "mucha tristeza");
    }

    #[test]
    fn missing_log_is_synthesized() {
        let script = FamilyScriptGenerator::new().generate(
            None,
            None,
            "Sam",
            Language::Spanish,
            None,
            &normalizer(),
        );
        assert!(script.starts_with("Hola Sam"));
        assert!(script.contains("emociones muy grandes"));
    }

    #[test]
    fn bad_skeleton_falls_back_to_simple_letter() {
        let generator = FamilyScriptGenerator::new()
            .with_skeleton(Language::English, "{greeting} {parent}, {unknown_block}");
        let script = generator.generate(
            Some(&ChildRef::named("Ivy")),
            Some(&meal_log()),
            "Jo",
            Language::English,
            None,
            &normalizer(),
        );
        assert!(script.starts_with("Hi Jo,"));
        assert!(script.contains("Today Ivy had a challenging moment while we were eating together."));
    }

    #[test]
    fn echoed_description_is_normalized() {
        let log = BehaviorLog {
            description: "He was naughty at snack".into(),
            ..Default::default()
        };
        let script = FamilyScriptGenerator::new().generate(
            None,
            Some(&log),
            "Lee",
            Language::English,
            None,
            &normalizer(),
        );
        assert!(!script.to_lowercase().contains("naughty"));
        assert!(script.contains("He was struggling at snack"));
    }

    #[test]
    fn dated_log_names_the_day() {
        let log = BehaviorLog {
            logged_on: NaiveDate::from_ymd_opt(2026, 3, 4),
            ..Default::default()
        };
        let en = FamilyScriptGenerator::new().generate(
            None,
            Some(&log),
            "Lee",
            Language::English,
            None,
            &normalizer(),
        );
        assert!(en.contains("on March 4"));
        let es = FamilyScriptGenerator::new().generate(
            None,
            Some(&log),
            "Lee",
            Language::Spanish,
            None,
            &normalizer(),
        );
        assert!(es.contains("el 4/3/2026"));
    }

    #[test]
    fn render_rejects_unknown_placeholder() {
        let values = HashMap::from([("a", "1".to_string())]);
        assert_eq!(render("{a}", &values).unwrap(), "1");
        assert!(render("{a}{b}", &values).is_err());
    }

    #[test]
    fn language_parses_common_spellings() {
        assert_eq!("ES".parse::<Language>().unwrap(), Language::Spanish);
        assert_eq!("english".parse::<Language>().unwrap(), Language::English);
        assert!("klingon".parse::<Language>().is_err());
    }
}
