//! Context inference from free-text observations
//!
//! Each target field owns an ordered rule table. For a given field the
//! first rule (in table order) with any keyword found as a substring of
//! the lowercased text wins; fields with no matching rule stay unset.
//! Fields are evaluated independently, so one keyword may feed several
//! fields ("frustrated" sets both severity and emotional state).

use serde::{Deserialize, Serialize};

use super::tags;
use super::types::{EmotionalState, Severity, TimeOfDay};

/// One row of a rule table: any keyword present selects `value`.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<T: 'static> {
    pub keywords: &'static [&'static str],
    pub value: T,
}

/// Fields the parser can infer. All optional; unmatched means unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferredFields {
    pub context_tag: Option<String>,
    pub time_of_day: Option<TimeOfDay>,
    pub severity: Option<Severity>,
    pub emotional_state: Option<EmotionalState>,
}

/// Situational context. Transition sits first so "transition to cleanup"
/// resolves to the transition rather than the destination activity.
pub const CONTEXT_RULES: &[KeywordRule<&str>] = &[
    KeywordRule {
        keywords: &[
            "transition",
            "switching activities",
            "moving from",
            "moving to",
            "lining up",
            "line up",
        ],
        value: tags::TRANSITION,
    },
    KeywordRule {
        keywords: &[
            "circle time",
            "circle",
            "morning meeting",
            "carpet time",
            "story time",
            "storytime",
        ],
        value: tags::CIRCLE_TIME,
    },
    KeywordRule {
        keywords: &["meal", "lunch", "snack", "breakfast", "eating"],
        value: tags::MEAL_TIME,
    },
    KeywordRule {
        keywords: &["nap time", "naptime", "during nap", "at nap", "rest time", "quiet time"],
        value: tags::NAP_TIME,
    },
    KeywordRule {
        keywords: &["drop-off", "drop off", "dropoff", "arrival", "separation"],
        value: tags::DROP_OFF,
    },
    KeywordRule {
        keywords: &["pickup", "pick-up", "pick up", "dismissal"],
        value: tags::PICKUP,
    },
    KeywordRule {
        keywords: &["playground", "outside", "outdoor", "recess"],
        value: tags::OUTDOOR_PLAY,
    },
    KeywordRule {
        keywords: &["clean up", "cleanup", "clean-up", "tidy"],
        value: tags::CLEANUP,
    },
    KeywordRule {
        keywords: &["small group", "group work", "table work", "worksheet"],
        value: tags::GROUP_WORK,
    },
    KeywordRule {
        keywords: &["free play", "free choice", "centers", "block area", "dramatic play"],
        value: tags::FREE_PLAY,
    },
];

/// Time of day. Compound phrases ("after lunch") precede the single words
/// they contain.
pub const TIME_OF_DAY_RULES: &[KeywordRule<TimeOfDay>] = &[
    KeywordRule {
        keywords: &[
            "end of the day",
            "end of day",
            "pickup",
            "pick-up",
            "pick up",
            "dismissal",
            "going home",
            "evening",
        ],
        value: TimeOfDay::EndOfDay,
    },
    KeywordRule {
        keywords: &["afternoon", "after nap", "after lunch"],
        value: TimeOfDay::Afternoon,
    },
    KeywordRule {
        keywords: &["lunch", "noon", "midday"],
        value: TimeOfDay::Midday,
    },
    KeywordRule {
        keywords: &["morning", "breakfast", "arrival", "drop-off", "drop off"],
        value: TimeOfDay::Morning,
    },
];

/// Severity, most severe tier first.
pub const SEVERITY_RULES: &[KeywordRule<Severity>] = &[
    KeywordRule {
        keywords: &[
            "meltdown",
            "melt down",
            "hitting",
            "hit ",
            "biting",
            "kicking",
            "kicked",
            "threw",
            "throwing",
            "chaotic",
            "chaos",
            "screaming",
            "screamed",
            "unsafe",
            "hurt",
            "out of control",
            "tantrum",
            "aggressive",
            "ran away",
            "eloped",
        ],
        value: Severity::High,
    },
    KeywordRule {
        keywords: &[
            "frustrated",
            "upset",
            "crying",
            "cried",
            "refused",
            "refusing",
            "pushed",
            "pushing",
            "grabbed",
            "grabbing",
            "yelled",
            "yelling",
            "difficult",
            "struggled",
            "struggling",
            "wouldn't",
        ],
        value: Severity::Medium,
    },
    KeywordRule {
        keywords: &[
            "fidget",
            "distracted",
            "restless",
            "wiggly",
            "whining",
            "whined",
            "minor",
            "a little",
            "off task",
            "off-task",
            "silly",
        ],
        value: Severity::Low,
    },
];

/// Reporter emotional state.
pub const EMOTIONAL_STATE_RULES: &[KeywordRule<EmotionalState>] = &[
    KeywordRule {
        keywords: &["frustrated", "frustrating", "annoyed", "angry"],
        value: EmotionalState::Frustrated,
    },
    KeywordRule {
        keywords: &["overwhelmed", "chaotic", "too much", "at a loss"],
        value: EmotionalState::Overwhelmed,
    },
    KeywordRule {
        keywords: &["worried", "concerned", "anxious", "nervous"],
        value: EmotionalState::Worried,
    },
    KeywordRule {
        keywords: &["exhausted", "tired", "drained", "burned out", "burnt out"],
        value: EmotionalState::Exhausted,
    },
    KeywordRule {
        keywords: &["sad", "heartbroken", "discouraged"],
        value: EmotionalState::Sad,
    },
    KeywordRule {
        keywords: &["hopeful", "improving", "progress"],
        value: EmotionalState::Hopeful,
    },
];

/// Evaluate one rule table against already-lowercased text.
pub fn first_match<T: Copy>(lowered: &str, rules: &[KeywordRule<T>]) -> Option<T> {
    rules
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
        .map(|rule| rule.value)
}

/// Infer structured fields from a free-text description.
///
/// Pure and idempotent: identical text always yields identical fields.
///
/// # Examples
/// ```
/// use coach_engine::context::{parse_description, Severity, TimeOfDay};
///
/// let fields = parse_description("Child had a meltdown during circle time this morning");
/// assert_eq!(fields.severity, Some(Severity::High));
/// assert_eq!(fields.context_tag.as_deref(), Some("circle_time"));
/// assert_eq!(fields.time_of_day, Some(TimeOfDay::Morning));
/// ```
pub fn parse_description(text: &str) -> InferredFields {
    let lowered = text.to_lowercase();

    let inferred = InferredFields {
        context_tag: first_match(&lowered, CONTEXT_RULES).map(str::to_string),
        time_of_day: first_match(&lowered, TIME_OF_DAY_RULES),
        severity: first_match(&lowered, SEVERITY_RULES),
        emotional_state: first_match(&lowered, EMOTIONAL_STATE_RULES),
    };

    tracing::debug!(
        context = ?inferred.context_tag,
        time_of_day = ?inferred.time_of_day,
        severity = ?inferred.severity,
        emotional_state = ?inferred.emotional_state,
        "parsed observation text"
    );

    inferred
}
