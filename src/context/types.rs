//! Typed request contexts for the child and classroom pipelines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::age_groups;
use super::parser::InferredFields;
use crate::error::CoachError;

/// Disruption magnitude. Ordered so `Severity::Medium <= s` reads as
/// "medium or worse".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// `None` never reaches a threshold.
    pub fn at_least(value: Option<Severity>, floor: Severity) -> bool {
        value.is_some_and(|s| s >= floor)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" | "med" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(CoachError::Validation {
                message: format!("unknown severity '{other}' (expected low, medium or high)"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Midday,
    Afternoon,
    EndOfDay,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Midday => "midday",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::EndOfDay => "end_of_day",
        }
    }

    /// Human phrasing used in narrative sections.
    pub fn phrase(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "in the morning",
            TimeOfDay::Midday => "around midday",
            TimeOfDay::Afternoon => "in the afternoon",
            TimeOfDay::EndOfDay => "at the end of the day",
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "morning" => Ok(TimeOfDay::Morning),
            "midday" | "noon" => Ok(TimeOfDay::Midday),
            "afternoon" => Ok(TimeOfDay::Afternoon),
            "end_of_day" | "evening" => Ok(TimeOfDay::EndOfDay),
            other => Err(CoachError::Validation {
                message: format!("unknown time of day '{other}'"),
            }),
        }
    }
}

/// Emotional state of the educator filing the observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalState {
    Frustrated,
    Overwhelmed,
    Worried,
    Exhausted,
    Sad,
    Hopeful,
}

impl EmotionalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionalState::Frustrated => "frustrated",
            EmotionalState::Overwhelmed => "overwhelmed",
            EmotionalState::Worried => "worried",
            EmotionalState::Exhausted => "exhausted",
            EmotionalState::Sad => "sad",
            EmotionalState::Hopeful => "hopeful",
        }
    }
}

impl FromStr for EmotionalState {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frustrated" => Ok(EmotionalState::Frustrated),
            "overwhelmed" => Ok(EmotionalState::Overwhelmed),
            "worried" | "anxious" => Ok(EmotionalState::Worried),
            "exhausted" | "tired" => Ok(EmotionalState::Exhausted),
            "sad" => Ok(EmotionalState::Sad),
            "hopeful" => Ok(EmotionalState::Hopeful),
            other => Err(CoachError::Validation {
                message: format!("unknown emotional state '{other}'"),
            }),
        }
    }
}

/// Optional reference to the child an observation is about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildRef {
    pub name: String,
    #[serde(default)]
    pub age_years: Option<u8>,
    /// Individualized education program on file
    #[serde(default)]
    pub has_iep: bool,
    #[serde(default)]
    pub has_behavior_plan: bool,
}

impl ChildRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn has_support_plan(&self) -> bool {
        self.has_iep || self.has_behavior_plan
    }
}

/// Map an age in whole years onto the knowledge base's age group tags.
pub fn age_group_for_years(years: u8) -> &'static str {
    match years {
        0 => age_groups::INFANT,
        1..=2 => age_groups::TODDLER,
        3..=5 => age_groups::PRESCHOOL,
        _ => age_groups::SCHOOL_AGE,
    }
}

/// Input to the child pipeline. Every field except `description` may be
/// left unset and filled by the parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorContext {
    pub description: String,
    #[serde(default)]
    pub context_tag: Option<String>,
    #[serde(default)]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub age_group: Option<String>,
    #[serde(default)]
    pub stressors: Vec<String>,
    #[serde(default)]
    pub emotional_state: Option<EmotionalState>,
    #[serde(default)]
    pub teaching_style: Option<String>,
    #[serde(default)]
    pub learning_style: Option<String>,
    #[serde(default)]
    pub child: Option<ChildRef>,
}

impl BehaviorContext {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Fill fields the caller left unset. Caller values always win; a blank
    /// tag counts as unset.
    pub fn merge_inferred(mut self, inferred: InferredFields) -> Self {
        self.context_tag = non_blank(self.context_tag).or(inferred.context_tag);
        self.time_of_day = self.time_of_day.or(inferred.time_of_day);
        self.severity = self.severity.or(inferred.severity);
        self.emotional_state = self.emotional_state.or(inferred.emotional_state);
        self.age_group = non_blank(self.age_group);
        if self.age_group.is_none() {
            self.age_group = self
                .child
                .as_ref()
                .and_then(|c| c.age_years)
                .map(|years| age_group_for_years(years).to_string());
        }
        self
    }

    pub fn child_name(&self) -> Option<&str> {
        self.child
            .as_ref()
            .map(|c| c.name.trim())
            .filter(|n| !n.is_empty())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Input to the classroom pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassroomContext {
    pub description: String,
    #[serde(default)]
    pub context_tag: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub class_size: Option<u32>,
    #[serde(default)]
    pub stressors: Vec<String>,
    #[serde(default)]
    pub emotional_state: Option<EmotionalState>,
}

impl ClassroomContext {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Fill fields the caller left unset. Time of day is parsed but has no
    /// classroom field to land in.
    pub fn merge_inferred(mut self, inferred: InferredFields) -> Self {
        self.context_tag = non_blank(self.context_tag).or(inferred.context_tag);
        self.severity = self.severity.or(inferred.severity);
        self.emotional_state = self.emotional_state.or(inferred.emotional_state);
        self
    }

    /// Grade level doubles as the age group filter when it names one.
    pub fn age_group(&self) -> Option<&str> {
        let grade = self.grade_level.as_deref()?.trim();
        match grade.to_ascii_lowercase().as_str() {
            "infant" | "infants" => Some(age_groups::INFANT),
            "toddler" | "toddlers" => Some(age_groups::TODDLER),
            "preschool" | "pre-k" | "prek" | "pre_k" => Some(age_groups::PRESCHOOL),
            "k" | "kindergarten" | "school_age" | "1" | "2" | "3" => Some(age_groups::SCHOOL_AGE),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_values_win_over_inferred() {
        let ctx = BehaviorContext {
            description: "meltdown at lunch".into(),
            severity: Some(Severity::Low),
            ..Default::default()
        };
        let inferred = InferredFields {
            severity: Some(Severity::High),
            context_tag: Some("meal_time".into()),
            ..Default::default()
        };
        let merged = ctx.merge_inferred(inferred);
        assert_eq!(merged.severity, Some(Severity::Low));
        assert_eq!(merged.context_tag.as_deref(), Some("meal_time"));
    }

    #[test]
    fn blank_context_tag_counts_as_unset() {
        let merged = BehaviorContext {
            description: "cried at lunch".into(),
            context_tag: Some("  ".into()),
            ..Default::default()
        }
        .merge_inferred(InferredFields {
            context_tag: Some("meal_time".into()),
            ..Default::default()
        });
        assert_eq!(merged.context_tag.as_deref(), Some("meal_time"));

        let merged = ClassroomContext {
            context_tag: Some(String::new()),
            ..Default::default()
        }
        .merge_inferred(InferredFields::default());
        assert_eq!(merged.context_tag, None);
    }

    #[test]
    fn age_group_derived_from_child_age() {
        let ctx = BehaviorContext {
            child: Some(ChildRef {
                name: "Ava".into(),
                age_years: Some(2),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = ctx.merge_inferred(InferredFields::default());
        assert_eq!(merged.age_group.as_deref(), Some("toddler"));
    }

    #[test]
    fn severity_threshold_treats_unset_as_below() {
        assert!(!Severity::at_least(None, Severity::Low));
        assert!(Severity::at_least(Some(Severity::High), Severity::Medium));
        assert!(!Severity::at_least(Some(Severity::Low), Severity::Medium));
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert!("extreme".parse::<Severity>().is_err());
    }
}
