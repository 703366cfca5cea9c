//! Output contract shared by the deterministic engine and the remote
//! collaborator path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    Child,
    Classroom,
}

/// Who produced a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    #[default]
    Engine,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Acknowledgment,
    ObservedBehavior,
    ContextTrigger,
    Conceptualization,
    CoreNeedsDevelopment,
    AttachmentSupport,
    PracticalStrategies,
    ImplementationGuidance,
    WhyStrategiesWork,
    FutureReadinessBenefit,
    FamilyScript,
    AlignedStrategy,
    AlternativeStrategy,
}

/// Child pipeline sections, in output order.
pub const CHILD_SECTIONS: [SectionKey; 11] = [
    SectionKey::Acknowledgment,
    SectionKey::ObservedBehavior,
    SectionKey::ContextTrigger,
    SectionKey::Conceptualization,
    SectionKey::CoreNeedsDevelopment,
    SectionKey::AttachmentSupport,
    SectionKey::PracticalStrategies,
    SectionKey::ImplementationGuidance,
    SectionKey::WhyStrategiesWork,
    SectionKey::FutureReadinessBenefit,
    SectionKey::FamilyScript,
];

/// Classroom pipeline sections, in output order.
pub const CLASSROOM_SECTIONS: [SectionKey; 4] = [
    SectionKey::Conceptualization,
    SectionKey::AlignedStrategy,
    SectionKey::AlternativeStrategy,
    SectionKey::FutureReadinessBenefit,
];

impl SectionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Acknowledgment => "acknowledgment",
            SectionKey::ObservedBehavior => "observed_behavior",
            SectionKey::ContextTrigger => "context_trigger",
            SectionKey::Conceptualization => "conceptualization",
            SectionKey::CoreNeedsDevelopment => "core_needs_development",
            SectionKey::AttachmentSupport => "attachment_support",
            SectionKey::PracticalStrategies => "practical_strategies",
            SectionKey::ImplementationGuidance => "implementation_guidance",
            SectionKey::WhyStrategiesWork => "why_strategies_work",
            SectionKey::FutureReadinessBenefit => "future_readiness_benefit",
            SectionKey::FamilyScript => "family_script",
            SectionKey::AlignedStrategy => "aligned_strategy",
            SectionKey::AlternativeStrategy => "alternative_strategy",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SectionKey::Acknowledgment => "Acknowledgment",
            SectionKey::ObservedBehavior => "Observed Behavior",
            SectionKey::ContextTrigger => "Context and Trigger",
            SectionKey::Conceptualization => "Conceptualization",
            SectionKey::CoreNeedsDevelopment => "Core Needs and Development",
            SectionKey::AttachmentSupport => "Attachment and Connection Support",
            SectionKey::PracticalStrategies => "Practical Strategies",
            SectionKey::ImplementationGuidance => "Implementation Guidance",
            SectionKey::WhyStrategiesWork => "Why These Strategies Work",
            SectionKey::FutureReadinessBenefit => "Future-Readiness Benefit",
            SectionKey::FamilyScript => "Family Script",
            SectionKey::AlignedStrategy => "Aligned Strategy",
            SectionKey::AlternativeStrategy => "Alternative Strategy to Test",
        }
    }

    /// Resolve a heading written by a person or a model ("Why These
    /// Strategies Work", "why_strategies_work", "Context & Trigger").
    pub fn from_heading(heading: &str) -> Option<SectionKey> {
        let squashed: String = heading
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        let all = CHILD_SECTIONS.iter().chain(CLASSROOM_SECTIONS.iter());
        for key in all {
            let by_title: String = key
                .title()
                .to_lowercase()
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect();
            let by_id: String = key.as_str().chars().filter(|c| *c != '_').collect();
            if squashed == by_title || squashed == by_id {
                return Some(*key);
            }
        }
        match squashed.as_str() {
            "coreneeds" => Some(SectionKey::CoreNeedsDevelopment),
            "futurereadiness" => Some(SectionKey::FutureReadinessBenefit),
            "alternativestrategy" | "testoption" => Some(SectionKey::AlternativeStrategy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub key: SectionKey,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedResponse {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub pipeline: PipelineKind,
    #[serde(default)]
    pub source: ResponseSource,
    /// Ordered narrative sections
    pub sections: Vec<Section>,
    /// Ranked, at most five entries
    pub practical_strategies: Vec<String>,
    #[serde(default)]
    pub family_script: Option<String>,
    /// Selected framework ids, in selection order
    pub frameworks: Vec<String>,
    /// Matched template ids (primary first)
    pub templates: Vec<String>,
}

impl GeneratedResponse {
    pub(crate) fn new(pipeline: PipelineKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            pipeline,
            source: ResponseSource::Engine,
            sections: Vec::new(),
            practical_strategies: Vec::new(),
            family_script: None,
            frameworks: Vec::new(),
            templates: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, key: SectionKey, text: String) {
        self.sections.push(Section {
            key,
            title: key.title().to_string(),
            text,
        });
    }

    pub fn section(&self, key: SectionKey) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.text.as_str())
    }

    pub fn required_sections(&self) -> &'static [SectionKey] {
        match self.pipeline {
            PipelineKind::Child => &CHILD_SECTIONS,
            PipelineKind::Classroom => &CLASSROOM_SECTIONS,
        }
    }

    /// True when every required section is present and non-blank.
    pub fn is_complete(&self) -> bool {
        self.required_sections().iter().all(|key| {
            self.section(*key)
                .is_some_and(|text| !text.trim().is_empty())
        })
    }
}
