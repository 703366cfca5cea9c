//! Knowledge base records: frameworks, strategy templates, language
//! guidelines and the auxiliary competency/skill tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::context::Severity;

/// Framework ids registered by the seed knowledge base.
pub mod framework_ids {
    pub const ATTACHMENT: &str = "attachment_theory";
    /// Infant and early childhood mental health: relationships and co-regulation
    pub const IECMH: &str = "iecmh";
    pub const NEUROSCIENCE: &str = "developmental_neuroscience";
    pub const SEL: &str = "casel_sel";
    pub const TRAUMA_INFORMED: &str = "trauma_informed_care";
}

/// A theoretical lens with directive hooks that shape generated language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Framework {
    pub id: String,
    pub name: String,
    pub core_idea: String,
    #[serde(default)]
    pub principles: Vec<String>,
    #[serde(default)]
    pub generation_hooks: Vec<String>,
    #[serde(default)]
    pub preferred_phrases: Vec<String>,
    #[serde(default)]
    pub avoided_phrases: Vec<String>,
}

/// Partial update for [`Framework`]; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameworkPatch {
    pub name: Option<String>,
    pub core_idea: Option<String>,
    pub principles: Option<Vec<String>>,
    pub generation_hooks: Option<Vec<String>>,
    pub preferred_phrases: Option<Vec<String>>,
    pub avoided_phrases: Option<Vec<String>>,
}

impl Framework {
    pub(crate) fn apply(&mut self, patch: FrameworkPatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.core_idea {
            self.core_idea = v;
        }
        if let Some(v) = patch.principles {
            self.principles = v;
        }
        if let Some(v) = patch.generation_hooks {
            self.generation_hooks = v;
        }
        if let Some(v) = patch.preferred_phrases {
            self.preferred_phrases = v;
        }
        if let Some(v) = patch.avoided_phrases {
            self.avoided_phrases = v;
        }
    }
}

/// A reusable, tag-qualified coaching strategy.
///
/// `body` may contain the informal placeholder `{child}`, rendered with the
/// child's name or "the child".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyTemplate {
    pub id: String,
    pub name: String,
    pub frameworks: BTreeSet<String>,
    #[serde(default)]
    pub age_groups: BTreeSet<String>,
    #[serde(default)]
    pub contexts: BTreeSet<String>,
    #[serde(default)]
    pub severities: BTreeSet<Severity>,
    pub body: String,
    #[serde(default)]
    pub variations: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
}

impl StrategyTemplate {
    /// Render `{child}` placeholders.
    pub fn render_body(&self, child_name: Option<&str>) -> String {
        self.body.replace("{child}", child_name.unwrap_or("the child"))
    }

    /// Number of tags across the filterable dimensions; smaller is more specific.
    pub fn tag_breadth(&self) -> usize {
        self.age_groups.len() + self.contexts.len() + self.severities.len()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyTemplatePatch {
    pub name: Option<String>,
    pub frameworks: Option<BTreeSet<String>>,
    pub age_groups: Option<BTreeSet<String>>,
    pub contexts: Option<BTreeSet<String>>,
    pub severities: Option<BTreeSet<Severity>>,
    pub body: Option<String>,
    pub variations: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
}

impl StrategyTemplate {
    pub(crate) fn apply(&mut self, patch: StrategyTemplatePatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.frameworks {
            self.frameworks = v;
        }
        if let Some(v) = patch.age_groups {
            self.age_groups = v;
        }
        if let Some(v) = patch.contexts {
            self.contexts = v;
        }
        if let Some(v) = patch.severities {
            self.severities = v;
        }
        if let Some(v) = patch.body {
            self.body = v;
        }
        if let Some(v) = patch.variations {
            self.variations = v;
        }
        if let Some(v) = patch.benefits {
            self.benefits = v;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidelineCategory {
    Tone,
    Framing,
    Avoidance,
    Cultural,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhrasePair {
    pub preferred: String,
    pub avoid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageGuideline {
    pub id: String,
    pub category: GuidelineCategory,
    pub rule: String,
    #[serde(default)]
    pub examples: Vec<PhrasePair>,
}

/// CASEL social-emotional competency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competency {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A skill children carry into later schooling and life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessSkill {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Filter for [`crate::knowledge::KnowledgeBase::get_strategy_templates`].
/// An unset (or empty) dimension does not filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateCriteria {
    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub age_group: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
}

impl TemplateCriteria {
    pub fn matches(&self, template: &StrategyTemplate) -> bool {
        let framework_ok = self.frameworks.is_empty()
            || self
                .frameworks
                .iter()
                .any(|id| template.frameworks.contains(id));
        let age_ok = self
            .age_group
            .as_ref()
            .is_none_or(|age| template.age_groups.contains(age));
        let context_ok = self
            .context
            .as_ref()
            .is_none_or(|ctx| template.contexts.contains(ctx));
        let severity_ok = self
            .severity
            .is_none_or(|sev| template.severities.contains(&sev));
        framework_ok && age_ok && context_ok && severity_ok
    }
}

/// Full knowledge base as exchanged by export/import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeExport {
    pub frameworks: Vec<Framework>,
    pub guidelines: Vec<LanguageGuideline>,
    pub templates: Vec<StrategyTemplate>,
    pub sel_competencies: Vec<Competency>,
    pub future_readiness_skills: Vec<ReadinessSkill>,
    /// SHA-1 over the collections above, informational
    #[serde(default)]
    pub fingerprint: Option<String>,
}

/// Import payload: any collection present replaces the live one wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeImport {
    #[serde(default)]
    pub frameworks: Option<Vec<Framework>>,
    #[serde(default)]
    pub guidelines: Option<Vec<LanguageGuideline>>,
    #[serde(default)]
    pub templates: Option<Vec<StrategyTemplate>>,
    #[serde(default)]
    pub sel_competencies: Option<Vec<Competency>>,
    #[serde(default)]
    pub future_readiness_skills: Option<Vec<ReadinessSkill>>,
}

impl From<KnowledgeExport> for KnowledgeImport {
    fn from(export: KnowledgeExport) -> Self {
        Self {
            frameworks: Some(export.frameworks),
            guidelines: Some(export.guidelines),
            templates: Some(export.templates),
            sel_competencies: Some(export.sel_competencies),
            future_readiness_skills: Some(export.future_readiness_skills),
        }
    }
}
