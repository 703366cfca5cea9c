//! Template matching and ranking
//!
//! The store filters; this module ranks. Under the default
//! [`RankingPolicy::RegistrationOrder`] the first match is the primary
//! ("aligned") strategy and the next distinct match the alternative
//! ("test") option. Missing slots are filled with built-in defaults so a
//! pipeline never runs short of strategies.

use serde::{Deserialize, Serialize};

use crate::context::{Severity, tags};
use crate::knowledge::{KnowledgeSnapshot, StrategyTemplate, TemplateCriteria};

/// Hard cap on the child pipeline's strategy list.
pub const MAX_STRATEGIES: usize = 5;
/// Floor for the child pipeline's strategy list.
pub const MIN_CHILD_STRATEGIES: usize = 3;
/// Template-derived entries allowed in the child list.
const TEMPLATE_SNIPPETS: usize = 2;

pub const CONNECTION_FIRST: &str = "Connect first: get down to eye level, use a calm, low voice, and acknowledge the feeling before addressing the behavior.";

pub const TRANSITION_SUPPORT: &str = "Give timed transition warnings (five minutes, then two minutes) with a visual timer or song so the change feels predictable.";

pub const DEFAULT_PRIMARY_STRATEGY: &str = "Stay close and calm, name the feeling you see, and offer two simple choices that help the child move forward.";

pub const DEFAULT_ALTERNATIVE_STRATEGY: &str = "Try a brief one-on-one check-in during a calm part of the day to rehearse what to do next time, using pictures or puppets.";

/// Padding used, in order, when fewer than three entries exist.
pub const DEFAULT_SNIPPETS: [&str; 3] = [
    "Offer two simple, acceptable choices to restore a sense of control.",
    "Notice and describe moments when things go well (\"You waited for your turn!\").",
    "Keep the daily routine predictable and preview any changes ahead of time.",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    /// Knowledge base registration order.
    #[default]
    RegistrationOrder,
    /// Narrowest tag coverage first; registration order breaks ties.
    Specificity,
}

impl std::str::FromStr for RankingPolicy {
    type Err = crate::error::CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "registration_order" | "registration" => Ok(RankingPolicy::RegistrationOrder),
            "specificity" => Ok(RankingPolicy::Specificity),
            other => Err(crate::error::CoachError::Config {
                message: format!("unknown ranking policy '{other}'"),
            }),
        }
    }
}

/// Order filtered templates. `Vec::sort_by_key` is stable, so registration
/// order survives among equally specific templates.
pub fn rank_templates<'a>(
    mut matches: Vec<&'a StrategyTemplate>,
    policy: RankingPolicy,
) -> Vec<&'a StrategyTemplate> {
    if policy == RankingPolicy::Specificity {
        matches.sort_by_key(|t| t.tag_breadth());
    }
    matches
}

/// Ranked matches for one request.
#[derive(Debug, Clone, Default)]
pub struct MatchedStrategies {
    pub ranked: Vec<StrategyTemplate>,
}

impl MatchedStrategies {
    pub fn primary(&self) -> Option<&StrategyTemplate> {
        self.ranked.first()
    }

    /// First match after the primary with a different id.
    pub fn alternative(&self) -> Option<&StrategyTemplate> {
        let primary = self.primary()?;
        self.ranked.iter().skip(1).find(|t| t.id != primary.id)
    }

    pub fn template_ids(&self) -> Vec<String> {
        self.ranked.iter().map(|t| t.id.clone()).collect()
    }

    pub fn primary_text(&self, child_name: Option<&str>) -> String {
        self.primary()
            .map(|t| snippet(t, child_name))
            .unwrap_or_else(|| DEFAULT_PRIMARY_STRATEGY.to_string())
    }

    pub fn alternative_text(&self, child_name: Option<&str>) -> String {
        self.alternative()
            .map(|t| snippet(t, child_name))
            .unwrap_or_else(|| DEFAULT_ALTERNATIVE_STRATEGY.to_string())
    }
}

fn snippet(template: &StrategyTemplate, child_name: Option<&str>) -> String {
    format!("{}: {}", template.name, template.render_body(child_name))
}

/// Filter `snapshot` with `criteria` and rank the result.
pub fn match_templates(
    snapshot: &KnowledgeSnapshot,
    criteria: &TemplateCriteria,
    policy: RankingPolicy,
) -> MatchedStrategies {
    let filtered: Vec<&StrategyTemplate> = snapshot.templates_matching(criteria).collect();
    let ranked: Vec<StrategyTemplate> = rank_templates(filtered, policy)
        .into_iter()
        .cloned()
        .collect();

    if ranked.len() < 2 {
        tracing::debug!(
            matches = ranked.len(),
            "fewer than two templates matched; defaults fill the gap"
        );
    }
    tracing::debug!(templates = ?ranked.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), "templates ranked");

    MatchedStrategies { ranked }
}

/// Child pipeline strategy list: connection first when severity is high,
/// transition support for transitions, up to two template snippets, padded
/// to three and capped at five.
pub fn child_strategy_list(
    matched: &MatchedStrategies,
    severity: Option<Severity>,
    context_tag: Option<&str>,
    child_name: Option<&str>,
) -> Vec<String> {
    let mut list: Vec<String> = Vec::with_capacity(MAX_STRATEGIES);

    if severity == Some(Severity::High) {
        list.push(CONNECTION_FIRST.to_string());
    }
    if context_tag.is_some_and(tags::is_transition) {
        list.push(TRANSITION_SUPPORT.to_string());
    }
    list.extend(
        matched
            .ranked
            .iter()
            .take(TEMPLATE_SNIPPETS)
            .map(|t| snippet(t, child_name)),
    );

    for pad in DEFAULT_SNIPPETS {
        if list.len() >= MIN_CHILD_STRATEGIES {
            break;
        }
        if !list.iter().any(|s| s == pad) {
            list.push(pad.to_string());
        }
    }

    list.truncate(MAX_STRATEGIES);
    list
}

/// Classroom pipeline strategy list: aligned then alternative.
pub fn classroom_strategy_list(matched: &MatchedStrategies) -> Vec<String> {
    vec![matched.primary_text(None), matched.alternative_text(None)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;

    fn criteria(context: &str, severity: Severity) -> TemplateCriteria {
        TemplateCriteria {
            frameworks: crate::pipeline::select_frameworks(
                crate::pipeline::PipelineKind::Child,
                Some(severity),
            )
            .into_iter()
            .map(String::from)
            .collect(),
            age_group: None,
            context: Some(context.into()),
            severity: Some(severity),
        }
    }

    #[test]
    fn registration_order_decides_primary_and_alternative() {
        let kb = KnowledgeBase::seeded();
        let snapshot = kb.snapshot();
        let m = match_templates(
            &snapshot,
            &criteria("circle_time", Severity::High),
            RankingPolicy::RegistrationOrder,
        );
        assert_eq!(m.primary().unwrap().id, "connect_before_correct");
        assert_eq!(m.alternative().unwrap().id, "co_regulation_calm_space");
    }

    #[test]
    fn specificity_prefers_narrow_templates() {
        let kb = KnowledgeBase::seeded();
        let snapshot = kb.snapshot();
        let m = match_templates(
            &snapshot,
            &criteria("circle_time", Severity::Low),
            RankingPolicy::Specificity,
        );
        assert_eq!(m.primary().unwrap().id, "movement_rich_circle");
    }

    #[test]
    fn matching_is_deterministic() {
        let kb = KnowledgeBase::seeded();
        let snapshot = kb.snapshot();
        let c = criteria("transition", Severity::Medium);
        let first = match_templates(&snapshot, &c, RankingPolicy::RegistrationOrder).template_ids();
        for _ in 0..5 {
            let again =
                match_templates(&snapshot, &c, RankingPolicy::RegistrationOrder).template_ids();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn no_match_falls_back_to_defaults() {
        let m = MatchedStrategies::default();
        assert_eq!(m.primary_text(None), DEFAULT_PRIMARY_STRATEGY);
        assert_eq!(m.alternative_text(None), DEFAULT_ALTERNATIVE_STRATEGY);
        assert_eq!(classroom_strategy_list(&m).len(), 2);
    }

    #[test]
    fn high_severity_transition_list_order() {
        let kb = KnowledgeBase::seeded();
        let snapshot = kb.snapshot();
        let m = match_templates(
            &snapshot,
            &criteria("transition", Severity::High),
            RankingPolicy::RegistrationOrder,
        );
        let list = child_strategy_list(&m, Some(Severity::High), Some("transition"), Some("Sam"));
        assert_eq!(list[0], CONNECTION_FIRST);
        assert_eq!(list[1], TRANSITION_SUPPORT);
        assert_eq!(list.len(), 4);
        assert!(list[2].contains("Sam"));
    }

    #[test]
    fn empty_match_pads_to_three_distinct_entries() {
        let list = child_strategy_list(&MatchedStrategies::default(), None, None, None);
        assert_eq!(list, DEFAULT_SNIPPETS.map(String::from).to_vec());
    }

    #[test]
    fn list_never_exceeds_cap() {
        let kb = KnowledgeBase::seeded();
        let snapshot = kb.snapshot();
        let m = match_templates(
            &snapshot,
            &TemplateCriteria::default(),
            RankingPolicy::RegistrationOrder,
        );
        let list = child_strategy_list(
            &m,
            Some(Severity::High),
            Some("transition_to_outdoor"),
            None,
        );
        assert!(list.len() <= MAX_STRATEGIES);
        assert_eq!(list[1], TRANSITION_SUPPORT);
    }
}
