//! Engine facade: the three generation entry points plus knowledge base
//! export/import. The engine owns its knowledge base; nothing here is
//! process-global.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, DEFAULT_REMOTE_TIMEOUT_MS};
use crate::context::{BehaviorContext, ChildRef, ClassroomContext, parse_description};
use crate::error::Result;
use crate::family::{BehaviorLog, FamilyScriptGenerator, Language};
use crate::knowledge::{KnowledgeBase, KnowledgeExport, KnowledgeImport, TemplateCriteria};
use crate::language::{LanguageNormalizer, MatchMode};
use crate::pipeline::matcher::{child_strategy_list, classroom_strategy_list};
use crate::pipeline::{
    Composer, GeneratedResponse, PipelineKind, RankingPolicy, match_templates, select_frameworks,
};

/// Behavior switches for one engine instance.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub ranking: RankingPolicy,
    pub match_mode: MatchMode,
    /// Language of the family section inside child responses.
    pub family_language: Language,
    /// Parent display name for that family section; empty uses the locale default.
    pub parent_name: String,
    /// Budget for one remote generator call before the engine response is used.
    pub remote_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            ranking: RankingPolicy::default(),
            match_mode: MatchMode::default(),
            family_language: Language::default(),
            parent_name: String::new(),
            remote_timeout: Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS),
        }
    }
}

impl From<&Config> for EngineOptions {
    fn from(config: &Config) -> Self {
        Self {
            ranking: config.matching.ranking,
            match_mode: config.normalizer.match_mode,
            family_language: config.family.default_language,
            parent_name: config.family.default_parent_name.clone(),
            remote_timeout: Duration::from_millis(config.remote.timeout_ms),
        }
    }
}

#[derive(Debug)]
pub struct CoachEngine {
    kb: Arc<KnowledgeBase>,
    options: EngineOptions,
    family: FamilyScriptGenerator,
}

impl Default for CoachEngine {
    fn default() -> Self {
        Self::seeded()
    }
}

impl CoachEngine {
    pub fn new(kb: Arc<KnowledgeBase>, options: EngineOptions, family: FamilyScriptGenerator) -> Self {
        Self {
            kb,
            options,
            family,
        }
    }

    /// Seeded knowledge base with default options.
    pub fn seeded() -> Self {
        Self::new(
            Arc::new(KnowledgeBase::seeded()),
            EngineOptions::default(),
            FamilyScriptGenerator::new(),
        )
    }

    /// Build from loaded configuration, importing `knowledge.seed_path`
    /// over the seed data when set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let kb = KnowledgeBase::seeded();
        if let Some(path) = &config.knowledge.seed_path {
            let json = std::fs::read_to_string(path)?;
            kb.import_json(&json)?;
            tracing::info!(path = %path.display(), "knowledge base loaded from seed file");
        }

        let mut family = FamilyScriptGenerator::new();
        if let Some(signature) = &config.family.educator_signature {
            family = family.with_signature(signature.clone());
        }

        Ok(Self::new(Arc::new(kb), EngineOptions::from(config), family))
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.kb
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub(crate) fn normalizer_for(&self, kb: &crate::knowledge::KnowledgeSnapshot) -> LanguageNormalizer {
        LanguageNormalizer::from_guidelines(&kb.guidelines, self.options.match_mode)
    }

    /// Parse the description and fill unset fields.
    pub fn resolve_child_context(&self, ctx: BehaviorContext) -> BehaviorContext {
        let inferred = parse_description(&ctx.description);
        ctx.merge_inferred(inferred)
    }

    pub fn resolve_classroom_context(&self, ctx: ClassroomContext) -> ClassroomContext {
        let inferred = parse_description(&ctx.description);
        ctx.merge_inferred(inferred)
    }

    /// Eleven-section child response. Never fails for structurally valid input.
    pub fn generate_child_behavior_strategy(&self, ctx: BehaviorContext) -> GeneratedResponse {
        let span = tracing::debug_span!("child_pipeline");
        let _guard = span.enter();

        let ctx = self.resolve_child_context(ctx);
        let snapshot = self.kb.snapshot();
        let normalizer = self.normalizer_for(&snapshot);

        let selected = select_frameworks(PipelineKind::Child, ctx.severity);
        let criteria = TemplateCriteria {
            frameworks: selected.iter().map(|s| s.to_string()).collect(),
            age_group: ctx.age_group.clone(),
            context: ctx.context_tag.clone(),
            severity: ctx.severity,
        };
        let matched = match_templates(&snapshot, &criteria, self.options.ranking);
        let practical = child_strategy_list(
            &matched,
            ctx.severity,
            ctx.context_tag.as_deref(),
            ctx.child_name(),
        );

        let composer = Composer {
            snapshot: &snapshot,
            normalizer: &normalizer,
            family: &self.family,
            family_language: self.options.family_language,
            parent_name: &self.options.parent_name,
        };
        let response = composer.compose_child(&ctx, &selected, &matched, practical);
        tracing::debug!(id = %response.id, templates = ?response.templates, "child response composed");
        response
    }

    /// Four-section classroom response.
    pub fn generate_classroom_strategy(&self, ctx: ClassroomContext) -> GeneratedResponse {
        let span = tracing::debug_span!("classroom_pipeline");
        let _guard = span.enter();

        let ctx = self.resolve_classroom_context(ctx);
        let snapshot = self.kb.snapshot();
        let normalizer = self.normalizer_for(&snapshot);

        let selected = select_frameworks(PipelineKind::Classroom, ctx.severity);
        let criteria = TemplateCriteria {
            frameworks: selected.iter().map(|s| s.to_string()).collect(),
            age_group: ctx.age_group().map(String::from),
            context: ctx.context_tag.clone(),
            severity: ctx.severity,
        };
        let matched = match_templates(&snapshot, &criteria, self.options.ranking);
        let practical = classroom_strategy_list(&matched);

        let composer = Composer {
            snapshot: &snapshot,
            normalizer: &normalizer,
            family: &self.family,
            family_language: self.options.family_language,
            parent_name: &self.options.parent_name,
        };
        let response = composer.compose_classroom(&ctx, &selected, &matched, practical);
        tracing::debug!(id = %response.id, templates = ?response.templates, "classroom response composed");
        response
    }

    /// Parent letter. Internal failures degrade to the simple template, so
    /// the result is never empty.
    pub fn generate_family_script(
        &self,
        child: Option<&ChildRef>,
        log: Option<&BehaviorLog>,
        parent_name: &str,
        language: Language,
        notes: Option<&str>,
    ) -> String {
        let snapshot = self.kb.snapshot();
        let normalizer = self.normalizer_for(&snapshot);
        self.family
            .generate(child, log, parent_name, language, notes, &normalizer)
    }

    pub fn export_knowledge_base(&self) -> KnowledgeExport {
        self.kb.export_knowledge_base()
    }

    /// Validated wholesale replace; on error the knowledge base is unchanged.
    pub fn import_knowledge_base(&self, data: KnowledgeImport) -> Result<()> {
        self.kb.import_knowledge_base(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Severity, TimeOfDay};
    use crate::pipeline::SectionKey;

    #[test]
    fn resolve_fills_from_description() {
        let engine = CoachEngine::seeded();
        let ctx = engine.resolve_child_context(BehaviorContext::new(
            "Child had a meltdown during circle time this morning",
        ));
        assert_eq!(ctx.severity, Some(Severity::High));
        assert_eq!(ctx.context_tag.as_deref(), Some("circle_time"));
        assert_eq!(ctx.time_of_day, Some(TimeOfDay::Morning));
    }

    #[test]
    fn child_response_is_complete_and_tagged() {
        let engine = CoachEngine::seeded();
        let response = engine.generate_child_behavior_strategy(BehaviorContext::new(
            "Maya threw blocks during cleanup this afternoon",
        ));
        assert!(response.is_complete());
        assert_eq!(response.pipeline, PipelineKind::Child);
        assert!(response.family_script.as_deref().is_some_and(|s| !s.is_empty()));
        assert!(!response.frameworks.is_empty());
    }

    #[test]
    fn classroom_response_has_four_sections() {
        let engine = CoachEngine::seeded();
        let response = engine.generate_classroom_strategy(ClassroomContext::new(
            "Class transition to cleanup was chaotic today",
        ));
        assert!(response.is_complete());
        assert_eq!(response.sections.len(), 4);
        assert!(response.section(SectionKey::AlignedStrategy).is_some());
        assert!(response.family_script.is_none());
    }

    #[test]
    fn family_section_follows_configured_language() {
        let engine = CoachEngine::new(
            Arc::new(KnowledgeBase::seeded()),
            EngineOptions {
                family_language: Language::Spanish,
                ..Default::default()
            },
            FamilyScriptGenerator::new(),
        );
        let response = engine.generate_child_behavior_strategy(BehaviorContext::new(
            "He cried at drop off",
        ));
        assert!(response.family_script.unwrap().starts_with("Hola"));
    }

    #[test]
    fn spanish_family_section_has_no_english_strategy_text() {
        let engine = CoachEngine::new(
            Arc::new(KnowledgeBase::seeded()),
            EngineOptions {
                family_language: Language::Spanish,
                ..Default::default()
            },
            FamilyScriptGenerator::new(),
        );
        let response = engine.generate_child_behavior_strategy(BehaviorContext {
            severity: Some(Severity::High),
            ..BehaviorContext::new("Meltdown at circle time")
        });
        let letter = response.family_script.as_deref().unwrap();
        assert!(letter.starts_with("Hola"));
        assert!(!letter.contains("Connect first"), "{letter}");
        for strategy in &response.practical_strategies {
            assert!(!letter.contains(strategy.trim_end_matches('.')), "{letter}");
        }
        assert!(letter.contains("Nos quedamos cerca"));
    }

    #[test]
    fn options_carry_configured_remote_timeout() {
        let config = Config::from_toml("[remote]\ntimeout_ms = 1500").unwrap();
        let engine = CoachEngine::from_config(&config).unwrap();
        assert_eq!(engine.options().remote_timeout, Duration::from_millis(1500));
        assert_eq!(
            EngineOptions::default().remote_timeout,
            Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS)
        );
    }

    #[test]
    fn failed_import_leaves_engine_usable() {
        let engine = CoachEngine::seeded();
        let before = engine.knowledge().fingerprint();
        let mut broken = engine.knowledge().snapshot().templates[0].clone();
        broken.body.clear();
        let bad = KnowledgeImport {
            templates: Some(vec![broken]),
            ..Default::default()
        };
        assert!(engine.import_knowledge_base(bad).is_err());
        assert_eq!(engine.knowledge().fingerprint(), before);
    }
}
