//! Knowledge base: theoretical frameworks, strategy templates and language
//! guidelines, plus the store that serves them to the pipeline.

pub mod seed;
pub mod store;
pub mod types;

pub use store::{KnowledgeBase, KnowledgeSnapshot};
pub use types::{
    Competency, Framework, FrameworkPatch, GuidelineCategory, KnowledgeExport, KnowledgeImport,
    LanguageGuideline, PhrasePair, ReadinessSkill, StrategyTemplate, StrategyTemplatePatch,
    TemplateCriteria, framework_ids,
};
