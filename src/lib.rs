//! Behavior coaching engine for early childhood educators.
//!
//! Turns a free-text observation of a child (or a whole class) into a
//! structured, framework-grounded coaching response, and writes parent
//! letters in English or Spanish.
//!
//! ```
//! use coach_engine::{BehaviorContext, CoachEngine};
//!
//! let engine = CoachEngine::seeded();
//! let response = engine.generate_child_behavior_strategy(BehaviorContext::new(
//!     "Child had a meltdown during circle time this morning",
//! ));
//! assert!(response.is_complete());
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod family;
pub mod knowledge;
pub mod language;
pub mod pipeline;
pub mod remote;

pub use config::Config;
pub use context::{BehaviorContext, ChildRef, ClassroomContext, EmotionalState, Severity, TimeOfDay};
pub use engine::{CoachEngine, EngineOptions};
pub use error::{CoachError, Result};
pub use family::{BehaviorLog, FamilyScriptGenerator, Language};
pub use knowledge::{KnowledgeBase, KnowledgeExport, KnowledgeImport, TemplateCriteria};
pub use language::{LanguageNormalizer, MatchMode};
pub use pipeline::{GeneratedResponse, PipelineKind, RankingPolicy, ResponseSource, SectionKey};

/// Install a stderr `tracing` subscriber. `filter` falls back to
/// `coach_engine=info` when empty. Safe to call more than once.
pub fn init_tracing(filter: &str) {
    let filter = if filter.trim().is_empty() {
        "coach_engine=info"
    } else {
        filter
    };
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("coach_engine=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
