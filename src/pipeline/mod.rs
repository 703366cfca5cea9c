//! Recommendation pipeline: framework selection, template matching and
//! section composition.

pub mod composer;
pub mod matcher;
pub mod response;
pub mod selector;

pub use composer::Composer;
pub use matcher::{MatchedStrategies, RankingPolicy, match_templates};
pub use response::{
    CHILD_SECTIONS, CLASSROOM_SECTIONS, GeneratedResponse, PipelineKind, ResponseSource, Section,
    SectionKey,
};
pub use selector::select_frameworks;
