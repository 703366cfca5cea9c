//! Behavior and classroom contexts plus the free-text parser that fills
//! their unset fields.

pub mod parser;
pub mod types;

pub use parser::{InferredFields, parse_description};
pub use types::{
    BehaviorContext, ChildRef, ClassroomContext, EmotionalState, Severity, TimeOfDay,
    age_group_for_years,
};

/// Canonical situational context tags used by the seeded knowledge base.
pub mod tags {
    pub const TRANSITION: &str = "transition";
    pub const CIRCLE_TIME: &str = "circle_time";
    pub const MEAL_TIME: &str = "meal_time";
    pub const NAP_TIME: &str = "nap_time";
    pub const DROP_OFF: &str = "drop_off";
    pub const PICKUP: &str = "pickup";
    pub const OUTDOOR_PLAY: &str = "outdoor_play";
    pub const CLEANUP: &str = "cleanup";
    pub const GROUP_WORK: &str = "group_work";
    pub const FREE_PLAY: &str = "free_play";

    /// True when the tag denotes any kind of transition (`transition`,
    /// `transition_to_outdoor`, ...).
    pub fn is_transition(tag: &str) -> bool {
        tag.contains(TRANSITION)
    }
}

/// Canonical age group tags.
pub mod age_groups {
    pub const INFANT: &str = "infant";
    pub const TODDLER: &str = "toddler";
    pub const PRESCHOOL: &str = "preschool";
    pub const SCHOOL_AGE: &str = "school_age";
}
