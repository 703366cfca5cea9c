//! Built-in knowledge base loaded at process start.
//!
//! Template registration order is a contract: the matcher's default
//! ranking treats the first match as the primary strategy and the second
//! as the alternative.

use std::collections::BTreeSet;

use super::types::{
    Competency, Framework, GuidelineCategory, KnowledgeExport, LanguageGuideline, PhrasePair,
    ReadinessSkill, StrategyTemplate, framework_ids as fw,
};
use crate::context::Severity;
use crate::context::{age_groups, tags};

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const ALL_AGES: &[&str] = &[
    age_groups::INFANT,
    age_groups::TODDLER,
    age_groups::PRESCHOOL,
    age_groups::SCHOOL_AGE,
];

const WALKING_AGES: &[&str] = &[
    age_groups::TODDLER,
    age_groups::PRESCHOOL,
    age_groups::SCHOOL_AGE,
];

const ALL_CONTEXTS: &[&str] = &[
    tags::TRANSITION,
    tags::CIRCLE_TIME,
    tags::MEAL_TIME,
    tags::NAP_TIME,
    tags::DROP_OFF,
    tags::PICKUP,
    tags::OUTDOOR_PLAY,
    tags::CLEANUP,
    tags::GROUP_WORK,
    tags::FREE_PLAY,
];

/// The full seed knowledge base.
pub fn seed_knowledge() -> KnowledgeExport {
    KnowledgeExport {
        frameworks: frameworks(),
        guidelines: guidelines(),
        templates: templates(),
        sel_competencies: sel_competencies(),
        future_readiness_skills: future_readiness_skills(),
        fingerprint: None,
    }
}

pub fn frameworks() -> Vec<Framework> {
    vec![
        Framework {
            id: fw::ATTACHMENT.into(),
            name: "Attachment Theory".into(),
            core_idea: "Children explore, learn, and regulate best from the secure base of a responsive, trusted adult.".into(),
            principles: strings(&[
                "Behavior is communication of an unmet need",
                "Connection precedes correction",
                "Consistency builds felt safety",
            ]),
            generation_hooks: strings(&[
                "Name the relationship as the first tool",
                "Frame the adult as a secure base, never as an enforcer",
            ]),
            preferred_phrases: strings(&["secure base", "felt safety", "connection"]),
            avoided_phrases: strings(&["attention-seeking", "manipulative"]),
        },
        Framework {
            id: fw::IECMH.into(),
            name: "Infant and Early Childhood Mental Health".into(),
            core_idea: "Young children's emotional wellbeing grows inside relationships; adults lend their calm through co-regulation until children can self-regulate.".into(),
            principles: strings(&[
                "Co-regulation comes before self-regulation",
                "Reflect on the adult's own state first",
                "Every child is understood in the context of their relationships",
            ]),
            generation_hooks: strings(&[
                "Invite the educator to notice their own state",
                "Describe co-regulation in concrete, bodily terms",
            ]),
            preferred_phrases: strings(&["co-regulation", "lend your calm", "relationship"]),
            avoided_phrases: strings(&["self-control problem"]),
        },
        Framework {
            id: fw::NEUROSCIENCE.into(),
            name: "Developmental Neuroscience".into(),
            core_idea: "Under stress the brain's alarm system overrides the still-developing thinking brain; regulation must be restored before reasoning can land.".into(),
            principles: strings(&[
                "Regulate, relate, then reason",
                "Stress narrows a child's capacity to listen and plan",
                "Repetition in calm moments builds new pathways",
            ]),
            generation_hooks: strings(&[
                "Explain the stress response in plain language",
                "Sequence strategies from calming to teaching",
            ]),
            preferred_phrases: strings(&["stress response", "thinking brain", "still developing"]),
            avoided_phrases: strings(&["choosing to misbehave"]),
        },
        Framework {
            id: fw::SEL.into(),
            name: "Social-Emotional Learning (CASEL)".into(),
            core_idea: "Self-awareness, self-management, social awareness, relationship skills, and responsible decision-making are teachable skills.".into(),
            principles: strings(&[
                "Teach skills explicitly and practice them in calm moments",
                "Name feelings to build emotional vocabulary",
                "Celebrate growth, not perfection",
            ]),
            generation_hooks: strings(&[
                "Tie each strategy to a named competency",
                "Frame mistakes as practice opportunities",
            ]),
            preferred_phrases: strings(&["skill building", "practice", "feelings words"]),
            avoided_phrases: strings(&["bad choice"]),
        },
        Framework {
            id: fw::TRAUMA_INFORMED.into(),
            name: "Trauma-Informed Care".into(),
            core_idea: "Predictability, choice, and felt safety help children whose stress systems are on high alert feel secure enough to engage.".into(),
            principles: strings(&[
                "Safety first, physically and emotionally",
                "Predictability reduces threat",
                "Offer choice to restore a sense of control",
            ]),
            generation_hooks: strings(&[
                "Lead with safety and predictability",
                "Avoid language implying blame or intent",
            ]),
            preferred_phrases: strings(&["predictable", "safe", "choice"]),
            avoided_phrases: strings(&["punishment", "consequence chart"]),
        },
    ]
}

pub fn templates() -> Vec<StrategyTemplate> {
    vec![
        StrategyTemplate {
            id: "connect_before_correct".into(),
            name: "Connection Before Correction".into(),
            frameworks: set(&[fw::ATTACHMENT]),
            age_groups: set(WALKING_AGES),
            contexts: set(ALL_CONTEXTS),
            severities: [Severity::Medium, Severity::High].into(),
            body: "Move close to {child}, get down to eye level, and name what you see (\"You're really upset\") before setting any limit. Once {child} is calmer, restate the expectation in one short sentence.".into(),
            variations: strings(&[
                "For children who dislike eye contact, sit side by side instead",
                "Pair the words with a gentle hand on the back if {child} welcomes touch",
            ]),
            benefits: strings(&[
                "trust that adults will help when feelings get big",
                "the ability to hear limits without feeling rejected",
            ]),
        },
        StrategyTemplate {
            id: "visual_transition_warning".into(),
            name: "Timed Transition Warnings".into(),
            frameworks: set(&[fw::NEUROSCIENCE, fw::SEL]),
            age_groups: set(WALKING_AGES),
            contexts: set(&[tags::TRANSITION, tags::CLEANUP, tags::PICKUP]),
            severities: Severity::ALL.into(),
            body: "Give a five-minute and a two-minute warning before the change, paired with a visual timer or a transition song, and let {child} choose a job for the next activity.".into(),
            variations: strings(&[
                "Use a first/then card showing the current and next activity",
                "Let a child be the 'timer helper' who announces the warning",
            ]),
            benefits: strings(&[
                "flexible thinking when plans change",
                "independence in managing daily routines",
            ]),
        },
        StrategyTemplate {
            id: "co_regulation_calm_space".into(),
            name: "Co-Regulation Calm Space".into(),
            frameworks: set(&[fw::IECMH, fw::NEUROSCIENCE, fw::TRAUMA_INFORMED]),
            age_groups: set(ALL_AGES),
            contexts: set(ALL_CONTEXTS),
            severities: [Severity::Medium, Severity::High].into(),
            body: "Invite {child} to a cozy calm space with you, not as a time-out, and breathe slowly together (smell the flower, blow out the candle) until the body settles.".into(),
            variations: strings(&[
                "Offer a choice of two calming tools, such as a squeeze ball or a picture book",
                "For infants, hold and sway rhythmically while humming",
            ]),
            benefits: strings(&[
                "self-regulation strategies children can eventually use on their own",
                "the understanding that every feeling is manageable",
            ]),
        },
        StrategyTemplate {
            id: "name_it_to_tame_it".into(),
            name: "Name It to Tame It".into(),
            frameworks: set(&[fw::NEUROSCIENCE, fw::SEL, fw::ATTACHMENT]),
            age_groups: set(WALKING_AGES),
            contexts: set(ALL_CONTEXTS),
            severities: Severity::ALL.into(),
            body: "Help {child} put a name to the feeling (\"Your body looks frustrated\") and offer a feelings chart so the emotion can be pointed to when words are hard.".into(),
            variations: strings(&[
                "Read a short feelings book during calm time to practice the words",
                "Model naming your own feelings throughout the day",
            ]),
            benefits: strings(&[
                "a rich emotional vocabulary",
                "the ability to ask for help with words instead of actions",
            ]),
        },
        StrategyTemplate {
            id: "movement_rich_circle".into(),
            name: "Movement-Rich Circle Time".into(),
            frameworks: set(&[fw::NEUROSCIENCE, fw::SEL]),
            age_groups: set(&[age_groups::TODDLER, age_groups::PRESCHOOL]),
            contexts: set(&[tags::CIRCLE_TIME]),
            severities: [Severity::Low, Severity::Medium].into(),
            body: "Shorten seated stretches to a few minutes and weave in movement songs, fidget tools, or a special job for {child} such as turning the pages.".into(),
            variations: strings(&[
                "Offer a wiggle cushion or standing spot at the back of the circle",
                "Split circle into two shorter gatherings",
            ]),
            benefits: strings(&[
                "sustained attention built gradually",
                "confidence participating in group learning",
            ]),
        },
        StrategyTemplate {
            id: "visual_routine_cards".into(),
            name: "Visual Routine Cards".into(),
            frameworks: set(&[fw::TRAUMA_INFORMED, fw::NEUROSCIENCE, fw::SEL]),
            age_groups: set(WALKING_AGES),
            contexts: set(&[
                tags::TRANSITION,
                tags::DROP_OFF,
                tags::NAP_TIME,
                tags::MEAL_TIME,
                tags::PICKUP,
            ]),
            severities: Severity::ALL.into(),
            body: "Post a picture schedule of the routine at {child}'s eye level and review it together, moving a clip as each step is finished.".into(),
            variations: strings(&[
                "Send a copy home so families can use the same pictures",
                "Let {child} carry a small personal version on a ring",
            ]),
            benefits: strings(&[
                "a sense of predictability and control",
                "planning and sequencing skills",
            ]),
        },
        StrategyTemplate {
            id: "family_style_meals".into(),
            name: "Family-Style Meal Connection".into(),
            frameworks: set(&[fw::ATTACHMENT, fw::SEL]),
            age_groups: set(WALKING_AGES),
            contexts: set(&[tags::MEAL_TIME]),
            severities: [Severity::Low, Severity::Medium].into(),
            body: "Sit and eat with the children, let {child} serve from a small bowl, and keep conversation warm and unhurried rather than focused on how much is eaten.".into(),
            variations: strings(&[
                "Give {child} a 'table helper' role such as passing napkins",
                "Start the meal with a simple shared ritual",
            ]),
            benefits: strings(&[
                "healthy, pressure-free relationships with food",
                "conversation and turn-taking skills",
            ]),
        },
        StrategyTemplate {
            id: "goodbye_ritual".into(),
            name: "Predictable Goodbye Ritual".into(),
            frameworks: set(&[fw::ATTACHMENT, fw::IECMH]),
            age_groups: set(ALL_AGES),
            contexts: set(&[tags::DROP_OFF, tags::PICKUP]),
            severities: Severity::ALL.into(),
            body: "Create a short, consistent goodbye routine with the family (a special wave at the window, a hug, a phrase) and then have a familiar educator receive {child} warmly.".into(),
            variations: strings(&[
                "Keep a family photo in {child}'s cubby to visit during the day",
                "Offer a transitional object from home",
            ]),
            benefits: strings(&[
                "confidence that loved ones come back",
                "the capacity to manage separation",
            ]),
        },
        StrategyTemplate {
            id: "whole_class_reset".into(),
            name: "Whole-Class Reset".into(),
            frameworks: set(&[fw::SEL, fw::TRAUMA_INFORMED, fw::IECMH]),
            age_groups: set(&[age_groups::PRESCHOOL, age_groups::SCHOOL_AGE]),
            contexts: set(&[
                tags::TRANSITION,
                tags::CLEANUP,
                tags::CIRCLE_TIME,
                tags::GROUP_WORK,
                tags::FREE_PLAY,
            ]),
            severities: Severity::ALL.into(),
            body: "Pause the whole group with a familiar signal, lead three slow breaths or a stretch together, and restate the next step with a picture cue before moving on.".into(),
            variations: strings(&[
                "Use a call-and-response chant as the signal",
                "Dim the lights briefly to cue the reset",
            ]),
            benefits: strings(&[
                "a shared sense of calm and belonging",
                "group self-regulation",
            ]),
        },
        StrategyTemplate {
            id: "collaborative_problem_solving".into(),
            name: "Collaborative Problem Solving".into(),
            frameworks: set(&[fw::SEL]),
            age_groups: set(&[age_groups::PRESCHOOL, age_groups::SCHOOL_AGE]),
            contexts: set(&[tags::FREE_PLAY, tags::OUTDOOR_PLAY, tags::GROUP_WORK]),
            severities: [Severity::Low, Severity::Medium].into(),
            body: "Once everyone is calm, sit with {child} and ask what was hard, share what you noticed, and brainstorm one idea to try next time.".into(),
            variations: strings(&[
                "Use puppets to act out the problem and the solution",
                "Draw the plan together as a simple comic strip",
            ]),
            benefits: strings(&[
                "creative problem-solving",
                "perspective-taking and empathy",
            ]),
        },
    ]
}

pub fn guidelines() -> Vec<LanguageGuideline> {
    vec![
        LanguageGuideline {
            id: "strengths_based_tone".into(),
            category: GuidelineCategory::Tone,
            rule: "Describe behavior as communication and skill-building, never as a character flaw.".into(),
            examples: vec![
                pair("challenging behavior", "bad behavior"),
                pair("having a hard time", "misbehaving"),
                pair("had a hard time", "misbehaved"),
                pair("struggling", "naughty"),
                pair("connection-seeking", "attention-seeking"),
                pair("seeking connection", "manipulative"),
            ],
        },
        LanguageGuideline {
            id: "developmental_tone".into(),
            category: GuidelineCategory::Tone,
            rule: "Use language that reflects developing skills rather than fixed traits.".into(),
            examples: vec![
                pair("asserting independence", "defiant"),
                pair("still learning to listen", "won't listen"),
                pair("disengaged", "lazy"),
                pair("child", "brat"),
            ],
        },
        LanguageGuideline {
            id: "curious_framing".into(),
            category: GuidelineCategory::Framing,
            rule: "Frame observations with curiosity about the need behind the behavior.".into(),
            examples: vec![pair(
                "I wonder what this behavior is telling us",
                "He is doing this on purpose",
            )],
        },
        LanguageGuideline {
            id: "avoid_labels".into(),
            category: GuidelineCategory::Avoidance,
            rule: "Avoid diagnostic or labeling language unless a qualified professional has provided it.".into(),
            examples: vec![pair("finds focusing hard right now", "is ADHD")],
        },
        LanguageGuideline {
            id: "family_culture".into(),
            category: GuidelineCategory::Cultural,
            rule: "Honor family routines and cultural practices; offer ideas, never prescriptions.".into(),
            examples: vec![pair(
                "something you might try at home",
                "what you need to do at home",
            )],
        },
    ]
}

fn pair(preferred: &str, avoid: &str) -> PhrasePair {
    PhrasePair {
        preferred: preferred.into(),
        avoid: avoid.into(),
    }
}

pub fn sel_competencies() -> Vec<Competency> {
    [
        ("self_awareness", "Self-Awareness", "Recognizing one's own emotions, thoughts, and values and how they influence behavior."),
        ("self_management", "Self-Management", "Regulating emotions, thoughts, and behaviors across situations."),
        ("social_awareness", "Social Awareness", "Understanding the perspectives of and empathizing with others."),
        ("relationship_skills", "Relationship Skills", "Establishing and maintaining healthy, supportive relationships."),
        ("responsible_decision_making", "Responsible Decision-Making", "Making caring, constructive choices about personal behavior and social interactions."),
    ]
    .into_iter()
    .map(|(id, name, description)| Competency {
        id: id.into(),
        name: name.into(),
        description: description.into(),
    })
    .collect()
}

pub fn future_readiness_skills() -> Vec<ReadinessSkill> {
    [
        ("emotional_regulation", "Emotional Regulation", "Managing big feelings well enough to keep learning and connecting."),
        ("executive_function", "Executive Function", "Planning, flexible thinking, and working memory."),
        ("collaboration", "Collaboration", "Working with others toward shared goals."),
        ("resilience", "Resilience", "Recovering from setbacks with support and self-belief."),
        ("communication", "Communication", "Expressing needs and ideas with words."),
    ]
    .into_iter()
    .map(|(id, name, description)| ReadinessSkill {
        id: id.into(),
        name: name.into(),
        description: description.into(),
    })
    .collect()
}
