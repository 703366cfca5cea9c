use coach_engine::pipeline::matcher::{CONNECTION_FIRST, MAX_STRATEGIES, TRANSITION_SUPPORT};
use coach_engine::{
    BehaviorContext, ChildRef, ClassroomContext, CoachEngine, PipelineKind, SectionKey, Severity,
    TemplateCriteria, TimeOfDay,
};

fn child(description: &str) -> BehaviorContext {
    BehaviorContext::new(description)
}

#[test]
fn high_severity_leads_with_connection() {
    let engine = CoachEngine::seeded();
    for tag in [None, Some("circle_time"), Some("transition"), Some("nap_time")] {
        let ctx = BehaviorContext {
            severity: Some(Severity::High),
            context_tag: tag.map(String::from),
            ..child("Hit a classmate and kept screaming")
        };
        let response = engine.generate_child_behavior_strategy(ctx);
        let attachment = response.section(SectionKey::AttachmentSupport).unwrap();
        assert!(!attachment.trim().is_empty());
        assert_eq!(response.practical_strategies[0], CONNECTION_FIRST);
    }
}

#[test]
fn transition_contexts_get_timed_warnings() {
    let engine = CoachEngine::seeded();
    for tag in ["transition", "transition_to_outdoor"] {
        for severity in [None, Some(Severity::Low), Some(Severity::High)] {
            let ctx = BehaviorContext {
                context_tag: Some(tag.into()),
                severity,
                ..child("Would not stop playing")
            };
            let response = engine.generate_child_behavior_strategy(ctx);
            assert!(
                response
                    .practical_strategies
                    .iter()
                    .any(|s| s == TRANSITION_SUPPORT),
                "missing transition support for {tag} / {severity:?}"
            );
        }
    }
}

#[test]
fn strategy_list_is_bounded() {
    let engine = CoachEngine::seeded();
    for description in [
        "",
        "quiet morning",
        "Meltdown at the transition to cleanup, very upset and screaming",
        "Refused lunch",
    ] {
        let response = engine.generate_child_behavior_strategy(child(description));
        let n = response.practical_strategies.len();
        assert!((3..=MAX_STRATEGIES).contains(&n), "{description:?} gave {n}");
        assert!(response.is_complete());
    }
}

#[test]
fn matching_is_repeatable() {
    let engine = CoachEngine::seeded();
    let criteria = TemplateCriteria {
        context: Some("transition".into()),
        severity: Some(Severity::Medium),
        ..Default::default()
    };
    let first: Vec<String> = engine
        .knowledge()
        .get_strategy_templates(&criteria)
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert!(!first.is_empty());
    for _ in 0..10 {
        let again: Vec<String> = engine
            .knowledge()
            .get_strategy_templates(&criteria)
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(first, again);
    }
}

#[test]
fn meltdown_at_circle_time_scenario() {
    let engine = CoachEngine::seeded();
    let ctx = engine.resolve_child_context(child(
        "Child had a meltdown during circle time this morning",
    ));
    assert_eq!(ctx.severity, Some(Severity::High));
    assert_eq!(ctx.context_tag.as_deref(), Some("circle_time"));
    assert_eq!(ctx.time_of_day, Some(TimeOfDay::Morning));

    let response = engine.generate_child_behavior_strategy(child(
        "Child had a meltdown during circle time this morning",
    ));
    assert_eq!(response.practical_strategies[0], CONNECTION_FIRST);
    assert!(response.frameworks.contains(&"trauma_informed_care".to_string()));
}

#[test]
fn chaotic_classroom_transition_scenario() {
    let engine = CoachEngine::seeded();
    let ctx = engine.resolve_classroom_context(ClassroomContext::new(
        "Class transition to cleanup was chaotic today",
    ));
    assert_eq!(ctx.severity, Some(Severity::High));
    assert_eq!(ctx.context_tag.as_deref(), Some("transition"));

    let response = engine.generate_classroom_strategy(ClassroomContext::new(
        "Class transition to cleanup was chaotic today",
    ));
    assert_eq!(response.pipeline, PipelineKind::Classroom);
    assert!(response.is_complete());
    assert_ne!(
        response.section(SectionKey::AlignedStrategy),
        response.section(SectionKey::AlternativeStrategy)
    );
}

#[test]
fn caller_fields_override_parsed_ones() {
    let engine = CoachEngine::seeded();
    let ctx = engine.resolve_child_context(BehaviorContext {
        severity: Some(Severity::Low),
        context_tag: Some("outdoor_play".into()),
        ..child("Meltdown during circle time")
    });
    assert_eq!(ctx.severity, Some(Severity::Low));
    assert_eq!(ctx.context_tag.as_deref(), Some("outdoor_play"));
}

#[test]
fn child_name_reaches_strategies_and_letter() {
    let engine = CoachEngine::seeded();
    let ctx = BehaviorContext {
        child: Some(ChildRef {
            name: "Maya".into(),
            age_years: Some(4),
            has_iep: true,
            has_behavior_plan: false,
        }),
        severity: Some(Severity::Medium),
        ..child("Pushed a friend at cleanup")
    };
    let response = engine.generate_child_behavior_strategy(ctx);
    assert!(response.practical_strategies.iter().any(|s| s.contains("Maya")));
    assert!(response.family_script.as_deref().unwrap().contains("Maya"));
}

#[test]
fn avoided_phrases_do_not_survive_composition() {
    let engine = CoachEngine::seeded();
    let response = engine.generate_child_behavior_strategy(child(
        "He was naughty and defiant, pure bad behavior at lunch",
    ));
    for section in &response.sections {
        let lower = section.text.to_lowercase();
        for avoided in ["naughty", "defiant", "bad behavior"] {
            assert!(
                !lower.contains(avoided),
                "{avoided:?} left in {:?}",
                section.key
            );
        }
    }
}

#[test]
fn blank_context_tag_never_renders_empty_phrase() {
    let engine = CoachEngine::seeded();
    let parsed = engine.generate_child_behavior_strategy(BehaviorContext {
        context_tag: Some(String::new()),
        ..child("Meltdown during circle time")
    });
    let trigger = parsed.section(SectionKey::ContextTrigger).unwrap();
    assert!(trigger.contains("circle time"), "{trigger}");

    let unknown = engine.generate_child_behavior_strategy(BehaviorContext {
        context_tag: Some(" ".into()),
        ..child("Upset")
    });
    let trigger = unknown.section(SectionKey::ContextTrigger).unwrap();
    assert!(!trigger.contains("during ."), "{trigger}");
    assert!(!trigger.contains("during  "), "{trigger}");
    assert!(trigger.contains("an unspecified part of the day"), "{trigger}");
}
