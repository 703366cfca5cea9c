//! Prompt templates for an external generator.
//!
//! Prompts ask for one `## Heading` block per required section so that
//! [`super::parse::parse_sections`] can map the reply back onto section keys.

use crate::context::{BehaviorContext, ClassroomContext};
use crate::knowledge::KnowledgeSnapshot;
use crate::pipeline::SectionKey;

fn push_framework_block(out: &mut String, snapshot: &KnowledgeSnapshot, selected: &[&str]) {
    out.push_str("Frameworks to draw on:\n");
    for id in selected {
        if let Some(fw) = snapshot.framework(id) {
            out.push_str(&format!("- {}: {}\n", fw.name, fw.core_idea));
            for hook in &fw.generation_hooks {
                out.push_str(&format!("  - {hook}\n"));
            }
        }
    }
    out.push('\n');
}

fn push_avoid_block(out: &mut String, snapshot: &KnowledgeSnapshot) {
    let pairs: Vec<String> = snapshot
        .guidelines
        .iter()
        .flat_map(|g| g.examples.iter())
        .map(|p| format!("\"{}\" instead of \"{}\"", p.preferred, p.avoid))
        .collect();
    if !pairs.is_empty() {
        out.push_str("Language: say ");
        out.push_str(&pairs.join("; "));
        out.push_str(".\n\n");
    }
}

fn push_headings(out: &mut String, sections: &[SectionKey]) {
    out.push_str("Respond in Markdown with exactly these headings, in order:\n");
    for key in sections {
        out.push_str(&format!("## {}\n", key.title()));
    }
}

fn field(label: &str, value: Option<&str>) -> String {
    format!("{label}: {}\n", value.unwrap_or("not specified"))
}

/// Child pipeline prompt. The family letter is produced locally, so its
/// heading is not requested.
pub fn child_prompt(
    ctx: &BehaviorContext,
    snapshot: &KnowledgeSnapshot,
    selected: &[&str],
    sections: &[SectionKey],
) -> String {
    let mut out = String::from(
        "You are a warm, practical early childhood coach writing for a teacher. \
         Use strengths-based, developmentally grounded language.\n\n",
    );
    out.push_str(&format!("Observation: {}\n", ctx.description.trim()));
    out.push_str(&field("Setting", ctx.context_tag.as_deref()));
    out.push_str(&field("Time of day", ctx.time_of_day.map(|t| t.as_str())));
    out.push_str(&field("Severity", ctx.severity.map(|s| s.as_str())));
    out.push_str(&field("Age group", ctx.age_group.as_deref()));
    out.push_str(&field("Teacher feeling", ctx.emotional_state.map(|e| e.as_str())));
    if !ctx.stressors.is_empty() {
        out.push_str(&format!("Stressors: {}\n", ctx.stressors.join(", ")));
    }
    if let Some(name) = ctx.child_name() {
        out.push_str(&format!("Child: {name}\n"));
    }
    out.push('\n');

    push_framework_block(&mut out, snapshot, selected);
    push_avoid_block(&mut out, snapshot);
    push_headings(
        &mut out,
        &sections
            .iter()
            .copied()
            .filter(|k| *k != SectionKey::FamilyScript)
            .collect::<Vec<_>>(),
    );
    out
}

pub fn classroom_prompt(
    ctx: &ClassroomContext,
    snapshot: &KnowledgeSnapshot,
    selected: &[&str],
    sections: &[SectionKey],
) -> String {
    let mut out = String::from(
        "You are an early childhood coach helping a teacher with a whole-class challenge. \
         Offer one aligned strategy and one alternative to test.\n\n",
    );
    out.push_str(&format!("Challenge: {}\n", ctx.description.trim()));
    out.push_str(&field("Setting", ctx.context_tag.as_deref()));
    out.push_str(&field("Severity", ctx.severity.map(|s| s.as_str())));
    out.push_str(&field("Grade level", ctx.grade_level.as_deref()));
    if let Some(size) = ctx.class_size {
        out.push_str(&format!("Class size: {size}\n"));
    }
    out.push('\n');

    push_framework_block(&mut out, snapshot, selected);
    push_avoid_block(&mut out, snapshot);
    push_headings(&mut out, sections);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use crate::pipeline::{CHILD_SECTIONS, CLASSROOM_SECTIONS};

    #[test]
    fn child_prompt_lists_headings_without_family_script() {
        let kb = KnowledgeBase::seeded();
        let prompt = child_prompt(
            &BehaviorContext::new("hit a friend at snack"),
            &kb.snapshot(),
            &["attachment_theory"],
            &CHILD_SECTIONS,
        );
        assert!(prompt.contains("## Acknowledgment"));
        assert!(prompt.contains("## Why These Strategies Work"));
        assert!(!prompt.contains("## Family Script"));
        assert!(prompt.contains("Attachment"));
    }

    #[test]
    fn classroom_prompt_has_four_headings() {
        let kb = KnowledgeBase::seeded();
        let prompt = classroom_prompt(
            &ClassroomContext::new("loud during circle"),
            &kb.snapshot(),
            &[],
            &CLASSROOM_SECTIONS,
        );
        assert_eq!(prompt.matches("\n## ").count(), 4);
    }
}
