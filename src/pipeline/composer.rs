//! Section composition for the child and classroom pipelines.
//!
//! Each section has one builder. Every section's final text passes through
//! the language normalizer before it is placed in the response.

use crate::context::{BehaviorContext, ClassroomContext, EmotionalState, Severity, age_groups, tags};
use crate::family::{BehaviorLog, FamilyScriptGenerator, Language};
use crate::knowledge::{KnowledgeSnapshot, framework_ids as fw};
use crate::language::LanguageNormalizer;

use super::matcher::MatchedStrategies;
use super::response::{GeneratedResponse, PipelineKind, SectionKey};

/// Shared read-only inputs for one composition.
pub struct Composer<'a> {
    pub snapshot: &'a KnowledgeSnapshot,
    pub normalizer: &'a LanguageNormalizer,
    pub family: &'a FamilyScriptGenerator,
    pub family_language: Language,
    pub parent_name: &'a str,
}

fn join_with_and(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [first, second] => format!("{first} and {second}"),
        [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn context_phrase(tag: Option<&str>) -> String {
    match tag {
        Some(tags::TRANSITION) => "a transition between activities".into(),
        Some(tags::CIRCLE_TIME) => "circle time".into(),
        Some(tags::MEAL_TIME) => "mealtime".into(),
        Some(tags::NAP_TIME) => "nap time".into(),
        Some(tags::DROP_OFF) => "drop-off".into(),
        Some(tags::PICKUP) => "pickup".into(),
        Some(tags::OUTDOOR_PLAY) => "outdoor play".into(),
        Some(tags::CLEANUP) => "cleanup".into(),
        Some(tags::GROUP_WORK) => "small-group work".into(),
        Some(tags::FREE_PLAY) => "free play".into(),
        Some(other) => other.replace('_', " "),
        None => "an unspecified part of the day".into(),
    }
}

fn severity_opening(severity: Option<Severity>) -> &'static str {
    match severity {
        Some(Severity::High) => {
            "That sounds like a really intense moment, and it makes sense that it is staying with you."
        }
        Some(Severity::Medium) => {
            "Thank you for sharing this; moments like these take real patience and care."
        }
        Some(Severity::Low) => {
            "Thanks for noticing this early; small moments are often where meaningful support begins."
        }
        None => "Thank you for taking the time to reflect on this moment.",
    }
}

fn mood_follow_on(state: EmotionalState) -> &'static str {
    match state {
        EmotionalState::Frustrated => {
            "Feeling frustrated when your best efforts aren't landing is completely human."
        }
        EmotionalState::Overwhelmed => {
            "When a moment feels this overwhelming, remember that you don't have to fix everything at once."
        }
        EmotionalState::Worried => "Your concern shows how much you care about this child's wellbeing.",
        EmotionalState::Exhausted => {
            "This work is tiring, and your own rest and regulation matter too."
        }
        EmotionalState::Sad => {
            "It's okay to feel sad after a hard moment; it reflects how connected you are."
        }
        EmotionalState::Hopeful => "Your hopefulness is itself a powerful tool for this child.",
    }
}

fn developmental_sentence(age_group: Option<&str>) -> &'static str {
    match age_group {
        Some(age_groups::INFANT) => {
            "Infants rely entirely on adults to regulate; crying and distress are their main ways to communicate."
        }
        Some(age_groups::TODDLER) => {
            "Toddlers are just beginning to put feelings into words, so big emotions often come out through their bodies."
        }
        Some(age_groups::PRESCHOOL) => {
            "Preschoolers are building impulse control and emotional vocabulary, skills that are still under construction."
        }
        Some(age_groups::SCHOOL_AGE) => {
            "School-age children are strengthening self-management, yet under stress they still need adult support to regulate."
        }
        _ => "At every age, regulation skills grow through many repetitions with a calm adult.",
    }
}

/// One clause per framework explaining why its strategies work.
fn framework_rationale(snapshot: &KnowledgeSnapshot, id: &str) -> Option<String> {
    let clause = match id {
        fw::ATTACHMENT => {
            "attachment theory shows that a secure relationship is the base from which children regulate and learn".to_string()
        }
        fw::IECMH => {
            "early childhood mental health research shows that children borrow an adult's calm through co-regulation before they can self-regulate".to_string()
        }
        fw::NEUROSCIENCE => {
            "developmental neuroscience shows that a calm nervous system comes before the thinking brain can listen and plan".to_string()
        }
        fw::SEL => {
            "social-emotional learning treats regulation and relationship skills as teachable, practiced skills".to_string()
        }
        fw::TRAUMA_INFORMED => {
            "trauma-informed care shows that predictability and choice lower a child's sense of threat".to_string()
        }
        other => {
            let framework = snapshot.framework(other)?;
            format!("{} holds that {}", framework.name, lower_first(framework.core_idea.trim_end_matches('.')))
        }
    };
    Some(clause)
}

const FALLBACK_RATIONALE: &str = "These strategies work because they pair connection with predictability, the foundation every other skill is built on.";

const FALLBACK_BENEFIT: &str = "Over time, consistent and caring responses build the emotional regulation and relationship skills children carry into school and beyond.";

impl Composer<'_> {
    fn framework_names(&self, selected: &[&str]) -> Vec<String> {
        selected
            .iter()
            .filter_map(|id| self.snapshot.framework(id).map(|f| f.name.clone()))
            .collect()
    }

    fn has(selected: &[&str], id: &str) -> bool {
        selected.contains(&id)
    }

    fn acknowledgment(&self, ctx: &BehaviorContext) -> String {
        let mut text = severity_opening(ctx.severity).to_string();
        if let Some(state) = ctx.emotional_state {
            text.push(' ');
            text.push_str(mood_follow_on(state));
        }
        text
    }

    fn observed_behavior(&self, ctx: &BehaviorContext) -> String {
        let description = ctx.description.trim();
        if description.is_empty() {
            return "No description of the behavior was provided.".to_string();
        }
        match ctx.child_name() {
            Some(name) => format!("You observed {name}: \"{description}\""),
            None => format!("You observed: \"{description}\""),
        }
    }

    fn context_trigger(&self, ctx: &BehaviorContext) -> String {
        let mut text = format!(
            "This happened during {}",
            context_phrase(ctx.context_tag.as_deref())
        );
        if let Some(time) = ctx.time_of_day {
            text.push(' ');
            text.push_str(time.phrase());
        }
        text.push('.');
        if !ctx.stressors.is_empty() {
            text.push_str(&format!(
                " Possible stressors noted: {}.",
                join_with_and(&ctx.stressors)
            ));
        }
        text
    }

    fn child_conceptualization(&self, ctx: &BehaviorContext, selected: &[&str]) -> String {
        let child = ctx.child_name().unwrap_or("this child");
        let names = self.framework_names(selected);
        let mut text = if names.is_empty() {
            format!("This behavior is best understood as communication: {child} is showing us a need.")
        } else {
            format!(
                "Through the lens of {}, this behavior is best understood as communication: {child} is showing us a need rather than trying to cause trouble.",
                join_with_and(&names)
            )
        };
        if let Some(lead) = selected.first().and_then(|id| self.snapshot.framework(id)) {
            text.push_str(&format!(
                " {} reminds us that {}",
                lead.name,
                lower_first(&lead.core_idea)
            ));
        }
        if Self::has(selected, fw::NEUROSCIENCE) && Severity::at_least(ctx.severity, Severity::Medium)
        {
            text.push_str(" Under this much stress the brain's alarm system takes over and the thinking brain that handles listening and planning goes offline, so calming has to come before teaching.");
        }
        if Self::has(selected, fw::TRAUMA_INFORMED) {
            text.push_str(&format!(
                " A trauma-informed lens also asks what would help {child} feel safe and in control again."
            ));
        }
        text
    }

    fn core_needs(&self, ctx: &BehaviorContext, selected: &[&str]) -> String {
        let child = ctx.child_name().unwrap_or("this child");
        let mut needs = Vec::new();
        if ctx.severity == Some(Severity::High) {
            needs.push("to feel physically and emotionally safe".to_string());
        }
        if Self::has(selected, fw::ATTACHMENT) {
            needs.push("to feel connected to a trusted adult".to_string());
        }
        if ctx.context_tag.as_deref().is_some_and(tags::is_transition) {
            needs.push("predictability about what comes next".to_string());
        }
        if needs.is_empty() {
            needs.push("patient support while new skills develop".to_string());
        }
        format!(
            "At the core, {} may need {}. {}",
            child,
            join_with_and(&needs),
            developmental_sentence(ctx.age_group.as_deref())
        )
    }

    fn attachment_support(&self, ctx: &BehaviorContext, selected: &[&str]) -> String {
        let child = ctx.child_name().unwrap_or("the child");
        let mut parts = Vec::new();
        if Severity::at_least(ctx.severity, Severity::Medium) {
            parts.push(format!(
                "Get down to {child}'s eye level and use a slow, quiet voice; your calm body signals safety."
            ));
        }
        if Self::has(selected, fw::ATTACHMENT) {
            parts.push("Acknowledge the feeling out loud before anything else (\"You wanted more time, and stopping is hard\").".to_string());
        }
        if Self::has(selected, fw::IECMH) {
            parts.push(format!(
                "Lend your calm through co-regulation: slow your own breathing and stay nearby until {child}'s body settles."
            ));
        }
        if parts.is_empty() {
            parts.push("Small moments of warm, one-on-one attention throughout the day strengthen the relationship that makes every other strategy work.".to_string());
        }
        parts.join(" ")
    }

    fn implementation_guidance(&self, ctx: &BehaviorContext) -> String {
        let child = ctx.child_name().unwrap_or("the child");
        let mut parts = Vec::new();
        if Severity::at_least(ctx.severity, Severity::Medium) {
            parts.push(format!(
                "Start by helping {child} calm down first; teaching and problem-solving only land once the body is regulated."
            ));
        }
        parts.push(format!(
            "Choose one or two strategies and use them consistently for at least two weeks so {child} learns what to expect, and share the plan with co-teachers so everyone responds the same way."
        ));
        if ctx.child.as_ref().is_some_and(|c| c.has_support_plan()) {
            parts.push(format!(
                "Check these ideas against {child}'s existing support plan and coordinate with the team that wrote it."
            ));
        }
        if let Some(style) = ctx.teaching_style.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            parts.push(format!("Adapt each strategy to your {style} teaching style."));
        }
        if let Some(style) = ctx.learning_style.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            parts.push(format!(
                "Lean on {child}'s preference for {style} learning when introducing new routines."
            ));
        }
        parts.join(" ")
    }

    /// Clauses for the selected frameworks the primary template references.
    fn why_strategies_work(&self, matched: &MatchedStrategies, selected: &[&str]) -> String {
        let Some(primary) = matched.primary() else {
            return FALLBACK_RATIONALE.to_string();
        };
        let clauses: Vec<String> = selected
            .iter()
            .filter(|id| primary.frameworks.contains(**id))
            .filter_map(|id| framework_rationale(self.snapshot, id))
            .collect();
        if clauses.is_empty() {
            return FALLBACK_RATIONALE.to_string();
        }
        format!(
            "{} works because {}.",
            primary.name,
            clauses.join("; ")
        )
    }

    fn future_readiness(&self, matched: &MatchedStrategies) -> String {
        let benefits: Vec<String> = matched
            .primary()
            .map(|t| t.benefits.iter().take(2).cloned().collect())
            .unwrap_or_default();
        if benefits.is_empty() {
            return FALLBACK_BENEFIT.to_string();
        }
        format!(
            "Over time, this approach builds {}, foundations for success in school and beyond.",
            benefits.join(" and ")
        )
    }

    fn family_script(&self, ctx: &BehaviorContext, practical: &[String]) -> String {
        let log = BehaviorLog {
            description: ctx.description.clone(),
            context_tag: ctx.context_tag.clone(),
            time_of_day: ctx.time_of_day,
            severity: ctx.severity,
            strategies_used: practical.iter().take(2).cloned().collect(),
            logged_on: None,
            response: None,
        };
        self.family.generate(
            ctx.child.as_ref(),
            Some(&log),
            self.parent_name,
            self.family_language,
            None,
            self.normalizer,
        )
    }

    fn finish(&self, response: &mut GeneratedResponse, key: SectionKey, text: String) {
        response.push(key, self.normalizer.normalize(&text));
    }

    /// Compose the eleven child pipeline sections. `ctx` is already merged.
    pub fn compose_child(
        &self,
        ctx: &BehaviorContext,
        selected: &[&str],
        matched: &MatchedStrategies,
        practical: Vec<String>,
    ) -> GeneratedResponse {
        let mut response = GeneratedResponse::new(PipelineKind::Child);
        response.frameworks = selected.iter().map(|s| s.to_string()).collect();
        response.templates = matched.template_ids();

        let practical: Vec<String> = practical
            .iter()
            .map(|s| self.normalizer.normalize(s))
            .collect();
        let numbered = practical
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n");
        let family = self
            .normalizer
            .normalize(&self.family_script(ctx, &practical));

        self.finish(&mut response, SectionKey::Acknowledgment, self.acknowledgment(ctx));
        self.finish(&mut response, SectionKey::ObservedBehavior, self.observed_behavior(ctx));
        self.finish(
            &mut response,
            SectionKey::ContextTrigger,
            self.context_trigger(ctx),
        );
        self.finish(
            &mut response,
            SectionKey::Conceptualization,
            self.child_conceptualization(ctx, selected),
        );
        self.finish(
            &mut response,
            SectionKey::CoreNeedsDevelopment,
            self.core_needs(ctx, selected),
        );
        self.finish(
            &mut response,
            SectionKey::AttachmentSupport,
            self.attachment_support(ctx, selected),
        );
        self.finish(&mut response, SectionKey::PracticalStrategies, numbered);
        self.finish(
            &mut response,
            SectionKey::ImplementationGuidance,
            self.implementation_guidance(ctx),
        );
        self.finish(
            &mut response,
            SectionKey::WhyStrategiesWork,
            self.why_strategies_work(matched, selected),
        );
        self.finish(
            &mut response,
            SectionKey::FutureReadinessBenefit,
            self.future_readiness(matched),
        );
        response.push(SectionKey::FamilyScript, family.clone());

        response.practical_strategies = practical;
        response.family_script = Some(family);
        response
    }

    fn classroom_conceptualization(&self, ctx: &ClassroomContext, selected: &[&str]) -> String {
        let names = self.framework_names(selected);
        let setting = context_phrase(ctx.context_tag.as_deref());
        let mut text = if names.is_empty() {
            format!(
                "Disruption during {setting} usually signals that the group's shared capacity for regulation has been stretched, not that the class is unwilling."
            )
        } else {
            format!(
                "Through the lens of {}, whole-group disruption during {setting} usually signals that the group's shared capacity for regulation has been stretched, not that the class is unwilling.",
                join_with_and(&names)
            )
        };
        if let Some(size) = ctx.class_size.filter(|n| *n >= 20) {
            text.push_str(&format!(
                " With {size} children in the room, noise and waiting multiply quickly, so structure carries more of the load."
            ));
        }
        if ctx.severity == Some(Severity::High) {
            text.push_str(" When things feel this chaotic, restoring a sense of safety and predictability for everyone comes first.");
        }
        if !ctx.stressors.is_empty() {
            text.push_str(&format!(
                " Stressors in the room right now include {}.",
                join_with_and(&ctx.stressors)
            ));
        }
        text
    }

    /// Compose the four classroom pipeline sections. `ctx` is already merged.
    pub fn compose_classroom(
        &self,
        ctx: &ClassroomContext,
        selected: &[&str],
        matched: &MatchedStrategies,
        practical: Vec<String>,
    ) -> GeneratedResponse {
        let mut response = GeneratedResponse::new(PipelineKind::Classroom);
        response.frameworks = selected.iter().map(|s| s.to_string()).collect();
        response.templates = matched.template_ids();

        self.finish(
            &mut response,
            SectionKey::Conceptualization,
            self.classroom_conceptualization(ctx, selected),
        );
        self.finish(
            &mut response,
            SectionKey::AlignedStrategy,
            matched.primary_text(None),
        );
        self.finish(
            &mut response,
            SectionKey::AlternativeStrategy,
            format!("Alternative to test: {}", matched.alternative_text(None)),
        );
        self.finish(
            &mut response,
            SectionKey::FutureReadinessBenefit,
            self.future_readiness(matched),
        );

        response.practical_strategies = practical
            .iter()
            .map(|s| self.normalizer.normalize(s))
            .collect();
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_with_and_handles_lengths() {
        let s = |v: &[&str]| v.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        assert_eq!(join_with_and(&s(&[])), "");
        assert_eq!(join_with_and(&s(&["a"])), "a");
        assert_eq!(join_with_and(&s(&["a", "b"])), "a and b");
        assert_eq!(join_with_and(&s(&["a", "b", "c"])), "a, b, and c");
    }

    #[test]
    fn unknown_context_tag_is_humanized() {
        assert_eq!(context_phrase(Some("field_trip")), "field trip");
        assert_eq!(context_phrase(None), "an unspecified part of the day");
    }
}
