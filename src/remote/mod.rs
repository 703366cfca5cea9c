//! Optional external generator path.
//!
//! No network client ships here: callers plug one in through
//! [`RemoteGenerator`]. Every remote attempt carries its own timeout and
//! falls back to the deterministic engine, which stays the source of truth
//! for the strategy list, metadata and the family letter.

pub mod parse;
pub mod prompt;

use async_trait::async_trait;
use std::time::Duration;

use crate::context::{BehaviorContext, ClassroomContext};
use crate::engine::CoachEngine;
use crate::error::{CoachError, Result};
use crate::language::LanguageNormalizer;
use crate::pipeline::{GeneratedResponse, PipelineKind, ResponseSource, SectionKey, select_frameworks};

pub use parse::parse_sections;
pub use prompt::{child_prompt, classroom_prompt};

/// A text-completion collaborator (hosted model, local model, canned replies).
#[async_trait]
pub trait RemoteGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

async fn complete_with_timeout(
    remote: &dyn RemoteGenerator,
    prompt: &str,
    timeout: Duration,
    operation: &str,
) -> Result<String> {
    match tokio::time::timeout(timeout, remote.complete(prompt)).await {
        Ok(result) => result,
        Err(_) => Err(CoachError::Timeout {
            operation: operation.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

/// Replace the narrative sections of `local` with the remote ones. Every
/// required section except the family letter must be present and non-blank.
fn overlay(
    mut local: GeneratedResponse,
    reply: &str,
    normalizer: &LanguageNormalizer,
) -> Result<GeneratedResponse> {
    let parsed = parse_sections(reply);
    let text_for = |key: SectionKey| {
        parsed
            .iter()
            .find(|(k, text)| *k == key && !text.trim().is_empty())
            .map(|(_, text)| text.as_str())
    };

    if let Some(missing) = local
        .required_sections()
        .iter()
        .find(|key| **key != SectionKey::FamilyScript && text_for(**key).is_none())
    {
        return Err(CoachError::generation(format!(
            "remote reply is missing section '{}'",
            missing.title()
        )));
    }

    for section in local.sections.iter_mut() {
        if section.key == SectionKey::FamilyScript {
            continue;
        }
        if let Some(text) = text_for(section.key) {
            section.text = normalizer.normalize(text);
        }
    }
    local.source = ResponseSource::Remote;
    Ok(local)
}

fn fall_back(pipeline: PipelineKind, err: &CoachError, local: GeneratedResponse) -> GeneratedResponse {
    tracing::warn!(?pipeline, "remote generation failed, using engine response: {}", err);
    local
}

/// Child pipeline through `remote`, falling back to the engine on error,
/// timeout or an incomplete reply. The call is bounded by the engine's
/// `remote_timeout`.
pub async fn generate_child_with_fallback(
    engine: &CoachEngine,
    remote: &dyn RemoteGenerator,
    ctx: BehaviorContext,
) -> GeneratedResponse {
    let timeout = engine.options().remote_timeout;
    let ctx = engine.resolve_child_context(ctx);
    let snapshot = engine.knowledge().snapshot();
    let normalizer = engine.normalizer_for(&snapshot);
    let selected = select_frameworks(PipelineKind::Child, ctx.severity);

    let local = engine.generate_child_behavior_strategy(ctx.clone());
    let prompt = child_prompt(&ctx, &snapshot, &selected, local.required_sections());

    let outcome = complete_with_timeout(remote, &prompt, timeout, "remote child generation")
        .await
        .and_then(|reply| overlay(local.clone(), &reply, &normalizer));
    match outcome {
        Ok(response) => response,
        Err(e) => fall_back(PipelineKind::Child, &e, local),
    }
}

pub async fn generate_classroom_with_fallback(
    engine: &CoachEngine,
    remote: &dyn RemoteGenerator,
    ctx: ClassroomContext,
) -> GeneratedResponse {
    let timeout = engine.options().remote_timeout;
    let ctx = engine.resolve_classroom_context(ctx);
    let snapshot = engine.knowledge().snapshot();
    let normalizer = engine.normalizer_for(&snapshot);
    let selected = select_frameworks(PipelineKind::Classroom, ctx.severity);

    let local = engine.generate_classroom_strategy(ctx.clone());
    let prompt = classroom_prompt(&ctx, &snapshot, &selected, local.required_sections());

    let outcome = complete_with_timeout(remote, &prompt, timeout, "remote classroom generation")
        .await
        .and_then(|reply| overlay(local.clone(), &reply, &normalizer));
    match outcome {
        Ok(response) => response,
        Err(e) => fall_back(PipelineKind::Classroom, &e, local),
    }
}
