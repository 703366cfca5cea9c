//! Rule-based framework selection.

use super::response::PipelineKind;
use crate::context::Severity;
use crate::knowledge::framework_ids as fw;

/// Frameworks applicable to a request, in preference order. Order decides
/// which framework's phrasing the composer reaches for first.
pub fn select_frameworks(pipeline: PipelineKind, severity: Option<Severity>) -> Vec<&'static str> {
    let selected = match pipeline {
        PipelineKind::Child => {
            let mut ids = vec![fw::ATTACHMENT, fw::IECMH, fw::NEUROSCIENCE, fw::SEL];
            if Severity::at_least(severity, Severity::Medium) {
                ids.push(fw::TRAUMA_INFORMED);
            }
            ids
        }
        PipelineKind::Classroom => vec![fw::IECMH, fw::SEL, fw::TRAUMA_INFORMED],
    };
    tracing::debug!(?pipeline, ?severity, frameworks = ?selected, "frameworks selected");
    selected
}
