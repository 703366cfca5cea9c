//! Shared knowledge base with copy-on-write snapshots.
//!
//! Readers take an `Arc` to an immutable [`KnowledgeSnapshot`]; writers
//! clone the live snapshot, mutate and validate the clone, then swap it in
//! under the write lock. A request that grabbed a snapshot keeps a
//! consistent view even while an import runs.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

use super::seed::seed_knowledge;
use super::types::{
    Competency, Framework, FrameworkPatch, GuidelineCategory, KnowledgeExport, KnowledgeImport,
    LanguageGuideline, ReadinessSkill, StrategyTemplate, StrategyTemplatePatch, TemplateCriteria,
};
use crate::error::{CoachError, Result};

/// One consistent version of every knowledge base collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeSnapshot {
    pub frameworks: Vec<Framework>,
    pub guidelines: Vec<LanguageGuideline>,
    pub templates: Vec<StrategyTemplate>,
    pub sel_competencies: Vec<Competency>,
    pub future_readiness_skills: Vec<ReadinessSkill>,
}

impl KnowledgeSnapshot {
    pub fn framework(&self, id: &str) -> Option<&Framework> {
        self.frameworks.iter().find(|f| f.id == id)
    }

    /// Templates satisfying `criteria`, in registration order.
    pub fn templates_matching<'a>(
        &'a self,
        criteria: &'a TemplateCriteria,
    ) -> impl Iterator<Item = &'a StrategyTemplate> + 'a {
        self.templates.iter().filter(move |t| criteria.matches(t))
    }

    pub fn guidelines_in(
        &self,
        category: Option<GuidelineCategory>,
    ) -> impl Iterator<Item = &LanguageGuideline> {
        self.guidelines
            .iter()
            .filter(move |g| category.is_none_or(|c| g.category == c))
    }

    fn to_export(&self) -> KnowledgeExport {
        KnowledgeExport {
            frameworks: self.frameworks.clone(),
            guidelines: self.guidelines.clone(),
            templates: self.templates.clone(),
            sel_competencies: self.sel_competencies.clone(),
            future_readiness_skills: self.future_readiness_skills.clone(),
            fingerprint: None,
        }
    }

    fn fingerprint(&self) -> String {
        use sha1::{Digest, Sha1};
        // Serializing plain Vecs of derive(Serialize) structs cannot fail.
        let body = serde_json::to_vec(&self.to_export()).unwrap_or_default();
        let mut hasher = Sha1::new();
        hasher.update(&body);
        format!("{:x}", hasher.finalize())
    }

    /// Swap in every collection present in `data`; names what was replaced.
    fn apply_import(&mut self, data: KnowledgeImport) -> Vec<&'static str> {
        let mut replaced = Vec::new();
        if let Some(v) = data.frameworks {
            self.frameworks = v;
            replaced.push("frameworks");
        }
        if let Some(v) = data.guidelines {
            self.guidelines = v;
            replaced.push("guidelines");
        }
        if let Some(v) = data.templates {
            self.templates = v;
            replaced.push("templates");
        }
        if let Some(v) = data.sel_competencies {
            self.sel_competencies = v;
            replaced.push("sel_competencies");
        }
        if let Some(v) = data.future_readiness_skills {
            self.future_readiness_skills = v;
            replaced.push("future_readiness_skills");
        }
        replaced
    }

    /// Shape checks applied before any new snapshot goes live.
    fn validate(&self) -> Result<()> {
        let mut framework_ids = HashSet::new();
        for f in &self.frameworks {
            if f.id.trim().is_empty() || f.name.trim().is_empty() {
                return Err(CoachError::invalid_import(
                    "framework with empty id or name",
                ));
            }
            if !framework_ids.insert(f.id.as_str()) {
                return Err(CoachError::invalid_import(format!(
                    "duplicate framework id '{}'",
                    f.id
                )));
            }
        }

        let mut template_ids = HashSet::new();
        for t in &self.templates {
            if t.id.trim().is_empty() || t.name.trim().is_empty() {
                return Err(CoachError::invalid_import("template with empty id or name"));
            }
            if t.body.trim().is_empty() {
                return Err(CoachError::invalid_import(format!(
                    "template '{}' has an empty body",
                    t.id
                )));
            }
            if !template_ids.insert(t.id.as_str()) {
                return Err(CoachError::invalid_import(format!(
                    "duplicate template id '{}'",
                    t.id
                )));
            }
            for fw in &t.frameworks {
                if !framework_ids.contains(fw.as_str()) {
                    let hint = suggest(fw, framework_ids.iter().copied())
                        .map(|s| format!(" Did you mean '{s}'?"))
                        .unwrap_or_default();
                    return Err(CoachError::invalid_import(format!(
                        "template '{}' references unknown framework '{}'.{}",
                        t.id, fw, hint
                    )));
                }
            }
        }

        let mut guideline_ids = HashSet::new();
        for g in &self.guidelines {
            if g.id.trim().is_empty() {
                return Err(CoachError::invalid_import("guideline with empty id"));
            }
            if !guideline_ids.insert(g.id.as_str()) {
                return Err(CoachError::invalid_import(format!(
                    "duplicate guideline id '{}'",
                    g.id
                )));
            }
            if g.examples.iter().any(|p| p.avoid.trim().is_empty()) {
                return Err(CoachError::invalid_import(format!(
                    "guideline '{}' has an empty avoid phrase",
                    g.id
                )));
            }
        }

        Ok(())
    }
}

/// Closest known id by Jaro-Winkler similarity, if reasonably close.
fn suggest<'a>(needle: &str, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .map(|c| (c, strsim::jaro_winkler(needle, c)))
        .filter(|(_, score)| *score > 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

/// Process-wide knowledge base. Construct one per engine (or per test).
#[derive(Debug)]
pub struct KnowledgeBase {
    inner: RwLock<Arc<KnowledgeSnapshot>>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::seeded()
    }
}

impl KnowledgeBase {
    /// Knowledge base preloaded with the built-in frameworks, templates
    /// and guidelines.
    pub fn seeded() -> Self {
        let seed = seed_knowledge();
        Self::from_snapshot(KnowledgeSnapshot {
            frameworks: seed.frameworks,
            guidelines: seed.guidelines,
            templates: seed.templates,
            sel_competencies: seed.sel_competencies,
            future_readiness_skills: seed.future_readiness_skills,
        })
    }

    pub fn empty() -> Self {
        Self::from_snapshot(KnowledgeSnapshot::default())
    }

    fn from_snapshot(snapshot: KnowledgeSnapshot) -> Self {
        Self {
            inner: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Current consistent view. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<KnowledgeSnapshot> {
        self.inner.read().clone()
    }

    /// Reinstate a snapshot previously taken with [`Self::snapshot`].
    pub fn restore(&self, snapshot: Arc<KnowledgeSnapshot>) {
        *self.inner.write() = snapshot;
        tracing::info!("knowledge base restored from snapshot");
    }

    /// Clone, mutate, validate, swap. The write lock is held throughout so
    /// concurrent writers cannot lose each other's updates.
    fn mutate<T>(&self, f: impl FnOnce(&mut KnowledgeSnapshot) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.write();
        let mut next = (**guard).clone();
        let out = f(&mut next)?;
        next.validate()?;
        *guard = Arc::new(next);
        Ok(out)
    }

    pub fn get_framework(&self, id: &str) -> Option<Framework> {
        self.snapshot().framework(id).cloned()
    }

    /// Every framework in registration order. `_criteria` is accepted for
    /// interface compatibility and not applied.
    pub fn get_applicable_frameworks(&self, _criteria: &TemplateCriteria) -> Vec<Framework> {
        self.snapshot().frameworks.clone()
    }

    pub fn get_strategy_templates(&self, criteria: &TemplateCriteria) -> Vec<StrategyTemplate> {
        self.snapshot()
            .templates_matching(criteria)
            .cloned()
            .collect()
    }

    pub fn get_language_guidelines(
        &self,
        category: Option<GuidelineCategory>,
    ) -> Vec<LanguageGuideline> {
        self.snapshot().guidelines_in(category).cloned().collect()
    }

    pub fn update_framework(&self, id: &str, patch: FrameworkPatch) -> Result<Framework> {
        let updated = self.mutate(|kb| {
            let framework = kb
                .frameworks
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or_else(|| CoachError::not_found("Framework", id))?;
            framework.apply(patch);
            Ok(framework.clone())
        })?;
        tracing::info!(framework = id, "framework updated");
        Ok(updated)
    }

    /// Append a template; it ranks after every existing template.
    pub fn add_strategy_template(&self, template: StrategyTemplate) -> Result<()> {
        let id = template.id.clone();
        self.mutate(|kb| {
            if kb.templates.iter().any(|t| t.id == template.id) {
                return Err(CoachError::Validation {
                    message: format!("template '{}' already exists", template.id),
                });
            }
            kb.templates.push(template);
            Ok(())
        })
        .map_err(as_validation)?;
        tracing::info!(template = %id, "strategy template added");
        Ok(())
    }

    pub fn update_strategy_template(
        &self,
        id: &str,
        patch: StrategyTemplatePatch,
    ) -> Result<StrategyTemplate> {
        let updated = self
            .mutate(|kb| {
                let template = kb
                    .templates
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| CoachError::not_found("StrategyTemplate", id))?;
                template.apply(patch);
                Ok(template.clone())
            })
            .map_err(as_validation)?;
        tracing::info!(template = id, "strategy template updated");
        Ok(updated)
    }

    pub fn export_knowledge_base(&self) -> KnowledgeExport {
        let snapshot = self.snapshot();
        let mut export = snapshot.to_export();
        export.fingerprint = Some(snapshot.fingerprint());
        export
    }

    pub fn fingerprint(&self) -> String {
        self.snapshot().fingerprint()
    }

    /// Replace every collection present in `data`. The payload is validated
    /// as a whole against the resulting knowledge base; on error nothing
    /// changes.
    pub fn import_knowledge_base(&self, data: KnowledgeImport) -> Result<()> {
        let replaced = self.mutate(|kb| Ok(kb.apply_import(data)))?;
        tracing::info!(collections = ?replaced, "knowledge base imported");
        Ok(())
    }

    /// Parse and import a JSON payload (an export or any subset of it).
    pub fn import_json(&self, json: &str) -> Result<()> {
        self.import_knowledge_base(parse_import(json)?)
    }

    /// Run the import checks without touching the live knowledge base.
    /// Returns the export the import would produce, fingerprint included.
    pub fn validate_import(&self, data: KnowledgeImport) -> Result<KnowledgeExport> {
        let mut next = (*self.snapshot()).clone();
        next.apply_import(data);
        next.validate()?;
        let mut export = next.to_export();
        export.fingerprint = Some(next.fingerprint());
        Ok(export)
    }

    pub fn validate_json(&self, json: &str) -> Result<KnowledgeExport> {
        self.validate_import(parse_import(json)?)
    }
}

fn parse_import(json: &str) -> Result<KnowledgeImport> {
    serde_json::from_str(json)
        .map_err(|e| CoachError::invalid_import(format!("malformed payload: {e}")))
}

/// Admin edits that fail snapshot validation are caller mistakes, not imports.
fn as_validation(err: CoachError) -> CoachError {
    match err {
        CoachError::InvalidImport { message } => CoachError::Validation { message },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Severity;
    use crate::knowledge::framework_ids;

    #[test]
    fn empty_criteria_return_all_templates_in_order() {
        let kb = KnowledgeBase::seeded();
        let all = kb.get_strategy_templates(&TemplateCriteria::default());
        let seeded: Vec<String> = crate::knowledge::seed::templates()
            .into_iter()
            .map(|t| t.id)
            .collect();
        let got: Vec<String> = all.into_iter().map(|t| t.id).collect();
        assert_eq!(got, seeded);
    }

    #[test]
    fn filter_by_context_and_severity() {
        let kb = KnowledgeBase::seeded();
        let criteria = TemplateCriteria {
            context: Some("circle_time".into()),
            severity: Some(Severity::Low),
            ..Default::default()
        };
        let ids: Vec<String> = kb
            .get_strategy_templates(&criteria)
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert!(ids.contains(&"movement_rich_circle".to_string()));
        assert!(!ids.contains(&"connect_before_correct".to_string()));
    }

    #[test]
    fn update_framework_merges_partially() {
        let kb = KnowledgeBase::seeded();
        let before = kb.get_framework(framework_ids::SEL).unwrap();
        let after = kb
            .update_framework(
                framework_ids::SEL,
                FrameworkPatch {
                    core_idea: Some("Skills are teachable.".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(after.core_idea, "Skills are teachable.");
        assert_eq!(after.name, before.name);
        assert_eq!(after.principles, before.principles);
    }

    #[test]
    fn update_unknown_framework_is_not_found() {
        let kb = KnowledgeBase::seeded();
        let err = kb
            .update_framework("phrenology", FrameworkPatch::default())
            .unwrap_err();
        assert!(matches!(err, CoachError::NotFound { .. }));
    }

    #[test]
    fn added_template_ranks_last() {
        let kb = KnowledgeBase::seeded();
        let mut t = crate::knowledge::seed::templates().remove(0);
        t.id = "late_addition".into();
        kb.add_strategy_template(t).unwrap();
        let all = kb.get_strategy_templates(&TemplateCriteria::default());
        assert_eq!(all.last().unwrap().id, "late_addition");
    }

    #[test]
    fn duplicate_template_rejected() {
        let kb = KnowledgeBase::seeded();
        let t = crate::knowledge::seed::templates().remove(0);
        assert!(kb.add_strategy_template(t).is_err());
    }

    #[test]
    fn template_update_cannot_reference_missing_framework() {
        let kb = KnowledgeBase::seeded();
        let err = kb
            .update_strategy_template(
                "goodbye_ritual",
                StrategyTemplatePatch {
                    frameworks: Some(["attachment_theroy".to_string()].into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Did you mean 'attachment_theory'"), "{msg}");
        // unchanged
        let t = kb
            .snapshot()
            .templates
            .iter()
            .find(|t| t.id == "goodbye_ritual")
            .cloned()
            .unwrap();
        assert!(t.frameworks.contains(framework_ids::ATTACHMENT));
    }

    #[test]
    fn invalid_import_leaves_state_untouched() {
        let kb = KnowledgeBase::seeded();
        let before = kb.fingerprint();
        let err = kb
            .import_knowledge_base(KnowledgeImport {
                frameworks: Some(vec![]),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, CoachError::InvalidImport { .. }));
        assert_eq!(kb.fingerprint(), before);
    }

    #[test]
    fn malformed_json_is_invalid_import() {
        let kb = KnowledgeBase::seeded();
        let err = kb.import_json(r#"{"templates": [{"id": 3}]}"#).unwrap_err();
        assert!(matches!(err, CoachError::InvalidImport { .. }));
    }

    #[test]
    fn snapshot_survives_import() {
        let kb = KnowledgeBase::seeded();
        let held = kb.snapshot();
        kb.import_knowledge_base(KnowledgeImport {
            guidelines: Some(vec![]),
            ..Default::default()
        })
        .unwrap();
        assert!(!held.guidelines.is_empty());
        assert!(kb.get_language_guidelines(None).is_empty());
        kb.restore(held);
        assert!(!kb.get_language_guidelines(None).is_empty());
    }

    #[test]
    fn validate_import_reports_without_applying() {
        let kb = KnowledgeBase::seeded();
        let before = kb.fingerprint();
        let total = kb.snapshot().templates.len();

        let mut templates = kb.snapshot().templates.clone();
        templates.truncate(2);
        let preview = kb
            .validate_import(KnowledgeImport {
                templates: Some(templates),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(preview.templates.len(), 2);
        assert_ne!(preview.fingerprint.as_deref(), Some(before.as_str()));
        assert_eq!(kb.fingerprint(), before);
        assert_eq!(kb.snapshot().templates.len(), total);

        assert!(kb.validate_json(r#"{"frameworks": []}"#).is_err());
        assert_eq!(kb.fingerprint(), before);
    }

    #[test]
    fn guidelines_filter_by_category() {
        let kb = KnowledgeBase::seeded();
        let tone = kb.get_language_guidelines(Some(GuidelineCategory::Tone));
        assert!(!tone.is_empty());
        assert!(tone.iter().all(|g| g.category == GuidelineCategory::Tone));
    }
}
