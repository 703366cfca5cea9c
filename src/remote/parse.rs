//! Split a Markdown reply into sections keyed by heading.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::pipeline::SectionKey;

static HEADING: Lazy<Regex> = Lazy::new(|| {
    // Heading levels 2 and 3; optional trailing colon or bold markers.
    Regex::new(r"(?m)^#{2,3}[ \t]*\**(.+?)\**:?[ \t]*$").expect("static heading regex")
});

/// Sections found in `reply`, in reply order. Unknown headings and the text
/// under them are skipped; a repeated heading keeps its first occurrence.
pub fn parse_sections(reply: &str) -> Vec<(SectionKey, String)> {
    let heads: Vec<(usize, usize, Option<SectionKey>)> = HEADING
        .captures_iter(reply)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let title = caps.get(1)?.as_str();
            Some((whole.start(), whole.end(), SectionKey::from_heading(title)))
        })
        .collect();

    let mut out: Vec<(SectionKey, String)> = Vec::new();
    for (i, (_, body_start, key)) in heads.iter().enumerate() {
        let Some(key) = key else {
            tracing::debug!("skipping unrecognized heading in remote reply");
            continue;
        };
        if out.iter().any(|(k, _)| k == key) {
            continue;
        }
        let body_end = heads.get(i + 1).map(|h| h.0).unwrap_or(reply.len());
        let body = reply[*body_start..body_end].trim();
        out.push((*key, body.to_string()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_map_to_keys() {
        let reply = "Intro line\n## Acknowledgment\nThat was hard.\n\n### **Context & Trigger**:\nAt cleanup.\n## Mystery\nignored\n## Observed Behavior\nThrew blocks.";
        let sections = parse_sections(reply);
        assert_eq!(
            sections,
            vec![
                (SectionKey::Acknowledgment, "That was hard.".to_string()),
                (SectionKey::ContextTrigger, "At cleanup.".to_string()),
                (SectionKey::ObservedBehavior, "Threw blocks.".to_string()),
            ]
        );
    }

    #[test]
    fn empty_body_is_kept_empty() {
        let sections = parse_sections("## Aligned Strategy\n\n## Alternative Strategy to Test\nTry stations.");
        assert_eq!(sections[0], (SectionKey::AlignedStrategy, String::new()));
        assert_eq!(sections[1].1, "Try stations.");
    }

    #[test]
    fn no_headings_yields_nothing() {
        assert!(parse_sections("just prose").is_empty());
    }
}
