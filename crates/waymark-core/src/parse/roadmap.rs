//! Roadmap parser.
//!
//! Recognizes, line by line:
//! - `Project: <name>` (or `Project Name:`), which sets the project name.
//! - `Phase <n>: <name>` headers, which open a new phase.
//! - Step lines: `1.2 text`, `Step 3: text`, `4. text`, `4) text`, and
//!   `-`/`*`/`•` bullets, appended to the open phase.
//!
//! Step lines seen before any phase header are skipped. Declared phase
//! numbers are kept verbatim, in the order encountered.

use std::sync::OnceLock;

use regex::Regex;

use super::content_lines;
use crate::fallback;
use crate::model::{Category, Phase, Roadmap, Step};
use crate::normalize::normalize;

/// Maximum number of characters kept in a step title before `"..."` is
/// appended.
pub const MAX_TITLE_LEN: usize = 50;

/// Outcome of parsing a roadmap response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoadmapParse {
    Parsed {
        project_name: Option<String>,
        phases: Vec<Phase>,
    },
    /// No phase header, or no phase holding at least one step.
    Empty,
}

impl RoadmapParse {
    /// Convert into a [`Roadmap`], deriving a project name from the goal when
    /// the response did not carry one. `None` for [`RoadmapParse::Empty`].
    pub fn into_roadmap(self, goal: &str, category: Category) -> Option<Roadmap> {
        match self {
            Self::Parsed {
                project_name,
                phases,
            } => Some(Roadmap {
                project_name: project_name
                    .unwrap_or_else(|| fallback::project_name(goal, category)),
                phases,
            }),
            Self::Empty => None,
        }
    }
}

struct Patterns {
    project: Regex,
    phase: Regex,
    dotted: Regex,
    labeled: Regex,
    numbered: Regex,
    bullet: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        project: Regex::new(r"(?i)^project(?:\s+name)?\s*:\s*(.+)$").expect("static regex"),
        phase: Regex::new(r"(?i)^phase\s+(\d+)\s*:\s*(.*)$").expect("static regex"),
        dotted: Regex::new(r"^\d+\.\d+\.?\s*(.+)$").expect("static regex"),
        labeled: Regex::new(r"(?i)^step\s+\d+\s*[:.)]\s*(.+)$").expect("static regex"),
        numbered: Regex::new(r"^\d+[.)]\s+(.+)$").expect("static regex"),
        bullet: Regex::new(r"^[-*•]\s*(.+)$").expect("static regex"),
    })
}

/// Truncate `content` to [`MAX_TITLE_LEN`] characters, appending `"..."`
/// when anything was cut. Counts characters, not bytes.
pub fn truncate_title(content: &str) -> String {
    if content.chars().count() <= MAX_TITLE_LEN {
        return content.to_owned();
    }
    let head: String = content.chars().take(MAX_TITLE_LEN).collect();
    format!("{}...", head.trim_end())
}

fn step_content(line: &str) -> Option<&str> {
    let p = patterns();
    [&p.dotted, &p.labeled, &p.numbered, &p.bullet]
        .into_iter()
        .find_map(|re| re.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|content| content.chars().any(char::is_alphanumeric))
}

fn clean_name(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_owned()
}

/// Parse normalized roadmap text into phases.
pub fn parse_roadmap(text: &str) -> RoadmapParse {
    let p = patterns();
    let mut project_name: Option<String> = None;
    let mut phases: Vec<Phase> = Vec::new();
    let mut current: Option<Phase> = None;

    for line in content_lines(text) {
        if let Some(caps) = p.phase.captures(line) {
            // Digit runs too long for u32 are not treated as headers.
            if let Ok(number) = caps[1].parse::<u32>() {
                if let Some(done) = current.take() {
                    phases.push(done);
                }
                let name = clean_name(&caps[2]);
                current = Some(Phase {
                    number,
                    name: if name.is_empty() {
                        format!("Phase {number}")
                    } else {
                        name
                    },
                    steps: Vec::new(),
                });
                continue;
            }
        }

        if project_name.is_none() && current.is_none() && phases.is_empty() {
            if let Some(caps) = p.project.captures(line) {
                let name = clean_name(&caps[1]);
                if !name.is_empty() {
                    project_name = Some(name);
                }
                continue;
            }
        }

        if let Some(content) = step_content(line) {
            match current.as_mut() {
                Some(phase) => phase.steps.push(Step {
                    title: truncate_title(content),
                    description: content.to_owned(),
                }),
                None => tracing::trace!(line, "skipping step line outside any phase"),
            }
        }
    }

    if let Some(done) = current.take() {
        phases.push(done);
    }

    if phases.iter().all(|phase| phase.steps.is_empty()) {
        return RoadmapParse::Empty;
    }

    RoadmapParse::Parsed {
        project_name,
        phases,
    }
}

/// Normalize and parse raw provider text, substituting
/// [`fallback::roadmap`] when nothing usable is found.
pub fn roadmap_or_fallback(raw: &str, goal: &str, category: Category) -> Roadmap {
    parse_roadmap(&normalize(raw))
        .into_roadmap(goal, category)
        .unwrap_or_else(|| fallback::roadmap(goal, category))
}
