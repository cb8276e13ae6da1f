//! Instruction-list parser.
//!
//! Strips list decoration from every line, drops short or boilerplate lines,
//! and keeps at most [`MAX_INSTRUCTIONS`] entries.

use std::sync::OnceLock;

use regex::Regex;

use super::content_lines;
use crate::fallback;
use crate::model::Category;
use crate::normalize::normalize;

/// Upper bound on the number of instructions returned.
pub const MAX_INSTRUCTIONS: usize = 8;

/// A line must be longer than this (in characters) to count as an
/// instruction.
pub const MIN_INSTRUCTION_LEN: usize = 10;

const BOILERPLATE: &[&str] = &["here are", "instructions:"];

/// Outcome of parsing an instruction response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionParse {
    Parsed(Vec<String>),
    Empty,
}

fn markers() -> &'static [Regex; 5] {
    static MARKERS: OnceLock<[Regex; 5]> = OnceLock::new();
    MARKERS.get_or_init(|| {
        [
            Regex::new(r"^\d+[.)]\s*").expect("static regex"),
            Regex::new(r"(?i)^step\s+\d+\s*[:.)]?\s*").expect("static regex"),
            Regex::new(r"^[-*•]+\s*").expect("static regex"),
            Regex::new(r"^\*\*").expect("static regex"),
            Regex::new(r"^#{1,6}\s*").expect("static regex"),
        ]
    })
}

fn strip_markers(line: &str) -> String {
    markers()
        .iter()
        .fold(line.trim().to_owned(), |acc, re| {
            re.replace(&acc, "").trim().to_owned()
        })
}

fn is_substantive(line: &str) -> bool {
    if line.chars().count() <= MIN_INSTRUCTION_LEN {
        return false;
    }
    let lower = line.to_lowercase();
    !BOILERPLATE.iter().any(|phrase| lower.contains(phrase))
}

/// Parse normalized instruction text.
pub fn parse_instructions(text: &str) -> InstructionParse {
    let instructions: Vec<String> = content_lines(text)
        .map(strip_markers)
        .filter(|line| is_substantive(line))
        .take(MAX_INSTRUCTIONS)
        .collect();

    if instructions.is_empty() {
        InstructionParse::Empty
    } else {
        InstructionParse::Parsed(instructions)
    }
}

/// Normalize and parse raw provider text, substituting
/// [`fallback::instructions`] when nothing usable is found.
pub fn instructions_or_fallback(raw: &str, step_description: &str, category: Category) -> Vec<String> {
    match parse_instructions(&normalize(raw)) {
        InstructionParse::Parsed(list) => list,
        InstructionParse::Empty => fallback::instructions(step_description, category),
    }
}
