//! Heuristic parsers that turn normalized provider text into roadmap
//! structure or instruction lists.
//!
//! Both parsers return a tagged result (`Parsed` / `Empty`) so callers make
//! the fallback decision explicitly.

pub mod instructions;
pub mod roadmap;

pub use instructions::{
    InstructionParse, MAX_INSTRUCTIONS, MIN_INSTRUCTION_LEN, instructions_or_fallback,
    parse_instructions,
};
pub use roadmap::{MAX_TITLE_LEN, RoadmapParse, parse_roadmap, roadmap_or_fallback, truncate_title};

/// Non-blank, trimmed lines in their original order.
fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}
