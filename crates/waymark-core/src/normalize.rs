//! Markdown stripping for raw provider output.
//!
//! Removes bold, italic, inline code, and heading markers, then trims.
//! Heading removal only consumes horizontal whitespace so the line structure
//! the parsers depend on is preserved.

use std::sync::OnceLock;

use regex::Regex;

struct Patterns {
    bold: Regex,
    italic: Regex,
    code: Regex,
    heading: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        bold: Regex::new(r"\*\*(.*?)\*\*").expect("static regex"),
        italic: Regex::new(r"\*(.*?)\*").expect("static regex"),
        code: Regex::new(r"`(.*?)`").expect("static regex"),
        heading: Regex::new(r"#{1,6}[ \t]").expect("static regex"),
    })
}

fn strip_once(text: &str) -> String {
    let p = patterns();
    let text = p.bold.replace_all(text, "$1");
    let text = p.italic.replace_all(&text, "$1");
    let text = p.code.replace_all(&text, "$1");
    let text = p.heading.replace_all(&text, "");
    text.trim().to_owned()
}

/// Strip markdown decoration from `text`.
///
/// Each pass only ever removes characters, so repeating until nothing changes
/// terminates, and the result is a fixpoint: `normalize(normalize(t)) ==
/// normalize(t)`.
pub fn normalize(text: &str) -> String {
    let mut current = strip_once(text);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bold_italic_and_code() {
        assert_eq!(
            normalize("**Phase 1:** *Basics* with `cargo`"),
            "Phase 1: Basics with cargo"
        );
    }

    #[test]
    fn strips_heading_markers_and_trims() {
        let text = "  ## Phase 1: Foundation\n### 1.1 Learn basics  ";
        assert_eq!(normalize(text), "Phase 1: Foundation\n1.1 Learn basics");
    }

    #[test]
    fn keeps_line_breaks_after_bare_hashes() {
        // A bare `#` line is not a heading marker; it must not swallow the newline.
        assert_eq!(normalize("#\nPhase 1: A"), "#\nPhase 1: A");
    }

    #[test]
    fn idempotent_on_tricky_inputs() {
        let inputs = [
            "",
            "plain text",
            "***a***",
            "*`*`*",
            "`*`a*`",
            "*#  *x",
            "####### x",
            "**bold** and *it* and `code` ## h",
            "*a\n*b*\nc*",
            "- * bullet with * star",
        ];
        for input in inputs {
            let once = normalize(input);
            let twice = normalize(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn leaves_single_bullet_star() {
        assert_eq!(normalize("* item one"), "* item one");
    }
}
