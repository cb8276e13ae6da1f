//! Review quizzes built from a project's completed steps.
//!
//! Questions for a step are derived from that step's instruction list; a
//! project with nothing completed (or a step whose instructions could not
//! be fetched) gets the fixed [`default_questions`] set. Scoring is a plain
//! count of matching answers, reported in three feedback tiers.

use std::fmt;

use crate::model::{Category, InstructionRequest, ValidationError};

/// Questions generated per completed step.
pub const QUESTIONS_PER_STEP: usize = 5;

/// Every question has exactly this many options.
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: [String; OPTION_COUNT],
    /// Index into `options`.
    pub correct: usize,
}

impl QuizQuestion {
    fn new(question: impl Into<String>, options: [&str; OPTION_COUNT], correct: usize) -> Self {
        Self {
            question: question.into(),
            options: options.map(str::to_owned),
            correct,
        }
    }
}

/// Letter shown next to option `index`: `A` through `D`.
pub fn option_label(index: usize) -> char {
    match index {
        0 => 'A',
        1 => 'B',
        2 => 'C',
        _ => 'D',
    }
}

/// Parse an answer given as a letter (`a`-`d`) or a 1-based number.
pub fn parse_answer(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    let mut chars = raw.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let index = match c.to_ascii_lowercase() {
        'a' | '1' => 0,
        'b' | '2' => 1,
        'c' | '3' => 2,
        'd' | '4' => 3,
        _ => return None,
    };
    Some(index)
}

/// The general study-habit questions used when there is nothing specific to
/// ask about.
pub fn default_questions() -> Vec<QuizQuestion> {
    vec![
        QuizQuestion::new(
            "What's the most important aspect of effective learning?",
            [
                "Speed of completion",
                "Consistent practice and application",
                "Perfect understanding from the start",
                "Comparing yourself to others",
            ],
            1,
        ),
        QuizQuestion::new(
            "When you encounter a difficult concept, what should you do?",
            [
                "Skip it and hope it becomes clear later",
                "Break it down into smaller parts and practice",
                "Memorize it without understanding",
                "Give up on the entire topic",
            ],
            1,
        ),
        QuizQuestion::new(
            "How should you measure your learning progress?",
            [
                "By comparing to others constantly",
                "Only by final results",
                "Through consistent milestones and practical application",
                "By time spent studying",
            ],
            2,
        ),
        QuizQuestion::new(
            "What's the benefit of following a structured learning path?",
            [
                "It guarantees immediate success",
                "It provides clear direction and builds knowledge systematically",
                "It makes learning more complicated",
                "It's only useful for beginners",
            ],
            1,
        ),
        QuizQuestion::new(
            "How should you approach practice and implementation?",
            [
                "Only when you feel completely ready",
                "Regularly, even if you make mistakes",
                "Never, theory is enough",
                "Only when supervised",
            ],
            1,
        ),
    ]
}

/// Instruction request whose answer seeds the questions for one step.
pub fn step_request(
    title: &str,
    description: &str,
    project_prompt: &str,
) -> Result<InstructionRequest, ValidationError> {
    let ask = format!("Generate {QUESTIONS_PER_STEP} quiz questions about: {title} - {description}");
    Ok(InstructionRequest::new(&ask, Category::Learning)?
        .with_position(Some(1), Some(1))
        .with_project_name(Some(project_prompt.to_owned())))
}

/// Questions for one step from its instruction list. The right answer is
/// always the option that puts the instruction into practice.
pub fn questions_for_step(step_title: &str, instructions: &[String]) -> Vec<QuizQuestion> {
    if instructions.is_empty() {
        return default_questions();
    }
    instructions
        .iter()
        .take(QUESTIONS_PER_STEP)
        .map(|instruction| QuizQuestion {
            question: format!("What is the main focus of \"{step_title}\"?"),
            options: [
                format!("Understanding and implementing {instruction}"),
                "Memorizing all technical details".to_owned(),
                "Skipping to advanced topics immediately".to_owned(),
                "Just reading about it without practice".to_owned(),
            ],
            correct: 0,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    /// 80% and up.
    Outstanding,
    /// 70% to 79%.
    Great,
    GoodEffort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
}

/// Count answers matching the correct option. Missing answers are wrong.
pub fn score(questions: &[QuizQuestion], answers: &[Option<usize>]) -> QuizScore {
    let correct = questions
        .iter()
        .zip(answers.iter().copied().chain(std::iter::repeat(None)))
        .filter(|(q, answer)| *answer == Some(q.correct))
        .count();
    QuizScore {
        correct,
        total: questions.len(),
    }
}

impl QuizScore {
    /// Rounded percentage; an empty quiz scores 0.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (self.correct as f64 / self.total as f64 * 100.0).round() as u8
    }

    pub fn tier(&self) -> ScoreTier {
        match self.percent() {
            80.. => ScoreTier::Outstanding,
            70.. => ScoreTier::Great,
            _ => ScoreTier::GoodEffort,
        }
    }

    /// Feedback line for a quiz covering `completed_steps` steps.
    pub fn feedback(&self, completed_steps: usize) -> String {
        let summary = self.to_string();
        match self.tier() {
            ScoreTier::Outstanding => format!(
                "Outstanding! You scored {summary} on your {completed_steps}-step quiz! You've truly mastered the material!"
            ),
            ScoreTier::Great => format!(
                "Great job! You scored {summary} on your comprehensive quiz! Keep up the excellent learning!"
            ),
            ScoreTier::GoodEffort => format!(
                "Good effort! You scored {summary}. Consider reviewing some concepts and try the quiz again!"
            ),
        }
    }
}

impl fmt::Display for QuizScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({}%)", self.correct, self.total, self.percent())
    }
}
