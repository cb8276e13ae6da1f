//! Deterministic, template-based content used whenever a provider is
//! unavailable or its output cannot be parsed.
//!
//! Everything here is pure and infallible: the same `(goal, category)` always
//! yields the same roadmap.

use crate::model::{Category, Phase, Roadmap, Step};

/// Words skipped when picking the key word for a project name.
const STOP_WORDS: &[&str] = &[
    "learn", "how", "to", "start", "begin", "get", "become", "make", "create",
];

/// Number of entries in every fallback instruction list.
pub const FALLBACK_INSTRUCTION_COUNT: usize = 5;

fn default_project_name(category: Category) -> &'static str {
    match category {
        Category::Learning => "Learning Roadmap",
        Category::TravelPlanner => "Travel Plan",
        Category::Fitness => "Fitness Plan",
        Category::Career => "Career Roadmap",
    }
}

fn name_suffix(category: Category) -> &'static str {
    match category {
        Category::Learning => "Journey",
        Category::TravelPlanner => "Trip",
        Category::Fitness => "Challenge",
        Category::Career => "Path",
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derive a short project name from the goal text.
///
/// Picks the first word longer than three characters that is not a stop
/// word and appends a category suffix, e.g. `"become a Spanish speaker"`
/// becomes `"Spanish Journey"`.
pub fn project_name(goal: &str, category: Category) -> String {
    let key_word = goal
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .find(|w| w.chars().count() > 3 && !STOP_WORDS.contains(&w.as_str()));

    match key_word {
        Some(word) => format!("{} {}", capitalize(&word), name_suffix(category)),
        None => default_project_name(category).to_owned(),
    }
}

fn step(title: &str, description: impl Into<String>) -> Step {
    Step {
        title: title.to_owned(),
        description: description.into(),
    }
}

fn phase(number: u32, name: &str, steps: Vec<Step>) -> Phase {
    Phase {
        number,
        name: name.to_owned(),
        steps,
    }
}

/// Build the default four-phase roadmap for `goal`.
pub fn roadmap(goal: &str, category: Category) -> Roadmap {
    let goal_lower = goal.trim().to_lowercase();
    let phases = match category {
        Category::Learning => vec![
            phase(
                1,
                "Foundation",
                vec![
                    step(
                        "Research the basics",
                        format!("Research and understand the basics of {goal_lower}"),
                    ),
                    step(
                        "Set clear goals",
                        "Set clear goals and create a structured learning plan",
                    ),
                ],
            ),
            phase(
                2,
                "Practice",
                vec![
                    step(
                        "Gather resources",
                        "Gather necessary tools, materials, and learning resources",
                    ),
                    step(
                        "Start practicing",
                        "Start with simple exercises and hands-on practice",
                    ),
                ],
            ),
            phase(
                3,
                "Building",
                vec![
                    step(
                        "Build small projects",
                        "Create small projects to apply what you've learned",
                    ),
                    step(
                        "Refine your skills",
                        "Improve skills through feedback and iteration",
                    ),
                ],
            ),
            phase(
                4,
                "Mastery",
                vec![
                    step(
                        "Take on advanced challenges",
                        "Tackle more complex challenges and advanced concepts",
                    ),
                    step(
                        "Share your knowledge",
                        "Achieve proficiency and share knowledge with others",
                    ),
                ],
            ),
        ],
        Category::TravelPlanner => vec![
            phase(
                1,
                "Research",
                vec![
                    step(
                        "Explore the destination",
                        format!("Research destinations, seasons, and highlights for {goal_lower}"),
                    ),
                    step(
                        "Set a budget",
                        "Estimate costs for transport, lodging, food, and activities",
                    ),
                ],
            ),
            phase(
                2,
                "Planning",
                vec![
                    step(
                        "Draft an itinerary",
                        "Outline a day-by-day itinerary with must-see places",
                    ),
                    step(
                        "Book transport and lodging",
                        "Compare options and book flights, trains, and accommodation",
                    ),
                ],
            ),
            phase(
                3,
                "Preparation",
                vec![
                    step(
                        "Check documents",
                        "Verify passports, visas, insurance, and reservations",
                    ),
                    step(
                        "Pack and prepare",
                        "Prepare a packing list and arrange local currency and connectivity",
                    ),
                ],
            ),
            phase(
                4,
                "Journey",
                vec![
                    step(
                        "Travel and explore",
                        "Follow the itinerary while leaving room for spontaneous discoveries",
                    ),
                    step(
                        "Capture memories",
                        "Document the trip and review what to do differently next time",
                    ),
                ],
            ),
        ],
        Category::Fitness => vec![
            phase(
                1,
                "Assessment",
                vec![
                    step(
                        "Assess your baseline",
                        format!("Measure your current fitness level as a starting point for {goal_lower}"),
                    ),
                    step(
                        "Define targets",
                        "Set specific, measurable fitness targets and a weekly schedule",
                    ),
                ],
            ),
            phase(
                2,
                "Habits",
                vec![
                    step(
                        "Build a routine",
                        "Start with short, consistent sessions several times a week",
                    ),
                    step(
                        "Improve nutrition",
                        "Plan meals that support your training and recovery",
                    ),
                ],
            ),
            phase(
                3,
                "Progression",
                vec![
                    step(
                        "Increase intensity",
                        "Gradually increase volume and intensity while tracking results",
                    ),
                    step(
                        "Prioritize recovery",
                        "Schedule rest days, sleep well, and address any discomfort early",
                    ),
                ],
            ),
            phase(
                4,
                "Maintenance",
                vec![
                    step(
                        "Review progress",
                        "Compare results with your baseline and adjust your plan",
                    ),
                    step(
                        "Sustain the habit",
                        "Set new goals that keep training enjoyable over the long term",
                    ),
                ],
            ),
        ],
        Category::Career => vec![
            phase(
                1,
                "Self-Assessment",
                vec![
                    step(
                        "Map your strengths",
                        format!("Identify the skills and interests relevant to {goal_lower}"),
                    ),
                    step(
                        "Research the field",
                        "Study the roles, requirements, and expectations in the target field",
                    ),
                ],
            ),
            phase(
                2,
                "Skill Building",
                vec![
                    step(
                        "Close skill gaps",
                        "Take courses or training to cover missing skills",
                    ),
                    step(
                        "Gain experience",
                        "Work on practical projects, volunteering, or internships",
                    ),
                ],
            ),
            phase(
                3,
                "Visibility",
                vec![
                    step(
                        "Build a portfolio",
                        "Collect your best work into a portfolio and update your resume",
                    ),
                    step(
                        "Grow your network",
                        "Connect with professionals and join relevant communities",
                    ),
                ],
            ),
            phase(
                4,
                "Transition",
                vec![
                    step(
                        "Apply for roles",
                        "Apply to targeted positions and prepare for interviews",
                    ),
                    step(
                        "Keep growing",
                        "Seek feedback and set goals for continued development",
                    ),
                ],
            ),
        ],
    };

    Roadmap {
        project_name: project_name(goal, category),
        phases,
    }
}

/// Build the default instruction list for a step. Always exactly
/// [`FALLBACK_INSTRUCTION_COUNT`] entries; the first one names the step.
pub fn instructions(step_description: &str, category: Category) -> Vec<String> {
    let d = step_description.trim();
    match category {
        Category::Learning => vec![
            format!("Start by understanding the requirements for: {d}"),
            "Gather all necessary resources and tools needed".to_owned(),
            "Follow best practices and established guidelines".to_owned(),
            "Complete the task systematically and verify results".to_owned(),
            "Review your work and make necessary improvements".to_owned(),
        ],
        Category::TravelPlanner => vec![
            format!("Look up the details you need for: {d}"),
            "Compare options, prices, and reviews before deciding".to_owned(),
            "Confirm bookings and save copies of all confirmations".to_owned(),
            "Add the result to your itinerary and share it with fellow travelers".to_owned(),
            "Review the plan for gaps and prepare a backup option".to_owned(),
        ],
        Category::Fitness => vec![
            format!("Warm up and review the goal for: {d}"),
            "Start at a comfortable intensity and focus on proper form".to_owned(),
            "Track sets, repetitions, or duration for every session".to_owned(),
            "Cool down, stretch, and allow enough time to recover".to_owned(),
            "Review your log weekly and adjust the difficulty gradually".to_owned(),
        ],
        Category::Career => vec![
            format!("Clarify what success looks like for: {d}"),
            "Research examples from people who already achieved it".to_owned(),
            "Break the work into small tasks with deadlines".to_owned(),
            "Ask a mentor or peer for feedback on your progress".to_owned(),
            "Record what you accomplished and update your resume".to_owned(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_uses_first_key_word() {
        assert_eq!(
            project_name("learn to play guitar", Category::Learning),
            "Play Journey"
        );
        assert_eq!(
            project_name("Become a Spanish speaker!", Category::Learning),
            "Spanish Journey"
        );
        assert_eq!(project_name("visit Japan", Category::TravelPlanner), "Visit Trip");
    }

    #[test]
    fn project_name_defaults_when_no_key_word() {
        assert_eq!(project_name("learn how to", Category::Learning), "Learning Roadmap");
        assert_eq!(project_name("run", Category::Fitness), "Fitness Plan");
    }

    #[test]
    fn roadmap_is_deterministic_and_structured() {
        for category in Category::ALL {
            let a = roadmap("Learn Rust", category);
            let b = roadmap("Learn Rust", category);
            assert_eq!(a, b);
            assert_eq!(a.phases.len(), 4);
            assert_eq!(a.step_count(), 8);
            let numbers: Vec<u32> = a.phases.iter().map(|p| p.number).collect();
            assert_eq!(numbers, vec![1, 2, 3, 4]);
            assert!(a.phases[0].steps[0].description.contains("learn rust"));
        }
    }

    #[test]
    fn instructions_have_fixed_length_and_mention_step() {
        for category in Category::ALL {
            let list = instructions("Learn guitar chords", category);
            assert_eq!(list.len(), FALLBACK_INSTRUCTION_COUNT);
            assert!(list[0].contains("Learn guitar chords"), "got {:?}", list[0]);
        }
    }
}
