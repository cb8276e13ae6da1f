//! Prompt construction for roadmap and instruction generation.
//!
//! Pure string assembly. The output format requested here is what
//! [`crate::parse`] knows how to read back.

use crate::model::{Category, InstructionRequest, RoadmapRequest};

// ---------------------------------------------------------------------------
// Roadmap prompt
// ---------------------------------------------------------------------------

/// Output format contract shared by every roadmap prompt.
const ROADMAP_FORMAT: &str = r#"## Output Format

Respond with plain text only. Do not use markdown formatting.

Project: <a concise, engaging project name of 2-5 words>
Phase 1: <Phase Name>
1.1 <Specific, actionable step>
1.2 <Specific, actionable step>
Phase 2: <Phase Name>
2.1 <Specific, actionable step>
...

Rules:
- Provide 3-5 phases, each with 2-4 steps.
- Keep phase names to 1-2 words.
- Number steps as <phase>.<step>.
- Progress logically from beginner to advanced.
"#;

fn roadmap_role(category: Category) -> &'static str {
    match category {
        Category::Learning => {
            "You are an expert learning coach. Create a structured learning roadmap \
             that takes a beginner to confident, practical ability."
        }
        Category::TravelPlanner => {
            "You are an experienced travel planner. Create a trip-planning roadmap \
             covering research, budgeting, booking, preparation, and the journey itself."
        }
        Category::Fitness => {
            "You are a certified fitness coach. Create a safe, progressive training \
             roadmap with realistic milestones."
        }
        Category::Career => {
            "You are a career advisor. Create a practical roadmap covering skills, \
             experience, visibility, and the job search."
        }
    }
}

/// Build the roadmap-generation prompt for a request.
pub fn roadmap_prompt(request: &RoadmapRequest) -> String {
    let mut prompt = String::with_capacity(1024);
    prompt.push_str(roadmap_role(request.category()));
    prompt.push_str("\n\n");
    prompt.push_str(&format!("Goal: \"{}\"\n\n", request.goal()));
    prompt.push_str(ROADMAP_FORMAT);
    prompt.push_str(&format!(
        "\nGenerate the roadmap for: \"{}\"\n",
        request.goal()
    ));
    prompt
}

// ---------------------------------------------------------------------------
// Instruction prompt
// ---------------------------------------------------------------------------

const INSTRUCTION_RULES: &str = r#"Please provide 4-6 specific steps to accomplish this task. Each instruction should be:
- Clear and actionable
- Easy to understand
- Practical to implement
- Building upon the previous step

Provide only the instructions as a simple numbered list, without additional commentary.
"#;

/// Build the instruction-generation prompt for a single roadmap step.
pub fn instruction_prompt(request: &InstructionRequest) -> String {
    let mut prompt = String::with_capacity(768);
    prompt.push_str(&format!(
        "Provide clear, actionable instructions for: {}\n\n",
        request.step_description
    ));

    let mut context = Vec::new();
    if let Some(name) = &request.project_name {
        context.push(format!("- Project: {name}"));
    }
    match (request.phase_number, request.step_number) {
        (Some(phase), Some(step)) => context.push(format!("- Position: phase {phase}, step {step}")),
        (Some(phase), None) => context.push(format!("- Position: phase {phase}")),
        _ => {}
    }
    context.push(format!("- Category: {}", request.category));
    prompt.push_str("Context:\n");
    prompt.push_str(&context.join("\n"));
    prompt.push_str("\n\n");

    prompt.push_str(INSTRUCTION_RULES);
    prompt.push_str(&format!("\nTask: {}\n", request.step_description));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roadmap_prompt_contains_goal_and_format() {
        let req = RoadmapRequest::new("learn watercolor", Category::Learning).unwrap();
        let prompt = roadmap_prompt(&req);
        assert!(prompt.contains("\"learn watercolor\""));
        assert!(prompt.contains("Phase 1: <Phase Name>"));
        assert!(prompt.contains("1.1 <Specific"));
        assert!(prompt.contains("Project:"));
    }

    #[test]
    fn roadmap_prompt_varies_by_category() {
        let travel = RoadmapRequest::new("visit Lisbon", Category::TravelPlanner).unwrap();
        let fitness = RoadmapRequest::new("run a 10k", Category::Fitness).unwrap();
        assert!(roadmap_prompt(&travel).contains("travel planner"));
        assert!(roadmap_prompt(&fitness).contains("fitness coach"));
    }

    #[test]
    fn instruction_prompt_includes_context() {
        let req = InstructionRequest::new("Learn guitar chords", Category::Learning)
            .unwrap()
            .with_position(Some(2), Some(3))
            .with_project_name(Some("Guitar Journey".into()));
        let prompt = instruction_prompt(&req);
        assert!(prompt.contains("Task: Learn guitar chords"));
        assert!(prompt.contains("Project: Guitar Journey"));
        assert!(prompt.contains("phase 2, step 3"));
        assert!(prompt.contains("Category: learning"));
    }

    #[test]
    fn instruction_prompt_omits_missing_position() {
        let req = InstructionRequest::new("Stretch daily", Category::Fitness).unwrap();
        let prompt = instruction_prompt(&req);
        assert!(!prompt.contains("Position:"));
        assert!(!prompt.contains("Project:"));
    }
}
