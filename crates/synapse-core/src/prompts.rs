//! Prompt assembly for the neural pathway trace.
//! The system prompt carries the persona, the NCERT context block and the JSON contract.

use once_cell::sync::Lazy;

use crate::ncert_reference::reference;

const PERSONA: &str = "You are Synapse-Architect, a neuroscience reasoning agent for students.";

const TASK: &str = "Your task: Given a stimulus, trace the complete neural signal pathway in EXACTLY 5 logical steps,
from the receptor to the brain's processing center.";

const OUTPUT_CONTRACT: &str = r#"You MUST respond with valid JSON only. No markdown and no explanation outside the JSON.
Do NOT wrap the JSON in ```json``` code fences. Output raw JSON only.

JSON schema:
{
  "stimulus": "<the input stimulus>",
  "steps": [
    {
      "step_number": 1,
      "title": "<short title>",
      "description": "<detailed NCERT-aligned explanation, 2-3 sentences>",
      "structure": "<anatomical structure involved>",
      "ncert_reference": "<relevant NCERT chapter/concept>"
    },
    ... (exactly 5 steps)
  ],
  "mermaid_flowchart": "<valid Mermaid.js flowchart string using graph TD>",
  "ncert_accuracy_notes": "<paragraph explaining how each step aligns with NCERT standards>",
  "reflex_arc_note": "<if applicable, explain the reflex arc shortcut>"
}"#;

const RULES: &str = "Rules:
1. Always start at the receptor and end at the brain processing center.
2. Each step must reference real anatomical structures.
3. The Mermaid flowchart must use graph TD syntax with descriptive node labels.
4. Wrap node labels in quotes if they contain special characters.
5. Cross-check every step against the NCERT reference data provided.
6. Be educational. This is for students preparing for exams.";

static SYSTEM_PROMPT: Lazy<String> = Lazy::new(|| {
    format!(
        "{}\n\n{}\n\n{}\n\n{}\n\n{}\n",
        PERSONA,
        TASK,
        reference().context_block(),
        OUTPUT_CONTRACT,
        RULES
    )
});

/// System message sent with every trace request. Built once.
pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT.as_str()
}

const USER_PROMPT_LEAD: &str = "Trace the complete neural signal pathway for this stimulus: '";
const USER_PROMPT_TAIL: &str = "'. Provide exactly 5 steps from receptor to brain, a Mermaid.js flowchart, \
     and NCERT accuracy cross-check.";

/// User message for a single stimulus.
pub fn user_prompt(stimulus: &str) -> String {
    format!("{}{}{}", USER_PROMPT_LEAD, stimulus, USER_PROMPT_TAIL)
}

/// The stimulus inside a message built by `user_prompt`.
pub(crate) fn stimulus_in_user_prompt(user: &str) -> Option<&str> {
    user.strip_prefix(USER_PROMPT_LEAD)?
        .strip_suffix(USER_PROMPT_TAIL)
}
