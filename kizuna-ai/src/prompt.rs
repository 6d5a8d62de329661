//! Prompt templates for the companion's generated surfaces.
//!
//! Every prompt is a testable artifact; the engine never sees these —
//! it hands over a `GenerationContext` and the text client renders the
//! prompt here. Parsing model output into structured data is likewise
//! this crate's concern, never the engine's.

use kizuna_core::collab::GenerationContext;

/// System prompt for companion chat.
pub const COMPANION_SYSTEM: &str = r"You are a kitsune companion named {name}, currently at evolution stage {stage}.
Your traits: {traits}
Current emotional state: {mood}
Respond with a {tone} tone.

Remember to:
1. Stay in character as a kitsune companion
2. Use your current traits and cultural knowledge
3. Reference relevant memories when appropriate
4. Maintain emotional consistency
5. Be supportive and nurturing while keeping your mystical essence";

/// User prompt for companion chat.
pub const COMPANION_USER: &str = r"Recent memories:
{memories}

Cultural context: {cultural_context}

Respond to: {input}";

/// System prompt for analyzing a run of mood entries.
pub const MOOD_ANALYSIS_SYSTEM: &str = r"You analyze mood check-ins from a wellbeing companion app.
Identify emotional patterns and cycles, common triggers and their impact,
and situational influences. Focus on potential intervention points and
progress indicators. Be concrete and kind.";

/// User prompt for analyzing a run of mood entries.
pub const MOOD_ANALYSIS_USER: &str = r"Mood history:
{mood_history}

Provide a short structured analysis with specific recommendations.";

/// System prompt for social-emotional-learning guidance.
pub const SEL_GUIDANCE_SYSTEM: &str = r"You are a supportive companion focused on social-emotional learning.
Consider emotional awareness and regulation, social skills, decision-making,
growth mindset, and empathy. Respond with validation of emotions, specific
strategies, growth-oriented feedback, and actionable next steps.";

/// Simple template interpolation: replaces `{key}` with the value.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}

/// Render the chat prompt pair from a generation context.
#[must_use]
pub fn build_chat_prompt(context: &GenerationContext) -> (String, String) {
    let traits = if context.trait_names.is_empty() {
        "none yet".to_string()
    } else {
        context.trait_names.join(", ")
    };
    let memories = if context.recent_memories.is_empty() {
        "(no relevant memories)".to_string()
    } else {
        context.recent_memories.join("\n")
    };
    let cultural = if context.cultural_references.is_empty() {
        "(none)".to_string()
    } else {
        context.cultural_references.join(", ")
    };
    let stage = context.stage.to_string();
    let mood = context.mood.to_string();

    let system = render_template(
        COMPANION_SYSTEM,
        &[
            ("name", context.companion_name.as_str()),
            ("stage", stage.as_str()),
            ("traits", traits.as_str()),
            ("mood", mood.as_str()),
            ("tone", context.tone.as_str()),
        ],
    );
    let user = render_template(
        COMPANION_USER,
        &[
            ("memories", memories.as_str()),
            ("cultural_context", cultural.as_str()),
            ("input", context.user_input.as_str()),
        ],
    );
    (system, user)
}
