//! Prompt construction for the assessment pipeline.
//!
//! Both variants embed the same context, observation, taxonomy, and the
//! conservative-rating policy: only rate qualities with direct evidence and
//! mark absence as NOT OBSERVED rather than guessing. That policy is a
//! prompting contract with the model, not a locally enforced invariant —
//! label normalization downstream discards whatever comes back malformed.

use serde_json::{Value, json};

use mapt_core::Taxonomy;

/// Comma-joined quality names for prompt embedding.
fn quality_list(taxonomy: &Taxonomy) -> String {
    taxonomy.qualities().join(", ")
}

/// Retrieved snippets joined into one context block.
fn context_block(context: &[String]) -> String {
    if context.is_empty() {
        "No reference context available.".to_string()
    } else {
        context.join("\n\n")
    }
}

/// Prompt for the structured attempt.
///
/// Output shape is carried by the provider's response schema, so the prompt
/// states the task and policy without a JSON example.
pub fn build_structured_prompt(taxonomy: &Taxonomy, context: &[String], observation: &str) -> String {
    format!(
        "You are an expert personality assessor for rural students. Your task is to \
evaluate a student's personality traits based on observer notes.

CONTEXT INFORMATION:
{context}

STUDENT OBSERVATIONS:
{observation}

TASK: Analyze the student's behavior and assess their personality traits. For each \
of the {count} qualities, determine if the student shows evidence of that trait and \
rate them as LOW, MIDDLE, or HIGH. If there's insufficient evidence for a quality, \
mark it as \"NOT OBSERVED\".

QUALITIES TO ASSESS:
{qualities}

INSTRUCTIONS:
1. Only assess qualities where you have clear evidence from the observations
2. Use the reference material to understand each quality
3. Be conservative - don't hallucinate traits without evidence
4. Provide brief reasoning for each assessment
5. Respond in the requested structured format

Remember: Only assess qualities that are clearly demonstrated in the observations. \
If a quality is not shown, mark it as \"NOT OBSERVED\" rather than guessing.",
        context = context_block(context),
        count = taxonomy.len(),
        qualities = quality_list(taxonomy),
    )
}

/// Prompt for the fallback string attempt.
///
/// No schema enforcement is available here, so the prompt spells out the
/// exact JSON structure and demands bare JSON output.
pub fn build_fallback_prompt(taxonomy: &Taxonomy, context: &[String], observation: &str) -> String {
    format!(
        "You are an expert personality assessor for rural students. Your task is to \
evaluate a student's personality traits based on observer notes.

CONTEXT INFORMATION:
{context}

STUDENT OBSERVATIONS:
{observation}

TASK: Analyze the student's behavior and assess their personality traits. For each \
of the {count} qualities, determine if the student shows evidence of that trait and \
rate them as LOW, MIDDLE, or HIGH. If there's insufficient evidence for a quality, \
mark it as \"NOT OBSERVED\".

QUALITIES TO ASSESS:
{qualities}

INSTRUCTIONS:
1. Only assess qualities where you have clear evidence from the observations
2. Be conservative - don't hallucinate traits without evidence
3. Provide brief reasoning for each assessment
4. You MUST respond with ONLY valid JSON - no additional text before or after
5. Use this EXACT JSON structure:
{{
    \"assessments\": [
        {{
            \"quality\": \"Quality Name\",
            \"level\": \"LOW/MIDDLE/HIGH/NOT OBSERVED\",
            \"reasoning\": \"Brief explanation based on observations\"
        }}
    ],
    \"summary\": \"Overall assessment summary\"
}}

CRITICAL: Respond with ONLY the JSON object. Do not include any text before or \
after the JSON. Ensure all quotes are properly escaped and the JSON is valid.",
        context = context_block(context),
        count = taxonomy.len(),
        qualities = quality_list(taxonomy),
    )
}

/// Response schema hint for providers with constrained-output support.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "assessments": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "quality": { "type": "string" },
                        "level": {
                            "type": "string",
                            "enum": ["LOW", "MIDDLE", "HIGH", "NOT OBSERVED"]
                        },
                        "reasoning": { "type": "string" }
                    },
                    "required": ["quality", "level", "reasoning"]
                }
            },
            "summary": { "type": "string" }
        },
        "required": ["assessments", "summary"]
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
