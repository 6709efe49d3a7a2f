// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Grounding rule shared by scoring and advice: no invented facts.
pub const GROUNDING_INSTRUCTION: &str = "\
    Do not hallucinate. Only use data present in the resume or in the analysis \
    context you were given. If the data does not support a claim, leave it out.";
