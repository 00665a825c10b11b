// Shared prompt fragments. Each analysis mode assembles its own system
// prompt from these in analysis/prompts.rs.

/// Output rules common to every analysis system prompt.
pub const JSON_ONLY_RULES: &str = "\
CRITICAL RULES:
1. Output ONLY valid JSON - no markdown, no explanations, no code blocks
2. Follow the schema EXACTLY - all required fields must be present with correct types
3. Be evidence-based - only include information from the transcript
4. Be concise - keep strings short and factual";

/// Keeps internal vocabulary out of human-readable output fields.
pub const PLAIN_LANGUAGE_RULE: &str = "\
NEVER reference internal terms like \"DPP\", \"schema\", \"prompt\", or \"JSON\" in text values. \
The output must be human-readable and self-contained (e.g., say \"job requirements\" not \"DPP requirements\").";

/// Closing line appended to every user prompt.
pub const OUTPUT_ONLY_JSON: &str = "Output ONLY the JSON object, no other text.";
