// Prompt constants for keyword suggestion.

/// System prompt for keyword extraction — plain comma-separated output.
pub const KEYWORDS_SYSTEM: &str = "You are an expert technical recruiter. \
    You extract concise technical skills from job descriptions. \
    Respond with a single comma-separated line. \
    Do NOT include explanations, numbering or any extra text.";

/// Keyword extraction prompt. Replace `{description}` before sending.
pub const KEYWORDS_PROMPT_TEMPLATE: &str = r#"From the job description below, extract 5 to 6 concise, relevant technical skills or keywords that match the description exactly.

Rules:
- Return ONLY a comma-separated list
- No explanations
- No numbering
- No extra text
- Keywords must be short (1 to 3 words)

Job Description:
"""
{description}
""""#;

pub fn keywords_prompt(description: &str) -> String {
    KEYWORDS_PROMPT_TEMPLATE.replace("{description}", description)
}
