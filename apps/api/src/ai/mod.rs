// Keyword suggestions for job postings.
// All LLM calls go through llm_client; replies are cleaned up in keywords.rs.

pub mod handlers;
pub mod keywords;
pub mod prompts;
