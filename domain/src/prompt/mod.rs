//! Prompt domain
//!
//! Templates for the user prompts of the voting and impact-analysis passes.
//! Persona text (the system prompt of a vote) comes from the roster.

mod template;

pub use template::PromptTemplate;
