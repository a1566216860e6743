//! These models represent the objects passed between the report generator and providers
//!
//! Each provider speaks its own wire format (OpenAI-compatible chat completions for groq,
//! `generateContent` for google). We convert into and out of these internal structs at the
//! provider boundary so nothing above it depends on a provider-specific response shape.
pub mod generation;
pub mod message;
pub mod tool;
