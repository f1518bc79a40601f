// SPDX-License-Identifier: GPL-3.0-or-later

//! Generative text model client.
//!
//! The pipeline only needs `ask(prompt) -> text`; the answer may wrap the
//! JSON it asked for in prose or markdown fences, so the [`json`] helpers
//! locate the payload by bracket scanning.

pub mod error;
pub mod gemini;
pub mod json;
pub mod provider;

pub use error::{LlmError, Result};
pub use gemini::{GeminiClient, GeminiClientBuilder};
pub use json::{extract_json_array, extract_json_object};
pub use provider::TextModel;
