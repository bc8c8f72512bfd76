pub mod providers;

pub use courier_core::{LlmRequest, LlmResponse, Message, Role};
pub use providers::google::{GoogleClient, DEFAULT_GEMINI_MODEL};

use courier_core::Runnable;

pub trait Llm: Runnable<LlmRequest, LlmResponse> {}

impl<T> Llm for T where T: Runnable<LlmRequest, LlmResponse> {}
