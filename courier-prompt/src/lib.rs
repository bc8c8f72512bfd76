mod react;
mod template;

pub use react::{scratchpad_entry, ReActPrompt, ReActVariables, DEFAULT_REACT_TEMPLATE};
pub use template::PromptTemplate;
