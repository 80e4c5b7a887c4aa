pub mod assistant;
pub mod commands;
pub mod config;
pub mod error;
pub mod eval;
pub mod intent;
pub mod llm;
pub mod memory;
pub mod responder;
pub mod testing;

pub mod prelude {
    pub use crate::assistant::{Assistant, Outcome};
    pub use crate::config::AppConfig;
    pub use crate::error::Result;
    pub use crate::eval::evaluate;
    pub use crate::intent::{Intent, classify};
    pub use crate::llm::LlmClient;
    pub use crate::memory::MemoryStore;
}
