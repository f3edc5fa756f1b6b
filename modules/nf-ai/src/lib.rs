pub mod claude;
pub mod openai;
pub mod schema;
pub mod structured;
pub mod traits;

pub use schema::StructuredOutput;
pub use structured::generate_structured;
pub use traits::{LlmClient, Message, MessageRole};
