pub mod asi_client;
pub mod llm_client;
pub mod response;

pub use asi_client::AsiOneClient;
pub use llm_client::LlmClient;
