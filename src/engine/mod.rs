pub mod apply_reward;
pub mod protocol;
pub mod session;
pub mod store;
pub mod weekly_reset;

pub mod llm_client;
pub mod oracle;
pub mod prompt_builder;
