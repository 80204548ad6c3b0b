pub mod activity;
pub mod event_result;
pub mod progress_state;
pub mod reward;
