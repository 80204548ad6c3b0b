pub mod cli;
pub mod status_view;
