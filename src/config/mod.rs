pub mod credentials;
pub mod settings;
pub mod settings_io;
