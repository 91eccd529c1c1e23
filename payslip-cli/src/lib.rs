pub mod app;
pub mod config;
pub mod form_file;
pub mod logging;
