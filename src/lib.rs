pub mod app;
pub mod config;
pub mod state;
pub mod students;
