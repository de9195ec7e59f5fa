pub mod app;
pub mod completion;
pub mod config;
pub mod format;
pub mod highlight;
pub mod history;
pub mod message;
