pub mod analyze;
pub mod app;
pub mod backend;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod output;
pub mod runtime;

pub use analyze::{cmd_analyze, AnalyzeArgs};
pub use backend::cmd_backend;
