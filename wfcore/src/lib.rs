pub mod ac;
pub mod content;
pub mod error;
pub mod history;
pub mod platform;
pub mod rule;
pub mod schedule;
pub mod state;
pub mod transition;
pub mod workflow;
