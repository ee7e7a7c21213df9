pub mod app;
pub mod effects;
pub mod input;
pub mod render;
pub mod theme;
pub mod undo;
pub mod update;

pub use app::{RunOptions, run};
