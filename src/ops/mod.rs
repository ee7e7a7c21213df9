pub mod compare;
pub mod levels;
pub mod sync;
