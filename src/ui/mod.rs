// ui/mod.rs

mod chat;
pub mod constants;
mod draw;
mod setup;
pub mod spinner;
pub mod textarea;
mod utils;

pub use draw::{MIN_HEIGHT, MIN_WIDTH, draw};
