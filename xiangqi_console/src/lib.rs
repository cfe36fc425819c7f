/// Command-line flags.
pub mod config;
/// The stdin command loop that drives a [`xiangqi::Game`].
pub mod engine;

pub use config::*;
pub use engine::*;
