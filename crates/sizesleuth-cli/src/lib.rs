/// SizeSleuth CLI — terminal front end.
///
/// This crate contains all presentation code. Business logic lives in
/// `sizesleuth-core`; this side only builds requests, pumps scan events
/// into a [`state::SessionState`], and prints what it collected.
pub mod app;
pub mod args;
pub mod render;
pub mod state;

pub use app::run;
pub use args::{Cli, OutputFormat};
