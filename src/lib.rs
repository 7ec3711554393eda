// Library surface for headless/integration tests and reuse.
// The terminal front end (ui, CLI) lives in main.rs.
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod error;
pub mod keymap;
pub mod language;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod timer;
pub mod typing_policy;
pub mod util;

pub use controller::{Feedback, Input, SessionController};
pub use error::{TcResult, TypeclockError};
pub use session::{Mode, Phase, SessionConfig};
