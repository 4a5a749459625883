//! Run sessions
//!
//! A session holds the form state of one run/config dialog: the active
//! version, the raw values the user typed, and the errors of the last
//! validation. Version switches go through a [`VersionResolver`] so that only
//! the most recent selection is ever applied.

pub mod config;
pub mod dialog;
pub mod error;
pub mod resolver;
pub mod search;

pub use config::SessionConfig;
pub use dialog::{EventHandler, RunSession, SessionEvent, SessionOrigin};
pub use error::SessionError;
pub use resolver::{Generation, Resolution, VersionResolver, VersionSelection};
pub use search::VersionSearch;
