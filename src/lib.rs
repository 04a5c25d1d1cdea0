// Library surface for the CLI and integration tests.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod export;
pub mod key_quiz;
pub mod melody;
pub mod music;
pub mod practice;
pub mod session;
pub mod stats;
pub mod store;
pub mod time_series;
pub mod util;

pub use error::{ErrorPayload, PracticeError, Result};
pub use practice::{CheckResult, PracticeService};
