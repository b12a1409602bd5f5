pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::GroqClient;
pub use core::fallback::{parse, parse_with_report, FallbackSource};
pub use core::{etl::OrderEngine, pipeline::OrderPipeline};
pub use domain::model::{OrderRecord, Unit};
pub use utils::error::{OrderError, Result};
