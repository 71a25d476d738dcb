pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{Cli, Command};

pub use adapters::{HttpInventoryClient, LocalStorage, StaticToken};
pub use app::ReportWriter;
pub use config::AppConfig;
pub use crate::core::{build_report, ClassificationFailurePolicy, PipelineConfig, ReportBuilder};
pub use domain::model::{ClassifiedRecord, DeviceRecord, DeviceWorkItem, Label, Report};
pub use domain::ports::InventoryClient;
pub use utils::error::{CdsError, Result};
