pub mod aggregator;
pub mod classification;
pub mod enrichment;
pub mod label_source;
pub mod orchestrator;
pub mod pool;
pub mod settings;
pub mod stats;

pub use crate::domain::model::{ClassifiedRecord, DeviceWorkItem, Label, Report};
pub use crate::domain::ports::InventoryClient;
pub use crate::utils::error::Result;
pub use orchestrator::{build_report, ReportBuilder};
pub use settings::{ClassificationFailurePolicy, PipelineConfig};
pub use stats::{PipelineStats, StatsSnapshot};
