use crate::domain::capacity::{format_usage, UNKNOWN_TIER};
use crate::domain::model::{ClassifiedRecord, DeviceWorkItem};
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENRICHMENT_WORKERS: usize = 5;
pub const DEFAULT_CLASSIFICATION_WORKERS: usize = 10;
pub const DEFAULT_LABEL_BUFFER: usize = 1;
pub const DEFAULT_DEVICE_BUFFER: usize = 20;
pub const DEFAULT_CLASSIFIED_BUFFER: usize = 10;

/// Pool sizes, channel capacities, and the classification failure policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_enrichment_workers")]
    pub enrichment_workers: usize,
    #[serde(default = "default_classification_workers")]
    pub classification_workers: usize,
    #[serde(default = "default_label_buffer")]
    pub label_buffer: usize,
    #[serde(default = "default_device_buffer")]
    pub device_buffer: usize,
    #[serde(default = "default_classified_buffer")]
    pub classified_buffer: usize,
    #[serde(default)]
    pub on_classification_failure: ClassificationFailurePolicy,
}

fn default_enrichment_workers() -> usize {
    DEFAULT_ENRICHMENT_WORKERS
}

fn default_classification_workers() -> usize {
    DEFAULT_CLASSIFICATION_WORKERS
}

fn default_label_buffer() -> usize {
    DEFAULT_LABEL_BUFFER
}

fn default_device_buffer() -> usize {
    DEFAULT_DEVICE_BUFFER
}

fn default_classified_buffer() -> usize {
    DEFAULT_CLASSIFIED_BUFFER
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enrichment_workers: DEFAULT_ENRICHMENT_WORKERS,
            classification_workers: DEFAULT_CLASSIFICATION_WORKERS,
            label_buffer: DEFAULT_LABEL_BUFFER,
            device_buffer: DEFAULT_DEVICE_BUFFER,
            classified_buffer: DEFAULT_CLASSIFIED_BUFFER,
            on_classification_failure: ClassificationFailurePolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Same pool size for both stages. Handy for deterministic runs with one worker.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.enrichment_workers = workers;
        self.classification_workers = workers;
        self
    }

    pub fn with_failure_policy(mut self, policy: ClassificationFailurePolicy) -> Self {
        self.on_classification_failure = policy;
        self
    }
}

impl Validate for PipelineConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("pipeline.enrichment_workers", self.enrichment_workers, 1)?;
        validate_positive_number(
            "pipeline.classification_workers",
            self.classification_workers,
            1,
        )?;
        validate_positive_number("pipeline.label_buffer", self.label_buffer, 1)?;
        validate_positive_number("pipeline.device_buffer", self.device_buffer, 1)?;
        validate_positive_number("pipeline.classified_buffer", self.classified_buffer, 1)?;
        Ok(())
    }
}

/// What a classification worker emits when the disk inventory call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClassificationFailurePolicy {
    /// Keep the device with a placeholder tier.
    Degrade {
        #[serde(default)]
        tier: u32,
    },
    /// Leave the device out of the report.
    Skip,
}

impl Default for ClassificationFailurePolicy {
    fn default() -> Self {
        ClassificationFailurePolicy::Degrade { tier: UNKNOWN_TIER }
    }
}

impl ClassificationFailurePolicy {
    pub fn recover(&self, item: DeviceWorkItem) -> Option<ClassifiedRecord> {
        match *self {
            ClassificationFailurePolicy::Degrade { tier } => {
                let usage = format_usage(item.online_users_max, item.service_kbps_max);
                Some(ClassifiedRecord::new(item, tier, usage))
            }
            ClassificationFailurePolicy::Skip => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> DeviceWorkItem {
        DeviceWorkItem {
            domain: "A".to_string(),
            serial_number: "X1".to_string(),
            company: "Acme".to_string(),
            status: "up".to_string(),
            online_users_max: 20,
            service_kbps_max: 1024,
        }
    }

    #[test]
    fn test_degrade_keeps_item_with_placeholder_tier() {
        let record = ClassificationFailurePolicy::default()
            .recover(item())
            .unwrap();
        assert_eq!(record.tier, 0);
        assert_eq!(record.formatted_usage, "20/1.0Mbps");
        assert_eq!(record.serial_number, "X1");
    }

    #[test]
    fn test_skip_drops_item() {
        assert!(ClassificationFailurePolicy::Skip.recover(item()).is_none());
    }

    #[test]
    fn test_zero_sized_pool_is_rejected() {
        let config = PipelineConfig::default().with_workers(0);
        assert!(config.validate().is_err());
        assert!(PipelineConfig::default().validate().is_ok());
    }
}
