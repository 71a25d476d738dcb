use crate::domain::model::{DeviceRecord, Label};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read-only view of the fleet inventory service.
///
/// Implementations must be safe to call concurrently from every pool worker.
/// Each call is bounded by the implementation's own timeout.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    async fn fetch_labels(&self) -> Result<Vec<Label>>;

    async fn devices_by_label(&self, label_id: i64) -> Result<Vec<DeviceRecord>>;

    /// Number of disk entries reported for a device.
    async fn disk_count(&self, serial_number: &str) -> Result<usize>;
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String>;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Where `path` lands, for reporting back to the user.
    fn location(&self, path: &str) -> String;
}
