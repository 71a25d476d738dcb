use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A named grouping of devices. Its name becomes the report domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
    #[serde(default, rename = "count")]
    pub device_count: i64,
}

/// One device as returned by the inventory-by-label call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(rename = "sn")]
    pub serial_number: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "online_user")]
    pub online_users: i64,
    #[serde(default, rename = "online_user_max")]
    pub online_users_max: i64,
    #[serde(default)]
    pub service_kbps: i64,
    #[serde(default)]
    pub service_kbps_max: i64,
}

/// A device flattened out of its label, ready for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceWorkItem {
    pub domain: String,
    pub serial_number: String,
    pub company: String,
    pub status: String,
    pub online_users_max: i64,
    pub service_kbps_max: i64,
}

impl DeviceWorkItem {
    pub fn from_record(domain: &str, record: DeviceRecord) -> Self {
        Self {
            domain: domain.to_string(),
            serial_number: record.serial_number,
            company: record.company,
            status: record.status,
            online_users_max: record.online_users_max,
            service_kbps_max: record.service_kbps_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedRecord {
    pub domain: String,
    pub serial_number: String,
    pub company: String,
    pub status: String,
    pub online_users_max: i64,
    pub service_kbps_max: i64,
    pub tier: u32,
    pub formatted_usage: String,
}

impl ClassifiedRecord {
    pub fn new(item: DeviceWorkItem, tier: u32, formatted_usage: String) -> Self {
        Self {
            domain: item.domain,
            serial_number: item.serial_number,
            company: item.company,
            status: item.status,
            online_users_max: item.online_users_max,
            service_kbps_max: item.service_kbps_max,
            tier,
            formatted_usage,
        }
    }
}

/// Domain-keyed classified records, each domain sorted by serial number.
///
/// Only the aggregator builds one; callers receive it finished.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    domains: HashMap<String, Vec<ClassifiedRecord>>,
}

impl Report {
    pub(crate) fn from_domains(domains: HashMap<String, Vec<ClassifiedRecord>>) -> Self {
        Self { domains }
    }

    pub fn get(&self, domain: &str) -> Option<&[ClassifiedRecord]> {
        self.domains.get(domain).map(Vec::as_slice)
    }

    /// Domain names in ascending order.
    pub fn domains(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.domains.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn device_count(&self) -> usize {
        self.domains.values().map(Vec::len).sum()
    }

    pub fn tier_histogram(&self) -> BTreeMap<u32, usize> {
        let mut histogram = BTreeMap::new();
        for record in self.domains.values().flatten() {
            *histogram.entry(record.tier).or_insert(0) += 1;
        }
        histogram
    }
}

// Wire bodies

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum LabelsBody {
    Wrapped { labels: Vec<Label> },
    Bare(Vec<Label>),
}

impl LabelsBody {
    pub(crate) fn into_labels(self) -> Vec<Label> {
        match self {
            LabelsBody::Wrapped { labels } => labels,
            LabelsBody::Bare(labels) => labels,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceListBody {
    #[serde(default)]
    pub cds: Vec<DeviceRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DiskListBody {
    #[serde(default)]
    pub disks: Vec<serde_json::Value>,
}

/// Full device view used by the `list` and `show` commands.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub sn: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub license_start_at: String,
    #[serde(default)]
    pub license_end_at: String,
    #[serde(default)]
    pub online_user: i64,
    #[serde(default)]
    pub online_user_max: i64,
    #[serde(default)]
    pub hit_user: i64,
    #[serde(default)]
    pub hit_user_max: i64,
    #[serde(default)]
    pub service_kbps: i64,
    #[serde(default)]
    pub service_kbps_max: i64,
    #[serde(default)]
    pub cache_kbps: i64,
    #[serde(default)]
    pub cache_kbps_max: i64,
    #[serde(default)]
    pub monitor_kbps: i64,
    #[serde(default)]
    pub monitor_kbps_max: i64,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub nodes: Vec<NodeInfo>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NodeInfo {
    #[serde(default)]
    pub sn: String,
    #[serde(default, rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub hit_user: i64,
    #[serde(default)]
    pub hit_user_max: i64,
    #[serde(default)]
    pub service_kbps: i64,
    #[serde(default)]
    pub service_kbps_max: i64,
    #[serde(default)]
    pub cache_kbps: i64,
    #[serde(default)]
    pub cache_kbps_max: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceInfoListBody {
    #[serde(default)]
    pub cds: Vec<DeviceInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceDetailBody {
    pub cds: Option<DeviceInfo>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PortInfo {
    #[serde(default)]
    pub ssh_host: String,
    #[serde(default)]
    pub ssh_port: i64,
    #[serde(default)]
    pub http_url: String,
    #[serde(default)]
    pub http_port: i64,
    #[serde(default)]
    pub https_url: String,
    #[serde(default)]
    pub https_port: i64,
}
