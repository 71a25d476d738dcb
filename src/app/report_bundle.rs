use crate::domain::model::{ClassifiedRecord, Report};
use crate::domain::ports::Storage;
use crate::utils::error::{CdsError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashSet;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const HEADERS: [&str; 5] = [
    "Customer Name",
    "SN",
    "Service Max Speed",
    "Status",
    "Device Type",
];

/// The bundle is named after the day the data describes, i.e. yesterday.
pub fn bundle_file_name(now: DateTime<Utc>) -> String {
    let day = now - TimeDelta::days(1);
    format!("cds_message-{}.zip", day.format("%Y-%m-%d"))
}

fn sanitize(domain: &str) -> String {
    domain
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}

pub fn entry_name(domain: &str) -> String {
    format!("{}.csv", sanitize(domain))
}

/// Like `entry_name`, but suffixes `-2`, `-3`, ... when two domains sanitize to
/// the same entry.
fn unique_entry_name(domain: &str, used: &mut HashSet<String>) -> String {
    let stem = sanitize(domain);
    let mut name = format!("{}.csv", stem);
    let mut n = 2;
    while used.contains(&name) {
        name = format!("{}-{}.csv", stem, n);
        n += 1;
    }
    used.insert(name.clone());
    name
}

pub fn render_domain_csv(records: &[ClassifiedRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;
    for record in records {
        let tier = record.tier.to_string();
        writer.write_record([
            record.company.as_str(),
            record.serial_number.as_str(),
            record.formatted_usage.as_str(),
            record.status.as_str(),
            tier.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| CdsError::IoError(e.into_error()))
}

/// One CSV per domain, domains in ascending order.
pub fn build_bundle(report: &Report) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let mut used = HashSet::new();

    for domain in report.domains() {
        let records = report.get(domain).unwrap_or_default();
        let name = unique_entry_name(domain, &mut used);
        if name != entry_name(domain) {
            tracing::warn!(
                "Domain {:?} collides with another sheet, writing it as {}",
                domain,
                name
            );
        }
        zip.start_file(name, SimpleFileOptions::default())?;
        zip.write_all(&render_domain_csv(records)?)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

pub struct ReportWriter<S: Storage> {
    storage: S,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Writes the bundle and returns where it landed.
    pub async fn write(&self, report: &Report, now: DateTime<Utc>) -> Result<String> {
        let file_name = bundle_file_name(now);
        let data = build_bundle(report)?;

        tracing::debug!(
            "Writing report bundle {} ({} bytes, {} sheets)",
            file_name,
            data.len(),
            report.len()
        );
        self.storage.write_file(&file_name, &data).await?;
        Ok(self.storage.location(&file_name))
    }
}
