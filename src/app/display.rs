use crate::domain::model::{DeviceInfo, NodeInfo, PortInfo, Report};
use comfy_table::presets::ASCII_FULL;
use comfy_table::Table;

/// Renders `value(max)`, printing `-` for zero on either side.
pub fn format_item(value: i64, max_value: i64) -> String {
    let dash_if_zero = |n: i64| {
        if n == 0 {
            "-".to_string()
        } else {
            n.to_string()
        }
    };
    format!("{}({})", dash_if_zero(value), dash_if_zero(max_value))
}

/// ASCII-bordered table with a header rule.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL).set_header(headers.to_vec());
    for row in rows {
        table.add_row(row.clone());
    }
    table.to_string()
}

pub const SHORT_DEVICE_HEADERS: [&str; 6] = ["#", "company", "sn", "status", "version", "updated_at"];

pub const LONG_DEVICE_HEADERS: [&str; 13] = [
    "#",
    "company",
    "sn",
    "status",
    "license_start",
    "license_end",
    "online_user(max)",
    "hit_user(max)",
    "service_kbps(max)",
    "cache_kbps(max)",
    "monitor_kbps(max)",
    "version",
    "updated_at",
];

pub const NODE_HEADERS: [&str; 7] = [
    "#",
    "sn",
    "type",
    "status",
    "hit_user(max)",
    "cache_kbps(max)",
    "service_kbps(max)",
];

/// Devices whose serial number or company contains `filter`.
pub fn filter_devices<'a>(devices: &'a [DeviceInfo], filter: Option<&str>) -> Vec<&'a DeviceInfo> {
    match filter {
        None | Some("") => devices.iter().collect(),
        Some(needle) => devices
            .iter()
            .filter(|d| d.sn.contains(needle) || d.company.contains(needle))
            .collect(),
    }
}

pub fn device_table(devices: &[&DeviceInfo], long: bool) -> String {
    let rows: Vec<Vec<String>> = devices
        .iter()
        .enumerate()
        .map(|(index, d)| {
            let number = (index + 1).to_string();
            if long {
                vec![
                    number,
                    d.company.clone(),
                    d.sn.clone(),
                    d.status.clone(),
                    d.license_start_at.clone(),
                    d.license_end_at.clone(),
                    format_item(d.online_user, d.online_user_max),
                    format_item(d.hit_user, d.hit_user_max),
                    format_item(d.service_kbps, d.service_kbps_max),
                    format_item(d.cache_kbps, d.cache_kbps_max),
                    format_item(d.monitor_kbps, d.monitor_kbps_max),
                    d.version.clone(),
                    d.updated_at.clone(),
                ]
            } else {
                vec![
                    number,
                    d.company.clone(),
                    d.sn.clone(),
                    d.status.clone(),
                    d.version.clone(),
                    d.updated_at.clone(),
                ]
            }
        })
        .collect();

    if long {
        render_table(&LONG_DEVICE_HEADERS, &rows)
    } else {
        render_table(&SHORT_DEVICE_HEADERS, &rows)
    }
}

pub fn node_table(nodes: &[NodeInfo]) -> String {
    let rows: Vec<Vec<String>> = nodes
        .iter()
        .enumerate()
        .map(|(index, n)| {
            vec![
                (index + 1).to_string(),
                n.sn.clone(),
                n.node_type.clone(),
                n.status.clone(),
                format_item(n.hit_user, n.hit_user_max),
                format_item(n.cache_kbps, n.cache_kbps_max),
                format_item(n.service_kbps, n.service_kbps_max),
            ]
        })
        .collect();
    render_table(&NODE_HEADERS, &rows)
}

pub fn port_table(company: &str, port: &PortInfo) -> String {
    render_table(
        &["company", "ssh_host", "ssh_port"],
        &[vec![
            company.to_string(),
            port.ssh_host.clone(),
            port.ssh_port.to_string(),
        ]],
    )
}

/// Per-domain device counts and the tier histogram.
pub fn report_summary(report: &Report) -> String {
    let rows: Vec<Vec<String>> = report
        .domains()
        .into_iter()
        .map(|domain| {
            let count = report.get(domain).map(<[_]>::len).unwrap_or(0);
            vec![domain.to_string(), count.to_string()]
        })
        .collect();

    let tiers: Vec<Vec<String>> = report
        .tier_histogram()
        .into_iter()
        .map(|(tier, count)| vec![tier.to_string(), count.to_string()])
        .collect();

    format!(
        "{}\n{}",
        render_table(&["domain", "devices"], &rows),
        render_table(&["tier", "devices"], &tiers)
    )
}
