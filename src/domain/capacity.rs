//! Device capacity tiers and usage formatting.

/// Tier assigned when the disk inventory could not be fetched.
pub const UNKNOWN_TIER: u32 = 0;

/// Maps a disk count to a capacity tier.
///
/// A count of exactly 5 falls through to 3000: the 1000 band starts above 5.
pub fn classify(disk_count: usize) -> u32 {
    if disk_count < 5 {
        500
    } else if disk_count > 5 && disk_count <= 10 {
        1000
    } else if disk_count > 10 && disk_count <= 14 {
        2000
    } else {
        3000
    }
}

/// Formats peak users and peak service bandwidth as `users/N.NMbps`.
pub fn format_usage(online_users_max: i64, service_kbps_max: i64) -> String {
    let mbps = service_kbps_max as f64 / 1024.0;
    let rounded = (mbps * 10.0).round() / 10.0;
    format!("{}/{:.1}Mbps", online_users_max, rounded)
}
