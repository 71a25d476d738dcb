// Application layer: what the commands do with a finished report or device lookup.

pub mod display;
pub mod report_bundle;

pub use report_bundle::ReportWriter;
