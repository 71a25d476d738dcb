use cdsops::{
    build_report, CdsError, HttpInventoryClient, LocalStorage, PipelineConfig, ReportBuilder,
    ReportWriter, StaticToken,
};
use chrono::TimeZone;
use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn client_for(server: &MockServer) -> Arc<HttpInventoryClient> {
    Arc::new(
        HttpInventoryClient::new(
            server.base_url(),
            Arc::new(StaticToken::new("test-token")),
            Duration::from_secs(5),
            false,
        )
        .unwrap(),
    )
}

#[tokio::test]
async fn test_end_to_end_report_over_http() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;

    let labels_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/cds-labels")
                .header("X-auth-token", "test-token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"labels": [{"id": 1, "name": "A", "count": 1}]}));
        })
        .await;
    let devices_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/cds").query_param("label", "1");
            then.status(200).json_body(serde_json::json!({
                "cds": [{
                    "sn": "X1",
                    "company": "Acme",
                    "status": "up",
                    "online_user": 3,
                    "online_user_max": 20,
                    "service_kbps": 100,
                    "service_kbps_max": 2048
                }]
            }));
        })
        .await;
    let disks_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/icaches/X1/disks");
            then.status(200).json_body(serde_json::json!({
                "disks": [{}, {}, {}, {}, {}, {}, {}, {}]
            }));
        })
        .await;

    let report = build_report(client_for(&server)).await?;

    labels_mock.assert_async().await;
    devices_mock.assert_async().await;
    disks_mock.assert_async().await;

    let records = report.get("A").unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].company, "Acme");
    assert_eq!(records[0].serial_number, "X1");
    assert_eq!(records[0].status, "up");
    assert_eq!(records[0].tier, 1000);
    assert_eq!(records[0].formatted_usage, "20/2.0Mbps");

    // Write the bundle the way the report command does.
    let temp_dir = TempDir::new()?;
    let writer = ReportWriter::new(LocalStorage::new(temp_dir.path()));
    let now = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
    let location = writer.write(&report, now).await?;

    assert!(location.ends_with("cds_message-2024-01-01.zip"));
    let data = std::fs::read(temp_dir.path().join("cds_message-2024-01-01.zip"))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data))?;
    let mut sheet = archive.by_name("A.csv")?;
    let mut content = String::new();
    std::io::Read::read_to_string(&mut sheet, &mut content)?;
    assert!(content.contains("Acme,X1,20/2.0Mbps,up,1000"));
    Ok(())
}

#[tokio::test]
async fn test_label_endpoint_error_aborts_report() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/cds-labels");
            then.status(503);
        })
        .await;
    let devices_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/cds");
            then.status(200).json_body(serde_json::json!({"cds": []}));
        })
        .await;

    let builder = ReportBuilder::new(client_for(&server), PipelineConfig::default());
    let err = builder.build().await.unwrap_err();

    assert!(matches!(err, CdsError::StatusError { status: 503, .. }));
    assert_eq!(devices_mock.hits_async().await, 0);
    assert_eq!(builder.stats().snapshot().workers_started, 0);
}

#[tokio::test]
async fn test_http_failures_degrade_or_skip_per_item() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/cds-labels");
            then.status(200).json_body(serde_json::json!([
                {"id": 1, "name": "good", "count": 1},
                {"id": 2, "name": "broken", "count": 1}
            ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/cds").query_param("label", "1");
            then.status(200).json_body(serde_json::json!({
                "cds": [{"sn": "G1", "company": "Acme", "status": "up",
                         "online_user_max": 5, "service_kbps_max": 1024}]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/cds").query_param("label", "2");
            then.status(200).body("{\"cds\": [");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/icaches/G1/disks");
            then.status(500);
        })
        .await;

    let builder = ReportBuilder::new(
        client_for(&server),
        PipelineConfig::default().with_workers(1),
    );
    let report = builder.build().await.unwrap();

    assert_eq!(report.domains(), vec!["good"]);
    let record = &report.get("good").unwrap()[0];
    assert_eq!(record.tier, 0);
    assert_eq!(record.formatted_usage, "5/1.0Mbps");

    let stats = builder.stats().snapshot();
    assert_eq!(stats.labels_skipped, 1);
    assert_eq!(stats.devices_degraded, 1);
    assert_eq!(stats.workers_active, 0);
}
