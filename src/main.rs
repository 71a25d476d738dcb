use cdsops::app::display;
use cdsops::utils::error::ErrorSeverity;
use cdsops::utils::{logger, validation::Validate};
use cdsops::{
    AppConfig, Cli, Command, HttpInventoryClient, LocalStorage, ReportBuilder,
    ReportWriter,
};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI args: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: Cli) -> cdsops::Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Command::Report {
        output_dir,
        workers,
    } = &cli.command
    {
        if let Some(dir) = output_dir {
            config.report.output_dir = dir.clone();
        }
        if let Some(workers) = workers {
            config.pipeline = config.pipeline.clone().with_workers(*workers);
        }
    }
    config.validate()?;

    let client = HttpInventoryClient::from_config(&config.api)?;

    match cli.command {
        Command::List { filter, long } => {
            let devices = client.list_devices().await?;
            let selected = display::filter_devices(&devices, filter.as_deref());
            if selected.is_empty() {
                println!("CDS list is empty");
            } else {
                println!("{}", display::device_table(&selected, long));
            }
        }
        Command::Show { sn } => match client.device_detail(&sn).await? {
            None => println!("CDS information is empty with sn: {:?}", sn),
            Some(device) => {
                println!("{}", display::device_table(&[&device], true));
                if device.nodes.is_empty() {
                    println!("Nodes list of CDS {:?} is empty", sn);
                } else {
                    println!("CDS {:?} Nodes list", sn);
                    println!("{}", display::node_table(&device.nodes));
                }
            }
        },
        Command::Port { sn } => {
            let port = client.device_port(&sn).await?;
            let company = match client.device_detail(&sn).await {
                Ok(Some(device)) => device.company,
                Ok(None) => String::new(),
                Err(e) => {
                    tracing::warn!("Could not look up company for {}: {}", sn, e);
                    String::new()
                }
            };
            println!("{}", display::port_table(&company, &port));
        }
        Command::Report { .. } => {
            tracing::info!("🚀 Collecting report data from {}", client.host());
            let builder = ReportBuilder::new(Arc::new(client), config.pipeline.clone());
            let report = builder.build().await?;

            let writer = ReportWriter::new(LocalStorage::new(config.report.output_dir.clone()));
            let location = writer.write(&report, chrono::Utc::now()).await?;

            println!("{}", display::report_summary(&report));
            println!("📁 Report saved to: {}", location);
            if report.is_empty() {
                tracing::warn!("No devices were collected, the report bundle has no sheets");
            }
        }
    }

    Ok(())
}
