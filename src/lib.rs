// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod fleet;
pub mod launch;
pub mod logging;
pub mod output;
pub mod provider;
pub mod types;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::cli::{CliArgs, Command, FleetArgs, LaunchArgs};
use crate::config::{load_or_default, ConfigFile};
use crate::errors::{Result, TaskfleetError};
use crate::fleet::FleetStatusReader;
use crate::launch::{start_run, BatchController};
use crate::provider::EcsClient;
use crate::types::LaunchRequest;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + env overrides)
/// - the ECS client shared by the launcher and the fleet reader
/// - progress streaming to stdout
/// - Ctrl-C handling (treated as the caller disconnecting)
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref())?;

    match args.command {
        Command::Config => {
            print!("{}", output::render_config(&cfg)?);
            Ok(())
        }
        Command::Launch(launch) => run_launch(&cfg, launch).await,
        Command::Fleet(fleet) => run_fleet(&cfg, fleet).await,
    }
}

async fn run_launch(cfg: &ConfigFile, args: LaunchArgs) -> Result<()> {
    let request = LaunchRequest::new(args.task_definition, args.count);

    if args.dry_run {
        print!("{}", output::render_plan(&request, &cfg.launch));
        return Ok(());
    }

    let client = Arc::new(EcsClient::from_env(&cfg.cluster).await);
    let controller = Arc::new(BatchController::from_api(
        client,
        cfg.cluster.name.clone(),
        cfg.launch.clone(),
    ));

    let mut session = start_run(controller, request);

    // Ctrl-C → stop launching.
    {
        let cancel = session.cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            cancel.cancel();
        });
    }

    while let Some(event) = session.next_event().await {
        println!("{}", output::render_event(&event, args.output)?);
    }

    let report = session.handle.await.map_err(anyhow::Error::from)?;

    if report.cancelled {
        warn!(
            successful = report.successful,
            total = report.total_requested,
            "launch cancelled before completion"
        );
        return Ok(());
    }

    if report.failed() > 0 {
        return Err(TaskfleetError::Other(anyhow::anyhow!(
            "{} of {} tasks failed to launch",
            report.failed(),
            report.total_requested
        )));
    }

    Ok(())
}

async fn run_fleet(cfg: &ConfigFile, args: FleetArgs) -> Result<()> {
    let client = Arc::new(EcsClient::from_env(&cfg.cluster).await);
    let reader = FleetStatusReader::new(client, cfg.cluster.name.clone(), cfg.fleet.max_results);

    if !args.watch {
        let report = reader.poll_grouped().await?;
        print!("{}", output::render_fleet(&report, reader.cluster(), args.output)?);
        return Ok(());
    }

    info!(
        cluster = %reader.cluster(),
        interval_ms = cfg.fleet.poll_interval.as_millis() as u64,
        "watching fleet"
    );

    let mut ticker = tokio::time::interval(cfg.fleet.poll_interval);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match reader.poll_grouped().await {
                    Ok(report) => {
                        print!("{}", output::render_fleet(&report, reader.cluster(), args.output)?);
                    }
                    Err(err) => error!(error = %err, "fleet poll failed"),
                }
            }
            _ = &mut ctrl_c => {
                info!("stopping fleet watch");
                break;
            }
        }
    }

    Ok(())
}
