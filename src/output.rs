// src/output.rs

//! Rendering of progress events, fleet views and plans for the CLI.

use std::fmt::Write as _;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::duration::format_duration;
use crate::config::{ConfigFile, LaunchSettings};
use crate::errors::Result;
use crate::fleet::FleetReport;
use crate::launch::{batch_count, ProgressEvent};
use crate::types::LaunchRequest;

/// One progress line. JSON lines carry the kind and timestamp as well.
pub fn render_event(event: &ProgressEvent, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(event.message.clone()),
        OutputFormat::Json => to_json(event),
    }
}

pub fn render_fleet(report: &FleetReport, cluster: &str, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{cluster}: {} running task(s) at {}",
        report.count,
        report.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if report.groups.is_empty() {
        out.push_str("No running tasks found\n");
        return Ok(out);
    }

    for group in &report.groups {
        let _ = writeln!(out, "{} ({} running)", group.name, group.count);
        for member in &group.members {
            let created = member
                .created_at
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(out, "  {:<8} {}  {}", member.status, created, member.task_arn);
        }
    }

    Ok(out)
}

/// Dry-run output: what a launch would do with the current settings.
pub fn render_plan(request: &LaunchRequest, settings: &LaunchSettings) -> String {
    let mut out = String::new();
    let batches = batch_count(request.total_count, settings.batch_size);

    let _ = writeln!(out, "taskfleet dry-run");
    let _ = writeln!(out, "  task_definition = {}", request.task_definition);
    let _ = writeln!(out, "  count = {}", request.total_count);
    let _ = writeln!(
        out,
        "  batches = {} (batch_size = {})",
        batches, settings.batch_size
    );

    for b in 0..batches {
        let first = b * settings.batch_size + 1;
        let last = ((b + 1) * settings.batch_size).min(request.total_count);
        let _ = writeln!(out, "    batch {}: tasks {}-{}", b + 1, first, last);
    }

    let _ = writeln!(
        out,
        "  slow_start = {}",
        settings.is_slow_start(&request.task_definition)
    );
    let _ = writeln!(
        out,
        "  retries: {} in place, {} passes",
        settings.max_launch_retries, settings.max_retry_passes
    );

    out
}

#[derive(Serialize)]
struct ConfigView<'a> {
    cluster: &'a crate::config::ClusterSettings,
    launch: LaunchView<'a>,
    fleet: FleetView,
}

#[derive(Serialize)]
struct LaunchView<'a> {
    batch_size: usize,
    max_launch_retries: u32,
    max_retry_passes: u32,
    retry_delay: String,
    capacity_retry_delay: String,
    slow_start_warmup: String,
    inter_task_delay: String,
    inter_batch_delay: String,
    retry_pass_delay: String,
    slow_start: &'a [String],
}

#[derive(Serialize)]
struct FleetView {
    max_results: u32,
    poll_interval: String,
}

/// Effective configuration, printed back in TOML form.
pub fn render_config(cfg: &ConfigFile) -> Result<String> {
    let l = &cfg.launch;
    let view = ConfigView {
        cluster: &cfg.cluster,
        launch: LaunchView {
            batch_size: l.batch_size,
            max_launch_retries: l.max_launch_retries,
            max_retry_passes: l.max_retry_passes,
            retry_delay: format_duration(l.retry_delay),
            capacity_retry_delay: format_duration(l.capacity_retry_delay),
            slow_start_warmup: format_duration(l.slow_start_warmup),
            inter_task_delay: format_duration(l.inter_task_delay),
            inter_batch_delay: format_duration(l.inter_batch_delay),
            retry_pass_delay: format_duration(l.retry_pass_delay),
            slow_start: l.slow_start.patterns(),
        },
        fleet: FleetView {
            max_results: cfg.fleet.max_results,
            poll_interval: format_duration(cfg.fleet.poll_interval),
        },
    };

    toml::to_string_pretty(&view).map_err(|e| anyhow::Error::from(e).into())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| anyhow::Error::from(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfigFile;
    use crate::fleet::{GroupMember, TaskGroup};
    use crate::types::TaskStatus;
    use chrono::{TimeZone, Utc};

    #[test]
    fn text_event_is_the_message() {
        let ev = ProgressEvent::task_launched(2, 3);
        assert_eq!(
            render_event(&ev, OutputFormat::Text).unwrap(),
            "Successfully launched task 2/3"
        );
    }

    #[test]
    fn json_event_has_message_field() {
        let ev = ProgressEvent::task_failed(1, "Capacity is unavailable");
        let line = render_event(&ev, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["message"], "Failed to launch task 1: Capacity is unavailable");
        assert_eq!(value["kind"], "task_failed");
    }

    #[test]
    fn fleet_text_lists_groups() {
        let report = FleetReport {
            groups: vec![TaskGroup {
                name: "Video_Mix".to_string(),
                count: 1,
                members: vec![GroupMember {
                    task_arn: "arn:task/1".to_string(),
                    status: TaskStatus::Running,
                    created_at: Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()),
                }],
            }],
            count: 1,
            fetched_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 5, 0).unwrap(),
        };
        let text = render_fleet(&report, "SYB", OutputFormat::Text).unwrap();
        assert!(text.contains("SYB: 1 running task(s)"));
        assert!(text.contains("Video_Mix (1 running)"));
        assert!(text.contains("RUNNING"));
        assert!(text.contains("03:04:05"));
    }

    #[test]
    fn plan_lists_batches() {
        let plan = render_plan(&LaunchRequest::new("Audio", 60), &LaunchSettings::default());
        assert!(plan.contains("batches = 3"));
        assert!(plan.contains("batch 3: tasks 51-60"));
        assert!(plan.contains("slow_start = false"));
    }

    #[test]
    fn config_renders_as_toml() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        let text = render_config(&cfg).unwrap();
        assert!(text.contains("batch_size = 25"));
        assert!(text.contains("retry_delay = \"2s\""));
        assert!(text.contains("[fleet]"));
    }
}
