//! `passmon run` – run the digest workload under supervision with a live
//! status line.

use anyhow::{Context, Result};
use passmon_core::config::PassmonConfig;
use passmon_core::job::{Job, OutputSink};
use passmon_core::progress::{ProgressTimer, RateEstimator};
use passmon_core::report::{self, ProgressSnapshot};
use passmon_core::runner::{JobRunner, RunOutcome};
use passmon_core::workload::{DigestArtifact, DigestJob};
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the artifact record goes: append to a file, or stdout.
enum ArtifactSink {
    File(std::fs::File),
    Stdout,
}

impl ArtifactSink {
    fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("open output file {}", path.display()))?;
                Ok(ArtifactSink::File(file))
            }
            None => Ok(ArtifactSink::Stdout),
        }
    }
}

impl OutputSink<DigestArtifact> for ArtifactSink {
    fn write(&mut self, artifact: DigestArtifact) -> Result<()> {
        let record = format!(
            "{}  passes={} bytes={}\n",
            artifact.hex, artifact.passes_run, artifact.bytes_hashed
        );
        match self {
            ArtifactSink::File(file) => file
                .write_all(record.as_bytes())
                .context("write artifact record")?,
            ArtifactSink::Stdout => print!("{record}"),
        }
        Ok(())
    }
}

pub async fn run_workload(
    cfg: &PassmonConfig,
    passes: Option<u64>,
    buf_mib: Option<u64>,
    output: Option<PathBuf>,
    poll_ms: Option<u64>,
) -> Result<()> {
    let mut cfg = cfg.clone();
    if let Some(poll_ms) = poll_ms {
        cfg.poll_interval_ms = poll_ms;
    }
    let mut workload = cfg.workload_or_default();
    if let Some(passes) = passes {
        workload.passes = passes;
    }
    if let Some(buf_mib) = buf_mib {
        workload.buf_mib = buf_mib;
    }
    cfg.workload = Some(workload.clone());
    cfg.validate()?;

    let buf_len = (workload.buf_mib * 1024 * 1024) as usize;
    let job = DigestJob::new(workload.passes, buf_len);
    let total_units = job.total_units();
    let total_passes = job.total_passes();

    let sink = ArtifactSink::open(output.as_deref())?;
    let mut timer = ProgressTimer::new(total_units)?;
    let mut rate = RateEstimator::new(cfg.smoothing_alpha)?;

    tracing::info!(
        passes = workload.passes,
        buf_mib = workload.buf_mib,
        total_units,
        poll_interval_ms = cfg.poll_interval_ms,
        "starting digest run"
    );
    println!(
        "passmon: {} passes over {} MiB, {} units total",
        workload.passes,
        workload.buf_mib,
        report::humanize(total_units as f64)
    );

    let mut runner = JobRunner::new();
    runner.start(job, sink).context("start supervised run")?;

    // first Ctrl-C requests a cooperative stop at the next pass boundary
    let interrupt = runner.interrupt_controller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt requested, stopping at the next pass boundary");
            interrupt.signal_interrupt();
        }
    });

    let mut ticker = tokio::time::interval(Duration::from_millis(cfg.poll_interval_ms));
    while !runner.is_finished() {
        ticker.tick().await;
        observe_and_render(
            runner.units_completed(),
            runner.passes_done(),
            total_passes,
            &mut timer,
            &mut rate,
            cfg.bar_width,
        );
    }
    // one last sample so the line shows the end state before the newline
    observe_and_render(
        runner.units_completed(),
        runner.passes_done(),
        total_passes,
        &mut timer,
        &mut rate,
        cfg.bar_width,
    );
    println!();

    let outcome = tokio::task::spawn_blocking(move || runner.join())
        .await
        .context("join supervised run")??;

    let elapsed = timer.elapsed();
    let avg_rate = if elapsed.as_secs_f64() > 0.0 {
        timer.current_value() as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };
    let verb = match outcome {
        RunOutcome::Completed => "finished",
        RunOutcome::Interrupted => "interrupted",
    };
    println!(
        "run {verb} (time: {}, avg rate: {} units/s)",
        report::format_duration(elapsed),
        report::humanize(avg_rate)
    );
    tracing::info!(
        outcome = verb,
        elapsed_secs = elapsed.as_secs_f64(),
        "run ended"
    );
    Ok(())
}

/// Feed one observation into the telemetry and overwrite the status line.
/// Trailing spaces wipe leftovers when the line shrinks.
fn observe_and_render(
    units: u64,
    passes_done: u64,
    passes_total: u64,
    timer: &mut ProgressTimer,
    rate: &mut RateEstimator,
    bar_width: usize,
) {
    timer.update_current_value(units);
    let elapsed = timer.elapsed().as_secs_f64();
    if elapsed > 0.0 {
        rate.add_measurement(units as f64 / elapsed);
    }
    let snapshot = ProgressSnapshot {
        percentage: timer.percentage(),
        elapsed: timer.elapsed(),
        remaining: timer.remaining(),
        rate: rate.average(),
        passes_done,
        passes_total,
    };
    let line = report::render_status_line(&snapshot, bar_width);
    print!("{line}          \r");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_appends_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifacts.log");

        let mut sink = ArtifactSink::open(Some(&path)).unwrap();
        sink.write(DigestArtifact {
            hex: "ab".repeat(32),
            passes_run: 4,
            bytes_hashed: 4096,
        })
        .unwrap();
        sink.write(DigestArtifact {
            hex: "cd".repeat(32),
            passes_run: 2,
            bytes_hashed: 2048,
        })
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            format!("{}  passes=4 bytes=4096", "ab".repeat(32))
        );
        assert_eq!(
            lines[1],
            format!("{}  passes=2 bytes=2048", "cd".repeat(32))
        );
    }
}
