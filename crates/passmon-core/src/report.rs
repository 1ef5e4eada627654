//! Status-line rendering: pure, byte-deterministic formatting of a progress
//! snapshot. Terminal concerns (carriage return, padding, flushing) belong
//! to the caller.

use std::time::Duration;

/// Default progress bar width in cells.
pub const DEFAULT_BAR_WIDTH: usize = 25;

/// One observation of a supervised run, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    /// Percent complete, already clamped to `[0, 100]`.
    pub percentage: f64,
    /// Wall time since the run started.
    pub elapsed: Duration,
    /// Estimated time remaining; `None` renders as `unknown`.
    pub remaining: Option<Duration>,
    /// Smoothed throughput in units per second.
    pub rate: f64,
    /// Passes finished so far.
    pub passes_done: u64,
    /// Passes a full run executes.
    pub passes_total: u64,
}

/// Render the full status line. Identical snapshots produce identical bytes.
pub fn render_status_line(snapshot: &ProgressSnapshot, bar_width: usize) -> String {
    let remaining = match snapshot.remaining {
        Some(d) => format_duration(d),
        None => "unknown".to_string(),
    };
    format!(
        "{} {:.2}% | elapsed {} | remaining {} | {} units/s | pass {}/{}",
        render_bar(snapshot.percentage, bar_width),
        snapshot.percentage,
        format_duration(snapshot.elapsed),
        remaining,
        humanize(snapshot.rate),
        snapshot.passes_done,
        snapshot.passes_total,
    )
}

/// Bracketed bar of exactly `width` cells: `round(pct / 100 * width)` filled
/// `>` cells, the rest spaces.
pub fn render_bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage / 100.0 * width as f64).round() as usize).min(width);
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    for cell in 0..width {
        bar.push(if cell < filled { '>' } else { ' ' });
    }
    bar.push(']');
    bar
}

/// Humanized duration with integer seconds: `42s`, `7m 2s`, `2h 7m 42s`.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Two decimals plus the largest magnitude suffix the value reaches:
/// `1.23G`, `4.56M`, `7.89K`, else the bare value. Used for the rate field
/// and for humanizing unit totals.
pub fn humanize(value: f64) -> String {
    if value >= 1e9 {
        format!("{:.2}G", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_edges() {
        assert_eq!(render_bar(0.0, 25), "[                         ]");
        assert_eq!(render_bar(100.0, 25), "[>>>>>>>>>>>>>>>>>>>>>>>>>]");
        assert_eq!(render_bar(50.0, 4), "[>>  ]");
    }

    #[test]
    fn bar_rounds_to_nearest_cell() {
        // 34.56% of 25 cells = 8.64 -> 9 filled
        assert_eq!(render_bar(34.56, 25), "[>>>>>>>>>                ]");
        // 10% of 25 cells = 2.5 -> rounds away from zero to 3
        assert_eq!(render_bar(10.0, 25), "[>>>                      ]");
    }

    #[test]
    fn bar_width_is_respected() {
        for width in [1, 10, 25, 80] {
            assert_eq!(render_bar(33.3, width).chars().count(), width + 2);
        }
    }

    #[test]
    fn duration_tiers() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_millis(800)), "0s");
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(59)), "59s");
        assert_eq!(format_duration(Duration::from_secs(60)), "1m 0s");
        assert_eq!(format_duration(Duration::from_secs(422)), "7m 2s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h 0m 0s");
        assert_eq!(format_duration(Duration::from_secs(7662)), "2h 7m 42s");
    }

    #[test]
    fn magnitude_suffixes() {
        assert_eq!(humanize(0.0), "0.00");
        assert_eq!(humanize(1.5), "1.50");
        assert_eq!(humanize(999.0), "999.00");
        assert_eq!(humanize(1000.0), "1.00K");
        assert_eq!(humanize(1_234_567.0), "1.23M");
        assert_eq!(humanize(5e9), "5.00G");
    }

    #[test]
    fn status_line_mid_run() {
        let snapshot = ProgressSnapshot {
            percentage: 34.56,
            elapsed: Duration::from_secs(72),
            remaining: None,
            rate: 1_234_567.0,
            passes_done: 3,
            passes_total: 8,
        };
        assert_eq!(
            render_status_line(&snapshot, 25),
            "[>>>>>>>>>                ] 34.56% | elapsed 1m 12s | \
             remaining unknown | 1.23M units/s | pass 3/8"
        );
    }

    #[test]
    fn status_line_completed() {
        let snapshot = ProgressSnapshot {
            percentage: 100.0,
            elapsed: Duration::from_secs(3661),
            remaining: Some(Duration::ZERO),
            rate: 980.5,
            passes_done: 8,
            passes_total: 8,
        };
        assert_eq!(
            render_status_line(&snapshot, 10),
            "[>>>>>>>>>>] 100.00% | elapsed 1h 1m 1s | \
             remaining 0s | 980.50 units/s | pass 8/8"
        );
    }

    #[test]
    fn identical_snapshots_render_identical_bytes() {
        let snapshot = ProgressSnapshot {
            percentage: 61.8,
            elapsed: Duration::from_secs(95),
            remaining: Some(Duration::from_secs(58)),
            rate: 12.04,
            passes_done: 5,
            passes_total: 9,
        };
        let a = render_status_line(&snapshot, 25);
        let b = render_status_line(&snapshot.clone(), 25);
        assert_eq!(a, b);
    }
}
