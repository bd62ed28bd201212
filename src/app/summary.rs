use std::fmt::Write as _;
use std::time::Duration;

use crate::metrics::{Summary, TestRun, format_millis, format_x100};

/// Label for the bucket of requests that never got a response.
pub(crate) const NO_STATUS_LABEL: &str = "error";

pub(crate) fn summary_lines(run: &TestRun, summary: &Summary) -> Vec<String> {
    let mut lines = vec![
        "--- RUN SUMMARY ---".to_owned(),
        format!("URL: {}", run.url),
        format!("Duration: {} s", format_seconds(run.duration)),
        format!("Total requests: {}", summary.total_requests),
        format!(
            "200 OK: {} ({}%)",
            summary.success_count,
            format_x100(summary.success_rate_x100())
        ),
        format!("Status distribution: {}", status_distribution(summary)),
        format!("Total data: {} bytes", summary.total_bytes),
        format!(
            "Latency (avg/min/max): {} ms / {} ms / {} ms",
            format_millis(summary.avg_latency, 1),
            format_millis(summary.min_latency, 1),
            format_millis(summary.max_latency, 1)
        ),
    ];
    if let Some(percentiles) = summary.percentiles {
        lines.push(format!(
            "Latency (p50/p90/p99): {} ms / {} ms / {} ms",
            format_millis(percentiles.p50, 1),
            format_millis(percentiles.p90, 1),
            format_millis(percentiles.p99, 1)
        ));
    }
    lines.push(format!(
        "Requests/sec: {}",
        format_x100(summary.requests_per_second_x100(run.duration))
    ));
    lines.push("-------------------".to_owned());
    lines
}

pub(crate) fn print_summary(run: &TestRun, summary: &Summary) {
    println!();
    for line in summary_lines(run, summary) {
        println!("{}", line);
    }
}

/// `error=3, 200=4, 429=1`: the absent bucket sorts first.
pub(crate) fn status_distribution(summary: &Summary) -> String {
    let mut rendered = String::new();
    for (status, count) in &summary.status_counts {
        if !rendered.is_empty() {
            rendered.push_str(", ");
        }
        let written = match status {
            Some(code) => write!(rendered, "{}={}", code, count),
            None => write!(rendered, "{}={}", NO_STATUS_LABEL, count),
        };
        if written.is_err() {
            break;
        }
    }
    if rendered.is_empty() {
        rendered.push_str("none");
    }
    rendered
}

fn format_seconds(duration: Duration) -> String {
    let centis = duration
        .as_millis()
        .saturating_add(5)
        .checked_div(10)
        .unwrap_or(0);
    format_x100(u64::try_from(centis).unwrap_or(u64::MAX))
}
