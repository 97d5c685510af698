use std::time::Duration;

use crate::http::StatsSnapshot;

/// Everything the final report needs once the pool has drained.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RunReport {
    pub(crate) stats: StatsSnapshot,
    pub(crate) elapsed: Duration,
    pub(crate) workers: usize,
}

pub(crate) fn summary_lines(report: &RunReport) -> Vec<String> {
    let stats = report.stats;
    let body = vec![
        format!("Total Requests: {}", stats.attempts),
        format!("Succeeded (2xx): {}", stats.successes),
        format!("Non-2xx: {}", stats.non_success),
        format!("Errors: {}", stats.errors),
        format!("Workers: {}", report.workers),
        format!("Elapsed: {}", format_elapsed(report.elapsed)),
        format!(
            "Average Rate: {} req/s",
            average_rate(stats.attempts, report.elapsed)
        ),
    ];
    boxed(&body)
}

pub(crate) fn progress_line(stats: &StatsSnapshot, elapsed: Duration, queued: usize) -> String {
    format!(
        "{} requests ({} ok, {} non-2xx, {} errors, {} in flight, {} queued) after {}",
        stats.attempts,
        stats.successes,
        stats.non_success,
        stats.errors,
        stats.in_flight(),
        queued,
        format_elapsed(elapsed)
    )
}

fn boxed(body: &[String]) -> Vec<String> {
    let width = body
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let rule = format!("+{}+", "-".repeat(width.saturating_add(2)));
    let mut lines = Vec::with_capacity(body.len().saturating_add(2));
    lines.push(rule.clone());
    for line in body {
        lines.push(format!("| {:<width$} |", line, width = width));
    }
    lines.push(rule);
    lines
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("{}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis())
}

/// Whole requests per second; zero when no time has passed.
fn average_rate(requests: u64, elapsed: Duration) -> u128 {
    u128::from(requests)
        .saturating_mul(1000)
        .checked_div(elapsed.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(attempts: u64, elapsed: Duration) -> RunReport {
        RunReport {
            stats: StatsSnapshot {
                attempts,
                successes: attempts.saturating_sub(2),
                non_success: 1,
                errors: 1,
            },
            elapsed,
            workers: 4,
        }
    }

    #[test]
    fn summary_lines_report_total_in_a_box() -> Result<(), String> {
        let lines = summary_lines(&report(1500, Duration::from_millis(3_000)));
        let first = lines.first().ok_or("missing top rule")?;
        let last = lines.last().ok_or("missing bottom rule")?;
        if !first.starts_with("+-") || first != last {
            return Err(format!("Unexpected rules: {} / {}", first, last));
        }
        if !lines.iter().any(|line| line == &format!("| {:<23} |", "Total Requests: 1500")) {
            return Err(format!("Missing total line: {:?}", lines));
        }
        let widths: Vec<usize> = lines.iter().map(|line| line.chars().count()).collect();
        if widths.windows(2).any(|pair| pair.first() != pair.last()) {
            return Err(format!("Ragged box: {:?}", lines));
        }
        Ok(())
    }

    #[test]
    fn summary_lines_include_breakdown_and_rate() -> Result<(), String> {
        let lines = summary_lines(&report(1500, Duration::from_millis(3_000)));
        let joined = lines.join("\n");
        for needle in [
            "Succeeded (2xx): 1498",
            "Non-2xx: 1",
            "Errors: 1",
            "Workers: 4",
            "Elapsed: 3.000s",
            "Average Rate: 500 req/s",
        ] {
            if !joined.contains(needle) {
                return Err(format!("Missing '{}' in {:?}", needle, lines));
            }
        }
        Ok(())
    }

    #[test]
    fn average_rate_handles_zero_elapsed() -> Result<(), String> {
        if average_rate(10, Duration::ZERO) != 0 {
            return Err("Expected zero rate for zero elapsed".to_owned());
        }
        if average_rate(0, Duration::from_secs(5)) != 0 {
            return Err("Expected zero rate for zero requests".to_owned());
        }
        Ok(())
    }

    #[test]
    fn progress_line_reports_queue_and_in_flight() -> Result<(), String> {
        let stats = StatsSnapshot {
            attempts: 10,
            successes: 6,
            non_success: 1,
            errors: 1,
        };
        let line = progress_line(&stats, Duration::from_millis(2_500), 7);
        let expected = "10 requests (6 ok, 1 non-2xx, 1 errors, 2 in flight, 7 queued) after 2.500s";
        if line != expected {
            return Err(format!("Unexpected progress line: {}", line));
        }
        Ok(())
    }
}
