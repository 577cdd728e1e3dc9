//! Number and label formatters for CLI output.

/// Fixed three-decimal rendering used for metrics.
pub fn metric(value: f64) -> String {
    format!("{value:.3}")
}

/// Milliseconds with no fractional part when whole.
pub fn millis(ms: f64) -> String {
    if ms.fract() == 0.0 {
        format!("{ms:.0}ms")
    } else {
        format!("{ms:.1}ms")
    }
}

/// Format a count with label: "1 peak", "3 peaks".
pub fn count_label(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}
