//! Progress bar utilities using indicatif for terminal output.
//!
//! Bars draw to stderr so they never interleave with command output on
//! stdout.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const PROGRESS_TEMPLATE: &str = "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}";
const PROGRESS_CHARS: &str = "█▓▒░ ";

/// Create a standard progress bar over `total` frames.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
    // the template is a constant; fall back to the default style if it is ever rejected
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(PROGRESS_CHARS);
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// A bar that never draws, used in JSON mode.
pub fn hidden_progress_bar() -> ProgressBar {
    ProgressBar::hidden()
}

/// Extension trait for progress bars.
pub trait ProgressBarExt {
    /// Finish with a success message.
    fn finish_success(&self, message: &str);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: &str) {
        if self.is_hidden() {
            self.finish();
        } else {
            self.finish_with_message(format!("✓ {message}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bars() {
        let pb = create_progress_bar(10);
        assert_eq!(pb.length(), Some(10));
        pb.inc(3);
        assert_eq!(pb.position(), 3);
        pb.finish_success("done");
        assert!(pb.is_finished());

        let hidden = hidden_progress_bar();
        hidden.finish_success("done");
        assert!(hidden.is_hidden());
    }
}
