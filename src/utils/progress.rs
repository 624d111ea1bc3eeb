//! indicatif spinners for pipeline stages and the chart progress bar

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner for a stage of unknown length
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("    {spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Run `work` behind a spinner.
///
/// On success the spinner line is replaced by `done(&value)`. On failure the
/// spinner is abandoned with a cross so the error printed after it is not
/// overwritten by a still-ticking line.
pub fn with_spinner<T>(
    message: &str,
    work: impl FnOnce() -> Result<T>,
    done: impl FnOnce(&T) -> String,
) -> Result<T> {
    let spinner = create_spinner(message);
    match work() {
        Ok(value) => {
            spinner.finish_with_message(format!("✅ {}", done(&value)));
            Ok(value)
        }
        Err(err) => {
            spinner.abandon_with_message(format!("❌ {}", message.trim_end_matches("...")));
            Err(err)
        }
    }
}

/// Progress bar over chart files; the message names the file being drawn
pub fn create_chart_progress(charts: usize) -> ProgressBar {
    let pb = ProgressBar::new(charts as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("    [{bar:30.cyan/blue}] {pos}/{len} charts {wide_msg}")
            .unwrap()
            .progress_chars("█▓▒░"),
    );
    pb
}

/// Close the chart bar; a warning mark when per-class charts were skipped
pub fn finish_chart_progress(pb: &ProgressBar, rendered: usize, class_charts_skipped: bool) {
    let mark = if class_charts_skipped { "⚠️ " } else { "✅" };
    pb.finish_with_message(format!("{} Rendered {} chart(s)", mark, rendered));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_spinner_passes_value_and_error_through() {
        let value = with_spinner("Counting...", || Ok(3usize), |n| format!("{} rows", n)).unwrap();
        assert_eq!(value, 3);

        let err = with_spinner::<usize>("Failing...", || anyhow::bail!("boom"), |_| String::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
