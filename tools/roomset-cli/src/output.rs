//! Output formatting for the CLI.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use roomset_commerce::pricing::SurchargeSource;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Create a spinner for indeterminate progress.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Completion bar such as `[#####-----] 50%`.
pub fn progress_bar(percent: u8) -> String {
    const WIDTH: usize = 20;
    let filled = (percent.min(100) as usize * WIDTH + 50) / 100;
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(WIDTH - filled));
    let styled = if percent >= 100 {
        style(bar).green().to_string()
    } else {
        style(bar).yellow().to_string()
    };
    format!("[{}] {}%", styled, percent)
}

/// Short label for where a surcharge came from.
pub fn source_badge(source: SurchargeSource) -> String {
    match source {
        SurchargeSource::ExactKey | SurchargeSource::DashPrefix | SurchargeSource::Substring => {
            style("listed").green().to_string()
        }
        SurchargeSource::KeywordPremium | SurchargeSource::PercentageFallback => {
            style("estimated").yellow().to_string()
        }
        SurchargeSource::ProFlat => style("pro").cyan().to_string(),
        SurchargeSource::BaseOption | SurchargeSource::Unmatched => {
            style("base").dim().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_fill() {
        console::set_colors_enabled(false);
        assert_eq!(progress_bar(50), format!("[{}{}] 50%", "#".repeat(10), "-".repeat(10)));
        assert_eq!(progress_bar(100), format!("[{}] 100%", "#".repeat(20)));
        assert_eq!(progress_bar(0), format!("[{}] 0%", "-".repeat(20)));
    }

    #[test]
    fn test_source_badge_groups_estimates() {
        console::set_colors_enabled(false);
        assert_eq!(source_badge(SurchargeSource::PercentageFallback), "estimated");
        assert_eq!(source_badge(SurchargeSource::KeywordPremium), "estimated");
        assert_eq!(source_badge(SurchargeSource::DashPrefix), "listed");
        assert_eq!(source_badge(SurchargeSource::ProFlat), "pro");
    }
}
