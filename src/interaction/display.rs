//! Progress and message display implementation

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Handle to a running spinner
pub trait SpinnerHandle: Send {
    fn update_message(&mut self, message: &str);
    fn success(&mut self, message: &str);
    fn fail(&mut self, message: &str);
}

/// Trait for displaying progress and messages
pub trait ProgressDisplay: Send + Sync {
    /// Display information message
    fn info(&self, message: &str);

    /// Display warning message
    fn warning(&self, message: &str);

    /// Display error message
    fn error(&self, message: &str);

    /// Display progress message
    fn progress(&self, message: &str);

    /// Display success message
    fn success(&self, message: &str);

    /// Start a spinner
    fn start_spinner(&self, message: &str) -> Box<dyn SpinnerHandle>;
}

/// Terminal display with emoji prefixes and an indicatif spinner
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDisplay;

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressDisplay for ConsoleDisplay {
    fn info(&self, message: &str) {
        println!("ℹ️  {message}");
    }

    fn warning(&self, message: &str) {
        eprintln!("⚠️  {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("❌ {message}");
    }

    fn progress(&self, message: &str) {
        println!("🔄 {message}");
    }

    fn success(&self, message: &str) {
        println!("✅ {message}");
    }

    fn start_spinner(&self, message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(TerminalSpinner::new(message))
    }
}

struct TerminalSpinner {
    bar: ProgressBar,
}

impl TerminalSpinner {
    fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }
}

impl SpinnerHandle for TerminalSpinner {
    fn update_message(&mut self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn success(&mut self, message: &str) {
        self.bar.finish_with_message(format!("✓ {message}"));
    }

    fn fail(&mut self, message: &str) {
        self.bar.finish_with_message(format!("✗ {message}"));
    }
}

impl Drop for TerminalSpinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

/// Discards everything; tracing output remains the only record
#[derive(Debug, Default, Clone, Copy)]
pub struct QuietDisplay;

impl ProgressDisplay for QuietDisplay {
    fn info(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn progress(&self, _message: &str) {}
    fn success(&self, _message: &str) {}

    fn start_spinner(&self, _message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(NoopSpinner)
    }
}

struct NoopSpinner;

impl SpinnerHandle for NoopSpinner {
    fn update_message(&mut self, _message: &str) {}
    fn success(&mut self, _message: &str) {}
    fn fail(&mut self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingDisplay;

    #[test]
    fn test_recording_display_captures_spinner_lifecycle() {
        let display = RecordingDisplay::new();
        display.info("Checking Monday lunch");
        let mut spinner = display.start_spinner("Placing order");
        spinner.update_message("Verifying");
        spinner.success("Ordered");

        assert_eq!(
            display.messages(),
            vec![
                "INFO: Checking Monday lunch",
                "SPINNER: Placing order",
                "SPINNER_UPDATE: Verifying",
                "SPINNER_SUCCESS: Ordered",
            ]
        );
    }

    #[test]
    fn test_quiet_display_is_silent() {
        let display = QuietDisplay;
        display.error("nothing to see");
        let mut spinner = display.start_spinner("working");
        spinner.fail("done");
    }
}
