//! Spinner shown while the council is waiting on its own schedule
//! (a handoff delay, a floor countdown, or an agent composing a reply).

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct WaitIndicator {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl WaitIndicator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// Replace any running spinner with one showing `message`.
    pub fn start(&mut self, message: impl Into<String>) {
        self.clear();
        if !self.enabled {
            return;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::style());
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    pub fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    /// Print a line without tearing the spinner.
    pub fn println(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }

    pub fn is_active(&self) -> bool {
        self.bar.is_some()
    }
}

impl Drop for WaitIndicator {
    fn drop(&mut self) {
        self.clear();
    }
}
