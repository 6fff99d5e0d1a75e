use crate::facts::{Package, PackageStatus, Progress};
use core::sync::atomic::{AtomicU64, Ordering};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str = "{prefix:>12.bold.cyan} [{bar:25}] {pos}/{len} {msg}";
const TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{bar:25}] {pos}/{len} {msg}";

/// A batch progress bar on stderr.
///
/// Advances once per finished package and shows the latest package along with
/// how many packages ended partial or failed so far.
#[derive(Debug)]
pub struct ProgressReporter {
    bar: ProgressBar,
    partial: AtomicU64,
    failed: AtomicU64,
}

impl ProgressReporter {
    /// Create a reporter that draws to stderr when `visible`, and stays silent otherwise.
    #[must_use]
    pub fn new(visible: bool, use_colors: bool) -> Self {
        let bar = ProgressBar::hidden();
        if visible {
            bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        }

        let template = if use_colors { TEMPLATE } else { TEMPLATE_NO_COLOR };
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_prefix("Analyzing");

        Self {
            bar,
            partial: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    fn tally(&self) -> String {
        let partial = self.partial.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        match (partial, failed) {
            (0, 0) => String::new(),
            (p, 0) => format!(" ({p} partial)"),
            (0, f) => format!(" ({f} failed)"),
            (p, f) => format!(" ({p} partial, {f} failed)"),
        }
    }
}

impl Progress for ProgressReporter {
    fn start(&self, total: u64) {
        self.partial.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_message("");
    }

    fn package_done(&self, package: &Package) {
        match package.status {
            PackageStatus::Ok => {}
            PackageStatus::Partial => {
                let _ = self.partial.fetch_add(1, Ordering::Relaxed);
            }
            PackageStatus::Failed => {
                let _ = self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.bar.inc(1);
        self.bar.set_message(format!("{}{}", package.spec.name(), self.tally()));
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
