//! Progress bars and summaries for the `build` and `warm` commands.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cache::InstallReport;
use crate::currency::Currency;
use crate::export::ExportReport;
use crate::progress::{ExportProgress, InstallProgress};
use crate::{format_bytes, format_elapsed};

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// A counting bar that reports both install and export events.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("progress template is valid")
                .progress_chars("━━╌"),
        );
        bar.set_prefix(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl InstallProgress for BarProgress {
    fn on_install_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_cached(&self, path: &str, _bytes: u64) {
        self.bar.set_message(path.to_string());
        self.bar.inc(1);
    }

    fn on_failed(&self, path: &str, error: &str) {
        self.bar.println(format!("  failed {path}: {error}"));
        self.bar.inc(1);
    }
}

impl ExportProgress for BarProgress {
    fn on_export_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_file_written(&self, path: &Path, _bytes: u64) {
        self.bar.set_message(path.display().to_string());
        self.bar.inc(1);
    }
}

pub fn print_export_summary(out: &Path, report: &ExportReport, elapsed: Duration) {
    println!("\n{SEPARATOR}");
    println!("Build Summary");
    println!("{SEPARATOR}");
    println!("  Output:            {}", out.display());
    println!("  Files written:     {}", report.files.len());
    println!("  Total size:        {}", format_bytes(report.bytes));
    println!("  Total time:        {}", format_elapsed(elapsed));
    println!("{SEPARATOR}");
}

pub fn print_install_summary(
    origin: &str,
    report: &InstallReport,
    partitions: &[(String, usize)],
    elapsed: Duration,
) {
    println!("\n{SEPARATOR}");
    println!("Cache Warm Summary ({origin})");
    println!("{SEPARATOR}");
    println!("  Cached:            {}", report.cached.len());
    println!("  Total size:        {}", format_bytes(report.bytes));
    println!("  Total time:        {}", format_elapsed(elapsed));
    if !report.failed.is_empty() {
        println!("  Failed:            {}", report.failed.len());
        for (path, reason) in &report.failed {
            println!("    {path}: {reason}");
        }
    }
    for (name, len) in partitions {
        println!("  {name:<18} {len} entries");
    }
    println!("{SEPARATOR}");
}

pub fn print_currency_table(currencies: &[Currency], preferred: Option<&str>) {
    println!("{SEPARATOR}");
    println!("   {:<28} {:>8}  $15.00 as", "Currency", "Rate");
    for currency in currencies {
        let marker = if preferred == Some(currency.code) { "*" } else { " " };
        println!(
            " {marker} {:<28} {:>8}  {}",
            currency.display_name(),
            currency.rate,
            currency.format(currency.convert(15.0))
        );
    }
    println!("{SEPARATOR}");
}
