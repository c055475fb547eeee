//! Human-readable output of a conversion

use console::style;
use kustomization_helm_core::ConversionReport;
use std::path::Path;

/// Print written and pruned files relative to the working directory
pub fn print_report(report: &ConversionReport, dir: &Path) {
    for path in &report.pruned {
        println!("{} {}", style("pruned").yellow(), relative(path, dir).display());
    }
    for path in &report.written {
        println!("{} {}", style("wrote").green(), relative(path, dir).display());
    }
    println!(
        "{} {}",
        style("wrote").green(),
        relative(&report.kustomization, dir).display()
    );
}

fn relative<'a>(path: &'a Path, dir: &Path) -> &'a Path {
    path.strip_prefix(dir).unwrap_or(path)
}
