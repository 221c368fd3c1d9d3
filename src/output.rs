//! CLI output formatting.
//!
//! Output is information-centric: the primary display for every page is its
//! route, with the artifact path as secondary context. Each command has a
//! pure `format_*` function (returns `Vec<String>`) for testability and a
//! `print_*` wrapper that writes to stdout.
//!
//! ```text
//! Pages
//! /                    → index.html (landing-page)
//! /blog/posts/a/       → blog/posts/a/index.html
//!
//! Generated 3 pages from 2 documents
//! ```

use crate::pipeline::BuildReport;
use std::path::Path;

/// Format the build report: one line per page, then a summary.
pub fn format_build_output(report: &BuildReport, output_dir: &Path) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for page in &report.pages {
        let file = page
            .file
            .strip_prefix(output_dir)
            .unwrap_or(&page.file)
            .to_string_lossy()
            .to_string();
        lines.push(page_line(&page.route, &file, &page.layout));
    }
    lines.push(String::new());
    lines.push(format!(
        "Generated {} page{} from {} document{}",
        report.pages.len(),
        plural(report.pages.len()),
        report.documents,
        plural(report.documents),
    ));
    lines
}

/// Format the check report: routes only, no artifacts.
pub fn format_check_output(report: &BuildReport) -> Vec<String> {
    let mut lines = vec!["Routes".to_string()];
    for page in &report.pages {
        lines.push(format!("{} ({})", page.route, page.layout));
    }
    lines.push(String::new());
    lines.push(format!(
        "{} document{}, {} page{} — content is valid",
        report.documents,
        plural(report.documents),
        report.pages.len(),
        plural(report.pages.len()),
    ));
    lines
}

pub fn print_build_output(report: &BuildReport, output_dir: &Path) {
    for line in format_build_output(report, output_dir) {
        println!("{line}");
    }
}

pub fn print_check_output(report: &BuildReport) {
    for line in format_check_output(report) {
        println!("{line}");
    }
}

/// Route, artifact path, and a layout marker for overridden pages only —
/// the default layout is noise on every line.
fn page_line(route: &str, file: &str, layout: &str) -> String {
    if layout == "index" {
        format!("{route:<20} → {file}")
    } else {
        format!("{route:<20} → {file} ({layout})")
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
