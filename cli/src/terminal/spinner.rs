use std::sync::Arc;

use colored::*;
use indicatif::ProgressStyle;
use netsweep_core::{Progress, ProgressCallback};
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

const TEMPLATE: &str = "{spinner:.blue} [{elapsed}] {bar:30.cyan/blue} {pos:>5}/{len:5} {msg}";
const TIP: &str = "press 'q' to finish early";

pub fn sweep_style() -> ProgressStyle {
    ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(TICK_STRINGS)
        .progress_chars("■■□")
}

/// Turns `span` into a progress bar over `total` candidates and returns the
/// callback that keeps it current.
pub fn attach(span: &Span, total: usize, noun: &'static str) -> ProgressCallback {
    span.pb_set_style(&sweep_style());
    span.pb_set_length(total as u64);
    span.pb_set_message(&format!("{}", TIP.italic().color(colors::TEXT_DEFAULT)));

    let span: Span = span.clone();
    Arc::new(move |progress: Progress| {
        span.pb_set_position(progress.completed as u64);
        if progress.found > 0 {
            span.pb_set_message(&format!(
                "{} so far...",
                format!("{} {}", progress.found, noun).green().bold()
            ));
        }
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
