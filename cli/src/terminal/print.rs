//! Line-level terminal output.
//!
//! Nothing here writes to stdout directly. Every line becomes a `tracing`
//! event on [`PRINT_TARGET`], which the formatter in `terminal::logging`
//! prints verbatim through the same writer the progress bars use.

use std::cell::Cell;
use std::fmt::Display;
use std::time::Duration;

use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::format::Detail;
use crate::terminal::{banner, colors};

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "netsweep::print";
pub const RAW_MSG_FIELD: &str = "raw_msg";

/// Keys in tree views are padded with dots to this width.
const TREE_KEY_WIDTH: usize = 8;

thread_local! {
    pub static GLOBAL_KEY_WIDTH: Cell<usize> = const { Cell::new(0) }
}

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

/// Values that fall back to the default text colour unless already painted.
pub trait Paint: Display {
    fn paint(self) -> ColoredString;
}

impl Paint for &str {
    fn paint(self) -> ColoredString {
        self.color(colors::TEXT_DEFAULT)
    }
}

impl Paint for String {
    fn paint(self) -> ColoredString {
        self.color(colors::TEXT_DEFAULT)
    }
}

impl Paint for ColoredString {
    fn paint(self) -> ColoredString {
        self
    }
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

fn rule(ch: &str, width: usize) -> String {
    ch.repeat(width)
}

/// Dot leader between a key and its colon.
fn leader(key: &str, width: usize) -> ColoredString {
    rule(".", width.saturating_sub(key.len())).color(colors::SEPARATOR)
}

pub fn banner(no_banner: bool, q_level: u8) {
    if no_banner || q_level > 0 {
        return;
    }

    let title: String = format!("⟦ NETSWEEP v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    let side: usize = TOTAL_WIDTH.saturating_sub(title.width()) / 2;
    let edge: ColoredString = rule("═", side).bright_black();

    print(&format!("{edge}{}{edge}", title.bright_green().bold()));
    banner::print();
}

/// Section title centred in a thin rule; suppressed by any `-q`.
pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let title: String = format!("⟦ {} ⟧", msg.to_uppercase());
    let fill: usize = TOTAL_WIDTH.saturating_sub(title.chars().count());
    let left: String = rule("─", fill / 2);
    let right: String = rule("─", fill - fill / 2);

    print(&format!(
        "{}{}{}",
        left.bright_black(),
        title.bright_green(),
        right.bright_black()
    ));
}

pub fn fat_separator() {
    print(&rule("═", TOTAL_WIDTH).bright_black().to_string());
}

/// `key.....: value`, keys padded to [`GLOBAL_KEY_WIDTH`].
pub fn aligned_line(key: &str, value: impl Paint) {
    let width: usize = GLOBAL_KEY_WIDTH.get() + 1;
    print_status(format!(
        "{}{}{} {}",
        key.color(colors::PRIMARY),
        leader(key, width),
        ":".color(colors::SEPARATOR),
        value.paint()
    ));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    print(&format!(
        "{} {}",
        ">".color(colors::SEPARATOR),
        msg.as_ref().color(colors::TEXT_DEFAULT)
    ));
}

/// `idx` is shown one-based, matching what `scan <index>` accepts.
pub fn tree_head(idx: usize, name: &str) {
    let number: ColoredString = (idx + 1).to_string().color(colors::ACCENT);
    print(&format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        number,
        "]".color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    ));
}

pub fn as_tree_one_level(details: Vec<Detail>) {
    let last: usize = details.len().saturating_sub(1);
    for (i, (key, value)) in details.into_iter().enumerate() {
        let branch: &str = if i == last { "└─" } else { "├─" };
        print(&format!(
            " {} {}{}{} {value}",
            branch.bright_black(),
            key.color(colors::TEXT_DEFAULT),
            leader(&key, TREE_KEY_WIDTH),
            ":".color(colors::SEPARATOR),
        ));
    }
}

pub fn centerln(msg: &str) {
    let pad: String = rule(
        " ",
        TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2,
    );
    print(&format!("{pad}{msg}"));
}

/// Closing line of a sweep: `<what> Complete: <n> <noun> <verb> in <secs>`.
///
/// Centred under a thick rule normally; a plain success line when quiet.
pub fn completion(
    what: &str,
    found: usize,
    noun: &str,
    verb: &str,
    elapsed: Duration,
    q_level: u8,
) {
    let count: ColoredString = format!("{found} {noun}").bold().green();
    let time: ColoredString = format!("{:.2}s", elapsed.as_secs_f64()).bold().yellow();
    let line: ColoredString =
        format!("{what} Complete: {count} {verb} in {time}").color(colors::TEXT_DEFAULT);

    match q_level {
        0 => {
            fat_separator();
            centerln(&line.to_string());
        }
        _ => {
            print("");
            netsweep_common::success!("{}", line);
        }
    }
}

const NO_RESULTS: &str = r#"
         _   _  ___    ____  _____ ____  _   _ _   _____ ____
        | \ | |/ _ \  |  _ \| ____/ ___|| | | | | |_   _/ ___|
        |  \| | | | | | |_) |  _| \___ \| | | | |   | | \___ \
        | |\  | |_| | |  _ <| |___ ___) | |_| | |___| |  ___) |
        |_| \_|\___/  |_| \_\_____|____/ \___/|_____|_| |____/
"#;

pub fn no_results() {
    print(&NO_RESULTS.red().bold().to_string());
}

pub fn end_of_program() {
    print(&rule("═", TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leader_fills_up_to_width() {
        let plain = |key: &str| {
            console::strip_ansi_codes(&leader(key, TREE_KEY_WIDTH).to_string()).into_owned()
        };
        assert_eq!(plain("MAC"), ".....");
        assert_eq!(plain("Hostname"), "");
        assert_eq!(plain("VeryLongKey"), "");
    }

    #[test]
    fn paint_keeps_existing_colour() {
        let red: ColoredString = "x".red();
        assert_eq!(red.clone().paint(), red);
    }
}
