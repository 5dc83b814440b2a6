//! ANSI styles shared by the progress bar and the report
//!
//! cf. https://en.wikipedia.org/wiki/ANSI_escape_code

pub const SUCCESS: &str = "\u{1b}[32;1m"; // green
pub const MIXED: &str = "\u{1b}[33;1m"; // yellow
pub const SKIPPED: &str = "\u{1b}[36;0m"; // cyan
pub const FAILED: &str = "\u{1b}[31;1m"; // red
pub const RESET: &str = "\u{1b}[0m";
