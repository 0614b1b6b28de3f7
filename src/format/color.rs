//! ANSI color escape sequences used by the template formatter

pub const BOLD: &str = "\x1b[1m";
pub const NORMAL: &str = "\x1b[0m";
pub const FAINT: &str = "\x1b[38;5;240m";
pub const RED: &str = "\x1b[31;1m";
pub const FAIL: &str = "\x1b[41;37;1m";
pub const GREEN: &str = "\x1b[38;5;66m";
pub const YELLOW: &str = "\x1b[38;5;220m";
pub const BLUE: &str = "\x1b[38;5;24m";
pub const PURPLE: &str = "\x1b[38;5;96m";
pub const RED_BG: &str = "\x1b[41;1m";

pub const RESET: &str = "\x1b[0m";
