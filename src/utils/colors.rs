/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";

/// Green when everyone is in, yellow when some are, red when none are.
pub fn color_for_ratio(done: usize, total: usize) -> &'static str {
    if total > 0 && done == total {
        GREEN
    } else if done > 0 {
        YELLOW
    } else {
        RED
    }
}
