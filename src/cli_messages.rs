//! CLI command messaging
//!
//! Tagged status lines for commands like login and logout. Card output is
//! printed untagged.

// ANSI Color Codes
const COLOR_INFO: &str = "\x1b[1;33m"; // Bold Yellow
const COLOR_WARN: &str = "\x1b[1;91m"; // Bold Bright Red
const COLOR_ERROR: &str = "\x1b[1;31m"; // Bold Red
const COLOR_SUCCESS: &str = "\x1b[1;32m"; // Bold Green
const COLOR_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Info,
    Warn,
    Error,
    Success,
}

impl Tone {
    fn tag(&self) -> &'static str {
        match self {
            Tone::Info => "[INFO]",
            Tone::Warn => "[WARN]",
            Tone::Error => "[ERROR]",
            Tone::Success => "[SUCCESS]",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            Tone::Info => COLOR_INFO,
            Tone::Warn => COLOR_WARN,
            Tone::Error => COLOR_ERROR,
            Tone::Success => COLOR_SUCCESS,
        }
    }
}

fn tagged_line(tone: Tone, title: &str, details: &str) -> String {
    let mut line = format!("{}{}{} {}", tone.color(), tone.tag(), COLOR_RESET, title);
    if !details.is_empty() {
        line.push_str("\t ");
        line.push_str(details);
    }
    line
}

pub fn print_info(title: &str, details: &str) {
    println!("{}", tagged_line(Tone::Info, title, details));
}

pub fn print_warn(title: &str, details: &str) {
    println!("{}", tagged_line(Tone::Warn, title, details));
}

/// Errors go to stdout with the other status lines; the raw error is logged.
pub fn print_error(title: &str, details: Option<&str>) {
    println!("{}", tagged_line(Tone::Error, title, ""));
    if let Some(details) = details {
        println!("{}", tagged_line(Tone::Error, "Details:", details));
    }
}

pub fn print_success(title: &str, details: &str) {
    println!("{}", tagged_line(Tone::Success, title, details));
}

#[macro_export]
macro_rules! print_cmd_info {
    ($title:expr, $($details:tt)*) => {
        $crate::cli_messages::print_info($title, &format!($($details)*))
    };
}

#[macro_export]
macro_rules! print_cmd_warn {
    ($title:expr, $($details:tt)*) => {
        $crate::cli_messages::print_warn($title, &format!($($details)*))
    };
}

#[macro_export]
macro_rules! print_cmd_error {
    ($title:expr) => {
        $crate::cli_messages::print_error($title, None)
    };
    ($title:expr, $details:expr) => {
        $crate::cli_messages::print_error($title, Some($details))
    };
}

#[macro_export]
macro_rules! print_cmd_success {
    ($title:expr, $($details:tt)*) => {
        $crate::cli_messages::print_success($title, &format!($($details)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_line_appends_details() {
        let line = tagged_line(Tone::Success, "Logged in", "as ada@example.com");
        assert_eq!(
            line,
            "\x1b[1;32m[SUCCESS]\x1b[0m Logged in\t as ada@example.com"
        );
    }

    #[test]
    fn test_tagged_line_without_details() {
        assert_eq!(
            tagged_line(Tone::Info, "Logging out", ""),
            "\x1b[1;33m[INFO]\x1b[0m Logging out"
        );
    }
}
