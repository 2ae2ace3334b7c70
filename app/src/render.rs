//! Plain-text rendering of conversation turns.

use chrono::{Local, TimeZone};
use omnilingua_core::{Role, Turn};

/// `HH:MM` in local time, or `--:--` for an out-of-range timestamp.
pub fn format_time(timestamp_millis: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_millis)
        .single()
        .map_or_else(|| "--:--".to_string(), |t| t.format("%H:%M").to_string())
}

fn label(turn: &Turn) -> &'static str {
    match (turn.role(), turn.is_error()) {
        (Role::User, _) => "you",
        (Role::Model, false) => "omnilingua",
        (Role::Model, true) => "error",
    }
}

/// Render a turn as a header line followed by its text, indented.
pub fn format_turn(turn: &Turn) -> String {
    let mut out = format!("[{}] {}:", format_time(turn.timestamp()), label(turn));
    for line in turn.text().lines() {
        out.push_str("\n  ");
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_is_hours_and_minutes() {
        let formatted = format_time(0);
        assert_eq!(formatted.len(), 5);
        assert_eq!(&formatted[2..3], ":");
        assert_eq!(format_time(i64::MAX), "--:--");
    }

    #[test]
    fn test_turns_are_labelled_by_role_and_error() {
        assert!(format_turn(&Turn::user("hi")).contains("] you:"));
        assert!(format_turn(&Turn::model("hello")).contains("] omnilingua:"));
        assert!(format_turn(&Turn::error("oops")).contains("] error:"));
    }

    #[test]
    fn test_multiline_text_is_indented() {
        let rendered = format_turn(&Turn::model("line one\nline two"));
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "  line one");
        assert_eq!(lines[2], "  line two");
    }
}
