//! Formatting of received stream lines for terminal display.

use chrono::DateTime;

const MESSAGE_PREFIX: &str = "message : ";
const SENT_AT_SEPARATOR: &str = " , Sent at ";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one line received from the room stream
    ///
    /// # Returns
    ///
    /// `None` for the `#` preamble and blank lines, which are not shown.
    pub fn format_line(line: &str) -> Option<String> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        if let Some(formatted) = Self::format_chat_message(line) {
            return Some(formatted);
        }
        if let Some(nickname) = line.strip_suffix(" has joined") {
            return Some(format!("\n+ {} joined\n", nickname));
        }
        if let Some(nickname) = line.strip_suffix(" has left") {
            return Some(format!("\n- {} left\n", nickname));
        }

        Some(format!("\n{}\n", line))
    }

    /// Format `message : <nick> : <body> , Sent at <time>` as
    /// `[HH:MM:SS] nick: body`
    fn format_chat_message(line: &str) -> Option<String> {
        let rest = line.strip_prefix(MESSAGE_PREFIX)?;
        let (author, rest) = rest.split_once(" : ")?;
        let (body, sent_at) = rest.rsplit_once(SENT_AT_SEPARATOR)?;

        let time = match DateTime::parse_from_rfc3339(sent_at) {
            Ok(dt) => dt.format("%H:%M:%S").to_string(),
            Err(_) => sent_at.to_string(),
        };
        Some(format!("\n[{}] {}: {}\n", time, author, body))
    }
}
