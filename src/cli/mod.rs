//! Command implementations for the `intellitask` binary

pub mod folder;
pub mod list;
pub mod settings;
pub mod task;

use crate::oplog::OperationLog;

/// Print the operation log gathered during this command
pub fn print_log(log: &OperationLog) {
    if log.is_empty() {
        return;
    }
    println!();
    println!("Log:");
    for entry in log.entries() {
        println!("  {}", entry);
    }
}

/// Shorten to `max` characters, marking the cut with "..."
pub(crate) fn truncate(text: &str, max: usize) -> String {
    let first_line = text.lines().next().unwrap_or(text);
    if first_line.chars().count() > max {
        let cut: String = first_line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}

pub(crate) fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("Reunião com cliente às 10h", 10), "Reunião...");
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("line one\nline two", 20), "line one");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}
