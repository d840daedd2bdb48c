//! Box-drawn error body shared by the build script

/// Inner width of the error box, in characters
pub const BOX_WIDTH: usize = 64;

/// Shorten a line to the box width, counting characters rather than bytes
pub fn truncate_line(line: &str) -> String {
    if line.chars().count() > BOX_WIDTH {
        let head: String = line.chars().take(BOX_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}

/// Format error message lines with box drawing
pub fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| format!("║  {:<64} ║", truncate_line(line)))
        .collect::<Vec<_>>()
        .join("\n")
}
