//! One-line rendering of conversation messages for streamed text output.

use leadgen::{Message, Role};

/// Max chars of tool output shown per line.
const TOOL_CONTENT_MAX: usize = 300;

/// Truncates `s` to at most `max` chars, ending in "..." when cut. UTF-8 safe.
pub fn truncate_display(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= SUFFIX.len() {
        return s.chars().take(max).collect();
    }
    let mut cut: String = s.chars().take(max - SUFFIX.len()).collect();
    cut.push_str(SUFFIX);
    cut
}

/// `[user] ...`, `[lead_finder] ...`, `[lead_finder -> LeadFinderTool] {...}`,
/// `[tool LeadFinderTool] ...`.
pub fn format_message(m: &Message) -> String {
    match m.role {
        Role::User => format!("[user] {}", m.content),
        Role::Assistant => {
            let who = m.name.as_deref().unwrap_or("assistant");
            if m.has_tool_calls() {
                let calls: Vec<String> = m
                    .tool_calls
                    .iter()
                    .map(|c| format!("[{} -> {}] {}", who, c.name, c.arguments))
                    .collect();
                let calls = calls.join("\n");
                if m.content.trim().is_empty() {
                    calls
                } else {
                    format!("[{}] {}\n{}", who, m.content, calls)
                }
            } else {
                format!("[{}] {}", who, m.content)
            }
        }
        Role::Tool => format!(
            "[tool {}] {}",
            m.name.as_deref().unwrap_or("?"),
            truncate_display(&m.content, TOOL_CONTENT_MAX)
        ),
    }
}
