/// Normalizes the first line of an error message into a clustering
/// signature: strip digit runs to `N`, quoted strings to `STR`, and
/// truncate to 100 chars. Shared by the History Recorder (pattern
/// upsert) and the Flakiness Analyzer (pattern clustering) so both
/// components cluster failures identically.
pub fn normalize_failure_signature(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("").trim();
    let mut normalized = String::with_capacity(first_line.len());
    let mut chars = first_line.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '"' || ch == '\'' {
            let quote = ch;
            normalized.push_str("STR");
            while let Some(&next) = chars.peek() {
                chars.next();
                if next == quote {
                    break;
                }
            }
            continue;
        }
        if ch.is_ascii_digit() {
            normalized.push('N');
            while matches!(chars.peek(), Some(next) if next.is_ascii_digit()) {
                chars.next();
            }
            continue;
        }
        normalized.push(ch);
    }
    normalized.chars().take(100).collect()
}
