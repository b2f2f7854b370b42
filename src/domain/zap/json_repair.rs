//! Lenient fallback for zap request descriptions.
//!
//! Some wallet providers embed the zap request with raw control characters
//! inside JSON strings, which strict parsers reject. The repair pass escapes
//! those characters as `\uXXXX` and nothing else. It runs at most once, and
//! only after a strict parse has failed.

/// Returns true for C0 controls, DEL, and C1 controls (U+0000–U+001F, U+007F–U+009F).
pub fn is_repairable_control(c: char) -> bool {
    let code = c as u32;
    code <= 0x1F || (0x7F..=0x9F).contains(&code)
}

/// Escapes raw control characters that appear inside JSON string literals.
///
/// Characters outside string literals are left untouched, so structural
/// whitespace (newlines between tokens) keeps its meaning. Returns `None`
/// when there was nothing to escape.
pub fn escape_control_chars(input: &str) -> Option<String> {
    let mut out = String::with_capacity(input.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    let mut changed = false;

    for c in input.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }

        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            c if is_repairable_control(c) => {
                out.push_str(&format!("\\u{:04x}", c as u32));
                changed = true;
            }
            c => out.push(c),
        }
    }

    changed.then_some(out)
}

/// Extracts up to `radius` characters either side of a parse error position.
///
/// `line` and `column` are 1-based as reported by `serde_json::Error`.
/// Control characters are rendered escaped so the window is log-safe.
pub fn context_window(input: &str, line: usize, column: usize, radius: usize) -> String {
    let line_text = input.split('\n').nth(line.saturating_sub(1)).unwrap_or("");
    let chars: Vec<char> = line_text.chars().collect();
    let center = column.saturating_sub(1).min(chars.len());
    let start = center.saturating_sub(radius);
    let end = (center + radius).min(chars.len());

    chars[start..end]
        .iter()
        .collect::<String>()
        .escape_debug()
        .to_string()
}
