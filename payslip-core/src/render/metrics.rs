//! Approximate Helvetica advance widths.
//!
//! Used for right/centre alignment and word wrapping so every backend lays
//! text out identically without loading font files.

/// Points to millimetres.
pub const PT_TO_MM: f32 = 0.352_778;

/// Advance width of `c` in ems.
pub fn char_width_em(
    c: char,
    bold: bool,
) -> f32 {
    let regular = match c {
        'i' | 'j' | 'l' | '\'' | '|' => 0.222,
        ' ' | '.' | ',' | ':' | ';' | '!' | 'f' | 't' | 'I' | '/' | '\\' | '[' | ']' => 0.278,
        'r' | '(' | ')' | '-' => 0.333,
        '"' => 0.355,
        '*' => 0.389,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'J' => 0.5,
        '0'..='9' | '$' | '#' | '_' => 0.556,
        'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' | 'L' => 0.556,
        '+' | '=' | '<' | '>' | '~' => 0.584,
        'F' | 'T' | 'Z' => 0.611,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' | '&' => 0.667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 0.722,
        'G' | 'O' | 'Q' => 0.778,
        'M' | 'm' => 0.833,
        '%' => 0.889,
        'W' => 0.944,
        '@' => 1.015,
        _ => 0.556,
    };
    if bold { regular * 1.06 } else { regular }
}

/// Width of `text` in millimetres at `size_pt`.
pub fn text_width_mm(
    text: &str,
    size_pt: f32,
    bold: bool,
) -> f32 {
    let ems: f32 = text.chars().map(|c| char_width_em(c, bold)).sum();
    ems * size_pt * PT_TO_MM
}

/// Greedy word wrap to `max_width_mm`. Explicit newlines start new lines and
/// words wider than the limit are split between characters.
pub fn wrap_to_width(
    text: &str,
    max_width_mm: f32,
    size_pt: f32,
    bold: bool,
) -> Vec<String> {
    let width = |s: &str| text_width_mm(s, size_pt, bold);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if width(&candidate) <= max_width_mm {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for c in word.chars() {
                current.push(c);
                if width(&current) > max_width_mm && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
        lines.push(current);
    }

    lines
}
