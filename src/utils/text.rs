use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_TRUNCATE_LENGTH: usize = 65;

// Applied in order; later rules rely on earlier ones having run.
const MARKDOWN_RULES: &[(&str, &str)] = &[
    (r"<[^>]*>", ""),                        // html tags
    (r"#{1,6}\s", ""),                       // headers
    (r"[*_]{1,3}(.*?)[*_]{1,3}", "$1"),      // bold / italic
    (r"\[([^\]]+)\]\([^)]*\)", "$1"),        // links
    (r"!\[([^\]]+)\]\([^)]*\)", "$1"),       // images
    (r"(?m)^\s*>\s", ""),                    // blockquotes
    (r"```[\s\S]*?```", ""),                 // fenced code
    (r"`([^`]+)`", "$1"),                    // inline code
    (r"(?m)^\s*[-*_]{3,}\s*$", ""),          // horizontal rules
    (r"(?m)^[\s*-]+(.*)", "$1"),             // list markers
    (r"\n\s*\n", "\n"),
    (r"\s+", " "),
];

fn markdown_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        MARKDOWN_RULES
            .iter()
            .filter_map(|(pattern, replacement)| {
                Regex::new(pattern).ok().map(|re| (re, *replacement))
            })
            .collect()
    })
}

/// Reduces markdown (and stray html tags) to a single line of plain text for card previews.
pub fn strip_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped = markdown_rules()
        .iter()
        .fold(text.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        });
    stripped.trim().to_string()
}

/// Cuts `text` to `max_length` characters, trims the cut and appends `...`.
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max_length).collect();
    format!("{}...", prefix.trim())
}
