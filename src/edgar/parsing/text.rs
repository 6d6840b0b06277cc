use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static SCRIPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<script.*?</script>").unwrap());
static STYLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style.*?</style>").unwrap());
static BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</p>|</div>|</tr>|</li>").unwrap());
static CELL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</t[dh]>").unwrap());
// A tag opens with a letter and never spans lines, so "<5%" or "> 10%" in
// plain text is left alone.
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->|</?[a-zA-Z][^<>\n]*>").unwrap());
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());

/// Turns an extracted filing section into plain text lines.
///
/// The extractor is asked for text, but it still passes through entities
/// and, for some older filings, fragments of markup.
pub fn process_section_text(content: &str) -> String {
    let mut text = SCRIPT_RE.replace_all(content, "").into_owned();
    text = STYLE_RE.replace_all(&text, "").into_owned();

    // Table cells become spaced columns so "Total revenue | 48,210" stays on one line.
    text = CELL_RE.replace_all(&text, " ").into_owned();
    text = BREAK_RE.replace_all(&text, "\n").into_owned();
    text = TAG_RE.replace_all(&text, "").into_owned();

    // Decoded only after the markup is gone: "&lt;" is text, not a tag.
    text = decode_html_entities(&text).into_owned();

    text = text
        .lines()
        .map(|line| SPACE_RE.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    text.nfkc().collect::<String>()
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
