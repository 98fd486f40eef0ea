//! Name parsing and certificate identifier formatting.

/// Split pasted form text into trimmed, non-blank names.
pub fn parse_names(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// First whitespace-separated word, with its first character upper-cased and
/// the rest lower-cased. `"ada LOVELACE"` → `"Ada"`.
pub fn first_name(full_name: &str) -> String {
    let word = full_name.split_whitespace().next().unwrap_or_default();
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// `<prefix>-<year>-<index>` with the 1-based index zero-padded to four digits.
pub fn cert_id(prefix: &str, year: i32, index: usize) -> String {
    format!("{prefix}-{year}-{index:04}")
}

/// Make `s` safe to use as a single file name component.
///
/// Anything other than alphanumerics, `-` and `_` becomes `_`.
pub fn file_stem(s: &str) -> String {
    let stem: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "_".into()
    } else {
        stem
    }
}
