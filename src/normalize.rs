use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold text to its closest plain-ASCII form.
///
/// Decomposes with NFKD and drops the combining marks, which takes care of
/// the usual accented Latin letters ("Müller" -> "Muller"). A handful of
/// letters do not decompose and get an explicit replacement instead.
/// Anything else passes through untouched, so the function is total and
/// idempotent on ASCII input.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfkd() {
        if is_combining_mark(c) {
            continue;
        }
        match c {
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("AE"),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("OE"),
            'ø' => out.push('o'),
            'Ø' => out.push('O'),
            'đ' => out.push('d'),
            'Đ' => out.push('D'),
            'ð' => out.push('d'),
            'Ð' => out.push('D'),
            'þ' => out.push_str("th"),
            'Þ' => out.push_str("Th"),
            'ł' => out.push('l'),
            'Ł' => out.push('L'),
            _ => out.push(c),
        }
    }
    out
}
