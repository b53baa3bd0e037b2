use crate::normalize::normalize;

/// Characters removed from the first-name part of an author entry (or from
/// the whole entry when there is no comma). The space is part of the set:
/// "Jan. P." collapses to "JanP".
const STRIP: [char; 5] = ['.', ';', ' ', ',', '_'];

/// Canonicalize one raw author entry into "Last First" form.
///
/// "Last, First[, Middle...]" keeps part 0 as the last name and part 1,
/// with the `STRIP` characters removed, as the first name; any further
/// comma parts are dropped. An entry without a comma just has the `STRIP`
/// characters removed. The result is trimmed and ASCII-folded.
pub fn clean_author(raw: &str) -> String {
    let parts: Vec<&str> = raw.trim().split(',').collect();
    let cleaned = if parts.len() >= 2 {
        let first: String = parts[1].chars().filter(|c| !STRIP.contains(c)).collect();
        format!("{} {}", parts[0], first)
    } else {
        raw.chars().filter(|c| !STRIP.contains(c)).collect()
    };
    normalize(cleaned.trim())
}

/// Display citation for a record: first canonical author plus the year,
/// taken as everything before the first `-` of the date.
///
/// Returns `None` when the author list is empty.
pub fn format_author_short(authors: &[String], date: &str) -> Option<String> {
    let first = authors.first()?;
    let year = date.split('-').next().unwrap_or(date);
    Some(format!("{} ({})", first, year))
}

/// Initials-based short name for a single whitespace-separated name.
///
/// The last token, title-cased, is the surname. When the last token starts
/// with "jr"/"sr" (case-insensitive) the token before it becomes the
/// surname instead (kept as written, not title-cased) and both trailing
/// tokens are left out of the initials scan. Each remaining token is
/// stripped of `.` `,` `;` at both ends; the first token, single-character
/// tokens and capitalized tokens contribute their upper-cased first letter
/// to the initials, while lowercase multi-letter tokens are folded into the
/// front of the surname ("van", "de", ...). Note the surname token chosen
/// by the jr/sr branch is never sanity-checked; "Sreeja" as a last token
/// trips it too.
pub fn author_short(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    let Some(&last) = tokens.last() else {
        return String::new();
    };

    let mut excluded = 1;
    let mut last_name = title_case(last);
    let head: String = last_name.chars().take(2).flat_map(|c| c.to_lowercase()).collect();
    if (head == "jr" || head == "sr") && tokens.len() >= 2 {
        last_name = tokens[tokens.len() - 2].to_string();
        excluded = 2;
    }

    let mut initials = String::new();
    for (i, tok) in tokens.iter().take(tokens.len() - excluded).enumerate() {
        let tok = tok.trim_matches(|c: char| matches!(c, '.' | ',' | ';'));
        let Some(first) = tok.chars().next() else {
            continue;
        };
        if i == 0 || tok.chars().count() == 1 || first.is_uppercase() {
            initials.extend(first.to_uppercase());
        } else {
            last_name = format!("{} {}", tok, last_name);
        }
    }

    format!("{} {}", last_name, initials)
}

/// Python-style `str.title()`: upper-case the first letter of every
/// alphabetic run, lower-case the rest.
fn title_case(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut in_word = false;
    for c in token.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
