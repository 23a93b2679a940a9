// Suffix-stripping stemmer for keyword normalization.
//
// Keywords are lowercased and stripped of common English inflectional and
// derivational suffixes. Rules are applied repeatedly until none matches, so
// stemming a stem returns it unchanged. Words containing non-ASCII letters
// (Chinese keywords, accented forms) are only lowercased.

/// Suffix rewrite rules, longest suffixes first. Every replacement is shorter
/// than the suffix it replaces, so repeated application always terminates.
const RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("ization", "ize"),
    ("fulness", "ful"),
    ("iveness", "ive"),
    ("ousness", "ous"),
    ("biliti", "ble"),
    ("tional", "tion"),
    ("alism", "al"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("ments", "ment"),
    ("ingly", "ing"),
    ("edly", "ed"),
    ("sses", "ss"),
    ("ings", "ing"),
    ("ies", "y"),
    ("ing", ""),
    ("ed", ""),
    ("s", ""),
];

/// Shortest stem a rule may leave behind.
const MIN_STEM_CHARS: usize = 2;

/// Reduce a word to its stem. The empty string stems to itself.
pub fn stem(word: &str) -> String {
    let mut current = word.to_lowercase();
    while let Some(shorter) = strip_once(&current) {
        current = shorter;
    }
    current
}

fn strip_once(word: &str) -> Option<String> {
    if word.is_empty() || !word.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }

    for (suffix, replacement) in RULES {
        let Some(base) = word.strip_suffix(suffix) else {
            continue;
        };
        if base.len() < MIN_STEM_CHARS || !base.bytes().any(is_vowel) {
            continue;
        }
        // A bare "s" is only an inflection when it isn't part of "ss", "us", or "is".
        if *suffix == "s" && matches!(base.as_bytes().last(), Some(b's' | b'u' | b'i')) {
            continue;
        }
        return Some(format!("{base}{replacement}"));
    }
    None
}

fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u' | b'y')
}
