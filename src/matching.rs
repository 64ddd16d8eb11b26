//! Fuzzy answer validation.
//!
//! A typed answer is accepted when any accepted literal passes any of
//! five checks: exact match after normalization, a known alias pair,
//! two-word reorder, transliteration of diacritics, or Levenshtein
//! distance within a length-scaled tolerance.

use crate::normalize::normalize;

/// Equivalence classes of known alternate place-name spellings
/// (historical names, competing transliteration schemes).
const ALIAS_CLASSES: &[&[&str]] = &[
    &["kyiv", "kiev"],
    &["beijing", "peking"],
    &["mumbai", "bombay"],
    &["kolkata", "calcutta"],
    &["chennai", "madras"],
    &["myanmar", "burma"],
    &["eswatini", "swaziland"],
    &["czechia", "czech republic"],
    &["timor leste", "east timor"],
    &["cabo verde", "cape verde"],
];

/// Diacritic characters with their plausible ASCII renderings.
const TRANSLITERATIONS: &[(char, &[&str])] = &[
    ('ü', &["ue", "u"]),
    ('ö', &["oe", "o"]),
    ('ä', &["ae", "a"]),
    ('ø', &["o", "oe"]),
    ('å', &["a", "aa"]),
    ('æ', &["ae", "a"]),
    ('ß', &["ss", "s"]),
    ('ñ', &["n", "ny"]),
    ('ç', &["c", "s"]),
    ('ð', &["d", "th"]),
    ('þ', &["th"]),
    ('ł', &["l"]),
    ('ń', &["n"]),
    ('ś', &["s"]),
    ('ź', &["z"]),
    ('ż', &["z"]),
];

/// Check a typed answer against every accepted literal.
///
/// Pure and total; an empty accepted list never matches.
pub fn matches_any<S: AsRef<str>>(user_input: &str, accepted: &[S]) -> bool {
    let user = normalize(user_input);

    accepted.iter().any(|answer| {
        let answer = answer.as_ref();
        let correct = normalize(answer);

        user == correct
            || is_alias_match(&user, &correct)
            || is_reordered_compound(&user, &correct)
            || matches_transliterated(&user, answer)
            || within_edit_tolerance(&user, &correct)
    })
}

/// Both normalized forms belong to the same alias equivalence class.
fn is_alias_match(a: &str, b: &str) -> bool {
    ALIAS_CLASSES
        .iter()
        .any(|class| class.contains(&a) && class.contains(&b))
}

/// Two-word names match with the words swapped. Applies only when both
/// sides are exactly two tokens.
fn is_reordered_compound(a: &str, b: &str) -> bool {
    let a_words: Vec<&str> = a.split_whitespace().collect();
    let b_words: Vec<&str> = b.split_whitespace().collect();

    if a_words.len() != 2 || b_words.len() != 2 {
        return false;
    }

    (a_words[0] == b_words[0] && a_words[1] == b_words[1])
        || (a_words[0] == b_words[1] && a_words[1] == b_words[0])
}

/// Rewrite each diacritic in the accepted answer to its ASCII renderings
/// and compare every candidate form to the user input.
fn matches_transliterated(user: &str, answer: &str) -> bool {
    let lowered = answer.to_lowercase();

    TRANSLITERATIONS.iter().any(|(ch, replacements)| {
        lowered.contains(*ch)
            && replacements
                .iter()
                .any(|r| normalize(&lowered.replace(*ch, r)) == user)
    })
}

/// Levenshtein distance within the adaptive tolerance for the longer
/// operand.
fn within_edit_tolerance(a: &str, b: &str) -> bool {
    let longest = a.chars().count().max(b.chars().count());
    levenshtein_distance(a, b) <= edit_tolerance(longest)
}

/// Typo tolerance scales with word length; short names must be exact.
fn edit_tolerance(len: usize) -> usize {
    match len {
        0..=4 => 0,
        5..=7 => 1,
        8..=11 => 2,
        _ => 3,
    }
}

/// Levenshtein distance with unit insert/delete/substitute costs.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows instead of the full matrix
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };

            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
