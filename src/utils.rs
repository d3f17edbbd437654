// Utility functions

/// Replaces non-breaking spaces, squeezes whitespace runs into one space and trims.
pub fn collapse_whitespace(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title-cases text: the first letter of every alphabetic run is upper-cased,
/// the rest of the run lower-cased. `"o'neil works"` becomes `"O'Neil Works"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
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
