//! Script-density check for generated summaries.
//!
//! The summarization model occasionally answers in the wrong language.
//! The pipeline accepts a summary only when a sufficient share of its
//! characters belongs to the target script (Han), so a low ratio means
//! "try again".

/// Ratio of Han characters among non-whitespace characters, in `0.0..=1.0`.
///
/// Empty (or all-whitespace) text has ratio 0.0.
pub fn han_ratio(text: &str) -> f64 {
    let mut total = 0usize;
    let mut han = 0usize;
    for c in text.chars() {
        if c.is_whitespace() {
            continue;
        }
        total += 1;
        if is_han(c) {
            han += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    han as f64 / total as f64
}

/// CJK Unified Ideographs, both main block and the common extensions.
fn is_han(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}'
    )
}
