//! Sentence-aware splitting of a reply under a character bound.
//!
//! Segments are cut after a sentence boundary when one fits, otherwise after the last run of
//! whitespace, otherwise hard at the bound. Whitespace that follows a cut point stays on the
//! preceding segment, so `segments.concat() == text` always holds.

/// Splits `text` into segments of at most `limit` chars (Unicode scalar values).
///
/// Text that already fits is returned as a single segment; empty input yields `[""]`.
/// A `limit` of 0 is treated as 1.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= limit {
        return vec![text.to_string()];
    }

    let mut segments = Vec::new();
    let mut start = 0;
    while chars.len() - start > limit {
        let cut = find_cut(&chars, start, start + limit);
        segments.push(chars[start..cut].iter().collect());
        start = cut;
    }
    segments.push(chars[start..].iter().collect());
    segments
}

/// Picks the end of the next segment in `(start, max_end]`. Requires `max_end < chars.len()`.
fn find_cut(chars: &[char], start: usize, max_end: usize) -> usize {
    let mut sentence_cut = None;
    let mut space_cut = None;
    // A segment never consists of whitespace alone.
    let first_word = (start..max_end).find(|&i| !chars[i].is_whitespace());

    for p in (start + 1..=max_end).rev() {
        // A cut point is where a whitespace run ends.
        if !chars[p - 1].is_whitespace() || chars[p].is_whitespace() {
            continue;
        }
        if first_word.map_or(true, |w| p <= w) {
            break;
        }
        if space_cut.is_none() {
            space_cut = Some(p);
        }
        let mut q = p - 1;
        while q > start && chars[q].is_whitespace() {
            q -= 1;
        }
        if !chars[q].is_whitespace() && is_sentence_end(chars, q) {
            sentence_cut = Some(p);
            break;
        }
    }

    sentence_cut.or(space_cut).unwrap_or(max_end)
}

/// True when `chars[q]` terminates a sentence: `?`, or a `.` that is not part of an
/// abbreviation (`e.g.`, `Mr.`) or a single-letter initial (`J.`).
fn is_sentence_end(chars: &[char], q: usize) -> bool {
    match chars[q] {
        '?' => true,
        '.' => !is_abbreviation(chars, q),
        _ => false,
    }
}

fn is_abbreviation(chars: &[char], q: usize) -> bool {
    let at = |i: usize| -> Option<char> { q.checked_sub(i).map(|idx| chars[idx]) };
    let boundary_before = |i: usize| at(i).map_or(true, |c| !c.is_alphanumeric());

    let prev = match at(1) {
        Some(c) => c,
        None => return false,
    };

    // x.y.
    if prev.is_alphanumeric()
        && at(2) == Some('.')
        && at(3).is_some_and(|c| c.is_alphanumeric())
    {
        return true;
    }
    // Mr. / Dr.
    if prev.is_lowercase()
        && at(2).is_some_and(|c| c.is_uppercase())
        && boundary_before(3)
    {
        return true;
    }
    // J.
    prev.is_uppercase() && boundary_before(2)
}
