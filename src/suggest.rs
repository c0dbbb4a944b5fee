//! "Did you mean?" suggestions for rejected tokens.
//!
//! Candidates are ranked by Levenshtein edit distance to the rejected value.
//! Comparison is literal: no case folding or transliteration.

/// Number of suggestions attached to a rejection unless configured otherwise.
pub const DEFAULT_SUGGESTIONS: usize = 3;

/// Levenshtein edit distance: the minimum number of single-character
/// insertions, deletions or substitutions turning `a` into `b`.
///
/// ```
/// use tw_truth::suggest::edit_distance;
/// assert_eq!(edit_distance("kitten", "sitting"), 3);
/// assert_eq!(edit_distance("blue-50", "blue-500"), 1);
/// ```
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rows of the (a.len() + 1) x (b.len() + 1) grid.
    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row: Vec<usize> = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b.iter().enumerate() {
            let cost = usize::from(a_char != b_char);

            curr_row[j + 1] = (prev_row[j + 1] + 1) // deletion
                .min(curr_row[j] + 1) // insertion
                .min(prev_row[j] + cost); // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}

/// Returns up to `limit` candidates closest to `target`, nearest first.
/// Candidates at the same distance keep their order in `pool`.
pub fn suggest<'a>(
    target: &str,
    pool: impl IntoIterator<Item = &'a str>,
    limit: usize,
) -> Vec<&'a str> {
    let mut ranked: Vec<(usize, &'a str)> = pool
        .into_iter()
        .map(|candidate| (edit_distance(target, candidate), candidate))
        .collect();
    // `sort_by_key` is stable, which is what keeps ties in pool order.
    ranked.sort_by_key(|(distance, _)| *distance);
    ranked
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate)
        .collect()
}
