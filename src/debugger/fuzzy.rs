//! Nearest-name suggestions under Levenshtein distance.

/// Suggestions further than this many edits away are not offered.
pub const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Case-insensitive Levenshtein distance over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().flat_map(char::to_lowercase).collect();
    let b: Vec<char> = b.chars().flat_map(char::to_lowercase).collect();
    bounded_distance(&a, &b, usize::MAX)
}

/// Levenshtein distance, stopping early once every cell in a row exceeds
/// `max_dist`. Returns `max_dist + 1` (saturating) in that case.
fn bounded_distance(a: &[char], b: &[char], max_dist: usize) -> usize {
    let n = b.len();
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for (i, &c) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];

        for j in 1..=n {
            let cost = usize::from(c != b[j - 1]);
            let deletion = prev[j] + 1;
            let insertion = curr[j - 1] + 1;
            let substitution = prev[j - 1] + cost;
            let d = deletion.min(insertion).min(substitution);
            curr[j] = d;
            row_min = row_min.min(d);
        }

        if row_min > max_dist {
            return max_dist.saturating_add(1);
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Returns the candidate closest to `target`, if it is within
/// [`MAX_SUGGESTION_DISTANCE`] edits. Ties go to the earliest candidate.
pub fn suggest<'a, I>(target: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let target: Vec<char> = target.chars().flat_map(char::to_lowercase).collect();
    let mut best: Option<(&'a str, usize)> = None;

    for candidate in candidates {
        let limit = best.map_or(MAX_SUGGESTION_DISTANCE, |(_, d)| d.saturating_sub(1));
        let chars: Vec<char> = candidate.chars().flat_map(char::to_lowercase).collect();
        if chars.len().abs_diff(target.len()) > limit {
            continue;
        }
        let distance = bounded_distance(&target, &chars, limit);
        if distance <= limit {
            best = Some((candidate, distance));
            if distance == 0 {
                break;
            }
        }
    }

    best.map(|(name, _)| name)
}
