//! Character-level text similarity.
//!
//! Both texts are normalized by dropping whitespace and punctuation, then
//! scored as the length of their longest common subsequence divided by the
//! longer normalized length. The measure is symmetric, bounded to `[0, 1]`,
//! and counts Unicode scalar values so CJK text compares per character.

/// Full-width and typographic marks stripped in addition to ASCII punctuation.
const EXTRA_PUNCTUATION: &[char] = &[
    '，', '。', '；', '：', '！', '？', '、', '（', '）', '【', '】', '《', '》', '“', '”', '‘',
    '’', '…', '—', '·',
];

fn is_ignored(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation() || EXTRA_PUNCTUATION.contains(&c)
}

/// Strip whitespace and punctuation, keeping everything else in order.
pub fn normalize(text: &str) -> Vec<char> {
    text.chars().filter(|c| !is_ignored(*c)).collect()
}

/// Length of the longest common subsequence of two character slices.
pub fn lcs_len(a: &[char], b: &[char]) -> usize {
    // Keep the row as short as the shorter input.
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if inner.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; inner.len() + 1];
    let mut curr = vec![0usize; inner.len() + 1];

    for &x in outer {
        for (j, &y) in inner.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[inner.len()]
}

/// Similarity of two texts in `[0, 1]`.
///
/// When one side normalizes to nothing the score is 0. When both do, the
/// texts are only considered equal if their trimmed forms match exactly.
pub fn similarity(a: &str, b: &str) -> f64 {
    let left = normalize(a);
    let right = normalize(b);

    match (left.is_empty(), right.is_empty()) {
        (true, true) => {
            if a.trim() == b.trim() {
                1.0
            } else {
                0.0
            }
        }
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let longest = left.len().max(right.len());
            lcs_len(&left, &right) as f64 / longest as f64
        }
    }
}
