//! Fuzzy subsequence matcher.
//!
//! Ranks names the way interactive finders do: a match must contain every
//! pattern character in order, ignoring case. Matches at the start of the
//! name, after a separator, on a camelCase hump, or right after the previous
//! matched character score higher. Unmatched characters cost a point each,
//! and unmatched leading characters cost more.

const FIRST_CHAR_BONUS: i64 = 10;
const SEPARATOR_BONUS: i64 = 20;
const CAMEL_CASE_BONUS: i64 = 20;
const ADJACENT_BONUS: i64 = 5;
const LEADING_PENALTY: i64 = -5;
const MAX_LEADING_PENALTY: i64 = -15;

const SEPARATORS: [char; 6] = ['/', '-', '_', ' ', '.', '\\'];

/// A name that contains the pattern as a subsequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The matched name.
    pub text: String,

    /// Position of the name in the searched list.
    pub index: usize,

    /// Char positions in `text` that matched the pattern, ascending.
    pub matched_indexes: Vec<usize>,

    pub score: i64,
}

/// Every name in `names` matching `pattern`, best first.
///
/// Equal scores keep their order in `names`. An empty pattern matches
/// nothing.
#[must_use]
pub fn fuzzy_find(pattern: &str, names: &[String]) -> Vec<Match> {
    let pattern: Vec<char> = pattern.chars().collect();

    if pattern.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<Match> = names
        .iter()
        .enumerate()
        .filter_map(|(index, text)| {
            score_name(&pattern, text).map(|(matched_indexes, score)| Match {
                text: text.clone(),
                index,
                matched_indexes,
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| b.score.cmp(&a.score));

    matches
}

/// Matched char positions and score of `text`, if every pattern char is
/// found in order.
///
/// For each pattern char the best-scoring occurrence is kept until the next
/// pattern char shows up (or the text ends), then it is committed.
fn score_name(pattern: &[char], text: &str) -> Option<(Vec<usize>, i64)> {
    let chars: Vec<char> = text.chars().collect();

    let mut matched: Vec<usize> = Vec::with_capacity(pattern.len());
    let mut total = 0;
    let mut pattern_index = 0;
    let mut best: Option<(usize, i64)> = None;
    let mut adjacent_bonus = 0;
    let mut last = '\0';
    let mut last_index = 0;

    for (position, &candidate) in chars.iter().enumerate() {
        let Some(&wanted) = pattern.get(pattern_index) else {
            break;
        };

        if same_letter(candidate, wanted) {
            let mut score = 0;

            if position == 0 {
                score += FIRST_CHAR_BONUS;
            }

            if last.is_lowercase() && candidate.is_uppercase() {
                score += CAMEL_CASE_BONUS;
            }

            if position != 0 && SEPARATORS.contains(&last) {
                score += SEPARATOR_BONUS;
            }

            if let Some(&last_match) = matched.last() {
                let bonus = if last_match == last_index {
                    adjacent_bonus * 2 + ADJACENT_BONUS
                } else {
                    0
                };

                score += bonus;
                adjacent_bonus += bonus;
            }

            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((position, score));
            }
        }

        let commit = match (pattern.get(pattern_index + 1), chars.get(position + 1)) {
            (_, None) => true,
            (Some(&next_wanted), Some(&next_char)) => same_letter(next_wanted, next_char),
            (None, Some(_)) => false,
        };

        if commit && let Some((index, mut score)) = best.take() {
            if matched.is_empty() {
                score += (LEADING_PENALTY * signed(index)).max(MAX_LEADING_PENALTY);
            }

            total += score;
            matched.push(index);
            pattern_index += 1;
        }

        last_index = position;
        last = candidate;
    }

    total += signed(matched.len()) - signed(chars.len());

    (matched.len() == pattern.len()).then_some((matched, total))
}

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn signed(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
