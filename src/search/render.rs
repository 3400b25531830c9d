//! Frame rendering for the search console.

use std::time::Instant;

use humanize_duration::{Truncate, prelude::DurationExt};
use tracing::warn;

use crate::{
    directory::DirectorySnapshot,
    search::{Match, fuzzy_find},
};

const HIGHLIGHT_START: &str = "\x1b[1;31m";
const HIGHLIGHT_END: &str = "\x1b[0m";

/// A run of characters sharing one highlight state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// One match, split into highlighted and plain segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLine {
    pub segments: Vec<Segment>,
}

impl ResultLine {
    /// Split `found.text` around its matched char positions.
    #[must_use]
    pub fn from_match(found: &Match) -> Self {
        let mut segments: Vec<Segment> = Vec::new();

        for (position, c) in found.text.chars().enumerate() {
            let highlighted = found.matched_indexes.contains(&position);

            match segments.last_mut() {
                Some(segment) if segment.highlighted == highlighted => segment.text.push(c),
                _ => segments.push(Segment {
                    text: c.to_string(),
                    highlighted,
                }),
            }
        }

        Self { segments }
    }

    /// The line without highlighting.
    #[must_use]
    pub fn plain(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect()
    }

    /// The line for a plain terminal, each matched char wrapped in a bold
    /// red escape.
    #[must_use]
    pub fn to_ansi(&self) -> String {
        let mut line = String::new();

        for segment in &self.segments {
            if segment.highlighted {
                for c in segment.text.chars() {
                    line.push_str(HIGHLIGHT_START);
                    line.push(c);
                    line.push_str(HIGHLIGHT_END);
                }
            } else {
                line.push_str(&segment.text);
            }
        }

        line
    }
}

/// Content of the detail region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DetailView {
    /// The top match, serialized as indented JSON.
    Entry(String),

    /// Nothing matched; the region stays empty.
    #[default]
    NoMatch,
}

/// Everything the console draws for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderFrame {
    /// "found N matches in …", empty before the first search.
    pub summary: String,
    pub results: Vec<ResultLine>,
    pub detail: DetailView,
}

impl RenderFrame {
    /// Number of matches shown.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.results.len()
    }
}

/// Search `names` for `query` and describe the resulting screen.
///
/// `names` must be `snapshot.names()`; the top match is looked up in
/// `snapshot` by name.
#[must_use]
pub fn render_frame(query: &str, snapshot: &DirectorySnapshot, names: &[String]) -> RenderFrame {
    let started = Instant::now();
    let matches = fuzzy_find(query.trim(), names);
    let elapsed = started.elapsed();

    let detail = matches
        .first()
        .and_then(|top| snapshot.find_by_name(&top.text))
        .map_or(DetailView::NoMatch, |entry| {
            match serde_json::to_string_pretty(entry) {
                Ok(json) => DetailView::Entry(json),
                Err(error) => {
                    warn!(%error, name = %entry.name, "could not serialize top match");
                    DetailView::NoMatch
                }
            }
        });

    RenderFrame {
        summary: format!(
            "found {} matches in {}",
            matches.len(),
            elapsed.human(Truncate::Nano)
        ),
        results: matches.iter().map(ResultLine::from_match).collect(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::directory::DirectoryEntry;

    fn snapshot() -> DirectorySnapshot {
        DirectorySnapshot::new(
            ["acme-web", "acme-native", "beta-spa"]
                .into_iter()
                .map(|name| DirectoryEntry {
                    name: name.to_string(),
                    client_id: Some(format!("{name}-id")),
                    ..DirectoryEntry::default()
                })
                .collect(),
        )
    }

    #[test]
    fn segments_follow_matched_positions() {
        let line = ResultLine::from_match(&Match {
            text: "acme-web".to_string(),
            index: 0,
            matched_indexes: vec![0, 5],
            score: 0,
        });

        let highlighted: Vec<(&str, bool)> = line
            .segments
            .iter()
            .map(|segment| (segment.text.as_str(), segment.highlighted))
            .collect();

        assert_eq!(
            highlighted,
            vec![("a", true), ("cme-", false), ("w", true), ("eb", false)]
        );
        assert_eq!(line.plain(), "acme-web");
        assert_eq!(
            line.to_ansi(),
            "\x1b[1;31ma\x1b[0mcme-\x1b[1;31mw\x1b[0meb"
        );
    }

    #[test]
    fn frame_lists_matches_and_details_top_one() -> TestResult {
        let snapshot = snapshot();
        let frame = render_frame("acme", &snapshot, &snapshot.names());

        assert_eq!(frame.match_count(), 2);
        assert!(
            frame.summary.starts_with("found 2 matches in "),
            "unexpected summary {}",
            frame.summary
        );

        let json = match &frame.detail {
            DetailView::Entry(json) => json.clone(),
            DetailView::NoMatch => String::new(),
        };
        assert!(!json.is_empty(), "expected a detail entry");

        let top = frame.results.first().map(ResultLine::plain);
        let value: serde_json::Value = serde_json::from_str(&json)?;

        assert_eq!(value.get("name").and_then(|v| v.as_str()), top.as_deref());
        assert_eq!(value.get("callbacks"), Some(&serde_json::json!([])));

        Ok(())
    }

    #[test]
    fn detail_lookup_ignores_case() {
        let snapshot = snapshot();
        let names = snapshot.names();

        let upper = render_frame("ACME-WEB", &snapshot, &names);
        let lower = render_frame("acme-web", &snapshot, &names);

        assert!(
            matches!(upper.detail, DetailView::Entry(_)),
            "uppercase query should resolve an entry"
        );
        assert_eq!(upper.detail, lower.detail);
    }

    #[test]
    fn no_match_leaves_detail_empty() {
        let snapshot = snapshot();
        let frame = render_frame("zzz", &snapshot, &snapshot.names());

        assert_eq!(frame.detail, DetailView::NoMatch);
        assert!(frame.results.is_empty(), "no result lines expected");
        assert!(
            frame.summary.starts_with("found 0 matches in "),
            "unexpected summary {}",
            frame.summary
        );
    }

    #[test]
    fn blank_query_matches_nothing() {
        let snapshot = snapshot();
        let frame = render_frame("   ", &snapshot, &snapshot.names());

        assert_eq!(frame.detail, DetailView::NoMatch);
    }
}
