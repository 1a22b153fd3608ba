//! Word-level diff engine for rendering before/after views of a rewritten document.
//!
//! `diff` aligns the token sequences of two texts with Myers' algorithm and
//! returns maximal runs of unchanged, removed, and added text. The output is
//! lossless in both directions: dropping the `Added` segments yields the
//! original, dropping the `Removed` segments yields the revision.
//!
//! ```
//! use cvscan_api::diff::{diff, Segment};
//!
//! let segments = diff("Senior Java Engineer", "Senior Python Engineer");
//! assert_eq!(
//!     segments,
//!     vec![
//!         Segment::unchanged("Senior "),
//!         Segment::removed("Java"),
//!         Segment::added("Python"),
//!         Segment::unchanged(" Engineer"),
//!     ]
//! );
//! ```

pub mod tokenize;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, Algorithm, DiffOp};
use thiserror::Error;

use self::tokenize::tokenize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Unchanged,
    Added,
    Removed,
}

/// A maximal run of text sharing one classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub kind: SegmentKind,
}

impl Segment {
    pub fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn unchanged(text: impl Into<String>) -> Self {
        Self::new(SegmentKind::Unchanged, text)
    }

    pub fn added(text: impl Into<String>) -> Self {
        Self::new(SegmentKind::Added, text)
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self::new(SegmentKind::Removed, text)
    }
}

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("invalid input: {side} text is not valid UTF-8: {source}")]
    InvalidInput {
        side: &'static str,
        #[source]
        source: std::str::Utf8Error,
    },
}

/// Diffs `original` against `revised` at word granularity.
pub fn diff(original: &str, revised: &str) -> Vec<Segment> {
    if original == revised {
        return if original.is_empty() {
            Vec::new()
        } else {
            vec![Segment::unchanged(original)]
        };
    }

    let old_tokens = tokenize(original);
    let new_tokens = tokenize(revised);
    let (old_ids, new_ids) = intern(&old_tokens, &new_tokens);
    let runs = matching_runs(&old_ids, &new_ids);

    let mut builder = SegmentBuilder::default();
    let (mut old_pos, mut new_pos) = (0, 0);
    let tail = Match {
        old_start: old_tokens.len(),
        new_start: new_tokens.len(),
        len: 0,
    };

    for run in runs.iter().chain(std::iter::once(&tail)) {
        builder.push(SegmentKind::Removed, &old_tokens[old_pos..run.old_start]);
        builder.push(SegmentKind::Added, &new_tokens[new_pos..run.new_start]);
        builder.push(
            SegmentKind::Unchanged,
            &old_tokens[run.old_start..run.old_start + run.len],
        );
        old_pos = run.old_start + run.len;
        new_pos = run.new_start + run.len;
    }

    builder.finish()
}

/// Like [`diff`], for raw buffers that must first be validated as UTF-8.
pub fn diff_bytes(original: &[u8], revised: &[u8]) -> Result<Vec<Segment>, DiffError> {
    let original = std::str::from_utf8(original).map_err(|source| DiffError::InvalidInput {
        side: "original",
        source,
    })?;
    let revised = std::str::from_utf8(revised).map_err(|source| DiffError::InvalidInput {
        side: "revised",
        source,
    })?;
    Ok(diff(original, revised))
}

/// Segments shown in the "before" pane: everything except additions.
pub fn before_pane(segments: &[Segment]) -> impl Iterator<Item = &Segment> {
    segments.iter().filter(|s| s.kind != SegmentKind::Added)
}

/// Segments shown in the "after" pane: everything except removals.
pub fn after_pane(segments: &[Segment]) -> impl Iterator<Item = &Segment> {
    segments.iter().filter(|s| s.kind != SegmentKind::Removed)
}

/// Character counts per classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub unchanged: usize,
    pub added: usize,
    pub removed: usize,
}

impl DiffStats {
    pub fn from_segments(segments: &[Segment]) -> Self {
        segments.iter().fold(Self::default(), |mut stats, s| {
            let chars = s.text.chars().count();
            match s.kind {
                SegmentKind::Unchanged => stats.unchanged += chars,
                SegmentKind::Added => stats.added += chars,
                SegmentKind::Removed => stats.removed += chars,
            }
            stats
        })
    }

    pub fn is_identical(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// A run of `len` tokens common to both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Match {
    old_start: usize,
    new_start: usize,
    len: usize,
}

/// Common token runs in order, from a Myers alignment of the interned ids.
fn matching_runs(old: &[u32], new: &[u32]) -> Vec<Match> {
    capture_diff_slices(Algorithm::Myers, old, new)
        .into_iter()
        .filter_map(|op| match op {
            DiffOp::Equal {
                old_index,
                new_index,
                len,
            } => Some(Match {
                old_start: old_index,
                new_start: new_index,
                len,
            }),
            _ => None,
        })
        .collect()
}

/// Maps each distinct token to a small integer so the alignment compares ids.
fn intern<'a>(old: &[&'a str], new: &[&'a str]) -> (Vec<u32>, Vec<u32>) {
    let mut ids: HashMap<&'a str, u32> = HashMap::new();
    let mut id_of = |token: &'a str| -> u32 {
        let next = ids.len() as u32;
        *ids.entry(token).or_insert(next)
    };
    let old_ids = old.iter().map(|&t| id_of(t)).collect();
    let new_ids = new.iter().map(|&t| id_of(t)).collect();
    (old_ids, new_ids)
}

#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<Segment>,
}

impl SegmentBuilder {
    fn push(&mut self, kind: SegmentKind, tokens: &[&str]) {
        if tokens.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(last) if last.kind == kind => last.text.extend(tokens.iter().copied()),
            _ => self.segments.push(Segment::new(kind, tokens.concat())),
        }
    }

    fn finish(self) -> Vec<Segment> {
        self.segments
    }
}
