// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Composite identifiers for draggable entries
//!
//! A flat id has the form `scheduleId#childId#childIndex`, where the trailing
//! segments are optional. Segments are escaped so that a `#` inside an id can
//! never be mistaken for the delimiter: `%` becomes `%25` and `#` becomes
//! `%23`.

use crate::error::{BoardError, BoardResult};
use std::fmt;
use std::str::FromStr;

/// Segment delimiter
pub const DELIMITER: char = '#';

/// Decoded composite identifier of a leaf or container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlatId {
    /// Owning schedule item
    pub schedule_id: String,
    /// Group or meal inside the schedule item
    pub child_id: Option<String>,
    /// Position inside the group; only meaningful with `child_id`
    pub child_index: Option<usize>,
}

impl FlatId {
    /// Id of a schedule item on its own
    #[must_use]
    pub fn schedule(schedule_id: impl Into<String>) -> Self {
        Self {
            schedule_id: schedule_id.into(),
            child_id: None,
            child_index: None,
        }
    }

    /// Id of a plain meal or of a group container
    #[must_use]
    pub fn child(schedule_id: impl Into<String>, child_id: impl Into<String>) -> Self {
        Self {
            schedule_id: schedule_id.into(),
            child_id: Some(child_id.into()),
            child_index: None,
        }
    }

    /// Id of a meal nested in a group at `index`
    #[must_use]
    pub fn member(schedule_id: impl Into<String>, meal_id: impl Into<String>, index: usize) -> Self {
        Self {
            schedule_id: schedule_id.into(),
            child_id: Some(meal_id.into()),
            child_index: Some(index),
        }
    }

    /// Encode into the delimited string form
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = escape(&self.schedule_id);
        if let Some(child) = &self.child_id {
            out.push(DELIMITER);
            out.push_str(&escape(child));
            if let Some(index) = self.child_index {
                out.push(DELIMITER);
                out.push_str(&index.to_string());
            }
        }
        out
    }

    /// Decode a string produced by [`FlatId::encode`]
    pub fn decode(raw: &str) -> BoardResult<Self> {
        let segments: Vec<&str> = raw.split(DELIMITER).collect();
        if segments.len() > 3 {
            return Err(BoardError::malformed(raw, "too many segments"));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(BoardError::malformed(raw, "empty segment"));
        }

        let schedule_id = unescape(raw, segments[0])?;
        let child_id = segments.get(1).map(|s| unescape(raw, s)).transpose()?;
        let child_index = segments.get(2).map(|s| parse_index(raw, s)).transpose()?;

        Ok(Self {
            schedule_id,
            child_id,
            child_index,
        })
    }
}

impl fmt::Display for FlatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for FlatId {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// Encode without building a [`FlatId`] first
#[must_use]
pub fn encode(schedule_id: &str, child_id: Option<&str>, child_index: Option<usize>) -> String {
    FlatId {
        schedule_id: schedule_id.to_string(),
        child_id: child_id.map(str::to_string),
        child_index: child_id.and(child_index),
    }
    .encode()
}

/// Decode a flat id string
pub fn decode(raw: &str) -> BoardResult<FlatId> {
    FlatId::decode(raw)
}

/// Plain decimal digits without a leading zero, exactly as `encode` writes them
fn parse_index(raw: &str, segment: &str) -> BoardResult<usize> {
    let canonical = segment.bytes().all(|b| b.is_ascii_digit()) && (segment == "0" || !segment.starts_with('0'));
    if !canonical {
        return Err(BoardError::malformed(raw, format!("child index {segment:?} is not a number")));
    }
    segment
        .parse::<usize>()
        .map_err(|_| BoardError::malformed(raw, format!("child index {segment:?} is out of range")))
}

fn escape(segment: &str) -> String {
    segment.replace('%', "%25").replace(DELIMITER, "%23")
}

fn unescape(raw: &str, segment: &str) -> BoardResult<String> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let code = rest.get(pos + 1..pos + 3);
        match code {
            Some("25") => out.push('%'),
            Some("23") => out.push(DELIMITER),
            _ => return Err(BoardError::malformed(raw, "invalid escape sequence")),
        }
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_forms() {
        assert_eq!(FlatId::schedule("s1").encode(), "s1");
        assert_eq!(FlatId::child("s1", "meal1").encode(), "s1#meal1");
        assert_eq!(FlatId::member("s3", "meal3", 0).encode(), "s3#meal3#0");
    }

    #[test]
    fn test_decode_member() {
        let id = FlatId::decode("s3#meal4#1").unwrap();
        assert_eq!(id.schedule_id, "s3");
        assert_eq!(id.child_id.as_deref(), Some("meal4"));
        assert_eq!(id.child_index, Some(1));
    }

    #[test]
    fn test_delimiter_inside_ids_is_escaped() {
        let id = FlatId::member("s#1", "50%#off", 2);
        let encoded = id.encode();
        assert_eq!(encoded, "s%231#50%25%23off#2");
        assert_eq!(FlatId::decode(&encoded).unwrap(), id);
    }

    #[test]
    fn test_index_without_child_is_dropped() {
        assert_eq!(encode("s1", None, Some(3)), "s1");
    }

    #[test]
    fn test_malformed_inputs() {
        for raw in ["", "#meal", "s1#", "s1##0", "s1#m#x", "s1#m#0#extra", "s1#bad%2", "s1#m#-1"] {
            let err = FlatId::decode(raw).unwrap_err();
            assert!(
                matches!(err, BoardError::MalformedIdentifier { .. }),
                "{raw:?} should be malformed, got {err:?}"
            );
        }
    }

    #[test]
    fn test_index_has_one_spelling() {
        for raw in ["s1#m#+5", "s1#m#007", "s1#m#00", "s1#m# 1", "s1#m#99999999999999999999999"] {
            assert!(
                matches!(FlatId::decode(raw), Err(BoardError::MalformedIdentifier { .. })),
                "{raw:?} should be malformed"
            );
        }
        assert_eq!(FlatId::decode("s1#m#0").unwrap().child_index, Some(0));
        assert_eq!(FlatId::decode("s1#m#10").unwrap().encode(), "s1#m#10");
    }
}
