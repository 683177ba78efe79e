//! Append-only streams with monotonic `<milliseconds>-<sequence>` entry IDs.

use std::{
    collections::BTreeMap,
    fmt,
    ops::Bound,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Clone)]
pub enum StreamError {
    #[error("Invalid stream ID specified as stream command argument")]
    InvalidId,
    #[error("The ID specified in XADD must be greater than 0-0")]
    IdIsZero,
    #[error("The ID specified in XADD is equal or smaller than the target stream top item")]
    IdNotGreaterThanTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StreamId {
    pub milliseconds: u64,
    pub sequence: u64,
}

impl StreamId {
    pub const MIN: StreamId = StreamId::new(0, 0);
    pub const MAX: StreamId = StreamId::new(u64::MAX, u64::MAX);

    pub const fn new(milliseconds: u64, sequence: u64) -> Self {
        Self {
            milliseconds,
            sequence,
        }
    }

    /// Parses a range bound as accepted by XRANGE.
    ///
    /// `-` and `+` are the smallest and largest possible IDs. A bound without
    /// a sequence part covers the whole millisecond: sequence 0 for a start
    /// bound and the maximum sequence for an end bound.
    pub fn parse_range_bound(input: &str, is_end: bool) -> Result<Self, StreamError> {
        match input {
            "-" => Ok(StreamId::MIN),
            "+" => Ok(StreamId::MAX),
            _ => match input.split_once('-') {
                Some(_) => input.parse(),
                None => {
                    let milliseconds = parse_id_part(input)?;
                    let sequence = if is_end { u64::MAX } else { 0 };
                    Ok(StreamId::new(milliseconds, sequence))
                }
            },
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.milliseconds, self.sequence)
    }
}

impl FromStr for StreamId {
    type Err = StreamError;

    /// Accepts `<ms>-<seq>`, or a bare `<ms>` meaning sequence 0.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.split_once('-') {
            Some((milliseconds, sequence)) => Ok(StreamId::new(
                parse_id_part(milliseconds)?,
                parse_id_part(sequence)?,
            )),
            None => Ok(StreamId::new(parse_id_part(input)?, 0)),
        }
    }
}

fn parse_id_part(input: &str) -> Result<u64, StreamError> {
    input.parse::<u64>().map_err(|_| StreamError::InvalidId)
}

/// The ID argument of XADD before it is resolved against a stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamIdRequest {
    /// `<ms>-<seq>`
    Explicit(StreamId),
    /// `<ms>-*`
    AutoSequence(u64),
    /// `*`
    Auto,
}

impl FromStr for StreamIdRequest {
    type Err = StreamError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input == "*" {
            return Ok(StreamIdRequest::Auto);
        }

        let Some((milliseconds, sequence)) = input.split_once('-') else {
            return Err(StreamError::InvalidId);
        };

        let milliseconds = parse_id_part(milliseconds)?;

        if sequence == "*" {
            Ok(StreamIdRequest::AutoSequence(milliseconds))
        } else {
            Ok(StreamIdRequest::Explicit(StreamId::new(
                milliseconds,
                parse_id_part(sequence)?,
            )))
        }
    }
}

pub type StreamFields = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stream {
    entries: BTreeMap<StreamId, StreamFields>,
    last_id: StreamId,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_id(&self) -> StreamId {
        self.last_id
    }

    /// Resolves the ID a new entry would receive, rejecting IDs that are not
    /// strictly greater than the last one handed out.
    pub fn next_id(&self, request: StreamIdRequest, now_ms: u64) -> Result<StreamId, StreamError> {
        let last = self.last_id;

        match request {
            StreamIdRequest::Explicit(id) => {
                if id == StreamId::MIN {
                    return Err(StreamError::IdIsZero);
                }

                if id <= last {
                    return Err(StreamError::IdNotGreaterThanTop);
                }

                Ok(id)
            }
            StreamIdRequest::AutoSequence(milliseconds) => {
                if milliseconds > last.milliseconds {
                    return Ok(StreamId::new(milliseconds, 0));
                }

                if milliseconds < last.milliseconds {
                    return Err(StreamError::IdNotGreaterThanTop);
                }

                last.sequence
                    .checked_add(1)
                    .map(|sequence| StreamId::new(milliseconds, sequence))
                    .ok_or(StreamError::IdNotGreaterThanTop)
            }
            StreamIdRequest::Auto => {
                if now_ms > last.milliseconds {
                    return Ok(StreamId::new(now_ms, 0));
                }

                // The clock went backwards or several entries share this millisecond.
                last.sequence
                    .checked_add(1)
                    .map(|sequence| StreamId::new(last.milliseconds, sequence))
                    .or_else(|| {
                        last.milliseconds
                            .checked_add(1)
                            .map(|milliseconds| StreamId::new(milliseconds, 0))
                    })
                    .ok_or(StreamError::IdNotGreaterThanTop)
            }
        }
    }

    pub fn add(
        &mut self,
        request: StreamIdRequest,
        fields: StreamFields,
        now_ms: u64,
    ) -> Result<StreamId, StreamError> {
        let id = self.next_id(request, now_ms)?;

        self.entries.insert(id, fields);
        self.last_id = id;

        Ok(id)
    }

    /// Entries with `start <= id <= end`, in ID order.
    pub fn range(
        &self,
        start: StreamId,
        end: StreamId,
    ) -> impl Iterator<Item = (&StreamId, &StreamFields)> {
        // BTreeMap::range panics on an inverted range.
        let bounds = if start <= end {
            (Bound::Included(start), Bound::Included(end))
        } else {
            (Bound::Included(start), Bound::Included(start))
        };

        self.entries
            .range(bounds)
            .take_while(move |_| start <= end)
    }

    /// Entries with an ID strictly greater than `id`, in ID order.
    pub fn entries_after(&self, id: StreamId) -> impl Iterator<Item = (&StreamId, &StreamFields)> {
        self.entries
            .range((Bound::Excluded(id), Bound::Unbounded))
    }
}

pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}
