//! Sentence splitting and identification.
//!
//! A validated sentence is truncated at its checksum delimiter and split on
//! commas. The address field (`$GPGSV`) carries a two-character talker code
//! followed by a three-character sentence code.

use std::fmt;

use thiserror::Error;
use tracing::trace;

use super::checksum::{has_valid_checksum, CHECKSUM_DELIMITER};

/// Leading byte of every NMEA sentence.
pub const SENTINEL: u8 = b'$';

/// Shortest buffer that can hold a sentinel, talker and sentence code.
pub const MIN_SENTENCE_LEN: usize = 6;

/// Errors that cause a raw line to be dropped before interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SentenceError {
    /// The buffer cannot hold an address field.
    #[error("Sentence too short: {len} bytes (minimum {MIN_SENTENCE_LEN})")]
    TooShort { len: usize },

    /// The buffer does not start with `$`.
    #[error("Sentence does not start with '$'")]
    MissingSentinel,

    /// Checksum trailer missing or wrong.
    #[error("Invalid checksum")]
    InvalidChecksum,

    /// The sentence body contains non-ASCII bytes.
    #[error("Sentence body is not ASCII")]
    NotAscii,
}

/// The sentence types this decoder interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentenceKind {
    /// Satellite status: PRNs used in the fix.
    Gsa,
    /// Satellites in view.
    Gsv,
    /// Anything else (RMC, GGA, proprietary...). Ignored.
    Other,
}

impl SentenceKind {
    fn from_code(code: &[u8]) -> Self {
        match code {
            b"GSA" => SentenceKind::Gsa,
            b"GSV" => SentenceKind::Gsv,
            _ => SentenceKind::Other,
        }
    }
}

/// Two-character talker identifier, e.g. `GP` or `GL`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TalkerId([u8; 2]);

impl TalkerId {
    /// Create a talker identifier from its two ASCII bytes.
    pub const fn new(code: [u8; 2]) -> Self {
        Self(code)
    }

    /// Raw talker bytes.
    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }
}

impl fmt::Display for TalkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0[0] as char, self.0[1] as char)
    }
}

impl fmt::Debug for TalkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TalkerId({})", self)
    }
}

/// A checksum-validated sentence split into fields.
///
/// `fields()[0]` is the address field including the sentinel; the checksum
/// trailer is never part of the fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence<'a> {
    talker: TalkerId,
    kind: SentenceKind,
    fields: Vec<&'a str>,
}

impl<'a> Sentence<'a> {
    /// Talker that emitted the sentence.
    pub fn talker(&self) -> TalkerId {
        self.talker
    }

    /// Sentence type.
    pub fn kind(&self) -> SentenceKind {
        self.kind
    }

    /// All comma-separated fields, address first.
    pub fn fields(&self) -> &[&'a str] {
        &self.fields
    }

    /// Field at `index`, if present.
    pub fn field(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).copied()
    }
}

/// Validate and split a raw line.
///
/// Trailing line terminators are tolerated since everything after the
/// checksum delimiter is discarded.
pub fn parse_sentence(data: &[u8]) -> Result<Sentence<'_>, SentenceError> {
    if data.len() < MIN_SENTENCE_LEN {
        return Err(SentenceError::TooShort { len: data.len() });
    }
    if data[0] != SENTINEL {
        return Err(SentenceError::MissingSentinel);
    }
    if !has_valid_checksum(data) {
        return Err(SentenceError::InvalidChecksum);
    }

    let end = data
        .iter()
        .position(|&b| b == CHECKSUM_DELIMITER)
        .unwrap_or(data.len());
    let body = &data[..end];
    if !body.is_ascii() {
        return Err(SentenceError::NotAscii);
    }
    let text = std::str::from_utf8(body).map_err(|_| SentenceError::NotAscii)?;

    let talker = TalkerId::new([data[1], data[2]]);
    let kind = SentenceKind::from_code(&data[3..6]);
    let fields: Vec<&str> = text.split(',').collect();

    trace!(talker = %talker, ?kind, fields = fields.len(), "Sentence split");

    Ok(Sentence {
        talker,
        kind,
        fields,
    })
}
