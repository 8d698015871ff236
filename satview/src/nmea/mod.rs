//! NMEA-0183 framing: checksum validation and sentence splitting.
//!
//! Only the framing layer lives here. Interpretation of GSV/GSA payloads is
//! in [`crate::satellite`].
//!
//! ```
//! use satview::nmea::{parse_sentence, SentenceKind};
//!
//! let line = b"$GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1*39\r\n";
//! let sentence = parse_sentence(line).unwrap();
//! assert_eq!(sentence.kind(), SentenceKind::Gsa);
//! ```

mod checksum;
mod sentence;

pub use checksum::{has_valid_checksum, xor_checksum, CHECKSUM_DELIMITER};
pub use sentence::{
    parse_sentence, Sentence, SentenceError, SentenceKind, TalkerId, MIN_SENTENCE_LEN, SENTINEL,
};
