// MIT License - Copyright (c) 2019 Lorenzo Miori

use core::fmt;

/// The closed set of errors a FrogFS operation can fail with.
///
/// Success is `Result::Ok`, not a variant here, unlike the original
/// implementation's status codes which fold `FROGFS_ERR_OK` into the same
/// enum as its failures.
#[derive(Clone, Copy, Eq, Ord, PartialEq, PartialOrd)]
pub enum Error {
    /// A required output slice was missing or too small.
    NullArg,
    /// The storage adapter failed.
    Io,
    /// The superblock magic or version did not match.
    NotFormatted,
    /// The record id was out of range, or a size exceeded `MAX_RECORD_BYTES`.
    InvalidRecord,
    /// The free-space allocator found no qualifying blank run.
    NoSpace,
    /// The operation requires the record to be open for writing.
    NotWritable,
    /// The operation requires the record to not be open for writing.
    NotReadable,
    /// `close` was called on a record that was never opened.
    InvalidOperation,
    /// A structural violation was found while scanning the medium.
    OutOfRange,
}

impl Error {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NullArg => "required output argument missing",
            Self::Io => "storage adapter I/O error",
            Self::NotFormatted => "superblock magic/version mismatch",
            Self::InvalidRecord => "record id or size out of range",
            Self::NoSpace => "no contiguous blank run large enough",
            Self::NotWritable => "record is not open for writing",
            Self::NotReadable => "record is open for writing",
            Self::InvalidOperation => {
                "operation invalid in the record's current state"
            }
            Self::OutOfRange => {
                "structural violation found while scanning the medium"
            }
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> core::result::Result<(), fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Error {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> core::result::Result<(), fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

pub type Result<T> = core::result::Result<T, Error>;
