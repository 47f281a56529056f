// MIT License - Copyright (c) 2019 Lorenzo Miori

//! The 3-byte record descriptor: a pure, total codec with no I/O.
//!
//! ```text
//! byte 0: [7]    record-kind (0 = Normal, 1 = Fragment)
//!         [6..0] record-id + 1, biased so id 0 never encodes as 0x00
//! byte 1: [7]    payload-kind (0 = Pointer, 1 = Size)
//!         [6..0] high 7 bits of the 15-bit payload
//! byte 2: [7..0] low 8 bits of the payload
//! ```
//!
//! The id bias exists because the medium's erased state is all-zero: an
//! unbiased id of 0 would be indistinguishable from blank space. Every
//! encode/decode site must apply the bias consistently; this module is the
//! only place it appears.

use bitstruct::bitstruct;
use static_assertions::const_assert;

use crate::result::{Error, Result};

/// Maximum number of records this build supports (spec §1: at most 126).
pub const MAX_RECORDS: u8 = 32;

/// Maximum payload value a descriptor can carry (15 bits).
pub const MAX_PAYLOAD: u16 = 1 << 15;

// The descriptor is bit-exact and must stay within the 3 on-medium bytes
// this codec reads and writes; the id-bias scheme additionally requires
// that MAX_RECORDS + 1 still fits the 7-bit id_biased field.
const_assert!(MAX_PAYLOAD <= (1 << 15));
const_assert!(MAX_RECORDS < 127);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordKind {
    Normal,
    Fragment,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PayloadKind {
    Pointer,
    Size,
}

bitstruct! {
    /// The 3-byte descriptor packed into the low 24 bits of a `u32`.
    #[derive(Clone, Copy)]
    struct Word(u32) {
        kind: RecordKind = 23..=23;
        id_biased: u8 = 16..=22;
        payload_kind: PayloadKind = 15..=15;
        payload: u16 = 0..=14;
    }
}

impl bitstruct::FromRaw<u8, RecordKind> for Word {
    fn from_raw(raw: u8) -> RecordKind {
        match raw {
            0 => RecordKind::Normal,
            _ => RecordKind::Fragment,
        }
    }
}

impl bitstruct::FromRaw<u8, PayloadKind> for Word {
    fn from_raw(raw: u8) -> PayloadKind {
        match raw {
            0 => PayloadKind::Pointer,
            _ => PayloadKind::Size,
        }
    }
}

impl Word {
    fn from_bytes(bytes: [u8; 3]) -> Word {
        let raw = (u32::from(bytes[0]) << 16)
            | (u32::from(bytes[1]) << 8)
            | u32::from(bytes[2]);
        Word(raw)
    }

    fn to_bytes(self) -> [u8; 3] {
        let raw = self.0;
        [(raw >> 16) as u8, (raw >> 8) as u8, raw as u8]
    }
}

/// A decoded descriptor, tagged by what it logically represents on the
/// medium (spec §3's four record-descriptor variants, plus the two
/// sentinel cases a scan can observe).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Descriptor {
    /// Three zero bytes: unwritten space.
    Blank,
    /// The id-carrying byte was zero but the other bytes were not; never
    /// produced by `encode`, only possible on a corrupted medium.
    Invalid,
    /// NORMAL/SIZE: the head of a record.
    Normal { id: u8, size: u16 },
    /// FRAGMENT/POINTER: a continuation terminator.
    FragmentPointer { id: u8, target: u16 },
    /// FRAGMENT/SIZE: the head of a continuation fragment.
    FragmentSize { id: u8, size: u16 },
}

/// `word == [0, 0, 0]`.
pub fn is_blank(word: &[u8; 3]) -> bool {
    *word == [0, 0, 0]
}

/// Encodes a descriptor. Fails if `id >= MAX_RECORDS` or `payload >=
/// MAX_PAYLOAD` (2^15).
pub fn encode(
    kind: RecordKind,
    id: u8,
    payload_kind: PayloadKind,
    payload: u16,
) -> Result<[u8; 3]> {
    if id >= MAX_RECORDS || payload >= MAX_PAYLOAD {
        return Err(Error::InvalidRecord);
    }
    let word = Word(0)
        .with_kind(kind)
        .with_id_biased(id + 1)
        .with_payload_kind(payload_kind)
        .with_payload(payload);
    Ok(word.to_bytes())
}

/// Decodes a 3-byte descriptor. Never fails: corrupt or blank input simply
/// yields [`Descriptor::Blank`] or [`Descriptor::Invalid`].
pub fn decode(bytes: [u8; 3]) -> Descriptor {
    if is_blank(&bytes) {
        return Descriptor::Blank;
    }
    let word = Word::from_bytes(bytes);
    if word.id_biased() == 0 {
        return Descriptor::Invalid;
    }
    let id = word.id_biased() - 1;
    let payload = word.payload();
    match (word.kind(), word.payload_kind()) {
        (RecordKind::Normal, PayloadKind::Size) => Descriptor::Normal {
            id,
            size: payload,
        },
        (RecordKind::Fragment, PayloadKind::Pointer) => {
            Descriptor::FragmentPointer { id, target: payload }
        }
        (RecordKind::Fragment, PayloadKind::Size) => {
            Descriptor::FragmentSize { id, size: payload }
        }
        // NORMAL/POINTER is not a descriptor variant spec.md defines; the
        // scanner treats any descriptor it doesn't recognize as a
        // structural violation.
        (RecordKind::Normal, PayloadKind::Pointer) => Descriptor::Invalid,
    }
}
