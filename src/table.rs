// MIT License - Copyright (c) 2019 Lorenzo Miori

//! The in-RAM allocation table rebuilt by [`crate::FrogFs::init`] at boot.
//!
//! Nothing on the medium ever stores this table; it is reconstructed by
//! the scanner every time, which is why `init` must be total over any
//! accepted medium (spec §9).

use crate::codec::MAX_RECORDS;
use crate::result::{Error, Result};

/// Sentinel stored in a slot's `cursor_b` register meaning "the current
/// fragment has been fully consumed; the next loop iteration should decode
/// the descriptor at `cursor_a`."
pub const FRAGMENT_EXHAUSTED: u16 = u16::MAX;

/// One record's working state.
///
/// `offset == 0` means the slot is empty (no record uses it); this is safe
/// because offset 0 falls inside the superblock and can never be a valid
/// record head.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Slot {
    /// Byte position of the record's NORMAL/SIZE descriptor.
    pub offset: u16,
    /// Working register; meaning depends on whether the record is idle,
    /// open for reading, or open for writing (see [`crate::engine`]).
    pub cursor_a: u16,
    /// Working register; paired with `cursor_a`.
    pub cursor_b: u16,
    /// Data write position within the current fragment. Non-zero means
    /// "open for writing".
    pub write_offset: u16,
}

impl Slot {
    const fn empty() -> Slot {
        Slot { offset: 0, cursor_a: 0, cursor_b: 0, write_offset: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.offset == 0
    }
}

/// A fixed-size array of [`Slot`]s, indexed by record id.
pub struct AllocTable {
    slots: [Slot; MAX_RECORDS as usize],
}

impl Default for AllocTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocTable {
    pub const fn new() -> AllocTable {
        AllocTable { slots: [Slot::empty(); MAX_RECORDS as usize] }
    }

    pub fn slot(&self, id: u8) -> Result<&Slot> {
        self.slots.get(id as usize).ok_or(Error::InvalidRecord)
    }

    pub fn slot_mut(&mut self, id: u8) -> Result<&mut Slot> {
        self.slots.get_mut(id as usize).ok_or(Error::InvalidRecord)
    }

    /// Zeros the entire table. Used by [`crate::FrogFs::init`] before
    /// re-scanning, and by `format` to reflect a freshly wiped medium.
    pub fn reset(&mut self) {
        self.slots = [Slot::empty(); MAX_RECORDS as usize];
    }

    /// Writes ascending ids with `offset != 0` into `buf`, returning how
    /// many were written. Mirrors the original's `list_size`-bounded copy:
    /// ids beyond `buf.len()` are simply not written, not an error.
    pub fn list_into(&self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        for (id, slot) in self.slots.iter().enumerate() {
            if !slot.is_empty() {
                if n < buf.len() {
                    buf[n] = id as u8;
                }
                n += 1;
            }
        }
        n
    }

    /// Smallest id whose slot is empty.
    pub fn first_free(&self) -> Result<u8> {
        self.slots
            .iter()
            .position(Slot::is_empty)
            .map(|i| i as u8)
            .ok_or(Error::OutOfRange)
    }
}
