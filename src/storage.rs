// MIT License - Copyright (c) 2019 Lorenzo Miori

//! The storage adapter trait FrogFS is built on top of.
//!
//! FrogFS treats the medium as an external collaborator: a byte-addressable,
//! seekable, fixed-capacity device. Implementations might be a file-backed
//! emulator (see [`crate::testing`]), an EEPROM driver, or anything else
//! that can honor absolute seeks before each read/write. The engine never
//! assumes the adapter remembers a cursor between calls of its own accord;
//! every internal step re-seeks before touching it.

use crate::result::Result;

/// A byte-addressable, seekable, read/write medium of fixed capacity.
///
/// Capacities are bounded to `u16::MAX` bytes (spec §1's "no media larger
/// than 2^15 - 1 bytes" non-goal is enforced one level up, by the engine;
/// the adapter itself may report up to `u16::MAX`).
pub trait Storage {
    /// Total byte capacity of the medium.
    fn capacity(&self) -> u16;

    /// Positions the cursor at an absolute offset.
    fn seek(&mut self, offset: u16) -> Result<()>;

    /// Moves the cursor forward by `delta` bytes, relative to its current
    /// position.
    fn advance(&mut self, delta: u16) -> Result<()>;

    /// Moves the cursor backward by `delta` bytes, relative to its current
    /// position.
    fn backtrack(&mut self, delta: u16) -> Result<()>;

    /// Returns the cursor's current absolute position.
    fn position(&self) -> Result<u16>;

    /// Returns whether the cursor sits at the last valid byte of the medium
    /// (or the medium is empty).
    fn at_end(&self) -> Result<bool>;

    /// Reads exactly `dst.len()` bytes, advancing the cursor by that many
    /// bytes.
    fn read(&mut self, dst: &mut [u8]) -> Result<()>;

    /// Writes exactly `src.len()` bytes, advancing the cursor by that many
    /// bytes.
    fn write(&mut self, src: &[u8]) -> Result<()>;

    /// Durability hint; may be a no-op.
    fn sync(&mut self) -> Result<()>;

    /// Releases any resources held by the adapter.
    fn close(&mut self) -> Result<()>;
}
