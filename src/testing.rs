// MIT License - Copyright (c) 2019 Lorenzo Miori

//! An in-memory [`Storage`] implementation used by this crate's own test
//! suite and available to downstream integration tests.
//!
//! This plays the role spec.md §1(a) assigns to a "file-backed emulator":
//! an external collaborator the engine is tested against, supplied here so
//! the crate is self-testing without requiring a real EEPROM or a host
//! file on disk (compare the teacher's `impl io::Read for &[u8]`, used the
//! same way to drive `ufs::FileSystem` in tests).

use alloc::vec;
use alloc::vec::Vec;

use crate::result::{Error, Result};
use crate::storage::Storage;

/// A fixed-capacity, zero-initialized byte vector playing the role of an
/// EEPROM/file-backed medium.
pub struct SliceStorage {
    bytes: Vec<u8>,
    cursor: usize,
}

impl SliceStorage {
    /// Creates a new, all-zero medium of the given capacity.
    pub fn new(capacity: u16) -> SliceStorage {
        SliceStorage { bytes: vec![0u8; capacity as usize], cursor: 0 }
    }

    /// Returns the raw bytes of the medium, for assertions in tests that
    /// need to inspect on-medium state directly.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Storage for SliceStorage {
    fn capacity(&self) -> u16 {
        self.bytes.len() as u16
    }

    fn seek(&mut self, offset: u16) -> Result<()> {
        if offset as usize > self.bytes.len() {
            return Err(Error::Io);
        }
        self.cursor = offset as usize;
        Ok(())
    }

    fn advance(&mut self, delta: u16) -> Result<()> {
        let next = self.cursor.checked_add(delta as usize).ok_or(Error::Io)?;
        if next > self.bytes.len() {
            return Err(Error::Io);
        }
        self.cursor = next;
        Ok(())
    }

    fn backtrack(&mut self, delta: u16) -> Result<()> {
        let next =
            self.cursor.checked_sub(delta as usize).ok_or(Error::Io)?;
        self.cursor = next;
        Ok(())
    }

    fn position(&self) -> Result<u16> {
        Ok(self.cursor as u16)
    }

    fn at_end(&self) -> Result<bool> {
        if self.bytes.is_empty() {
            return Ok(true);
        }
        Ok(self.cursor == self.bytes.len() - 1)
    }

    fn read(&mut self, dst: &mut [u8]) -> Result<()> {
        let end = self.cursor.checked_add(dst.len()).ok_or(Error::Io)?;
        if end > self.bytes.len() {
            return Err(Error::Io);
        }
        dst.copy_from_slice(&self.bytes[self.cursor..end]);
        self.cursor = end;
        Ok(())
    }

    fn write(&mut self, src: &[u8]) -> Result<()> {
        let end = self.cursor.checked_add(src.len()).ok_or(Error::Io)?;
        if end > self.bytes.len() {
            return Err(Error::Io);
        }
        self.bytes[self.cursor..end].copy_from_slice(src);
        self.cursor = end;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
