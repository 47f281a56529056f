// MIT License - Copyright (c) 2019 Lorenzo Miori

//! The record engine (spec §4.5): open/write/close/read/erase over the
//! record format, driving the allocator and codec.
//!
//! `FrogFs` owns both the storage adapter and the allocation table; per
//! spec §9's design note, there is no global/static state here. A
//! singleton is a consequence of there being one medium, not a
//! requirement of this type.

use log::{debug, trace};

use crate::allocator;
use crate::codec::{self, decode, Descriptor, PayloadKind, RecordKind};
use crate::format;
use crate::result::{Error, Result};
use crate::scanner;
use crate::storage::Storage;
use crate::table::{AllocTable, FRAGMENT_EXHAUSTED};

/// Data payload lengths a single [`FrogFs::write`] call may append are in
/// `[0, MAX_RECORD_BYTES)` (spec I6; the 15-bit payload field can only
/// represent sizes strictly below 2^15).
pub const MAX_RECORD_BYTES: u16 = codec::MAX_PAYLOAD;

/// A mounted FrogFS filesystem: a storage adapter plus the in-RAM
/// allocation table rebuilt from it.
pub struct FrogFs<S: Storage> {
    storage: S,
    table: AllocTable,
}

impl<S: Storage> FrogFs<S> {
    /// Wraps a storage adapter. Performs no I/O; call [`Self::format`] or
    /// [`Self::init`] before using any other operation.
    pub fn new(storage: S) -> FrogFs<S> {
        FrogFs { storage, table: AllocTable::new() }
    }

    /// Consumes the handle, returning the underlying storage adapter.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Zeros the whole medium, then writes the 5-byte superblock.
    pub fn format(&mut self) -> Result<()> {
        debug!("format: zeroing {} bytes", self.storage.capacity());
        self.erase_range(0, self.storage.capacity())?;
        format::write(&mut self.storage)
    }

    /// Resets the allocation table and rebuilds it from the medium.
    pub fn init(&mut self) -> Result<()> {
        let result = scanner::scan(&mut self.storage, &mut self.table);
        match &result {
            Ok(()) => debug!("init: scan complete"),
            Err(e) => debug!("init: scan failed: {e}"),
        }
        result
    }

    /// Fills `buf` with ascending ids currently in use, returning the
    /// total number of records that exist (which may exceed `buf.len()`;
    /// ids beyond the buffer's capacity are simply not written, matching
    /// how a bounded output buffer works at the storage-adapter layer).
    pub fn list(&self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.table.list_into(buf))
    }

    /// Smallest unused record id.
    pub fn first_free(&self) -> Result<u8> {
        self.table.first_free()
    }

    /// Opens a record. If it already exists, resets its read cursors to
    /// the start (idempotent). Otherwise allocates space for a new record
    /// and writes its head descriptor with size 0, entering the Writing
    /// state.
    pub fn open(&mut self, id: u8) -> Result<()> {
        if !self.table.slot(id)?.is_empty() {
            let slot = self.table.slot_mut(id)?;
            slot.cursor_a = 0;
            slot.cursor_b = 0;
            slot.write_offset = 0;
            return Ok(());
        }

        let (space_start, data_start, data_size) =
            allocator::find_contiguous_space(&mut self.storage)?;
        trace!("open({id}): allocated space at {space_start}, {data_size} bytes");
        let head =
            codec::encode(RecordKind::Normal, id, PayloadKind::Size, 0)?;
        self.storage.seek(space_start)?;
        self.storage.write(&head)?;

        let slot = self.table.slot_mut(id)?;
        slot.offset = space_start;
        slot.write_offset = data_start;
        slot.cursor_a = data_size;
        slot.cursor_b = 0;
        Ok(())
    }

    /// Appends `data` to a record open for writing, allocating
    /// continuation fragments as needed.
    pub fn write(&mut self, id: u8, data: &[u8]) -> Result<()> {
        if data.len() >= MAX_RECORD_BYTES as usize {
            return Err(Error::InvalidRecord);
        }
        if self.table.slot(id)?.write_offset == 0 {
            return Err(Error::NotWritable);
        }

        let mut written = 0usize;
        loop {
            if written >= data.len() {
                return self.patch_head_descriptor(id);
            }

            let slot = *self.table.slot(id)?;
            if slot.cursor_b < slot.cursor_a {
                let room = (slot.cursor_a - slot.cursor_b) as usize;
                let chunk = core::cmp::min(data.len() - written, room);
                let target = slot.write_offset + slot.cursor_b;
                self.storage.seek(target)?;
                match self.storage.write(&data[written..written + chunk]) {
                    Ok(()) => {
                        written += chunk;
                        let slot = self.table.slot_mut(id)?;
                        slot.cursor_b += chunk as u16;
                        let fragment_full = slot.cursor_b >= slot.cursor_a;
                        if fragment_full {
                            // The fragment is now completely full: patch its
                            // head descriptor with the true size before the
                            // next iteration can call the allocator, which
                            // would otherwise decode this fragment's own
                            // still-stale (or live data) bytes as if they
                            // were free space.
                            self.patch_head_descriptor(id)?;
                        }
                    }
                    Err(e) => {
                        debug!("write({id}): storage write failed: {e}");
                        self.patch_head_descriptor(id)?;
                        return Err(e);
                    }
                }
            } else {
                match allocator::find_contiguous_space(&mut self.storage) {
                    Ok((space_start, data_start, data_size)) => {
                        trace!(
                            "write({id}): fragment full, chaining to {space_start}"
                        );
                        let ptr = codec::encode(
                            RecordKind::Fragment,
                            id,
                            PayloadKind::Pointer,
                            space_start,
                        )?;
                        let fragment_end =
                            slot.write_offset + slot.cursor_a;
                        self.storage.seek(fragment_end)?;
                        self.storage.write(&ptr)?;

                        let new_head = codec::encode(
                            RecordKind::Fragment,
                            id,
                            PayloadKind::Size,
                            0,
                        )?;
                        self.storage.seek(space_start)?;
                        self.storage.write(&new_head)?;

                        let slot = self.table.slot_mut(id)?;
                        slot.write_offset = data_start;
                        slot.cursor_a = data_size;
                        slot.cursor_b = 0;
                    }
                    Err(e) => {
                        debug!("write({id}): allocator failed: {e}");
                        self.patch_head_descriptor(id)?;
                        return Err(e);
                    }
                }
            }
        }
    }

    /// Rewrites the current fragment's head descriptor with the number of
    /// bytes actually written into it so far. If `write_offset - 3` is the
    /// record's own offset, this is the NORMAL/SIZE head; otherwise it's a
    /// FRAGMENT/SIZE continuation head.
    fn patch_head_descriptor(&mut self, id: u8) -> Result<()> {
        let slot = *self.table.slot(id)?;
        let desc_pos = slot.write_offset - 3;
        let kind = if desc_pos == slot.offset {
            RecordKind::Normal
        } else {
            RecordKind::Fragment
        };
        let bytes =
            codec::encode(kind, id, PayloadKind::Size, slot.cursor_b)?;
        self.storage.seek(desc_pos)?;
        self.storage.write(&bytes)
    }

    /// Clears a record's per-operation working cursors. Flushes no data:
    /// on-medium state is already consistent after every `write` call.
    pub fn close(&mut self, id: u8) -> Result<()> {
        let slot = self.table.slot_mut(id)?;
        if slot.is_empty() {
            return Err(Error::InvalidOperation);
        }
        slot.cursor_a = 0;
        slot.cursor_b = 0;
        slot.write_offset = 0;
        Ok(())
    }

    /// Copies up to `buf.len()` bytes from the record into `buf`,
    /// returning the number of bytes actually copied. The cursor persists
    /// across calls until [`Self::close`].
    pub fn read(&mut self, id: u8, buf: &mut [u8]) -> Result<usize> {
        let requested = buf.len();
        self.traverse(id, Some(buf), requested, false)
    }

    /// Opens the record, zeros every descriptor and data region it
    /// occupies, then clears its slot. Erasing an id that doesn't yet
    /// exist is harmless (it is implicitly created, then immediately
    /// erased), matching the original implementation's behavior.
    pub fn erase(&mut self, id: u8) -> Result<()> {
        trace!("erase({id})");
        self.open(id)?;
        self.traverse(id, None, 0, true)?;
        self.close(id)?;
        self.table.slot_mut(id)?.offset = 0;
        Ok(())
    }

    /// Shared traversal for `read` and `erase`: `erase` zeros descriptors
    /// and data instead of copying them into `buf`, and ignores
    /// `requested`, running until end-of-record instead.
    fn traverse(
        &mut self,
        id: u8,
        mut buf: Option<&mut [u8]>,
        requested: usize,
        erase: bool,
    ) -> Result<usize> {
        if self.table.slot(id)?.write_offset != 0 {
            return Err(Error::NotReadable);
        }

        let mut out_n = 0usize;
        loop {
            if !erase && out_n >= requested {
                break;
            }

            let slot = *self.table.slot(id)?;

            if slot.cursor_b == FRAGMENT_EXHAUSTED {
                self.storage.seek(slot.cursor_a)?;
                let mut desc = [0u8; 3];
                self.storage.read(&mut desc)?;

                match decode(desc) {
                    // A fragment's 3 trailing bytes are reserved for a
                    // continuation pointer but stay blank forever if the
                    // record is never extended past this fragment: that is
                    // the ordinary end of a never-continued record, not
                    // corruption.
                    Descriptor::Blank => break,
                    Descriptor::Invalid => return Err(Error::OutOfRange),
                    // A continuation pointing at a descriptor for a
                    // different id is a stale fragment from a since-erased
                    // record reusing this space: stop successfully. A
                    // NORMAL descriptor here (even a matching one, which
                    // structurally shouldn't happen) is likewise just "not
                    // a continuation": stop.
                    Descriptor::Normal { .. } => break,
                    Descriptor::FragmentSize { id: found_id, .. }
                        if found_id != id =>
                    {
                        break
                    }
                    Descriptor::FragmentPointer { id: found_id, .. }
                        if found_id != id =>
                    {
                        break
                    }
                    Descriptor::FragmentSize { size, .. } => {
                        if erase {
                            self.erase_range(slot.cursor_a, 3)?;
                        }
                        let slot = self.table.slot_mut(id)?;
                        slot.cursor_a += 3;
                        slot.cursor_b = size;
                    }
                    Descriptor::FragmentPointer { target, .. } => {
                        if erase {
                            self.erase_range(slot.cursor_a, 3)?;
                        }
                        let slot = self.table.slot_mut(id)?;
                        slot.cursor_a = target;
                        slot.cursor_b = FRAGMENT_EXHAUSTED;
                    }
                }
            } else if slot.cursor_a != 0 {
                // Already past the head descriptor: continue the current
                // fragment (or, if it was exactly exhausted, fall through
                // to decoding the next descriptor on the following pass).
                let take = if erase {
                    slot.cursor_b as usize
                } else {
                    core::cmp::min(
                        requested - out_n,
                        slot.cursor_b as usize,
                    )
                };

                if erase {
                    self.erase_range(slot.cursor_a, take as u16)?;
                } else {
                    self.storage.seek(slot.cursor_a)?;
                    if let Some(buf) = buf.as_deref_mut() {
                        self.storage.read(&mut buf[out_n..out_n + take])?;
                    } else {
                        self.storage.advance(take as u16)?;
                    }
                }
                out_n += take;

                let slot = self.table.slot_mut(id)?;
                slot.cursor_a += take as u16;
                slot.cursor_b -= take as u16;
                if slot.cursor_b == 0 {
                    slot.cursor_b = FRAGMENT_EXHAUSTED;
                }
            } else {
                // First traversal step after `open`: read the head
                // descriptor at the record's own offset.
                self.storage.seek(slot.offset)?;
                let mut desc = [0u8; 3];
                self.storage.read(&mut desc)?;
                if erase {
                    self.erase_range(slot.offset, 3)?;
                }
                match decode(desc) {
                    Descriptor::Normal { id: found_id, size }
                        if found_id == id =>
                    {
                        let slot = self.table.slot_mut(id)?;
                        slot.cursor_a = slot.offset + 3;
                        slot.cursor_b = size;
                    }
                    _ => return Err(Error::OutOfRange),
                }
            }
        }

        Ok(out_n)
    }

    /// Zeros `len` bytes starting at `pos` (ground: the original's
    /// `frogfs_erase_range`, used by `traverse` to blank every descriptor
    /// and data region a record occupies).
    fn erase_range(&mut self, pos: u16, len: u16) -> Result<()> {
        self.storage.seek(pos)?;
        let zeros = [0u8; 32];
        let mut remaining = len as usize;
        while remaining > 0 {
            let chunk = core::cmp::min(remaining, zeros.len());
            self.storage.write(&zeros[..chunk])?;
            remaining -= chunk;
        }
        Ok(())
    }
}
