// MIT License - Copyright (c) 2019 Lorenzo Miori

//! The boot-time scan (spec §4.3) that rebuilds the in-RAM allocation
//! table from the medium. Nothing on the medium stores this table, so
//! `scan` must be total: any structural violation yields
//! [`Error::OutOfRange`] rather than silent corruption.

use log::trace;

use crate::codec::{decode, Descriptor, MAX_RECORDS};
use crate::format::{self, SUPERBLOCK_LEN};
use crate::result::{Error, Result};
use crate::storage::Storage;
use crate::table::AllocTable;

/// Verifies the superblock and walks the medium, populating `table` with
/// the offset of every record's NORMAL/SIZE descriptor.
///
/// Returns [`Error::NotFormatted`] if the superblock doesn't match, or
/// [`Error::OutOfRange`] on any structural violation (two NORMAL/SIZE
/// descriptors for one id, an out-of-range id, a dangling continuation
/// pointer, or an unrecognized descriptor). On `OutOfRange` the table is
/// left partially populated; callers may only safely call `format`
/// afterward (spec §7).
pub fn scan<S: Storage>(storage: &mut S, table: &mut AllocTable) -> Result<()> {
    format::check(storage)?;
    table.reset();

    let capacity = storage.capacity();
    let mut pos = SUPERBLOCK_LEN;

    'walk: while pos < capacity {
        // Blank-skip: advance one byte at a time while the medium reads
        // zero. Reaching the end of the medium here is a clean stop.
        loop {
            if pos >= capacity {
                break 'walk;
            }
            storage.seek(pos)?;
            let mut byte = [0u8; 1];
            storage.read(&mut byte)?;
            if byte[0] != 0 {
                break;
            }
            pos += 1;
        }

        if u32::from(pos) + 3 > u32::from(capacity) {
            // A partial descriptor at the tail; nothing more to scan.
            break;
        }

        let desc_pos = pos;
        storage.seek(desc_pos)?;
        let mut desc = [0u8; 3];
        storage.read(&mut desc)?;

        pos = match decode(desc) {
            Descriptor::Normal { id, size } => {
                trace!("scan: record {id} at {desc_pos}, {size} bytes");
                if id >= MAX_RECORDS {
                    return Err(Error::OutOfRange);
                }
                let slot = table.slot_mut(id)?;
                if !slot.is_empty() {
                    return Err(Error::OutOfRange);
                }
                slot.offset = desc_pos;
                advance_past_data(desc_pos, size, capacity)?
            }
            Descriptor::FragmentPointer { id, target } => {
                trace!("scan: record {id} continuation at {desc_pos} -> {target}");
                if target <= SUPERBLOCK_LEN || target >= capacity {
                    return Err(Error::OutOfRange);
                }
                desc_pos + 3
            }
            Descriptor::FragmentSize { size, .. } => {
                advance_past_data(desc_pos, size, capacity)?
            }
            Descriptor::Blank | Descriptor::Invalid => {
                return Err(Error::OutOfRange);
            }
        };
    }

    Ok(())
}

fn advance_past_data(desc_pos: u16, size: u16, capacity: u16) -> Result<u16> {
    let next = u32::from(desc_pos) + 3 + u32::from(size);
    if next > u32::from(capacity) {
        return Err(Error::OutOfRange);
    }
    Ok(next as u16)
}
