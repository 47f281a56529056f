// MIT License - Copyright (c) 2019 Lorenzo Miori

//! Free-space allocator (spec §4.4): locates a run of blank bytes long
//! enough to hold a new fragment.

use log::trace;

use crate::codec::{decode, Descriptor};
use crate::format::{MIN_FRAGMENT_LEN, SUPERBLOCK_LEN};
use crate::result::{Error, Result};
use crate::storage::Storage;

/// Scans the medium from just after the superblock for the first blank run
/// of at least [`MIN_FRAGMENT_LEN`] bytes, honoring existing descriptors
/// (their data is skipped, never mistaken for free space).
///
/// Returns `(space_start, data_start, data_size)`: `space_start` is the
/// first byte of the blank run, `data_start = space_start + 3`, and
/// `data_size` is the maximum data the caller may write while still
/// reserving 3 trailing bytes for a continuation-pointer descriptor.
///
/// First-fit: the first qualifying run in address order wins, and its
/// reported `data_size` is the full extent of that run, not just the
/// minimum needed.
pub fn find_contiguous_space<S: Storage>(
    storage: &mut S,
) -> Result<(u16, u16, u16)> {
    let capacity = storage.capacity();
    let mut pos = SUPERBLOCK_LEN;
    let mut run_start: Option<u16> = None;
    let mut run_len: u16 = 0;

    while pos < capacity {
        storage.seek(pos)?;
        let mut byte = [0u8; 1];
        storage.read(&mut byte)?;

        if byte[0] == 0 {
            if run_start.is_none() {
                run_start = Some(pos);
            }
            run_len += 1;
            pos += 1;
            continue;
        }

        if run_len >= MIN_FRAGMENT_LEN {
            let start = run_start.expect("run_len > 0 implies run_start set");
            trace!("allocator: found hole at {start}, {run_len} bytes");
            return Ok((start, start + 3, run_len - MIN_FRAGMENT_LEN));
        }
        run_start = None;
        run_len = 0;

        if pos as u32 + 3 > capacity as u32 {
            break;
        }
        storage.seek(pos)?;
        let mut desc = [0u8; 3];
        storage.read(&mut desc)?;
        let skip = match decode(desc) {
            Descriptor::Normal { size, .. }
            | Descriptor::FragmentSize { size, .. } => 3u32 + u32::from(size),
            Descriptor::FragmentPointer { .. } => 3,
            Descriptor::Invalid => return Err(Error::OutOfRange),
            // Unreachable: `byte[0]` was just observed nonzero, so the
            // descriptor at `pos` cannot decode as blank.
            Descriptor::Blank => 1,
        };
        let next = u32::from(pos) + skip;
        if next >= u32::from(capacity) {
            break;
        }
        pos = next as u16;
    }

    if run_len >= MIN_FRAGMENT_LEN {
        let start = run_start.expect("run_len > 0 implies run_start set");
        trace!("allocator: found trailing hole at {start}, {run_len} bytes");
        return Ok((start, start + 3, run_len - MIN_FRAGMENT_LEN));
    }

    trace!("allocator: no qualifying hole found");
    Err(Error::NoSpace)
}
