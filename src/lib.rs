// MIT License - Copyright (c) 2019 Lorenzo Miori

//! A minimal record-oriented filesystem for small byte-addressable
//! persistent memories (EEPROMs and similar media with no wear-leveling
//! or block erase).
//!
//! A medium holds a 5-byte superblock followed by up to [`MAX_RECORDS`]
//! records, each identified by a small integer id. Records may be
//! written incrementally and, once full, continue into further fragments
//! elsewhere on the medium; nothing on the medium stores an index, so
//! [`FrogFs::init`] rebuilds the allocation table by scanning on every
//! boot. See the crate's design notes for the on-medium layout.
//!
//! ```no_run
//! # fn example<S: frogfs::Storage>(mut storage: S) -> frogfs::Result<()> {
//! let mut fs = frogfs::FrogFs::new(storage);
//! fs.format()?;
//! fs.init()?;
//! fs.open(0)?;
//! fs.write(0, b"hello")?;
//! fs.close(0)?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(any(test, clippy)), no_std)]
#![forbid(unsafe_op_in_unsafe_fn)]

extern crate alloc;

mod allocator;
mod codec;
mod engine;
mod format;
mod result;
mod scanner;
mod storage;
mod table;

/// An in-memory [`Storage`] implementation for this crate's own tests and
/// for downstream integration tests; always compiled in, not gated behind
/// `cfg(test)`, since it is ordinary safe code with no hardware access.
pub mod testing;

pub use codec::MAX_RECORDS;
pub use engine::{FrogFs, MAX_RECORD_BYTES};
pub use format::{MAGIC, VERSION};
pub use result::{Error, Result};
pub use storage::Storage;
