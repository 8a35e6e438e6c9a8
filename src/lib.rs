//! A capability-based WASI system-call layer for sandboxed guests.
//!
//! An embedder builds a [`WasiCtx`] from its initialization options
//! (arguments, environment, preopened directories, fd-table size) and
//! forwards each guest syscall to the matching function in
//! [`hostcalls`], together with a mutable view of the guest's linear
//! memory. Every file operation is mediated by per-descriptor rights
//! and a path resolver that keeps resolved paths inside the preopened
//! sandbox roots.
//!
//! ```no_run
//! use wasi_sandbox::{hostcalls, WasiCtxBuilder};
//!
//! let mut ctx = WasiCtxBuilder::new()
//!     .arg("guest-program")
//!     .env("LANG", "C")
//!     .preopened_dir("/tmp/sandbox", "/")
//!     .build()
//!     .unwrap();
//! let mut guest_memory = vec![0u8; 64 * 1024];
//!
//! // argc at offset 0, argv buffer size at offset 4
//! let errno = hostcalls::args_sizes_get(&ctx, &mut guest_memory, 0, 4);
//! assert_eq!(errno, wasi_sandbox::wasi::__WASI_ESUCCESS);
//! # let _ = &mut ctx;
//! ```

mod ctx;
mod error;
mod fdentry;
mod fdtable;
pub mod hostcalls;
mod hostcalls_impl;
pub mod memory;
mod sys;
pub mod wasi;
pub mod wasi32;

pub use crate::ctx::{WasiCtx, WasiCtxBuilder};
pub use crate::error::{Error, Result};
