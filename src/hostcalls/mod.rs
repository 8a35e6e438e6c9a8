//! Public syscall surface: one typed function per WASI operation.
//!
//! These are the entry points an embedder wires to its guest. Each
//! takes the sandbox instance, a view of the guest's linear memory and
//! the operation's scalar arguments, and returns the WASI errno in its
//! wire encoding. The argument-count and scalar-type validation the
//! ABI requires is discharged by the Rust signatures; everything that
//! dereferences guest memory goes through `crate::memory`.

use crate::{wasi, wasi32, Result};
use log::trace;

fn return_enc_errno(result: Result<()>) -> wasi32::__wasi_errno_t {
    let errno = match result {
        Ok(()) => wasi::__WASI_ESUCCESS,
        Err(err) => err.as_wasi_errno(),
    };
    trace!("     | errno={}", errno);
    errno
}

macro_rules! hostcalls {
    ($(pub fn $name:ident($($arg:ident: $ty:ty,)*) -> wasi32::__wasi_errno_t;)*) => {
        $(
            pub fn $name($($arg: $ty,)*) -> wasi32::__wasi_errno_t {
                super::return_enc_errno(crate::hostcalls_impl::$name($($arg,)*))
            }
        )*
    };
}

mod fs;
mod misc;

pub use self::fs::*;
pub use self::misc::*;
