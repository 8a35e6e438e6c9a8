//! Guest-pointer-width scalar types. The guest is a wasm32 program, so
//! pointers and sizes crossing the ABI are 32 bits regardless of the
//! host's word size.
#![allow(non_camel_case_types)]

pub type uintptr_t = u32;
pub type size_t = u32;

pub use crate::wasi::__wasi_errno_t;
