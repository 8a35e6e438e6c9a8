//! Bounds-checked access to the guest's linear memory.
//!
//! The embedder hands every hostcall a byte view of the guest's backing
//! store. All reads and writes go through this module: scalars are
//! little-endian regardless of the host, every access is checked against
//! the store length before it happens, and a failed check returns
//! `EOVERFLOW` without touching the store. This module is also the only
//! place that knows the wire layout of the WASI record types.

use crate::{wasi, wasi32, Error, Result};
use std::convert::TryFrom;
use std::mem::size_of;

/// Size of an iovec entry in guest memory: `{u32 buf, u32 buf_len}`.
pub const IOVEC_SIZE: usize = 8;
/// Size of the fixed directory-entry header preceding the name bytes.
pub const DIRENT_SIZE: usize = 24;
/// Size of the fdstat record.
pub const FDSTAT_SIZE: usize = 24;
/// Size of the prestat record.
pub const PRESTAT_SIZE: usize = 8;
/// Size of the filestat record.
pub const FILESTAT_SIZE: usize = 64;

fn checked_slice(memory: &[u8], ptr: wasi32::uintptr_t, len: usize) -> Result<&[u8]> {
    let start = ptr as usize;
    let end = start.checked_add(len).ok_or(Error::EOVERFLOW)?;
    memory.get(start..end).ok_or(Error::EOVERFLOW)
}

fn checked_slice_mut(
    memory: &mut [u8],
    ptr: wasi32::uintptr_t,
    len: usize,
) -> Result<&mut [u8]> {
    let start = ptr as usize;
    let end = start.checked_add(len).ok_or(Error::EOVERFLOW)?;
    memory.get_mut(start..end).ok_or(Error::EOVERFLOW)
}

macro_rules! scalar_accessors {
    ($($dec:ident, $enc:ident, $ty:ty;)*) => {
        $(
            pub fn $dec(memory: &[u8], ptr: wasi32::uintptr_t) -> Result<$ty> {
                let bytes = checked_slice(memory, ptr, size_of::<$ty>())?;
                let mut raw = [0u8; size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                Ok(<$ty>::from_le_bytes(raw))
            }

            pub fn $enc(memory: &mut [u8], ptr: wasi32::uintptr_t, value: $ty) -> Result<()> {
                let bytes = checked_slice_mut(memory, ptr, size_of::<$ty>())?;
                bytes.copy_from_slice(&value.to_le_bytes());
                Ok(())
            }
        )*
    };
}

scalar_accessors! {
    dec_u8, enc_u8, u8;
    dec_u16, enc_u16, u16;
    dec_u32, enc_u32, u32;
    dec_u64, enc_u64, u64;
    dec_i8, enc_i8, i8;
    dec_i16, enc_i16, i16;
    dec_i32, enc_i32, i32;
    dec_i64, enc_i64, i64;
}

/// Write a host `usize` into a guest `size_t` slot, or EOVERFLOW when
/// the value does not fit in 32 bits.
pub fn enc_usize(memory: &mut [u8], ptr: wasi32::uintptr_t, value: usize) -> Result<()> {
    enc_u32(memory, ptr, wasi32::size_t::try_from(value)?)
}

pub fn dec_slice(memory: &[u8], ptr: wasi32::uintptr_t, len: wasi32::size_t) -> Result<&[u8]> {
    checked_slice(memory, ptr, len as usize)
}

pub fn dec_slice_mut(
    memory: &mut [u8],
    ptr: wasi32::uintptr_t,
    len: wasi32::size_t,
) -> Result<&mut [u8]> {
    checked_slice_mut(memory, ptr, len as usize)
}

pub fn enc_slice(memory: &mut [u8], ptr: wasi32::uintptr_t, bytes: &[u8]) -> Result<()> {
    checked_slice_mut(memory, ptr, bytes.len())?.copy_from_slice(bytes);
    Ok(())
}

/// Decode a guest path: `len` raw bytes, validated as UTF-8. There is no
/// NUL terminator on the wire.
pub fn dec_path<'a>(
    memory: &'a [u8],
    ptr: wasi32::uintptr_t,
    len: wasi32::size_t,
) -> Result<&'a str> {
    let bytes = dec_slice(memory, ptr, len)?;
    std::str::from_utf8(bytes).map_err(Into::into)
}

/// Decode an iovec array entry by entry. Each referenced buffer range is
/// bounds-checked against the store here, so later copies through the
/// entries cannot fail the bounds check.
pub fn dec_iovecs(
    memory: &[u8],
    iovs_ptr: wasi32::uintptr_t,
    iovs_len: wasi32::size_t,
) -> Result<Vec<wasi::__wasi_iovec_t>> {
    // Check the whole table range up front so the allocation below is
    // bounded by the store size.
    let table_len = (iovs_len as usize)
        .checked_mul(IOVEC_SIZE)
        .ok_or(Error::EOVERFLOW)?;
    checked_slice(memory, iovs_ptr, table_len)?;

    let mut iovs = Vec::with_capacity(iovs_len as usize);
    for idx in 0..iovs_len {
        let entry = iovs_ptr
            .checked_add(idx.checked_mul(IOVEC_SIZE as u32).ok_or(Error::EOVERFLOW)?)
            .ok_or(Error::EOVERFLOW)?;
        let buf = dec_u32(memory, entry)?;
        let buf_len = dec_u32(memory, entry.checked_add(4).ok_or(Error::EOVERFLOW)?)?;
        checked_slice(memory, buf, buf_len as usize)?;
        iovs.push(wasi::__wasi_iovec_t { buf, buf_len });
    }
    Ok(iovs)
}

pub fn enc_fdstat(
    memory: &mut [u8],
    ptr: wasi32::uintptr_t,
    fdstat: &wasi::__wasi_fdstat_t,
) -> Result<()> {
    let bytes = checked_slice_mut(memory, ptr, FDSTAT_SIZE)?;
    bytes[0] = fdstat.fs_filetype;
    bytes[1] = 0;
    bytes[2..4].copy_from_slice(&fdstat.fs_flags.to_le_bytes());
    bytes[4..8].copy_from_slice(&[0; 4]);
    bytes[8..16].copy_from_slice(&fdstat.fs_rights_base.to_le_bytes());
    bytes[16..24].copy_from_slice(&fdstat.fs_rights_inheriting.to_le_bytes());
    Ok(())
}

pub fn enc_prestat(
    memory: &mut [u8],
    ptr: wasi32::uintptr_t,
    prestat: &wasi::__wasi_prestat_t,
) -> Result<()> {
    let bytes = checked_slice_mut(memory, ptr, PRESTAT_SIZE)?;
    bytes[0..4].copy_from_slice(&u32::from(prestat.pr_type).to_le_bytes());
    bytes[4..8].copy_from_slice(&prestat.pr_name_len.to_le_bytes());
    Ok(())
}

pub fn enc_filestat(
    memory: &mut [u8],
    ptr: wasi32::uintptr_t,
    filestat: &wasi::__wasi_filestat_t,
) -> Result<()> {
    let bytes = checked_slice_mut(memory, ptr, FILESTAT_SIZE)?;
    bytes[0..8].copy_from_slice(&filestat.st_dev.to_le_bytes());
    bytes[8..16].copy_from_slice(&filestat.st_ino.to_le_bytes());
    bytes[16] = filestat.st_filetype;
    bytes[17..24].copy_from_slice(&[0; 7]);
    bytes[24..32].copy_from_slice(&filestat.st_nlink.to_le_bytes());
    bytes[32..40].copy_from_slice(&filestat.st_size.to_le_bytes());
    bytes[40..48].copy_from_slice(&filestat.st_atim.to_le_bytes());
    bytes[48..56].copy_from_slice(&filestat.st_mtim.to_le_bytes());
    bytes[56..64].copy_from_slice(&filestat.st_ctim.to_le_bytes());
    Ok(())
}

/// Serialize a directory-entry header into its 24-byte wire form. The
/// caller appends the name bytes and handles tail truncation.
pub fn dirent_bytes(dirent: &wasi::__wasi_dirent_t) -> [u8; DIRENT_SIZE] {
    let mut bytes = [0u8; DIRENT_SIZE];
    bytes[0..8].copy_from_slice(&dirent.d_next.to_le_bytes());
    bytes[8..16].copy_from_slice(&dirent.d_ino.to_le_bytes());
    bytes[16..20].copy_from_slice(&dirent.d_namlen.to_le_bytes());
    bytes[20] = dirent.d_type;
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_little_endian() {
        let mut memory = vec![0u8; 16];
        enc_u32(&mut memory, 0, 0x1122_3344).unwrap();
        assert_eq!(&memory[0..4], &[0x44, 0x33, 0x22, 0x11]);
        assert_eq!(dec_u32(&memory, 0).unwrap(), 0x1122_3344);

        enc_u64(&mut memory, 4, u64::max_value() - 1).unwrap();
        assert_eq!(dec_u64(&memory, 4).unwrap(), u64::max_value() - 1);

        enc_i64(&mut memory, 4, -42).unwrap();
        assert_eq!(dec_i64(&memory, 4).unwrap(), -42);
    }

    #[test]
    fn out_of_bounds_access_is_eoverflow() {
        let mut memory = vec![0u8; 8];
        assert_eq!(dec_u32(&memory, 5), Err(Error::EOVERFLOW));
        assert_eq!(dec_u64(&memory, 1), Err(Error::EOVERFLOW));
        assert_eq!(enc_u32(&mut memory, 6, 1), Err(Error::EOVERFLOW));
        // Offsets near the address-space limit must not wrap around.
        assert_eq!(dec_u32(&memory, u32::max_value()), Err(Error::EOVERFLOW));
        // A failed write leaves the store untouched.
        assert_eq!(memory, vec![0u8; 8]);
    }

    #[test]
    fn iovec_ranges_are_validated() {
        let mut memory = vec![0u8; 32];
        // entry 0: buf=24 len=8 (fits exactly); entry 1: buf=28 len=8 (escapes)
        enc_u32(&mut memory, 0, 24).unwrap();
        enc_u32(&mut memory, 4, 8).unwrap();
        enc_u32(&mut memory, 8, 28).unwrap();
        enc_u32(&mut memory, 12, 8).unwrap();

        let iovs = dec_iovecs(&memory, 0, 1).unwrap();
        assert_eq!(iovs[0].buf, 24);
        assert_eq!(iovs[0].buf_len, 8);
        assert_eq!(dec_iovecs(&memory, 0, 2), Err(Error::EOVERFLOW));
    }

    #[test]
    fn fdstat_layout() {
        let mut memory = vec![0u8; FDSTAT_SIZE];
        let fdstat = wasi::__wasi_fdstat_t {
            fs_filetype: wasi::__WASI_FILETYPE_REGULAR_FILE,
            fs_flags: wasi::__WASI_FDFLAG_APPEND,
            fs_rights_base: wasi::__WASI_RIGHT_FD_READ,
            fs_rights_inheriting: 0,
        };
        enc_fdstat(&mut memory, 0, &fdstat).unwrap();
        assert_eq!(memory[0], wasi::__WASI_FILETYPE_REGULAR_FILE);
        assert_eq!(dec_u16(&memory, 2).unwrap(), wasi::__WASI_FDFLAG_APPEND);
        assert_eq!(dec_u64(&memory, 8).unwrap(), wasi::__WASI_RIGHT_FD_READ);
        assert_eq!(dec_u64(&memory, 16).unwrap(), 0);
    }

    #[test]
    fn dirent_header_layout() {
        let dirent = wasi::__wasi_dirent_t {
            d_next: 7,
            d_ino: 9,
            d_namlen: 3,
            d_type: wasi::__WASI_FILETYPE_DIRECTORY,
        };
        let bytes = dirent_bytes(&dirent);
        assert_eq!(bytes.len(), DIRENT_SIZE);
        assert_eq!(&bytes[0..8], &7u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &9u64.to_le_bytes());
        assert_eq!(&bytes[16..20], &3u32.to_le_bytes());
        assert_eq!(bytes[20], wasi::__WASI_FILETYPE_DIRECTORY);
        assert_eq!(&bytes[21..24], &[0, 0, 0]);
    }
}
