#![allow(dead_code)]

use tempfile::TempDir;
use wasi_sandbox::{hostcalls, memory, wasi, wasi32, WasiCtx, WasiCtxBuilder};

pub const GUEST_MEMORY_SIZE: usize = 64 * 1024;
/// First preopen lands right after the stdio descriptors.
pub const PREOPEN_FD: wasi::__wasi_fd_t = 3;

// Scratch layout used by the tests: scalar outputs in the first words,
// a path region, an iovec table, then data buffers.
pub const OUT_PTR: wasi32::uintptr_t = 0x10;
pub const FD_OUT_PTR: wasi32::uintptr_t = 0x50;
pub const PATH_PTR: wasi32::uintptr_t = 0x100;
pub const PATH2_PTR: wasi32::uintptr_t = 0x200;
pub const IOVS_PTR: wasi32::uintptr_t = 0x300;
pub const DATA_PTR: wasi32::uintptr_t = 0x400;
pub const READDIR_BUF_PTR: wasi32::uintptr_t = 0x1000;

pub fn setup(guest_path: &str) -> (WasiCtx, Vec<u8>, TempDir) {
    let _ = pretty_env_logger::try_init();
    let root = TempDir::new().expect("creating sandbox root");
    let ctx = WasiCtxBuilder::new()
        .preopened_dir(root.path(), guest_path)
        .build()
        .expect("building WasiCtx");
    (ctx, vec![0u8; GUEST_MEMORY_SIZE], root)
}

/// The canonical host path of the sandbox root, as the resolver sees it.
pub fn canonical_root(root: &TempDir) -> String {
    std::fs::canonicalize(root.path())
        .expect("canonicalizing sandbox root")
        .to_str()
        .expect("sandbox root is valid UTF-8")
        .to_owned()
}

pub fn store_str(memory: &mut [u8], ptr: wasi32::uintptr_t, s: &str) -> (wasi32::uintptr_t, wasi32::size_t) {
    memory::enc_slice(memory, ptr, s.as_bytes()).expect("storing string in guest memory");
    (ptr, s.len() as wasi32::size_t)
}

pub fn store_iovec(
    memory: &mut [u8],
    table_ptr: wasi32::uintptr_t,
    index: u32,
    buf: wasi32::uintptr_t,
    buf_len: wasi32::size_t,
) {
    memory::enc_u32(memory, table_ptr + index * 8, buf).unwrap();
    memory::enc_u32(memory, table_ptr + index * 8 + 4, buf_len).unwrap();
}

/// Drive `path_open` and return the new fd on success, the errno on
/// failure.
pub fn path_open(
    ctx: &mut WasiCtx,
    memory: &mut [u8],
    dirfd: wasi::__wasi_fd_t,
    dirflags: wasi::__wasi_lookupflags_t,
    path: &str,
    oflags: wasi::__wasi_oflags_t,
    rights_base: wasi::__wasi_rights_t,
    rights_inheriting: wasi::__wasi_rights_t,
    fs_flags: wasi::__wasi_fdflags_t,
) -> Result<wasi::__wasi_fd_t, wasi::__wasi_errno_t> {
    let (path_ptr, path_len) = store_str(memory, PATH_PTR, path);
    let errno = hostcalls::path_open(
        ctx,
        memory,
        dirfd,
        dirflags,
        path_ptr,
        path_len,
        oflags,
        rights_base,
        rights_inheriting,
        fs_flags,
        FD_OUT_PTR,
    );
    if errno == wasi::__WASI_ESUCCESS {
        Ok(memory::dec_u32(memory, FD_OUT_PTR).unwrap())
    } else {
        Err(errno)
    }
}

/// Write `data` through `fd_write` using a single iovec; returns nwritten.
pub fn write_all(
    ctx: &WasiCtx,
    memory: &mut [u8],
    fd: wasi::__wasi_fd_t,
    data: &[u8],
) -> usize {
    memory::enc_slice(memory, DATA_PTR, data).unwrap();
    store_iovec(memory, IOVS_PTR, 0, DATA_PTR, data.len() as wasi32::size_t);
    let errno = hostcalls::fd_write(ctx, memory, fd, IOVS_PTR, 1, OUT_PTR);
    assert_eq!(errno, wasi::__WASI_ESUCCESS, "fd_write failed: {}", errno);
    memory::dec_u32(memory, OUT_PTR).unwrap() as usize
}

/// One parsed directory record: the resume cookie, the advertised name
/// length and the (possibly truncated) name bytes actually present.
pub struct DirentRecord {
    pub d_next: u64,
    pub d_namlen: u32,
    pub name: Vec<u8>,
}

pub fn parse_dirents(memory: &[u8], buf: wasi32::uintptr_t, bufused: usize) -> Vec<DirentRecord> {
    let mut records = Vec::new();
    let mut offset = 0;
    while bufused - offset >= memory::DIRENT_SIZE {
        let base = buf + offset as wasi32::uintptr_t;
        let d_next = memory::dec_u64(memory, base).unwrap();
        let d_namlen = memory::dec_u32(memory, base + 16).unwrap();
        let name_avail = (bufused - offset - memory::DIRENT_SIZE).min(d_namlen as usize);
        let name = memory::dec_slice(memory, base + memory::DIRENT_SIZE as u32, name_avail as u32)
            .unwrap()
            .to_vec();
        records.push(DirentRecord {
            d_next,
            d_namlen,
            name,
        });
        if name_avail < d_namlen as usize {
            break;
        }
        offset += memory::DIRENT_SIZE + d_namlen as usize;
    }
    records
}

/// Rights bundle for an ordinary read/write file test.
pub fn rw_file_rights() -> wasi::__wasi_rights_t {
    wasi::__WASI_RIGHT_FD_READ
        | wasi::__WASI_RIGHT_FD_WRITE
        | wasi::__WASI_RIGHT_FD_SEEK
        | wasi::__WASI_RIGHT_FD_TELL
        | wasi::__WASI_RIGHT_FD_FILESTAT_GET
}
