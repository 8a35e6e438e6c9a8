//! Directory enumeration: record layout, tail truncation and cookie
//! resumption.

mod common;

use common::*;
use std::collections::BTreeSet;
use std::fs;
use wasi_sandbox::{hostcalls, memory, wasi};

fn readdir(
    ctx: &wasi_sandbox::WasiCtx,
    memory_buf: &mut [u8],
    fd: wasi::__wasi_fd_t,
    buf_len: u32,
    cookie: u64,
) -> usize {
    let errno = hostcalls::fd_readdir(
        ctx,
        memory_buf,
        fd,
        READDIR_BUF_PTR,
        buf_len,
        cookie,
        OUT_PTR,
    );
    assert_eq!(errno, wasi::__WASI_ESUCCESS, "fd_readdir failed: {}", errno);
    memory::dec_u32(memory_buf, OUT_PTR).unwrap() as usize
}

#[test]
fn entries_roundtrip_with_a_large_buffer() {
    let (ctx, mut memory_buf, root) = setup("/s");
    for name in &["a", "b", "c"] {
        fs::write(root.path().join(name), b"").unwrap();
    }

    let bufused = readdir(&ctx, &mut memory_buf, PREOPEN_FD, 4096, 0);
    let records = parse_dirents(&memory_buf, READDIR_BUF_PTR, bufused);
    let names: BTreeSet<Vec<u8>> = records.iter().map(|r| r.name.clone()).collect();

    // "." and ".." are filtered out.
    assert_eq!(
        names,
        ["a", "b", "c"]
            .iter()
            .map(|n| n.as_bytes().to_vec())
            .collect()
    );
    assert_eq!(bufused, 3 * (memory::DIRENT_SIZE + 1));
}

#[test]
fn short_buffer_truncates_and_cookie_resumes() {
    let (ctx, mut memory_buf, root) = setup("/s");
    for name in &["a", "b", "c"] {
        fs::write(root.path().join(name), b"").unwrap();
    }

    // Room for one full record (24 + 1) plus two stray bytes.
    let buf_len = (memory::DIRENT_SIZE + 1 + 2) as u32;
    let bufused = readdir(&ctx, &mut memory_buf, PREOPEN_FD, buf_len, 0);
    assert_eq!(bufused, buf_len as usize, "guest must see the buffer full");

    let records = parse_dirents(&memory_buf, READDIR_BUF_PTR, bufused);
    assert!(!records.is_empty());
    let first = &records[0];
    assert_eq!(first.d_namlen, 1);
    assert_eq!(first.name.len(), 1);

    // Resume after the first entry; the remaining two must show up
    // exactly once each.
    let bufused = readdir(&ctx, &mut memory_buf, PREOPEN_FD, 4096, first.d_next);
    let rest = parse_dirents(&memory_buf, READDIR_BUF_PTR, bufused);
    assert_eq!(rest.len(), 2);

    let mut seen: BTreeSet<Vec<u8>> = rest.iter().map(|r| r.name.clone()).collect();
    assert!(!seen.contains(&first.name));
    seen.insert(first.name.clone());
    assert_eq!(
        seen,
        ["a", "b", "c"]
            .iter()
            .map(|n| n.as_bytes().to_vec())
            .collect()
    );
}

#[test]
fn readdir_requires_the_right() {
    let (mut ctx, mut memory_buf, _root) = setup("/s");

    let fd = path_open(
        &mut ctx,
        &mut memory_buf,
        PREOPEN_FD,
        0,
        "file",
        wasi::__WASI_O_CREAT,
        wasi::__WASI_RIGHT_FD_WRITE | wasi::__WASI_RIGHT_FD_SEEK,
        0,
        0,
    )
    .unwrap();

    assert_eq!(
        hostcalls::fd_readdir(&ctx, &mut memory_buf, fd, READDIR_BUF_PTR, 64, 0, OUT_PTR),
        wasi::__WASI_ENOTCAPABLE
    );
}

#[test]
fn readdir_on_a_subdirectory_fd() {
    let (mut ctx, mut memory_buf, root) = setup("/s");

    fs::create_dir(root.path().join("sub")).unwrap();
    fs::write(root.path().join("sub").join("inner"), b"").unwrap();

    let fd = path_open(
        &mut ctx,
        &mut memory_buf,
        PREOPEN_FD,
        0,
        "sub",
        wasi::__WASI_O_DIRECTORY,
        wasi::__WASI_RIGHT_FD_READDIR,
        0,
        0,
    )
    .unwrap();

    let bufused = readdir(&ctx, &mut memory_buf, fd, 4096, 0);
    let records = parse_dirents(&memory_buf, READDIR_BUF_PTR, bufused);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, b"inner");
}
