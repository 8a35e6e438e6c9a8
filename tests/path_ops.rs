//! Path-level operations against the sandbox root: directories, links,
//! renames and stat.

mod common;

use common::*;
use std::fs;
use wasi_sandbox::{hostcalls, memory, wasi};

#[test]
fn create_and_remove_directory() {
    let (ctx, mut memory_buf, root) = setup("/s");

    let (path_ptr, path_len) = store_str(&mut memory_buf, PATH_PTR, "d");
    assert_eq!(
        hostcalls::path_create_directory(&ctx, &mut memory_buf, PREOPEN_FD, path_ptr, path_len),
        wasi::__WASI_ESUCCESS
    );
    assert!(root.path().join("d").is_dir());

    assert_eq!(
        hostcalls::path_create_directory(&ctx, &mut memory_buf, PREOPEN_FD, path_ptr, path_len),
        wasi::__WASI_EEXIST
    );

    assert_eq!(
        hostcalls::path_remove_directory(&ctx, &mut memory_buf, PREOPEN_FD, path_ptr, path_len),
        wasi::__WASI_ESUCCESS
    );
    assert!(!root.path().join("d").exists());

    assert_eq!(
        hostcalls::path_remove_directory(&ctx, &mut memory_buf, PREOPEN_FD, path_ptr, path_len),
        wasi::__WASI_ENOENT
    );
}

#[test]
fn unlink_file() {
    let (ctx, mut memory_buf, root) = setup("/s");
    fs::write(root.path().join("gone"), b"x").unwrap();

    let (path_ptr, path_len) = store_str(&mut memory_buf, PATH_PTR, "gone");
    assert_eq!(
        hostcalls::path_unlink_file(&ctx, &mut memory_buf, PREOPEN_FD, path_ptr, path_len),
        wasi::__WASI_ESUCCESS
    );
    assert!(!root.path().join("gone").exists());
}

#[test]
fn rename_within_the_sandbox() {
    let (ctx, mut memory_buf, root) = setup("/s");
    fs::write(root.path().join("old"), b"contents").unwrap();

    let (old_ptr, old_len) = store_str(&mut memory_buf, PATH_PTR, "old");
    let (new_ptr, new_len) = store_str(&mut memory_buf, PATH2_PTR, "new");
    assert_eq!(
        hostcalls::path_rename(
            &ctx,
            &mut memory_buf,
            PREOPEN_FD,
            old_ptr,
            old_len,
            PREOPEN_FD,
            new_ptr,
            new_len
        ),
        wasi::__WASI_ESUCCESS
    );
    assert!(!root.path().join("old").exists());
    assert_eq!(fs::read(root.path().join("new")).unwrap(), b"contents");
}

#[test]
fn hard_link_shares_the_inode() {
    let (ctx, mut memory_buf, root) = setup("/s");
    fs::write(root.path().join("orig"), b"shared").unwrap();

    let (old_ptr, old_len) = store_str(&mut memory_buf, PATH_PTR, "orig");
    let (new_ptr, new_len) = store_str(&mut memory_buf, PATH2_PTR, "alias");
    assert_eq!(
        hostcalls::path_link(
            &ctx,
            &mut memory_buf,
            PREOPEN_FD,
            0,
            old_ptr,
            old_len,
            PREOPEN_FD,
            new_ptr,
            new_len
        ),
        wasi::__WASI_ESUCCESS
    );
    assert_eq!(fs::read(root.path().join("alias")).unwrap(), b"shared");

    // path_filestat_get must report two links now.
    assert_eq!(
        hostcalls::path_filestat_get(
            &ctx,
            &mut memory_buf,
            PREOPEN_FD,
            0,
            old_ptr,
            old_len,
            OUT_PTR
        ),
        wasi::__WASI_ESUCCESS
    );
    assert_eq!(memory::dec_u64(&memory_buf, OUT_PTR + 24).unwrap(), 2);
}

#[test]
fn symlink_target_is_stored_verbatim_and_read_back() {
    let (ctx, mut memory_buf, root) = setup("/s");

    let (target_ptr, target_len) = store_str(&mut memory_buf, PATH_PTR, "some/target");
    let (link_ptr, link_len) = store_str(&mut memory_buf, PATH2_PTR, "link");
    assert_eq!(
        hostcalls::path_symlink(
            &ctx,
            &mut memory_buf,
            target_ptr,
            target_len,
            PREOPEN_FD,
            link_ptr,
            link_len
        ),
        wasi::__WASI_ESUCCESS
    );
    assert_eq!(
        fs::read_link(root.path().join("link")).unwrap(),
        std::path::PathBuf::from("some/target")
    );

    assert_eq!(
        hostcalls::path_readlink(
            &ctx,
            &mut memory_buf,
            PREOPEN_FD,
            link_ptr,
            link_len,
            DATA_PTR,
            64,
            OUT_PTR
        ),
        wasi::__WASI_ESUCCESS
    );
    let used = memory::dec_u32(&memory_buf, OUT_PTR).unwrap();
    assert_eq!(used, 11);
    assert_eq!(
        memory::dec_slice(&memory_buf, DATA_PTR, used).unwrap(),
        b"some/target"
    );

    // A short buffer yields a truncated target, not an error.
    assert_eq!(
        hostcalls::path_readlink(
            &ctx,
            &mut memory_buf,
            PREOPEN_FD,
            link_ptr,
            link_len,
            DATA_PTR,
            4,
            OUT_PTR
        ),
        wasi::__WASI_ESUCCESS
    );
    assert_eq!(memory::dec_u32(&memory_buf, OUT_PTR).unwrap(), 4);
    assert_eq!(memory::dec_slice(&memory_buf, DATA_PTR, 4).unwrap(), b"some");
}

#[test]
fn filestat_follows_or_inspects_symlinks() {
    let (ctx, mut memory_buf, root) = setup("/s");

    fs::write(root.path().join("real"), b"0123456").unwrap();
    std::os::unix::fs::symlink("real", root.path().join("sym")).unwrap();

    let (path_ptr, path_len) = store_str(&mut memory_buf, PATH_PTR, "sym");

    assert_eq!(
        hostcalls::path_filestat_get(
            &ctx,
            &mut memory_buf,
            PREOPEN_FD,
            wasi::__WASI_LOOKUP_SYMLINK_FOLLOW,
            path_ptr,
            path_len,
            OUT_PTR
        ),
        wasi::__WASI_ESUCCESS
    );
    assert_eq!(
        memory_buf[(OUT_PTR + 16) as usize],
        wasi::__WASI_FILETYPE_REGULAR_FILE
    );
    assert_eq!(memory::dec_u64(&memory_buf, OUT_PTR + 32).unwrap(), 7);

    assert_eq!(
        hostcalls::path_filestat_get(
            &ctx,
            &mut memory_buf,
            PREOPEN_FD,
            0,
            path_ptr,
            path_len,
            OUT_PTR
        ),
        wasi::__WASI_ESUCCESS
    );
    assert_eq!(
        memory_buf[(OUT_PTR + 16) as usize],
        wasi::__WASI_FILETYPE_SYMBOLIC_LINK
    );
}

#[test]
fn path_filestat_set_times_updates_the_file() {
    let (ctx, mut memory_buf, root) = setup("/s");
    fs::write(root.path().join("t"), b"").unwrap();

    let (path_ptr, path_len) = store_str(&mut memory_buf, PATH_PTR, "t");
    assert_eq!(
        hostcalls::path_filestat_set_times(
            &ctx,
            &mut memory_buf,
            PREOPEN_FD,
            0,
            path_ptr,
            path_len,
            5_000_000_000,
            7_000_000_000,
            wasi::__WASI_FILESTAT_SET_ATIM | wasi::__WASI_FILESTAT_SET_MTIM
        ),
        wasi::__WASI_ESUCCESS
    );
    assert_eq!(
        hostcalls::path_filestat_get(
            &ctx,
            &mut memory_buf,
            PREOPEN_FD,
            0,
            path_ptr,
            path_len,
            OUT_PTR
        ),
        wasi::__WASI_ESUCCESS
    );
    assert_eq!(
        memory::dec_u64(&memory_buf, OUT_PTR + 48).unwrap(),
        7_000_000_000
    );
}

#[test]
fn missing_rights_on_the_directory_are_detected() {
    let (mut ctx, mut memory_buf, _root) = setup("/s");

    // A file fd carries no path rights at all.
    let fd = path_open(
        &mut ctx,
        &mut memory_buf,
        PREOPEN_FD,
        0,
        "leaf",
        wasi::__WASI_O_CREAT,
        wasi::__WASI_RIGHT_FD_WRITE | wasi::__WASI_RIGHT_FD_SEEK,
        0,
        0,
    )
    .unwrap();

    let (path_ptr, path_len) = store_str(&mut memory_buf, PATH_PTR, "sub");
    assert_eq!(
        hostcalls::path_create_directory(&ctx, &mut memory_buf, fd, path_ptr, path_len),
        wasi::__WASI_ENOTCAPABLE
    );
}
