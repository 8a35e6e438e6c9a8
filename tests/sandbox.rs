//! Sandbox containment: no combination of `..`, absolute paths or
//! symlinks may reach outside a preopened root.

mod common;

use common::*;
use std::fs;
use wasi_sandbox::wasi;

#[test]
fn dotdot_escape_is_refused() {
    let (mut ctx, mut memory, _root) = setup("/s");

    let err = path_open(
        &mut ctx,
        &mut memory,
        PREOPEN_FD,
        0,
        "../etc/passwd",
        0,
        wasi::__WASI_RIGHT_FD_READ,
        0,
        0,
    )
    .unwrap_err();
    assert_eq!(err, wasi::__WASI_ENOTCAPABLE);
}

#[test]
fn deep_dotdot_escape_is_refused() {
    let (mut ctx, mut memory, _root) = setup("/s");

    let err = path_open(
        &mut ctx,
        &mut memory,
        PREOPEN_FD,
        0,
        "a/../../../../../etc/passwd",
        0,
        wasi::__WASI_RIGHT_FD_READ,
        0,
        0,
    )
    .unwrap_err();
    assert_eq!(err, wasi::__WASI_ENOTCAPABLE);
}

// `/a` being a prefix of `/ab` must not make `/ab` reachable.
#[test]
fn sibling_with_shared_prefix_is_refused() {
    let _ = pretty_env_logger::try_init();
    let outer = tempfile::TempDir::new().unwrap();
    fs::create_dir(outer.path().join("a")).unwrap();
    fs::create_dir(outer.path().join("ab")).unwrap();
    fs::write(outer.path().join("ab").join("secret"), b"secret").unwrap();

    let mut ctx = wasi_sandbox::WasiCtxBuilder::new()
        .preopened_dir(outer.path().join("a"), "/s")
        .build()
        .unwrap();
    let mut memory = vec![0u8; GUEST_MEMORY_SIZE];

    let err = path_open(
        &mut ctx,
        &mut memory,
        PREOPEN_FD,
        0,
        "../ab/secret",
        0,
        wasi::__WASI_RIGHT_FD_READ,
        0,
        0,
    )
    .unwrap_err();
    assert_eq!(err, wasi::__WASI_ENOTCAPABLE);
}

#[test]
fn symlink_escape_is_refused() {
    let (mut ctx, mut memory, root) = setup("/s");

    let outside = tempfile::TempDir::new().unwrap();
    fs::write(outside.path().join("passwd"), b"root:x:0:0").unwrap();
    std::os::unix::fs::symlink(outside.path(), root.path().join("link")).unwrap();

    let err = path_open(
        &mut ctx,
        &mut memory,
        PREOPEN_FD,
        wasi::__WASI_LOOKUP_SYMLINK_FOLLOW,
        "link/passwd",
        0,
        wasi::__WASI_RIGHT_FD_READ,
        0,
        0,
    )
    .unwrap_err();
    assert_eq!(err, wasi::__WASI_ENOTCAPABLE);
}

#[test]
fn symlink_inside_the_sandbox_is_followed() {
    let (mut ctx, mut memory, root) = setup("/s");

    fs::create_dir(root.path().join("sub")).unwrap();
    fs::write(root.path().join("sub").join("file"), b"data").unwrap();
    std::os::unix::fs::symlink("sub", root.path().join("alias")).unwrap();

    let fd = path_open(
        &mut ctx,
        &mut memory,
        PREOPEN_FD,
        wasi::__WASI_LOOKUP_SYMLINK_FOLLOW,
        "alias/file",
        0,
        wasi::__WASI_RIGHT_FD_READ,
        0,
        0,
    )
    .unwrap();
    assert!(fd > PREOPEN_FD);
}

#[test]
fn absolute_path_inside_the_sandbox_is_accepted() {
    let (mut ctx, mut memory, root) = setup("/s");

    fs::write(root.path().join("f"), b"ok").unwrap();
    let absolute = format!("{}/f", canonical_root(&root));

    let fd = path_open(
        &mut ctx,
        &mut memory,
        PREOPEN_FD,
        0,
        &absolute,
        0,
        wasi::__WASI_RIGHT_FD_READ,
        0,
        0,
    )
    .unwrap();
    assert!(fd > PREOPEN_FD);
}

#[test]
fn absolute_path_outside_the_sandbox_is_refused() {
    let (mut ctx, mut memory, _root) = setup("/s");

    let err = path_open(
        &mut ctx,
        &mut memory,
        PREOPEN_FD,
        0,
        "/etc/passwd",
        0,
        wasi::__WASI_RIGHT_FD_READ,
        0,
        0,
    )
    .unwrap_err();
    assert_eq!(err, wasi::__WASI_ENOTCAPABLE);
}

// Escapes must be caught for every path-taking operation, not only open.
#[test]
fn path_operations_share_the_containment_check() {
    let (ctx, mut memory, _root) = setup("/s");

    let (path_ptr, path_len) = store_str(&mut memory, PATH_PTR, "../victim");
    assert_eq!(
        wasi_sandbox::hostcalls::path_create_directory(
            &ctx, &mut memory, PREOPEN_FD, path_ptr, path_len
        ),
        wasi::__WASI_ENOTCAPABLE
    );
    assert_eq!(
        wasi_sandbox::hostcalls::path_unlink_file(
            &ctx, &mut memory, PREOPEN_FD, path_ptr, path_len
        ),
        wasi::__WASI_ENOTCAPABLE
    );
    assert_eq!(
        wasi_sandbox::hostcalls::path_filestat_get(
            &ctx, &mut memory, PREOPEN_FD, 0, path_ptr, path_len, OUT_PTR
        ),
        wasi::__WASI_ENOTCAPABLE
    );
}
