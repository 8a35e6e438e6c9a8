//! Clocks, randomness, scheduling, and the unimplemented surfaces.

mod common;

use common::*;
use wasi_sandbox::{hostcalls, memory, wasi};

#[test]
fn wall_clocks_report_nanosecond_resolution() {
    let (_ctx, mut memory_buf, _root) = setup("/s");

    for clock_id in &[wasi::__WASI_CLOCK_REALTIME, wasi::__WASI_CLOCK_MONOTONIC] {
        assert_eq!(
            hostcalls::clock_res_get(&mut memory_buf, *clock_id, OUT_PTR),
            wasi::__WASI_ESUCCESS
        );
        assert_eq!(memory::dec_u64(&memory_buf, OUT_PTR).unwrap(), 1);
    }
}

#[test]
fn monotonic_clock_does_not_go_backwards() {
    let (_ctx, mut memory_buf, _root) = setup("/s");

    assert_eq!(
        hostcalls::clock_time_get(&mut memory_buf, wasi::__WASI_CLOCK_MONOTONIC, 0, OUT_PTR),
        wasi::__WASI_ESUCCESS
    );
    let first = memory::dec_u64(&memory_buf, OUT_PTR).unwrap();
    assert_eq!(
        hostcalls::clock_time_get(&mut memory_buf, wasi::__WASI_CLOCK_MONOTONIC, 0, OUT_PTR),
        wasi::__WASI_ESUCCESS
    );
    let second = memory::dec_u64(&memory_buf, OUT_PTR).unwrap();
    assert!(second >= first);
}

#[test]
fn unknown_clock_is_einval() {
    let (_ctx, mut memory_buf, _root) = setup("/s");

    assert_eq!(
        hostcalls::clock_res_get(&mut memory_buf, 99, OUT_PTR),
        wasi::__WASI_EINVAL
    );
    assert_eq!(
        hostcalls::clock_time_get(&mut memory_buf, 99, 0, OUT_PTR),
        wasi::__WASI_EINVAL
    );
}

#[test]
fn random_get_fills_the_buffer() {
    let (_ctx, mut memory_buf, _root) = setup("/s");

    assert_eq!(
        hostcalls::random_get(&mut memory_buf, DATA_PTR, 256),
        wasi::__WASI_ESUCCESS
    );
    let buf = memory::dec_slice(&memory_buf, DATA_PTR, 256).unwrap();
    // 256 zero bytes from a random source would be remarkable.
    assert!(buf.iter().any(|&b| b != 0));
}

#[test]
fn out_of_bounds_guest_buffers_are_eoverflow() {
    let (ctx, mut memory_buf, _root) = setup("/s");
    let len = memory_buf.len() as u32;

    assert_eq!(
        hostcalls::random_get(&mut memory_buf, len - 4, 8),
        wasi::__WASI_EOVERFLOW
    );
    assert_eq!(
        hostcalls::clock_time_get(&mut memory_buf, wasi::__WASI_CLOCK_REALTIME, 0, len - 4),
        wasi::__WASI_EOVERFLOW
    );

    // An iovec whose buffer escapes the store is rejected before any I/O.
    store_iovec(&mut memory_buf, IOVS_PTR, 0, len - 2, 4);
    assert_eq!(
        hostcalls::fd_write(&ctx, &mut memory_buf, 1, IOVS_PTR, 1, OUT_PTR),
        wasi::__WASI_EOVERFLOW
    );
}

#[test]
fn sched_yield_succeeds() {
    let _ = pretty_env_logger::try_init();
    assert_eq!(hostcalls::sched_yield(), wasi::__WASI_ESUCCESS);
}

#[test]
fn proc_raise_rejects_unknown_signals() {
    let _ = pretty_env_logger::try_init();
    assert_eq!(hostcalls::proc_raise(200), wasi::__WASI_ENOSYS);
}

#[test]
fn polling_and_sockets_are_unsupported() {
    let (_ctx, mut memory_buf, _root) = setup("/s");

    assert_eq!(
        hostcalls::poll_oneoff(&mut memory_buf, 0, 0, 1, OUT_PTR),
        wasi::__WASI_ENOTSUP
    );
    assert_eq!(
        hostcalls::sock_recv(0, 0, 0, 0, 0, 0),
        wasi::__WASI_ENOTSUP
    );
    assert_eq!(hostcalls::sock_send(0, 0, 0, 0, 0), wasi::__WASI_ENOTSUP);
    assert_eq!(hostcalls::sock_shutdown(0, 0), wasi::__WASI_ENOTSUP);
}

#[test]
fn stdio_descriptors_are_live_from_the_start() {
    let (ctx, mut memory_buf, _root) = setup("/s");

    for fd in 0..3 {
        assert_eq!(
            hostcalls::fd_fdstat_get(&ctx, &mut memory_buf, fd, OUT_PTR),
            wasi::__WASI_ESUCCESS
        );
    }

    // Writing to stdin is a bad descriptor, not a rights failure.
    store_iovec(&mut memory_buf, IOVS_PTR, 0, DATA_PTR, 1);
    assert_eq!(
        hostcalls::fd_write(&ctx, &mut memory_buf, 0, IOVS_PTR, 1, OUT_PTR),
        wasi::__WASI_EBADF
    );
}
