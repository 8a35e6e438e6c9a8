//! Non-filesystem operations: argument/environment copy-out, clocks,
//! randomness, scheduling and signals. The polling and socket entry
//! points are stubs until the upstream protocol stabilizes.
#![allow(non_camel_case_types)]

use crate::ctx::WasiCtx;
use crate::memory::*;
use crate::sys::{host_impl, hostcalls_impl};
use crate::{wasi, wasi32, Error, Result};
use log::trace;
use std::convert::TryFrom;

pub(crate) fn args_get(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    argv_ptr: wasi32::uintptr_t,
    argv_buf: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "args_get(argv_ptr={:#x?}, argv_buf={:#x?})",
        argv_ptr,
        argv_buf
    );

    let mut argv_buf_offset = 0;
    let mut argv = vec![];

    for arg in wasi_ctx.args.iter() {
        let arg_bytes = arg.as_bytes_with_nul();
        let arg_ptr = argv_buf
            .checked_add(argv_buf_offset)
            .ok_or(Error::EOVERFLOW)?;

        enc_slice(memory, arg_ptr, arg_bytes)?;
        argv.push(arg_ptr);

        let len = wasi32::uintptr_t::try_from(arg_bytes.len())?;
        argv_buf_offset = argv_buf_offset.checked_add(len).ok_or(Error::EOVERFLOW)?;
    }

    for (idx, arg_ptr) in argv.iter().enumerate() {
        let slot = argv_ptr
            .checked_add((idx * 4) as wasi32::uintptr_t)
            .ok_or(Error::EOVERFLOW)?;
        enc_u32(memory, slot, *arg_ptr)?;
    }

    Ok(())
}

pub(crate) fn args_sizes_get(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    argc_ptr: wasi32::uintptr_t,
    argv_buf_size_ptr: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "args_sizes_get(argc_ptr={:#x?}, argv_buf_size_ptr={:#x?})",
        argc_ptr,
        argv_buf_size_ptr
    );

    let argc = wasi_ctx.args.len();
    let argv_size = wasi_ctx
        .args
        .iter()
        .map(|arg| arg.as_bytes_with_nul().len())
        .sum();

    trace!("     | *argc_ptr={:?}", argc);
    trace!("     | *argv_buf_size_ptr={:?}", argv_size);

    enc_usize(memory, argc_ptr, argc)?;
    enc_usize(memory, argv_buf_size_ptr, argv_size)
}

pub(crate) fn environ_get(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    environ_ptr: wasi32::uintptr_t,
    environ_buf: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "environ_get(environ_ptr={:#x?}, environ_buf={:#x?})",
        environ_ptr,
        environ_buf
    );

    let mut environ_buf_offset = 0;
    let mut environ = vec![];

    for pair in wasi_ctx.env.iter() {
        let env_bytes = pair.as_bytes_with_nul();
        let env_ptr = environ_buf
            .checked_add(environ_buf_offset)
            .ok_or(Error::EOVERFLOW)?;

        enc_slice(memory, env_ptr, env_bytes)?;
        environ.push(env_ptr);

        let len = wasi32::uintptr_t::try_from(env_bytes.len())?;
        environ_buf_offset = environ_buf_offset
            .checked_add(len)
            .ok_or(Error::EOVERFLOW)?;
    }

    for (idx, env_ptr) in environ.iter().enumerate() {
        let slot = environ_ptr
            .checked_add((idx * 4) as wasi32::uintptr_t)
            .ok_or(Error::EOVERFLOW)?;
        enc_u32(memory, slot, *env_ptr)?;
    }

    Ok(())
}

pub(crate) fn environ_sizes_get(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    environ_count_ptr: wasi32::uintptr_t,
    environ_size_ptr: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "environ_sizes_get(environ_count_ptr={:#x?}, environ_size_ptr={:#x?})",
        environ_count_ptr,
        environ_size_ptr
    );

    let environ_count = wasi_ctx.env.len();
    let environ_size = wasi_ctx
        .env
        .iter()
        .map(|pair| pair.as_bytes_with_nul().len())
        .sum();

    trace!("     | *environ_count_ptr={:?}", environ_count);
    trace!("     | *environ_size_ptr={:?}", environ_size);

    enc_usize(memory, environ_count_ptr, environ_count)?;
    enc_usize(memory, environ_size_ptr, environ_size)
}

pub(crate) fn clock_res_get(
    memory: &mut [u8],
    clock_id: wasi::__wasi_clockid_t,
    resolution_ptr: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "clock_res_get(clock_id={:?}, resolution_ptr={:#x?})",
        clock_id,
        resolution_ptr
    );

    let resolution = hostcalls_impl::clock_res_get(clock_id)?;

    trace!("     | *resolution_ptr={:?}", resolution);

    enc_u64(memory, resolution_ptr, resolution)
}

pub(crate) fn clock_time_get(
    memory: &mut [u8],
    clock_id: wasi::__wasi_clockid_t,
    precision: wasi::__wasi_timestamp_t,
    time_ptr: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "clock_time_get(clock_id={:?}, precision={:?}, time_ptr={:#x?})",
        clock_id,
        precision,
        time_ptr
    );

    // `precision` is advisory.
    let time = hostcalls_impl::clock_time_get(clock_id)?;

    trace!("     | *time_ptr={:?}", time);

    enc_u64(memory, time_ptr, time)
}

pub(crate) fn random_get(
    memory: &mut [u8],
    buf_ptr: wasi32::uintptr_t,
    buf_len: wasi32::size_t,
) -> Result<()> {
    use rand::{thread_rng, RngCore};

    trace!("random_get(buf_ptr={:#x?}, buf_len={:?})", buf_ptr, buf_len);

    let buf = dec_slice_mut(memory, buf_ptr, buf_len)?;
    thread_rng().fill_bytes(buf);

    Ok(())
}

pub(crate) fn sched_yield() -> Result<()> {
    trace!("sched_yield()");

    std::thread::yield_now();

    Ok(())
}

pub(crate) fn proc_raise(sig: wasi::__wasi_signal_t) -> Result<()> {
    trace!("proc_raise(sig={:?})", sig);

    let signal = host_impl::signal_from_wasi(sig).ok_or(Error::ENOSYS)?;
    nix::sys::signal::raise(signal).map_err(Into::into)
}

pub(crate) fn poll_oneoff(
    _memory: &mut [u8],
    input: wasi32::uintptr_t,
    output: wasi32::uintptr_t,
    nsubscriptions: wasi32::size_t,
    nevents: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "poll_oneoff(input={:#x?}, output={:#x?}, nsubscriptions={}, nevents={:#x?})",
        input,
        output,
        nsubscriptions,
        nevents
    );

    // Pending the upstream event protocol.
    Err(Error::ENOTSUP)
}

pub(crate) fn sock_recv(
    sock: wasi::__wasi_fd_t,
    ri_data: wasi32::uintptr_t,
    ri_data_len: wasi32::size_t,
    ri_flags: u16,
    ro_datalen: wasi32::uintptr_t,
    ro_flags: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "sock_recv(sock={:?}, ri_data={:#x?}, ri_data_len={}, ri_flags={:#x?}, ro_datalen={:#x?}, ro_flags={:#x?})",
        sock,
        ri_data,
        ri_data_len,
        ri_flags,
        ro_datalen,
        ro_flags
    );

    Err(Error::ENOTSUP)
}

pub(crate) fn sock_send(
    sock: wasi::__wasi_fd_t,
    si_data: wasi32::uintptr_t,
    si_data_len: wasi32::size_t,
    si_flags: u16,
    so_datalen: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "sock_send(sock={:?}, si_data={:#x?}, si_data_len={}, si_flags={:#x?}, so_datalen={:#x?})",
        sock,
        si_data,
        si_data_len,
        si_flags,
        so_datalen
    );

    Err(Error::ENOTSUP)
}

pub(crate) fn sock_shutdown(sock: wasi::__wasi_fd_t, how: u8) -> Result<()> {
    trace!("sock_shutdown(sock={:?}, how={:?})", sock, how);

    Err(Error::ENOTSUP)
}
