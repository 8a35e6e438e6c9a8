//! Clock queries. There is no nix wrapper for clock_getres or
//! clock_gettime, so both go through libc directly.

use crate::sys::host_impl;
use crate::{wasi, Error, Result};
use std::mem::MaybeUninit;

fn timespec_to_nanos(timespec: libc::timespec) -> Result<wasi::__wasi_timestamp_t> {
    (timespec.tv_sec as wasi::__wasi_timestamp_t)
        .checked_mul(1_000_000_000)
        .and_then(|sec_ns| sec_ns.checked_add(timespec.tv_nsec as wasi::__wasi_timestamp_t))
        .ok_or(Error::EOVERFLOW)
}

fn clock_getres(clock_id: libc::clockid_t) -> Result<wasi::__wasi_timestamp_t> {
    let mut timespec = MaybeUninit::<libc::timespec>::uninit();
    let res = unsafe { libc::clock_getres(clock_id, timespec.as_mut_ptr()) };
    if res != 0 {
        return Err(host_impl::errno_from_nix(nix::errno::Errno::last()));
    }
    timespec_to_nanos(unsafe { timespec.assume_init() })
}

fn clock_gettime(clock_id: libc::clockid_t) -> Result<wasi::__wasi_timestamp_t> {
    let mut timespec = MaybeUninit::<libc::timespec>::uninit();
    let res = unsafe { libc::clock_gettime(clock_id, timespec.as_mut_ptr()) };
    if res != 0 {
        return Err(host_impl::errno_from_nix(nix::errno::Errno::last()));
    }
    timespec_to_nanos(unsafe { timespec.assume_init() })
}

/// The kernel answers EINVAL for a clock id it does not support; to the
/// guest that is "this platform has no such clock", ENOSYS.
fn cputime_errno(err: Error) -> Error {
    if err == Error::EINVAL {
        Error::ENOSYS
    } else {
        err
    }
}

pub(crate) fn clock_res_get(
    clock_id: wasi::__wasi_clockid_t,
) -> Result<wasi::__wasi_timestamp_t> {
    match clock_id {
        // The wall clocks tick in nanoseconds.
        wasi::__WASI_CLOCK_MONOTONIC | wasi::__WASI_CLOCK_REALTIME => Ok(1),
        wasi::__WASI_CLOCK_PROCESS_CPUTIME_ID => {
            clock_getres(libc::CLOCK_PROCESS_CPUTIME_ID).map_err(cputime_errno)
        }
        wasi::__WASI_CLOCK_THREAD_CPUTIME_ID => {
            clock_getres(libc::CLOCK_THREAD_CPUTIME_ID).map_err(cputime_errno)
        }
        _ => Err(Error::EINVAL),
    }
}

pub(crate) fn clock_time_get(
    clock_id: wasi::__wasi_clockid_t,
) -> Result<wasi::__wasi_timestamp_t> {
    match clock_id {
        wasi::__WASI_CLOCK_MONOTONIC => clock_gettime(libc::CLOCK_MONOTONIC),
        wasi::__WASI_CLOCK_REALTIME => clock_gettime(libc::CLOCK_REALTIME),
        wasi::__WASI_CLOCK_PROCESS_CPUTIME_ID => {
            clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID).map_err(cputime_errno)
        }
        wasi::__WASI_CLOCK_THREAD_CPUTIME_ID => {
            clock_gettime(libc::CLOCK_THREAD_CPUTIME_ID).map_err(cputime_errno)
        }
        _ => Err(Error::EINVAL),
    }
}
