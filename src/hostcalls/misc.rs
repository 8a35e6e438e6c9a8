use crate::ctx::WasiCtx;
use crate::{wasi, wasi32};
use log::trace;

hostcalls! {
    pub fn args_get(
        wasi_ctx: &WasiCtx,
        memory: &mut [u8],
        argv_ptr: wasi32::uintptr_t,
        argv_buf: wasi32::uintptr_t,
    ) -> wasi32::__wasi_errno_t;

    pub fn args_sizes_get(
        wasi_ctx: &WasiCtx,
        memory: &mut [u8],
        argc_ptr: wasi32::uintptr_t,
        argv_buf_size_ptr: wasi32::uintptr_t,
    ) -> wasi32::__wasi_errno_t;

    pub fn environ_get(
        wasi_ctx: &WasiCtx,
        memory: &mut [u8],
        environ_ptr: wasi32::uintptr_t,
        environ_buf: wasi32::uintptr_t,
    ) -> wasi32::__wasi_errno_t;

    pub fn environ_sizes_get(
        wasi_ctx: &WasiCtx,
        memory: &mut [u8],
        environ_count_ptr: wasi32::uintptr_t,
        environ_size_ptr: wasi32::uintptr_t,
    ) -> wasi32::__wasi_errno_t;

    pub fn clock_res_get(
        memory: &mut [u8],
        clock_id: wasi::__wasi_clockid_t,
        resolution_ptr: wasi32::uintptr_t,
    ) -> wasi32::__wasi_errno_t;

    pub fn clock_time_get(
        memory: &mut [u8],
        clock_id: wasi::__wasi_clockid_t,
        precision: wasi::__wasi_timestamp_t,
        time_ptr: wasi32::uintptr_t,
    ) -> wasi32::__wasi_errno_t;

    pub fn random_get(
        memory: &mut [u8],
        buf_ptr: wasi32::uintptr_t,
        buf_len: wasi32::size_t,
    ) -> wasi32::__wasi_errno_t;

    pub fn sched_yield() -> wasi32::__wasi_errno_t;

    pub fn proc_raise(
        sig: wasi::__wasi_signal_t,
    ) -> wasi32::__wasi_errno_t;

    pub fn poll_oneoff(
        memory: &mut [u8],
        input: wasi32::uintptr_t,
        output: wasi32::uintptr_t,
        nsubscriptions: wasi32::size_t,
        nevents: wasi32::uintptr_t,
    ) -> wasi32::__wasi_errno_t;

    pub fn sock_recv(
        sock: wasi::__wasi_fd_t,
        ri_data: wasi32::uintptr_t,
        ri_data_len: wasi32::size_t,
        ri_flags: u16,
        ro_datalen: wasi32::uintptr_t,
        ro_flags: wasi32::uintptr_t,
    ) -> wasi32::__wasi_errno_t;

    pub fn sock_send(
        sock: wasi::__wasi_fd_t,
        si_data: wasi32::uintptr_t,
        si_data_len: wasi32::size_t,
        si_flags: u16,
        so_datalen: wasi32::uintptr_t,
    ) -> wasi32::__wasi_errno_t;

    pub fn sock_shutdown(
        sock: wasi::__wasi_fd_t,
        how: u8,
    ) -> wasi32::__wasi_errno_t;
}

/// Terminate the guest. This calls straight into the host's process
/// exit and does not return.
pub fn proc_exit(rval: wasi::__wasi_exitcode_t) -> ! {
    trace!("proc_exit(rval={:?})", rval);

    std::process::exit(rval as i32)
}
