//! Filesystem operations: input validation, fd lookup with rights
//! enforcement, sandbox path resolution, then host I/O through
//! `crate::sys`. Results are written back to guest memory through the
//! bounds-checked bridge.
#![allow(non_camel_case_types)]

use super::fs_helpers::resolve_path;
use crate::ctx::WasiCtx;
use crate::fdentry::{Descriptor, FdEntry};
use crate::memory::*;
use crate::sys::hostcalls_impl;
use crate::{wasi, wasi32, Error, Result};
use log::trace;
use std::fs;
use std::io::{self, Read, Write};

pub(crate) fn fd_close(wasi_ctx: &mut WasiCtx, fd: wasi::__wasi_fd_t) -> Result<()> {
    trace!("fd_close(fd={:?})", fd);

    let fe = wasi_ctx.get_fd_entry(fd, 0, 0)?;
    // Sandbox roots stay open for the lifetime of the instance.
    if fe.preopen {
        return Err(Error::ENOTSUP);
    }
    wasi_ctx.fds.remove(fd)?;
    Ok(())
}

pub(crate) fn fd_datasync(wasi_ctx: &WasiCtx, fd: wasi::__wasi_fd_t) -> Result<()> {
    trace!("fd_datasync(fd={:?})", fd);

    let fe = wasi_ctx.get_fd_entry(fd, wasi::__WASI_RIGHT_FD_DATASYNC, 0)?;
    fe.descriptor.as_file()?.sync_data().map_err(Into::into)
}

pub(crate) fn fd_sync(wasi_ctx: &WasiCtx, fd: wasi::__wasi_fd_t) -> Result<()> {
    trace!("fd_sync(fd={:?})", fd);

    let fe = wasi_ctx.get_fd_entry(fd, wasi::__WASI_RIGHT_FD_SYNC, 0)?;
    fe.descriptor.as_file()?.sync_all().map_err(Into::into)
}

pub(crate) fn fd_pread(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    fd: wasi::__wasi_fd_t,
    iovs_ptr: wasi32::uintptr_t,
    iovs_len: wasi32::size_t,
    offset: wasi::__wasi_filesize_t,
    nread: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "fd_pread(fd={:?}, iovs_ptr={:#x?}, iovs_len={:?}, offset={}, nread={:#x?})",
        fd,
        iovs_ptr,
        iovs_len,
        offset,
        nread
    );

    let iovs = dec_iovecs(memory, iovs_ptr, iovs_len)?;
    let fe = wasi_ctx.get_fd_entry(
        fd,
        wasi::__WASI_RIGHT_FD_READ | wasi::__WASI_RIGHT_FD_SEEK,
        0,
    )?;
    let file = fe.descriptor.as_file()?;

    let buf_size = iovs.iter().map(|iov| iov.buf_len as usize).sum();
    let mut buf = vec![0; buf_size];
    let host_nread = hostcalls_impl::fd_pread(file, &mut buf, offset)?;

    let mut buf_offset = 0;
    let mut left = host_nread;
    for iov in &iovs {
        if left == 0 {
            break;
        }
        let vec_len = left.min(iov.buf_len as usize);
        enc_slice(memory, iov.buf, &buf[buf_offset..buf_offset + vec_len])?;
        buf_offset += vec_len;
        left -= vec_len;
    }

    trace!("     | *nread={:?}", host_nread);

    enc_usize(memory, nread, host_nread)
}

pub(crate) fn fd_pwrite(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    fd: wasi::__wasi_fd_t,
    iovs_ptr: wasi32::uintptr_t,
    iovs_len: wasi32::size_t,
    offset: wasi::__wasi_filesize_t,
    nwritten: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "fd_pwrite(fd={:?}, iovs_ptr={:#x?}, iovs_len={:?}, offset={}, nwritten={:#x?})",
        fd,
        iovs_ptr,
        iovs_len,
        offset,
        nwritten
    );

    let iovs = dec_iovecs(memory, iovs_ptr, iovs_len)?;
    let fe = wasi_ctx.get_fd_entry(
        fd,
        wasi::__WASI_RIGHT_FD_WRITE | wasi::__WASI_RIGHT_FD_SEEK,
        0,
    )?;
    let file = fe.descriptor.as_file()?;

    let buf_size = iovs.iter().map(|iov| iov.buf_len as usize).sum();
    let mut buf = Vec::with_capacity(buf_size);
    for iov in &iovs {
        buf.extend_from_slice(dec_slice(memory, iov.buf, iov.buf_len)?);
    }
    let host_nwritten = hostcalls_impl::fd_pwrite(file, &buf, offset)?;

    trace!("     | *nwritten={:?}", host_nwritten);

    enc_usize(memory, nwritten, host_nwritten)
}

pub(crate) fn fd_read(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    fd: wasi::__wasi_fd_t,
    iovs_ptr: wasi32::uintptr_t,
    iovs_len: wasi32::size_t,
    nread: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "fd_read(fd={:?}, iovs_ptr={:#x?}, iovs_len={:?}, nread={:#x?})",
        fd,
        iovs_ptr,
        iovs_len,
        nread
    );

    let iovs = dec_iovecs(memory, iovs_ptr, iovs_len)?;
    let fe = wasi_ctx.get_fd_entry(fd, wasi::__WASI_RIGHT_FD_READ, 0)?;

    let mut bufs: Vec<Vec<u8>> = iovs
        .iter()
        .map(|iov| vec![0; iov.buf_len as usize])
        .collect();
    let mut slices: Vec<io::IoSliceMut> = bufs
        .iter_mut()
        .map(|buf| io::IoSliceMut::new(buf))
        .collect();

    let host_nread = match &fe.descriptor {
        Descriptor::File(f) => (&*f).read_vectored(&mut slices),
        Descriptor::Stdin => io::stdin().lock().read_vectored(&mut slices),
        _ => return Err(Error::EBADF),
    }?;

    let mut left = host_nread;
    for (iov, buf) in iovs.iter().zip(bufs.iter()) {
        if left == 0 {
            break;
        }
        let vec_len = left.min(buf.len());
        enc_slice(memory, iov.buf, &buf[..vec_len])?;
        left -= vec_len;
    }

    trace!("     | *nread={:?}", host_nread);

    enc_usize(memory, nread, host_nread)
}

pub(crate) fn fd_write(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    fd: wasi::__wasi_fd_t,
    iovs_ptr: wasi32::uintptr_t,
    iovs_len: wasi32::size_t,
    nwritten: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "fd_write(fd={:?}, iovs_ptr={:#x?}, iovs_len={:?}, nwritten={:#x?})",
        fd,
        iovs_ptr,
        iovs_len,
        nwritten
    );

    let iovs = dec_iovecs(memory, iovs_ptr, iovs_len)?;
    let fe = wasi_ctx.get_fd_entry(fd, wasi::__WASI_RIGHT_FD_WRITE, 0)?;

    let host_nwritten = {
        let slices = iovs
            .iter()
            .map(|iov| dec_slice(memory, iov.buf, iov.buf_len).map(io::IoSlice::new))
            .collect::<Result<Vec<_>>>()?;

        match &fe.descriptor {
            Descriptor::File(f) => (&*f).write_vectored(&slices),
            Descriptor::Stdin => return Err(Error::EBADF),
            Descriptor::Stdout => io::stdout().lock().write_vectored(&slices),
            Descriptor::Stderr => io::stderr().lock().write_vectored(&slices),
        }?
    };

    trace!("     | *nwritten={:?}", host_nwritten);

    enc_usize(memory, nwritten, host_nwritten)
}

pub(crate) fn fd_seek(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    fd: wasi::__wasi_fd_t,
    offset: wasi::__wasi_filedelta_t,
    whence: wasi::__wasi_whence_t,
    newoffset: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "fd_seek(fd={:?}, offset={:?}, whence={}, newoffset={:#x?})",
        fd,
        offset,
        wasi::whence_to_str(whence),
        newoffset
    );

    let fe = wasi_ctx.get_fd_entry(fd, wasi::__WASI_RIGHT_FD_SEEK, 0)?;
    let host_newoffset = hostcalls_impl::fd_seek(fe, offset, whence)?;

    trace!("     | *newoffset={:?}", host_newoffset);

    enc_u64(memory, newoffset, host_newoffset)
}

pub(crate) fn fd_tell(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    fd: wasi::__wasi_fd_t,
    newoffset: wasi32::uintptr_t,
) -> Result<()> {
    trace!("fd_tell(fd={:?}, newoffset={:#x?})", fd, newoffset);

    let fe = wasi_ctx.get_fd_entry(fd, wasi::__WASI_RIGHT_FD_TELL, 0)?;
    let host_offset = hostcalls_impl::fd_tell(fe)?;

    trace!("     | *newoffset={:?}", host_offset);

    enc_u64(memory, newoffset, host_offset)
}

pub(crate) fn fd_fdstat_get(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    fd: wasi::__wasi_fd_t,
    fdstat_ptr: wasi32::uintptr_t,
) -> Result<()> {
    trace!("fd_fdstat_get(fd={:?}, fdstat_ptr={:#x?})", fd, fdstat_ptr);

    let fe = wasi_ctx.get_fd_entry(fd, 0, 0)?;
    let fdstat = wasi::__wasi_fdstat_t {
        fs_filetype: fe.file_type,
        fs_flags: hostcalls_impl::fd_fdstat_get(fe)?,
        fs_rights_base: fe.rights_base,
        fs_rights_inheriting: fe.rights_inheriting,
    };

    trace!("     | *fdstat_ptr={:?}", fdstat);

    enc_fdstat(memory, fdstat_ptr, &fdstat)
}

pub(crate) fn fd_fdstat_set_flags(
    wasi_ctx: &WasiCtx,
    fd: wasi::__wasi_fd_t,
    fdflags: wasi::__wasi_fdflags_t,
) -> Result<()> {
    trace!("fd_fdstat_set_flags(fd={:?}, fdflags={:#x?})", fd, fdflags);

    if fdflags
        & !(wasi::__WASI_FDFLAG_APPEND
            | wasi::__WASI_FDFLAG_DSYNC
            | wasi::__WASI_FDFLAG_NONBLOCK
            | wasi::__WASI_FDFLAG_RSYNC
            | wasi::__WASI_FDFLAG_SYNC)
        != 0
    {
        return Err(Error::EINVAL);
    }
    let fe = wasi_ctx.get_fd_entry(fd, wasi::__WASI_RIGHT_FD_FDSTAT_SET_FLAGS, 0)?;
    hostcalls_impl::fd_fdstat_set_flags(fe, fdflags)
}

pub(crate) fn fd_fdstat_set_rights(
    wasi_ctx: &mut WasiCtx,
    fd: wasi::__wasi_fd_t,
    fs_rights_base: wasi::__wasi_rights_t,
    fs_rights_inheriting: wasi::__wasi_rights_t,
) -> Result<()> {
    trace!(
        "fd_fdstat_set_rights(fd={:?}, fs_rights_base={:#x?}, fs_rights_inheriting={:#x?})",
        fd,
        fs_rights_base,
        fs_rights_inheriting
    );

    let fe = wasi_ctx.get_fd_entry_mut(fd, 0, 0)?;
    // Narrowing only; adding a right the descriptor lost (or never had)
    // is a capability violation.
    if fe.rights_base & fs_rights_base != fs_rights_base
        || fe.rights_inheriting & fs_rights_inheriting != fs_rights_inheriting
    {
        return Err(Error::ENOTCAPABLE);
    }
    fe.rights_base = fs_rights_base;
    fe.rights_inheriting = fs_rights_inheriting;
    Ok(())
}

pub(crate) fn fd_filestat_get(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    fd: wasi::__wasi_fd_t,
    filestat_ptr: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "fd_filestat_get(fd={:?}, filestat_ptr={:#x?})",
        fd,
        filestat_ptr
    );

    let fe = wasi_ctx.get_fd_entry(fd, wasi::__WASI_RIGHT_FD_FILESTAT_GET, 0)?;
    let filestat = hostcalls_impl::fd_filestat_get(fe)?;

    trace!("     | *filestat_ptr={:?}", filestat);

    enc_filestat(memory, filestat_ptr, &filestat)
}

pub(crate) fn fd_filestat_set_size(
    wasi_ctx: &WasiCtx,
    fd: wasi::__wasi_fd_t,
    st_size: wasi::__wasi_filesize_t,
) -> Result<()> {
    trace!("fd_filestat_set_size(fd={:?}, st_size={})", fd, st_size);

    let fe = wasi_ctx.get_fd_entry(fd, wasi::__WASI_RIGHT_FD_FILESTAT_SET_SIZE, 0)?;
    // The host truncate takes a signed offset.
    if st_size > i64::max_value() as u64 {
        return Err(Error::E2BIG);
    }
    fe.descriptor.as_file()?.set_len(st_size).map_err(Into::into)
}

fn check_fst_flags(fst_flags: wasi::__wasi_fstflags_t) -> Result<()> {
    if fst_flags
        & !(wasi::__WASI_FILESTAT_SET_ATIM
            | wasi::__WASI_FILESTAT_SET_ATIM_NOW
            | wasi::__WASI_FILESTAT_SET_MTIM
            | wasi::__WASI_FILESTAT_SET_MTIM_NOW)
        != 0
    {
        return Err(Error::EINVAL);
    }
    let atim_conflict = wasi::__WASI_FILESTAT_SET_ATIM | wasi::__WASI_FILESTAT_SET_ATIM_NOW;
    let mtim_conflict = wasi::__WASI_FILESTAT_SET_MTIM | wasi::__WASI_FILESTAT_SET_MTIM_NOW;
    if fst_flags & atim_conflict == atim_conflict || fst_flags & mtim_conflict == mtim_conflict {
        return Err(Error::EINVAL);
    }
    Ok(())
}

pub(crate) fn fd_filestat_set_times(
    wasi_ctx: &WasiCtx,
    fd: wasi::__wasi_fd_t,
    st_atim: wasi::__wasi_timestamp_t,
    st_mtim: wasi::__wasi_timestamp_t,
    fst_flags: wasi::__wasi_fstflags_t,
) -> Result<()> {
    trace!(
        "fd_filestat_set_times(fd={:?}, st_atim={}, st_mtim={}, fst_flags={:#x?})",
        fd,
        st_atim,
        st_mtim,
        fst_flags
    );

    check_fst_flags(fst_flags)?;
    let fe = wasi_ctx.get_fd_entry(fd, wasi::__WASI_RIGHT_FD_FILESTAT_SET_TIMES, 0)?;
    hostcalls_impl::fd_filestat_set_times(
        fe.descriptor.as_file()?,
        st_atim,
        st_mtim,
        fst_flags,
    )
}

pub(crate) fn fd_advise(
    wasi_ctx: &WasiCtx,
    fd: wasi::__wasi_fd_t,
    offset: wasi::__wasi_filesize_t,
    len: wasi::__wasi_filesize_t,
    advice: wasi::__wasi_advice_t,
) -> Result<()> {
    trace!(
        "fd_advise(fd={:?}, offset={}, len={}, advice={:?})",
        fd,
        offset,
        len,
        advice
    );

    let fe = wasi_ctx.get_fd_entry(fd, wasi::__WASI_RIGHT_FD_ADVISE, 0)?;
    hostcalls_impl::fd_advise(fe, advice, offset, len)
}

pub(crate) fn fd_allocate(
    wasi_ctx: &WasiCtx,
    fd: wasi::__wasi_fd_t,
    offset: wasi::__wasi_filesize_t,
    len: wasi::__wasi_filesize_t,
) -> Result<()> {
    trace!("fd_allocate(fd={:?}, offset={}, len={})", fd, offset, len);

    let fe = wasi_ctx.get_fd_entry(fd, wasi::__WASI_RIGHT_FD_ALLOCATE, 0)?;
    let wanted_size = offset.checked_add(len).ok_or(Error::E2BIG)?;
    if wanted_size > i64::max_value() as u64 {
        return Err(Error::E2BIG);
    }
    hostcalls_impl::fd_allocate(fe.descriptor.as_file()?, offset, len)
}

pub(crate) fn fd_readdir(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    fd: wasi::__wasi_fd_t,
    buf: wasi32::uintptr_t,
    buf_len: wasi32::size_t,
    cookie: wasi::__wasi_dircookie_t,
    buf_used: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "fd_readdir(fd={:?}, buf={:#x?}, buf_len={}, cookie={:#x?}, buf_used={:#x?})",
        fd,
        buf,
        buf_len,
        cookie,
        buf_used
    );

    enc_usize(memory, buf_used, 0)?;
    let fe = wasi_ctx.get_fd_entry(fd, wasi::__WASI_RIGHT_FD_READDIR, 0)?;
    let real_path = fe.real_path()?.to_owned();
    let host_buf = dec_slice_mut(memory, buf, buf_len)?;

    let host_bufused = hostcalls_impl::fd_readdir(&real_path, host_buf, cookie)?;

    trace!("     | *buf_used={:?}", host_bufused);

    enc_usize(memory, buf_used, host_bufused)
}

pub(crate) fn fd_renumber(
    wasi_ctx: &mut WasiCtx,
    from: wasi::__wasi_fd_t,
    to: wasi::__wasi_fd_t,
) -> Result<()> {
    trace!("fd_renumber(from={:?}, to={:?})", from, to);

    wasi_ctx.fds.renumber(from, to)
}

pub(crate) fn fd_prestat_get(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    fd: wasi::__wasi_fd_t,
    prestat_ptr: wasi32::uintptr_t,
) -> Result<()> {
    trace!("fd_prestat_get(fd={:?}, prestat_ptr={:#x?})", fd, prestat_ptr);

    let fe = wasi_ctx.get_fd_entry(fd, 0, 0)?;
    if !fe.preopen {
        return Err(Error::EINVAL);
    }
    let guest_path = fe.guest_path.as_ref().ok_or(Error::EINVAL)?;
    let prestat = wasi::__wasi_prestat_t {
        pr_type: wasi::__WASI_PREOPENTYPE_DIR,
        // Length of the mapped path including its NUL terminator.
        pr_name_len: (guest_path.len() + 1) as u32,
    };

    trace!("     | *prestat_ptr={:?}", prestat);

    enc_prestat(memory, prestat_ptr, &prestat)
}

pub(crate) fn fd_prestat_dir_name(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    fd: wasi::__wasi_fd_t,
    path_ptr: wasi32::uintptr_t,
    path_len: wasi32::size_t,
) -> Result<()> {
    trace!(
        "fd_prestat_dir_name(fd={:?}, path_ptr={:#x?}, path_len={})",
        fd,
        path_ptr,
        path_len
    );

    let fe = wasi_ctx.get_fd_entry(fd, 0, 0)?;
    if !fe.preopen {
        return Err(Error::EBADF);
    }
    let guest_path = fe.guest_path.as_ref().ok_or(Error::EBADF)?;
    let mut bytes = guest_path.as_bytes().to_vec();
    bytes.push(0);
    if bytes.len() > path_len as usize {
        return Err(Error::ENOBUFS);
    }

    trace!("     | (path_ptr,path_len)='{}'", guest_path);

    enc_slice(memory, path_ptr, &bytes)
}

pub(crate) fn path_create_directory(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    dirfd: wasi::__wasi_fd_t,
    path_ptr: wasi32::uintptr_t,
    path_len: wasi32::size_t,
) -> Result<()> {
    trace!(
        "path_create_directory(dirfd={:?}, path_ptr={:#x?}, path_len={})",
        dirfd,
        path_ptr,
        path_len
    );

    let path = dec_path(memory, path_ptr, path_len)?;

    trace!("     | (path_ptr,path_len)='{}'", path);

    let fe = wasi_ctx.get_fd_entry(dirfd, wasi::__WASI_RIGHT_PATH_CREATE_DIRECTORY, 0)?;
    let resolved = resolve_path(fe, path, false)?;
    fs::create_dir(&resolved).map_err(Into::into)
}

pub(crate) fn path_remove_directory(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    dirfd: wasi::__wasi_fd_t,
    path_ptr: wasi32::uintptr_t,
    path_len: wasi32::size_t,
) -> Result<()> {
    trace!(
        "path_remove_directory(dirfd={:?}, path_ptr={:#x?}, path_len={})",
        dirfd,
        path_ptr,
        path_len
    );

    let path = dec_path(memory, path_ptr, path_len)?;

    trace!("     | (path_ptr,path_len)='{}'", path);

    let fe = wasi_ctx.get_fd_entry(dirfd, wasi::__WASI_RIGHT_PATH_REMOVE_DIRECTORY, 0)?;
    let resolved = resolve_path(fe, path, false)?;
    fs::remove_dir(&resolved).map_err(Into::into)
}

pub(crate) fn path_unlink_file(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    dirfd: wasi::__wasi_fd_t,
    path_ptr: wasi32::uintptr_t,
    path_len: wasi32::size_t,
) -> Result<()> {
    trace!(
        "path_unlink_file(dirfd={:?}, path_ptr={:#x?}, path_len={})",
        dirfd,
        path_ptr,
        path_len
    );

    let path = dec_path(memory, path_ptr, path_len)?;

    trace!("     | (path_ptr,path_len)='{}'", path);

    let fe = wasi_ctx.get_fd_entry(dirfd, wasi::__WASI_RIGHT_PATH_UNLINK_FILE, 0)?;
    let resolved = resolve_path(fe, path, false)?;
    fs::remove_file(&resolved).map_err(Into::into)
}

pub(crate) fn path_filestat_get(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    dirfd: wasi::__wasi_fd_t,
    dirflags: wasi::__wasi_lookupflags_t,
    path_ptr: wasi32::uintptr_t,
    path_len: wasi32::size_t,
    filestat_ptr: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "path_filestat_get(dirfd={:?}, dirflags={:?}, path_ptr={:#x?}, path_len={}, filestat_ptr={:#x?})",
        dirfd,
        dirflags,
        path_ptr,
        path_len,
        filestat_ptr
    );

    let path = dec_path(memory, path_ptr, path_len)?;

    trace!("     | (path_ptr,path_len)='{}'", path);

    let follow = dirflags & wasi::__WASI_LOOKUP_SYMLINK_FOLLOW != 0;
    let fe = wasi_ctx.get_fd_entry(dirfd, wasi::__WASI_RIGHT_PATH_FILESTAT_GET, 0)?;
    let resolved = resolve_path(fe, path, follow)?;
    let filestat = hostcalls_impl::path_filestat_get(&resolved, follow)?;

    trace!("     | *filestat_ptr={:?}", filestat);

    enc_filestat(memory, filestat_ptr, &filestat)
}

pub(crate) fn path_filestat_set_times(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    dirfd: wasi::__wasi_fd_t,
    dirflags: wasi::__wasi_lookupflags_t,
    path_ptr: wasi32::uintptr_t,
    path_len: wasi32::size_t,
    st_atim: wasi::__wasi_timestamp_t,
    st_mtim: wasi::__wasi_timestamp_t,
    fst_flags: wasi::__wasi_fstflags_t,
) -> Result<()> {
    trace!(
        "path_filestat_set_times(dirfd={:?}, dirflags={:?}, path_ptr={:#x?}, path_len={}, st_atim={}, st_mtim={}, fst_flags={:#x?})",
        dirfd,
        dirflags,
        path_ptr,
        path_len,
        st_atim,
        st_mtim,
        fst_flags
    );

    let path = dec_path(memory, path_ptr, path_len)?;

    trace!("     | (path_ptr,path_len)='{}'", path);

    check_fst_flags(fst_flags)?;
    let follow = dirflags & wasi::__WASI_LOOKUP_SYMLINK_FOLLOW != 0;
    let fe = wasi_ctx.get_fd_entry(dirfd, wasi::__WASI_RIGHT_PATH_FILESTAT_SET_TIMES, 0)?;
    let resolved = resolve_path(fe, path, follow)?;
    hostcalls_impl::path_filestat_set_times(&resolved, follow, st_atim, st_mtim, fst_flags)
}

pub(crate) fn path_link(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    old_dirfd: wasi::__wasi_fd_t,
    old_flags: wasi::__wasi_lookupflags_t,
    old_path_ptr: wasi32::uintptr_t,
    old_path_len: wasi32::size_t,
    new_dirfd: wasi::__wasi_fd_t,
    new_path_ptr: wasi32::uintptr_t,
    new_path_len: wasi32::size_t,
) -> Result<()> {
    trace!(
        "path_link(old_dirfd={:?}, old_flags={:?}, old_path_ptr={:#x?}, old_path_len={}, new_dirfd={:?}, new_path_ptr={:#x?}, new_path_len={})",
        old_dirfd,
        old_flags,
        old_path_ptr,
        old_path_len,
        new_dirfd,
        new_path_ptr,
        new_path_len
    );

    let old_path = dec_path(memory, old_path_ptr, old_path_len)?;
    let new_path = dec_path(memory, new_path_ptr, new_path_len)?;

    trace!("     | (old_path_ptr,old_path_len)='{}'", old_path);
    trace!("     | (new_path_ptr,new_path_len)='{}'", new_path);

    let follow = old_flags & wasi::__WASI_LOOKUP_SYMLINK_FOLLOW != 0;
    let old_fe = wasi_ctx.get_fd_entry(old_dirfd, wasi::__WASI_RIGHT_PATH_LINK_SOURCE, 0)?;
    let new_fe = wasi_ctx.get_fd_entry(new_dirfd, wasi::__WASI_RIGHT_PATH_LINK_TARGET, 0)?;
    let resolved_old = resolve_path(old_fe, old_path, follow)?;
    let resolved_new = resolve_path(new_fe, new_path, false)?;
    fs::hard_link(&resolved_old, &resolved_new).map_err(Into::into)
}

pub(crate) fn path_rename(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    old_dirfd: wasi::__wasi_fd_t,
    old_path_ptr: wasi32::uintptr_t,
    old_path_len: wasi32::size_t,
    new_dirfd: wasi::__wasi_fd_t,
    new_path_ptr: wasi32::uintptr_t,
    new_path_len: wasi32::size_t,
) -> Result<()> {
    trace!(
        "path_rename(old_dirfd={:?}, old_path_ptr={:#x?}, old_path_len={:?}, new_dirfd={:?}, new_path_ptr={:#x?}, new_path_len={:?})",
        old_dirfd,
        old_path_ptr,
        old_path_len,
        new_dirfd,
        new_path_ptr,
        new_path_len
    );

    let old_path = dec_path(memory, old_path_ptr, old_path_len)?;
    let new_path = dec_path(memory, new_path_ptr, new_path_len)?;

    trace!("     | (old_path_ptr,old_path_len)='{}'", old_path);
    trace!("     | (new_path_ptr,new_path_len)='{}'", new_path);

    let old_fe = wasi_ctx.get_fd_entry(old_dirfd, wasi::__WASI_RIGHT_PATH_RENAME_SOURCE, 0)?;
    let new_fe = wasi_ctx.get_fd_entry(new_dirfd, wasi::__WASI_RIGHT_PATH_RENAME_TARGET, 0)?;
    let resolved_old = resolve_path(old_fe, old_path, false)?;
    let resolved_new = resolve_path(new_fe, new_path, false)?;
    fs::rename(&resolved_old, &resolved_new).map_err(Into::into)
}

pub(crate) fn path_symlink(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    old_path_ptr: wasi32::uintptr_t,
    old_path_len: wasi32::size_t,
    dirfd: wasi::__wasi_fd_t,
    new_path_ptr: wasi32::uintptr_t,
    new_path_len: wasi32::size_t,
) -> Result<()> {
    trace!(
        "path_symlink(old_path_ptr={:#x?}, old_path_len={}, dirfd={:?}, new_path_ptr={:#x?}, new_path_len={})",
        old_path_ptr,
        old_path_len,
        dirfd,
        new_path_ptr,
        new_path_len
    );

    let old_path = dec_path(memory, old_path_ptr, old_path_len)?;
    let new_path = dec_path(memory, new_path_ptr, new_path_len)?;

    trace!("     | (old_path_ptr,old_path_len)='{}'", old_path);
    trace!("     | (new_path_ptr,new_path_len)='{}'", new_path);

    let fe = wasi_ctx.get_fd_entry(dirfd, wasi::__WASI_RIGHT_PATH_SYMLINK, 0)?;
    // Only the link location is resolved. The link contents are
    // guest-opaque and stored verbatim; they are not required to be a
    // valid host path.
    let resolved_new = resolve_path(fe, new_path, false)?;
    hostcalls_impl::path_symlink(old_path, &resolved_new)
}

pub(crate) fn path_readlink(
    wasi_ctx: &WasiCtx,
    memory: &mut [u8],
    dirfd: wasi::__wasi_fd_t,
    path_ptr: wasi32::uintptr_t,
    path_len: wasi32::size_t,
    buf_ptr: wasi32::uintptr_t,
    buf_len: wasi32::size_t,
    buf_used: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "path_readlink(dirfd={:?}, path_ptr={:#x?}, path_len={:?}, buf_ptr={:#x?}, buf_len={}, buf_used={:#x?})",
        dirfd,
        path_ptr,
        path_len,
        buf_ptr,
        buf_len,
        buf_used
    );

    enc_usize(memory, buf_used, 0)?;
    let path = dec_path(memory, path_ptr, path_len)?;

    trace!("     | (path_ptr,path_len)='{}'", path);

    let fe = wasi_ctx.get_fd_entry(dirfd, wasi::__WASI_RIGHT_PATH_READLINK, 0)?;
    let resolved = resolve_path(fe, path, false)?;
    let target = fs::read_link(&resolved)?;
    let target = target.to_str().ok_or(Error::EILSEQ)?.as_bytes();

    // Truncated to the guest buffer, no terminator; the guest learns
    // the copied length from buf_used.
    let host_bufused = target.len().min(buf_len as usize);
    enc_slice(memory, buf_ptr, &target[..host_bufused])?;

    trace!("     | *buf_used={:?}", host_bufused);

    enc_usize(memory, buf_used, host_bufused)
}

pub(crate) fn path_open(
    wasi_ctx: &mut WasiCtx,
    memory: &mut [u8],
    dirfd: wasi::__wasi_fd_t,
    dirflags: wasi::__wasi_lookupflags_t,
    path_ptr: wasi32::uintptr_t,
    path_len: wasi32::size_t,
    oflags: wasi::__wasi_oflags_t,
    fs_rights_base: wasi::__wasi_rights_t,
    fs_rights_inheriting: wasi::__wasi_rights_t,
    fs_flags: wasi::__wasi_fdflags_t,
    fd_out_ptr: wasi32::uintptr_t,
) -> Result<()> {
    trace!(
        "path_open(dirfd={:?}, dirflags={:?}, path_ptr={:#x?}, path_len={:?}, oflags={:#x?}, fs_rights_base={:#x?}, fs_rights_inheriting={:#x?}, fs_flags={:#x?}, fd_out_ptr={:#x?})",
        dirfd,
        dirflags,
        path_ptr,
        path_len,
        oflags,
        fs_rights_base,
        fs_rights_inheriting,
        fs_flags,
        fd_out_ptr
    );

    let path = dec_path(memory, path_ptr, path_len)?;

    trace!("     | (path_ptr,path_len)='{}'", path);

    // The requested base rights decide the host open mode.
    let read = fs_rights_base
        & (wasi::__WASI_RIGHT_FD_READ | wasi::__WASI_RIGHT_FD_READDIR)
        != 0;
    let write = fs_rights_base
        & (wasi::__WASI_RIGHT_FD_DATASYNC
            | wasi::__WASI_RIGHT_FD_WRITE
            | wasi::__WASI_RIGHT_FD_ALLOCATE
            | wasi::__WASI_RIGHT_FD_FILESTAT_SET_SIZE)
        != 0;

    // Rights the directory descriptor must hold for this open.
    let mut needed_base = wasi::__WASI_RIGHT_PATH_OPEN;
    let mut needed_inheriting = fs_rights_base | fs_rights_inheriting;
    if oflags & wasi::__WASI_O_CREAT != 0 {
        needed_base |= wasi::__WASI_RIGHT_PATH_CREATE_FILE;
    }
    if oflags & wasi::__WASI_O_TRUNC != 0 {
        needed_base |= wasi::__WASI_RIGHT_PATH_FILESTAT_SET_SIZE;
    }
    if fs_flags & wasi::__WASI_FDFLAG_DSYNC != 0 {
        needed_inheriting |= wasi::__WASI_RIGHT_FD_DATASYNC;
    }
    if fs_flags & (wasi::__WASI_FDFLAG_RSYNC | wasi::__WASI_FDFLAG_SYNC) != 0 {
        needed_inheriting |= wasi::__WASI_RIGHT_FD_SYNC;
    }
    if write
        && fs_flags & wasi::__WASI_FDFLAG_APPEND == 0
        && oflags & wasi::__WASI_O_TRUNC == 0
    {
        needed_inheriting |= wasi::__WASI_RIGHT_FD_SEEK;
    }

    let follow = dirflags & wasi::__WASI_LOOKUP_SYMLINK_FOLLOW != 0;
    let resolved = {
        let dirfe = wasi_ctx.get_fd_entry(dirfd, needed_base, needed_inheriting)?;
        resolve_path(dirfe, path, follow)?
    };

    let file = hostcalls_impl::path_open(&resolved, read, write, oflags, fs_flags)?;
    let fe = FdEntry::from_file(file, resolved, fs_rights_base, fs_rights_inheriting)?;

    // Not every host honors O_DIRECTORY, so enforce it here as well.
    // Dropping the entry closes the freshly opened handle.
    if oflags & wasi::__WASI_O_DIRECTORY != 0
        && fe.file_type != wasi::__WASI_FILETYPE_DIRECTORY
    {
        return Err(Error::ENOTDIR);
    }

    let guest_fd = wasi_ctx.insert_fd_entry(fe)?;

    trace!("     | *fd={:?}", guest_fd);

    enc_u32(memory, fd_out_ptr, guest_fd)
}
