//! Filesystem host calls that need raw POSIX interfaces. The sandbox
//! logic lives a layer up; everything here receives host paths that
//! already passed the containment check, or descriptors that already
//! passed the rights check.

use crate::fdentry::FdEntry;
use crate::sys::host_impl;
use crate::{memory, wasi, Error, Result};
use filetime::FileTime;
use nix::errno::Errno;
use std::convert::TryInto;
use std::ffi::{CStr, CString};
use std::fs;
use std::os::raw::c_long;
use std::os::unix::fs::FileExt;
use std::os::unix::prelude::{AsRawFd, FromRawFd};
use std::path::Path;

pub(crate) fn fd_pread(
    file: &fs::File,
    buf: &mut [u8],
    offset: wasi::__wasi_filesize_t,
) -> Result<usize> {
    file.read_at(buf, offset).map_err(Into::into)
}

pub(crate) fn fd_pwrite(
    file: &fs::File,
    buf: &[u8],
    offset: wasi::__wasi_filesize_t,
) -> Result<usize> {
    file.write_at(buf, offset).map_err(Into::into)
}

pub(crate) fn fd_seek(
    fd_entry: &FdEntry,
    offset: wasi::__wasi_filedelta_t,
    whence: wasi::__wasi_whence_t,
) -> Result<u64> {
    use nix::unistd::{lseek, Whence};

    let nwhence = match whence {
        wasi::__WASI_WHENCE_SET => Whence::SeekSet,
        wasi::__WASI_WHENCE_CUR => Whence::SeekCur,
        wasi::__WASI_WHENCE_END => Whence::SeekEnd,
        _ => return Err(Error::EINVAL),
    };
    let newoffset = lseek(fd_entry.descriptor.as_raw_fd(), offset, nwhence)?;
    Ok(newoffset as u64)
}

pub(crate) fn fd_tell(fd_entry: &FdEntry) -> Result<u64> {
    use nix::unistd::{lseek, Whence};

    let newoffset = lseek(fd_entry.descriptor.as_raw_fd(), 0, Whence::SeekCur)?;
    Ok(newoffset as u64)
}

pub(crate) fn fd_fdstat_get(fd_entry: &FdEntry) -> Result<wasi::__wasi_fdflags_t> {
    use nix::fcntl::{fcntl, FcntlArg, OFlag};

    let flags = fcntl(fd_entry.descriptor.as_raw_fd(), FcntlArg::F_GETFL)?;
    Ok(host_impl::fdflags_from_nix(OFlag::from_bits_truncate(
        flags,
    )))
}

pub(crate) fn fd_fdstat_set_flags(
    fd_entry: &FdEntry,
    fdflags: wasi::__wasi_fdflags_t,
) -> Result<()> {
    use nix::fcntl::{fcntl, FcntlArg};

    let nix_flags = host_impl::nix_from_fdflags(fdflags);
    fcntl(
        fd_entry.descriptor.as_raw_fd(),
        FcntlArg::F_SETFL(nix_flags),
    )?;
    Ok(())
}

pub(crate) fn fd_advise(
    fd_entry: &FdEntry,
    advice: wasi::__wasi_advice_t,
    offset: wasi::__wasi_filesize_t,
    len: wasi::__wasi_filesize_t,
) -> Result<()> {
    #[cfg(target_os = "linux")]
    {
        use nix::fcntl::{posix_fadvise, PosixFadviseAdvice};

        let host_advice = match advice {
            wasi::__WASI_ADVICE_NORMAL => PosixFadviseAdvice::POSIX_FADV_NORMAL,
            wasi::__WASI_ADVICE_SEQUENTIAL => PosixFadviseAdvice::POSIX_FADV_SEQUENTIAL,
            wasi::__WASI_ADVICE_RANDOM => PosixFadviseAdvice::POSIX_FADV_RANDOM,
            wasi::__WASI_ADVICE_WILLNEED => PosixFadviseAdvice::POSIX_FADV_WILLNEED,
            wasi::__WASI_ADVICE_DONTNEED => PosixFadviseAdvice::POSIX_FADV_DONTNEED,
            wasi::__WASI_ADVICE_NOREUSE => PosixFadviseAdvice::POSIX_FADV_NOREUSE,
            _ => return Err(Error::EINVAL),
        };
        posix_fadvise(
            fd_entry.descriptor.as_raw_fd(),
            offset.try_into()?,
            len.try_into()?,
            host_advice,
        )?;
    }

    #[cfg(not(target_os = "linux"))]
    {
        let _ = (fd_entry, offset, len);
        match advice {
            wasi::__WASI_ADVICE_NORMAL
            | wasi::__WASI_ADVICE_SEQUENTIAL
            | wasi::__WASI_ADVICE_RANDOM
            | wasi::__WASI_ADVICE_WILLNEED
            | wasi::__WASI_ADVICE_DONTNEED
            | wasi::__WASI_ADVICE_NOREUSE => {}
            _ => return Err(Error::EINVAL),
        }
    }

    Ok(())
}

pub(crate) fn fd_allocate(
    file: &fs::File,
    offset: wasi::__wasi_filesize_t,
    len: wasi::__wasi_filesize_t,
) -> Result<()> {
    #[cfg(target_os = "linux")]
    {
        let res = unsafe {
            libc::posix_fallocate(file.as_raw_fd(), offset.try_into()?, len.try_into()?)
        };
        if res != 0 {
            return Err(host_impl::errno_from_host(res));
        }
    }

    #[cfg(not(target_os = "linux"))]
    {
        // No posix_fallocate here; emulate with ftruncate, growing only.
        // Racy against concurrent writers, as in the reference systems.
        let wanted = offset + len;
        if wanted > file.metadata()?.len() {
            file.set_len(wanted)?;
        }
    }

    Ok(())
}

pub(crate) fn fd_filestat_get(fd_entry: &FdEntry) -> Result<wasi::__wasi_filestat_t> {
    let filestat = nix::sys::stat::fstat(fd_entry.descriptor.as_raw_fd())?;
    host_impl::filestat_from_nix(filestat)
}

pub(crate) fn path_filestat_get(resolved: &str, follow: bool) -> Result<wasi::__wasi_filestat_t> {
    let filestat = if follow {
        nix::sys::stat::stat(Path::new(resolved))?
    } else {
        nix::sys::stat::lstat(Path::new(resolved))?
    };
    host_impl::filestat_from_nix(filestat)
}

fn filetime_from_flags(
    fst_flags: wasi::__wasi_fstflags_t,
    explicit_flag: wasi::__wasi_fstflags_t,
    now_flag: wasi::__wasi_fstflags_t,
    timestamp: wasi::__wasi_timestamp_t,
) -> Option<FileTime> {
    if fst_flags & now_flag != 0 {
        Some(FileTime::now())
    } else if fst_flags & explicit_flag != 0 {
        Some(FileTime::from_unix_time(
            (timestamp / 1_000_000_000) as i64,
            (timestamp % 1_000_000_000) as u32,
        ))
    } else {
        None
    }
}

pub(crate) fn fd_filestat_set_times(
    file: &fs::File,
    st_atim: wasi::__wasi_timestamp_t,
    st_mtim: wasi::__wasi_timestamp_t,
    fst_flags: wasi::__wasi_fstflags_t,
) -> Result<()> {
    let atime = filetime_from_flags(
        fst_flags,
        wasi::__WASI_FILESTAT_SET_ATIM,
        wasi::__WASI_FILESTAT_SET_ATIM_NOW,
        st_atim,
    );
    let mtime = filetime_from_flags(
        fst_flags,
        wasi::__WASI_FILESTAT_SET_MTIM,
        wasi::__WASI_FILESTAT_SET_MTIM_NOW,
        st_mtim,
    );
    filetime::set_file_handle_times(file, atime, mtime).map_err(Into::into)
}

pub(crate) fn path_filestat_set_times(
    resolved: &str,
    follow: bool,
    st_atim: wasi::__wasi_timestamp_t,
    st_mtim: wasi::__wasi_timestamp_t,
    fst_flags: wasi::__wasi_fstflags_t,
) -> Result<()> {
    let path = Path::new(resolved);
    let metadata = if follow {
        fs::metadata(path)?
    } else {
        fs::symlink_metadata(path)?
    };
    // set_symlink_file_times has no "omit" form; fill omitted fields
    // with the current values.
    let atime = filetime_from_flags(
        fst_flags,
        wasi::__WASI_FILESTAT_SET_ATIM,
        wasi::__WASI_FILESTAT_SET_ATIM_NOW,
        st_atim,
    )
    .unwrap_or_else(|| FileTime::from_last_access_time(&metadata));
    let mtime = filetime_from_flags(
        fst_flags,
        wasi::__WASI_FILESTAT_SET_MTIM,
        wasi::__WASI_FILESTAT_SET_MTIM_NOW,
        st_mtim,
    )
    .unwrap_or_else(|| FileTime::from_last_modification_time(&metadata));

    if follow {
        filetime::set_file_times(path, atime, mtime).map_err(Into::into)
    } else {
        filetime::set_symlink_file_times(path, atime, mtime).map_err(Into::into)
    }
}

pub(crate) fn path_open(
    resolved: &str,
    read: bool,
    write: bool,
    oflags: wasi::__wasi_oflags_t,
    fs_flags: wasi::__wasi_fdflags_t,
) -> Result<fs::File> {
    use nix::fcntl::{open, OFlag};
    use nix::sys::stat::Mode;

    let mut nix_all_oflags = if read && write {
        OFlag::O_RDWR
    } else if write {
        OFlag::O_WRONLY
    } else {
        OFlag::O_RDONLY
    };
    nix_all_oflags.insert(host_impl::nix_from_oflags(oflags));
    nix_all_oflags.insert(host_impl::nix_from_fdflags(fs_flags));

    // Mode 0o666 follows the caller's umask without marking guest
    // files executable.
    let new_fd = open(
        Path::new(resolved),
        nix_all_oflags,
        Mode::from_bits_truncate(0o666),
    )?;
    Ok(unsafe { fs::File::from_raw_fd(new_fd) })
}

pub(crate) fn path_symlink(old_path: &str, resolved_new: &str) -> Result<()> {
    std::os::unix::fs::symlink(old_path, resolved_new).map_err(Into::into)
}

struct DirStream(*mut libc::DIR);

impl Drop for DirStream {
    fn drop(&mut self) {
        unsafe { libc::closedir(self.0) };
    }
}

/// Serialize directory entries into `host_buf`, starting at `cookie`.
/// Each record is the 24-byte header followed by the name; a record
/// that does not fit is truncated silently and ends the call. The
/// stream is reopened from `real_path` on every call, trading
/// performance for not having to keep directory state in the fd table.
pub(crate) fn fd_readdir(
    real_path: &str,
    host_buf: &mut [u8],
    cookie: wasi::__wasi_dircookie_t,
) -> Result<usize> {
    let path_cstr = CString::new(real_path)?;
    let dir = unsafe { libc::opendir(path_cstr.as_ptr()) };
    if dir.is_null() {
        return Err(host_impl::errno_from_nix(Errno::last()));
    }
    let dir = DirStream(dir);

    if cookie != wasi::__WASI_DIRCOOKIE_START {
        unsafe { libc::seekdir(dir.0, cookie as c_long) };
    }

    let mut used = 0;
    while used < host_buf.len() {
        unsafe { Errno::clear() };
        let entry_ptr = unsafe { libc::readdir(dir.0) };
        if entry_ptr.is_null() {
            let errno = nix::errno::errno();
            if errno != 0 {
                return Err(host_impl::errno_from_host(errno));
            }
            break;
        }
        let entry = unsafe { &*entry_ptr };

        // The position after this entry doubles as the resume cookie.
        let d_next = unsafe { libc::telldir(dir.0) };
        if d_next < 0 {
            return Err(host_impl::errno_from_nix(Errno::last()));
        }

        let name = unsafe { CStr::from_ptr(entry.d_name.as_ptr()) }.to_bytes();
        if name == b"." || name == b".." {
            continue;
        }

        let dirent = wasi::__wasi_dirent_t {
            d_next: d_next as wasi::__wasi_dircookie_t,
            d_ino: entry.d_ino as wasi::__wasi_inode_t,
            d_namlen: name.len().try_into()?,
            d_type: host_impl::filetype_from_dirent(entry.d_type),
        };
        let header = memory::dirent_bytes(&dirent);

        let ncopy = header.len().min(host_buf.len() - used);
        host_buf[used..used + ncopy].copy_from_slice(&header[..ncopy]);
        used += ncopy;

        let ncopy = name.len().min(host_buf.len() - used);
        host_buf[used..used + ncopy].copy_from_slice(&name[..ncopy]);
        used += ncopy;
    }

    Ok(used)
}
