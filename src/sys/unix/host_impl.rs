//! Translation between host (POSIX) and WASI constants and types.
#![allow(non_camel_case_types)]

use crate::{wasi, Error, Result};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::Signal;

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        pub(crate) const O_DSYNC: OFlag = OFlag::O_DSYNC;
        pub(crate) const O_RSYNC: OFlag = OFlag::O_RSYNC;
    } else {
        // Platforms without O_DSYNC/O_RSYNC degrade both to O_SYNC.
        pub(crate) const O_DSYNC: OFlag = OFlag::O_SYNC;
        pub(crate) const O_RSYNC: OFlag = OFlag::O_SYNC;
    }
}

/// Total map from host errno values to the WASI taxonomy. Codes with no
/// WASI counterpart collapse to EIO.
pub(crate) fn errno_from_nix(errno: Errno) -> Error {
    match errno {
        Errno::EPERM => Error::EPERM,
        Errno::ENOENT => Error::ENOENT,
        Errno::ESRCH => Error::ESRCH,
        Errno::EINTR => Error::EINTR,
        Errno::EIO => Error::EIO,
        Errno::ENXIO => Error::ENXIO,
        Errno::E2BIG => Error::E2BIG,
        Errno::ENOEXEC => Error::ENOEXEC,
        Errno::EBADF => Error::EBADF,
        Errno::ECHILD => Error::ECHILD,
        Errno::EAGAIN => Error::EAGAIN,
        Errno::ENOMEM => Error::ENOMEM,
        Errno::EACCES => Error::EACCES,
        Errno::EFAULT => Error::EFAULT,
        Errno::EBUSY => Error::EBUSY,
        Errno::EEXIST => Error::EEXIST,
        Errno::EXDEV => Error::EXDEV,
        Errno::ENODEV => Error::ENODEV,
        Errno::ENOTDIR => Error::ENOTDIR,
        Errno::EISDIR => Error::EISDIR,
        Errno::EINVAL => Error::EINVAL,
        Errno::ENFILE => Error::ENFILE,
        Errno::EMFILE => Error::EMFILE,
        Errno::ENOTTY => Error::ENOTTY,
        Errno::ETXTBSY => Error::ETXTBSY,
        Errno::EFBIG => Error::EFBIG,
        Errno::ENOSPC => Error::ENOSPC,
        Errno::ESPIPE => Error::ESPIPE,
        Errno::EROFS => Error::EROFS,
        Errno::EMLINK => Error::EMLINK,
        Errno::EPIPE => Error::EPIPE,
        Errno::EDOM => Error::EDOM,
        Errno::ERANGE => Error::ERANGE,
        Errno::EDEADLK => Error::EDEADLK,
        Errno::ENAMETOOLONG => Error::ENAMETOOLONG,
        Errno::ENOLCK => Error::ENOLCK,
        Errno::ENOSYS => Error::ENOSYS,
        Errno::ENOTEMPTY => Error::ENOTEMPTY,
        Errno::ELOOP => Error::ELOOP,
        Errno::ENOMSG => Error::ENOMSG,
        Errno::EIDRM => Error::EIDRM,
        Errno::ENOLINK => Error::ENOLINK,
        Errno::EPROTO => Error::EPROTO,
        Errno::EMULTIHOP => Error::EMULTIHOP,
        Errno::EBADMSG => Error::EBADMSG,
        Errno::EOVERFLOW => Error::EOVERFLOW,
        Errno::EILSEQ => Error::EILSEQ,
        Errno::ENOTSOCK => Error::ENOTSOCK,
        Errno::EDESTADDRREQ => Error::EDESTADDRREQ,
        Errno::EMSGSIZE => Error::EMSGSIZE,
        Errno::EPROTOTYPE => Error::EPROTOTYPE,
        Errno::ENOPROTOOPT => Error::ENOPROTOOPT,
        Errno::EPROTONOSUPPORT => Error::EPROTONOSUPPORT,
        Errno::EOPNOTSUPP => Error::ENOTSUP,
        Errno::EAFNOSUPPORT => Error::EAFNOSUPPORT,
        Errno::EADDRINUSE => Error::EADDRINUSE,
        Errno::EADDRNOTAVAIL => Error::EADDRNOTAVAIL,
        Errno::ENETDOWN => Error::ENETDOWN,
        Errno::ENETUNREACH => Error::ENETUNREACH,
        Errno::ENETRESET => Error::ENETRESET,
        Errno::ECONNABORTED => Error::ECONNABORTED,
        Errno::ECONNRESET => Error::ECONNRESET,
        Errno::ENOBUFS => Error::ENOBUFS,
        Errno::EISCONN => Error::EISCONN,
        Errno::ENOTCONN => Error::ENOTCONN,
        Errno::ETIMEDOUT => Error::ETIMEDOUT,
        Errno::ECONNREFUSED => Error::ECONNREFUSED,
        Errno::EHOSTUNREACH => Error::EHOSTUNREACH,
        Errno::EALREADY => Error::EALREADY,
        Errno::EINPROGRESS => Error::EINPROGRESS,
        Errno::ESTALE => Error::ESTALE,
        Errno::EDQUOT => Error::EDQUOT,
        Errno::ECANCELED => Error::ECANCELED,
        Errno::EOWNERDEAD => Error::EOWNERDEAD,
        Errno::ENOTRECOVERABLE => Error::ENOTRECOVERABLE,
        _ => Error::EIO,
    }
}

pub(crate) fn errno_from_host(errno: i32) -> Error {
    errno_from_nix(Errno::from_i32(errno))
}

pub(crate) fn nix_from_oflags(oflags: wasi::__wasi_oflags_t) -> OFlag {
    let mut nix_flags = OFlag::empty();
    if oflags & wasi::__WASI_O_CREAT != 0 {
        nix_flags.insert(OFlag::O_CREAT);
    }
    if oflags & wasi::__WASI_O_DIRECTORY != 0 {
        nix_flags.insert(OFlag::O_DIRECTORY);
    }
    if oflags & wasi::__WASI_O_EXCL != 0 {
        nix_flags.insert(OFlag::O_EXCL);
    }
    if oflags & wasi::__WASI_O_TRUNC != 0 {
        nix_flags.insert(OFlag::O_TRUNC);
    }
    nix_flags
}

pub(crate) fn nix_from_fdflags(fdflags: wasi::__wasi_fdflags_t) -> OFlag {
    let mut nix_flags = OFlag::empty();
    if fdflags & wasi::__WASI_FDFLAG_APPEND != 0 {
        nix_flags.insert(OFlag::O_APPEND);
    }
    if fdflags & wasi::__WASI_FDFLAG_DSYNC != 0 {
        nix_flags.insert(O_DSYNC);
    }
    if fdflags & wasi::__WASI_FDFLAG_NONBLOCK != 0 {
        nix_flags.insert(OFlag::O_NONBLOCK);
    }
    if fdflags & wasi::__WASI_FDFLAG_RSYNC != 0 {
        nix_flags.insert(O_RSYNC);
    }
    if fdflags & wasi::__WASI_FDFLAG_SYNC != 0 {
        nix_flags.insert(OFlag::O_SYNC);
    }
    nix_flags
}

pub(crate) fn fdflags_from_nix(oflags: OFlag) -> wasi::__wasi_fdflags_t {
    let mut fdflags = 0;
    if oflags.contains(OFlag::O_APPEND) {
        fdflags |= wasi::__WASI_FDFLAG_APPEND;
    }
    if oflags.contains(O_DSYNC) {
        fdflags |= wasi::__WASI_FDFLAG_DSYNC;
    }
    if oflags.contains(OFlag::O_NONBLOCK) {
        fdflags |= wasi::__WASI_FDFLAG_NONBLOCK;
    }
    if oflags.contains(O_RSYNC) {
        fdflags |= wasi::__WASI_FDFLAG_RSYNC;
    }
    if oflags.contains(OFlag::O_SYNC) {
        fdflags |= wasi::__WASI_FDFLAG_SYNC;
    }
    fdflags
}

pub(crate) fn filetype_from_mode(mode: libc::mode_t) -> wasi::__wasi_filetype_t {
    match mode & libc::S_IFMT {
        libc::S_IFBLK => wasi::__WASI_FILETYPE_BLOCK_DEVICE,
        libc::S_IFCHR => wasi::__WASI_FILETYPE_CHARACTER_DEVICE,
        libc::S_IFDIR => wasi::__WASI_FILETYPE_DIRECTORY,
        libc::S_IFREG => wasi::__WASI_FILETYPE_REGULAR_FILE,
        libc::S_IFLNK => wasi::__WASI_FILETYPE_SYMBOLIC_LINK,
        libc::S_IFSOCK => wasi::__WASI_FILETYPE_SOCKET_STREAM,
        _ => wasi::__WASI_FILETYPE_UNKNOWN,
    }
}

pub(crate) fn filetype_from_dirent(d_type: u8) -> wasi::__wasi_filetype_t {
    match d_type {
        libc::DT_BLK => wasi::__WASI_FILETYPE_BLOCK_DEVICE,
        libc::DT_CHR => wasi::__WASI_FILETYPE_CHARACTER_DEVICE,
        libc::DT_DIR => wasi::__WASI_FILETYPE_DIRECTORY,
        libc::DT_REG => wasi::__WASI_FILETYPE_REGULAR_FILE,
        libc::DT_LNK => wasi::__WASI_FILETYPE_SYMBOLIC_LINK,
        libc::DT_SOCK => wasi::__WASI_FILETYPE_SOCKET_STREAM,
        _ => wasi::__WASI_FILETYPE_UNKNOWN,
    }
}

fn timespec_to_timestamp(secs: i64, nsecs: i64) -> Result<wasi::__wasi_timestamp_t> {
    (secs as wasi::__wasi_timestamp_t)
        .checked_mul(1_000_000_000)
        .and_then(|sec_ns| sec_ns.checked_add(nsecs as wasi::__wasi_timestamp_t))
        .ok_or(Error::EOVERFLOW)
}

pub(crate) fn filestat_from_nix(
    filestat: nix::sys::stat::FileStat,
) -> Result<wasi::__wasi_filestat_t> {
    Ok(wasi::__wasi_filestat_t {
        st_dev: filestat.st_dev as wasi::__wasi_device_t,
        st_ino: filestat.st_ino as wasi::__wasi_inode_t,
        st_filetype: filetype_from_mode(filestat.st_mode),
        st_nlink: filestat.st_nlink as wasi::__wasi_linkcount_t,
        st_size: filestat.st_size as wasi::__wasi_filesize_t,
        st_atim: timespec_to_timestamp(filestat.st_atime as i64, filestat.st_atime_nsec as i64)?,
        st_mtim: timespec_to_timestamp(filestat.st_mtime as i64, filestat.st_mtime_nsec as i64)?,
        st_ctim: timespec_to_timestamp(filestat.st_ctime as i64, filestat.st_ctime_nsec as i64)?,
    })
}

/// WASI signal constant to host signal; `None` for signals the host
/// cannot deliver (the caller reports ENOSYS).
pub(crate) fn signal_from_wasi(sig: wasi::__wasi_signal_t) -> Option<Signal> {
    match sig {
        wasi::__WASI_SIGHUP => Some(Signal::SIGHUP),
        wasi::__WASI_SIGINT => Some(Signal::SIGINT),
        wasi::__WASI_SIGQUIT => Some(Signal::SIGQUIT),
        wasi::__WASI_SIGILL => Some(Signal::SIGILL),
        wasi::__WASI_SIGTRAP => Some(Signal::SIGTRAP),
        wasi::__WASI_SIGABRT => Some(Signal::SIGABRT),
        wasi::__WASI_SIGBUS => Some(Signal::SIGBUS),
        wasi::__WASI_SIGFPE => Some(Signal::SIGFPE),
        wasi::__WASI_SIGKILL => Some(Signal::SIGKILL),
        wasi::__WASI_SIGUSR1 => Some(Signal::SIGUSR1),
        wasi::__WASI_SIGSEGV => Some(Signal::SIGSEGV),
        wasi::__WASI_SIGUSR2 => Some(Signal::SIGUSR2),
        wasi::__WASI_SIGPIPE => Some(Signal::SIGPIPE),
        wasi::__WASI_SIGALRM => Some(Signal::SIGALRM),
        wasi::__WASI_SIGTERM => Some(Signal::SIGTERM),
        wasi::__WASI_SIGCHLD => Some(Signal::SIGCHLD),
        wasi::__WASI_SIGCONT => Some(Signal::SIGCONT),
        wasi::__WASI_SIGSTOP => Some(Signal::SIGSTOP),
        wasi::__WASI_SIGTSTP => Some(Signal::SIGTSTP),
        wasi::__WASI_SIGTTIN => Some(Signal::SIGTTIN),
        wasi::__WASI_SIGTTOU => Some(Signal::SIGTTOU),
        wasi::__WASI_SIGURG => Some(Signal::SIGURG),
        wasi::__WASI_SIGXCPU => Some(Signal::SIGXCPU),
        wasi::__WASI_SIGXFSZ => Some(Signal::SIGXFSZ),
        wasi::__WASI_SIGVTALRM => Some(Signal::SIGVTALRM),
        wasi::__WASI_SIGPROF => Some(Signal::SIGPROF),
        wasi::__WASI_SIGWINCH => Some(Signal::SIGWINCH),
        wasi::__WASI_SIGPOLL => Some(Signal::SIGIO),
        #[cfg(target_os = "linux")]
        wasi::__WASI_SIGPWR => Some(Signal::SIGPWR),
        wasi::__WASI_SIGSYS => Some(Signal::SIGSYS),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_map_is_total() {
        // An errno nix knows nothing about must still produce a WASI code.
        assert_eq!(errno_from_host(0), Error::EIO);
        assert_eq!(errno_from_host(-1), Error::EIO);
        assert_eq!(errno_from_host(libc::ENOENT), Error::ENOENT);
        assert_eq!(errno_from_host(libc::EACCES), Error::EACCES);
    }

    #[test]
    fn fdflags_roundtrip_through_oflags() {
        let fdflags = wasi::__WASI_FDFLAG_APPEND | wasi::__WASI_FDFLAG_NONBLOCK;
        assert_eq!(fdflags_from_nix(nix_from_fdflags(fdflags)), fdflags);
    }

    #[test]
    fn unmapped_signal_has_no_host_equivalent() {
        assert!(signal_from_wasi(wasi::__WASI_SIGTERM).is_some());
        assert!(signal_from_wasi(200).is_none());
    }
}
