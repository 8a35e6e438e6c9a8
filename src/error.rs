//! The WASI error taxonomy as a Rust error type.
//!
//! Errors are values everywhere in this crate: every fallible operation
//! returns `Result<T, Error>` and the public hostcall layer flattens the
//! error into its numeric wire encoding at the very edge.

use crate::wasi;
use std::fmt;
use std::num::TryFromIntError;

pub type Result<T> = std::result::Result<T, Error>;

macro_rules! wasi_errnos {
    ($($variant:ident => ($code:ident, $message:expr),)*) => {
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum Error {
            $($variant,)*
        }

        impl Error {
            /// The numeric encoding returned to the guest.
            pub fn as_wasi_errno(self) -> wasi::__wasi_errno_t {
                match self {
                    $(Error::$variant => wasi::$code,)*
                }
            }

            pub fn message(self) -> &'static str {
                match self {
                    $(Error::$variant => $message,)*
                }
            }
        }
    };
}

wasi_errnos! {
    ESUCCESS => (__WASI_ESUCCESS, "no error occurred"),
    E2BIG => (__WASI_E2BIG, "argument list too long"),
    EACCES => (__WASI_EACCES, "permission denied"),
    EADDRINUSE => (__WASI_EADDRINUSE, "address in use"),
    EADDRNOTAVAIL => (__WASI_EADDRNOTAVAIL, "address not available"),
    EAFNOSUPPORT => (__WASI_EAFNOSUPPORT, "address family not supported"),
    EAGAIN => (__WASI_EAGAIN, "resource unavailable, or operation would block"),
    EALREADY => (__WASI_EALREADY, "connection already in progress"),
    EBADF => (__WASI_EBADF, "bad file descriptor"),
    EBADMSG => (__WASI_EBADMSG, "bad message"),
    EBUSY => (__WASI_EBUSY, "device or resource busy"),
    ECANCELED => (__WASI_ECANCELED, "operation canceled"),
    ECHILD => (__WASI_ECHILD, "no child processes"),
    ECONNABORTED => (__WASI_ECONNABORTED, "connection aborted"),
    ECONNREFUSED => (__WASI_ECONNREFUSED, "connection refused"),
    ECONNRESET => (__WASI_ECONNRESET, "connection reset"),
    EDEADLK => (__WASI_EDEADLK, "resource deadlock would occur"),
    EDESTADDRREQ => (__WASI_EDESTADDRREQ, "destination address required"),
    EDOM => (__WASI_EDOM, "argument out of domain of function"),
    EDQUOT => (__WASI_EDQUOT, "storage quota exceeded"),
    EEXIST => (__WASI_EEXIST, "file exists"),
    EFAULT => (__WASI_EFAULT, "bad address"),
    EFBIG => (__WASI_EFBIG, "file too large"),
    EHOSTUNREACH => (__WASI_EHOSTUNREACH, "host is unreachable"),
    EIDRM => (__WASI_EIDRM, "identifier removed"),
    EILSEQ => (__WASI_EILSEQ, "illegal byte sequence"),
    EINPROGRESS => (__WASI_EINPROGRESS, "operation in progress"),
    EINTR => (__WASI_EINTR, "interrupted function"),
    EINVAL => (__WASI_EINVAL, "invalid argument"),
    EIO => (__WASI_EIO, "I/O error"),
    EISCONN => (__WASI_EISCONN, "socket is connected"),
    EISDIR => (__WASI_EISDIR, "is a directory"),
    ELOOP => (__WASI_ELOOP, "too many levels of symbolic links"),
    EMFILE => (__WASI_EMFILE, "file descriptor value too large"),
    EMLINK => (__WASI_EMLINK, "too many links"),
    EMSGSIZE => (__WASI_EMSGSIZE, "message too large"),
    EMULTIHOP => (__WASI_EMULTIHOP, "multihop attempted"),
    ENAMETOOLONG => (__WASI_ENAMETOOLONG, "filename too long"),
    ENETDOWN => (__WASI_ENETDOWN, "network is down"),
    ENETRESET => (__WASI_ENETRESET, "connection aborted by network"),
    ENETUNREACH => (__WASI_ENETUNREACH, "network unreachable"),
    ENFILE => (__WASI_ENFILE, "too many files open in system"),
    ENOBUFS => (__WASI_ENOBUFS, "no buffer space available"),
    ENODEV => (__WASI_ENODEV, "no such device"),
    ENOENT => (__WASI_ENOENT, "no such file or directory"),
    ENOEXEC => (__WASI_ENOEXEC, "executable file format error"),
    ENOLCK => (__WASI_ENOLCK, "no locks available"),
    ENOLINK => (__WASI_ENOLINK, "link has been severed"),
    ENOMEM => (__WASI_ENOMEM, "not enough space"),
    ENOMSG => (__WASI_ENOMSG, "no message of the desired type"),
    ENOPROTOOPT => (__WASI_ENOPROTOOPT, "protocol not available"),
    ENOSPC => (__WASI_ENOSPC, "no space left on device"),
    ENOSYS => (__WASI_ENOSYS, "function not supported"),
    ENOTCONN => (__WASI_ENOTCONN, "the socket is not connected"),
    ENOTDIR => (__WASI_ENOTDIR, "not a directory or a symbolic link to a directory"),
    ENOTEMPTY => (__WASI_ENOTEMPTY, "directory not empty"),
    ENOTRECOVERABLE => (__WASI_ENOTRECOVERABLE, "state not recoverable"),
    ENOTSOCK => (__WASI_ENOTSOCK, "not a socket"),
    ENOTSUP => (__WASI_ENOTSUP, "not supported, or operation not supported on socket"),
    ENOTTY => (__WASI_ENOTTY, "inappropriate I/O control operation"),
    ENXIO => (__WASI_ENXIO, "no such device or address"),
    EOVERFLOW => (__WASI_EOVERFLOW, "value too large to be stored in data type"),
    EOWNERDEAD => (__WASI_EOWNERDEAD, "previous owner died"),
    EPERM => (__WASI_EPERM, "operation not permitted"),
    EPIPE => (__WASI_EPIPE, "broken pipe"),
    EPROTO => (__WASI_EPROTO, "protocol error"),
    EPROTONOSUPPORT => (__WASI_EPROTONOSUPPORT, "protocol not supported"),
    EPROTOTYPE => (__WASI_EPROTOTYPE, "protocol wrong type for socket"),
    ERANGE => (__WASI_ERANGE, "result too large"),
    EROFS => (__WASI_EROFS, "read-only file system"),
    ESPIPE => (__WASI_ESPIPE, "invalid seek"),
    ESRCH => (__WASI_ESRCH, "no such process"),
    ESTALE => (__WASI_ESTALE, "stale file descriptor"),
    ETIMEDOUT => (__WASI_ETIMEDOUT, "connection timed out"),
    ETXTBSY => (__WASI_ETXTBSY, "text file busy"),
    EXDEV => (__WASI_EXDEV, "cross-device link"),
    ENOTCAPABLE => (__WASI_ENOTCAPABLE, "capabilities insufficient"),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl failure::Fail for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) => crate::sys::errno_from_host(code),
            None => Error::EIO,
        }
    }
}

#[cfg(unix)]
impl From<nix::Error> for Error {
    fn from(err: nix::Error) -> Self {
        match err {
            nix::Error::Sys(errno) => crate::sys::host_impl::errno_from_nix(errno),
            nix::Error::InvalidPath | nix::Error::InvalidUtf8 => Error::EILSEQ,
            nix::Error::UnsupportedOperation => Error::ENOTSUP,
        }
    }
}

impl From<TryFromIntError> for Error {
    fn from(_: TryFromIntError) -> Self {
        Error::EOVERFLOW
    }
}

impl From<std::ffi::NulError> for Error {
    fn from(_: std::ffi::NulError) -> Self {
        Error::EILSEQ
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::EILSEQ
    }
}
