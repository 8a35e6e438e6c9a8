//! Host-side introspection of descriptors: file type and the maximum
//! rights set a descriptor of that type may carry.

use crate::fdentry::Descriptor;
use crate::sys::host_impl;
use crate::{wasi, Result};
use std::os::unix::prelude::{AsRawFd, RawFd};

impl AsRawFd for Descriptor {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            Descriptor::File(f) => f.as_raw_fd(),
            Descriptor::Stdin => libc::STDIN_FILENO,
            Descriptor::Stdout => libc::STDOUT_FILENO,
            Descriptor::Stderr => libc::STDERR_FILENO,
        }
    }
}

/// fstat the handle and derive `(file_type, max_rights_base,
/// max_rights_inheriting)`. Character devices that are a tty get the
/// narrower tty rights so that seek/tell never reach an fd that cannot
/// honor them.
pub(crate) fn determine_type_rights<Fd: AsRawFd>(
    fd: &Fd,
) -> Result<(
    wasi::__wasi_filetype_t,
    wasi::__wasi_rights_t,
    wasi::__wasi_rights_t,
)> {
    let filestat = nix::sys::stat::fstat(fd.as_raw_fd())?;
    let file_type = host_impl::filetype_from_mode(filestat.st_mode);
    let (rights_base, rights_inheriting) = match file_type {
        wasi::__WASI_FILETYPE_BLOCK_DEVICE => (
            wasi::RIGHTS_BLOCK_DEVICE_BASE,
            wasi::RIGHTS_BLOCK_DEVICE_INHERITING,
        ),
        wasi::__WASI_FILETYPE_CHARACTER_DEVICE => {
            if nix::unistd::isatty(fd.as_raw_fd())? {
                (wasi::RIGHTS_TTY_BASE, wasi::RIGHTS_TTY_INHERITING)
            } else {
                (
                    wasi::RIGHTS_CHARACTER_DEVICE_BASE,
                    wasi::RIGHTS_CHARACTER_DEVICE_INHERITING,
                )
            }
        }
        wasi::__WASI_FILETYPE_DIRECTORY => (
            wasi::RIGHTS_DIRECTORY_BASE,
            wasi::RIGHTS_DIRECTORY_INHERITING,
        ),
        wasi::__WASI_FILETYPE_REGULAR_FILE => (
            wasi::RIGHTS_REGULAR_FILE_BASE,
            wasi::RIGHTS_REGULAR_FILE_INHERITING,
        ),
        wasi::__WASI_FILETYPE_SOCKET_STREAM | wasi::__WASI_FILETYPE_SOCKET_DGRAM => {
            (wasi::RIGHTS_SOCKET_BASE, wasi::RIGHTS_SOCKET_INHERITING)
        }
        _ => (wasi::RIGHTS_REGULAR_FILE_BASE, 0),
    };
    Ok((file_type, rights_base, rights_inheriting))
}
