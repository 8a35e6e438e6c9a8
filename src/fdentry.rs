//! The descriptor wrapper stored in the fd table.

use crate::sys::fdentry_impl;
use crate::{wasi, Error, Result};
use std::fs;

#[derive(Debug)]
pub(crate) enum Descriptor {
    File(fs::File),
    Stdin,
    Stdout,
    Stderr,
}

impl Descriptor {
    pub(crate) fn as_file(&self) -> Result<&fs::File> {
        match self {
            Descriptor::File(f) => Ok(f),
            _ => Err(Error::EBADF),
        }
    }
}

/// A live slot in the fd table: the host resource plus the capability
/// state the guest negotiated for it.
///
/// `rights_base` and `rights_inheriting` only ever shrink after
/// creation. `real_path` is absolute and canonical for descriptors that
/// were derived from a path, and is what the sandbox resolver anchors
/// on; `guest_path` is only set on preopens and is what
/// `fd_prestat_dir_name` reports.
#[derive(Debug)]
pub(crate) struct FdEntry {
    pub(crate) file_type: wasi::__wasi_filetype_t,
    pub(crate) descriptor: Descriptor,
    pub(crate) rights_base: wasi::__wasi_rights_t,
    pub(crate) rights_inheriting: wasi::__wasi_rights_t,
    pub(crate) preopen: bool,
    pub(crate) guest_path: Option<String>,
    pub(crate) real_path: Option<String>,
}

impl FdEntry {
    /// Wrap a freshly opened file. The file type is read back from the
    /// host and the requested rights are clamped against the maximum
    /// set for that type.
    pub(crate) fn from_file(
        file: fs::File,
        real_path: String,
        rights_base: wasi::__wasi_rights_t,
        rights_inheriting: wasi::__wasi_rights_t,
    ) -> Result<Self> {
        let (file_type, max_base, max_inheriting) =
            fdentry_impl::determine_type_rights(&file)?;
        Ok(Self {
            file_type,
            descriptor: Descriptor::File(file),
            rights_base: rights_base & max_base,
            rights_inheriting: rights_inheriting & max_inheriting,
            preopen: false,
            guest_path: None,
            real_path: Some(real_path),
        })
    }

    /// Wrap a sandbox root opened at init. Preopens always carry the
    /// full directory rights and are never removed from the table.
    pub(crate) fn preopen(file: fs::File, guest_path: &str, real_path: String) -> Result<Self> {
        let (file_type, _, _) = fdentry_impl::determine_type_rights(&file)?;
        if file_type != wasi::__WASI_FILETYPE_DIRECTORY {
            return Err(Error::ENOTDIR);
        }
        Ok(Self {
            file_type,
            descriptor: Descriptor::File(file),
            rights_base: wasi::RIGHTS_DIRECTORY_BASE,
            rights_inheriting: wasi::RIGHTS_DIRECTORY_INHERITING,
            preopen: true,
            guest_path: Some(guest_path.to_owned()),
            real_path: Some(real_path),
        })
    }

    pub(crate) fn duplicate_stdin() -> Result<Self> {
        Self::from_stdio(Descriptor::Stdin)
    }

    pub(crate) fn duplicate_stdout() -> Result<Self> {
        Self::from_stdio(Descriptor::Stdout)
    }

    pub(crate) fn duplicate_stderr() -> Result<Self> {
        Self::from_stdio(Descriptor::Stderr)
    }

    fn from_stdio(descriptor: Descriptor) -> Result<Self> {
        let (file_type, rights_base, rights_inheriting) =
            fdentry_impl::determine_type_rights(&descriptor)?;
        Ok(Self {
            file_type,
            descriptor,
            rights_base,
            rights_inheriting,
            preopen: false,
            guest_path: None,
            real_path: None,
        })
    }

    /// ENOTCAPABLE unless this entry holds every requested right.
    pub(crate) fn check_rights(
        &self,
        rights_base: wasi::__wasi_rights_t,
        rights_inheriting: wasi::__wasi_rights_t,
    ) -> Result<()> {
        if self.rights_base & rights_base != rights_base
            || self.rights_inheriting & rights_inheriting != rights_inheriting
        {
            return Err(Error::ENOTCAPABLE);
        }
        Ok(())
    }

    /// The canonical host path this descriptor was opened from; path
    /// operations are anchored here. Descriptors without one (stdio)
    /// cannot be used as a directory.
    pub(crate) fn real_path(&self) -> Result<&str> {
        self.real_path.as_deref().ok_or(Error::ENOTDIR)
    }
}
