//! Per-sandbox state: argument and environment vectors plus the fd
//! table, assembled by `WasiCtxBuilder` from the embedder's
//! initialization options.

use crate::fdentry::{Descriptor, FdEntry};
use crate::fdtable::FdTable;
use crate::{wasi, Error, Result};
use std::env;
use std::ffi::CString;
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of fd-table slots when the embedder does not pick one.
const DEFAULT_FD_TABLE_SIZE: u32 = 64;

pub struct WasiCtxBuilder {
    fd_table_size: u32,
    args: Vec<String>,
    env: Vec<String>,
    preopens: Vec<(String, PathBuf)>,
}

impl WasiCtxBuilder {
    /// Builder for a sandbox with no arguments, no environment and no
    /// preopened directories.
    pub fn new() -> Self {
        Self {
            fd_table_size: DEFAULT_FD_TABLE_SIZE,
            args: Vec::new(),
            env: Vec::new(),
            preopens: Vec::new(),
        }
    }

    /// Total number of descriptor slots, stdio included. Must be
    /// nonzero; `build` fails with EINVAL otherwise.
    pub fn fd_table_size(mut self, size: u32) -> Self {
        self.fd_table_size = size;
        self
    }

    pub fn arg<S: AsRef<str>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        self
    }

    pub fn env<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.env
            .push(format!("{}={}", key.as_ref(), value.as_ref()));
        self
    }

    /// Forward the host process environment to the guest verbatim.
    pub fn inherit_env(mut self) -> Self {
        self.env = env::vars().map(|(k, v)| format!("{}={}", k, v)).collect();
        self
    }

    /// Expose a host directory to the guest under `guest_path`. The
    /// host path is canonicalized and opened during `build`; everything
    /// the guest later resolves through this descriptor must stay
    /// below the canonical path.
    pub fn preopened_dir<P: AsRef<Path>>(mut self, real_path: P, guest_path: &str) -> Self {
        self.preopens
            .push((guest_path.to_owned(), real_path.as_ref().to_owned()));
        self
    }

    /// Open the stdio and preopen descriptors and assemble the context.
    /// On failure every descriptor opened so far is closed again; a
    /// failed build leaves no live state behind.
    pub fn build(self) -> Result<WasiCtx> {
        let args = self
            .args
            .iter()
            .map(|arg| CString::new(arg.as_str()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let env = self
            .env
            .iter()
            .map(|pair| CString::new(pair.as_str()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut fds = FdTable::new(self.fd_table_size)?;
        fds.insert(FdEntry::duplicate_stdin()?)?;
        fds.insert(FdEntry::duplicate_stdout()?)?;
        fds.insert(FdEntry::duplicate_stderr()?)?;

        for (guest_path, real_path) in &self.preopens {
            if guest_path.is_empty() || real_path.as_os_str().is_empty() {
                return Err(Error::EINVAL);
            }
            let canonical = fs::canonicalize(real_path)?
                .into_os_string()
                .into_string()
                .map_err(|_| Error::EILSEQ)?;
            let dir = fs::File::open(&canonical)?;
            fds.insert(FdEntry::preopen(dir, guest_path, canonical)?)?;
        }

        Ok(WasiCtx { args, env, fds })
    }
}

impl Default for WasiCtxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One sandbox instance. The instance owns its argv/env buffers and
/// every live descriptor; dropping it closes them all. It is not
/// internally synchronized: one logical caller at a time.
#[derive(Debug)]
pub struct WasiCtx {
    pub(crate) args: Vec<CString>,
    pub(crate) env: Vec<CString>,
    pub(crate) fds: FdTable,
}

impl WasiCtx {
    pub(crate) fn get_fd_entry(
        &self,
        fd: wasi::__wasi_fd_t,
        rights_base: wasi::__wasi_rights_t,
        rights_inheriting: wasi::__wasi_rights_t,
    ) -> Result<&FdEntry> {
        self.fds.get(fd, rights_base, rights_inheriting)
    }

    pub(crate) fn get_fd_entry_mut(
        &mut self,
        fd: wasi::__wasi_fd_t,
        rights_base: wasi::__wasi_rights_t,
        rights_inheriting: wasi::__wasi_rights_t,
    ) -> Result<&mut FdEntry> {
        self.fds.get_mut(fd, rights_base, rights_inheriting)
    }

    pub(crate) fn insert_fd_entry(&mut self, entry: FdEntry) -> Result<wasi::__wasi_fd_t> {
        self.fds.insert(entry)
    }

    /// Embedder-only: swap the host handle under an existing
    /// descriptor. Rights, paths and the guest-visible fd number are
    /// untouched; the previous handle is closed.
    pub fn remap_fd(&mut self, fd: wasi::__wasi_fd_t, new_handle: fs::File) -> Result<()> {
        let entry = self.fds.get_mut(fd, 0, 0)?;
        entry.descriptor = Descriptor::File(new_handle);
        Ok(())
    }
}
