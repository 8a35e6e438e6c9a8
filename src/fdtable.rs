//! Fixed-capacity table of guest file descriptors.
//!
//! Descriptor numbers are slot indices. The capacity is set once at
//! init and never grows; a full table fails allocation with ENOMEM.

use crate::fdentry::FdEntry;
use crate::{wasi, Error, Result};

#[derive(Debug)]
pub(crate) struct FdTable {
    entries: Vec<Option<FdEntry>>,
}

impl FdTable {
    pub(crate) fn new(capacity: u32) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::EINVAL);
        }
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(capacity as usize)
            .map_err(|_| Error::ENOMEM)?;
        entries.resize_with(capacity as usize, || None);
        Ok(Self { entries })
    }

    /// Occupy the lowest free slot and return its index as the new fd.
    pub(crate) fn insert(&mut self, entry: FdEntry) -> Result<wasi::__wasi_fd_t> {
        let slot = self
            .entries
            .iter()
            .position(Option::is_none)
            .ok_or(Error::ENOMEM)?;
        self.entries[slot] = Some(entry);
        Ok(slot as wasi::__wasi_fd_t)
    }

    /// Look up a live descriptor, enforcing the required rights.
    /// EBADF for a free or out-of-range fd, ENOTCAPABLE for a rights
    /// mismatch.
    pub(crate) fn get(
        &self,
        fd: wasi::__wasi_fd_t,
        rights_base: wasi::__wasi_rights_t,
        rights_inheriting: wasi::__wasi_rights_t,
    ) -> Result<&FdEntry> {
        let entry = self
            .entries
            .get(fd as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::EBADF)?;
        entry.check_rights(rights_base, rights_inheriting)?;
        Ok(entry)
    }

    pub(crate) fn get_mut(
        &mut self,
        fd: wasi::__wasi_fd_t,
        rights_base: wasi::__wasi_rights_t,
        rights_inheriting: wasi::__wasi_rights_t,
    ) -> Result<&mut FdEntry> {
        let entry = self
            .entries
            .get_mut(fd as usize)
            .and_then(Option::as_mut)
            .ok_or(Error::EBADF)?;
        entry.check_rights(rights_base, rights_inheriting)?;
        Ok(entry)
    }

    /// Free a slot, handing the entry (and with it the host handle)
    /// back to the caller. EBADF when the slot is already free.
    pub(crate) fn remove(&mut self, fd: wasi::__wasi_fd_t) -> Result<FdEntry> {
        self.entries
            .get_mut(fd as usize)
            .ok_or(Error::EBADF)?
            .take()
            .ok_or(Error::EBADF)
    }

    /// Move `from` into `to`'s slot. The destination's host handle is
    /// closed (exactly once, when its entry drops) and `from` becomes
    /// free. Both fds must be live; preopens on either side refuse.
    pub(crate) fn renumber(
        &mut self,
        from: wasi::__wasi_fd_t,
        to: wasi::__wasi_fd_t,
    ) -> Result<()> {
        let from_entry = self
            .entries
            .get(from as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::EBADF)?;
        let to_entry = self
            .entries
            .get(to as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::EBADF)?;
        if from_entry.preopen || to_entry.preopen {
            return Err(Error::ENOTSUP);
        }
        if from == to {
            return Ok(());
        }
        let entry = self.entries[from as usize].take();
        self.entries[to as usize] = entry;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fdentry::FdEntry;

    fn file_entry() -> FdEntry {
        let file = tempfile::tempfile().expect("anonymous temp file");
        FdEntry::from_file(
            file,
            "/nowhere".to_owned(),
            wasi::RIGHTS_REGULAR_FILE_BASE,
            wasi::RIGHTS_REGULAR_FILE_INHERITING,
        )
        .expect("wrapping temp file")
    }

    #[test]
    fn insert_scans_from_zero_and_respects_capacity() {
        let mut table = FdTable::new(2).unwrap();
        assert_eq!(table.insert(file_entry()).unwrap(), 0);
        assert_eq!(table.insert(file_entry()).unwrap(), 1);
        assert_eq!(table.insert(file_entry()).unwrap_err(), Error::ENOMEM);

        table.remove(0).unwrap();
        assert_eq!(table.insert(file_entry()).unwrap(), 0);
    }

    #[test]
    fn get_distinguishes_ebadf_from_enotcapable() {
        let mut table = FdTable::new(4).unwrap();
        let fd = table.insert(file_entry()).unwrap();

        assert_eq!(table.get(99, 0, 0).unwrap_err(), Error::EBADF);
        assert_eq!(table.get(fd + 1, 0, 0).unwrap_err(), Error::EBADF);
        assert!(table.get(fd, wasi::__WASI_RIGHT_FD_READ, 0).is_ok());
        assert_eq!(
            table
                .get(fd, wasi::__WASI_RIGHT_PATH_OPEN, 0)
                .unwrap_err(),
            Error::ENOTCAPABLE
        );
    }

    #[test]
    fn remove_twice_is_ebadf() {
        let mut table = FdTable::new(4).unwrap();
        let fd = table.insert(file_entry()).unwrap();
        table.remove(fd).unwrap();
        assert_eq!(table.remove(fd).unwrap_err(), Error::EBADF);
    }

    #[test]
    fn renumber_moves_and_frees_the_source() {
        let mut table = FdTable::new(4).unwrap();
        let a = table.insert(file_entry()).unwrap();
        let b = table.insert(file_entry()).unwrap();

        table.renumber(a, b).unwrap();
        assert_eq!(table.get(a, 0, 0).unwrap_err(), Error::EBADF);
        assert!(table.get(b, 0, 0).is_ok());

        // Self-renumber of a live fd is a no-op.
        table.renumber(b, b).unwrap();
        assert!(table.get(b, 0, 0).is_ok());

        assert_eq!(table.renumber(a, b).unwrap_err(), Error::EBADF);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(FdTable::new(0).unwrap_err(), Error::EINVAL);
    }
}
