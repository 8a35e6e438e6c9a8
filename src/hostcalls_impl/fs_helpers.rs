//! Sandbox path resolution.
//!
//! Every guest-supplied path is reduced to an absolute host path and
//! checked for containment below the directory descriptor's canonical
//! real path before any host I/O touches it. A path that escapes, by
//! `..` hopping or via a symlink surviving canonicalization, fails with
//! ENOTCAPABLE.

use crate::fdentry::FdEntry;
use crate::{Error, Result};
use std::fs;
use std::io;

/// Hard cap on resolved path length, NUL included.
pub(crate) const PATH_MAX_BYTES: usize = 4096;

/// Lexical normalization: join `path` to `root` unless `path` is
/// already absolute, then fold out `.`, `..` and repeated separators.
/// `..` never pops past the start of the buffer.
fn normalize(root: &str, path: &str) -> String {
    let joined;
    let abs = if path.starts_with('/') {
        path
    } else {
        joined = format!("{}/{}", root, path);
        &joined
    };

    let mut resolved = String::with_capacity(abs.len());
    for token in abs.split('/') {
        match token {
            "" | "." => {}
            ".." => {
                let parent = resolved.rfind('/').unwrap_or(0);
                resolved.truncate(parent);
            }
            _ => {
                resolved.push('/');
                resolved.push_str(token);
            }
        }
    }
    resolved
}

/// True when `candidate` equals `root` or lives below it. A bare
/// prefix match is not enough: `/a` must not admit `/abc`.
pub(crate) fn path_contained(candidate: &str, root: &str) -> bool {
    match candidate.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || root.ends_with('/'),
        None => false,
    }
}

/// Canonicalize through the host, tolerating a missing final component
/// so that create-style operations can resolve paths that do not exist
/// yet.
fn canonicalize_tolerant(path: String) -> Result<String> {
    match fs::canonicalize(&path) {
        Ok(canonical) => {
            let canonical = canonical
                .into_os_string()
                .into_string()
                .map_err(|_| Error::EILSEQ)?;
            if canonical.len() + 1 > PATH_MAX_BYTES {
                return Err(Error::ENOBUFS);
            }
            Ok(canonical)
        }
        Err(ref err) if err.kind() == io::ErrorKind::NotFound => Ok(path),
        Err(err) => Err(err.into()),
    }
}

/// Resolve a guest path against a directory descriptor into an
/// absolute host path that is guaranteed to stay inside the
/// descriptor's sandbox root.
pub(crate) fn resolve_path(fe: &FdEntry, path: &str, follow: bool) -> Result<String> {
    let root = fe.real_path()?;

    let resolved = normalize(root, path);
    if resolved.len() + 1 > PATH_MAX_BYTES {
        return Err(Error::ENOBUFS);
    }

    let resolved = if follow {
        canonicalize_tolerant(resolved)?
    } else {
        resolved
    };

    if !path_contained(&resolved, root) {
        return Err(Error::ENOTCAPABLE);
    }

    Ok(resolved)
}
