mod fs;
mod fs_helpers;
mod misc;

pub(crate) use self::fs::*;
pub(crate) use self::misc::*;
