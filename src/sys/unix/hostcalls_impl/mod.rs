mod fs;
mod misc;

pub(crate) use self::fs::*;
pub(crate) use self::misc::*;
