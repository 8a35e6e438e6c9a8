pub(crate) mod fdentry_impl;
pub(crate) mod host_impl;
pub(crate) mod hostcalls_impl;

pub(crate) use self::host_impl::errno_from_host;
