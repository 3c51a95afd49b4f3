//! KTX2 header parsing and key/value data patching.

pub(crate) mod constants;
pub mod layout;
pub mod patch;
