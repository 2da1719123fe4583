//! CLI command implementations.

pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod serve;

pub(crate) use decode::DecodeArgs;
pub(crate) use encode::EncodeArgs;
pub(crate) use serve::ServeArgs;
