//! HTTP request handlers.

pub(crate) mod coder;
pub(crate) mod diagram;
