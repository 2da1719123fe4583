//! `umlgate decode` command implementation.

use clap::Args;
use umlgate_codec::{Scheme, UrlTail, decode};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the decode command.
#[derive(Args)]
pub(crate) struct DecodeArgs {
    /// URL token, or a diagram URL path ending in one.
    token: String,
}

impl DecodeArgs {
    /// Execute the decode command.
    ///
    /// # Errors
    ///
    /// Returns an error if the token does not decode.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let tail = UrlTail::parse(&self.token);
        let source = decode(tail.token.as_bytes(), Scheme::Compressed)?;
        output.result(&source)?;
        Ok(())
    }
}
