//! `umlgate encode` command implementation.

use std::io::Read;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use umlgate_codec::{Scheme, encode};

use crate::error::CliError;
use crate::output::Output;

/// Encoding produced by the encode command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum SchemeArg {
    /// URL token (deflate + URL alphabet).
    #[default]
    Compressed,
    /// Deflated alphabet text, printed as hex.
    Zopfli,
    /// URL alphabet only.
    Plain,
}

impl From<SchemeArg> for Scheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Compressed => Self::Compressed,
            SchemeArg::Zopfli => Self::Zopfli,
            SchemeArg::Plain => Self::Plain,
        }
    }
}

/// Arguments for the encode command.
#[derive(Args)]
pub(crate) struct EncodeArgs {
    /// Diagram source file (default: stdin).
    file: Option<PathBuf>,

    /// Encoding scheme.
    #[arg(short, long, value_enum, default_value_t)]
    scheme: SchemeArg,
}

impl EncodeArgs {
    /// Execute the encode command.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or is not UTF-8.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let source = match &self.file {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut source = String::new();
                std::io::stdin().read_to_string(&mut source)?;
                source
            }
        };
        output.result(&render(&source, self.scheme)?)?;
        Ok(())
    }
}

/// Printable form of the encoded source.
fn render(source: &str, scheme: SchemeArg) -> Result<String, CliError> {
    let payload = encode(source.trim_end(), scheme.into())?;
    Ok(match scheme {
        SchemeArg::Zopfli => hex::encode(payload),
        SchemeArg::Compressed | SchemeArg::Plain => String::from_utf8_lossy(&payload).into_owned(),
    })
}
