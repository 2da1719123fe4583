//! Transport encodings for diagram source text.
//!
//! Diagram source reaches the gateway either embedded in a URL segment or as a
//! request body, wrapped in one of several encoding schemes:
//!
//! - [`Scheme::Compressed`]: raw deflate, then the URL-safe 64-symbol alphabet
//!   (the classic `/svg/SyfFKj2rKt3CoKnELR1Io4ZDoSa70000` form)
//! - [`Scheme::Zopfli`]: alphabet text, then raw deflate (binary request bodies)
//! - [`Scheme::Plain`]: alphabet text only
//! - [`Scheme::Verbatim`]: no encoding at all
//!
//! [`decode_or_placeholder`] never fails: undecodable payloads turn into a small
//! diagram that says so, which keeps the rest of the pipeline on the happy path.
//!
//! # Example
//!
//! ```
//! use umlgate_codec::{Scheme, decode, encode};
//!
//! let source = "@startuml\nBob -> Alice : hello\n@enduml";
//! let token = encode(source, Scheme::Compressed).unwrap();
//! assert_eq!(decode(&token, Scheme::Compressed).unwrap(), source);
//! ```

mod alphabet;
mod deflate;
mod error;
mod scheme;
mod tail;

pub use error::DecodeError;
pub use scheme::{PLACEHOLDER_SOURCE, Scheme, decode, decode_or_placeholder, encode};
pub use tail::UrlTail;
