//! Streaming path extraction for concatenated JSON documents.
//!
//! An [`Extractor`] reads whitespace-delimited JSON documents from any
//! [`std::io::Read`] and yields, for each one, the value found at a
//! dot-delimited [`Path`] such as `a.b.2.c`. Everything off the path is
//! skipped without being built, so the cost per document is close to the
//! bytes examined plus the size of the extracted value.
//!
//! ```rust
//! use jsonpick::{Extractor, Path};
//!
//! let input = &b"{\"user\":{\"id\":7}} {\"user\":{}} {\"user\":{\"id\":9}}"[..];
//! let ids: Vec<String> = Extractor::new(input, Path::parse("user.id"))
//!     .map(|value| value.map(|v| v.to_string()))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(ids, ["7", "null", "9"]);
//! ```
//!
//! String escapes other than `\"` and `\\` are passed through undecoded,
//! and all numbers are `f64`.

mod error;
mod extract;
mod lexer;
mod options;
mod path;
mod scratch;
mod skip;
mod source;
mod stream;
mod value;

#[cfg(test)]
mod tests;

pub use error::{Bracket, ErrorKind, ExtractError};
pub use options::{DEFAULT_BUFFER_CAPACITY, ExtractorOptions};
pub use path::{Path, Segment};
pub use source::Position;
pub use stream::Extractor;
pub use value::{Array, Map, Value};
