//! Driving the extractor over a stream of documents.

use std::{io::Read, iter::FusedIterator};

use bstr::BString;
use tracing::debug;

use crate::{
    error::{ErrorKind, ExtractError},
    lexer::JsonReader,
    options::ExtractorOptions,
    path::Path,
    source::{ByteSource, Position},
    value::Value,
};

/// Extracts the value at one [`Path`] from every JSON document in a byte
/// stream.
///
/// Documents are whitespace-delimited top-level values with no other
/// framing. Each one yields exactly one item: the value at the path, or
/// [`Value::Null`] when the document does not contain it. Only the target is
/// materialised; everything else is skipped.
///
/// The first error ends the stream. Later calls to `next` return `None`.
///
/// # Examples
///
/// ```rust
/// use jsonpick::{Extractor, Path, Value};
///
/// let input = &b"{\"a\":{\"b\":[10,20]}}\n{\"a\":{}}\n"[..];
/// let mut extractor = Extractor::new(input, Path::parse("a.b.1"));
///
/// assert_eq!(extractor.next().unwrap().unwrap(), Value::Number(20.0));
/// assert_eq!(extractor.next().unwrap().unwrap(), Value::Null);
/// assert!(extractor.next().is_none());
/// ```
#[derive(Debug)]
pub struct Extractor<R> {
    reader: JsonReader<R>,
    path: Path,
    document: usize,
    done: bool,
}

impl<R: Read> Extractor<R> {
    /// Create an extractor with default options.
    pub fn new(input: R, path: Path) -> Self {
        Self::with_options(input, path, ExtractorOptions::default())
    }

    /// Create an extractor with the given options.
    pub fn with_options(input: R, path: Path, options: ExtractorOptions) -> Self {
        let source = ByteSource::new(input, options.buffer_capacity, options.retain_raw_input);
        debug!(%path, capacity = source.capacity(), "extractor created");
        Self {
            reader: JsonReader::new(source),
            path,
            document: 0,
            done: false,
        }
    }

    /// The path being extracted.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Position just past the last consumed byte.
    #[must_use]
    pub fn position(&self) -> Position {
        self.reader.source.position()
    }

    /// Number of documents extracted so far.
    #[must_use]
    pub fn documents(&self) -> usize {
        self.document
    }

    /// Read the next document. `Ok(None)` is a clean end of stream.
    fn next_document(&mut self) -> Result<Option<Value>, ErrorKind> {
        self.reader.reset();
        match self.reader.skip_whitespace() {
            Ok(()) => {}
            Err(ErrorKind::EndOfStream) => return Ok(None),
            Err(err) => return Err(err),
        }
        // only the document itself belongs in the diagnostics
        self.reader.source.reset_raw();

        let start = self.reader.source.position();
        debug!(document = self.document, offset = start.offset, "document start");
        self.reader.extract(self.path.segments()).map(Some)
    }

    fn error(&self, kind: ErrorKind) -> ExtractError {
        ExtractError {
            kind,
            position: self.reader.source.position(),
            document: self.document,
            raw: self.reader.source.raw().map(BString::from),
        }
    }
}

impl<R: Read> Iterator for Extractor<R> {
    type Item = Result<Value, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_document() {
            Ok(Some(value)) => {
                debug!(
                    document = self.document,
                    offset = self.reader.source.position().offset,
                    "document end"
                );
                self.document += 1;
                Some(Ok(value))
            }
            Ok(None) => {
                debug!(documents = self.document, "end of stream");
                self.done = true;
                None
            }
            Err(kind) => {
                self.done = true;
                Some(Err(self.error(kind)))
            }
        }
    }
}

impl<R: Read> FusedIterator for Extractor<R> {}

#[cfg(test)]
mod tests {
    use std::io::{self, Read};

    use super::Extractor;
    use crate::{ErrorKind, ExtractorOptions, Path, Value};

    fn options(retain_raw_input: bool) -> ExtractorOptions {
        ExtractorOptions {
            buffer_capacity: 16,
            retain_raw_input,
        }
    }

    #[test]
    fn one_value_per_document() {
        let input = &b"{\"a\":1}\n{\"a\":2}{\"b\":3}  true \"s\" 7"[..];
        let values: Vec<Value> = Extractor::new(input, Path::parse("a"))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            values,
            [1.0.into(), 2.0.into(), Value::Null, Value::Null, Value::Null, Value::Null]
        );
    }

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert_eq!(Extractor::new(&b""[..], Path::parse("a")).count(), 0);
        assert_eq!(Extractor::new(&b" \n\t\r\n"[..], Path::parse("a")).count(), 0);
    }

    #[test]
    fn error_reports_document_and_raw_bytes() {
        let input = &b"{\"a\":1}\n{\"a\": tru }"[..];
        let mut extractor = Extractor::with_options(input, Path::parse("a"), options(true));
        assert_eq!(extractor.next().unwrap().unwrap(), Value::Number(1.0));

        let err = extractor.next().unwrap().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownLiteral(_)));
        assert_eq!(err.document(), 1);
        assert_eq!(err.position().line, 2);
        assert_eq!(err.raw().unwrap(), "{\"a\": ");

        assert!(extractor.next().is_none());
        assert!(extractor.next().is_none());
    }

    #[test]
    fn raw_bytes_absent_unless_retained() {
        let mut extractor = Extractor::with_options(&b"{\"a\""[..], Path::parse("a"), options(false));
        let err = extractor.next().unwrap().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::EndOfStream));
        assert!(err.raw().is_none());
    }

    #[test]
    fn truncated_document_is_not_a_clean_end() {
        let mut extractor = Extractor::new(&b"{\"a\":1} {"[..], Path::parse("a"));
        assert!(extractor.next().unwrap().is_ok());
        assert!(matches!(
            extractor.next().unwrap().unwrap_err().kind(),
            ErrorKind::EndOfStream
        ));
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn reader_failure_is_io() {
        let mut extractor = Extractor::new(Broken, Path::parse("a"));
        let err = extractor.next().unwrap().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io(_)));
        assert!(extractor.next().is_none());
    }

    #[test]
    fn counts_documents() {
        let mut extractor = Extractor::new(&b"1 2 3"[..], Path::default());
        assert_eq!(extractor.by_ref().count(), 3);
        assert_eq!(extractor.documents(), 3);
        assert_eq!(extractor.position().offset, 5);
        assert_eq!(extractor.path(), &Path::default());
    }
}
