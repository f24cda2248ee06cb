//! Lexical primitives over a [`ByteSource`].
//!
//! [`JsonReader`] bundles the byte source with the scratch buffers every
//! lexical call writes into. The skipper and the path extractor extend it in
//! their own modules.
//!
//! String decoding is deliberately narrow: `\\` collapses to one backslash
//! and `\"` to a quote. Every other escape (`\n`, `\t`, `\u00e9`, ...) stays
//! in the output as the literal bytes that spelled it.

use std::io::Read;

use bstr::{BString, ByteSlice};

use crate::{
    error::{Bracket, ErrorKind},
    scratch::ScratchBuffer,
    source::ByteSource,
    value::Value,
};

/// A scalar recognised by [`JsonReader::try_literal`].
///
/// String contents are left in the reader's text scratch rather than copied
/// out, so skipping a string never allocates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Lexeme {
    String,
    Boolean(bool),
    Null,
    Number(f64),
}

#[inline]
pub(crate) fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
fn is_number_byte(byte: u8) -> bool {
    matches!(byte, b'0'..=b'9' | b'e' | b'E' | b'.' | b'+' | b'-')
}

fn skip_digits(bytes: &[u8]) -> &[u8] {
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    &bytes[digits..]
}

/// Whether `bytes` is exactly one RFC 8259 number.
fn is_json_number(bytes: &[u8]) -> bool {
    let mut rest = bytes;
    if let [b'-', tail @ ..] = rest {
        rest = tail;
    }
    rest = match rest {
        [b'0', tail @ ..] => tail,
        [b'1'..=b'9', ..] => skip_digits(rest),
        _ => return false,
    };
    if let [b'.', tail @ ..] = rest {
        let after = skip_digits(tail);
        if after.len() == tail.len() {
            return false;
        }
        rest = after;
    }
    if let [b'e' | b'E', tail @ ..] = rest {
        let tail = match tail {
            [b'+' | b'-', signed @ ..] => signed,
            unsigned => unsigned,
        };
        let after = skip_digits(tail);
        if after.len() == tail.len() {
            return false;
        }
        rest = after;
    }
    rest.is_empty()
}

#[derive(Debug)]
pub(crate) struct JsonReader<R> {
    pub(crate) source: ByteSource<R>,
    /// Decoded bytes of the most recent string or key.
    pub(crate) text: ScratchBuffer,
    /// Captured span of the most recent number.
    number: ScratchBuffer,
    /// Open containers while skipping a compound value.
    pub(crate) depth: ScratchBuffer<Bracket>,
}

impl<R: Read> JsonReader<R> {
    pub(crate) fn new(source: ByteSource<R>) -> Self {
        Self {
            source,
            text: ScratchBuffer::new(),
            number: ScratchBuffer::new(),
            depth: ScratchBuffer::new(),
        }
    }

    /// Forget everything about the previous document. Scratch storage is
    /// kept for the next one.
    pub(crate) fn reset(&mut self) {
        self.text.reset();
        self.number.reset();
        self.depth.reset();
        self.source.reset_raw();
    }

    /// Consume JSON whitespace up to the next significant byte.
    ///
    /// Fails with [`ErrorKind::EndOfStream`] if the input ends first.
    pub(crate) fn skip_whitespace(&mut self) -> Result<(), ErrorKind> {
        loop {
            let window = self.source.fill_buf()?;
            if window.is_empty() {
                return Err(ErrorKind::EndOfStream);
            }
            let blank = window.iter().take_while(|b| is_whitespace(**b)).count();
            let exhausted = blank == window.len();
            self.source.consume(blank);
            if !exhausted {
                return Ok(());
            }
        }
    }

    /// Read a string literal into `self.text`.
    pub(crate) fn parse_string(&mut self) -> Result<(), ErrorKind> {
        self.text.reset();
        match self.source.peek_byte()? {
            b'"' => self.source.consume(1),
            other => return Err(ErrorKind::MalformedLiteral(BString::from(vec![other]))),
        }

        let mut prev = 0u8;
        loop {
            let window = self.source.fill_buf()?;
            if window.is_empty() {
                return Err(ErrorKind::EndOfStream);
            }

            let mut used = 0;
            let mut closed = false;
            for &b in window {
                used += 1;
                if b == b'\\' && prev == b'\\' {
                    // `\\` keeps the first backslash only
                    prev = 0;
                    continue;
                }
                if b == b'"' {
                    if prev != b'\\' {
                        closed = true;
                        break;
                    }
                    self.text.insert(self.text.len() - 1, b'"');
                    prev = b;
                    continue;
                }
                self.text.push(b);
                prev = b;
            }

            self.source.consume(used);
            if closed {
                return Ok(());
            }
        }
    }

    /// Match `ident` exactly and yield `lexeme`.
    fn parse_identifier(&mut self, ident: &'static [u8], lexeme: Lexeme) -> Result<Lexeme, ErrorKind> {
        let window = self.source.peek(ident.len())?;
        if window != ident {
            return Err(ErrorKind::UnknownLiteral(BString::from(window)));
        }
        self.source.consume(ident.len());
        Ok(lexeme)
    }

    /// Greedily read a number. `Ok(None)` means the next byte cannot start
    /// one.
    pub(crate) fn parse_number(&mut self) -> Result<Option<f64>, ErrorKind> {
        self.number.reset();
        loop {
            let window = self.source.fill_buf()?;
            if window.is_empty() {
                // a top-level number may end the stream
                break;
            }
            let run = window.iter().take_while(|b| is_number_byte(**b)).count();
            self.number.extend_from_slice(&window[..run]);
            let exhausted = run == window.len();
            self.source.consume(run);
            if !exhausted {
                break;
            }
        }

        if self.number.is_empty() {
            return Ok(None);
        }
        let span = self.number.as_slice();
        span.to_str()
            .ok()
            .filter(|_| is_json_number(span))
            .and_then(|text| text.parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| ErrorKind::MalformedLiteral(BString::from(span)))
    }

    /// Read a scalar if one starts here. `Ok(None)` leaves the source
    /// untouched and means the value is an object, an array, or garbage.
    pub(crate) fn try_literal(&mut self) -> Result<Option<Lexeme>, ErrorKind> {
        match self.source.peek_byte()? {
            b'"' => self.parse_string().map(|()| Some(Lexeme::String)),
            b't' => self.parse_identifier(b"true", Lexeme::Boolean(true)).map(Some),
            b'f' => self.parse_identifier(b"false", Lexeme::Boolean(false)).map(Some),
            b'n' => self.parse_identifier(b"null", Lexeme::Null).map(Some),
            _ => Ok(self.parse_number()?.map(Lexeme::Number)),
        }
    }

    /// Copy the decoded string out of the scratch buffer.
    pub(crate) fn text_string(&self) -> String {
        self.text.as_slice().to_str_lossy().into_owned()
    }

    pub(crate) fn lexeme_value(&self, lexeme: Lexeme) -> Value {
        match lexeme {
            Lexeme::String => Value::String(self.text_string()),
            Lexeme::Boolean(b) => Value::Boolean(b),
            Lexeme::Null => Value::Null,
            Lexeme::Number(n) => Value::Number(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{JsonReader, Lexeme, is_json_number};
    use crate::{error::ErrorKind, source::ByteSource, value::Value};

    fn reader(input: &[u8]) -> JsonReader<&[u8]> {
        JsonReader::new(ByteSource::new(input, 64, false))
    }

    fn string_of(input: &[u8]) -> Vec<u8> {
        let mut r = reader(input);
        r.parse_string().unwrap();
        r.text.as_slice().to_vec()
    }

    #[test]
    fn whitespace_stops_at_significant_byte() {
        let mut r = reader(b" \t\r\n x");
        r.skip_whitespace().unwrap();
        assert_eq!(r.source.peek_byte().unwrap(), b'x');
    }

    #[test]
    fn whitespace_to_end_is_end_of_stream() {
        let mut r = reader(b"  \n");
        assert!(matches!(r.skip_whitespace(), Err(ErrorKind::EndOfStream)));
    }

    #[rstest]
    #[case(br#""plain""#, b"plain")]
    #[case(br#""""#, b"")]
    #[case(br#""say \"hi\"""#, br#"say "hi""#)]
    #[case(br#""back\\slash""#, br"back\slash")]
    #[case(br#""ends\\""#, br"ends\")]
    #[case(br#""line\nbreak""#, br"line\nbreak")]
    #[case("\"é\"".as_bytes(), "é".as_bytes())]
    #[case(br#""{[not structure]}""#, b"{[not structure]}")]
    fn string_escapes(#[case] input: &[u8], #[case] expected: &[u8]) {
        assert_eq!(string_of(input), expected);
    }

    #[test]
    fn string_leaves_following_bytes() {
        let mut r = reader(br#""k": 1"#);
        r.parse_string().unwrap();
        assert_eq!(r.source.peek_byte().unwrap(), b':');
    }

    #[test]
    fn string_requires_opening_quote() {
        let mut r = reader(b"abc");
        assert!(matches!(r.parse_string(), Err(ErrorKind::MalformedLiteral(_))));
    }

    #[test]
    fn unterminated_string_is_end_of_stream() {
        let mut r = reader(br#""open"#);
        assert!(matches!(r.parse_string(), Err(ErrorKind::EndOfStream)));
    }

    #[test]
    fn string_longer_than_window() {
        let body = "x".repeat(200);
        let input = format!("\"{body}\"");
        let mut r = JsonReader::new(ByteSource::new(input.as_bytes(), 16, false));
        r.parse_string().unwrap();
        assert_eq!(r.text_string(), body);
    }

    #[rstest]
    #[case(b"true", Lexeme::Boolean(true))]
    #[case(b"false", Lexeme::Boolean(false))]
    #[case(b"null", Lexeme::Null)]
    #[case(b"-12.5e2,", Lexeme::Number(-1250.0))]
    #[case(b"0", Lexeme::Number(0.0))]
    fn literals(#[case] input: &[u8], #[case] expected: Lexeme) {
        assert_eq!(reader(input).try_literal().unwrap(), Some(expected));
    }

    #[test]
    fn unknown_identifier() {
        let mut r = reader(b"trve ");
        match r.try_literal() {
            Err(ErrorKind::UnknownLiteral(bytes)) => assert_eq!(bytes, "trve"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn compound_is_not_a_literal() {
        let mut r = reader(b"{}");
        assert_eq!(r.try_literal().unwrap(), None);
        assert_eq!(r.source.peek_byte().unwrap(), b'{');
    }

    #[rstest]
    #[case(b"01")]
    #[case(b"1.")]
    #[case(b".5")]
    #[case(b"+1")]
    #[case(b"1e")]
    #[case(b"--1")]
    #[case(b"1e999")]
    fn malformed_numbers(#[case] input: &[u8]) {
        assert!(matches!(
            reader(input).parse_number(),
            Err(ErrorKind::MalformedLiteral(_))
        ));
    }

    #[test]
    fn number_grammar() {
        for ok in ["0", "-0", "10", "1.25", "1e5", "1E+5", "-2.5e-3"] {
            assert!(is_json_number(ok.as_bytes()), "{ok}");
        }
    }

    #[test]
    fn string_lexeme_materialises_lossily() {
        let mut r = reader(b"\"caf\xff\"");
        let lexeme = r.try_literal().unwrap().unwrap();
        assert_eq!(r.lexeme_value(lexeme), Value::String("caf\u{fffd}".into()));
    }
}
