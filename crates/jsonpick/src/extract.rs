//! Path-directed descent through one document.
//!
//! [`JsonReader::extract`] walks the remaining path. Object members and
//! array elements that do not match the next segment are skipped; the one
//! that matches is entered with the rest of the path. When the path runs
//! out, the value under the cursor is parsed in full.
//!
//! Recursion follows the path only, so its depth is bounded by the number of
//! segments. Full parsing of the target uses an explicit frame stack.

use std::{io::Read, mem};

use bstr::BString;

use crate::{
    error::ErrorKind,
    lexer::JsonReader,
    path::Segment,
    value::{Array, Map, Value},
};

/// A container being filled by [`JsonReader::parse_value`].
enum Frame {
    Array(Array),
    /// Members so far and the key awaiting its value.
    Object(Map, String),
}

impl Frame {
    fn into_value(self) -> Value {
        match self {
            Self::Array(items) => Value::Array(items),
            Self::Object(members, _) => Value::Object(members),
        }
    }
}

impl<R: Read> JsonReader<R> {
    /// Return the value at `path` under the cursor, or `Null` when the path
    /// does not exist there. The whole value under the cursor is consumed
    /// either way.
    pub(crate) fn extract(&mut self, path: &[Segment]) -> Result<Value, ErrorKind> {
        let Some((segment, rest)) = path.split_first() else {
            return self.parse_value();
        };

        self.skip_whitespace()?;
        match self.source.peek_byte()? {
            b'{' => self.extract_from_object(segment, rest),
            b'[' => self.extract_from_array(segment, rest),
            _ => {
                // a scalar has no members to descend into
                self.skip_value()?;
                Ok(Value::Null)
            }
        }
    }

    fn extract_from_object(&mut self, segment: &Segment, rest: &[Segment]) -> Result<Value, ErrorKind> {
        self.expect_byte(b'{', "'{'")?;

        let mut result = Value::Null;
        let mut first = true;
        loop {
            self.skip_whitespace()?;
            if self.source.peek_byte()? == b'}' {
                self.source.consume(1);
                return Ok(result);
            }
            if !first {
                self.expect_byte(b',', "',' between object members")?;
                self.skip_whitespace()?;
            }
            first = false;

            self.parse_string()?;
            let matched = self.text.as_slice() == segment.as_bytes();
            self.skip_whitespace()?;
            self.expect_byte(b':', "':' after object key")?;

            if matched {
                // a repeated key overwrites the earlier result
                result = self.extract(rest)?;
            } else {
                self.skip_value()?;
            }
        }
    }

    fn extract_from_array(&mut self, segment: &Segment, rest: &[Segment]) -> Result<Value, ErrorKind> {
        let target = segment.index()?;
        self.expect_byte(b'[', "'['")?;

        let mut result = Value::Null;
        let mut index = 0;
        loop {
            self.skip_whitespace()?;
            if self.source.peek_byte()? == b']' {
                self.source.consume(1);
                return Ok(result);
            }
            if index > 0 {
                self.expect_byte(b',', "',' between array elements")?;
                self.skip_whitespace()?;
            }

            if index == target {
                result = self.extract(rest)?;
            } else {
                self.skip_value()?;
            }
            index += 1;
        }
    }

    /// Parse the value under the cursor completely.
    pub(crate) fn parse_value(&mut self) -> Result<Value, ErrorKind> {
        let mut frames: Vec<Frame> = Vec::new();
        'value: loop {
            self.skip_whitespace()?;
            let mut value = match self.source.peek_byte()? {
                b'{' => {
                    self.source.consume(1);
                    self.skip_whitespace()?;
                    if self.source.peek_byte()? == b'}' {
                        self.source.consume(1);
                        Value::Object(Map::new())
                    } else {
                        let key = self.parse_key()?;
                        frames.push(Frame::Object(Map::new(), key));
                        continue 'value;
                    }
                }
                b'[' => {
                    self.source.consume(1);
                    self.skip_whitespace()?;
                    if self.source.peek_byte()? == b']' {
                        self.source.consume(1);
                        Value::Array(Array::new())
                    } else {
                        frames.push(Frame::Array(Array::new()));
                        continue 'value;
                    }
                }
                byte => match self.try_literal()? {
                    Some(lexeme) => self.lexeme_value(lexeme),
                    None => return Err(ErrorKind::MalformedLiteral(BString::from(vec![byte]))),
                },
            };

            // Hand the finished value to its parent, closing every parent
            // whose last member it was.
            loop {
                let Some(mut frame) = frames.pop() else {
                    return Ok(value);
                };
                self.skip_whitespace()?;
                let byte = self.source.peek_byte()?;
                let more = match &mut frame {
                    Frame::Array(items) => {
                        items.push(value);
                        match byte {
                            b',' => true,
                            b']' => false,
                            other => return Err(ErrorKind::unexpected("',' or ']'", other)),
                        }
                    }
                    Frame::Object(members, key) => {
                        members.insert(mem::take(key), value);
                        match byte {
                            b',' => true,
                            b'}' => false,
                            other => return Err(ErrorKind::unexpected("',' or '}'", other)),
                        }
                    }
                };
                self.source.consume(1);

                if more {
                    if let Frame::Object(_, key) = &mut frame {
                        self.skip_whitespace()?;
                        *key = self.parse_key()?;
                    }
                    frames.push(frame);
                    continue 'value;
                }
                value = frame.into_value();
            }
        }
    }

    /// Read `"key" :` and return the key.
    fn parse_key(&mut self) -> Result<String, ErrorKind> {
        self.parse_string()?;
        let key = self.text_string();
        self.skip_whitespace()?;
        self.expect_byte(b':', "':' after object key")?;
        Ok(key)
    }

    fn expect_byte(&mut self, wanted: u8, expected: &'static str) -> Result<(), ErrorKind> {
        let byte = self.source.peek_byte()?;
        if byte != wanted {
            return Err(ErrorKind::unexpected(expected, byte));
        }
        self.source.consume(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::{
        error::ErrorKind, lexer::JsonReader, path::Path, source::ByteSource, value::Value,
    };

    fn extract(doc: &str, path: &str) -> Result<Value, ErrorKind> {
        let mut r = JsonReader::new(ByteSource::new(doc.as_bytes(), 64, false));
        r.extract(Path::parse(path).segments())
    }

    fn json(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[rstest]
    #[case(r#"{"a":1}"#, "a", "1")]
    #[case(r#"{"a":1}"#, "b", "null")]
    #[case(r#"{"a":{"b":[10,20,{"c":"x"}]}}"#, "a.b.2.c", r#""x""#)]
    #[case(r#"{"a":[1,2]}"#, "a.5", "null")]
    #[case(r#"{"a":5}"#, "a.b", "null")]
    #[case(r#"{"a":"s"}"#, "a.0", "null")]
    #[case(r#"{"a":{"b":true}}"#, "a", r#"{"b":true}"#)]
    #[case(r#"[{"k":1},{"k":2}]"#, "1.k", "2")]
    #[case(r#"{"a":1,"a":2}"#, "a", "2")]
    #[case(r#"{ "x" : [ null , false ] , "y" : 3 }"#, "x.1", "false")]
    #[case(r#"{"skip":{"deep":[[{"}":"]"}]]},"want":-1.5e1}"#, "want", "-15")]
    #[case(r#"{"0":"key not index"}"#, "0", r#""key not index""#)]
    fn extracts(#[case] doc: &str, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(extract(doc, path).unwrap(), json(expected));
    }

    #[rstest]
    #[case(r#"{"a":[1,{"b":[]},"s",null,{}]}"#)]
    #[case(r#"[1,[2,[3,[4]]],{"k":{"v":"w"}}]"#)]
    #[case(r#""top""#)]
    #[case("12")]
    #[case("{}")]
    #[case("[]")]
    fn empty_path_parses_everything(#[case] doc: &str) {
        assert_eq!(extract(doc, "").unwrap(), json(doc));
    }

    #[test]
    fn empty_path_parses_deep_values_iteratively() {
        let depth = 50_000;
        let doc = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let mut value = extract(&doc, "").unwrap();
        let mut levels = 1;
        while let Value::Array(mut items) = value {
            match items.pop() {
                Some(inner) => {
                    levels += 1;
                    value = inner;
                }
                None => break,
            }
        }
        assert_eq!(levels, depth);
    }

    #[test]
    fn escaped_quote_in_target() {
        assert_eq!(
            extract(r#"{"a":"say \"hi\""}"#, "a").unwrap(),
            Value::String(r#"say "hi""#.into())
        );
    }

    #[test]
    fn other_escapes_pass_through() {
        assert_eq!(
            extract(r#"{"a":"one\ntwo"}"#, "a").unwrap(),
            Value::String(r"one\ntwo".into())
        );
    }

    #[test]
    fn escaped_key_matches_decoded_segment() {
        assert_eq!(extract(r#"{"q\"k":7}"#, "q\"k").unwrap(), Value::Number(7.0));
    }

    #[test]
    fn non_numeric_segment_into_array() {
        assert!(matches!(
            extract("[1,2]", "x"),
            Err(ErrorKind::InvalidIndex(segment)) if segment == "x"
        ));
    }

    #[rstest]
    #[case(r#"{"a" 1}"#, "a", "':' after object key")]
    #[case(r#"{"a":1 "b":2}"#, "b", "',' between object members")]
    #[case("[1 2]", "1", "',' between array elements")]
    #[case("[1 2]", "", "',' or ']'")]
    #[case(r#"{"a":1 "b":2}"#, "", "',' or '}'")]
    fn missing_separators(#[case] doc: &str, #[case] path: &str, #[case] wanted: &str) {
        match extract(doc, path) {
            Err(ErrorKind::UnexpectedToken { expected, .. }) => assert_eq!(expected, wanted),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[rstest]
    #[case(r#"{"a":}"#, "a")]
    #[case("[,]", "")]
    #[case("[1,]", "")]
    #[case("{\"a\":1,}", "b")]
    fn malformed_values(#[case] doc: &str, #[case] path: &str) {
        assert!(matches!(extract(doc, path), Err(ErrorKind::MalformedLiteral(_))));
    }

    #[test]
    fn truncated_document() {
        assert!(matches!(extract(r#"{"a":{"b""#, "a.b"), Err(ErrorKind::EndOfStream)));
    }
}
