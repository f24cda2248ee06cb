//! Skipping values that lie off the requested path.
//!
//! Scalars go through the ordinary literal lexer. Objects and arrays are
//! never tokenised: the skipper scans peeked bytes, tracks open brackets on
//! an explicit stack and string state with a single flag, and discards the
//! whole span once the outermost bracket closes. Nesting depth therefore
//! costs heap, not native stack.

use std::io::Read;

use bstr::BString;
use tracing::trace;

use crate::{
    error::{Bracket, ErrorKind},
    lexer::JsonReader,
};

impl<R: Read> JsonReader<R> {
    /// Advance past exactly one JSON value without building it.
    pub(crate) fn skip_value(&mut self) -> Result<(), ErrorKind> {
        self.skip_whitespace()?;
        if self.try_literal()?.is_some() {
            return Ok(());
        }

        let first = self.source.peek_byte()?;
        if Bracket::opened_by(first).is_none() {
            return Err(ErrorKind::MalformedLiteral(BString::from(vec![first])));
        }

        self.depth.reset();
        let mut in_string = false;
        let mut prev = 0u8;
        let mut length = 0;
        loop {
            length += 1;
            let byte = match self.source.peek(length).map(|window| window[length - 1]) {
                Ok(byte) => byte,
                Err(ErrorKind::LookaheadExceeded { .. }) => {
                    // Everything before the newest byte is already scanned.
                    trace!(scanned = length - 1, "skip lookahead filled the window");
                    self.source.consume(length - 1);
                    length = 0;
                    continue;
                }
                Err(err) => return Err(err),
            };

            if in_string {
                if byte == b'"' && prev != b'\\' {
                    in_string = false;
                }
                // `\\` cancels, so a following quote still closes the string
                prev = if byte == b'\\' && prev == b'\\' { 0 } else { byte };
                continue;
            }

            match byte {
                b'{' | b'[' => {
                    if let Some(open) = Bracket::opened_by(byte) {
                        self.depth.push(open);
                    }
                }
                b'}' | b']' => {
                    let open = self.depth.pop();
                    if open != Bracket::closed_by(byte) {
                        return Err(ErrorKind::MalformedStructure {
                            open: open.unwrap_or_default(),
                            close: char::from(byte),
                        });
                    }
                    if self.depth.is_empty() {
                        break;
                    }
                }
                b'"' => in_string = true,
                _ => {}
            }
            prev = byte;
        }

        self.source.consume(length);
        Ok(())
    }
}
