use std::io::{self, Read};

use crate::{ExtractError, Extractor, ExtractorOptions, Path, Value};

/// Reader that hands out its input in the given chunk sizes, cycling
/// through them.
pub(crate) struct Chunked<'a> {
    input: &'a [u8],
    sizes: Vec<usize>,
    next: usize,
}

impl<'a> Chunked<'a> {
    pub(crate) fn new(input: &'a [u8], sizes: &[usize]) -> Self {
        let sizes = sizes.iter().map(|s| 1 + s % 37).collect::<Vec<_>>();
        Self {
            input,
            sizes: if sizes.is_empty() { vec![1] } else { sizes },
            next: 0,
        }
    }
}

impl Read for Chunked<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let size = self.sizes[self.next % self.sizes.len()];
        self.next += 1;
        let n = size.min(buf.len()).min(self.input.len());
        buf[..n].copy_from_slice(&self.input[..n]);
        self.input = &self.input[n..];
        Ok(n)
    }
}

pub(crate) fn extract_all(input: &[u8], path: &str) -> Result<Vec<Value>, ExtractError> {
    Extractor::new(input, Path::parse(path)).collect()
}

pub(crate) fn extract_all_with(
    input: impl Read,
    path: Path,
    buffer_capacity: usize,
) -> Result<Vec<Value>, ExtractError> {
    let options = ExtractorOptions {
        buffer_capacity,
        retain_raw_input: true,
    };
    Extractor::with_options(input, path, options).collect()
}

/// Reference lookup over a fully decoded document. `Err` carries the
/// segment that could not be used as an array index.
pub(crate) fn lookup<'a>(mut value: &'a Value, path: &'a Path) -> Result<Value, &'a str> {
    for segment in path.segments() {
        value = match value {
            Value::Object(members) => match members.get(segment.as_str()) {
                Some(member) => member,
                None => return Ok(Value::Null),
            },
            Value::Array(items) => {
                let index: usize = segment.as_str().parse().map_err(|_| segment.as_str())?;
                match items.get(index) {
                    Some(item) => item,
                    None => return Ok(Value::Null),
                }
            }
            _ => return Ok(Value::Null),
        };
    }
    Ok(value.clone())
}
