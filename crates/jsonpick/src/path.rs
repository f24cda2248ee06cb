use core::{convert::Infallible, fmt, str::FromStr};

use crate::error::ErrorKind;

/// One dot-delimited component of a [`Path`].
///
/// A segment is always stored as text. It is read as an array index only
/// when the extractor meets an array at that depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment(Box<str>);

impl Segment {
    /// The segment text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Interpret the segment as a zero-based array index.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidIndex`] unless the text is a non-negative integer.
    pub fn index(&self) -> Result<usize, ErrorKind> {
        self.0
            .parse()
            .map_err(|_| ErrorKind::InvalidIndex(self.0.to_string()))
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The location of the value to extract from every document.
///
/// ```rust
/// use jsonpick::Path;
///
/// let path = Path::parse("a.b.2.c");
/// assert_eq!(path.len(), 4);
/// assert_eq!(path.segments()[2].index().unwrap(), 2);
///
/// // a leading dot is ignored
/// assert_eq!(Path::parse(".a.b"), Path::parse("a.b"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Split `text` on `.`. A leading empty segment is dropped, so `""`
    /// addresses the whole document. There is no escape for literal dots.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split('.').peekable();
        if parts.peek() == Some(&"") {
            parts.next();
        }
        Self {
            segments: parts.map(Segment::from).collect(),
        }
    }

    /// Build a path from already separated segments, which may contain dots.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(|s| Segment::from(s.as_ref()))
                .collect(),
        }
    }

    /// The segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path addresses the whole document.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for Path {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment.as_str())?;
        }
        Ok(())
    }
}
