/// Default size of the source window in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Configuration options for an [`Extractor`](crate::Extractor).
///
/// # Examples
///
/// ```rust
/// use jsonpick::{Extractor, ExtractorOptions, Path};
///
/// let options = ExtractorOptions {
///     buffer_capacity: 64,
///     ..Default::default()
/// };
/// let input = &b"{\"a\":1} {\"a\":2}"[..];
/// let values: Vec<_> = Extractor::with_options(input, Path::parse("a"), options)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(values.len(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorOptions {
    /// Size of the window the input is read through.
    ///
    /// Values larger than the window are still handled; the window only
    /// bounds how much is read per call and how far the skipper looks ahead
    /// before consuming. Values below 16 are raised to 16 so that every
    /// keyword fits in one peek.
    ///
    /// # Default
    ///
    /// `4096`
    pub buffer_capacity: usize,

    /// Whether to keep the bytes consumed for the current document, so that
    /// an [`ExtractError`](crate::ExtractError) can report them.
    ///
    /// This costs one copy of every document, so leave it off unless the
    /// diagnostics are wanted.
    ///
    /// # Default
    ///
    /// `false`
    pub retain_raw_input: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            retain_raw_input: false,
        }
    }
}
