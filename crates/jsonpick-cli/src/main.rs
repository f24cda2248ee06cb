//! `jsonpick PATH`: print the value at `PATH` for every JSON document on
//! standard input, one per line.

use std::io::{self, BufWriter, Read, Write};

use anyhow::{Context, Result};
use clap::Parser;
use jsonpick::{DEFAULT_BUFFER_CAPACITY, Extractor, ExtractorOptions, Path};
use tracing::{Level, debug, error};

/// Extract one value from each JSON document in a stream.
#[derive(Parser, Debug)]
#[command(name = "jsonpick", version)]
#[command(
    long_about = "Reads whitespace-separated JSON documents from standard input and writes, \
                  for each one, the JSON value found at PATH, or null when the document does \
                  not contain it. Values off the path are skipped without being decoded."
)]
struct Cli {
    /// Dot-delimited path such as `a.b.2.c`; a leading dot is ignored and an
    /// empty path selects the whole document
    path: Path,

    /// Log diagnostics to standard error
    #[arg(short, long)]
    debug: bool,

    /// Size in bytes of the input window
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_BUFFER_CAPACITY)]
    buffer_capacity: usize,
}

impl Cli {
    fn level(&self) -> Level {
        if self.debug { Level::DEBUG } else { Level::WARN }
    }

    fn options(&self) -> ExtractorOptions {
        ExtractorOptions {
            buffer_capacity: self.buffer_capacity,
            retain_raw_input: true,
        }
    }
}

/// Write one line per document to `output`. Returns the number of documents.
fn run(cli: &Cli, input: impl Read, output: impl Write) -> Result<usize> {
    let mut output = BufWriter::new(output);
    let mut written = 0;
    for result in Extractor::with_options(input, cli.path.clone(), cli.options()) {
        match result {
            Ok(value) => {
                writeln!(output, "{value}").context("failed to write output")?;
                written += 1;
            }
            Err(err) => {
                output.flush().context("failed to write output")?;
                error!(
                    document = err.document(),
                    raw = %err.raw().map(|raw| raw.to_string()).unwrap_or_default(),
                    "{}",
                    err.kind()
                );
                return Err(err).context(format!("failed to extract `{}`", cli.path));
            }
        }
    }
    output.flush().context("failed to write output")?;
    Ok(written)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.level())
        .with_writer(io::stderr)
        .init();

    debug!(path = %cli.path, buffer_capacity = cli.buffer_capacity, "starting");
    let documents = run(&cli, io::stdin().lock(), io::stdout().lock())?;
    debug!(documents, "done");
    Ok(())
}
