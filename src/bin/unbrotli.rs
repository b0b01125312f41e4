use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use unbrotli::{decompress_with, DecodeOptions, Dictionary};

#[derive(Parser, Debug)]
#[command(name = "unbrotli")]
#[command(about = "Decompress Brotli (RFC 7932) streams")]
#[command(version)]
struct Args {
    /// Input Brotli file (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (use - for stdout)
    #[arg(short, long)]
    output: PathBuf,

    /// Replace the built-in dictionary with this file (RFC 7932 layout)
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Accept large-window streams (window sizes up to 1 GiB)
    #[arg(long)]
    large_window: bool,

    /// Show verbose statistics
    #[arg(short, long)]
    verbose: bool,
}

const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "unbrotli=debug" } else { "warn" }));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let input = if args.input.to_str() == Some("-") {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(&args.input)?
    };

    let dictionary_bytes = args.dictionary.as_ref().map(fs::read).transpose()?;
    let custom_dictionary = dictionary_bytes.as_deref().map(Dictionary::from_bytes).transpose()?;
    let options = DecodeOptions { custom_dictionary, large_window: args.large_window };

    let start = std::time::Instant::now();
    let data = decompress_with(&input, &options)?;
    let elapsed = start.elapsed();

    let mut output: Box<dyn Write> = if args.output.to_str() == Some("-") {
        Box::new(io::stdout().lock())
    } else {
        Box::new(BufWriter::new(File::create(&args.output)?))
    };
    output.write_all(&data)?;
    output.flush()?;

    if args.verbose {
        eprintln!("Decompression complete:");
        eprintln!("  Input bytes:      {}", input.len());
        eprintln!("  Output bytes:     {}", data.len());
        eprintln!("  Ratio:            {:.2}", data.len() as f64 / input.len().max(1) as f64);
        eprintln!("  Time:             {:.2?}", elapsed);
        eprintln!("  Throughput:       {:.1} MB/s", data.len() as f64 / elapsed.as_secs_f64() / 1_000_000.0);
    }

    Ok(())
}
