#![deny(unsafe_code)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use lbgquant::{quantize_tga, LbgOptions, MAX_CODEBOOK_BITS};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Compresses the colors of an uncompressed 24-bit TGA image
/// with Linde-Buzo-Gray vector quantization.
#[derive(Parser)]
#[command(version, about)]
struct Options {
    /// The TGA image to read.
    input: PathBuf,

    /// Where to write the quantized TGA image.
    output: PathBuf,

    /// The log2 of the maximum number of colors in the codebook.
    #[arg(value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_CODEBOOK_BITS)))]
    codebook_bits: u8,

    /// The seed for the random perturbations used to split codes.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Stop after this many iterations even if the distortion has not settled.
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Log every iteration.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let Options {
        input,
        output,
        codebook_bits,
        seed,
        max_iterations,
        verbose,
    } = Options::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install logger")?;

    let bytes =
        fs::read(&input).with_context(|| format!("failed to read {}", input.display()))?;

    let options = LbgOptions::new()
        .codebook_bits(codebook_bits)
        .max_iterations(max_iterations)
        .seed(seed);

    let time = Instant::now();
    let (quantized, summary) = quantize_tga(&bytes, &options)
        .with_context(|| format!("failed to quantize {}", input.display()))?;
    info!(
        iterations = summary.iterations,
        codebook_len = summary.codebook.len(),
        "quantization took {}ms",
        time.elapsed().as_millis()
    );

    fs::write(&output, quantized)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("mse = {}", summary.mse);
    println!("snr = {} dB", summary.snr);

    Ok(())
}
