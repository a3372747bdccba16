//! Lithe Shim CLI
//!
//! Inspect the toolchain setup and exercise byte extraction on the host heap.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lithe_shim::config::ShimConfig;
use lithe_shim::extract::{classify, ByteArrayShape};
use lithe_shim::host::byte_array_to_vec;
use lithe_shim::runtime::{HostHeap, ManagedRuntime};
use lithe_shim::{logging, LeanObject};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "lithe-shim")]
#[command(version)]
#[command(about = "Lean 4 byte-array bridge", long_about = None)]
struct Cli {
    /// Config file (default: nearest lithe.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration as TOML
    Config,

    /// Build a file's bytes as Lean objects and check extraction
    Probe {
        /// Input file
        input: PathBuf,

        /// Which physical form to build
        #[arg(short, long, value_enum, default_value = "both")]
        form: Form,
    },

    /// Print the resolved Lean sysroot
    Sysroot,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Form {
    Packed,
    Boxed,
    Both,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ShimConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ShimConfig::load_from_cwd().context("Failed to load lithe.toml")?,
    };
    logging::init(&config.logging);

    match cli.command {
        Commands::Config => cmd_config(&config),
        Commands::Probe { input, form } => cmd_probe(&input, form),
        Commands::Sysroot => cmd_sysroot(&config),
    }
}

fn cmd_config(config: &ShimConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

fn cmd_sysroot(config: &ShimConfig) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let sysroot = config.lean.resolve_sysroot(&cwd)?;
    if !sysroot.exists() {
        bail!("Lean sysroot {} does not exist", sysroot.display());
    }
    println!("sysroot: {}", sysroot.display());
    println!("include: {}", sysroot.join("include").display());
    println!("lib:     {}", sysroot.join("lib").join("lean").display());
    Ok(())
}

fn cmd_probe(input: &Path, form: Form) -> Result<()> {
    let data =
        fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    info!(path = %input.display(), len = data.len(), "probing");

    let heap = HostHeap::new();
    if matches!(form, Form::Packed | Form::Both) {
        probe_one(&heap, "packed", heap.byte_array(&data), &data)?;
    }
    if matches!(form, Form::Boxed | Form::Both) {
        probe_one(&heap, "boxed", heap.boxed_byte_array(&data), &data)?;
    }

    if heap.live_objects() != 0 {
        bail!("{} objects leaked", heap.live_objects());
    }
    Ok(())
}

fn probe_one(heap: &HostHeap, label: &str, obj: *mut LeanObject, expected: &[u8]) -> Result<()> {
    // SAFETY: obj was just allocated on heap and is released exactly once
    let (shape, size, copied, elapsed) = unsafe {
        let shape = match classify(obj) {
            ByteArrayShape::Packed(_) => "packed",
            ByteArrayShape::Boxed(_) => "boxed",
            ByteArrayShape::Unrecognized => "unrecognized",
        };
        let size = heap.byte_array_size(obj);
        let start = Instant::now();
        let copied = byte_array_to_vec(heap, obj);
        let elapsed = start.elapsed();
        heap.dec(obj);
        (shape, size, copied, elapsed)
    };
    debug!(label, shape, size, ?elapsed, "probe finished");

    let ok = copied == expected;
    println!(
        "{:<7} shape={:<12} size={:<10} copy={:?} {}",
        label,
        shape,
        size,
        elapsed,
        if ok { "ok" } else { "MISMATCH" }
    );
    if !ok {
        bail!("{} copy does not match input", label);
    }
    Ok(())
}
