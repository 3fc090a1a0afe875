//! Command-line driver for the classifier (spec.md §6, out of core scope).
//!
//! Reads a minimal raw-row binary scene (header + six reflective band
//! rasters + one thermal raster, all little-endian `i16`), runs the
//! six-pass classifier, and writes the two output masks plus a JSON
//! summary of scene statistics.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use fmask_core::{classify, InMemoryBandAccessor, SceneMeta, ALL_BANDS, NBAND};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "fmask-cli", about = "Classify a multispectral scene for cloud, shadow, and snow")]
struct Args {
    /// Raw-row binary scene file.
    #[arg(short, long)]
    input: PathBuf,

    /// Output path prefix; writes `<output>.pixel_mask`, `<output>.conf_mask`,
    /// and `<output>.stats.json`.
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// The one tunable parameter in the system (spec.md §4.6).
    #[arg(long, default_value_t = 22.5)]
    cloud_prob_threshold: f32,

    /// Raise logging from info to debug, including per-1000-row pass progress.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    pretty_env_logger::init();

    let mut scene = read_scene(&args.input)
        .with_context(|| format!("reading scene {}", args.input.display()))?;
    let n = scene.meta().rows * scene.meta().cols;

    let mut pixel_mask = vec![0u8; n];
    let mut conf_mask = vec![0u8; n];

    info!(
        "classifying {}x{} scene (cloud_prob_threshold={})",
        scene.meta().rows,
        scene.meta().cols,
        args.cloud_prob_threshold
    );
    let stats = classify(
        &mut scene,
        args.cloud_prob_threshold,
        args.verbose,
        &mut pixel_mask,
        &mut conf_mask,
    )
    .context("classification failed")?;

    fs::write(with_suffix(&args.output, "pixel_mask"), &pixel_mask)
        .context("writing pixel mask")?;
    fs::write(with_suffix(&args.output, "conf_mask"), &conf_mask)
        .context("writing confidence mask")?;
    let stats_json = serde_json::to_string_pretty(&stats).context("serializing scene stats")?;
    fs::write(with_suffix(&args.output, "stats.json"), stats_json)
        .context("writing scene stats")?;

    info!(
        "done: clear_ptm={:.2}% land_ptm={:.2}% water_ptm={:.2}%",
        stats.clear_ptm, stats.land_ptm, stats.water_ptm
    );
    Ok(())
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut s = prefix.as_os_str().to_owned();
    s.push(".");
    s.push(suffix);
    PathBuf::from(s)
}

/// Header layout (all little-endian):
/// `rows: u32, cols: u32, satu_value_ref: [i16; 6], satu_value_max: [i16; 6],
/// therm_satu_value_ref: i16, therm_satu_value_max: i16`, followed by six
/// reflective band rasters (`rows*cols` `i16`s each, in `ALL_BANDS` order)
/// and one thermal raster (`rows*cols` `i16`s).
fn read_scene(path: &Path) -> Result<InMemoryBandAccessor> {
    let bytes = fs::read(path)?;
    let mut pos = 0usize;

    let mut take = |n: usize| -> Result<&[u8]> {
        if pos + n > bytes.len() {
            bail!("scene file truncated at offset {pos} (need {n} more bytes)");
        }
        let slice = &bytes[pos..pos + n];
        pos += n;
        Ok(slice)
    };

    let rows = u32::from_le_bytes(take(4)?.try_into().unwrap()) as usize;
    let cols = u32::from_le_bytes(take(4)?.try_into().unwrap()) as usize;

    let mut read_i16_array = |count: usize| -> Result<Vec<i16>> {
        let buf = take(count * 2)?;
        Ok(buf.chunks_exact(2).map(|c| i16::from_le_bytes([c[0], c[1]])).collect())
    };

    let satu_value_ref: [i16; NBAND] = read_i16_array(NBAND)?.try_into().unwrap();
    let satu_value_max: [i16; NBAND] = read_i16_array(NBAND)?.try_into().unwrap();
    let therm_satu_value_ref = read_i16_array(1)?[0];
    let therm_satu_value_max = read_i16_array(1)?[0];

    let meta = SceneMeta {
        satu_value_ref,
        satu_value_max,
        therm_satu_value_ref,
        therm_satu_value_max,
        rows,
        cols,
    };

    let n = rows * cols;
    let mut bands: [Vec<i16>; NBAND] = std::array::from_fn(|_| Vec::new());
    for b in ALL_BANDS {
        bands[b.index()] = read_i16_array(n)?;
    }
    let therm = read_i16_array(n)?;

    Ok(InMemoryBandAccessor::new(meta, bands, therm)?)
}
