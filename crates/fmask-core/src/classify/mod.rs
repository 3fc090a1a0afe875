//! Six-pass classifier orchestrator (spec.md §4, §9).
mod pass1;
mod pass2;
mod pass3;
mod pass4;
mod pass5;
mod pass6;
pub mod threshold;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::FmaskError;
use crate::fill::{LocalMinimaFiller, PriorityFloodFiller};
use crate::io::BandAccessor;
use crate::mask::{pixel, set, Confidence};

/// Percentage of image-data pixels below which the scene is treated as
/// entirely cloud-covered (spec.md §4.3).
const ALL_CLOUD_CLEAR_PTM: f32 = 0.1;

/// Process-wide statistics a caller can report without poking at internals
/// (spec.md §3 summary fields).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SceneStats {
    pub clear_ptm: f32,
    pub land_ptm: f32,
    pub water_ptm: f32,
    pub t_templ: f32,
    pub t_temph: f32,
    pub t_wtemp: f32,
    pub clr_mask: f32,
    pub wclr_mask: f32,
    pub nir_boundary: i16,
    pub swir1_boundary: i16,
}

/// Run the full classifier with the default [`PriorityFloodFiller`].
pub fn classify(
    input: &mut dyn BandAccessor,
    cloud_prob_threshold: f32,
    verbose: bool,
    pixel_mask: &mut [u8],
    conf_mask: &mut [u8],
) -> Result<SceneStats, FmaskError> {
    classify_with_filler(
        input,
        cloud_prob_threshold,
        verbose,
        &PriorityFloodFiller,
        pixel_mask,
        conf_mask,
    )
}

/// Run the full classifier with a caller-supplied [`LocalMinimaFiller`].
pub fn classify_with_filler(
    input: &mut dyn BandAccessor,
    cloud_prob_threshold: f32,
    verbose: bool,
    filler: &dyn LocalMinimaFiller,
    pixel_mask: &mut [u8],
    conf_mask: &mut [u8],
) -> Result<SceneStats, FmaskError> {
    let meta = *input.meta();
    let n = meta.rows * meta.cols;
    if pixel_mask.len() != n || conf_mask.len() != n {
        return Err(FmaskError::Alloc(format!(
            "mask buffers must have {n} elements, got pixel_mask={} conf_mask={}",
            pixel_mask.len(),
            conf_mask.len()
        )));
    }

    let mut clear_mask = vec![0u8; n];

    info!("Pass 1: physical tests and clear census");
    let counts = pass1::run_pass1(input, pixel_mask, &mut clear_mask, verbose)?;

    for idx in 0..n {
        if pixel_mask[idx] & pixel::FILL != 0 {
            conf_mask[idx] = Confidence::Fill as u8;
        }
    }

    let pct = |num: u64, den: u64| if den == 0 { 0.0 } else { 100.0 * num as f32 / den as f32 };
    let clear_ptm = pct(counts.clear_pixel_counter, counts.image_data_counter);
    let land_ptm = pct(counts.clear_land_pixel_counter, counts.image_data_counter);
    let water_ptm = pct(counts.clear_water_pixel_counter, counts.image_data_counter);

    if clear_ptm <= ALL_CLOUD_CLEAR_PTM {
        // spec.md §4.3/§9: all-cloud (and, degenerately, all-fill) short
        // circuit. SHADOW is set iff a pixel is neither CLOUD nor FILL;
        // every subsequent pass is skipped.
        info!("clear_ptm {clear_ptm:.4}% <= {ALL_CLOUD_CLEAR_PTM}%, short-circuiting as all-cloud");
        for idx in 0..n {
            if pixel_mask[idx] & pixel::FILL != 0 {
                continue;
            }
            if pixel_mask[idx] & pixel::CLOUD != 0 {
                crate::mask::clear(&mut pixel_mask[idx], pixel::SHADOW);
            } else {
                set(&mut pixel_mask[idx], pixel::SHADOW);
            }
        }
        return Ok(SceneStats {
            clear_ptm,
            land_ptm,
            water_ptm,
            t_templ: -1.0,
            t_temph: -1.0,
            t_wtemp: 0.0,
            clr_mask: 0.0,
            wclr_mask: 0.0,
            nir_boundary: 0,
            swir1_boundary: 0,
        });
    }

    let land_bit = threshold::land_bit(land_ptm);
    let water_bit = threshold::water_bit(water_ptm);

    info!("Pass 2: thermal percentiles");
    let p2 = pass2::run_pass2(input, &clear_mask, land_bit, water_bit, verbose)?;
    let temp_l = p2.t_temph - p2.t_templ;

    info!("Pass 3: cloud-probability scoring");
    let p3 = pass3::run_pass3(input, pixel_mask, p2.t_temph, p2.t_wtemp, temp_l, verbose)?;

    let thresholds = threshold::derive_thresholds(
        &clear_mask,
        land_bit,
        water_bit,
        &p3.final_prob,
        &p3.wfinal_prob,
        cloud_prob_threshold,
    )?;
    info!(
        "Thresholds: clr_mask={:.2} wclr_mask={:.2}",
        thresholds.clr_mask, thresholds.wclr_mask
    );

    info!("Pass 4: final cloud decision");
    pass4::run_pass4(
        input,
        pixel_mask,
        &clear_mask,
        conf_mask,
        &p3.final_prob,
        &p3.wfinal_prob,
        p2.t_templ,
        thresholds.clr_mask,
        thresholds.wclr_mask,
        verbose,
    )?;

    info!("Pass 5: background reflectance");
    let p5 = pass5::run_pass5(input, &clear_mask, land_bit, filler, verbose)?;

    info!("Pass 6: shadow decision and water refinement");
    pass6::run_pass6(
        pixel_mask,
        conf_mask,
        &clear_mask,
        &p5.nir_data,
        &p5.swir1_data,
        &p5.filled_nir_data,
        &p5.filled_swir1_data,
    );

    Ok(SceneStats {
        clear_ptm,
        land_ptm,
        water_ptm,
        t_templ: p2.t_templ,
        t_temph: p2.t_temph,
        t_wtemp: p2.t_wtemp,
        clr_mask: thresholds.clr_mask,
        wclr_mask: thresholds.wclr_mask,
        nir_boundary: p5.nir_boundary,
        swir1_boundary: p5.swir1_boundary,
    })
}
