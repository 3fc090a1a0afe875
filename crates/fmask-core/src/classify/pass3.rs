//! Pass 3 — cloud-probability scoring, land and water separately (spec.md §4.5).
use log::debug;

use crate::bands::{Band, ALL_BANDS, NBAND};
use crate::classify::pass1::whiteness_and_saturation;
use crate::error::FmaskError;
use crate::io::BandAccessor;
use crate::mask::pixel;
use crate::percentile::MINSIGMA;

pub struct Pass3Result {
    pub final_prob: Vec<f32>,
    pub wfinal_prob: Vec<f32>,
}

/// Fixed divisor for the water-path temperature probability — distinct from
/// the land path's `temp_l` (spec.md §9: "preserve this asymmetry").
const WATER_TEMP_DIVISOR: f32 = 400.0;

#[allow(clippy::too_many_arguments)]
pub fn run_pass3(
    input: &mut dyn BandAccessor,
    pixel_mask: &[u8],
    t_temph: f32,
    t_wtemp: f32,
    temp_l: f32,
    verbose: bool,
) -> Result<Pass3Result, FmaskError> {
    let meta = *input.meta();
    let (rows, cols) = (meta.rows, meta.cols);
    let n = rows * cols;

    let mut final_prob = vec![0.0f32; n];
    let mut wfinal_prob = vec![0.0f32; n];

    let mut row_bufs: [Vec<i16>; NBAND] = std::array::from_fn(|_| vec![0i16; cols]);
    let mut therm_buf = vec![0i16; cols];

    for r in 0..rows {
        for b in ALL_BANDS {
            input.get_input_line(b, r, &mut row_bufs[b.index()])?;
        }
        input.get_input_therm_line(r, &mut therm_buf)?;
        if verbose && r % 1000 == 0 {
            debug!("Pass 3: row {r}/{rows}");
        }

        for c in 0..cols {
            let idx = r * cols + c;
            if pixel_mask[idx] & pixel::FILL != 0 {
                continue;
            }

            let therm = meta.remap_thermal(therm_buf[c]) as f32;
            let mut refl = [0i16; NBAND];
            for b in ALL_BANDS {
                refl[b.index()] = meta.remap_reflective(b, row_bufs[b.index()][c]);
            }
            let blue = refl[Band::Blue.index()] as f32;
            let green = refl[Band::Green.index()] as f32;
            let red = refl[Band::Red.index()] as f32;
            let nir = refl[Band::Nir.index()] as f32;
            let swir1 = refl[Band::Swir1.index()] as f32;

            if pixel_mask[idx] & pixel::WATER != 0 {
                let wtemp_prob = ((t_wtemp - therm) / WATER_TEMP_DIVISOR).max(0.0);
                let brightness_prob = (swir1 / 1100.0).clamp(0.0, 1.0);
                wfinal_prob[idx] = 100.0 * wtemp_prob * brightness_prob;
            } else {
                let temp_prob = if temp_l.abs() < MINSIGMA {
                    0.0
                } else {
                    ((t_temph - therm) / temp_l).max(0.0)
                };

                let v_ndvi = {
                    let d = nir + red;
                    let raw = if d.abs() < MINSIGMA { 0.01 } else { (nir - red) / d };
                    raw.max(0.0)
                };
                let v_ndsi = {
                    let d = green + swir1;
                    let raw = if d.abs() < MINSIGMA { 0.01 } else { (green - swir1) / d };
                    raw.max(0.0)
                };
                let (whiteness, _satu_bv) = whiteness_and_saturation(
                    blue,
                    green,
                    red,
                    meta.satu_value_max[Band::Blue.index()] as f32,
                    meta.satu_value_max[Band::Green.index()] as f32,
                    meta.satu_value_max[Band::Red.index()] as f32,
                );

                let vari_prob = 1.0 - v_ndsi.max(v_ndvi).max(whiteness);
                final_prob[idx] = 100.0 * temp_prob * vari_prob;
            }
        }
    }

    Ok(Pass3Result {
        final_prob,
        wfinal_prob,
    })
}
