//! Pass 1 — physical tests and clear census (spec.md §4.2).
use log::debug;

use crate::bands::{Band, ALL_BANDS, FILL_PIXEL, NBAND};
use crate::error::FmaskError;
use crate::io::BandAccessor;
use crate::mask::{clear, pixel, set};
use crate::percentile::{gt, le, MINSIGMA};

#[derive(Debug, Default, Clone, Copy)]
pub struct Pass1Counts {
    pub image_data_counter: u64,
    pub clear_pixel_counter: u64,
    pub clear_land_pixel_counter: u64,
    pub clear_water_pixel_counter: u64,
}

/// NDVI with the spec's zero-denominator fallback (0.01).
#[inline]
fn ndvi(nir: f32, red: f32) -> f32 {
    if (nir + red).abs() < MINSIGMA {
        0.01
    } else {
        (nir - red) / (nir + red)
    }
}

/// NDSI with the spec's zero-denominator fallback (0.01).
#[inline]
fn ndsi(green: f32, swir1: f32) -> f32 {
    if (green + swir1).abs() < MINSIGMA {
        0.01
    } else {
        (green - swir1) / (green + swir1)
    }
}

/// Whiteness, visible-band saturation override, and the `hot` index shared
/// between Pass 1 and Pass 3 (spec.md §4.2 step 4, §4.5 land path).
pub(crate) fn whiteness_and_saturation(
    blue: f32,
    green: f32,
    red: f32,
    satu_max_blue: f32,
    satu_max_green: f32,
    satu_max_red: f32,
) -> (f32, bool) {
    let visi_mean = (blue + green + red) / 3.0;
    let mut whiteness = if visi_mean.abs() < MINSIGMA {
        100.0
    } else {
        ((blue - visi_mean).abs() + (green - visi_mean).abs() + (red - visi_mean).abs()) / visi_mean
    };
    let satu_bv = blue >= satu_max_blue - 1.0 || green >= satu_max_green - 1.0 || red >= satu_max_red - 1.0;
    if satu_bv {
        whiteness = 0.0;
    }
    (whiteness, satu_bv)
}

pub fn run_pass1(
    input: &mut dyn BandAccessor,
    pixel_mask: &mut [u8],
    clear_mask: &mut [u8],
    verbose: bool,
) -> Result<Pass1Counts, FmaskError> {
    let meta = *input.meta();
    let (rows, cols) = (meta.rows, meta.cols);
    let mut counts = Pass1Counts::default();

    let mut row_bufs: [Vec<i16>; NBAND] = std::array::from_fn(|_| vec![0i16; cols]);
    let mut therm_buf = vec![0i16; cols];

    for r in 0..rows {
        for b in ALL_BANDS {
            input.get_input_line(b, r, &mut row_bufs[b.index()])?;
        }
        input.get_input_therm_line(r, &mut therm_buf)?;
        if verbose && r % 1000 == 0 {
            debug!("Pass 1: row {r}/{rows}");
        }

        for c in 0..cols {
            let idx = r * cols + c;
            let therm = meta.remap_thermal(therm_buf[c]);

            let mut refl = [0i16; NBAND];
            for b in ALL_BANDS {
                refl[b.index()] = meta.remap_reflective(b, row_bufs[b.index()][c]);
            }

            let is_fill = therm <= FILL_PIXEL || refl.iter().any(|&v| v == FILL_PIXEL);
            if is_fill {
                set(&mut pixel_mask[idx], pixel::FILL);
                clear_mask[idx] = clear::CLEAR_FILL;
                continue;
            }
            counts.image_data_counter += 1;

            let blue = refl[Band::Blue.index()] as f32;
            let green = refl[Band::Green.index()] as f32;
            let red = refl[Band::Red.index()] as f32;
            let nir = refl[Band::Nir.index()] as f32;
            let swir1 = refl[Band::Swir1.index()] as f32;
            let swir2 = refl[Band::Swir2.index()] as f32;
            let thermf = therm as f32;

            let v_ndvi = ndvi(nir, red);
            let v_ndsi = ndsi(green, swir1);

            // 1. Basic cloud test.
            let mut cloud = le(v_ndsi, 0.8) && le(v_ndvi, 0.8) && gt(swir2, 300.0) && le(thermf, 2700.0);
            // 2. Snow test.
            let snow = gt(v_ndsi, 0.15) && le(thermf, 1000.0) && gt(nir, 1100.0) && gt(green, 1000.0);
            // 3. Water test.
            let water = (le(v_ndvi, 0.01) && le(nir, 1100.0))
                || (gt(v_ndvi, 0.0) && le(v_ndvi, 0.1) && le(nir, 500.0));

            // 4-5. Whiteness.
            let (whiteness, satu_bv) = whiteness_and_saturation(
                blue,
                green,
                red,
                meta.satu_value_max[Band::Blue.index()] as f32,
                meta.satu_value_max[Band::Green.index()] as f32,
                meta.satu_value_max[Band::Red.index()] as f32,
            );
            cloud = cloud && le(whiteness, 0.7);

            // 6. Haze test.
            let hot = blue - 0.5 * red - 800.0;
            cloud = cloud && (gt(hot, 0.0) || satu_bv);

            // 7. NIR/SWIR1 ratio.
            cloud = cloud && swir1 != 0.0 && gt(nir / swir1 - 0.75, 0.0);

            if cloud {
                set(&mut pixel_mask[idx], pixel::CLOUD);
            }
            if snow {
                set(&mut pixel_mask[idx], pixel::SNOW);
            }
            if water {
                set(&mut pixel_mask[idx], pixel::WATER);
            }

            if cloud {
                clear_mask[idx] = 0;
            } else {
                clear_mask[idx] = clear::CLEAR;
                counts.clear_pixel_counter += 1;
                if water {
                    clear_mask[idx] |= clear::CLEAR_WATER;
                    counts.clear_water_pixel_counter += 1;
                } else {
                    clear_mask[idx] |= clear::CLEAR_LAND;
                    counts.clear_land_pixel_counter += 1;
                }
            }
        }
    }

    Ok(counts)
}
