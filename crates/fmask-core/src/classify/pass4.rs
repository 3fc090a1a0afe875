//! Pass 4 — final cloud decision and confidence (spec.md §4.7).
use log::debug;

use crate::error::FmaskError;
use crate::io::BandAccessor;
use crate::mask::{clear, pixel, set, Confidence};
use crate::percentile::gt;

/// Combined outward shift applied to the already-buffered `t_templ` in the
/// extreme-cold override. spec.md §4.7 writes this as
/// `thermal < t_templ + t_buffer − 3500`; §9 notes this is equivalent to
/// `raw_t_templ − 3100` once `t_templ`'s own 4 °C (400) buffering is
/// accounted for, which pins `t_buffer` at 800 and collapses the whole
/// right-hand side to `t_templ − 2700`.
const EXTREME_COLD_DELTA: f32 = 2700.0;

/// Medium-confidence probability margin below the high-confidence threshold.
const MEDIUM_MARGIN: f32 = 10.0;

#[allow(clippy::too_many_arguments)]
pub fn run_pass4(
    input: &mut dyn BandAccessor,
    pixel_mask: &mut [u8],
    clear_mask: &[u8],
    conf_mask: &mut [u8],
    final_prob: &[f32],
    wfinal_prob: &[f32],
    t_templ: f32,
    clr_mask: f32,
    wclr_mask: f32,
    verbose: bool,
) -> Result<(), FmaskError> {
    let meta = *input.meta();
    let (rows, cols) = (meta.rows, meta.cols);
    let cold_threshold = t_templ - EXTREME_COLD_DELTA;

    let mut therm_buf = vec![0i16; cols];
    for r in 0..rows {
        input.get_input_therm_line(r, &mut therm_buf)?;
        if verbose && r % 1000 == 0 {
            debug!("Pass 4: row {r}/{rows}");
        }

        for c in 0..cols {
            let idx = r * cols + c;
            if clear_mask[idx] & clear::CLEAR_FILL != 0 {
                continue;
            }

            let thermal = meta.remap_thermal(therm_buf[c]) as f32;
            let was_cloud = pixel_mask[idx] & pixel::CLOUD != 0;
            let is_water = pixel_mask[idx] & pixel::WATER != 0;

            let high = (was_cloud && !is_water && gt(final_prob[idx], clr_mask))
                || (was_cloud && is_water && gt(wfinal_prob[idx], wclr_mask))
                || thermal < cold_threshold;

            if high {
                set(&mut pixel_mask[idx], pixel::CLOUD);
                conf_mask[idx] = Confidence::High as u8;
                continue;
            }

            let medium = (was_cloud && !is_water && gt(final_prob[idx], clr_mask - MEDIUM_MARGIN))
                || (was_cloud && is_water && gt(wfinal_prob[idx], wclr_mask - MEDIUM_MARGIN));

            crate::mask::clear(&mut pixel_mask[idx], pixel::CLOUD);
            conf_mask[idx] = if medium {
                Confidence::Medium as u8
            } else {
                Confidence::Low as u8
            };
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::{SceneMeta, NBAND};
    use crate::io::InMemoryBandAccessor;

    fn meta() -> SceneMeta {
        SceneMeta {
            satu_value_ref: [i16::MAX; NBAND],
            satu_value_max: [10000; NBAND],
            therm_satu_value_ref: i16::MAX,
            therm_satu_value_max: 6000,
            rows: 1,
            cols: 1,
        }
    }

    #[test]
    fn high_confidence_cloud_over_land() {
        // spec.md §8 scenario 5: final_prob=60, clr_mask=50.
        let bands: [Vec<i16>; NBAND] = std::array::from_fn(|_| vec![0]);
        let mut acc = InMemoryBandAccessor::new(meta(), bands, vec![1500]).unwrap();
        let mut pm = [pixel::CLOUD];
        let cm = [clear::CLEAR | clear::CLEAR_LAND];
        let mut conf = [0u8];
        let final_prob = [60.0f32];
        let wfinal_prob = [0.0f32];
        run_pass4(&mut acc, &mut pm, &cm, &mut conf, &final_prob, &wfinal_prob, -5000.0, 50.0, 999.0, false).unwrap();
        assert_eq!(conf[0], Confidence::High as u8);
        assert_eq!(pm[0] & pixel::CLOUD, pixel::CLOUD);
    }

    #[test]
    fn extreme_cold_promotes_non_cloud_pixel_to_high() {
        let bands: [Vec<i16>; NBAND] = std::array::from_fn(|_| vec![0]);
        // thermal = -5000 (1/100 C), t_templ = 0 => cold_threshold = -2700.
        // -5000 < -2700, so this is an extreme-cold override.
        let mut acc = InMemoryBandAccessor::new(meta(), bands, vec![-5000]).unwrap();
        let mut pm = [0u8]; // not cloud, not water
        let cm = [clear::CLEAR | clear::CLEAR_LAND];
        let mut conf = [0u8];
        let final_prob = [0.0f32];
        let wfinal_prob = [0.0f32];
        run_pass4(&mut acc, &mut pm, &cm, &mut conf, &final_prob, &wfinal_prob, 0.0, 999.0, 999.0, false).unwrap();
        assert_eq!(conf[0], Confidence::High as u8);
        assert_eq!(pm[0] & pixel::CLOUD, pixel::CLOUD, "extreme cold override must set CLOUD regardless of prior bit");
    }

    #[test]
    fn low_confidence_when_neither_high_nor_medium() {
        let bands: [Vec<i16>; NBAND] = std::array::from_fn(|_| vec![0]);
        let mut acc = InMemoryBandAccessor::new(meta(), bands, vec![1500]).unwrap();
        let mut pm = [pixel::CLOUD];
        let cm = [clear::CLEAR | clear::CLEAR_LAND];
        let mut conf = [0u8];
        let final_prob = [5.0f32];
        let wfinal_prob = [0.0f32];
        run_pass4(&mut acc, &mut pm, &cm, &mut conf, &final_prob, &wfinal_prob, -5000.0, 50.0, 999.0, false).unwrap();
        assert_eq!(conf[0], Confidence::Low as u8);
        assert_eq!(pm[0] & pixel::CLOUD, 0);
    }
}
