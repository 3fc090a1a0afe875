//! Pass 6 — shadow decision and water refinement (spec.md §4.9).
use crate::mask::{clear as clear_mod, pixel, set, Confidence};

/// Filled-minus-observed residual threshold (scaled reflectance units) above
/// which a pixel is called shadow.
const SHADOW_RESIDUAL_THRESHOLD: i16 = 200;

#[allow(clippy::too_many_arguments)]
pub fn run_pass6(
    pixel_mask: &mut [u8],
    conf_mask: &mut [u8],
    clear_mask: &[u8],
    nir_data: &[i16],
    swir1_data: &[i16],
    filled_nir_data: &[i16],
    filled_swir1_data: &[i16],
) {
    let n = pixel_mask.len();
    for idx in 0..n {
        if clear_mask[idx] & clear_mod::CLEAR_FILL != 0 {
            conf_mask[idx] = Confidence::Fill as u8;
            continue;
        }

        let new_nir = filled_nir_data[idx] - nir_data[idx];
        let new_swir1 = filled_swir1_data[idx] - swir1_data[idx];
        let shadow_prob = new_nir.min(new_swir1);

        if shadow_prob > SHADOW_RESIDUAL_THRESHOLD {
            set(&mut pixel_mask[idx], pixel::SHADOW);
        } else {
            crate::mask::clear(&mut pixel_mask[idx], pixel::SHADOW);
        }

        if pixel_mask[idx] & pixel::WATER != 0 && pixel_mask[idx] & pixel::CLOUD != 0 {
            crate::mask::clear(&mut pixel_mask[idx], pixel::WATER);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::clear;

    #[test]
    fn shadow_pixel_is_flagged_when_residual_exceeds_threshold() {
        // spec.md §8 scenario 6: NIR=800, filled_nir=1200, SWIR1=600, filled_swir1=900.
        let mut pm = [0u8];
        let mut conf = [0u8];
        let cm = [clear::CLEAR | clear::CLEAR_LAND];
        run_pass6(&mut pm, &mut conf, &cm, &[800], &[600], &[1200], &[900]);
        assert_eq!(pm[0] & pixel::SHADOW, pixel::SHADOW);
    }

    #[test]
    fn non_shadow_pixel_stays_clear() {
        let mut pm = [0u8];
        let mut conf = [0u8];
        let cm = [clear::CLEAR | clear::CLEAR_LAND];
        run_pass6(&mut pm, &mut conf, &cm, &[800], &[600], &[850], &[650]);
        assert_eq!(pm[0] & pixel::SHADOW, 0);
    }

    #[test]
    fn cloud_and_water_conflict_clears_water() {
        let mut pm = [pixel::WATER | pixel::CLOUD];
        let mut conf = [0u8];
        let cm = [clear::CLEAR | clear::CLEAR_WATER];
        run_pass6(&mut pm, &mut conf, &cm, &[800], &[600], &[850], &[650]);
        assert_eq!(pm[0] & pixel::WATER, 0);
        assert_eq!(pm[0] & pixel::CLOUD, pixel::CLOUD);
    }

    #[test]
    fn fill_pixel_gets_fill_confidence_and_is_skipped() {
        let mut pm = [pixel::FILL];
        let mut conf = [0u8];
        let cm = [clear::CLEAR_FILL];
        run_pass6(&mut pm, &mut conf, &cm, &[0], &[0], &[0], &[0]);
        assert_eq!(conf[0], Confidence::Fill as u8);
    }
}
