//! Land/water bit selection (spec.md §4.3) and probability threshold
//! derivation (spec.md §4.6).
use crate::error::FmaskError;
use crate::mask::clear;
use crate::percentile::prctile2;

/// Percentage of image-data pixels below which a census bit falls back to
/// the generic `CLEAR` bit rather than its land/water-specific variant.
const MIN_CENSUS_PCT: f32 = 0.1;

/// Pick the land-statistics bit: `CLEAR_LAND` when there's enough clear land
/// to be statistically meaningful, else fall back to plain `CLEAR`.
pub fn land_bit(land_ptm: f32) -> u8 {
    if land_ptm >= MIN_CENSUS_PCT {
        clear::CLEAR_LAND
    } else {
        clear::CLEAR
    }
}

/// Pick the water-statistics bit, mirroring [`land_bit`].
pub fn water_bit(water_ptm: f32) -> u8 {
    if water_ptm >= MIN_CENSUS_PCT {
        clear::CLEAR_WATER
    } else {
        clear::CLEAR
    }
}

pub struct ProbThresholds {
    pub clr_mask: f32,
    pub wclr_mask: f32,
}

/// Derive the high-percentile cloud-probability thresholds for land and
/// water, each offset by the caller's tunable `cloud_prob_threshold`.
pub fn derive_thresholds(
    clear_mask: &[u8],
    land_bit: u8,
    water_bit: u8,
    final_prob: &[f32],
    wfinal_prob: &[f32],
    cloud_prob_threshold: f32,
) -> Result<ProbThresholds, FmaskError> {
    let mut land_probs = Vec::new();
    let mut water_probs = Vec::new();
    for (idx, &cm) in clear_mask.iter().enumerate() {
        if cm & land_bit != 0 {
            land_probs.push(final_prob[idx]);
        }
        if cm & water_bit != 0 {
            water_probs.push(wfinal_prob[idx]);
        }
    }

    let land_min = land_probs.iter().cloned().fold(f32::INFINITY, f32::min);
    let land_max = land_probs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let water_min = water_probs.iter().cloned().fold(f32::INFINITY, f32::min);
    let water_max = water_probs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

    let (land_min, land_max) = if land_probs.is_empty() { (0.0, 0.0) } else { (land_min, land_max) };
    let (water_min, water_max) = if water_probs.is_empty() { (0.0, 0.0) } else { (water_min, water_max) };

    let clr_mask = prctile2(&land_probs, land_min, land_max, 82.5)? + cloud_prob_threshold;
    let wclr_mask = prctile2(&water_probs, water_min, water_max, 82.5)? + cloud_prob_threshold;

    Ok(ProbThresholds { clr_mask, wclr_mask })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_clear_below_threshold() {
        assert_eq!(land_bit(0.05), clear::CLEAR);
        assert_eq!(land_bit(0.1), clear::CLEAR_LAND);
        assert_eq!(water_bit(5.0), clear::CLEAR_WATER);
    }
}
