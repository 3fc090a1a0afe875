//! Pass 2 — thermal percentiles (spec.md §4.4).
use log::debug;

use crate::error::FmaskError;
use crate::io::BandAccessor;
use crate::mask::clear;
use crate::percentile::prctile;

pub struct Pass2Result {
    pub t_templ: f32,
    pub t_temph: f32,
    pub t_wtemp: f32,
}

/// Outward buffer applied to the land low/high background temperature
/// (spec.md §3: "each shifted outward by a 4 °C buffer").
const TEMP_PERCENTILE_BUFFER: i16 = 400;

pub fn run_pass2(
    input: &mut dyn BandAccessor,
    clear_mask: &[u8],
    land_bit: u8,
    water_bit: u8,
    verbose: bool,
) -> Result<Pass2Result, FmaskError> {
    let meta = *input.meta();
    let (rows, cols) = (meta.rows, meta.cols);

    let mut land_therm: Vec<i16> = Vec::new();
    let mut water_therm: Vec<i16> = Vec::new();
    let mut therm_buf = vec![0i16; cols];

    for r in 0..rows {
        input.get_input_therm_line(r, &mut therm_buf)?;
        if verbose && r % 1000 == 0 {
            debug!("Pass 2: row {r}/{rows}");
        }
        for c in 0..cols {
            let idx = r * cols + c;
            if clear_mask[idx] & clear::CLEAR_FILL != 0 {
                continue;
            }
            let therm = meta.remap_thermal(therm_buf[c]);
            if clear_mask[idx] & land_bit != 0 {
                land_therm.push(therm);
            }
            if clear_mask[idx] & water_bit != 0 {
                water_therm.push(therm);
            }
        }
    }

    let land_min = land_therm.iter().copied().min().unwrap_or(0);
    let land_max = land_therm.iter().copied().max().unwrap_or(0);
    let water_min = water_therm.iter().copied().min().unwrap_or(0);
    let water_max = water_therm.iter().copied().max().unwrap_or(0);

    let t_templ = prctile(&land_therm, land_min, land_max, 17.5)? as f32 - TEMP_PERCENTILE_BUFFER as f32;
    let t_temph = prctile(&land_therm, land_min, land_max, 82.5)? as f32 + TEMP_PERCENTILE_BUFFER as f32;
    let t_wtemp = prctile(&water_therm, water_min, water_max, 82.5)? as f32;

    Ok(Pass2Result {
        t_templ,
        t_temph,
        t_wtemp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::{SceneMeta, NBAND};
    use crate::io::InMemoryBandAccessor;

    #[test]
    fn buffers_are_applied_in_the_right_direction() {
        let meta = SceneMeta {
            satu_value_ref: [i16::MAX; NBAND],
            satu_value_max: [10000; NBAND],
            therm_satu_value_ref: i16::MAX,
            therm_satu_value_max: 6000,
            rows: 1,
            cols: 4,
        };
        let bands: [Vec<i16>; NBAND] = std::array::from_fn(|_| vec![0; 4]);
        let therm = vec![1000, 2000, 3000, 4000];
        let mut acc = InMemoryBandAccessor::new(meta, bands, therm).unwrap();
        let clear_mask = [
            clear::CLEAR | clear::CLEAR_LAND,
            clear::CLEAR | clear::CLEAR_LAND,
            clear::CLEAR | clear::CLEAR_LAND,
            clear::CLEAR | clear::CLEAR_LAND,
        ];
        let r = run_pass2(&mut acc, &clear_mask, clear::CLEAR_LAND, clear::CLEAR_WATER, false).unwrap();
        assert!(r.t_templ < 1000.0, "low background temp must be buffered downward");
        assert!(r.t_temph > 4000.0, "high background temp must be buffered upward");
    }
}
