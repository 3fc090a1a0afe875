//! Pass 5 — background reflectance for shadow detection (spec.md §4.8).
use log::debug;
use rayon::join;

use crate::bands::{Band, NBAND};
use crate::error::FmaskError;
use crate::fill::LocalMinimaFiller;
use crate::io::BandAccessor;
use crate::percentile::prctile;

pub struct Pass5Result {
    pub nir_boundary: i16,
    pub swir1_boundary: i16,
    pub nir_data: Vec<i16>,
    pub swir1_data: Vec<i16>,
    pub filled_nir_data: Vec<i16>,
    pub filled_swir1_data: Vec<i16>,
}

/// Boundary value passed to the local-minima filler — anchors the
/// percentile range at 0 rather than the true minimum (spec.md §4.8/§9).
const FILL_BOUNDARY: i16 = 0;

pub fn run_pass5(
    input: &mut dyn BandAccessor,
    clear_mask: &[u8],
    land_bit: u8,
    filler: &dyn LocalMinimaFiller,
    verbose: bool,
) -> Result<Pass5Result, FmaskError> {
    let meta = *input.meta();
    let (rows, cols) = (meta.rows, meta.cols);
    let n = rows * cols;

    let mut nir_data = vec![0i16; n];
    let mut swir1_data = vec![0i16; n];
    let mut nir_samples: Vec<i16> = Vec::new();
    let mut swir1_samples: Vec<i16> = Vec::new();
    let mut nir_min = 0i16;
    let mut nir_max = 0i16;
    let mut swir1_min = 0i16;
    let mut swir1_max = 0i16;

    let mut nir_buf = vec![0i16; cols];
    let mut swir1_buf = vec![0i16; cols];

    for r in 0..rows {
        input.get_input_line(Band::Nir, r, &mut nir_buf)?;
        input.get_input_line(Band::Swir1, r, &mut swir1_buf)?;
        if verbose && r % 1000 == 0 {
            debug!("Pass 5: row {r}/{rows}");
        }

        for c in 0..cols {
            let idx = r * cols + c;
            let nir = meta.remap_reflective(Band::Nir, nir_buf[c]);
            let swir1 = meta.remap_reflective(Band::Swir1, swir1_buf[c]);
            nir_data[idx] = nir;
            swir1_data[idx] = swir1;

            if clear_mask[idx] & land_bit != 0 {
                nir_samples.push(nir);
                swir1_samples.push(swir1);
                nir_min = nir_min.min(nir);
                nir_max = nir_max.max(nir);
                swir1_min = swir1_min.min(swir1);
                swir1_max = swir1_max.max(swir1);
            }
        }
    }

    let nir_boundary = prctile(&nir_samples, nir_min, nir_max, 17.5)?;
    let swir1_boundary = prctile(&swir1_samples, swir1_min, swir1_max, 17.5)?;

    let mut filled_nir_data = vec![0i16; n];
    let mut filled_swir1_data = vec![0i16; n];

    let (nir_res, swir1_res) = join(
        || filler.fill("nir", &nir_data, rows, cols, FILL_BOUNDARY, &mut filled_nir_data),
        || filler.fill("swir1", &swir1_data, rows, cols, FILL_BOUNDARY, &mut filled_swir1_data),
    );
    nir_res?;
    swir1_res?;

    Ok(Pass5Result {
        nir_boundary,
        swir1_boundary,
        nir_data,
        swir1_data,
        filled_nir_data,
        filled_swir1_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::SceneMeta;
    use crate::fill::PriorityFloodFiller;
    use crate::io::InMemoryBandAccessor;
    use crate::mask::clear;

    #[test]
    fn boundaries_reflect_the_17_5_percentile_of_land_samples() {
        let meta = SceneMeta {
            satu_value_ref: [i16::MAX; NBAND],
            satu_value_max: [10000; NBAND],
            therm_satu_value_ref: i16::MAX,
            therm_satu_value_max: 6000,
            rows: 1,
            cols: 4,
        };
        let nir = vec![100i16, 200, 300, 400];
        let swir1 = vec![50i16, 60, 70, 80];
        let mut bands: [Vec<i16>; NBAND] = std::array::from_fn(|_| vec![0; 4]);
        bands[Band::Nir.index()] = nir;
        bands[Band::Swir1.index()] = swir1;
        let mut acc = InMemoryBandAccessor::new(meta, bands, vec![0; 4]).unwrap();
        let clear_mask = [clear::CLEAR_LAND; 4];
        let filler = PriorityFloodFiller;
        let r = run_pass5(&mut acc, &clear_mask, clear::CLEAR_LAND, &filler, false).unwrap();
        assert!(r.nir_boundary >= 100 && r.nir_boundary <= 400);
        assert!(r.swir1_boundary >= 50 && r.swir1_boundary <= 80);
        assert_eq!(r.nir_data, vec![100, 200, 300, 400]);
    }
}
