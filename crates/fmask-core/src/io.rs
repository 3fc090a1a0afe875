//! Band Accessor external interface (spec.md §6).
//!
//! The classifier depends only on this trait; concrete scene I/O (line-
//! oriented disk reads, GeoTIFF/NetCDF decoding, radiometric metadata
//! loading) is explicitly out of scope for the core spec and lives in the
//! consumer (see `tools/fmask-cli`).
use crate::bands::{Band, SceneMeta};
use crate::error::FmaskError;

/// Line-oriented reader exposing one row of each reflective band and one row
/// of the thermal band, in native integer units.
///
/// Implementations must treat `buf`/`therm_buf` contents as valid only until
/// the next read of the same line (spec.md §5): the classifier never holds a
/// reference across row boundaries.
pub trait BandAccessor {
    /// Populate `buf[0..width]` with row `row` of `band`, in native units
    /// (saturation sentinels not yet remapped).
    fn get_input_line(&mut self, band: Band, row: usize, buf: &mut [i16]) -> Result<(), FmaskError>;

    /// Populate `therm_buf[0..width]` with row `row` of the thermal channel.
    fn get_input_therm_line(&mut self, row: usize, therm_buf: &mut [i16]) -> Result<(), FmaskError>;

    /// Scene-wide radiometric metadata and dimensions.
    fn meta(&self) -> &SceneMeta;
}

/// Test double / reference implementation backing every `InMemoryScene`-based
/// test fixture in this crate: the whole scene lives in memory, so
/// `get_input_line` and `get_input_therm_line` are simple row copies.
pub struct InMemoryBandAccessor {
    meta: SceneMeta,
    /// `bands[b]` is a row-major `rows * cols` raster.
    bands: [Vec<i16>; crate::bands::NBAND],
    therm: Vec<i16>,
}

impl InMemoryBandAccessor {
    pub fn new(
        meta: SceneMeta,
        bands: [Vec<i16>; crate::bands::NBAND],
        therm: Vec<i16>,
    ) -> Result<Self, FmaskError> {
        let n = meta.rows * meta.cols;
        for (i, b) in bands.iter().enumerate() {
            if b.len() != n {
                return Err(FmaskError::Alloc(format!(
                    "band {i} has {} samples, expected {n}",
                    b.len()
                )));
            }
        }
        if therm.len() != n {
            return Err(FmaskError::Alloc(format!(
                "thermal band has {} samples, expected {n}",
                therm.len()
            )));
        }
        Ok(Self { meta, bands, therm })
    }
}

impl BandAccessor for InMemoryBandAccessor {
    fn get_input_line(&mut self, band: Band, row: usize, buf: &mut [i16]) -> Result<(), FmaskError> {
        let cols = self.meta.cols;
        if row >= self.meta.rows || buf.len() != cols {
            return Err(FmaskError::Io {
                row,
                band: format!("{band:?}"),
                source: "row or buffer length out of range".to_string(),
            });
        }
        let raster = &self.bands[band.index()];
        buf.copy_from_slice(&raster[row * cols..row * cols + cols]);
        Ok(())
    }

    fn get_input_therm_line(&mut self, row: usize, therm_buf: &mut [i16]) -> Result<(), FmaskError> {
        let cols = self.meta.cols;
        if row >= self.meta.rows || therm_buf.len() != cols {
            return Err(FmaskError::Io {
                row,
                band: "THERMAL".to_string(),
                source: "row or buffer length out of range".to_string(),
            });
        }
        therm_buf.copy_from_slice(&self.therm[row * cols..row * cols + cols]);
        Ok(())
    }

    fn meta(&self) -> &SceneMeta {
        &self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::NBAND;

    fn trivial_meta(rows: usize, cols: usize) -> SceneMeta {
        SceneMeta {
            satu_value_ref: [20000; NBAND],
            satu_value_max: [10000; NBAND],
            therm_satu_value_ref: 32767,
            therm_satu_value_max: 6000,
            rows,
            cols,
        }
    }

    #[test]
    fn reads_back_rows_verbatim() {
        let meta = trivial_meta(2, 3);
        let bands: [Vec<i16>; NBAND] = std::array::from_fn(|b| {
            (0..6).map(|i| (b as i16) * 100 + i as i16).collect()
        });
        let therm = vec![100, 200, 300, 400, 500, 600];
        let mut acc = InMemoryBandAccessor::new(meta, bands, therm).unwrap();

        let mut buf = [0i16; 3];
        acc.get_input_line(Band::Nir, 1, &mut buf).unwrap();
        assert_eq!(buf, [303, 304, 305]);

        let mut tbuf = [0i16; 3];
        acc.get_input_therm_line(0, &mut tbuf).unwrap();
        assert_eq!(tbuf, [100, 200, 300]);
    }

    #[test]
    fn out_of_range_row_is_an_error() {
        let meta = trivial_meta(1, 2);
        let bands: [Vec<i16>; NBAND] = std::array::from_fn(|_| vec![0, 0]);
        let mut acc = InMemoryBandAccessor::new(meta, bands, vec![0, 0]).unwrap();
        let mut buf = [0i16; 2];
        assert!(acc.get_input_line(Band::Blue, 5, &mut buf).is_err());
    }
}
