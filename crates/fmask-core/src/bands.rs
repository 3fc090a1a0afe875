//! Band enumeration and scene-wide radiometric metadata (spec.md §3).
use serde::{Deserialize, Serialize};

/// Reflective band index. Thermal is tracked separately (it has no place in
/// the six-element reflective enumeration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Blue,
    Green,
    Red,
    Nir,
    Swir1,
    Swir2,
}

/// Number of reflective bands the classifier consumes.
pub const NBAND: usize = 6;

pub const ALL_BANDS: [Band; NBAND] = [
    Band::Blue,
    Band::Green,
    Band::Red,
    Band::Nir,
    Band::Swir1,
    Band::Swir2,
];

impl Band {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Band::Blue => 0,
            Band::Green => 1,
            Band::Red => 2,
            Band::Nir => 3,
            Band::Swir1 => 4,
            Band::Swir2 => 5,
        }
    }
}

/// Any reflective sample equal to this value (and any thermal sample
/// `<= FILL_PIXEL`) marks the pixel as fill (spec.md §3).
pub const FILL_PIXEL: i16 = -9999;

/// Scene-wide radiometric metadata supplied by the Band Accessor (spec.md §6).
///
/// `satu_value_ref[b]` is the on-disk saturation marker for band `b`;
/// `satu_value_max[b]` is the value the classifier substitutes for it before
/// any test runs. The thermal channel carries its own pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SceneMeta {
    pub satu_value_ref: [i16; NBAND],
    pub satu_value_max: [i16; NBAND],
    pub therm_satu_value_ref: i16,
    pub therm_satu_value_max: i16,
    pub rows: usize,
    pub cols: usize,
}

impl SceneMeta {
    /// Rewrite a single reflective sample's saturation sentinel to its
    /// substituted maximum. Applied before any spectral test (spec.md §3).
    #[inline]
    pub fn remap_reflective(&self, band: Band, value: i16) -> i16 {
        let b = band.index();
        if value == self.satu_value_ref[b] {
            self.satu_value_max[b]
        } else {
            value
        }
    }

    /// Rewrite a thermal sample's saturation sentinel to its substituted
    /// maximum.
    #[inline]
    pub fn remap_thermal(&self, value: i16) -> i16 {
        if value == self.therm_satu_value_ref {
            self.therm_satu_value_max
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> SceneMeta {
        SceneMeta {
            satu_value_ref: [20000; NBAND],
            satu_value_max: [10000; NBAND],
            therm_satu_value_ref: 32767,
            therm_satu_value_max: 6000,
            rows: 2,
            cols: 2,
        }
    }

    #[test]
    fn remap_only_rewrites_the_sentinel() {
        let m = meta();
        assert_eq!(m.remap_reflective(Band::Red, 20000), 10000);
        assert_eq!(m.remap_reflective(Band::Red, 500), 500);
        assert_eq!(m.remap_thermal(32767), 6000);
        assert_eq!(m.remap_thermal(1500), 1500);
    }

    #[test]
    fn band_index_is_stable_and_unique() {
        let mut seen = [false; NBAND];
        for b in ALL_BANDS {
            assert!(!seen[b.index()]);
            seen[b.index()] = true;
        }
    }
}
