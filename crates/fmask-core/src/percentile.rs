//! Bounded-histogram percentile estimator (spec.md §4.1).
use crate::error::FmaskError;

/// Tolerance used for "strictly greater"/"not strictly greater" comparisons
/// against zero, absorbing rounding after `i16 -> f32` conversion.
pub const MINSIGMA: f32 = 1e-6;

#[inline]
pub fn gt(a: f32, b: f32) -> bool {
    a - b > MINSIGMA
}

#[inline]
pub fn le(a: f32, b: f32) -> bool {
    !gt(a, b)
}

/// Percentile of an integer sample over the closed range `[min, max]`
/// (bin width 1). Returns the smallest bin value whose cumulative count
/// reaches `ceil(pct/100 * n)`. Empty input returns 0, matching the source
/// convention that callers already substitute 0 for empty-set extrema.
pub fn prctile(samples: &[i16], min: i16, max: i16, pct: f32) -> Result<i16, FmaskError> {
    if samples.is_empty() {
        return Ok(0);
    }
    if max < min {
        return Err(FmaskError::Percentile(format!(
            "invalid histogram range [{min}, {max}]"
        )));
    }

    let nbins = (max as i64 - min as i64 + 1) as usize;
    let mut hist = vec![0u32; nbins];
    for &s in samples {
        let clamped = s.clamp(min, max);
        hist[(clamped as i64 - min as i64) as usize] += 1;
    }

    let n = samples.len() as f64;
    let target = (pct as f64 / 100.0 * n).ceil() as u64;
    let target = target.max(1);

    let mut cum: u64 = 0;
    for (i, &count) in hist.iter().enumerate() {
        cum += count as u64;
        if cum >= target {
            return Ok(min + i as i16);
        }
    }
    Ok(max)
}

/// Percentile of a float sample over an equal-width 100-bin histogram of
/// `[min, max]`. Returns the lower edge of the selected bin. Empty input
/// returns 0.0.
pub fn prctile2(samples: &[f32], min: f32, max: f32, pct: f32) -> Result<f32, FmaskError> {
    if samples.is_empty() {
        return Ok(0.0);
    }
    if max < min {
        return Err(FmaskError::Percentile(format!(
            "invalid histogram range [{min}, {max}]"
        )));
    }
    if max == min {
        // Degenerate single-value range: every sample clamps to the same
        // value, so the percentile is that value regardless of `pct`.
        return Ok(min);
    }

    const NBINS: usize = 100;
    let width = (max - min) / NBINS as f32;
    let mut hist = [0u32; NBINS];
    for &s in samples {
        let clamped = s.clamp(min, max);
        let mut bin = ((clamped - min) / width) as usize;
        if bin >= NBINS {
            bin = NBINS - 1;
        }
        hist[bin] += 1;
    }

    let n = samples.len() as f64;
    let target = (pct as f64 / 100.0 * n).ceil() as u64;
    let target = target.max(1);

    let mut cum: u64 = 0;
    for (i, &count) in hist.iter().enumerate() {
        cum += count as u64;
        if cum >= target {
            return Ok(min + i as f32 * width);
        }
    }
    Ok(min + (NBINS - 1) as f32 * width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sample_returns_zero() {
        assert_eq!(prctile(&[], 0, 100, 50.0).unwrap(), 0);
        assert_eq!(prctile2(&[], 0.0, 100.0, 50.0).unwrap(), 0.0);
    }

    #[test]
    fn prctile_law_holds_for_uniform_sample() {
        let samples: Vec<i16> = (0..1000).map(|v| v as i16).collect();
        for &p in &[10.0, 17.5, 50.0, 82.5, 99.0] {
            let v = prctile(&samples, 0, 999, p).unwrap();
            let below = samples.iter().filter(|&&x| (x as f32) < v as f32).count() as f64;
            let at_or_below = samples.iter().filter(|&&x| (x as f32) <= v as f32).count() as f64;
            let n = samples.len() as f64;
            assert!(below / n < p as f64 / 100.0 + 1e-9);
            assert!(at_or_below / n >= p as f64 / 100.0 - 1e-9);
        }
    }

    #[test]
    fn prctile_clamps_out_of_range_samples() {
        let samples = [-500i16, 5000, 50, 60];
        // Both extremes clamp into [0, 100]; result must stay in range.
        let v = prctile(&samples, 0, 100, 50.0).unwrap();
        assert!((0..=100).contains(&v));
    }

    #[test]
    fn prctile2_returns_bin_lower_edge() {
        let samples: Vec<f32> = (0..100).map(|v| v as f32).collect();
        let v = prctile2(&samples, 0.0, 100.0, 50.0).unwrap();
        assert!((0.0..100.0).contains(&v));
    }
}
