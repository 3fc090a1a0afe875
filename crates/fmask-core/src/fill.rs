//! Local-Minima Filler (spec.md §4.10).
//!
//! spec.md treats `fill_local_minima_in_image` as an external collaborator
//! whose contract is specified but whose implementation is out of scope for
//! the written design. This workspace still needs one working implementation
//! to run the six-pass pipeline end to end (see SPEC_FULL.md §7), so this
//! module provides a priority-flood grayscale reconstruction: the standard
//! algorithm for raising interior local minima up to the lowest saddle that
//! connects them to the image border, used throughout hydrological terrain
//! analysis for "filling depressions" before flow routing.
//!
//! The border is seeded at `boundary` rather than its true sample value —
//! spec.md §4.10: "Border pixels are effectively held at boundary." Passing a
//! sentinel at or below the global minimum (this crate's Pass 5 caller uses
//! `0`, matching the "anchored at 0" convention of spec.md §4.8/§9) means the
//! border never artificially raises a path; every interior cell is filled
//! exactly to the lowest saddle along its cheapest path to the border.
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::FmaskError;

/// Something that can perform the §4.10 contract. The classifier's Pass 5
/// depends on this trait rather than the concrete implementation below, so a
/// caller may substitute a different flood-fill strategy without touching
/// the classifier.
pub trait LocalMinimaFiller {
    fn fill(
        &self,
        label: &str,
        src: &[i16],
        height: usize,
        width: usize,
        boundary: i16,
        dst: &mut [i16],
    ) -> Result<(), FmaskError>;
}

/// Priority-flood implementation of [`LocalMinimaFiller`].
pub struct PriorityFloodFiller;

impl LocalMinimaFiller for PriorityFloodFiller {
    fn fill(
        &self,
        label: &str,
        src: &[i16],
        height: usize,
        width: usize,
        boundary: i16,
        dst: &mut [i16],
    ) -> Result<(), FmaskError> {
        fill_local_minima_in_image(label, src, height, width, boundary, dst)
    }
}

/// Free-function form of the §6 external interface:
/// `fill_local_minima_in_image(label, src[H*W], H, W, boundary, dst) -> ok/err`.
pub fn fill_local_minima_in_image(
    label: &str,
    src: &[i16],
    height: usize,
    width: usize,
    boundary: i16,
    dst: &mut [i16],
) -> Result<(), FmaskError> {
    let n = height
        .checked_mul(width)
        .ok_or_else(|| FmaskError::Alloc(format!("{label}: height*width overflow")))?;
    if src.len() != n || dst.len() != n {
        return Err(FmaskError::Fill {
            label: label.to_string(),
            source: format!(
                "buffer size mismatch: expected {n} elements, got src={} dst={}",
                src.len(),
                dst.len()
            ),
        });
    }
    if n == 0 {
        return Ok(());
    }

    let mut visited = vec![false; n];
    let mut heap: BinaryHeap<Reverse<(i16, usize)>> = BinaryHeap::new();

    let is_border = |r: usize, c: usize| r == 0 || c == 0 || r == height - 1 || c == width - 1;

    for r in 0..height {
        for c in 0..width {
            if is_border(r, c) {
                let idx = r * width + c;
                dst[idx] = boundary;
                visited[idx] = true;
                heap.push(Reverse((boundary, idx)));
            }
        }
    }

    while let Some(Reverse((v, idx))) = heap.pop() {
        let r = idx / width;
        let c = idx % width;
        for (dr, dc) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
            let nr = r as i32 + dr;
            let nc = c as i32 + dc;
            if nr < 0 || nc < 0 || nr as usize >= height || nc as usize >= width {
                continue;
            }
            let nidx = nr as usize * width + nc as usize;
            if visited[nidx] {
                continue;
            }
            let nv = src[nidx].max(v);
            dst[nidx] = nv;
            visited[nidx] = true;
            heap.push(Reverse((nv, nidx)));
        }
    }

    Ok(())
}
