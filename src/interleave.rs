//! Sample interleaving between split stereo pairs and quad files
//!
//! A quad file alternates one sample of the left file with one sample of
//! the right file: `[L0, R0, L1, R1]` per frame, where `L0`/`L1` are the
//! two channels of the " L" file. Demux is the exact inverse, so a pair
//! survives a mux/demux round trip byte for byte.

use crate::error::{IrError, Result};
use crate::wav::WavData;

/// Channel count of each half of a true stereo pair
pub const PAIR_CHANNELS: u16 = 2;

/// Channel count of a combined quad file
pub const QUAD_CHANNELS: u16 = 4;

/// Interleave two sample streams one `width`-byte sample at a time.
///
/// Both buffers must have the same length, a multiple of `width`.
pub fn interleave(left: &[u8], right: &[u8], width: usize) -> Vec<u8> {
    debug_assert_eq!(left.len(), right.len());
    debug_assert!(width > 0 && left.len() % width == 0);

    let mut out = Vec::with_capacity(left.len() + right.len());
    for (l, r) in left.chunks_exact(width).zip(right.chunks_exact(width)) {
        out.extend_from_slice(l);
        out.extend_from_slice(r);
    }
    out
}

/// Split a stream of alternating `width`-byte samples into its two halves.
///
/// `frames.len()` must be a multiple of `2 * width`.
pub fn deinterleave(frames: &[u8], width: usize) -> (Vec<u8>, Vec<u8>) {
    debug_assert!(width > 0 && frames.len() % (2 * width) == 0);

    let half = frames.len() / 2;
    let mut left = Vec::with_capacity(half);
    let mut right = Vec::with_capacity(half);
    for pair in frames.chunks_exact(2 * width) {
        let (l, r) = pair.split_at(width);
        left.extend_from_slice(l);
        right.extend_from_slice(r);
    }
    (left, right)
}

/// Combine a left/right stereo pair into one quad file.
///
/// # Errors
/// * `ParameterMismatch` - If the halves differ in any header parameter or
///   are not both stereo
pub fn mux(base_name: &str, left: &WavData, right: &WavData) -> Result<WavData> {
    left.params
        .check_compatible(&right.params)
        .map_err(|details| IrError::ParameterMismatch {
            base_name: base_name.to_string(),
            details,
        })?;

    if left.params.channel_count != PAIR_CHANNELS {
        return Err(IrError::ParameterMismatch {
            base_name: base_name.to_string(),
            details: format!(
                "expected {}-channel halves, found {}",
                PAIR_CHANNELS, left.params.channel_count
            ),
        });
    }

    let width = left.params.sample_width_bytes as usize;
    let frames = interleave(&left.frames, &right.frames, width);
    WavData::new(left.params.with_channels(QUAD_CHANNELS), frames)
}

/// Split a quad file into its left and right stereo halves.
///
/// # Errors
/// * `Layout` - If the source is not a 4-channel buffer
pub fn demux(quad: &WavData) -> Result<(WavData, WavData)> {
    if quad.params.channel_count != QUAD_CHANNELS {
        return Err(IrError::Layout {
            reason: format!(
                "expected {} channels, found {}",
                QUAD_CHANNELS, quad.params.channel_count
            ),
        });
    }
    if quad.frames.len() != quad.params.expected_len() {
        return Err(IrError::Layout {
            reason: format!(
                "{} frame bytes, expected {}",
                quad.frames.len(),
                quad.params.expected_len()
            ),
        });
    }

    let width = quad.params.sample_width_bytes as usize;
    let (left, right) = deinterleave(&quad.frames, width);
    let half = quad.params.with_channels(PAIR_CHANNELS);
    Ok((WavData::new(half, left)?, WavData::new(half, right)?))
}
