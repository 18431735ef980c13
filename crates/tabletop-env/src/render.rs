//! Frame capture for image observations and human viewing.
//!
//! The simulator returns row-major RGB bytes with bottom-up scanlines (the
//! usual GL readback order); the pipeline flips the frame to top-down rows,
//! normalizes, and — for the network purposes — crops the fixed sub-region
//! the downstream encoders were trained on.

use tabletop_core::config::RenderMode;
use tabletop_core::error::SimError;
use tabletop_sim::Simulator;

/// Rows kept by the network crop.
pub const CROP_ROWS: usize = 48;
/// First column kept by the network crop.
pub const CROP_COL_START: usize = 10;
/// One past the last column kept by the network crop.
pub const CROP_COL_END: usize = 74;
/// Square frame size for human viewing.
pub const HUMAN_IM_SIZE: u32 = 500;

/// Scalar count of the flattened network crop.
pub const IMG_CROP_LEN: usize = 3 * CROP_ROWS * (CROP_COL_END - CROP_COL_START);

// ---------------------------------------------------------------------------
// RenderSettings
// ---------------------------------------------------------------------------

/// Per-environment render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub camera_name: String,
    pub image_dim: u32,
    pub hide_goal: bool,
    pub goal_site: String,
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// A captured frame in row-major HWC layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub height: usize,
    pub width: usize,
    /// `height * width * 3` values, normalized per the render mode.
    pub data: Vec<f64>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The 3 channel values at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[must_use]
    pub fn pixel(&self, row: usize, col: usize) -> &[f64] {
        assert!(row < self.height && col < self.width, "pixel out of bounds");
        let base = (row * self.width + col) * 3;
        &self.data[base..base + 3]
    }

    pub fn into_flat(self) -> Vec<f64> {
        self.data
    }
}

// ---------------------------------------------------------------------------
// render_frame
// ---------------------------------------------------------------------------

/// Capture one frame for the given purpose.
///
/// `Human` renders the full 500x500 view with raw byte values and the goal
/// marker forced visible; `Nn` renders at `image_dim` normalized to [0, 1]
/// and cropped; `VisNn` is the cropped view with raw byte values. After any
/// render the goal marker is re-hidden when `hide_goal` is set.
pub fn render_frame(
    sim: &mut dyn Simulator,
    settings: &RenderSettings,
    mode: RenderMode,
) -> Result<Frame, SimError> {
    let (size, norm) = match mode {
        RenderMode::Human => (HUMAN_IM_SIZE, 1.0),
        RenderMode::Nn => (settings.image_dim, 255.0),
        RenderMode::VisNn => (settings.image_dim, 1.0),
    };
    if mode == RenderMode::Human {
        sim.set_site_visible(&settings.goal_site, true)?;
    }
    let raw = sim.render(&settings.camera_name, size, size)?;
    let frame = assemble(&raw, size as usize, norm, mode != RenderMode::Human)?;
    if settings.hide_goal {
        sim.set_site_visible(&settings.goal_site, false)?;
    }
    Ok(frame)
}

/// Flip bottom-up scanlines into top-down rows, normalize, and optionally
/// apply the network crop.
fn assemble(raw: &[u8], size: usize, norm: f64, crop: bool) -> Result<Frame, SimError> {
    let expected = size * size * 3;
    if raw.len() != expected {
        return Err(SimError::RenderFailed(format!(
            "frame byte count {} does not match expected {expected}",
            raw.len()
        )));
    }
    if crop && (size < CROP_COL_END || size < CROP_ROWS) {
        return Err(SimError::RenderFailed(format!(
            "frame size {size} too small for the {CROP_ROWS}x{CROP_COL_END} crop"
        )));
    }
    let (rows, col_start, col_end) = if crop {
        (CROP_ROWS, CROP_COL_START, CROP_COL_END)
    } else {
        (size, 0, size)
    };
    let mut data = Vec::with_capacity(rows * (col_end - col_start) * 3);
    for row in 0..rows {
        let src_row = size - 1 - row;
        for col in col_start..col_end {
            let base = (src_row * size + col) * 3;
            for channel in 0..3 {
                data.push(f64::from(raw[base + channel]) / norm);
            }
        }
    }
    Ok(Frame {
        height: rows,
        width: col_end - col_start,
        data,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
