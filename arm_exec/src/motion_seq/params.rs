//! Parameters structure for the motion sequencer

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Input parameters for the motion sequencer.
#[derive(Debug, Clone, Deserialize)]
pub struct SeqParams {
    /// Length of the pauses between behaviours.
    ///
    /// Units: milliseconds
    pub pause_ms: u64,

    pub sweep: SweepParams,
}

/// Parameters of the diagnostic sweep.
///
/// The sweep visits `(x, z_start + i z_step)` for `i` in `1..=steps`.
/// `x` and `z_start` default from the arm geometry when left out, see
/// `SweepParams::line`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SweepParams {
    #[serde(default)]
    pub x: Option<f64>,

    #[serde(default)]
    pub z_start: Option<f64>,

    pub z_step: f64,

    pub steps: u32,

    /// Cycles held after each step.
    pub settle_cycles: u32,
}
