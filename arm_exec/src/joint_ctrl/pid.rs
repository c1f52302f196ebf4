//! # PID controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Limit on the magnitude of the integral accumulation
    integral_limit: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64, integral_limit: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            integral_limit,
            integral: 0f64,
            prev_error: None
        }
    }

    /// Get the value of the controller for the given error.
    ///
    /// `dt_s` is the time since the previous call.
    pub fn get(&mut self, error: f64, dt_s: f64) -> f64 {
        // If there's no time difference we don't accumulate the integral or
        // calculate a derivative. The other option is to divide by a tiny dt
        // and that will produce a large spike compared to normal operation.
        let dt = if dt_s > 0.0 { Some(dt_s) } else { None };

        if let Some(t) = dt {
            self.integral = clamp(
                self.integral + error * t,
                -self.integral_limit,
                self.integral_limit
            );
        }

        // No derivative on the first sample, as there's nothing to
        // differentiate against.
        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(t)) => (error - e) / t,
            _ => 0f64
        };

        let out = 
            self.k_p * error 
            + self.k_i * self.integral 
            + self.k_d * deriv;
        
        self.prev_error = Some(error);

        out
    }

    /// Clear the controller's history.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
    }

    /// Current value of the integral accumulation.
    pub fn integral(&self) -> f64 {
        self.integral
    }
}
