// heli_core/src/control/pid.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Gains as configured: the error magnitude that saturates each channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PidGains {
    #[serde(default)]
    pub p: f64,
    #[serde(default)]
    pub i: f64,
    #[serde(default)]
    pub d: f64,
}

impl PidGains {
    pub const fn new(p: f64, i: f64, d: f64) -> Self {
        Self { p, i, d }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ErrorSample {
    value: f64,
    time: f64,
}

/// Zero stays zero so that a disabled channel contributes nothing.
fn reciprocal(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        1.0 / value
    }
}

/// PID controller whose gains are given as saturating errors: a gain of `10`
/// means an error of 10 units produces full output. Internally the reciprocals
/// multiply the errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Pid {
    pub name: String,
    p: f64,
    i: f64,
    d: f64,
    integral_error: f64,
    differential_error: f64,
    prev_error: ErrorSample,
}

impl Pid {
    pub fn new(name: impl Into<String>, gains: PidGains) -> Self {
        Self {
            name: name.into(),
            p: reciprocal(gains.p),
            i: reciprocal(gains.i),
            d: reciprocal(gains.d),
            integral_error: 0.0,
            differential_error: 0.0,
            prev_error: ErrorSample {
                value: f64::NAN,
                time: 0.0,
            },
        }
    }

    /// The configured gains.
    pub fn gains(&self) -> PidGains {
        PidGains::new(reciprocal(self.p), reciprocal(self.i), reciprocal(self.d))
    }

    /// A copy with the same gains and no history.
    pub fn fresh(&self) -> Self {
        Self::new(self.name.clone(), self.gains())
    }

    fn sum(&self, proportional: f64, integral: f64, differential: f64) -> f64 {
        proportional * self.p + integral * self.i + differential * self.d
    }

    /// Output in `[-1, 1]` from explicitly given errors.
    pub fn compute_explicit(&self, proportional: f64, integral: f64, differential: f64) -> f64 {
        self.sum(proportional, integral, differential).clamp(-1.0, 1.0)
    }

    /// Output in `[0, 1]` from explicitly given errors, centred on 0.5.
    pub fn compute_explicit_positive(
        &self,
        proportional: f64,
        integral: f64,
        differential: f64,
    ) -> f64 {
        (self.sum(proportional, integral, differential) / 2.0 + 0.5).clamp(0.0, 1.0)
    }

    /// Output in `[-1, 1]`, tracking integral and derivative of `error` over time.
    pub fn compute(&mut self, error: f64, total_time: f64) -> f64 {
        self.update_history(error, total_time);
        self.compute_explicit(error, self.integral_error, self.differential_error)
    }

    /// Output in `[0, 1]`, tracking integral and derivative of `error` over time.
    pub fn compute_positive(&mut self, error: f64, total_time: f64) -> f64 {
        self.update_history(error, total_time);
        self.compute_explicit_positive(error, self.integral_error, self.differential_error)
    }

    fn update_history(&mut self, error: f64, total_time: f64) {
        let elapsed = total_time - self.prev_error.time;
        if elapsed > 0.0 {
            if self.prev_error.value.is_nan() {
                self.prev_error.value = error;
            }
            self.differential_error = (error - self.prev_error.value) / elapsed;
            self.integral_error += error * elapsed;
        }
        self.prev_error = ErrorSample {
            value: error,
            time: total_time,
        };
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = self.gains();
        write!(f, "{}({}, {}, {})", self.name, g.p, g.i, g.d)
    }
}

/// The full set of controllers the autopilot flies with.
#[derive(Debug, Clone, PartialEq)]
pub struct PidSetup {
    pub name: String,
    pub pitch_angle: Pid,
    pub roll_angle: Pid,
    pub yaw_angle: Pid,
    pub throttle: Pid,
    pub forwards_accel: Pid,
    pub rightwards_accel: Pid,
}

impl PidSetup {
    pub fn fresh(&self) -> Self {
        Self {
            name: self.name.clone(),
            pitch_angle: self.pitch_angle.fresh(),
            roll_angle: self.roll_angle.fresh(),
            yaw_angle: self.yaw_angle.fresh(),
            throttle: self.throttle.fresh(),
            forwards_accel: self.forwards_accel.fresh(),
            rightwards_accel: self.rightwards_accel.fresh(),
        }
    }
}

impl fmt::Display for PidSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (p, r, y, t) = (
            self.pitch_angle.gains(),
            self.roll_angle.gains(),
            self.yaw_angle.gains(),
            self.throttle.gains(),
        );
        write!(
            f,
            "Pitch({}, {}, {}) Roll({}, {}, {}) Yaw({}, {}, {}) Throttle({}, {}, {})",
            p.p, p.i, p.d, r.p, r.i, r.d, y.p, y.i, y.d, t.p, t.i, t.d
        )
    }
}
