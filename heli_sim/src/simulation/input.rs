// heli_sim/src/simulation/input.rs

//! Manual control input. Devices are external; the simulator only sees raw stick
//! axes and two keys through an [`InputSource`].

use heli_core::types::JoystickOutput;

/// Stick deflection below which an axis reads zero.
pub const DEAD_ZONE: f64 = 0.05;
/// Response of the squared curve at full deflection.
pub const CYCLIC_RESPONSE: f64 = 0.7;
pub const RUDDER_RESPONSE: f64 = 0.7;

/// Raw stick axes, each in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawSticks {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
    pub throttle: f64,
}

fn response_curve(axis: f64, response: f64) -> f64 {
    if axis.abs() < DEAD_ZONE {
        0.0
    } else {
        axis.signum() * response * axis * axis
    }
}

/// Dead zone and squared response on pitch, roll and yaw; throttle maps from
/// `[-1, 1]` to `[0, 1]`.
pub fn shape_manual_input(raw: &RawSticks) -> JoystickOutput {
    JoystickOutput {
        pitch: response_curve(raw.pitch, CYCLIC_RESPONSE),
        roll: response_curve(raw.roll, CYCLIC_RESPONSE),
        yaw: response_curve(raw.yaw, RUDDER_RESPONSE),
        throttle: 0.5 + raw.throttle / 2.0,
    }
}

/// The joystick and keyboard as seen by the scenario runner. Polled once per tick.
pub trait InputSource {
    /// False when no stick is connected.
    fn is_attached(&self) -> bool {
        true
    }

    /// Current stick axes, `None` without a device.
    fn sticks(&mut self) -> Option<RawSticks>;

    /// The hover override key is held.
    fn hover_held(&mut self) -> bool;

    /// The skip-scenario key was pressed.
    fn skip_pressed(&mut self) -> bool;
}

/// Headless operation: no sticks, no keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn is_attached(&self) -> bool {
        false
    }

    fn sticks(&mut self) -> Option<RawSticks> {
        None
    }

    fn hover_held(&mut self) -> bool {
        false
    }

    fn skip_pressed(&mut self) -> bool {
        false
    }
}
