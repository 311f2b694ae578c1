// heli_core/src/frames/layout.rs
use crate::frames::{FrameId, StateVariable};

/// Dimension of the GPS/INS filter state.
pub const GPS_INS_STATE_DIM: usize = 10;

/// Layout of the GPS/INS filter state:
/// - Position (3) in World Frame
/// - Velocity (3) in World Frame
/// - Orientation (4, quaternion x, y, z, w) from Body to World Frame
///
/// The first six entries double as the GPS observation layout.
pub fn gps_ins_state_layout() -> Vec<StateVariable> {
    let body = FrameId::Body;
    let world = FrameId::World;

    vec![
        // --- Position (World Frame) --- indices 0-2
        StateVariable::Px(world),
        StateVariable::Py(world),
        StateVariable::Pz(world),
        // --- Velocity (World Frame) --- indices 3-5
        StateVariable::Vx(world),
        StateVariable::Vy(world),
        StateVariable::Vz(world),
        // --- Orientation (Body to World) --- indices 6-9
        StateVariable::Qx(body, world),
        StateVariable::Qy(body, world),
        StateVariable::Qz(body, world),
        StateVariable::Qw(body, world),
    ]
}
