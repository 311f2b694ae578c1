// heli_core/src/frames.rs

use nalgebra::{DMatrix, DVector, Quaternion, UnitQuaternion, Vector3};

pub mod layout;

/// The frames a filter state variable can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameId {
    /// The simulator's world frame (+Y up, -Z forward).
    World,
    /// The helicopter body frame.
    Body,
}

/// Every variable that can appear in a filter state vector, tagged with its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVariable {
    // --- Cartesian Position ---
    Px(FrameId),
    Py(FrameId),
    Pz(FrameId),
    // --- Cartesian Velocity ---
    Vx(FrameId),
    Vy(FrameId),
    Vz(FrameId),
    // --- Orientation (as a quaternion) ---
    // Rotation FROM the first frame TO the second frame.
    Qx(FrameId, FrameId),
    Qy(FrameId, FrameId),
    Qz(FrameId, FrameId),
    Qw(FrameId, FrameId),
}

/// A filter state bundled with its schema, covariance and timestamp.
#[derive(Debug, Clone)]
pub struct FrameAwareState {
    /// The ordered "schema" of the state vector.
    pub layout: Vec<StateVariable>,
    /// The state vector `x`.
    pub vector: DVector<f64>,
    /// The covariance matrix `P`.
    pub covariance: DMatrix<f64>,
    /// Seconds of simulation time at the last update.
    pub last_update_timestamp: f64,
}

impl FrameAwareState {
    /// A zero state (identity orientation) with covariance `initial_covariance_val * I`.
    pub fn new(layout: Vec<StateVariable>, initial_covariance_val: f64, timestamp: f64) -> Self {
        let dim = layout.len();
        let mut vector = DVector::zeros(dim);

        // A zero quaternion would turn into NaN on normalization.
        if let Some(i) = layout
            .iter()
            .position(|var| matches!(var, StateVariable::Qw(_, _)))
        {
            vector[i] = 1.0;
        }

        Self {
            layout,
            vector,
            covariance: DMatrix::identity(dim, dim) * initial_covariance_val,
            last_update_timestamp: timestamp,
        }
    }

    /// Returns the dimension (number of rows) of the state vector.
    pub fn dim(&self) -> usize {
        self.layout.len()
    }

    /// Finds the index of a specific `StateVariable` in the layout.
    pub fn find_idx(&self, var: &StateVariable) -> Option<usize> {
        self.layout.iter().position(|v| v == var)
    }

    fn component(&self, vector: &DVector<f64>, var: StateVariable) -> f64 {
        self.find_idx(&var).map_or(0.0, |i| vector[i])
    }

    fn set_component(&mut self, var: StateVariable, value: f64) {
        if let Some(i) = self.find_idx(&var) {
            self.vector[i] = value;
        }
    }

    /// World position read from `vector`, which must follow this state's layout.
    pub fn position_of(&self, vector: &DVector<f64>) -> Vector3<f64> {
        let w = FrameId::World;
        Vector3::new(
            self.component(vector, StateVariable::Px(w)),
            self.component(vector, StateVariable::Py(w)),
            self.component(vector, StateVariable::Pz(w)),
        )
    }

    /// World velocity read from `vector`.
    pub fn velocity_of(&self, vector: &DVector<f64>) -> Vector3<f64> {
        let w = FrameId::World;
        Vector3::new(
            self.component(vector, StateVariable::Vx(w)),
            self.component(vector, StateVariable::Vy(w)),
            self.component(vector, StateVariable::Vz(w)),
        )
    }

    /// Body-to-world orientation read from `vector`, normalized. A degenerate
    /// quaternion reads as identity.
    pub fn orientation_of(&self, vector: &DVector<f64>) -> UnitQuaternion<f64> {
        let (b, w) = (FrameId::Body, FrameId::World);
        let q = Quaternion::new(
            self.component(vector, StateVariable::Qw(b, w)),
            self.component(vector, StateVariable::Qx(b, w)),
            self.component(vector, StateVariable::Qy(b, w)),
            self.component(vector, StateVariable::Qz(b, w)),
        );
        UnitQuaternion::try_new(q, 1e-12).unwrap_or_else(UnitQuaternion::identity)
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position_of(&self.vector)
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity_of(&self.vector)
    }

    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.orientation_of(&self.vector)
    }

    /// Writes position, velocity and orientation into the state vector.
    pub fn set_kinematics(
        &mut self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
        orientation: &UnitQuaternion<f64>,
    ) {
        let (b, w) = (FrameId::Body, FrameId::World);
        let q = orientation.as_ref();
        self.set_component(StateVariable::Px(w), position.x);
        self.set_component(StateVariable::Py(w), position.y);
        self.set_component(StateVariable::Pz(w), position.z);
        self.set_component(StateVariable::Vx(w), velocity.x);
        self.set_component(StateVariable::Vy(w), velocity.y);
        self.set_component(StateVariable::Vz(w), velocity.z);
        self.set_component(StateVariable::Qx(b, w), q.i);
        self.set_component(StateVariable::Qy(b, w), q.j);
        self.set_component(StateVariable::Qz(b, w), q.k);
        self.set_component(StateVariable::Qw(b, w), q.w);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::layout::gps_ins_state_layout;
    use approx::assert_abs_diff_eq;

    #[test]
    fn new_state_has_identity_orientation() {
        let state = FrameAwareState::new(gps_ins_state_layout(), 0.001, 2.0);
        assert_eq!(state.dim(), 10);
        assert_eq!(state.orientation(), UnitQuaternion::identity());
        assert_abs_diff_eq!(state.covariance[(4, 4)], 0.001);
        assert_abs_diff_eq!(state.covariance[(4, 5)], 0.0);
    }

    #[test]
    fn kinematics_round_trip_through_the_vector() {
        let mut state = FrameAwareState::new(gps_ins_state_layout(), 0.0, 0.0);
        let q = UnitQuaternion::from_euler_angles(0.1, -0.2, 0.3);
        state.set_kinematics(&Vector3::new(1.0, 2.0, 3.0), &Vector3::new(4.0, 5.0, 6.0), &q);

        assert_eq!(state.position(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(state.velocity(), Vector3::new(4.0, 5.0, 6.0));
        assert_abs_diff_eq!(state.orientation().angle_to(&q), 0.0, epsilon = 1e-12);
        assert_eq!(
            state.find_idx(&StateVariable::Qw(FrameId::Body, FrameId::World)),
            Some(9)
        );
    }

    #[test]
    fn degenerate_quaternion_reads_as_identity() {
        let state = FrameAwareState::new(gps_ins_state_layout(), 0.0, 0.0);
        let zeros = DVector::zeros(state.dim());
        assert_eq!(state.orientation_of(&zeros), UnitQuaternion::identity());
    }
}
