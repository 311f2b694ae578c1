// heli_core/src/utils/integrators.rs

use nalgebra::{DVector, RealField};

/// A fixed-step ODE solver advancing `x' = f(x, t)` from `t0` to `tf`.
pub trait Integrator<T>: Send + Sync {
    fn step(
        &self,
        func: &dyn Fn(&DVector<T>, T) -> DVector<T>,
        x0: &DVector<T>,
        t0: T,
        tf: T,
    ) -> DVector<T>;
}

// Runge-Kutta family

/// First order, forward Euler.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForwardEuler;

impl<T: RealField + Copy> Integrator<T> for ForwardEuler {
    fn step(
        &self,
        func: &dyn Fn(&DVector<T>, T) -> DVector<T>,
        x0: &DVector<T>,
        t0: T,
        tf: T,
    ) -> DVector<T> {
        let dt = tf - t0;
        x0 + func(x0, t0) * dt
    }
}

/// Second order, Heun's method (trapezoidal predictor-corrector).
#[derive(Debug, Default, Clone, Copy)]
pub struct Heun;

impl<T: RealField + Copy> Integrator<T> for Heun {
    fn step(
        &self,
        func: &dyn Fn(&DVector<T>, T) -> DVector<T>,
        x0: &DVector<T>,
        t0: T,
        tf: T,
    ) -> DVector<T> {
        let dt = tf - t0;
        let half = T::one() / (T::one() + T::one());

        let k1 = func(x0, t0);
        let k2 = func(&(x0 + &k1 * dt), tf);

        x0 + (k1 + k2) * (half * dt)
    }
}

/// Classic fourth order Runge-Kutta.
#[derive(Debug, Default, Clone, Copy)]
pub struct RungeKutta4;

impl<T: RealField + Copy> Integrator<T> for RungeKutta4 {
    fn step(
        &self,
        func: &dyn Fn(&DVector<T>, T) -> DVector<T>,
        x0: &DVector<T>,
        t0: T,
        tf: T,
    ) -> DVector<T> {
        let dt = tf - t0;
        let two = T::one() + T::one();
        let half_dt = dt / two;
        let sixth_dt = dt / (two + two + two);

        let k1 = func(x0, t0);
        let k2 = func(&(x0 + &k1 * half_dt), t0 + half_dt);
        let k3 = func(&(x0 + &k2 * half_dt), t0 + half_dt);
        let k4 = func(&(x0 + &k3 * dt), tf);

        x0 + (k1 + k2 * two + k3 * two + k4) * sixth_dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // [p; v]' = [v; a] with a held constant
    fn constant_accel(a: f64) -> impl Fn(&DVector<f64>, f64) -> DVector<f64> {
        move |x: &DVector<f64>, _t: f64| DVector::from_vec(vec![x[1], a])
    }

    #[test]
    fn rk4_is_exact_for_constant_acceleration() {
        let f = constant_accel(-9.81);
        let x0 = DVector::from_vec(vec![10.0, 2.0]);
        let x1 = RungeKutta4.step(&f, &x0, 0.0, 0.5);

        assert_abs_diff_eq!(x1[0], 10.0 + 2.0 * 0.5 - 0.5 * 9.81 * 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(x1[1], 2.0 - 9.81 * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn heun_is_exact_for_constant_acceleration() {
        let f = constant_accel(3.0);
        let x0 = DVector::from_vec(vec![0.0, 1.0]);
        let x1 = Heun.step(&f, &x0, 1.0, 3.0);

        assert_abs_diff_eq!(x1[0], 1.0 * 2.0 + 0.5 * 3.0 * 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x1[1], 1.0 + 3.0 * 2.0, epsilon = 1e-12);
    }

    #[test]
    fn euler_lags_behind_on_position() {
        let f = constant_accel(2.0);
        let x0 = DVector::from_vec(vec![0.0, 0.0]);
        let x1 = ForwardEuler.step(&f, &x0, 0.0, 1.0);

        // Euler ignores the acceleration's effect on position within the step.
        assert_abs_diff_eq!(x1[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x1[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn rk4_tracks_exponential_decay() {
        let f = |x: &DVector<f64>, _t: f64| -x.clone();
        let mut x = DVector::from_vec(vec![1.0]);
        let dt = 0.1;
        for i in 0..10 {
            let t0 = i as f64 * dt;
            x = RungeKutta4.step(&f, &x, t0, t0 + dt);
        }
        assert_abs_diff_eq!(x[0], (-1.0f64).exp(), epsilon = 1e-6);
    }
}
