//! Total objective (C5, spec §4.5): `f = R + λ_eff·D` and its gradient,
//! computed together for the minimizer.

use crate::data_term;
use crate::minimizer::DifferentiableObjective;
use crate::params::Parameters;
use crate::regularization;

/// Borrows a [`Parameters`] bundle and exposes the combined
/// value-and-gradient call the minimizer drives.
pub struct Objective<'p> {
    params: &'p Parameters,
    lambda_eff: f64,
    scratch_data_grad: Vec<f64>,
}

impl<'p> Objective<'p> {
    pub fn new(params: &'p Parameters) -> Self {
        let k = params.range();
        Objective {
            params,
            lambda_eff: params.lambda() / (k * k),
            scratch_data_grad: vec![0.0; params.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `f(x) = R(x) + λ_eff·D(x)`.
    pub fn value(&self, x: &[f64]) -> f64 {
        regularization::value(x, self.params) + self.lambda_eff * data_term::value(x, self.params)
    }

    /// `∇f(x) = ∇R(x) + λ_eff·∇D(x)`, written into `grad_out`.
    pub fn gradient_into(&mut self, x: &[f64], grad_out: &mut [f64]) {
        regularization::gradient_into(x, self.params, grad_out);
        data_term::gradient_into(x, self.params, &mut self.scratch_data_grad);
        for i in 0..grad_out.len() {
            grad_out[i] += self.lambda_eff * self.scratch_data_grad[i];
        }
    }

    /// Both `f(x)` and `∇f(x)` in one call, as the minimizer needs.
    pub fn value_and_gradient(&mut self, x: &[f64], grad_out: &mut [f64]) -> f64 {
        self.gradient_into(x, grad_out);
        self.value(x)
    }
}

impl<'p> DifferentiableObjective for Objective<'p> {
    fn len(&self) -> usize {
        Objective::len(self)
    }
    fn value(&self, x: &[f64]) -> f64 {
        Objective::value(self, x)
    }
    fn value_and_gradient(&mut self, x: &[f64], grad_out: &mut [f64]) -> f64 {
        Objective::value_and_gradient(self, x, grad_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn masked_pixels_never_move_the_gradient() {
        let mut mask = vec![0i32; 25];
        mask[12] = 11;
        let p = Parameters::new(vec![0.2; 25], mask, 5, 5, 0.0, 1.0, "hubertukey", 0.5, 0.02).unwrap();
        let mut obj = Objective::new(&p);
        let x: Vec<f64> = (0..25).map(|i| (i as f64 * 0.013).sin().abs()).collect();
        let mut grad = vec![0.0; 25];
        obj.gradient_into(&x, &mut grad);
        assert_eq!(grad[12], 0.0);
    }

    #[test]
    fn l2_gradient_matches_finite_difference() {
        let p = Parameters::new(vec![0.1; 25], vec![0; 25], 5, 5, 0.0, 1.0, "L2", 0.5, 0.02).unwrap();
        let mut obj = Objective::new(&p);
        let x: Vec<f64> = (0..25).map(|i| 0.1 + 0.01 * (i as f64)).collect();

        let mut analytic = vec![0.0; 25];
        obj.gradient_into(&x, &mut analytic);

        let h = 1e-6;
        for i in 0..25 {
            let mut xp = x.clone();
            xp[i] += h;
            let mut xm = x.clone();
            xm[i] -= h;
            let fd = (obj.value(&xp) - obj.value(&xm)) / (2.0 * h);
            assert_abs_diff_eq!(analytic[i], fd, epsilon = 1e-4);
        }
    }
}
