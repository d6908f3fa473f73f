//! Iterative minimizer (C6, spec §4.6): Fletcher–Reeves nonlinear
//! conjugate-gradient descent. Untied from the functionals — it drives
//! any [`DifferentiableObjective`], so [`crate::objective::Objective`]
//! can be swapped for a toy quadratic in tests without touching this
//! module.

use crate::error::SolveStatus;

const MAX_ITERATIONS: u32 = 30_000;
const GRADIENT_TOLERANCE: f64 = 1e-3;
const INITIAL_STEP: f64 = 0.01;
/// Armijo sufficient-decrease constant for the backtracking line search.
const LINE_SEARCH_TOLERANCE: f64 = 1e-4;
const MAX_LINE_SEARCH_STEPS: u32 = 60;

/// Anything the minimizer can drive: a scalar value and its gradient at
/// a point, both O(N) per call, with no further structure required.
pub trait DifferentiableObjective {
    fn len(&self) -> usize;
    fn value(&self, x: &[f64]) -> f64;
    /// Both `f(x)` and `∇f(x)`, written into `grad_out`.
    fn value_and_gradient(&mut self, x: &[f64], grad_out: &mut [f64]) -> f64;
}

/// Result of driving the minimizer to completion.
#[derive(Debug, Clone)]
pub struct MinimizeOutcome {
    /// The best estimate found, in whatever space the objective operates.
    pub x: Vec<f64>,
    pub status: SolveStatus,
    pub final_gradient_norm: f64,
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Backtracking line search enforcing the Armijo sufficient-decrease
/// condition along a descent direction. Returns `None` if `direction`
/// is not a descent direction, or no acceptable step is found before
/// the step size underflows — both surface as `NumericalFailure`.
fn line_search<O: DifferentiableObjective>(
    objective: &O,
    x: &[f64],
    f_x: f64,
    grad: &[f64],
    direction: &[f64],
    initial_step: f64,
) -> Option<(f64, Vec<f64>, f64)> {
    let directional_derivative = dot(grad, direction);
    if !directional_derivative.is_finite() || directional_derivative >= 0.0 {
        return None;
    }

    let mut step = initial_step;
    let mut trial = vec![0.0; x.len()];
    for _ in 0..MAX_LINE_SEARCH_STEPS {
        for i in 0..x.len() {
            trial[i] = x[i] + step * direction[i];
        }
        let f_trial = objective.value(&trial);
        if f_trial.is_finite() && f_trial <= f_x + LINE_SEARCH_TOLERANCE * step * directional_derivative {
            return Some((step, trial, f_trial));
        }
        step *= 0.5;
        if step < 1e-20 {
            return None;
        }
    }
    None
}

/// Drive `objective` from `init` by Fletcher–Reeves conjugate-gradient
/// descent until the gradient norm drops to [`GRADIENT_TOLERANCE`], a
/// line-search failure occurs, or [`MAX_ITERATIONS`] is reached.
pub fn minimize<O: DifferentiableObjective>(objective: &mut O, init: &[f64]) -> MinimizeOutcome {
    let n = objective.len();
    assert_eq!(init.len(), n, "initial guess length must match objective size");

    let mut x = init.to_vec();
    let mut grad = vec![0.0; n];
    let mut f_x = objective.value_and_gradient(&x, &mut grad);
    let mut direction: Vec<f64> = grad.iter().map(|g| -g).collect();

    if norm(&grad) <= GRADIENT_TOLERANCE {
        return MinimizeOutcome {
            x,
            status: SolveStatus::Converged { iterations: 0 },
            final_gradient_norm: norm(&grad),
        };
    }

    let mut best_x = x.clone();
    let mut best_grad_norm = norm(&grad);

    for iter in 1..=MAX_ITERATIONS {
        let searched = line_search(objective, &x, f_x, &grad, &direction, INITIAL_STEP);
        let (_, x_new, f_new) = match searched {
            Some(result) => result,
            None => {
                return MinimizeOutcome {
                    x: best_x,
                    status: SolveStatus::NumericalFailure { iterations: iter },
                    final_gradient_norm: best_grad_norm,
                };
            }
        };

        let mut grad_new = vec![0.0; n];
        let f_check = objective.value_and_gradient(&x_new, &mut grad_new);
        debug_assert!((f_check - f_new).abs() < 1e-6 || !f_check.is_finite());

        let gnorm_new = norm(&grad_new);
        if !gnorm_new.is_finite() {
            return MinimizeOutcome {
                x: best_x,
                status: SolveStatus::NumericalFailure { iterations: iter },
                final_gradient_norm: best_grad_norm,
            };
        }

        if gnorm_new < best_grad_norm {
            best_x = x_new.clone();
            best_grad_norm = gnorm_new;
        }

        if gnorm_new <= GRADIENT_TOLERANCE {
            return MinimizeOutcome {
                x: x_new,
                status: SolveStatus::Converged { iterations: iter },
                final_gradient_norm: gnorm_new,
            };
        }

        // Fletcher-Reeves update, with a restart to steepest descent
        // whenever the computed direction is not a descent direction.
        let beta_fr = dot(&grad_new, &grad_new) / dot(&grad, &grad).max(f64::MIN_POSITIVE);
        let mut direction_new: Vec<f64> = (0..n)
            .map(|i| -grad_new[i] + beta_fr * direction[i])
            .collect();
        if dot(&grad_new, &direction_new) >= 0.0 {
            direction_new = grad_new.iter().map(|g| -g).collect();
        }

        x = x_new;
        f_x = f_new;
        grad = grad_new;
        direction = direction_new;
    }

    MinimizeOutcome {
        x: best_x,
        status: SolveStatus::IterationCap {
            iterations: MAX_ITERATIONS,
        },
        final_gradient_norm: best_grad_norm,
    }
}
