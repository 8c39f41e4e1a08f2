//! Bounded minimisation and parameter uncertainties

// crate modules
use crate::error::{Error, Result};

// external crates
use argmin::core::{CostFunction, Executor, State, TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;
use log::{debug, trace, warn};
use nalgebra::DMatrix;

/// A free parameter with its starting value and hard limits
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub init: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Parameter {
    pub fn new(name: &str, init: f64, lower: f64, upper: f64) -> Self {
        Self {
            name: name.to_string(),
            init,
            lower,
            upper,
        }
    }

    fn width(&self) -> f64 {
        self.upper - self.lower
    }

    fn to_unit(&self, value: f64) -> f64 {
        ((value - self.lower) / self.width()).clamp(0.0, 1.0)
    }

    fn from_unit(&self, u: f64) -> f64 {
        self.lower + u.clamp(0.0, 1.0) * self.width()
    }
}

/// Anything that can be minimised
pub trait Objective {
    /// Value of the function at `params`
    fn value(&self, params: &[f64]) -> f64;
}

/// Controls for the simplex search
#[derive(Debug, Clone, PartialEq)]
pub struct MinimiserSettings {
    /// Iteration limit of a single simplex search
    pub max_iters: u64,
    /// Spread of the simplex values at which a search stops
    pub tolerance: f64,
    /// Searches restarted from the best point
    pub restarts: usize,
}

impl Default for MinimiserSettings {
    fn default() -> Self {
        Self {
            max_iters: 5000,
            tolerance: 1e-10,
            restarts: 3,
        }
    }
}

/// Best point found with its covariance
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub params: Vec<f64>,
    /// Square root of the covariance diagonal, zero when unavailable
    pub errors: Vec<f64>,
    pub covariance: Option<DMatrix<f64>>,
    pub cost: f64,
    pub iterations: u64,
    pub converged: bool,
}

/// The objective seen through the unit cube of the parameter limits
///
/// Every parameter is mapped onto [0, 1] so a single simplex step size suits
/// yields and widths alike. Values outside are clamped onto the limits.
struct UnitProblem<'a, O: Objective> {
    objective: &'a O,
    parameters: &'a [Parameter],
}

impl<O: Objective> UnitProblem<'_, O> {
    fn physical(&self, unit: &[f64]) -> Vec<f64> {
        self.parameters
            .iter()
            .zip(unit)
            .map(|(p, u)| p.from_unit(*u))
            .collect()
    }
}

impl<O: Objective> CostFunction for UnitProblem<'_, O> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, unit: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        Ok(self.objective.value(&self.physical(unit)))
    }
}

/// Minimise `objective` within the limits of `parameters`
///
/// A Nelder-Mead search runs in the unit cube of the limits and is restarted
/// from its best point with a shrinking simplex until two searches agree.
/// The covariance is the inverse of the numerical Hessian at the minimum.
///
/// ```rust
/// # use hfxs_fit::{minimise, MinimiserSettings, Objective, Parameter};
/// struct Bowl;
/// impl Objective for Bowl {
///     fn value(&self, p: &[f64]) -> f64 {
///         (p[0] - 1.0).powi(2) + 4.0 * (p[1] + 2.0).powi(2)
///     }
/// }
///
/// let parameters = [
///     Parameter::new("x", 0.0, -5.0, 5.0),
///     Parameter::new("y", 0.0, -5.0, 5.0),
/// ];
/// let minimum = minimise(&Bowl, &parameters, &MinimiserSettings::default()).unwrap();
///
/// assert!(minimum.converged);
/// assert!((minimum.params[0] - 1.0).abs() < 1e-3);
/// assert!((minimum.params[1] + 2.0).abs() < 1e-3);
/// // inverse Hessian of the bowl is diag(1/2, 1/8)
/// assert!((minimum.errors[0] - 0.5_f64.sqrt()).abs() < 1e-3);
/// ```
pub fn minimise<O: Objective>(
    objective: &O,
    parameters: &[Parameter],
    settings: &MinimiserSettings,
) -> Result<Minimum> {
    check_parameters(parameters)?;

    let mut best = parameters
        .iter()
        .map(|p| p.to_unit(p.init))
        .collect::<Vec<f64>>();
    let mut best_cost = f64::INFINITY;
    let mut iterations = 0;
    let mut converged = false;
    let mut step = 0.1;

    for run in 0..=settings.restarts {
        let problem = UnitProblem {
            objective,
            parameters,
        };
        let solver = NelderMead::new(simplex(&best, step))
            .with_sd_tolerance(settings.tolerance)
            .map_err(|e| Error::Minimiser(e.to_string()))?;

        let result = Executor::new(problem, solver)
            .configure(|state| state.max_iters(settings.max_iters))
            .run()
            .map_err(|e| Error::Minimiser(e.to_string()))?;

        let state = result.state();
        iterations += state.get_iter();
        let cost = state.get_best_cost();
        converged = matches!(
            state.get_termination_status(),
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        );
        if let Some(param) = state.get_best_param() {
            if cost <= best_cost {
                best = param.clone();
            }
        }

        trace!("Simplex search {run}: cost {cost:.8}, converged {converged}");
        let settled = (best_cost - cost).abs() < 10.0 * settings.tolerance.max(1e-12);
        best_cost = best_cost.min(cost);
        if converged && settled {
            break;
        }
        step *= 0.5;
    }

    let params = best
        .iter()
        .zip(parameters)
        .map(|(u, p)| p.from_unit(*u))
        .collect::<Vec<f64>>();

    let covariance = covariance(objective, &params, parameters);
    let errors = match &covariance {
        Some(c) => (0..params.len()).map(|i| c[(i, i)].sqrt()).collect(),
        None => {
            warn!("Hessian not positive definite, parameter errors set to zero");
            vec![0.0; params.len()]
        }
    };

    debug!("Minimum {best_cost:.6} after {iterations} iterations, converged {converged}");
    Ok(Minimum {
        params,
        errors,
        covariance,
        cost: best_cost,
        iterations,
        converged,
    })
}

/// Uncertainty of a derived quantity by linear propagation
///
/// The gradient of `f` is taken numerically, using the parameter errors to
/// set the step sizes.
pub fn propagate<F: Fn(&[f64]) -> f64>(f: F, minimum: &Minimum) -> f64 {
    let Some(covariance) = &minimum.covariance else {
        return 0.0;
    };

    let n = minimum.params.len();
    let mut gradient = vec![0.0; n];
    let mut p = minimum.params.clone();
    for i in 0..n {
        let h = (1e-3 * minimum.errors[i]).max(1e-9 * minimum.params[i].abs().max(1.0));
        p[i] = minimum.params[i] + h;
        let up = f(&p);
        p[i] = minimum.params[i] - h;
        let down = f(&p);
        p[i] = minimum.params[i];
        gradient[i] = (up - down) / (2.0 * h);
    }

    let mut variance = 0.0;
    for i in 0..n {
        for j in 0..n {
            variance += gradient[i] * covariance[(i, j)] * gradient[j];
        }
    }
    variance.max(0.0).sqrt()
}

fn check_parameters(parameters: &[Parameter]) -> Result<()> {
    for p in parameters {
        let reason = if !(p.lower.is_finite() && p.upper.is_finite()) {
            "limits must be finite"
        } else if p.upper <= p.lower {
            "upper limit must exceed the lower limit"
        } else if !(p.lower..=p.upper).contains(&p.init) {
            "initial value outside of the limits"
        } else {
            continue;
        };
        return Err(Error::InvalidParameter {
            name: p.name.clone(),
            reason,
        });
    }
    Ok(())
}

/// Starting simplex around `centre`, stepping towards the interior
fn simplex(centre: &[f64], step: f64) -> Vec<Vec<f64>> {
    let mut vertices = vec![centre.to_vec()];
    for i in 0..centre.len() {
        let mut vertex = centre.to_vec();
        vertex[i] += if centre[i] + step <= 1.0 { step } else { -step };
        vertices.push(vertex);
    }
    vertices
}

/// Inverse of the central-difference Hessian, if positive definite
fn covariance<O: Objective>(
    objective: &O,
    params: &[f64],
    parameters: &[Parameter],
) -> Option<DMatrix<f64>> {
    let n = params.len();
    let steps = parameters
        .iter()
        .map(|p| 1e-4 * p.width())
        .collect::<Vec<f64>>();

    let f = |shifts: &[(usize, f64)]| {
        let mut p = params.to_vec();
        for (i, s) in shifts {
            p[*i] += s;
        }
        objective.value(&p)
    };

    let f0 = objective.value(params);
    let mut hessian = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        let hi = steps[i];
        hessian[(i, i)] = (f(&[(i, hi)]) - 2.0 * f0 + f(&[(i, -hi)])) / (hi * hi);
        for j in 0..i {
            let hj = steps[j];
            let value = (f(&[(i, hi), (j, hj)]) - f(&[(i, hi), (j, -hj)])
                - f(&[(i, -hi), (j, hj)])
                + f(&[(i, -hi), (j, -hj)]))
                / (4.0 * hi * hj);
            hessian[(i, j)] = value;
            hessian[(j, i)] = value;
        }
    }

    let inverse = hessian.try_inverse()?;
    if (0..n).all(|i| inverse[(i, i)].is_finite() && inverse[(i, i)] > 0.0) {
        Some(inverse)
    } else {
        None
    }
}
