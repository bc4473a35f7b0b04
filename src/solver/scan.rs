//! Grid-scan reference gateway for tiny models.

use super::gateway::{FailureKind, SolveError, SolveFailure, SolverGateway};
use super::solution::{Solution, SolveStatus};
use crate::config::{
    Configuration, ParameterSchema, ParameterSpec, FUNC_PIECES, FUNC_PIECE_ERROR, TIME_LIMIT,
};
use crate::model::{FrozenModel, Relation, Var, VarKind, VariableData};
use crate::registry::{PieceCount, PiecewiseLinear};
use std::time::{Duration, Instant};

/// Grid points per free variable.
pub const SCAN_POINTS: &str = "ScanPoints";

const DEFAULT_SCAN_POINTS: usize = 201;
const DEFAULT_FUNC_PIECES: usize = 64;
const MAX_FREE_VARS: usize = 2;
const FEASIBILITY_TOLERANCE: f64 = 1e-6;
const TIME_CHECK_INTERVAL: usize = 256;

/// A gateway that solves small models by exhaustive grid search.
///
/// Variables are split into free ones, scanned on a regular grid, and
/// dependent ones, computed from general constraints (`y = f(x)` once `x`
/// is known) and from linear equalities with a single unknown. Every grid
/// point is checked against all bounds and constraints; the best feasible
/// point wins.
///
/// General constraints use the exact function when their effective
/// handling is nonlinear and a piecewise-linear interpolant over the input
/// variable's bounds otherwise. The piece count comes from the
/// constraint's options, else `FuncPieces`, else `FuncPieceError`, else 64
/// pieces. Interpolants pass through the function at every breakpoint, so
/// `FuncPieceRatio` and `piece_ratio` have no effect here.
///
/// Honors `TimeLimit`, `FuncPieces`, `FuncPieceError` and `ScanPoints`;
/// the remaining standard parameters are accepted and ignored.
///
/// # Limitations
///
/// - At most two free variables, each with finite bounds
/// - Grid resolution bounds the accuracy: "optimal" means best grid point
/// - Never reports unboundedness
#[derive(Debug, Clone)]
pub struct GridScanGateway {
    schema: ParameterSchema,
    max_concurrent: usize,
}

impl GridScanGateway {
    pub fn new() -> Self {
        let schema = ParameterSchema::standard().with(
            ParameterSpec::int(SCAN_POINTS, 2, 100_000, "grid points per free variable")
                .with_tuning_values([51, 101, 201, 401]),
        );
        Self {
            schema,
            max_concurrent: 1,
        }
    }

    /// Allows `n` simultaneous solves (at least 1).
    pub fn with_max_concurrent_solves(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }
}

impl Default for GridScanGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// How a dependent variable gets its value.
#[derive(Debug, Clone, Copy)]
enum Step {
    /// Output of general constraint `gc`.
    General { gc: usize },
    /// Sole unknown of equality `constraint`.
    Equality { constraint: usize, var: Var },
}

/// Function used for one general constraint.
#[derive(Debug, Clone)]
enum Function {
    Exact,
    Piecewise(PiecewiseLinear),
}

#[derive(Debug)]
struct Plan {
    free: Vec<usize>,
    steps: Vec<Step>,
    functions: Vec<Function>,
}

impl Plan {
    fn build(model: &FrozenModel, default_pieces: PieceCount) -> Result<Self, SolveFailure> {
        let n = model.num_vars();
        let general = model.general_constraints();
        let mut is_output = vec![false; n];
        for gc in general {
            is_output[gc.output.index()] = true;
        }

        let mut known = vec![false; n];
        let mut free = Vec::new();
        let mut steps = Vec::new();
        loop {
            let mut progress = true;
            while progress {
                progress = false;
                for (i, gc) in general.iter().enumerate() {
                    let (x, y) = (gc.input.index(), gc.output.index());
                    if known[x] && !known[y] {
                        known[y] = true;
                        steps.push(Step::General { gc: i });
                        progress = true;
                    }
                }
                for (i, c) in model.constraints().iter().enumerate() {
                    if c.relation != Relation::Equal {
                        continue;
                    }
                    let single = {
                        let mut unknown = c.expr.terms().filter(|(v, _)| !known[v.index()]);
                        match (unknown.next(), unknown.next()) {
                            (Some((v, _)), None) => Some(v),
                            _ => None,
                        }
                    };
                    if let Some(var) = single {
                        known[var.index()] = true;
                        steps.push(Step::Equality { constraint: i, var });
                        progress = true;
                    }
                }
            }
            // inputs before outputs, then creation order
            let next = (0..n).filter(|&i| !known[i]).min_by_key(|&i| is_output[i]);
            match next {
                Some(i) => {
                    known[i] = true;
                    free.push(i);
                }
                None => break,
            }
        }

        if free.len() > MAX_FREE_VARS {
            return Err(SolveFailure::engine(format!(
                "model has {} free variables, grid scan supports at most {MAX_FREE_VARS}",
                free.len()
            )));
        }
        let variables = model.variables();
        if let Some(v) = free.iter().map(|&i| &variables[i]).find(|v| !v.is_bounded()) {
            return Err(SolveFailure::engine(format!(
                "free variable '{}' needs finite bounds, has [{}, {}]",
                v.name, v.lower, v.upper
            )));
        }

        let mut functions = Vec::with_capacity(general.len());
        for gc in general {
            if model.is_nonlinear(gc) {
                functions.push(Function::Exact);
                continue;
            }
            let input = &variables[gc.input.index()];
            let registry = model.registry();
            let pieces =
                PiecewiseLinear::piece_count(&gc.options, input.upper - input.lower, default_pieces);
            let pwl = PiecewiseLinear::approximate(
                |x| {
                    registry
                        .evaluate(&gc.relation, x, &gc.options)
                        .unwrap_or(f64::NAN)
                },
                input.lower,
                input.upper,
                pieces,
            )
            .ok_or_else(|| {
                SolveFailure::engine(format!(
                    "cannot approximate {} constraint '{}' over [{}, {}] of '{}'",
                    gc.relation, gc.name, input.lower, input.upper, input.name
                ))
            })?;
            functions.push(Function::Piecewise(pwl));
        }

        Ok(Self {
            free,
            steps,
            functions,
        })
    }

    fn apply(&self, model: &FrozenModel, gc: usize, x: f64) -> f64 {
        match &self.functions[gc] {
            Function::Piecewise(pwl) => pwl.evaluate(x),
            Function::Exact => {
                let gc = &model.general_constraints()[gc];
                model
                    .registry()
                    .evaluate(&gc.relation, x, &gc.options)
                    .unwrap_or(f64::NAN)
            }
        }
    }

    /// Fills `values` from the free values in `point` and returns the
    /// objective value if the completed point is feasible.
    fn evaluate(&self, model: &FrozenModel, point: &[f64], values: &mut [f64]) -> Option<f64> {
        for (&i, &value) in self.free.iter().zip(point) {
            values[i] = value;
        }
        let general = model.general_constraints();
        for step in &self.steps {
            match *step {
                Step::General { gc } => {
                    let c = &general[gc];
                    values[c.output.index()] = self.apply(model, gc, values[c.input.index()]);
                }
                Step::Equality { constraint, var } => {
                    let c = &model.constraints()[constraint];
                    let rest = c.expr.evaluate(|u| {
                        if u == var {
                            0.0
                        } else {
                            values[u.index()]
                        }
                    });
                    values[var.index()] = (c.rhs - rest) / c.expr.coefficient(var);
                }
            }
        }

        let tol = FEASIBILITY_TOLERANCE;
        let values = &*values;
        let admitted = model
            .variables()
            .iter()
            .zip(values)
            .all(|(v, &value)| value.is_finite() && v.admits(value, tol));
        if !admitted {
            return None;
        }
        if model
            .constraints()
            .iter()
            .any(|c| c.violation(|v| values[v.index()]) > tol)
        {
            return None;
        }
        for (i, gc) in general.iter().enumerate() {
            let expected = self.apply(model, i, values[gc.input.index()]);
            if !((values[gc.output.index()] - expected).abs() <= tol) {
                return None;
            }
        }
        Some(model.objective().expr.evaluate(|v| values[v.index()]))
    }
}

fn axis(v: &VariableData, points: usize) -> Vec<f64> {
    let spaced = |lower: f64, upper: f64| -> Vec<f64> {
        if lower == upper {
            return vec![lower];
        }
        let last = points - 1;
        (0..points)
            .map(|k| {
                if k == last {
                    upper
                } else {
                    lower + (upper - lower) * k as f64 / last as f64
                }
            })
            .collect()
    };
    match v.kind {
        VarKind::Continuous => spaced(v.lower, v.upper),
        VarKind::Integer | VarKind::Binary => {
            let (lo, hi) = (v.lower.ceil(), v.upper.floor());
            if hi - lo + 1.0 <= points as f64 {
                let count = (hi - lo) as usize + 1;
                (0..count).map(|k| lo + k as f64).collect()
            } else {
                let mut grid: Vec<f64> = spaced(lo, hi).into_iter().map(f64::round).collect();
                grid.dedup();
                grid
            }
        }
    }
}

impl SolverGateway for GridScanGateway {
    fn name(&self) -> &str {
        "grid-scan"
    }

    fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    fn max_concurrent_solves(&self) -> usize {
        self.max_concurrent
    }

    fn solve(
        &self,
        model: &FrozenModel,
        configuration: &Configuration,
    ) -> Result<Solution, SolveError> {
        let start = Instant::now();
        let points = configuration
            .get_i64(SCAN_POINTS)
            .map_or(DEFAULT_SCAN_POINTS, |p| p.max(2) as usize);
        let time_limit = configuration
            .get_f64(TIME_LIMIT)
            .and_then(|s| Duration::try_from_secs_f64(s).ok());
        let default_pieces = match (
            configuration.get_i64(FUNC_PIECES),
            configuration.get_f64(FUNC_PIECE_ERROR),
        ) {
            (Some(p), _) if p > 0 => PieceCount::Fixed(p as usize),
            (_, Some(e)) if e > 0.0 => PieceCount::MaxError(e),
            _ => PieceCount::Fixed(DEFAULT_FUNC_PIECES),
        };

        let plan = Plan::build(model, default_pieces)?;
        let variables = model.variables();
        let axes: Vec<Vec<f64>> = plan
            .free
            .iter()
            .map(|&i| axis(&variables[i], points))
            .collect();
        let total: usize = axes.iter().map(Vec::len).product();
        tracing::debug!(
            component = "solver",
            operation = "grid_scan",
            model = %model.id(),
            free = plan.free.len(),
            dependent = plan.steps.len(),
            points = total,
            "Planned grid scan"
        );

        let sense = model.objective().sense;
        let mut values = vec![f64::NAN; model.num_vars()];
        let mut point = vec![0.0; axes.len()];
        let mut best: Option<(f64, f64, Vec<f64>)> = None;
        let mut timed_out = false;
        for k in 0..total {
            if k % TIME_CHECK_INTERVAL == 0
                && time_limit.is_some_and(|limit| start.elapsed() >= limit)
            {
                timed_out = true;
                break;
            }
            let mut rest = k;
            for (slot, grid) in axes.iter().enumerate().rev() {
                point[slot] = grid[rest % grid.len()];
                rest /= grid.len();
            }
            if let Some(objective) = plan.evaluate(model, &point, &mut values) {
                let score = sense.normalize(objective);
                if best.as_ref().map_or(true, |(b, _, _)| score < *b) {
                    best = Some((score, objective, values.clone()));
                }
            }
        }
        let runtime = start.elapsed();

        match best {
            Some((_, objective, values)) => {
                let status = if timed_out {
                    SolveStatus::TimedOut
                } else {
                    SolveStatus::Optimal
                };
                Ok(Solution::new(status, model.id(), values, Some(objective), runtime))
            }
            None if timed_out => Err(SolveFailure::new(
                FailureKind::TimedOut,
                format!("time limit reached after {runtime:?} without a feasible point"),
            )
            .into()),
            None => Err(SolveFailure::infeasible(format!(
                "none of the {total} grid points satisfies the model"
            ))
            .into()),
        }
    }
}
