//! General-constraint relation registry.
//!
//! Maps each [`RelationTag`] to a closed-form evaluator, its input/output
//! domains and the options it requires. The model consults the registry
//! when a general constraint is added; tests and callers use it to check
//! that a returned [`Solution`] actually satisfies `y = f(x)`.
//!
//! The registry plays no part in solving.
//!
//! # Built-in relations
//!
//! SIN, COS, TAN, EXP, EXPA, LOG, LOGA, POW, POLY, LOGISTIC, ABS.
//! Further relations are added with [`ConstraintRegistry::register`].

mod options;
mod piecewise;
mod relation;

pub use options::{FunctionOptions, NonlinearHandling};
pub use piecewise::{PieceCount, PiecewiseLinear, MAX_PIECES};
pub use relation::{Domain, Domains, RelationTag};

use crate::model::ModelData;
use crate::solver::Solution;
use std::collections::BTreeMap;

/// Default tolerance of [`ConstraintRegistry::check_solution`].
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Options a relation cannot do without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionRequirement {
    None,
    /// A finite `exponent`.
    Exponent,
    /// A positive `base`, different from 1.
    Base,
    /// A non-empty list of finite `coefficients`.
    Coefficients,
}

impl OptionRequirement {
    /// Checks `options` against the requirement.
    pub fn check(self, options: &FunctionOptions) -> Result<(), String> {
        match self {
            OptionRequirement::None => Ok(()),
            OptionRequirement::Exponent => match options.exponent {
                Some(a) if a.is_finite() => Ok(()),
                Some(a) => Err(format!("exponent must be finite, got {a}")),
                None => Err("missing exponent".into()),
            },
            OptionRequirement::Base => match options.base {
                Some(b) if b.is_finite() && b > 0.0 && b != 1.0 => Ok(()),
                Some(b) => Err(format!("base must be positive and not 1, got {b}")),
                None => Err("missing base".into()),
            },
            OptionRequirement::Coefficients => {
                if options.coefficients.is_empty() {
                    Err("missing coefficients".into())
                } else if let Some(c) = options.coefficients.iter().find(|c| !c.is_finite()) {
                    Err(format!("coefficients must be finite, got {c}"))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Registry entry for one relation.
#[derive(Debug, Clone)]
pub struct RelationSpec {
    /// Human-readable form, e.g. `y = exp(x), y > 0`.
    pub description: String,
    /// Closed-form `f(x)`.
    pub evaluator: fn(f64, &FunctionOptions) -> f64,
    /// Domains of `x` and `y`, which may depend on the options.
    pub domains: fn(&FunctionOptions) -> Domains,
    /// Options the relation needs.
    pub requirement: OptionRequirement,
}

impl RelationSpec {
    pub fn new(
        description: impl Into<String>,
        evaluator: fn(f64, &FunctionOptions) -> f64,
        domains: fn(&FunctionOptions) -> Domains,
        requirement: OptionRequirement,
    ) -> Self {
        Self {
            description: description.into(),
            evaluator,
            domains,
            requirement,
        }
    }
}

/// A general constraint whose solution values do not satisfy `y = f(x)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyViolation {
    /// Constraint name.
    pub constraint: String,
    pub relation: RelationTag,
    /// `f(value(x))`, NaN when unavailable.
    pub expected: f64,
    /// `value(y)`, NaN when missing.
    pub actual: f64,
    /// `|actual - expected|`, infinite when a value is missing.
    pub deviation: f64,
}

/// Table of supported general-constraint relations.
///
/// # Examples
///
/// ```
/// use u_optmodel::registry::{ConstraintRegistry, FunctionOptions, RelationTag};
///
/// let registry = ConstraintRegistry::builtin();
/// let y = registry.evaluate(&RelationTag::EXP, 0.0, &FunctionOptions::default());
/// assert_eq!(y, Some(1.0));
/// assert!(!registry.contains(&RelationTag::new("SINH")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConstraintRegistry {
    entries: BTreeMap<RelationTag, RelationSpec>,
}

impl ConstraintRegistry {
    /// A registry without any relation.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with all built-in relations.
    pub fn builtin() -> Self {
        let mut r = Self::empty();
        r.register(
            RelationTag::SIN,
            RelationSpec::new("y = sin(x)", |x, _| x.sin(), unit_range, OptionRequirement::None),
        );
        r.register(
            RelationTag::COS,
            RelationSpec::new("y = cos(x)", |x, _| x.cos(), unit_range, OptionRequirement::None),
        );
        r.register(
            RelationTag::TAN,
            RelationSpec::new("y = tan(x)", |x, _| x.tan(), real, OptionRequirement::None),
        );
        r.register(
            RelationTag::EXP,
            RelationSpec::new(
                "y = exp(x), y > 0",
                |x, _| x.exp(),
                positive_output,
                OptionRequirement::None,
            ),
        );
        r.register(
            RelationTag::EXPA,
            RelationSpec::new(
                "y = base^x, base > 0, y > 0",
                |x, o| o.base.unwrap_or(f64::NAN).powf(x),
                positive_output,
                OptionRequirement::Base,
            ),
        );
        r.register(
            RelationTag::LOG,
            RelationSpec::new("y = ln(x), x > 0", |x, _| x.ln(), positive_input, OptionRequirement::None),
        );
        r.register(
            RelationTag::LOGA,
            RelationSpec::new(
                "y = log_base(x), x > 0",
                |x, o| x.ln() / o.base.unwrap_or(f64::NAN).ln(),
                positive_input,
                OptionRequirement::Base,
            ),
        );
        r.register(
            RelationTag::POW,
            RelationSpec::new(
                "y = x^a, x >= 0 unless a is an integer",
                |x, o| x.powf(o.exponent.unwrap_or(f64::NAN)),
                pow_domains,
                OptionRequirement::Exponent,
            ),
        );
        r.register(
            RelationTag::POLY,
            RelationSpec::new(
                "y = p(x), coefficients highest degree first",
                |x, o| o.coefficients.iter().fold(0.0, |acc, &c| acc * x + c),
                real,
                OptionRequirement::Coefficients,
            ),
        );
        r.register(
            RelationTag::LOGISTIC,
            RelationSpec::new(
                "y = 1 / (1 + exp(-x)), 0 < y < 1",
                |x, _| 1.0 / (1.0 + (-x).exp()),
                |_| Domains {
                    input: Domain::REAL,
                    output: Domain::UNIT_OPEN,
                },
                OptionRequirement::None,
            ),
        );
        r.register(
            RelationTag::ABS,
            RelationSpec::new(
                "y = |x|, y >= 0",
                |x, _| x.abs(),
                |_| Domains {
                    input: Domain::REAL,
                    output: Domain::NON_NEGATIVE,
                },
                OptionRequirement::None,
            ),
        );
        r
    }

    /// Adds or replaces a relation, returning the previous entry.
    pub fn register(&mut self, tag: RelationTag, spec: RelationSpec) -> Option<RelationSpec> {
        self.entries.insert(tag, spec)
    }

    pub fn get(&self, tag: &RelationTag) -> Option<&RelationSpec> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &RelationTag) -> bool {
        self.entries.contains_key(tag)
    }

    /// Registered tags in name order.
    pub fn tags(&self) -> impl Iterator<Item = &RelationTag> {
        self.entries.keys()
    }

    /// `f(x)` for the relation, or `None` if the tag is unknown.
    pub fn evaluate(&self, tag: &RelationTag, x: f64, options: &FunctionOptions) -> Option<f64> {
        self.entries.get(tag).map(|spec| (spec.evaluator)(x, options))
    }

    /// Checks `|value(output) - f(value(input))| <= tolerance` for every
    /// general constraint of `model`, returning the ones that fail.
    ///
    /// Constraints whose values are missing from `solution`, or whose
    /// relation is not registered here, are reported as violations.
    pub fn check_solution(
        &self,
        model: &ModelData,
        solution: &Solution,
        tolerance: f64,
    ) -> Vec<ConsistencyViolation> {
        let mut violations = Vec::new();
        for gc in model.general_constraints() {
            let input = solution.value(gc.input);
            let actual = solution.value(gc.output).unwrap_or(f64::NAN);
            let expected = match input {
                Some(x) => self
                    .evaluate(&gc.relation, x, &gc.options)
                    .unwrap_or(f64::NAN),
                None => f64::NAN,
            };
            let deviation = if expected.is_nan() || actual.is_nan() {
                f64::INFINITY
            } else {
                (actual - expected).abs()
            };
            if deviation > tolerance {
                violations.push(ConsistencyViolation {
                    constraint: gc.name.clone(),
                    relation: gc.relation.clone(),
                    expected,
                    actual,
                    deviation,
                });
            }
        }
        violations
    }
}

fn real(_: &FunctionOptions) -> Domains {
    Domains {
        input: Domain::REAL,
        output: Domain::REAL,
    }
}

fn unit_range(_: &FunctionOptions) -> Domains {
    Domains {
        input: Domain::REAL,
        output: Domain::UNIT_RANGE,
    }
}

fn positive_output(_: &FunctionOptions) -> Domains {
    Domains {
        input: Domain::REAL,
        output: Domain::POSITIVE,
    }
}

fn positive_input(_: &FunctionOptions) -> Domains {
    Domains {
        input: Domain::POSITIVE,
        output: Domain::REAL,
    }
}

fn pow_domains(options: &FunctionOptions) -> Domains {
    let a = options.exponent.unwrap_or(1.0);
    if a.fract() != 0.0 {
        let side = if a < 0.0 {
            Domain::POSITIVE
        } else {
            Domain::NON_NEGATIVE
        };
        return Domains {
            input: side,
            output: side,
        };
    }
    let odd = (a as i64) % 2 != 0;
    let output = if odd {
        Domain::REAL
    } else if a < 0.0 {
        Domain::POSITIVE
    } else {
        Domain::NON_NEGATIVE
    };
    Domains {
        input: Domain::REAL,
        output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, VarKind};
    use crate::solver::{Solution, SolveStatus};
    use std::time::Duration;

    #[test]
    fn test_builtin_tags() {
        let r = ConstraintRegistry::builtin();
        let tags: Vec<&str> = r.tags().map(|t| t.as_str()).collect();
        for expected in [
            "ABS", "COS", "EXP", "EXPA", "LOG", "LOGA", "LOGISTIC", "POLY", "POW", "SIN", "TAN",
        ] {
            assert!(tags.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_evaluators() {
        let r = ConstraintRegistry::builtin();
        let none = FunctionOptions::default();
        let eval = |tag: &RelationTag, x: f64, o: &FunctionOptions| r.evaluate(tag, x, o).unwrap();

        assert!((eval(&RelationTag::SIN, 0.5, &none) - 0.5f64.sin()).abs() < 1e-15);
        assert!((eval(&RelationTag::COS, 0.5, &none) - 0.5f64.cos()).abs() < 1e-15);
        assert!((eval(&RelationTag::LOG, std::f64::consts::E, &none) - 1.0).abs() < 1e-15);
        assert!((eval(&RelationTag::LOGISTIC, 0.0, &none) - 0.5).abs() < 1e-15);
        assert_eq!(eval(&RelationTag::ABS, -3.0, &none), 3.0);

        let base2 = FunctionOptions::default().with_base(2.0);
        assert!((eval(&RelationTag::EXPA, 3.0, &base2) - 8.0).abs() < 1e-12);
        assert!((eval(&RelationTag::LOGA, 8.0, &base2) - 3.0).abs() < 1e-12);

        let cube = FunctionOptions::default().with_exponent(3.0);
        assert!((eval(&RelationTag::POW, -2.0, &cube) + 8.0).abs() < 1e-12);

        // 2x^2 - 3x + 1
        let poly = FunctionOptions::default().with_coefficients(vec![2.0, -3.0, 1.0]);
        assert!((eval(&RelationTag::POLY, 2.0, &poly) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_requirements() {
        assert!(OptionRequirement::Exponent
            .check(&FunctionOptions::default())
            .is_err());
        assert!(OptionRequirement::Base
            .check(&FunctionOptions::default().with_base(1.0))
            .is_err());
        assert!(OptionRequirement::Base
            .check(&FunctionOptions::default().with_base(-2.0))
            .is_err());
        assert!(OptionRequirement::Base
            .check(&FunctionOptions::default().with_base(10.0))
            .is_ok());
        assert!(OptionRequirement::Coefficients
            .check(&FunctionOptions::default())
            .is_err());
    }

    #[test]
    fn test_pow_domains() {
        let half = pow_domains(&FunctionOptions::default().with_exponent(0.5));
        assert_eq!(half.input, Domain::NON_NEGATIVE);
        let square = pow_domains(&FunctionOptions::default().with_exponent(2.0));
        assert_eq!(square.input, Domain::REAL);
        assert_eq!(square.output, Domain::NON_NEGATIVE);
        let cube = pow_domains(&FunctionOptions::default().with_exponent(3.0));
        assert_eq!(cube.output, Domain::REAL);
    }

    #[test]
    fn test_register_custom_relation() {
        let mut r = ConstraintRegistry::builtin();
        let tag = RelationTag::new("sinh");
        assert!(!r.contains(&tag));
        let previous = r.register(
            tag.clone(),
            RelationSpec::new("y = sinh(x)", |x, _| x.sinh(), real, OptionRequirement::None),
        );
        assert!(previous.is_none());
        assert_eq!(r.evaluate(&tag, 0.0, &FunctionOptions::default()), Some(0.0));
    }

    fn exp_model() -> (Model, crate::model::Var, crate::model::Var) {
        let mut m = Model::new("exp");
        let x = m.add_variable(-1.0, 4.0, VarKind::Continuous, "x").unwrap();
        let y = m
            .add_variable(0.0, f64::INFINITY, VarKind::Continuous, "y")
            .unwrap();
        m.add_gen_constr_exp(x, y, "gexp").unwrap();
        (m, x, y)
    }

    #[test]
    fn test_check_solution_consistent() {
        let (m, _, _) = exp_model();
        let frozen = m.finalize().unwrap();
        let solution = Solution::new(
            SolveStatus::Optimal,
            frozen.id(),
            vec![1.0, 1.0f64.exp()],
            Some(0.0),
            Duration::ZERO,
        );
        let r = ConstraintRegistry::builtin();
        assert!(r.check_solution(&frozen, &solution, DEFAULT_TOLERANCE).is_empty());
    }

    #[test]
    fn test_check_solution_reports_deviation() {
        let (m, _, _) = exp_model();
        let frozen = m.finalize().unwrap();
        let solution = Solution::new(
            SolveStatus::Optimal,
            frozen.id(),
            vec![1.0, 2.5],
            Some(0.0),
            Duration::ZERO,
        );
        let r = ConstraintRegistry::builtin();
        let violations = r.check_solution(&frozen, &solution, DEFAULT_TOLERANCE);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].constraint, "gexp");
        assert!((violations[0].deviation - (1.0f64.exp() - 2.5)).abs() < 1e-12);
    }

    #[test]
    fn test_check_solution_missing_values() {
        let (m, _, _) = exp_model();
        let frozen = m.finalize().unwrap();
        let empty = Solution::empty(SolveStatus::Error, frozen.id());
        let r = ConstraintRegistry::builtin();
        let violations = r.check_solution(&frozen, &empty, DEFAULT_TOLERANCE);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].deviation.is_infinite());
    }
}
