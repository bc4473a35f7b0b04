//! Linear expressions over model variables.

use super::variables::Var;
use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A linear expression `sum(coef_i * var_i) + constant`.
///
/// Terms are kept in handle order; adding a variable that is already
/// present merges the coefficients, and terms whose coefficients cancel
/// to zero are dropped.
///
/// # Examples
///
/// ```
/// use u_optmodel::model::{Model, VarKind};
///
/// let mut model = Model::new("expr");
/// let x = model.add_variable(-1.0, 4.0, VarKind::Continuous, "x").unwrap();
/// let y = model.add_variable(0.0, f64::INFINITY, VarKind::Continuous, "y").unwrap();
///
/// let e = 0.25 * y - x + 1.0;
/// assert_eq!(e.coefficient(y), 0.25);
/// assert_eq!(e.coefficient(x), -1.0);
/// assert_eq!(e.constant(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearExpr {
    terms: BTreeMap<Var, f64>,
    constant: f64,
}

impl LinearExpr {
    /// The empty expression (value 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn constant_term(value: f64) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    /// Builder form of [`add_term`](Self::add_term).
    pub fn with_term(mut self, var: Var, coefficient: f64) -> Self {
        self.add_term(var, coefficient);
        self
    }

    /// Adds `coefficient * var`, merging with an existing term.
    pub fn add_term(&mut self, var: Var, coefficient: f64) {
        let entry = self.terms.entry(var).or_insert(0.0);
        *entry += coefficient;
        if *entry == 0.0 {
            self.terms.remove(&var);
        }
    }

    /// Adds to the constant.
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// The constant part.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Coefficient of `var` (0 when absent).
    pub fn coefficient(&self, var: Var) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    /// Iterates `(var, coefficient)` in handle order.
    pub fn terms(&self) -> impl Iterator<Item = (Var, f64)> + '_ {
        self.terms.iter().map(|(&v, &c)| (v, c))
    }

    /// Number of variable terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the expression has no variable terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression, looking each variable up with `value_of`.
    pub fn evaluate<F: Fn(Var) -> f64>(&self, value_of: F) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, (&v, &c)| acc + c * value_of(v))
    }

    fn scaled(mut self, factor: f64) -> Self {
        if factor == 0.0 {
            return Self::default();
        }
        for c in self.terms.values_mut() {
            *c *= factor;
        }
        self.constant *= factor;
        self
    }
}

impl From<Var> for LinearExpr {
    fn from(var: Var) -> Self {
        LinearExpr::new().with_term(var, 1.0)
    }
}

impl From<f64> for LinearExpr {
    fn from(value: f64) -> Self {
        LinearExpr::constant_term(value)
    }
}

impl AddAssign<LinearExpr> for LinearExpr {
    fn add_assign(&mut self, rhs: LinearExpr) {
        for (v, c) in rhs.terms {
            self.add_term(v, c);
        }
        self.constant += rhs.constant;
    }
}

impl SubAssign<LinearExpr> for LinearExpr {
    fn sub_assign(&mut self, rhs: LinearExpr) {
        *self += -rhs;
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self.scaled(-1.0)
    }
}

impl Neg for Var {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        LinearExpr::new().with_term(self, -1.0)
    }
}

impl<T: Into<LinearExpr>> Add<T> for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: T) -> LinearExpr {
        self += rhs.into();
        self
    }
}

impl<T: Into<LinearExpr>> Sub<T> for LinearExpr {
    type Output = LinearExpr;

    fn sub(mut self, rhs: T) -> LinearExpr {
        self -= rhs.into();
        self
    }
}

impl<T: Into<LinearExpr>> Add<T> for Var {
    type Output = LinearExpr;

    fn add(self, rhs: T) -> LinearExpr {
        LinearExpr::from(self) + rhs
    }
}

impl<T: Into<LinearExpr>> Sub<T> for Var {
    type Output = LinearExpr;

    fn sub(self, rhs: T) -> LinearExpr {
        LinearExpr::from(self) - rhs
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(self, rhs: f64) -> LinearExpr {
        self.scaled(rhs)
    }
}

impl Mul<LinearExpr> for f64 {
    type Output = LinearExpr;

    fn mul(self, rhs: LinearExpr) -> LinearExpr {
        rhs.scaled(self)
    }
}

impl Mul<f64> for Var {
    type Output = LinearExpr;

    fn mul(self, rhs: f64) -> LinearExpr {
        LinearExpr::new().with_term(self, rhs)
    }
}

impl Mul<Var> for f64 {
    type Output = LinearExpr;

    fn mul(self, rhs: Var) -> LinearExpr {
        LinearExpr::new().with_term(rhs, self)
    }
}

impl Add<Var> for f64 {
    type Output = LinearExpr;

    fn add(self, rhs: Var) -> LinearExpr {
        LinearExpr::from(rhs) + self
    }
}

impl Add<LinearExpr> for f64 {
    type Output = LinearExpr;

    fn add(self, rhs: LinearExpr) -> LinearExpr {
        rhs + self
    }
}
