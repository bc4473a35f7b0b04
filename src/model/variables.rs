//! Variable handles and per-variable data.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Model`](super::Model).
///
/// Every handle issued by a model carries the model's id, which is how
/// references to variables of some other model are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelId(u64);

impl ModelId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// Handle to a variable owned by a model.
///
/// Handles are cheap to copy and order by `(model, index)`, so expressions
/// built from them iterate in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Var {
    pub(crate) model: ModelId,
    pub(crate) index: usize,
}

impl Var {
    /// Position of the variable in its model's variable list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The model that issued this handle.
    pub fn model_id(&self) -> ModelId {
        self.model
    }
}

/// Variable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarKind {
    /// Real-valued.
    #[default]
    Continuous,
    /// Integer-valued.
    Integer,
    /// Integer-valued in {0, 1}.
    Binary,
}

/// Name, bounds and kind of one variable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableData {
    /// Variable name (unique within a model).
    pub name: String,
    /// Lower bound. May be `f64::NEG_INFINITY`.
    pub lower: f64,
    /// Upper bound. May be `f64::INFINITY`.
    pub upper: f64,
    /// Variable type.
    pub kind: VarKind,
}

impl VariableData {
    /// Whether both bounds are finite.
    pub fn is_bounded(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }

    /// Whether `value` lies within the bounds (and is integral for
    /// integer kinds), up to `tolerance`.
    pub fn admits(&self, value: f64, tolerance: f64) -> bool {
        if value < self.lower - tolerance || value > self.upper + tolerance {
            return false;
        }
        match self.kind {
            VarKind::Continuous => true,
            VarKind::Integer | VarKind::Binary => (value - value.round()).abs() <= tolerance,
        }
    }

    /// Describes why the bounds are unusable, if they are.
    ///
    /// Ordering and NaN are checked for every kind; integer kinds must
    /// contain at least one integer and binaries must stay inside [0, 1].
    pub(crate) fn bounds_problem(&self) -> Option<&'static str> {
        if self.lower.is_nan() || self.upper.is_nan() {
            return Some("bound is NaN");
        }
        if self.lower > self.upper {
            return Some("lower bound exceeds upper bound");
        }
        match self.kind {
            VarKind::Continuous => None,
            VarKind::Integer => {
                if self.lower.ceil() > self.upper.floor() {
                    Some("no integer value between the bounds")
                } else {
                    None
                }
            }
            VarKind::Binary => {
                if self.lower < 0.0 || self.upper > 1.0 {
                    Some("binary bounds must lie within [0, 1]")
                } else if self.lower.ceil() > self.upper.floor() {
                    Some("no integer value between the bounds")
                } else {
                    None
                }
            }
        }
    }
}
