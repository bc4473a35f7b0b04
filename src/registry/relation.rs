//! Relation tags and value domains.

use std::borrow::Cow;
use std::fmt;

/// Name of a general-constraint relation, e.g. `SIN` or `EXP`.
///
/// Tags are case-insensitive: they are stored upper-case, so
/// `RelationTag::new("exp") == RelationTag::EXP`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelationTag(Cow<'static, str>);

impl RelationTag {
    /// `y = sin(x)`
    pub const SIN: RelationTag = RelationTag(Cow::Borrowed("SIN"));
    /// `y = cos(x)`
    pub const COS: RelationTag = RelationTag(Cow::Borrowed("COS"));
    /// `y = tan(x)`
    pub const TAN: RelationTag = RelationTag(Cow::Borrowed("TAN"));
    /// `y = e^x`
    pub const EXP: RelationTag = RelationTag(Cow::Borrowed("EXP"));
    /// `y = base^x`
    pub const EXPA: RelationTag = RelationTag(Cow::Borrowed("EXPA"));
    /// `y = ln(x)`
    pub const LOG: RelationTag = RelationTag(Cow::Borrowed("LOG"));
    /// `y = log_base(x)`
    pub const LOGA: RelationTag = RelationTag(Cow::Borrowed("LOGA"));
    /// `y = x^exponent`
    pub const POW: RelationTag = RelationTag(Cow::Borrowed("POW"));
    /// `y = p(x)`, coefficients highest degree first
    pub const POLY: RelationTag = RelationTag(Cow::Borrowed("POLY"));
    /// `y = 1 / (1 + e^-x)`
    pub const LOGISTIC: RelationTag = RelationTag(Cow::Borrowed("LOGISTIC"));
    /// `y = |x|`
    pub const ABS: RelationTag = RelationTag(Cow::Borrowed("ABS"));

    /// Creates a tag from any casing of its name.
    pub fn new(name: impl AsRef<str>) -> Self {
        RelationTag(Cow::Owned(name.as_ref().trim().to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RelationTag {
    fn from(name: &str) -> Self {
        RelationTag::new(name)
    }
}

impl From<&RelationTag> for RelationTag {
    fn from(tag: &RelationTag) -> Self {
        tag.clone()
    }
}

impl fmt::Display for RelationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A real interval with optionally open ends.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Domain {
    pub lower: f64,
    pub upper: f64,
    pub lower_open: bool,
    pub upper_open: bool,
}

impl Domain {
    /// (-inf, inf)
    pub const REAL: Domain = Domain::open(f64::NEG_INFINITY, f64::INFINITY);
    /// [0, inf)
    pub const NON_NEGATIVE: Domain = Domain {
        lower: 0.0,
        upper: f64::INFINITY,
        lower_open: false,
        upper_open: true,
    };
    /// (0, inf)
    pub const POSITIVE: Domain = Domain::open(0.0, f64::INFINITY);
    /// [-1, 1]
    pub const UNIT_RANGE: Domain = Domain::closed(-1.0, 1.0);
    /// (0, 1)
    pub const UNIT_OPEN: Domain = Domain::open(0.0, 1.0);

    pub const fn closed(lower: f64, upper: f64) -> Self {
        Domain {
            lower,
            upper,
            lower_open: false,
            upper_open: false,
        }
    }

    pub const fn open(lower: f64, upper: f64) -> Self {
        Domain {
            lower,
            upper,
            lower_open: true,
            upper_open: true,
        }
    }

    /// Whether `value` lies in the domain.
    pub fn contains(&self, value: f64) -> bool {
        let above = if self.lower_open {
            value > self.lower
        } else {
            value >= self.lower
        };
        let below = if self.upper_open {
            value < self.upper
        } else {
            value <= self.upper
        };
        above && below
    }

    /// Whether the closed range `[lower, upper]` shares a point with the
    /// domain. Assumes `lower <= upper`.
    pub fn intersects(&self, lower: f64, upper: f64) -> bool {
        let reaches_up = if self.lower_open {
            upper > self.lower
        } else {
            upper >= self.lower
        };
        let reaches_down = if self.upper_open {
            lower < self.upper
        } else {
            lower <= self.upper
        };
        reaches_up && reaches_down
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.lower_open { '(' } else { '[' };
        let close = if self.upper_open { ')' } else { ']' };
        write!(f, "{open}{}, {}{close}", self.lower, self.upper)
    }
}

/// Input and output domains of a relation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domains {
    pub input: Domain,
    pub output: Domain,
}
