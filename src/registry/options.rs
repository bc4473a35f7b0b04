//! Per-constraint function options.

/// How a general constraint should be handled by the engine.
///
/// `Inherit` defers to the model-wide policy; the other two override it
/// for this constraint only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NonlinearHandling {
    /// Use the model's `FuncNonlinear` policy.
    #[default]
    Inherit,
    /// Treat as a true nonlinear function.
    Nonlinear,
    /// Replace by a piecewise-linear approximation.
    PiecewiseLinear,
}

impl NonlinearHandling {
    /// Resolves against the model-wide default. `true` means nonlinear.
    pub fn resolve(self, model_default_nonlinear: bool) -> bool {
        match self {
            NonlinearHandling::Inherit => model_default_nonlinear,
            NonlinearHandling::Nonlinear => true,
            NonlinearHandling::PiecewiseLinear => false,
        }
    }
}

/// Function-specific parameters and approximation controls of a
/// general constraint.
///
/// # Examples
///
/// ```
/// use u_optmodel::registry::{FunctionOptions, NonlinearHandling};
///
/// let opts = FunctionOptions::default()
///     .with_exponent(3.0)
///     .with_pieces(50)
///     .with_handling(NonlinearHandling::Nonlinear);
/// assert_eq!(opts.exponent, Some(3.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionOptions {
    /// Exponent `a` of `y = x^a` (POW).
    pub exponent: Option<f64>,
    /// Base of `y = base^x` (EXPA) or `y = log_base(x)` (LOGA).
    pub base: Option<f64>,
    /// Polynomial coefficients, highest degree first (POLY).
    pub coefficients: Vec<f64>,
    /// Number of pieces of the piecewise-linear approximation.
    pub pieces: Option<u32>,
    /// Length of each approximation piece along the input axis.
    /// Takes precedence over `pieces` when both are set.
    pub piece_length: Option<f64>,
    /// Maximum allowed approximation error. Used only when neither
    /// `piece_length` nor `pieces` is set.
    pub piece_error: Option<f64>,
    /// Whether approximation pieces under- (0) or over-estimate (1) the
    /// function; -1 lets the engine choose. Engines that interpolate
    /// through the breakpoints, such as the grid scan, ignore it.
    pub piece_ratio: Option<f64>,
    /// Nonlinear handling override.
    pub handling: NonlinearHandling,
}

impl FunctionOptions {
    pub fn with_exponent(mut self, exponent: f64) -> Self {
        self.exponent = Some(exponent);
        self
    }

    pub fn with_base(mut self, base: f64) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_coefficients(mut self, coefficients: Vec<f64>) -> Self {
        self.coefficients = coefficients;
        self
    }

    pub fn with_pieces(mut self, pieces: u32) -> Self {
        self.pieces = Some(pieces);
        self
    }

    pub fn with_piece_length(mut self, length: f64) -> Self {
        self.piece_length = Some(length);
        self
    }

    pub fn with_piece_error(mut self, error: f64) -> Self {
        self.piece_error = Some(error);
        self
    }

    pub fn with_piece_ratio(mut self, ratio: f64) -> Self {
        self.piece_ratio = Some(ratio);
        self
    }

    pub fn with_handling(mut self, handling: NonlinearHandling) -> Self {
        self.handling = handling;
        self
    }

    /// Checks the approximation controls, which apply to every relation.
    pub fn validate(&self) -> Result<(), String> {
        if self.pieces == Some(0) {
            return Err("pieces must be at least 1".into());
        }
        if let Some(len) = self.piece_length {
            if !(len.is_finite() && len > 0.0) {
                return Err(format!("piece_length must be positive, got {len}"));
            }
        }
        if let Some(err) = self.piece_error {
            if !(err.is_finite() && err > 0.0) {
                return Err(format!("piece_error must be positive, got {err}"));
            }
        }
        if let Some(ratio) = self.piece_ratio {
            if ratio != -1.0 && !(0.0..=1.0).contains(&ratio) {
                return Err(format!("piece_ratio must be -1 or in [0, 1], got {ratio}"));
            }
        }
        Ok(())
    }
}
