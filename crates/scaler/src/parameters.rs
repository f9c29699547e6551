use std::borrow::Cow;

use common::{OutputBounds, Result};
use statrs::function::erf::erf;

use crate::format::format_value;
use crate::token::Token;
use crate::Scaler;

/// Fitted linear map `y = m*x + b` for one column, with its output bounds.
///
/// Immutable once derived. `clamp` is never persisted; it is chosen when
/// settings are replayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingParameters {
    m: f64,
    b: f64,
    bounds: OutputBounds,
    clamp: bool,
}

impl ScalingParameters {
    pub fn new(m: f64, b: f64, bounds: OutputBounds) -> Self {
        Self {
            m,
            b,
            bounds,
            clamp: false,
        }
    }

    /// Parameters for a column with no usable spread: every number maps to
    /// the midpoint of `bounds`.
    pub fn degenerate(bounds: OutputBounds) -> Self {
        Self::new(0.0, bounds.midpoint(), bounds)
    }

    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn m(&self) -> f64 {
        self.m
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn bounds(&self) -> OutputBounds {
        self.bounds
    }

    pub fn clamp_enabled(&self) -> bool {
        self.clamp
    }

    pub fn is_degenerate(&self) -> bool {
        self.m == 0.0
    }

    /// Scale a classified token.
    pub fn scale_token(&self, token: Token) -> f64 {
        let y = match token {
            Token::Missing => self.bounds.midpoint(),
            Token::SignedProbability(z) => {
                self.bounds.lower + self.bounds.width() * standard_normal_cdf(z)
            }
            // 0 * inf is NaN; a flat column maps every number to b.
            Token::Number(_) if self.is_degenerate() => self.b,
            Token::Number(x) => self.m * x + self.b,
        };
        if self.clamp {
            self.bounds.clamp(y)
        } else {
            y
        }
    }

    /// Scale a raw token, failing on anything outside the token grammar.
    pub fn scale(&self, raw: &str) -> Result<f64> {
        Ok(self.scale_token(Token::parse(raw)?))
    }
}

impl Scaler for ScalingParameters {
    fn adjust<'a>(&self, raw: &'a str) -> Result<Cow<'a, str>> {
        Ok(Cow::Owned(format_value(self.scale(raw)?)))
    }
}

/// Φ(z) = 0.5 + 0.5·erf(z/√2).
pub fn standard_normal_cdf(z: f64) -> f64 {
    0.5 + 0.5 * erf(z / std::f64::consts::SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_map() {
        let params = ScalingParameters::new(0.5, -0.5, OutputBounds::unit());
        assert_relative_eq!(params.scale("1").unwrap(), 0.0);
        assert_relative_eq!(params.scale("2").unwrap(), 0.5);
        assert_relative_eq!(params.scale(" 3 ").unwrap(), 1.0);
        // Out-of-range values are not clipped unless clamping is on.
        assert_relative_eq!(params.scale("5").unwrap(), 2.0);
    }

    #[test]
    fn test_clamp_only_when_enabled() {
        let params = ScalingParameters::new(0.5, -0.5, OutputBounds::unit()).with_clamp(true);
        assert!(params.clamp_enabled());
        assert_relative_eq!(params.scale("5").unwrap(), 1.0);
        assert_relative_eq!(params.scale("-7").unwrap(), 0.0);
        assert_relative_eq!(params.scale("2").unwrap(), 0.5);
    }

    #[test]
    fn test_missing_maps_to_midpoint() {
        let unit = ScalingParameters::new(0.5, -0.5, OutputBounds::unit());
        assert_relative_eq!(unit.scale("").unwrap(), 0.5);
        assert_relative_eq!(unit.scale("None").unwrap(), 0.5);

        let symmetric = ScalingParameters::new(1.0, 0.0, OutputBounds::symmetric());
        assert_relative_eq!(symmetric.scale("None").unwrap(), 0.0);
    }

    #[test]
    fn test_degenerate() {
        let params = ScalingParameters::degenerate(OutputBounds::unit());
        assert!(params.is_degenerate());
        assert_eq!(params.m(), 0.0);
        assert_eq!(params.b(), 0.5);
        assert_relative_eq!(params.scale("5").unwrap(), 0.5);
        assert_relative_eq!(params.scale("-1000").unwrap(), 0.5);
    }

    #[test]
    fn test_degenerate_with_infinite_value() {
        let params = ScalingParameters::degenerate(OutputBounds::symmetric());
        assert_eq!(params.scale("inf").unwrap(), 0.0);
        assert_eq!(params.scale("-inf").unwrap(), 0.0);
        assert_eq!(params.adjust("inf").unwrap(), "0");
    }

    #[test]
    fn test_signed_probability_decoding() {
        let unit = ScalingParameters::new(2.0, 3.0, OutputBounds::unit());
        assert_relative_eq!(unit.scale("p0").unwrap(), 0.5, epsilon = 1e-12);

        let symmetric = ScalingParameters::new(2.0, 3.0, OutputBounds::symmetric());
        assert_relative_eq!(symmetric.scale("p0").unwrap(), 0.0, epsilon = 1e-12);

        let lo = unit.scale("n1").unwrap();
        let hi = unit.scale("p1").unwrap();
        assert_relative_eq!(lo + hi, 1.0, epsilon = 1e-12);
        assert_relative_eq!(hi, 0.841_344_746_068_543, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_token_is_error() {
        let params = ScalingParameters::degenerate(OutputBounds::unit());
        assert!(params.scale("abc").is_err());
    }

    #[test]
    fn test_adjust_formats_output() {
        let params = ScalingParameters::new(0.05, -0.5, OutputBounds::unit());
        assert_eq!(params.adjust("10").unwrap(), "0");
        assert_eq!(params.adjust("20").unwrap(), "0.5");
        assert_eq!(params.adjust("30").unwrap(), "1");
    }
}
