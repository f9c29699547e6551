use common::{Result, ScaleError};

/// A classified raw input token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    /// Empty or `None`: absent data.
    Missing,
    /// `n<x>` or `p<x>`: a signed z-score, `-x` or `+x`.
    SignedProbability(f64),
    Number(f64),
}

impl Token {
    /// Classify a raw token after trimming surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self> {
        let text = raw.trim();
        if text.is_empty() || text == "None" {
            return Ok(Token::Missing);
        }
        if let Ok(value) = text.parse::<f64>() {
            return Ok(Token::Number(value));
        }
        if let Some(z) = parse_signed_probability(text) {
            return Ok(Token::SignedProbability(z));
        }
        Err(ScaleError::InvalidToken {
            token: text.to_string(),
        })
    }
}

fn parse_signed_probability(text: &str) -> Option<f64> {
    let (sign, digits) = match text.as_bytes().first()? {
        b'n' => (-1.0, &text[1..]),
        b'p' => (1.0, &text[1..]),
        _ => return None,
    };
    // The magnitude itself carries no sign and must be a finite real.
    if digits.starts_with(&['+', '-'][..]) {
        return None;
    }
    let magnitude: f64 = digits.parse().ok()?;
    if !magnitude.is_finite() {
        return None;
    }
    Some(sign * magnitude)
}
