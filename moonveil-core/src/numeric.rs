//! Numeric literal splitting.
//!
//! A literal is replaced by a parenthesized arithmetic expression with the
//! same value: a sum, a difference, or a ratio. Every candidate is
//! re-evaluated in f64 (Luau's number type) before it is accepted, so a
//! split that would round differently at runtime is rejected rather than
//! emitted.

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::SkipReason;

const SPLIT_MIN: i64 = 1_000;
const SPLIT_MAX: i64 = 100_000;
const RATIO_MIN: i64 = 2;
const RATIO_MAX: i64 = 50;
const FRACTION_RATIO_MIN: i64 = 100;
const FRACTION_RATIO_MAX: i64 = 100_000;

/// Largest integer magnitude f64 stores exactly (2^53).
const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Rewrite `value` as an equivalent parenthesized expression. Zero and one
/// are merely wrapped; they are too entangled with loop bounds and indexing
/// idioms to be worth splitting noisily.
pub(crate) fn mangle(value: f64, rng: &mut StdRng) -> Result<String, SkipReason> {
    if !value.is_finite() {
        return Err(SkipReason::UnsupportedLiteral(value.to_string()));
    }
    // Whole numbers past 2^53 have already lost their low digits in f64;
    // splitting them would bake that loss into the output, so leave them be.
    if value.fract() == 0.0 && value.abs() > EXACT_INT_LIMIT {
        return Err(SkipReason::UnsupportedLiteral(value.to_string()));
    }
    if value == 0.0 {
        return Ok("(0)".to_string());
    }
    if value == 1.0 {
        return Ok("(1)".to_string());
    }

    let strategy = rng.gen_range(0..3);
    // Integers always survive a sum split; fractional values whose low bits
    // don't fit next to a large addend survive the ratio split instead. Retry
    // with the strategy that cannot lose precision for this value class.
    let fallback = if value.fract() == 0.0 { 0 } else { 2 };
    build(value, strategy, rng)
        .or_else(|| build(value, fallback, rng))
        .ok_or_else(|| SkipReason::UnsupportedLiteral(value.to_string()))
}

// Caller has already bounded integral values to the exactly-representable
// range, so the i64 casts below cannot truncate.
fn build(value: f64, strategy: u8, rng: &mut StdRng) -> Option<String> {
    let integral = value.fract() == 0.0;
    match (strategy, integral) {
        (0, true) => {
            let v = value as i64;
            let a = rng.gen_range(SPLIT_MIN..=SPLIT_MAX);
            let b = v - a;
            exact((a + b) as f64, value)?;
            Some(format!("({a}+{b})"))
        }
        (0, false) => {
            let a = rng.gen_range(SPLIT_MIN..=SPLIT_MAX) as f64;
            let b = value - a;
            exact(a + b, value)?;
            Some(format!("({a}+{b})"))
        }
        (1, true) => {
            let v = value as i64;
            let b = rng.gen_range(SPLIT_MIN..=SPLIT_MAX);
            let a = v + b;
            exact((a - b) as f64, value)?;
            Some(format!("({a}-{b})"))
        }
        (1, false) => {
            let b = rng.gen_range(SPLIT_MIN..=SPLIT_MAX) as f64;
            let a = value + b;
            exact(a - b, value)?;
            Some(format!("({a}-{b})"))
        }
        (_, true) => {
            let v = value as i64;
            let f = rng.gen_range(RATIO_MIN..=RATIO_MAX);
            let n = v.checked_mul(f)?;
            exact(n as f64 / f as f64, value)?;
            Some(format!("({n}/{f})"))
        }
        (_, false) => {
            let f = rng.gen_range(FRACTION_RATIO_MIN..=FRACTION_RATIO_MAX);
            let n = value * f as f64;
            if !n.is_finite() {
                return None;
            }
            let tolerance = 1e-9 * value.abs().max(1.0);
            ((n / f as f64 - value).abs() <= tolerance).then(|| format!("({n}/{f})"))
        }
    }
}

fn exact(candidate: f64, expected: f64) -> Option<()> {
    (candidate == expected).then_some(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    /// Evaluate one emitted `(a OP b)` expression the way Luau would.
    fn eval(expr: &str) -> f64 {
        let inner = expr
            .strip_prefix('(')
            .and_then(|e| e.strip_suffix(')'))
            .unwrap_or_else(|| panic!("not parenthesized: {expr}"));
        if let Ok(plain) = inner.parse::<f64>() {
            return plain;
        }
        // Operator position: skip index 0 so a leading unary minus on `a`
        // is not taken for the split operator.
        let (at, op) = inner
            .char_indices()
            .skip(1)
            .find(|(_, c)| matches!(c, '+' | '-' | '/'))
            .unwrap_or_else(|| panic!("no operator in {expr}"));
        let lhs: f64 = inner[..at].parse().unwrap();
        let rhs: f64 = inner[at + 1..].parse().unwrap();
        match op {
            '+' => lhs + rhs,
            '-' => lhs - rhs,
            _ => lhs / rhs,
        }
    }

    #[test]
    fn test_zero_and_one_are_wrapped_not_split() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(mangle(0.0, &mut rng).unwrap(), "(0)");
        assert_eq!(mangle(1.0, &mut rng).unwrap(), "(1)");
    }

    #[test]
    fn test_integers_split_exactly() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            for value in [2.0, 100.0, 911.0, 65536.0, 123456789.0] {
                let expr = mangle(value, &mut rng).unwrap();
                assert_eq!(eval(&expr), value, "seed {seed} expr {expr}");
            }
        }
    }

    #[test]
    fn test_negative_integer_splits_exactly() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let expr = mangle(-250.0, &mut rng).unwrap();
            assert_eq!(eval(&expr), -250.0, "{expr}");
        }
    }

    #[test]
    fn test_dyadic_fraction_splits_under_every_strategy() {
        // 0.5 sits exactly next to any integer addend, so sum and difference
        // splits reproduce it bit-for-bit and no strategy needs the fallback.
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let expr = mangle(0.5, &mut rng).unwrap();
            assert_eq!(eval(&expr), 0.5, "seed {seed} expr {expr}");
        }
    }

    #[test]
    fn test_fractional_values_stay_within_tolerance() {
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            for value in [3.14159, 0.001, 799.25, 1e-4] {
                let expr = mangle(value, &mut rng).unwrap();
                let got = eval(&expr);
                assert!(
                    (got - value).abs() <= 1e-9 * value.abs().max(1.0),
                    "seed {seed} value {value} expr {expr} -> {got}"
                );
            }
        }
    }

    #[test]
    fn test_integer_past_exact_range_is_rejected() {
        let mut rng = StdRng::seed_from_u64(9);
        let too_big = 2.0f64.powi(60);
        assert!(matches!(
            mangle(too_big, &mut rng),
            Err(SkipReason::UnsupportedLiteral(_))
        ));
    }

    #[test]
    fn test_infinite_value_is_rejected() {
        let mut rng = StdRng::seed_from_u64(9);
        assert!(mangle(f64::INFINITY, &mut rng).is_err());
    }

    #[test]
    fn test_same_seed_same_split() {
        let mut a = StdRng::seed_from_u64(77);
        let mut b = StdRng::seed_from_u64(77);
        assert_eq!(mangle(4096.0, &mut a).unwrap(), mangle(4096.0, &mut b).unwrap());
    }
}
