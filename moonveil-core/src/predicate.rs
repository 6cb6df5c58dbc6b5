//! Opaque predicate templates.
//!
//! Each template produces an expression whose truth value is fixed by
//! construction but not obvious to a casual reader. The generator records
//! that value so the injector can route the real statement down the branch
//! that actually executes.

use rand::rngs::StdRng;
use rand::Rng;

/// A generated condition plus the branch it always takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OpaquePredicate {
    pub text: String,
    pub truth: bool,
}

/// Sample one of the four templates uniformly.
pub(crate) fn generate(rng: &mut StdRng) -> OpaquePredicate {
    match rng.gen_range(0..4) {
        0 => square_is_nonnegative(rng),
        1 => sum_identity(rng),
        2 => impossible_inequality(rng),
        _ => absolute_value_identity(rng),
    }
}

/// `x*x >= 0` holds for every real operand.
fn square_is_nonnegative(rng: &mut StdRng) -> OpaquePredicate {
    let a = rng.gen_range(2..=500);
    OpaquePredicate {
        text: format!("({a}*{a}>=0)"),
        truth: true,
    }
}

/// `a + b == c` with `c` computed at generation time.
fn sum_identity(rng: &mut StdRng) -> OpaquePredicate {
    let a: i64 = rng.gen_range(10..=10_000);
    let b: i64 = rng.gen_range(10..=10_000);
    let c = a + b;
    OpaquePredicate {
        text: format!("({a}+{b}=={c})"),
        truth: true,
    }
}

/// `a < -a` is false for every positive operand.
fn impossible_inequality(rng: &mut StdRng) -> OpaquePredicate {
    let a = rng.gen_range(1..=1_000);
    OpaquePredicate {
        text: format!("({a}< -{a})"),
        truth: false,
    }
}

/// `math.abs(-a) == a` for positive `a`.
fn absolute_value_identity(rng: &mut StdRng) -> OpaquePredicate {
    let a = rng.gen_range(1..=1_000);
    OpaquePredicate {
        text: format!("(math.abs(-{a})=={a})"),
        truth: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn operands(text: &str) -> Vec<i64> {
        let mut out = Vec::new();
        let mut current = String::new();
        for c in text.chars() {
            if c.is_ascii_digit() {
                current.push(c);
            } else if !current.is_empty() {
                out.push(current.parse().unwrap());
                current.clear();
            }
        }
        if !current.is_empty() {
            out.push(current.parse().unwrap());
        }
        out
    }

    #[test]
    fn test_square_template_is_true() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let p = square_is_nonnegative(&mut rng);
            assert!(p.truth);
            let ops = operands(&p.text);
            assert_eq!(ops[0], ops[1]);
            assert!(ops[0] * ops[0] >= 0);
        }
    }

    #[test]
    fn test_sum_template_adds_up() {
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..50 {
            let p = sum_identity(&mut rng);
            assert!(p.truth);
            let ops = operands(&p.text);
            assert_eq!(ops[0] + ops[1], ops[2], "{}", p.text);
        }
    }

    #[test]
    fn test_impossible_inequality_is_false() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let p = impossible_inequality(&mut rng);
            assert!(!p.truth);
            let ops = operands(&p.text);
            assert!(ops[0] > 0);
            assert!(!(ops[0] < -ops[0]));
        }
    }

    #[test]
    fn test_absolute_value_template_is_true() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..50 {
            let p = absolute_value_identity(&mut rng);
            assert!(p.truth);
            let ops = operands(&p.text);
            assert_eq!((-ops[0]).abs(), ops[1]);
        }
    }

    #[test]
    fn test_generate_covers_every_template() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut saw_false = false;
        let mut saw_abs = false;
        let mut saw_square = false;
        let mut saw_sum = false;
        for _ in 0..200 {
            let p = generate(&mut rng);
            saw_false |= !p.truth;
            saw_abs |= p.text.contains("math.abs");
            saw_square |= p.text.contains('*');
            saw_sum |= p.text.contains("==") && p.text.contains('+');
        }
        assert!(saw_false && saw_abs && saw_square && saw_sum);
    }

    #[test]
    fn test_predicates_are_parenthesized() {
        let mut rng = StdRng::seed_from_u64(10);
        for _ in 0..40 {
            let p = generate(&mut rng);
            assert!(p.text.starts_with('(') && p.text.ends_with(')'));
        }
    }
}
