//! Opaque predicate injection.
//!
//! A per-line transform: simple assignment and bare-call lines are, with a
//! fixed probability, wrapped in an `if` on a freshly generated opaque
//! predicate, with the real statement routed down the branch that actually
//! runs and junk down the other. This is a line heuristic, not a grammar;
//! the eligibility checks are there to reject anything that might be the
//! middle of a multi-line construct, and a rejected line is simply kept.

use rand::Rng;
use regex::Regex;

use crate::junk;
use crate::passes::{Pass, PassContext};
use crate::predicate;

const WRAP_PROBABILITY: f64 = 0.3;

pub(crate) struct PredicateInjection {
    assign_re: Regex,
    call_re: Regex,
}

impl PredicateInjection {
    pub(crate) fn new() -> Self {
        Self {
            // name, optionally chained with `.field` / `[index]`, then `=`.
            assign_re: Regex::new(
                r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*|\[[^\[\]]*\])*\s*=\s*\S",
            )
            .unwrap(),
            // a whole line of the form `name(...)`.
            call_re: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*\s*\(.*\)$").unwrap(),
        }
    }

    fn eligible(&self, trimmed: &str) -> bool {
        if trimmed.is_empty() {
            return false;
        }
        // Block headers: wrapping `while x do` would orphan its body.
        if trimmed.ends_with("do") || trimmed.ends_with("then") {
            return false;
        }
        // Likely continuations of a multi-line table, call, or argument
        // list. A table field line reads exactly like an assignment, so the
        // trailing/leading punctuation is the only cheap signal available.
        if trimmed.ends_with(',') || trimmed.ends_with('{') || trimmed.ends_with('(') {
            return false;
        }
        if trimmed.starts_with('}') || trimmed.starts_with(')') || trimmed.starts_with(']') {
            return false;
        }
        let single_assignment =
            self.assign_re.is_match(trimmed) && trimmed.matches('=').count() == 1;
        single_assignment || self.call_re.is_match(trimmed)
    }
}

impl Pass for PredicateInjection {
    fn name(&self) -> &'static str {
        "inject-predicates"
    }

    fn enabled(&self, config: &crate::config::ObfuscatorConfig) -> bool {
        config.passes.inject_predicates
    }

    fn apply(&self, source: String, cx: &mut PassContext<'_>) -> String {
        let mut out: Vec<String> = Vec::new();
        for line in source.split('\n') {
            let trimmed = line.trim();
            if !self.eligible(trimmed) || !cx.rng.gen_bool(WRAP_PROBABILITY) {
                out.push(line.to_string());
                continue;
            }
            let indent = &line[..line.len() - line.trim_start().len()];
            let pred = predicate::generate(cx.rng);
            let junk = junk::statement(cx.rng);
            let wrapped = if pred.truth {
                format!("{indent}if {} then {trimmed} else {junk} end", pred.text)
            } else {
                format!("{indent}if {} then {junk} else {trimmed} end", pred.text)
            };
            out.push(wrapped);
            cx.stats.statements_wrapped += 1;
        }
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ObfuscatorConfig;
    use crate::pipeline::ObfuscationStats;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn run(source: &str, seed: u64) -> (String, usize) {
        let config = ObfuscatorConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut stats = ObfuscationStats::default();
        let mut cx = PassContext {
            config: &config,
            rng: &mut rng,
            stats: &mut stats,
        };
        let out = PredicateInjection::new().apply(source.to_string(), &mut cx);
        (out, stats.statements_wrapped)
    }

    #[test]
    fn test_eligibility_accepts_plain_assignments_and_calls() {
        let pass = PredicateInjection::new();
        assert!(pass.eligible("x = 5"));
        assert!(pass.eligible("score.value = score.value + 1"));
        assert!(pass.eligible("t[2] = f(x)"));
        assert!(pass.eligible("print(x, y)"));
    }

    #[test]
    fn test_eligibility_rejects_declarations_and_headers() {
        let pass = PredicateInjection::new();
        assert!(!pass.eligible("local x = 5"));
        assert!(!pass.eligible("while x < 3 do"));
        assert!(!pass.eligible("if ready then"));
        assert!(!pass.eligible("for i = 1, 10 do"));
        assert!(!pass.eligible("end"));
    }

    #[test]
    fn test_eligibility_rejects_comparisons_and_compound_lines() {
        let pass = PredicateInjection::new();
        assert!(!pass.eligible("x = y == z"));
        assert!(!pass.eligible("done = a ~= b or c == d"));
        assert!(!pass.eligible("return f()"));
    }

    #[test]
    fn test_eligibility_rejects_multiline_continuations() {
        let pass = PredicateInjection::new();
        assert!(!pass.eligible("config = {"));
        assert!(!pass.eligible("speed = 16,"));
        assert!(!pass.eligible("})"));
        assert!(!pass.eligible("handler("));
    }

    #[test]
    fn test_wrapped_line_keeps_statement_and_indent() {
        // Enough eligible lines that some seed-0 draw fires.
        let source = "    score = score + 1\n".repeat(60);
        let (out, wrapped) = run(&source, 0);
        assert!(wrapped > 0);
        let wrapped_line = out
            .split('\n')
            .find(|l| l.trim_start().starts_with("if "))
            .unwrap();
        assert!(wrapped_line.starts_with("    if "), "{wrapped_line}");
        assert!(wrapped_line.contains("score = score + 1"), "{wrapped_line}");
        assert!(wrapped_line.ends_with(" end"), "{wrapped_line}");
        assert!(wrapped_line.contains(" else "), "{wrapped_line}");
    }

    #[test]
    fn test_false_predicate_puts_real_statement_in_else_arm() {
        // Drive the generator until a false predicate comes up, then check
        // the wrapped layout against that predicate's truth value.
        for seed in 0..200 {
            let (out, wrapped) = run("hit(1)\n", seed);
            if wrapped == 0 {
                continue;
            }
            let mut probe = StdRng::seed_from_u64(seed);
            assert!(probe.gen_bool(WRAP_PROBABILITY));
            let pred = predicate::generate(&mut probe);
            if pred.truth {
                assert!(out.contains(&format!("if {} then hit(1) else", pred.text)), "{out}");
            } else {
                assert!(out.contains("else hit(1) end"), "{out}");
                return;
            }
        }
        panic!("no seed produced a false predicate");
    }

    #[test]
    fn test_ineligible_lines_flow_through_unchanged() {
        let source = "local x = 1\nreturn x\n";
        let (out, wrapped) = run(source, 3);
        assert_eq!(out, source);
        assert_eq!(wrapped, 0);
    }

    #[test]
    fn test_line_count_is_preserved() {
        let source = "a(1)\nb(2)\nc(3)\nd(4)\ne(5)\n";
        let (out, _) = run(source, 5);
        assert_eq!(out.split('\n').count(), source.split('\n').count());
    }

    #[test]
    fn test_same_seed_wraps_the_same_lines() {
        let source = "f(1)\ng(2)\nh(3)\n".repeat(10);
        let (a, _) = run(&source, 11);
        let (b, _) = run(&source, 11);
        assert_eq!(a, b);
    }
}
