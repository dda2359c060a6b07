// tests/evaluator_tests.rs

use histcalc::{evaluate, EvalError, ParseError, ParseErrorKind, MAX_NESTING};
use test_utils::*;

#[cfg(test)]
mod arithmetic_tests {
    use super::*;

    #[test]
    fn test_documented_results() {
        assert_eq!(eval_ok("2+3*4"), 14.0);
        assert_eq!(eval_ok("(2+3)*4"), 20.0);
        assert_eq!(eval_ok("2^3^2"), 512.0);
        assert_eq!(eval_ok("-2^2"), 4.0);
        assert_eq!(eval_ok("10%3"), 1.0);
        assert_eq!(eval_ok("2**3"), 8.0);
    }

    #[test]
    fn test_ieee_special_values() {
        assert_eq!(eval_ok("10/0"), f64::INFINITY);
        assert_eq!(eval_ok("-10/0"), f64::NEG_INFINITY);
        assert!(eval_ok("0/0").is_nan());
        assert!(eval_ok("(1/0)-(1/0)").is_nan());
        assert!(eval_ok("(-8)^(1/3)").is_nan());
    }

    #[test]
    fn test_nested_parentheses() {
        assert_eq!(eval_ok("((((7))))"), 7.0);
        assert_eq!(eval_ok("2*(3+(4-1)*2)"), 18.0);
        assert_eq!(eval_ok("-(2+3)^2"), 25.0);
    }

    #[test]
    fn test_mixed_operators_left_to_right() {
        assert_eq!(eval_ok("20/4*5"), 25.0);
        assert_eq!(eval_ok("20%6*2"), 4.0);
        assert_eq!(eval_ok("1-2+3"), 2.0);
    }

    #[test]
    fn test_matches_hand_written_float_evaluation() {
        let cases: [(&str, f64); 6] = [
            ("1.5*4-2/8", 1.5 * 4.0 - 2.0 / 8.0),
            ("7%2.5+0.1", 7.0 % 2.5 + 0.1),
            ("3^0.5*3^0.5", 3f64.powf(0.5) * 3f64.powf(0.5)),
            ("-3%2", -3.0 % 2.0),
            ("2^-1^2", 2f64.powf((-1f64).powf(2.0))),
            ("0.1+0.2", 0.1 + 0.2),
        ];
        for (input, expected) in cases {
            assert_eq!(eval_ok(input), expected, "{}", input);
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_letters_are_rejected() {
        let err = eval_err("abc");
        assert_eq!(err.offending_char(), Some('a'));
        assert!(matches!(
            err,
            EvalError::Parse(ParseError { kind: ParseErrorKind::UnexpectedChar('a'), position: 0 })
        ));
    }

    #[test]
    fn test_error_position_points_at_character() {
        let err = eval_err("1 + 2 # 3");
        assert_eq!(err.offending_char(), Some('#'));
        assert_eq!(err.position(), 6);
    }

    #[test]
    fn test_unterminated_group_fails() {
        let err = eval_err("2*(3+4");
        assert_eq!(
            err,
            EvalError::Parse(ParseError {
                kind: ParseErrorKind::Expected { expected: ')', found: None },
                position: 6,
            })
        );
        assert_eq!(err.to_string(), "Parse error: Expected ')' but reached end of input at position 6");
    }

    #[test]
    fn test_bad_number_literal() {
        let err = eval_err("1..2");
        assert_eq!(err, EvalError::NumericFormat { literal: "1..2".to_string(), position: 0 });
        assert_eq!(err.to_string(), "Invalid number: '1..2' at position 0");
    }

    #[test]
    fn test_runaway_nesting_is_an_error() {
        for input in [
            format!("{}5", "-".repeat(200_000)),
            format!("{}1", "(".repeat(50_000)),
            format!("{}2", "2**".repeat(5_000)),
        ] {
            let err = eval_err(&input);
            assert!(
                matches!(err, EvalError::Parse(ParseError { kind: ParseErrorKind::TooDeep, .. })),
                "{:?}",
                err
            );
        }
    }

    #[test]
    fn test_nesting_at_limit_evaluates() {
        let input = format!("{}3{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(eval_ok(&input), 3.0);
        assert_eq!(
            eval_err(&format!("-{}", input)).to_string(),
            format!("Parse error: Expression nested deeper than {} levels at position {}", MAX_NESTING, MAX_NESTING + 1)
        );
    }

    #[test]
    fn test_operator_without_operand() {
        assert!(evaluate("*2").is_err());
        assert!(evaluate("2+*3").is_err());
        assert!(evaluate("()").is_err());
    }
}
