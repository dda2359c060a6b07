/// Renders a result the way it is shown to the user and written to history.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x == f64::INFINITY {
        "Infinity".to_string()
    } else if x == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        x.to_string()
    }
}

/// Shorter rendering for the terminal view: six decimals at most, scientific
/// notation for very large or very small magnitudes.
pub fn format_compact(x: f64) -> String {
    if !x.is_finite() {
        return format_number(x);
    }
    if x.abs() > 1e10 || (x.abs() < 1e-5 && x != 0.0) {
        format!("{:.6e}", x)
    } else {
        let s = format!("{:.6}", x);
        s.trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

pub fn format_with_spaces(expr: &str) -> String {
    let mut result = String::new();
    let mut chars = expr.chars().filter(|c| !c.is_whitespace()).peekable();
    let mut after_operand = false;

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                result.push_str(" ** ");
                after_operand = false;
            }
            '+' | '-' if !after_operand => {
                // unary sign stays attached to its operand
                result.push(c);
            }
            '+' | '-' | '*' | '/' | '^' | '%' => {
                result.push(' ');
                result.push(c);
                result.push(' ');
                after_operand = false;
            }
            '(' => {
                result.push(c);
                after_operand = false;
            }
            _ => {
                result.push(c);
                after_operand = true;
            }
        }
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}
