//! Value calculations such as `value * 100` or `/1000`.
//!
//! A formula refers to the cell as `value` (or `x`), or starts with an
//! operator that is applied to the cell. After substitution only digits,
//! `.`, `+ - * /`, parentheses and whitespace may remain; anything else is
//! rejected and the cell keeps its original value.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::data::{display_value, number_value};

/// Longest formula that is evaluated at all.
const MAX_FORMULA_LEN: usize = 256;

/// Deepest nesting of parentheses, signs and powers the evaluator follows.
const MAX_DEPTH: usize = 64;

static SAFE_EXPR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\.\+\-\*/\s\(\)]+$").unwrap());

/// Apply `formula` to `value`. Returns `None` when the formula does not
/// apply or cannot be evaluated safely.
pub fn apply_calculation(value: f64, formula: &str) -> Option<f64> {
    let formula = formula.trim();
    if formula.is_empty() {
        return None;
    }
    if formula.len() > MAX_FORMULA_LEN {
        debug!(len = formula.len(), "ignoring oversized calculation");
        return None;
    }

    let operand = format!("({value})");
    let expr = if formula.contains("value") {
        formula.replace("value", &operand)
    } else if formula.contains('x') {
        formula.replace('x', &operand)
    } else if formula.starts_with(['*', '/', '+', '-']) {
        format!("{operand} {formula}")
    } else {
        return None;
    };

    if !SAFE_EXPR_RE.is_match(&expr) {
        debug!(formula, "ignoring unsafe calculation");
        return None;
    }

    let result = Evaluator::new(&expr).evaluate();
    if result.is_none() {
        debug!(formula, expr, "calculation failed");
    }
    result
}

/// Parse a cell as a number: numbers as-is, strings with `,` removed.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.replace(',', "").trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        _ => None,
    }
}

/// Apply a category calculation and render the result as an axis label.
/// Cells that are not numbers, or formulas that do not apply, pass through.
pub fn calculate_label(value: &Value, formula: Option<&str>) -> String {
    let computed = formula
        .and_then(|f| parse_number(value).and_then(|n| apply_calculation(n, f)));
    match computed {
        Some(n) => display_value(&number_value(n)),
        None => display_value(value),
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Recursive-descent evaluator over `+ - * / // **` and parentheses.
///
/// Nesting deeper than [`MAX_DEPTH`] fails the evaluation.
struct Evaluator<'a> {
    src: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    fn evaluate(mut self) -> Option<f64> {
        let v = self.expr()?;
        self.skip_ws();
        if self.pos != self.src.len() || !v.is_finite() {
            return None;
        }
        Some(v)
    }

    fn nested(&mut self, parse: impl FnOnce(&mut Self) -> Option<f64>) -> Option<f64> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let v = parse(self);
        self.depth -= 1;
        v
    }

    fn skip_ws(&mut self) {
        while self.src.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.src[self.pos..].starts_with(token.as_bytes()) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Option<f64> {
        let mut acc = self.term()?;
        loop {
            if self.eat("+") {
                acc += self.term()?;
            } else if self.eat("-") {
                acc -= self.term()?;
            } else {
                return Some(acc);
            }
        }
    }

    fn term(&mut self) -> Option<f64> {
        let mut acc = self.unary()?;
        loop {
            if self.src[self.pos..].starts_with(b"**") {
                return Some(acc);
            }
            if self.eat("//") {
                let rhs = self.unary()?;
                if rhs == 0.0 {
                    return None;
                }
                acc = (acc / rhs).floor();
            } else if self.eat("*") {
                acc *= self.unary()?;
            } else if self.eat("/") {
                let rhs = self.unary()?;
                if rhs == 0.0 {
                    return None;
                }
                acc /= rhs;
            } else {
                return Some(acc);
            }
        }
    }

    fn unary(&mut self) -> Option<f64> {
        if self.eat("-") {
            return self.nested(Self::unary).map(|v| -v);
        }
        if self.eat("+") {
            return self.nested(Self::unary);
        }
        self.power()
    }

    fn power(&mut self) -> Option<f64> {
        let base = self.atom()?;
        if self.eat("**") {
            let exp = self.nested(Self::unary)?;
            return Some(base.powf(exp));
        }
        Some(base)
    }

    fn atom(&mut self) -> Option<f64> {
        if self.eat("(") {
            let v = self.nested(Self::expr)?;
            return self.eat(")").then_some(v);
        }
        self.number()
    }

    fn number(&mut self) -> Option<f64> {
        self.peek()?;
        let start = self.pos;
        while self
            .src
            .get(self.pos)
            .is_some_and(|c| c.is_ascii_digit() || *c == b'.')
        {
            self.pos += 1;
        }
        std::str::from_utf8(&self.src[start..self.pos])
            .ok()?
            .parse()
            .ok()
    }
}
