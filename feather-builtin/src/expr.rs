// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `expr` built-in and the arithmetic/logical expression grammar it
//! evaluates (§4.6's `expr` row; scoped per §1 to the contract level —
//! operator precedence, short-circuiting, and the comparison/coercion rules
//! — rather than the full `tcl::mathfunc::*` extension surface).
//!
//! Expression text reaching this module has already gone through the
//! ordinary word-substitution pass (like any other built-in's arguments),
//! so this grammar only covers arithmetic, comparison, and boolean
//! operators over already-resolved numbers and strings — not a second
//! `$`/`[...]` substitution pass of its own.

use feather_core::host::Host;
use feather_core::{Flow, Interp};

use crate::common;

#[derive(Clone, Debug, PartialEq)]
enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    fn as_bool(&self) -> Result<bool, String> {
        match self {
            Value::Int(i) => Ok(*i != 0),
            Value::Float(f) => Ok(*f != 0.0),
            Value::Str(s) => parse_bool_literal(s).ok_or_else(|| format!("expected boolean value but got \"{s}\"")),
        }
    }

    fn as_f64(&self) -> Result<f64, String> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("expected number but got \"{s}\"")),
        }
    }

    fn render(&self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Str(s) => s.clone(),
        }
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.is_finite() && f.abs() < 1e17 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

fn parse_bool_literal(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// The `expr` built-in: joins its arguments with a space (as the reference
/// language does for a multi-word invocation like `expr $a + $b`) and
/// evaluates the result.
pub fn cmd_expr<H: Host>(interp: &mut Interp<H>, args: &[H::Obj]) -> Flow<H::Obj> {
    let text = args
        .iter()
        .map(|a| interp.host.text(a))
        .collect::<Vec<_>>()
        .join(" ");
    eval_expr(interp, &text)
}

/// Evaluates `text` as an expression, returning the host value it produces.
pub fn eval_expr<H: Host>(interp: &mut Interp<H>, text: &str) -> Flow<H::Obj> {
    let mut parser = Parser { chars: text.chars().collect(), pos: 0 };
    let value = match parser.parse_ternary() {
        Ok(v) => v,
        Err(e) => return common::error(interp, e),
    };
    parser.skip_space();
    if parser.pos != parser.chars.len() {
        return common::error(interp, format!("syntax error in expression \"{text}\""));
    }
    Flow::Continue(interp.host.intern(value.render().as_bytes()))
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

type PResult<T> = Result<T, String>;

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_space(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn eat(&mut self, s: &str) -> bool {
        self.skip_space();
        if self.starts_with(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    fn parse_ternary(&mut self) -> PResult<Value> {
        let cond = self.parse_or()?;
        self.skip_space();
        if self.eat("?") {
            let then_val = self.parse_ternary()?;
            if !self.eat(":") {
                return Err("expected ':' in ternary expression".to_string());
            }
            let else_val = self.parse_ternary()?;
            return Ok(if cond.as_bool()? { then_val } else { else_val });
        }
        Ok(cond)
    }

    fn parse_or(&mut self) -> PResult<Value> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_space();
            if self.eat("||") {
                let short = left.as_bool()?;
                let right = self.parse_and()?;
                left = Value::Int((short || right.as_bool()?) as i64);
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<Value> {
        let mut left = self.parse_equality()?;
        loop {
            self.skip_space();
            if self.eat("&&") {
                let short = left.as_bool()?;
                let right = self.parse_equality()?;
                left = Value::Int((short && right.as_bool()?) as i64);
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> PResult<Value> {
        let mut left = self.parse_relational()?;
        loop {
            self.skip_space();
            let op = if self.eat("==") {
                "=="
            } else if self.eat("!=") {
                "!="
            } else if self.eat_word("eq") {
                "eq"
            } else if self.eat_word("ne") {
                "ne"
            } else if self.eat_word("in") {
                "in"
            } else if self.eat_word("ni") {
                "ni"
            } else {
                break;
            };
            let right = self.parse_relational()?;
            left = match op {
                "==" => Value::Int((numeric_cmp(&left, &right)? == std::cmp::Ordering::Equal) as i64),
                "!=" => Value::Int((numeric_cmp(&left, &right)? != std::cmp::Ordering::Equal) as i64),
                "eq" => Value::Int((left.render() == right.render()) as i64),
                "ne" => Value::Int((left.render() != right.render()) as i64),
                "in" | "ni" => {
                    let hay = right.render();
                    let needle = left.render();
                    let contains = hay.split_whitespace().any(|w| w == needle);
                    Value::Int((if op == "in" { contains } else { !contains }) as i64)
                }
                _ => unreachable!(),
            };
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> PResult<Value> {
        let mut left = self.parse_additive()?;
        loop {
            self.skip_space();
            let op = if self.eat("<=") {
                "<="
            } else if self.eat(">=") {
                ">="
            } else if self.eat("<") {
                "<"
            } else if self.eat(">") {
                ">"
            } else {
                break;
            };
            let right = self.parse_additive()?;
            let ord = numeric_cmp(&left, &right)?;
            let truth = match op {
                "<" => ord == std::cmp::Ordering::Less,
                ">" => ord == std::cmp::Ordering::Greater,
                "<=" => ord != std::cmp::Ordering::Greater,
                ">=" => ord != std::cmp::Ordering::Less,
                _ => unreachable!(),
            };
            left = Value::Int(truth as i64);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> PResult<Value> {
        let mut left = self.parse_multiplicative()?;
        loop {
            self.skip_space();
            if self.eat("+") {
                let right = self.parse_multiplicative()?;
                left = arith(&left, &right, |a, b| a.checked_add(b), |a, b| a + b)?;
            } else if self.eat("-") {
                let right = self.parse_multiplicative()?;
                left = arith(&left, &right, |a, b| a.checked_sub(b), |a, b| a - b)?;
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<Value> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_space();
            if self.eat("*") {
                let right = self.parse_unary()?;
                left = arith(&left, &right, |a, b| a.checked_mul(b), |a, b| a * b)?;
            } else if self.eat("/") {
                let right = self.parse_unary()?;
                left = div(&left, &right)?;
            } else if self.eat("%") {
                let right = self.parse_unary()?;
                left = modulo(&left, &right)?;
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Value> {
        self.skip_space();
        if self.eat("!") {
            let v = self.parse_unary()?;
            return Ok(Value::Int(!v.as_bool()? as i64));
        }
        if self.eat("-") {
            let v = self.parse_unary()?;
            return Ok(match v {
                Value::Int(i) => Value::Int(i.wrapping_neg()),
                Value::Float(f) => Value::Float(-f),
                Value::Str(_) => Value::Float(-v.as_f64()?),
            });
        }
        if self.eat("+") {
            return self.parse_unary();
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> PResult<Value> {
        self.skip_space();
        if self.eat("(") {
            let v = self.parse_ternary()?;
            if !self.eat(")") {
                return Err("expected ')'".to_string());
            }
            return Ok(v);
        }
        if self.eat("\"") {
            let mut s = String::new();
            while let Some(c) = self.peek() {
                if c == '"' {
                    self.pos += 1;
                    return Ok(Value::Str(s));
                }
                s.push(c);
                self.pos += 1;
            }
            return Err("missing \"".to_string());
        }
        if self.eat("{") {
            let mut s = String::new();
            while let Some(c) = self.peek() {
                if c == '}' {
                    self.pos += 1;
                    return Ok(Value::Str(s));
                }
                s.push(c);
                self.pos += 1;
            }
            return Err("missing close-brace".to_string());
        }
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return self.parse_number();
        }
        if let Some(b) = self.try_eat_bool_literal() {
            return Ok(Value::Int(b as i64));
        }
        Err("syntax error in expression".to_string())
    }

    fn parse_number(&mut self) -> PResult<Value> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let mut is_float = false;
        if self.peek() == Some('.') {
            is_float = true;
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.pos += 1;
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if is_float {
            text.parse::<f64>().map(Value::Float).map_err(|_| "bad number".to_string())
        } else {
            text.parse::<i64>().map(Value::Int).map_err(|_| "bad number".to_string())
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        self.skip_space();
        if !self.starts_with(word) {
            return false;
        }
        let after = self.chars.get(self.pos + word.chars().count());
        if after.is_some_and(|c| c.is_alphanumeric() || *c == '_') {
            return false;
        }
        self.pos += word.chars().count();
        true
    }

    fn try_eat_bool_literal(&mut self) -> Option<bool> {
        for (word, value) in [
            ("true", true),
            ("yes", true),
            ("on", true),
            ("false", false),
            ("no", false),
            ("off", false),
        ] {
            if self.eat_word(word) {
                return Some(value);
            }
        }
        None
    }
}

fn numeric_cmp(a: &Value, b: &Value) -> Result<std::cmp::Ordering, String> {
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        return Ok(x.cmp(y));
    }
    let x = a.as_f64()?;
    let y = b.as_f64()?;
    x.partial_cmp(&y).ok_or_else(|| "not a number".to_string())
}

fn arith(
    a: &Value,
    b: &Value,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
) -> PResult<Value> {
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        return Ok(Value::Int(int_op(*x, *y).unwrap_or_else(|| float_op(*x as f64, *y as f64) as i64)));
    }
    Ok(Value::Float(float_op(a.as_f64()?, b.as_f64()?)))
}

fn div(a: &Value, b: &Value) -> PResult<Value> {
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        if *y == 0 {
            return Err("divide by zero".to_string());
        }
        return Ok(Value::Int(x.div_euclid(*y)));
    }
    let y = b.as_f64()?;
    if y == 0.0 {
        return Err("divide by zero".to_string());
    }
    Ok(Value::Float(a.as_f64()? / y))
}

fn modulo(a: &Value, b: &Value) -> PResult<Value> {
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        if *y == 0 {
            return Err("divide by zero".to_string());
        }
        return Ok(Value::Int(x.rem_euclid(*y)));
    }
    Err("can't use non-integer value as operand of \"%\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use feather_core::Limits;
    use feather_stub::StubHost;

    fn eval(src: &str) -> String {
        let mut interp = Interp::new(StubHost::new(), Limits::default());
        match eval_expr(&mut interp, src) {
            Flow::Continue(v) => interp.host.text(&v),
            Flow::Break(_) => panic!("expr failed: {src}"),
        }
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3"), "7");
        assert_eq!(eval("(1 + 2) * 3"), "9");
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(eval("1 < 2 && 3 > 2"), "1");
        assert_eq!(eval("1 == 2 || 0"), "0");
    }

    #[test]
    fn string_equality() {
        assert_eq!(eval("\"abc\" eq \"abc\""), "1");
        assert_eq!(eval("\"abc\" ne \"xyz\""), "1");
    }

    #[test]
    fn ternary() {
        assert_eq!(eval("1 ? 10 : 20"), "10");
        assert_eq!(eval("0 ? 10 : 20"), "20");
    }

    #[test]
    fn boolean_literals() {
        assert_eq!(eval("true && false"), "0");
        assert_eq!(eval("yes || no"), "1");
    }

    #[test]
    fn float_arithmetic() {
        assert_eq!(eval("1.5 + 1.5"), "3.0");
    }
}
