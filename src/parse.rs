use crate::error::CalcError;
use crate::scope::FunctionScope;
use crate::token::*;
use crate::value::Value;

/// Deepest nesting of brackets, unary signs and calls accepted before
/// evaluation gives up.
pub const MAX_DEPTH: usize = 128;

#[derive(Clone, Debug)]
pub struct IntermediateResult {
    value: Value,
    tokens_read: usize,
}

impl IntermediateResult {
    pub fn new(value: Value, tokens_read: usize) -> Self {
        IntermediateResult { value, tokens_read }
    }
}

/// Shared, read-only state threaded through the descent.
struct Context<'a, S: ?Sized> {
    scope: &'a S,
    depth: usize,
}

impl<'a, S: FunctionScope + ?Sized> Context<'a, S> {
    fn nested(&self) -> Result<Self, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::RecursionLimit);
        }
        Ok(Context {
            scope: self.scope,
            depth: self.depth + 1,
        })
    }
}

fn unexpected(token: &Token) -> CalcError {
    match *token {
        Token::CloseParen => CalcError::UnmatchedParenthesis,
        ref t => CalcError::UnexpectedToken(t.to_string(), "operator"),
    }
}

// Addition and subtraction
fn e_expr<S>(token_list: &[Token], ctx: &Context<S>) -> Result<IntermediateResult, CalcError>
where
    S: FunctionScope + ?Sized,
{
    let mut t1 = t_expr(token_list, ctx)?;
    let mut index = t1.tokens_read;

    while index < token_list.len() {
        match token_list[index] {
            Token::Plus => {
                let t2 = t_expr(&token_list[index + 1..], ctx)?;
                t1.value = t1.value + t2.value;
                t1.tokens_read += t2.tokens_read + 1;
            }
            Token::Minus => {
                let t2 = t_expr(&token_list[index + 1..], ctx)?;
                t1.value = t1.value - t2.value;
                t1.tokens_read += t2.tokens_read + 1;
            }
            Token::Number(_) | Token::Atom(_) | Token::OpenParen => {
                return Err(unexpected(&token_list[index]));
            }
            _ => break,
        };
        index = t1.tokens_read;
    }
    Ok(t1)
}

// Multiplication, division and remainder
fn t_expr<S>(token_list: &[Token], ctx: &Context<S>) -> Result<IntermediateResult, CalcError>
where
    S: FunctionScope + ?Sized,
{
    let mut f1 = u_expr(token_list, ctx)?;
    let mut index = f1.tokens_read;

    while index < token_list.len() {
        match token_list[index] {
            Token::Multiply => {
                let f2 = u_expr(&token_list[index + 1..], ctx)?;
                f1.value = f1.value * f2.value;
                f1.tokens_read += f2.tokens_read + 1;
            }
            Token::Divide => {
                let f2 = u_expr(&token_list[index + 1..], ctx)?;
                f1.value = (f1.value / f2.value)?;
                f1.tokens_read += f2.tokens_read + 1;
            }
            Token::Modulo => {
                let f2 = u_expr(&token_list[index + 1..], ctx)?;
                f1.value = (f1.value % f2.value)?;
                f1.tokens_read += f2.tokens_read + 1;
            }
            Token::Number(_) | Token::Atom(_) | Token::OpenParen => {
                return Err(unexpected(&token_list[index]));
            }
            _ => break,
        }
        index = f1.tokens_read;
    }
    Ok(f1)
}

// Unary signs; these bind looser than exponentiation, so -2^2 is -4
fn u_expr<S>(token_list: &[Token], ctx: &Context<S>) -> Result<IntermediateResult, CalcError>
where
    S: FunctionScope + ?Sized,
{
    match token_list.first() {
        Some(&Token::Minus) => {
            let mut ir = u_expr(&token_list[1..], &ctx.nested()?)?;
            ir.value = -ir.value;
            ir.tokens_read += 1;
            Ok(ir)
        }
        Some(&Token::Plus) => {
            let mut ir = u_expr(&token_list[1..], &ctx.nested()?)?;
            ir.tokens_read += 1;
            Ok(ir)
        }
        _ => f_expr(token_list, ctx),
    }
}

// Exponentiation, right associative
fn f_expr<S>(token_list: &[Token], ctx: &Context<S>) -> Result<IntermediateResult, CalcError>
where
    S: FunctionScope + ?Sized,
{
    let mut g1 = g_expr(token_list, ctx)?;
    let mut index = g1.tokens_read;
    while index < token_list.len() {
        match token_list[index] {
            Token::Square => {
                g1.value = g1.value.powu(2);
                g1.tokens_read += 1;
            }
            Token::Cube => {
                g1.value = g1.value.powu(3);
                g1.tokens_read += 1;
            }
            Token::Exponent => {
                let f = u_expr(&token_list[index + 1..], &ctx.nested()?)?;
                g1.value = g1.value.pow(f.value);
                g1.tokens_read += f.tokens_read + 1;
                break;
            }
            _ => break,
        }
        index = g1.tokens_read;
    }
    Ok(g1)
}

// Numbers, parenthesized expressions, and atoms
fn g_expr<S>(token_list: &[Token], ctx: &Context<S>) -> Result<IntermediateResult, CalcError>
where
    S: FunctionScope + ?Sized,
{
    if token_list.is_empty() {
        return Err(CalcError::UnexpectedEndOfInput);
    }
    match token_list[0] {
        Token::Number(n) => Ok(IntermediateResult::new(n, 1)),
        Token::Atom(ref s) => {
            let callable = ctx
                .scope
                .resolve(s)
                .ok_or_else(|| CalcError::UnknownAtom(s.clone()))?;
            if callable.arity() == 0 {
                return Ok(IntermediateResult::new(Value::new(callable.call(&[])), 1));
            }
            if token_list.get(1) != Some(&Token::OpenParen) {
                return Err(CalcError::NoFunctionArgument(s.clone()));
            }
            let (args, read) = arguments(&token_list[2..], &ctx.nested()?)?;
            if args.len() != callable.arity() {
                return Err(CalcError::BadArity {
                    name: s.clone(),
                    expected: callable.arity(),
                    found: args.len(),
                });
            }
            let value = Value::new(callable.call(&args));
            let comp = format!(
                "{}({})",
                s,
                args.iter()
                    .map(|a| Value::new(*a).to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            Ok(IntermediateResult::new(value.finite(comp)?, read + 2))
        }
        Token::OpenParen => {
            let ir = e_expr(&token_list[1..], &ctx.nested()?)?;
            let close_paren = ir.tokens_read + 1;
            match token_list.get(close_paren) {
                Some(&Token::CloseParen) => Ok(IntermediateResult::new(ir.value, close_paren + 1)),
                Some(t) => Err(CalcError::UnexpectedToken(t.to_string(), ")")),
                None => Err(CalcError::UnmatchedParenthesis),
            }
        }
        Token::CloseParen => Err(CalcError::UnmatchedParenthesis),
        ref t => Err(CalcError::UnexpectedToken(t.to_string(), "number")),
    }
}

/// Parse a comma separated argument list up to and including its closing
/// bracket. Returns the argument values and the number of tokens read.
fn arguments<S>(token_list: &[Token], ctx: &Context<S>) -> Result<(Vec<f64>, usize), CalcError>
where
    S: FunctionScope + ?Sized,
{
    let mut args = Vec::new();
    let mut index = 0;
    if token_list.first() == Some(&Token::CloseParen) {
        return Ok((args, 1));
    }
    loop {
        let ir = e_expr(&token_list[index..], ctx)?;
        args.push(ir.value.as_float());
        index += ir.tokens_read;
        match token_list.get(index) {
            Some(&Token::Comma) => index += 1,
            Some(&Token::CloseParen) => return Ok((args, index + 1)),
            Some(t) => return Err(CalcError::UnexpectedToken(t.to_string(), ")")),
            None => return Err(CalcError::UnmatchedParenthesis),
        }
    }
}

pub fn parse<S>(tokens: &[Token], scope: &S) -> Result<Value, CalcError>
where
    S: FunctionScope + ?Sized,
{
    if tokens.is_empty() {
        return Err(CalcError::EmptyExpression);
    }
    let ctx = Context { scope, depth: 0 };
    let answer = e_expr(tokens, &ctx)?;
    if let Some(extra) = tokens.get(answer.tokens_read) {
        return Err(unexpected(extra));
    }
    answer.value.finite("result")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{AngleUnit, EmptyScope, ScientificScope};

    fn eval_in<S: FunctionScope>(input: &str, scope: &S) -> Result<Value, CalcError> {
        tokenize(input).and_then(|tokens| parse(&tokens, scope))
    }

    #[test]
    fn precedence() {
        let cases = vec![
            ("2+3*4", 14.0),
            ("(2+3)*4", 20.0),
            ("10 - 4 - 3", 3.0),
            ("2 * 3 % 4", 2.0),
            ("-2^2", -4.0),
            ("2^3^2", 512.0),
            ("2**-1", 0.5),
            ("3²+4³", 73.0),
            ("--3", 3.0),
            ("+5 - -5", 10.0),
            ("7 % 3", 1.0),
            ("-7 % 3", 2.0),
            ("7 % -3", -2.0),
        ];
        for (input, expected) in cases {
            assert_eq!(eval_in(input, &EmptyScope), Ok(Value::new(expected)), "{}", input);
        }
    }

    #[test]
    fn malformed() {
        let cases = vec![
            ("2+", CalcError::UnexpectedEndOfInput),
            ("(2+3", CalcError::UnmatchedParenthesis),
            ("2+3)", CalcError::UnmatchedParenthesis),
            ("", CalcError::EmptyExpression),
            ("2 3", CalcError::UnexpectedToken("'3'".into(), "operator")),
            ("*2", CalcError::UnexpectedToken("Multiply".into(), "number")),
            ("sin(30)", CalcError::UnknownAtom("sin".into())),
        ];
        for (input, expected) in cases {
            assert_eq!(eval_in(input, &EmptyScope), Err(expected), "{}", input);
        }
    }

    #[test]
    fn zero_divisors() {
        assert_eq!(eval_in("10/0", &EmptyScope), Err(CalcError::DivideByZero));
        assert_eq!(eval_in("10%(2-2)", &EmptyScope), Err(CalcError::DivideByZero));
        assert_eq!(
            eval_in("1e308*10", &EmptyScope),
            Err(CalcError::NonFinite("result".into()))
        );
    }

    #[test]
    fn calls() {
        let scope = ScientificScope::new(AngleUnit::Radians);
        assert_eq!(eval_in("pow(2, 10) + 1", &scope), Ok(Value::new(1025.0)));
        assert_eq!(eval_in("sqrt(16) * inv(4)", &scope), Ok(Value::new(1.0)));
        assert_eq!(eval_in("2 * pi", &scope), eval_in("tau", &scope));
        assert_eq!(
            eval_in("pow(2)", &scope),
            Err(CalcError::BadArity {
                name: "pow".into(),
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            eval_in("sqrt 4", &scope),
            Err(CalcError::NoFunctionArgument("sqrt".into()))
        );
    }

    #[test]
    fn non_finite_calls_fail_immediately() {
        let scope = ScientificScope::default();
        assert_eq!(
            eval_in("1 / inv(0)", &scope),
            Err(CalcError::NonFinite("inv(0)".into()))
        );
        assert_eq!(
            eval_in("sqrt(-1)", &scope),
            Err(CalcError::NonFinite("sqrt(-1)".into()))
        );
    }

    #[test]
    fn nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(eval_in(&deep, &EmptyScope), Err(CalcError::RecursionLimit));
        let shallow = format!("{}1{}", "(".repeat(16), ")".repeat(16));
        assert_eq!(eval_in(&shallow, &EmptyScope), Ok(Value::new(1.0)));
    }
}
