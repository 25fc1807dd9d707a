//! Nom parser for control conditions.
//!
//! ```text
//! expr       := and ( "||" and )*
//! and        := unary ( "&&" unary )*
//! unary      := "!" unary | primary
//! primary    := "(" expr ")" | comparison
//! comparison := operand ( cmp_op operand )?
//! operand    := literal | field
//! field      := ["opp." | "opportunity."] ident ( "." ident )*
//! literal    := true | false | null | undefined | number | 'text' | "text"
//! ```
//!
//! The grammar has no calls, assignments or indexing, so nothing outside
//! the whitelisted opportunity fields can be reached.

use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, satisfy},
    combinator::{all_consuming, cut, map, map_res, not, opt, recognize, value},
    error::{context, VerboseError},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use rust_decimal::Decimal;

use super::ast::{CmpOp, Condition, Operand, Value};
use super::error::{ConditionError, ConditionResult};

/// Longest accepted expression, in bytes.
pub const MAX_EXPRESSION_LEN: usize = 1024;

/// Deepest accepted nesting of parentheses and negations.
pub const MAX_NESTING: usize = 32;

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

// ============================================================================
// Public API
// ============================================================================

/// Parse a condition string into a [`Condition`].
///
/// # Errors
///
/// `ConditionError::TooComplex` for oversized or deeply nested input,
/// `ConditionError::Parse` for anything outside the grammar.
pub fn parse_condition(input: &str) -> ConditionResult<Condition> {
    check_complexity(input)?;

    match all_consuming(terminated(expr, multispace0))(input) {
        Ok((_, condition)) => Ok(condition),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(ConditionError::Parse {
            expression: input.to_string(),
            message: nom::error::convert_error(input, e),
        }),
        Err(nom::Err::Incomplete(_)) => Err(ConditionError::Parse {
            expression: input.to_string(),
            message: "incomplete input".to_string(),
        }),
    }
}

fn check_complexity(input: &str) -> ConditionResult<()> {
    if input.len() > MAX_EXPRESSION_LEN {
        return Err(ConditionError::TooComplex(format!(
            "{} bytes exceeds the {MAX_EXPRESSION_LEN} byte limit",
            input.len()
        )));
    }

    // Upper bound on recursion depth: open parentheses plus the current run
    // of negations. Quoted text may inflate it harmlessly.
    let mut parens = 0usize;
    let mut negations = 0usize;
    let mut max_depth = 0usize;
    for c in input.chars() {
        match c {
            '(' => parens += 1,
            ')' => parens = parens.saturating_sub(1),
            '!' => negations += 1,
            c if c.is_whitespace() => {}
            _ => negations = 0,
        }
        max_depth = max_depth.max(parens + negations);
    }
    if max_depth > MAX_NESTING {
        return Err(ConditionError::TooComplex(format!(
            "nesting deeper than {MAX_NESTING}"
        )));
    }
    Ok(())
}

// ============================================================================
// Expressions
// ============================================================================

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> Res<'a, O>
where
    F: FnMut(&'a str) -> Res<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn expr(input: &str) -> Res<'_, Condition> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(ws(tag("||")), cut(and_expr)))(input)?;
    let folded = rest
        .into_iter()
        .fold(first, |acc, next| Condition::Or(Box::new(acc), Box::new(next)));
    Ok((input, folded))
}

fn and_expr(input: &str) -> Res<'_, Condition> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(preceded(ws(tag("&&")), cut(unary)))(input)?;
    let folded = rest
        .into_iter()
        .fold(first, |acc, next| Condition::And(Box::new(acc), Box::new(next)));
    Ok((input, folded))
}

fn unary(input: &str) -> Res<'_, Condition> {
    alt((
        map(
            preceded(ws(terminated(char('!'), not(char('=')))), cut(unary)),
            |inner| Condition::Not(Box::new(inner)),
        ),
        primary,
    ))(input)
}

fn primary(input: &str) -> Res<'_, Condition> {
    alt((
        delimited(
            ws(char('(')),
            cut(expr),
            cut(context("closing parenthesis", ws(char(')')))),
        ),
        comparison,
    ))(input)
}

fn comparison(input: &str) -> Res<'_, Condition> {
    let (input, left) = ws(operand)(input)?;
    let (input, tail) = opt(pair(ws(cmp_op), cut(context("right operand", ws(operand)))))(input)?;
    let condition = match tail {
        Some((op, right)) => Condition::Compare { left, op, right },
        None => Condition::Truthy(left),
    };
    Ok((input, condition))
}

fn cmp_op(input: &str) -> Res<'_, CmpOp> {
    alt((
        value(CmpOp::Eq, tag("===")),
        value(CmpOp::Ne, tag("!==")),
        value(CmpOp::Eq, tag("==")),
        value(CmpOp::Ne, tag("!=")),
        value(CmpOp::Ge, tag(">=")),
        value(CmpOp::Le, tag("<=")),
        value(CmpOp::Gt, tag(">")),
        value(CmpOp::Lt, tag("<")),
    ))(input)
}

// ============================================================================
// Operands
// ============================================================================

fn operand(input: &str) -> Res<'_, Operand> {
    context(
        "field or literal",
        alt((map(literal, Operand::Literal), map(field, Operand::Field))),
    )(input)
}

fn literal(input: &str) -> Res<'_, Value> {
    alt((
        value(Value::Bool(true), keyword("true")),
        value(Value::Bool(false), keyword("false")),
        value(Value::Null, keyword("null")),
        value(Value::Null, keyword("undefined")),
        map(number, Value::Number),
        map(quoted_string, |s: &str| Value::Text(s.to_string())),
    ))(input)
}

/// A keyword not immediately followed by another identifier character.
fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
    terminated(tag(kw), not(satisfy(is_ident_char)))
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn number(input: &str) -> Res<'_, Decimal> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        Decimal::from_str,
    )(input)
}

fn quoted_string(input: &str) -> Res<'_, &str> {
    alt((
        delimited(char('"'), take_until("\""), char('"')),
        delimited(char('\''), take_until("'"), char('\'')),
    ))(input)
}

fn identifier(input: &str) -> Res<'_, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

/// Dotted path with an optional `opp.`/`opportunity.` root, which is
/// stripped from the stored name.
fn field(input: &str) -> Res<'_, String> {
    let (input, segments) = separated_list1(char('.'), identifier)(input)?;
    let path = match segments.as_slice() {
        [root, rest @ ..] if !rest.is_empty() && (*root == "opp" || *root == "opportunity") => {
            rest.join(".")
        }
        _ => segments.join("."),
    };
    Ok((input, path))
}
