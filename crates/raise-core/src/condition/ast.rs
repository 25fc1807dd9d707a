//! Condition syntax tree and its evaluation.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{ConditionError, ConditionResult};
use super::fields::FieldSource;

/// A literal, or the value read from a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Number(Decimal),
    Text(String),
    Null,
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) if s.contains('\'') => write!(f, "\"{s}\""),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// Comparison operators. `===`/`==` and `!==`/`!=` parse to the same
/// strict comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CmpOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "===",
            Self::Ne => "!==",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

/// Either side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Field name with any `opp.` prefix removed.
    Field(String),
    Literal(Value),
}

impl Operand {
    fn resolve(&self, source: &dyn FieldSource) -> ConditionResult<Value> {
        match self {
            Self::Field(name) => source
                .field(name)
                .ok_or_else(|| ConditionError::UnknownField(name.clone())),
            Self::Literal(v) => Ok(v.clone()),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "opp.{name}"),
            Self::Literal(v) => write!(f, "{v}"),
        }
    }
}

/// Parsed boolean condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Or(Box<Condition>, Box<Condition>),
    And(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
    Compare {
        left: Operand,
        op: CmpOp,
        right: Operand,
    },
    /// A lone operand, true when it is boolean `true`.
    Truthy(Operand),
}

impl Condition {
    /// Evaluate against `source`.
    ///
    /// Both sides of `&&` and `||` are always evaluated, so an unknown field
    /// is reported wherever it appears.
    pub fn evaluate(&self, source: &dyn FieldSource) -> ConditionResult<bool> {
        match self {
            Self::Or(a, b) => {
                let left = a.evaluate(source)?;
                let right = b.evaluate(source)?;
                Ok(left || right)
            }
            Self::And(a, b) => {
                let left = a.evaluate(source)?;
                let right = b.evaluate(source)?;
                Ok(left && right)
            }
            Self::Not(inner) => Ok(!inner.evaluate(source)?),
            Self::Compare { left, op, right } => {
                compare(&left.resolve(source)?, *op, &right.resolve(source)?)
            }
            Self::Truthy(operand) => match operand.resolve(source)? {
                Value::Bool(b) => Ok(b),
                Value::Null => Ok(false),
                other => Err(ConditionError::TypeMismatch(format!(
                    "`{operand}` is a {}, expected a boolean",
                    other.type_name()
                ))),
            },
        }
    }

    /// Every field name the condition reads, in order of appearance.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Or(a, b) | Self::And(a, b) => {
                a.collect_fields(out);
                b.collect_fields(out);
            }
            Self::Not(inner) => inner.collect_fields(out),
            Self::Compare { left, right, .. } => {
                push_field(left, out);
                push_field(right, out);
            }
            Self::Truthy(operand) => push_field(operand, out),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Or(..) => 1,
            Self::And(..) => 2,
            _ => 3,
        }
    }

    fn fmt_child(&self, child: &Condition, right: bool, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wrap = child.precedence() < self.precedence()
            || (right && child.precedence() == self.precedence());
        if wrap {
            write!(f, "({child})")
        } else {
            write!(f, "{child}")
        }
    }
}

fn push_field<'a>(operand: &'a Operand, out: &mut Vec<&'a str>) {
    if let Operand::Field(name) = operand {
        if !out.contains(&name.as_str()) {
            out.push(name.as_str());
        }
    }
}

fn compare(left: &Value, op: CmpOp, right: &Value) -> ConditionResult<bool> {
    match op {
        CmpOp::Eq => Ok(left == right),
        CmpOp::Ne => Ok(left != right),
        CmpOp::Gt | CmpOp::Ge | CmpOp::Lt | CmpOp::Le => {
            let (Value::Number(l), Value::Number(r)) = (left, right) else {
                return Err(ConditionError::TypeMismatch(format!(
                    "`{}` needs two numbers, got {} and {}",
                    op.as_str(),
                    left.type_name(),
                    right.type_name()
                )));
            };
            Ok(match op {
                CmpOp::Gt => l > r,
                CmpOp::Ge => l >= r,
                CmpOp::Lt => l < r,
                _ => l <= r,
            })
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Or(a, b) | Self::And(a, b) => {
                let sep = if matches!(self, Self::Or(..)) {
                    "||"
                } else {
                    "&&"
                };
                self.fmt_child(a, false, f)?;
                write!(f, " {sep} ")?;
                self.fmt_child(b, true, f)
            }
            Self::Not(inner) => match inner.as_ref() {
                Self::Truthy(_) | Self::Not(_) => write!(f, "!{inner}"),
                _ => write!(f, "!({inner})"),
            },
            Self::Compare { left, op, right } => write!(f, "{left} {} {right}", op.as_str()),
            Self::Truthy(operand) => write!(f, "{operand}"),
        }
    }
}
