//! Operator typing rules.
//!
//! Binary operators, and subscripts on anything that is not a list, resolve
//! through one table of `(operator, left, right) -> result` rules. Rules are
//! matched with [`Type::equals`], so an `Any` operand matches the first rule
//! for its operator.

use lazy_static::lazy_static;

use super::types::Type;

pub struct OperatorRule {
    pub operator: &'static str,
    pub left: Type,
    pub right: Type,
    pub result: Type,
}

#[derive(Debug, PartialEq)]
pub enum OperatorError {
    /// No rule mentions the operator at all.
    Unknown,
    /// The operator exists but not for these operand types.
    Mismatch,
}

fn rule(operator: &'static str, left: Type, right: Type, result: Type) -> OperatorRule {
    OperatorRule {
        operator,
        left,
        right,
        result,
    }
}

lazy_static! {
    pub static ref OPERATORS: Vec<OperatorRule> = {
        let mut rules = vec![
            rule("+", Type::int(), Type::int(), Type::int()),
            rule("+", Type::str(), Type::str(), Type::str()),
            rule("[", Type::str(), Type::int(), Type::optional(Type::str())),
        ];

        for operator in ["-", "*", "/", "%"] {
            rules.push(rule(operator, Type::int(), Type::int(), Type::int()));
        }

        for operator in ["<", "<=", ">", ">="] {
            rules.push(rule(operator, Type::int(), Type::int(), Type::bool()));
        }

        for operator in ["==", "!="] {
            for operand in [Type::int(), Type::str(), Type::bool()] {
                rules.push(rule(operator, operand.clone(), operand, Type::bool()));
            }
        }

        for operator in ["&&", "||"] {
            rules.push(rule(operator, Type::bool(), Type::bool(), Type::bool()));
        }

        rules
    };
}

pub fn resolve_operator(operator: &str, left: &Type, right: &Type) -> Result<Type, OperatorError> {
    let mut known = false;

    for rule in OPERATORS.iter().filter(|rule| rule.operator == operator) {
        known = true;
        if rule.left.equals(left) && rule.right.equals(right) {
            return Ok(rule.result.clone());
        }
    }

    if known {
        Err(OperatorError::Mismatch)
    } else {
        Err(OperatorError::Unknown)
    }
}
