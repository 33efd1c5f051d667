//! Logic operators

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator tag of a logic node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicOp {
    Not,
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
    /// Circuit input, driven from outside
    Input,
    /// Named circuit output, passes its input through
    Output,
}

impl LogicOp {
    pub fn arity(self) -> usize {
        match self {
            LogicOp::Input => 0,
            LogicOp::Not | LogicOp::Output => 1,
            LogicOp::And
            | LogicOp::Or
            | LogicOp::Nand
            | LogicOp::Nor
            | LogicOp::Xor
            | LogicOp::Xnor => 2,
        }
    }

    /// True for operators that transform their inputs
    pub fn is_gate(self) -> bool {
        !matches!(self, LogicOp::Input | LogicOp::Output)
    }

    /// Boolean value of this node for the given input values.
    /// `None` for INPUT nodes, whose value comes from outside.
    pub fn eval(self, inputs: &[bool]) -> Option<bool> {
        let a = inputs.first().copied().unwrap_or(false);
        let b = inputs.get(1).copied().unwrap_or(false);
        let value = match self {
            LogicOp::Input => return None,
            LogicOp::Output => a,
            LogicOp::Not => !a,
            LogicOp::And => a && b,
            LogicOp::Or => a || b,
            LogicOp::Nand => !(a && b),
            LogicOp::Nor => !(a || b),
            LogicOp::Xor => a != b,
            LogicOp::Xnor => a == b,
        };
        Some(value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogicOp::Not => "NOT",
            LogicOp::And => "AND",
            LogicOp::Or => "OR",
            LogicOp::Nand => "NAND",
            LogicOp::Nor => "NOR",
            LogicOp::Xor => "XOR",
            LogicOp::Xnor => "XNOR",
            LogicOp::Input => "INPUT",
            LogicOp::Output => "OUTPUT",
        }
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
