//! Ordered dispatch rules mapping an array variant onto its JSON form.
//!
//! Several variants match more than one rule (an empty struct is still a
//! struct, a 1x1 char is also a row string), so the first matching rule in
//! [`PRECEDENCE`] wins and the order is part of the output format.

use std::fmt;

use crate::mat::ArrayNode;

/// One dispatch rule of the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Zero-element cell, numeric or char in a field: `{}`, `[]` or `""`
    Empty,
    /// Single-row char array in a field: the decoded string
    RowString,
    /// Single-element numeric or sparse matrix in a field: boolean, number or
    /// `"+{imag}j"`
    ScalarMatrix,
    /// Struct or object struct: `"type"` line plus, for scalars, every field
    Struct,
    /// Function handle: `"function_handle"` and `"content"`
    FunctionHandle,
    /// Foreign object in a field: `"{dims} {class} ({tag})"`
    Foreign,
    /// Anything else in a field: `"{dims} {type}"`
    Fallback,
}

/// Evaluation order of the rules
pub const PRECEDENCE: [Rule; 7] = [
    Rule::Empty,
    Rule::RowString,
    Rule::ScalarMatrix,
    Rule::Struct,
    Rule::FunctionHandle,
    Rule::Foreign,
    Rule::Fallback,
];

impl Rule {
    /// Whether this rule applies to `node`.
    ///
    /// `in_field` is true when the node is rendered as the value of a named
    /// field; top-level variables have no field context.
    pub fn matches(&self, node: &ArrayNode, in_field: bool) -> bool {
        match self {
            Rule::Empty => {
                in_field
                    && node.is_empty()
                    && matches!(
                        node,
                        ArrayNode::Cell(_)
                            | ArrayNode::Matrix(_)
                            | ArrayNode::Sparse(_)
                            | ArrayNode::Char(_)
                    )
            }
            Rule::RowString => in_field && matches!(node, ArrayNode::Char(c) if c.rows() == 1),
            Rule::ScalarMatrix => {
                in_field
                    && matches!(node, ArrayNode::Matrix(_) | ArrayNode::Sparse(_))
                    && node.num_elements() == 1
            }
            Rule::Struct => matches!(node, ArrayNode::Struct(_)),
            Rule::FunctionHandle => matches!(node, ArrayNode::FunctionHandle(_)),
            Rule::Foreign => in_field && matches!(node, ArrayNode::Opaque(_)),
            Rule::Fallback => in_field,
        }
    }

    /// First rule in [`PRECEDENCE`] that applies, if any
    pub fn classify(node: &ArrayNode, in_field: bool) -> Option<Rule> {
        PRECEDENCE
            .iter()
            .copied()
            .find(|rule| rule.matches(node, in_field))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::Empty => "empty",
            Rule::RowString => "row-string",
            Rule::ScalarMatrix => "scalar-matrix",
            Rule::Struct => "struct",
            Rule::FunctionHandle => "function-handle",
            Rule::Foreign => "foreign",
            Rule::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// Dimensions joined with `x`, e.g. `2x3`
pub fn dim_string(dims: &[usize]) -> String {
    dims.iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join("x")
}
