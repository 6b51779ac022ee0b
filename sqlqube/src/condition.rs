//! WHERE predicates applied to a single column.
//!
//! A condition is an ordered, non-empty sequence of terms, each a logical
//! connective and a comparison operator, e.g. `year = ? OR year = ?`. The
//! connective of a term is printed only when some predicate precedes it in
//! the whole WHERE clause, so the first term of the first condition in a
//! query never prints one, while the first term of every later condition
//! joins it to the predicates before it.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connective {
    And,
    Or,
    Not,
}

impl Connective {
    pub fn keyword(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
            Connective::Not => "NOT",
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Like,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Eq => "=",
            Operator::Ge => ">=",
            Operator::Gt => ">",
            Operator::Like => "LIKE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub connective: Connective,
    pub operator: Operator,
}

/// A rendered condition together with the global index of its last term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCondition {
    pub sql: String,
    pub last_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConditionTerms")]
pub struct Condition {
    terms: Vec<Term>,
}

#[derive(Deserialize)]
struct ConditionTerms {
    terms: Vec<Term>,
}

impl TryFrom<ConditionTerms> for Condition {
    type Error = String;

    fn try_from(raw: ConditionTerms) -> Result<Self, Self::Error> {
        if raw.terms.is_empty() {
            return Err("condition needs at least one term".to_string());
        }
        Ok(Self { terms: raw.terms })
    }
}

impl Condition {
    pub fn new(connective: Connective, operator: Operator) -> Self {
        Self {
            terms: vec![Term {
                connective,
                operator,
            }],
        }
    }

    pub fn and(self, operator: Operator) -> Self {
        self.push(Connective::And, operator)
    }

    pub fn or(self, operator: Operator) -> Self {
        self.push(Connective::Or, operator)
    }

    pub fn not(self, operator: Operator) -> Self {
        self.push(Connective::Not, operator)
    }

    fn push(mut self, connective: Connective, operator: Operator) -> Self {
        self.terms.push(Term {
            connective,
            operator,
        });
        self
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Number of `?` placeholders this condition binds.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Render every term against `attribute`, numbering terms from
    /// `global_index` (0-based, counted across the whole WHERE clause).
    pub fn render(&self, attribute: &str, global_index: usize) -> RenderedCondition {
        let mut parts = Vec::with_capacity(self.terms.len());
        for (offset, term) in self.terms.iter().enumerate() {
            let predicate = format!("{attribute} {} ?", term.operator);
            if global_index + offset > 0 {
                parts.push(format!("{} {predicate}", term.connective));
            } else {
                parts.push(predicate);
            }
        }
        RenderedCondition {
            sql: parts.join(" "),
            last_index: self.last_index(global_index),
        }
    }

    /// Global index of the final term when the first one sits at
    /// `first_index`.
    pub fn last_index(&self, first_index: usize) -> usize {
        first_index + self.terms.len() - 1
    }

    /// 1-based parameter positions of every term, starting at `first_index`.
    pub fn param_indexes(&self, first_index: usize) -> Vec<usize> {
        (first_index..first_index + self.terms.len()).collect()
    }
}
