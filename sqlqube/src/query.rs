use serde::Serialize;

use crate::error::Result;
use crate::views::Attribute;

/// Placeholder positions bound to one conditioned attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParam {
    pub attribute: Attribute,
    /// 1-based positions of the attribute's `?` markers.
    pub positions: Vec<usize>,
}

/// A finished statement, ready to be bound by position and executed.
#[derive(Debug, Clone, Serialize)]
pub struct Query {
    statement: String,
    params: Vec<QueryParam>,
    select_attributes: Vec<Attribute>,
}

impl Query {
    pub(crate) fn new(
        statement: String,
        params: Vec<QueryParam>,
        select_attributes: Vec<Attribute>,
    ) -> Self {
        Self {
            statement,
            params,
            select_attributes,
        }
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// Parameters in the order their attributes were added to the builder.
    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    pub fn select_attributes(&self) -> &[Attribute] {
        &self.select_attributes
    }

    /// Positions bound to every parameter with the given output name, in
    /// add order. Empty when no conditioned attribute has that name.
    pub fn positions(&self, name: &str) -> Vec<usize> {
        self.params
            .iter()
            .filter(|param| param.attribute.db_name() == name)
            .flat_map(|param| param.positions.iter().copied())
            .collect()
    }

    pub fn placeholder_count(&self) -> usize {
        self.params.iter().map(|param| param.positions.len()).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
