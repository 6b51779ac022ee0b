//! Equi-join predicates between two views.

use crate::aliases::ViewAlias;
use crate::error::{Result, SqlqubeError};
use crate::views::{Attribute, ViewId};

/// `first = second`, where the two attributes live in different views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributesPair {
    first: Attribute,
    second: Attribute,
}

impl AttributesPair {
    pub fn new(first: Attribute, second: Attribute) -> Result<Self> {
        if first.view() == second.view() {
            return Err(SqlqubeError::MismatchedRelation(format!(
                "{} and {} belong to the same view",
                first.full_name(),
                second.full_name()
            )));
        }
        Ok(Self { first, second })
    }

    pub fn first(&self) -> &Attribute {
        &self.first
    }

    pub fn second(&self) -> &Attribute {
        &self.second
    }

    pub fn contains_view(&self, view: ViewId) -> bool {
        self.first.view() == view || self.second.view() == view
    }

    /// The attribute on the side opposite to `view`.
    pub fn related_attribute(&self, view: ViewId) -> Result<&Attribute> {
        if view == self.first.view() {
            Ok(&self.second)
        } else if view == self.second.view() {
            Ok(&self.first)
        } else {
            Err(self.mismatch(view))
        }
    }

    /// The attribute that belongs to `view`.
    pub fn attribute_of(&self, view: ViewId) -> Result<&Attribute> {
        if view == self.first.view() {
            Ok(&self.first)
        } else if view == self.second.view() {
            Ok(&self.second)
        } else {
            Err(self.mismatch(view))
        }
    }

    /// Render `left.col = right.col` using the aliases of both sides.
    pub fn render(&self, left: &ViewAlias, right: &ViewAlias) -> Result<String> {
        Ok(format!(
            "{} = {}",
            self.join_name(left)?,
            self.join_name(right)?
        ))
    }

    fn join_name(&self, alias: &ViewAlias) -> Result<String> {
        let attribute = self.attribute_of(alias.view().id())?;
        Ok(format!("{}.{}", alias.alias(), attribute.db_name()))
    }

    fn mismatch(&self, view: ViewId) -> SqlqubeError {
        SqlqubeError::MismatchedRelation(format!(
            "view {view} does not match pair {} = {}",
            self.first.full_name(),
            self.second.full_name()
        ))
    }
}

/// One or more pairs connecting the same two views, rendered as
/// predicates joined by `AND`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewsRelation {
    pairs: Vec<AttributesPair>,
}

impl ViewsRelation {
    pub fn new(pairs: Vec<AttributesPair>) -> Result<Self> {
        let first = pairs.first().ok_or_else(|| {
            SqlqubeError::MismatchedRelation("relation needs at least one pair".to_string())
        })?;
        let (a, b) = (first.first().view(), first.second().view());
        for pair in &pairs[1..] {
            if !(pair.contains_view(a) && pair.contains_view(b)) {
                return Err(SqlqubeError::MismatchedRelation(format!(
                    "pair {} = {} does not connect the same views as the rest of the relation",
                    pair.first().full_name(),
                    pair.second().full_name()
                )));
            }
        }
        Ok(Self { pairs })
    }

    /// Single-column relation.
    pub fn between(first: Attribute, second: Attribute) -> Result<Self> {
        Self::new(vec![AttributesPair::new(first, second)?])
    }

    pub fn pairs(&self) -> &[AttributesPair] {
        &self.pairs
    }

    /// The two views this relation connects.
    pub fn views(&self) -> (ViewId, ViewId) {
        let pair = &self.pairs[0];
        (pair.first().view(), pair.second().view())
    }

    pub fn touches(&self, view: ViewId) -> bool {
        self.pairs[0].contains_view(view)
    }

    /// The view on the other end of the relation from `view`.
    pub fn related_view(&self, view: ViewId) -> Result<ViewId> {
        Ok(self.pairs[0].related_attribute(view)?.view())
    }

    pub fn render(&self, left: &ViewAlias, right: &ViewAlias) -> Result<String> {
        let predicates = self
            .pairs
            .iter()
            .map(|pair| pair.render(left, right))
            .collect::<Result<Vec<_>>>()?;
        Ok(predicates.join(" AND "))
    }
}
