use serde::{Deserialize, Serialize};

use crate::aliases::AliasAllocator;
use crate::error::{Result, SqlqubeError};
use crate::query::Query;
use crate::schema::Schema;

mod join_tree;
mod query_view;
mod select;
mod validation;

pub use join_tree::{JoinKind, JoinTree};
pub use query_view::QueryView;
pub use select::{SelectAttribute, SelectAttributeBuilder};

/// Rendering and naming options carried by every view a builder creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Name given to the view behind [`QueryBuilder::build`].
    pub default_view_name: String,
    /// Start FROM, WHERE, GROUP BY and ORDER BY on their own lines.
    pub multiline: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            default_view_name: "Query".to_string(),
            multiline: false,
        }
    }
}

/// Accumulates selected attributes and the join tree they need, then
/// turns them into a [`QueryView`] or a [`Query`].
pub struct QueryBuilder<'a> {
    schema: &'a Schema,
    aliases: &'a AliasAllocator,
    options: BuildOptions,
    attributes: Vec<SelectAttribute>,
    tree: JoinTree,
    failure: Option<String>,
}

impl<'a> QueryBuilder<'a> {
    /// Builder drawing aliases from the process-wide allocator.
    pub fn new(schema: &'a Schema) -> Self {
        Self::with_aliases(schema, AliasAllocator::global())
    }

    pub fn with_aliases(schema: &'a Schema, aliases: &'a AliasAllocator) -> Self {
        Self {
            schema,
            aliases,
            options: BuildOptions::default(),
            attributes: Vec::new(),
            tree: JoinTree::new(),
            failure: None,
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn attributes(&self) -> &[SelectAttribute] {
        &self.attributes
    }

    pub fn tree(&self) -> &JoinTree {
        &self.tree
    }

    /// Add an attribute, inner-joining its view if it is not in the query yet.
    pub fn add(&mut self, attribute: SelectAttribute) -> Result<()> {
        self.add_joined(attribute, JoinKind::Inner)
    }

    /// Add an attribute, left-outer-joining its view if it is not in the
    /// query yet.
    pub fn add_outer(&mut self, attribute: SelectAttribute) -> Result<()> {
        self.add_joined(attribute, JoinKind::LeftOuter)
    }

    /// Add an attribute with an explicit join kind. A view that has no
    /// direct relation to any view already in the query fails the builder
    /// for good.
    pub fn add_joined(&mut self, attribute: SelectAttribute, join: JoinKind) -> Result<()> {
        self.ensure_usable()?;
        let view = attribute.attribute().view();
        if let Err(err) = self.tree.add_join(self.schema, self.aliases, view, join) {
            if let SqlqubeError::DisconnectedJoin(name) = &err {
                self.failure = Some(name.clone());
            }
            return Err(err);
        }
        self.attributes.push(attribute);
        Ok(())
    }

    /// Validate the attribute set and wrap it into a reusable view.
    pub fn create_view(self, name: impl Into<String>) -> Result<QueryView> {
        self.ensure_usable()?;
        validation::validate_projection(&self.attributes)?;
        let name = name.into();
        tracing::debug!(
            view = %name,
            attributes = self.attributes.len(),
            joins = self.tree.placements(),
            "creating query view"
        );
        Ok(QueryView::new(name, self.attributes, self.tree, self.options))
    }

    /// Validate and render straight to an executable query.
    pub fn build(self) -> Result<Query> {
        let name = self.options.default_view_name.clone();
        self.create_view(name)?.query()
    }

    fn ensure_usable(&self) -> Result<()> {
        match &self.failure {
            Some(name) => Err(SqlqubeError::DisconnectedJoin(name.clone())),
            None => Ok(()),
        }
    }
}
