//! The relation graph: views as nodes, join relations as edges.
//!
//! The graph grows one edge at a time and every new edge must attach a new
//! view to one that is already registered, so in construction order it is
//! a forest. Only one-hop lookups are offered; the join tree never needs
//! more than a view's direct neighbours.

use std::collections::HashMap;

use crate::error::{Result, SqlqubeError};
use crate::relations::ViewsRelation;
use crate::views::{ViewId, ViewRef};

#[derive(Debug, Default, Clone)]
pub struct Schema {
    views: HashMap<ViewId, ViewRef>,
    order: Vec<ViewId>,
    relations: HashMap<ViewId, Vec<ViewsRelation>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view without any incident relation.
    pub fn add_root(&mut self, view: ViewRef) -> Result<()> {
        self.ensure_new(&view)?;
        tracing::debug!(view = %view.name(), "registering root view");
        self.insert(view, Vec::new());
        Ok(())
    }

    /// Register `view` attached through `relation` to a view already in the
    /// graph.
    pub fn add_view(&mut self, view: ViewRef, relation: ViewsRelation) -> Result<()> {
        self.ensure_new(&view)?;
        let related = relation.related_view(view.id())?;
        let related_relations = self.relations.get_mut(&related).ok_or_else(|| {
            SqlqubeError::UnknownView(format!(
                "{related} (related to {}) is not registered",
                view.name()
            ))
        })?;
        related_relations.push(relation.clone());
        tracing::debug!(
            view = %view.name(),
            related = %related,
            "registering view"
        );
        self.insert(view, vec![relation]);
        Ok(())
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.views.contains_key(&view)
    }

    pub fn view(&self, view: ViewId) -> Result<&ViewRef> {
        self.views
            .get(&view)
            .ok_or_else(|| SqlqubeError::UnknownView(view.to_string()))
    }

    /// Views in registration order.
    pub fn views(&self) -> impl Iterator<Item = &ViewRef> {
        self.order.iter().filter_map(|id| self.views.get(id))
    }

    /// Relations incident to `view`, in the order they were added.
    pub fn relations_of(&self, view: ViewId) -> Result<&[ViewsRelation]> {
        self.relations
            .get(&view)
            .map(Vec::as_slice)
            .ok_or_else(|| SqlqubeError::UnknownView(view.to_string()))
    }

    /// Views one edge away from `view`, in the order their relations were
    /// added.
    pub fn related_views(&self, view: ViewId) -> Result<Vec<ViewId>> {
        self.relations_of(view)?
            .iter()
            .map(|relation| relation.related_view(view))
            .collect()
    }

    /// First relation of `view` that touches `other`.
    pub fn relation_between(&self, view: ViewId, other: ViewId) -> Result<&ViewsRelation> {
        self.relations_of(view)?
            .iter()
            .find(|relation| relation.touches(other))
            .ok_or_else(|| {
                SqlqubeError::MismatchedRelation(format!(
                    "views {view} and {other} are not related"
                ))
            })
    }

    pub fn find_by_name(&self, name: &str) -> Option<&ViewRef> {
        self.views().find(|view| view.name() == name)
    }

    fn ensure_new(&self, view: &ViewRef) -> Result<()> {
        if self.contains(view.id()) {
            return Err(SqlqubeError::DuplicateView(view.name().to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, view: ViewRef, relations: Vec<ViewsRelation>) {
        let id = view.id();
        self.order.push(id);
        self.views.insert(id, view);
        self.relations.insert(id, relations);
    }
}
