use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::aliases::{AliasAllocator, ViewAlias};
use crate::error::{Result, SqlqubeError};
use crate::relations::ViewsRelation;
use crate::schema::Schema;
use crate::views::ViewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    #[default]
    Inner,
    LeftOuter,
}

impl JoinKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "JOIN",
            JoinKind::LeftOuter => "LEFT OUTER JOIN",
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    alias: ViewAlias,
    /// Relation to the parent node; `None` only for the root.
    relation: Option<ViewsRelation>,
    join: JoinKind,
    children: Vec<usize>,
}

/// FROM-clause join order for one query.
///
/// Nodes live in an arena; index 0 is the root once anything was placed.
/// A view joins under the first of its direct schema neighbours that is
/// already in the tree. There is no search through views that are not yet
/// placed.
#[derive(Debug, Clone, Default)]
pub struct JoinTree {
    nodes: Vec<Node>,
    placed: HashMap<ViewId, usize>,
    placements: usize,
}

impl JoinTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of views in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of joins placed under the root.
    pub fn placements(&self) -> usize {
        self.placements
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.placed.contains_key(&view)
    }

    /// Place `view` in the tree. Placing an already placed view is a no-op.
    pub fn add_join(
        &mut self,
        schema: &Schema,
        aliases: &AliasAllocator,
        view: ViewId,
        join: JoinKind,
    ) -> Result<()> {
        if self.nodes.is_empty() {
            let view_ref = schema.view(view)?.clone();
            let alias = ViewAlias::new(view_ref, aliases.next());
            tracing::debug!(view = %alias.view().name(), alias = %alias.alias(), "placing root view");
            self.nodes.push(Node {
                alias,
                relation: None,
                join: JoinKind::Inner,
                children: Vec::new(),
            });
            self.placed.insert(view, 0);
            return Ok(());
        }
        if self.placed.contains_key(&view) {
            return Ok(());
        }

        let view_ref = schema.view(view)?.clone();
        let parent = schema
            .related_views(view)?
            .into_iter()
            .find(|related| self.placed.contains_key(related));
        let Some(parent) = parent else {
            return Err(SqlqubeError::DisconnectedJoin(view_ref.name().to_string()));
        };

        let relation = schema.relation_between(parent, view)?.clone();
        let parent_idx = self.placed[&parent];
        let alias = ViewAlias::new(view_ref, aliases.next());
        tracing::debug!(
            view = %alias.view().name(),
            alias = %alias.alias(),
            parent = %self.nodes[parent_idx].alias.alias(),
            join = join.keyword(),
            "placing joined view"
        );
        let idx = self.nodes.len();
        self.nodes.push(Node {
            alias,
            relation: Some(relation),
            join,
            children: Vec::new(),
        });
        self.nodes[parent_idx].children.push(idx);
        self.placed.insert(view, idx);
        self.placements += 1;
        Ok(())
    }

    /// Alias assigned to a placed view.
    pub fn alias_of(&self, view: ViewId) -> Result<&str> {
        self.placed
            .get(&view)
            .map(|idx| self.nodes[*idx].alias.alias())
            .ok_or_else(|| SqlqubeError::UnknownView(format!("{view} is not part of the query")))
    }

    /// Render the FROM clause body, one join per line.
    pub fn render(&self) -> Result<String> {
        if self.nodes.is_empty() {
            return Ok(String::new());
        }
        self.render_node(0, None)
    }

    fn render_node(&self, idx: usize, parent: Option<&ViewAlias>) -> Result<String> {
        let node = &self.nodes[idx];
        let mut sql = format!("{} {}", node.alias.view().source()?, node.alias.alias());
        if let Some(relation) = &node.relation {
            let parent = parent.ok_or_else(|| {
                SqlqubeError::MissingAlias(format!(
                    "no parent alias to join {} on",
                    node.alias.view().name()
                ))
            })?;
            sql.push_str(" ON ");
            sql.push_str(&relation.render(parent, &node.alias)?);
        }
        for child in &node.children {
            let child_node = &self.nodes[*child];
            sql.push('\n');
            sql.push_str(child_node.join.keyword());
            sql.push(' ');
            sql.push_str(&self.render_node(*child, Some(&node.alias))?);
        }
        Ok(sql)
    }
}
