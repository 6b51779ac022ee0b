use crate::error::{Result, SqlqubeError};
use crate::query::{Query, QueryParam};
use crate::sql_types::SqlType;
use crate::views::{Attribute, ViewId};

use super::join_tree::JoinTree;
use super::select::SelectAttribute;
use super::BuildOptions;

/// A finished query that can be executed or used as a FROM source of
/// another query.
///
/// Its visible attributes become the view's attributes, named by their
/// output names. Conditions apply only when the view is rendered as the
/// executed statement; as a nested source it renders without WHERE.
#[derive(Debug, Clone)]
pub struct QueryView {
    id: ViewId,
    name: String,
    attributes: Vec<SelectAttribute>,
    tree: JoinTree,
    options: BuildOptions,
}

impl QueryView {
    pub(crate) fn new(
        name: String,
        attributes: Vec<SelectAttribute>,
        tree: JoinTree,
        options: BuildOptions,
    ) -> Self {
        Self {
            id: ViewId::next(),
            name,
            attributes,
            tree,
            options,
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn select_attributes(&self) -> &[SelectAttribute] {
        &self.attributes
    }

    pub fn tree(&self) -> &JoinTree {
        &self.tree
    }

    /// The statement without WHERE, parenthesized for use in a FROM clause.
    pub fn source(&self) -> Result<String> {
        Ok(format!("({})", self.render(false)?))
    }

    pub fn attribute(&self, name: &str) -> Result<Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.is_visible())
            .find(|a| a.output_name() == name)
            .map(|a| self.exposed(a))
            .ok_or_else(|| SqlqubeError::UnknownAttribute {
                view: self.name.clone(),
                name: name.to_string(),
            })
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.is_visible())
            .map(|a| self.exposed(a))
            .collect()
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|a| a.is_visible())
            .map(|a| a.output_name().to_string())
            .collect()
    }

    /// The statement with its WHERE clause, its parameters and output
    /// attributes.
    pub fn query(&self) -> Result<Query> {
        let statement = self.render(true)?;
        tracing::trace!(view = %self.name, sql = %statement, "rendered query");
        Ok(Query::new(statement, self.params(), self.attributes()))
    }

    /// Render the statement. `with_params` controls the WHERE clause.
    pub fn render(&self, with_params: bool) -> Result<String> {
        let mut select = Vec::new();
        let mut where_parts = Vec::new();
        let mut group_by = Vec::new();
        let mut order_by = Vec::new();
        let mut next_index = 0;

        for attr in &self.attributes {
            let alias = self.tree.alias_of(attr.attribute().view())?;
            if attr.is_visible() {
                select.push(attr.query_name(alias));
            }
            if attr.is_group_by() {
                // Raw column only: an aggregate or ` as name` is not valid in GROUP BY.
                group_by.push(attr.plain_name(alias));
            }
            if attr.is_order_by() {
                order_by.push(attr.order_by_name(alias));
            }
            if let (true, Some(condition)) = (with_params, attr.condition()) {
                let rendered = condition.render(&attr.plain_name(alias), next_index);
                where_parts.push(rendered.sql);
                next_index = rendered.last_index + 1;
            }
        }

        let sep = if self.options.multiline { "\n" } else { " " };
        let mut sql = format!(
            "SELECT {}{sep}FROM {}",
            select.join(", "),
            self.tree.render()?
        );
        if !where_parts.is_empty() {
            sql.push_str(&format!("{sep}WHERE {}", where_parts.join(" ")));
        }
        if !group_by.is_empty() {
            sql.push_str(&format!("{sep}GROUP BY {}", group_by.join(", ")));
        }
        if !order_by.is_empty() {
            sql.push_str(&format!("{sep}ORDER BY {}", order_by.join(", ")));
        }
        Ok(sql)
    }

    /// Parameter positions per conditioned attribute, numbered from 1 in
    /// add order. Hidden attributes count too.
    fn params(&self) -> Vec<QueryParam> {
        let mut next_position = 1;
        let mut params = Vec::new();
        for attr in &self.attributes {
            let Some(condition) = attr.condition() else {
                continue;
            };
            let positions = condition.param_indexes(next_position);
            next_position += positions.len();
            params.push(QueryParam {
                attribute: self.exposed(attr),
                positions,
            });
        }
        params
    }

    fn exposed(&self, attr: &SelectAttribute) -> Attribute {
        Attribute::new(
            self.id,
            self.name.clone(),
            attr.output_name(),
            None,
            exposed_type(attr),
        )
    }
}

fn exposed_type(attr: &SelectAttribute) -> SqlType {
    let column_type = attr.attribute().sql_type();
    match attr.aggregation() {
        Some(agg) => agg.result_type(column_type),
        None => column_type,
    }
}
