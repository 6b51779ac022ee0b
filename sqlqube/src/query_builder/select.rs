use crate::condition::Condition;
use crate::views::{Aggregation, Attribute};

/// A column as used by one query: visibility, ordering, grouping,
/// aggregation and an optional WHERE condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectAttribute {
    attribute: Attribute,
    visible: bool,
    order_by: bool,
    group_by: bool,
    condition: Option<Condition>,
    aggregation: Option<Aggregation>,
    alias_name: Option<String>,
}

impl SelectAttribute {
    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_order_by(&self) -> bool {
        self.order_by
    }

    pub fn is_group_by(&self) -> bool {
        self.group_by
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn aggregation(&self) -> Option<Aggregation> {
        self.aggregation
    }

    /// User-facing name: the select alias, else the attribute's own one.
    pub fn user_name(&self) -> Option<&str> {
        self.alias_name
            .as_deref()
            .or_else(|| self.attribute.user_name())
    }

    /// Name of the column in the query's output.
    pub fn output_name(&self) -> &str {
        self.user_name().unwrap_or(self.attribute.db_name())
    }

    /// `<alias>.<column>`
    pub fn plain_name(&self, view_alias: &str) -> String {
        format!("{view_alias}.{}", self.attribute.db_name())
    }

    /// SELECT list entry: the plain name, aggregated if requested, with
    /// ` as <name>` when a user-facing name exists.
    pub fn query_name(&self, view_alias: &str) -> String {
        let plain = self.plain_name(view_alias);
        let expr = match self.aggregation {
            Some(agg) => agg.render(&plain),
            None => plain,
        };
        match self.user_name() {
            Some(user) => format!("{expr} as {user}"),
            None => expr,
        }
    }

    /// ORDER BY entry: the output name when there is one.
    pub fn order_by_name(&self, view_alias: &str) -> String {
        match self.user_name() {
            Some(user) => user.to_string(),
            None => self.plain_name(view_alias),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectAttributeBuilder {
    attribute: Attribute,
    visible: bool,
    order_by: bool,
    group_by: bool,
    condition: Option<Condition>,
    aggregation: Option<Aggregation>,
    alias_name: Option<String>,
}

impl SelectAttributeBuilder {
    pub(crate) fn new(attribute: Attribute) -> Self {
        Self {
            attribute,
            visible: true,
            order_by: false,
            group_by: false,
            condition: None,
            aggregation: None,
            alias_name: None,
        }
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_order_by(mut self, order_by: bool) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_group_by(mut self, group_by: bool) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_aggregate(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn with_alias_name(mut self, alias: impl Into<String>) -> Self {
        self.alias_name = Some(alias.into());
        self
    }

    pub fn build(self) -> SelectAttribute {
        SelectAttribute {
            attribute: self.attribute,
            visible: self.visible,
            order_by: self.order_by,
            group_by: self.group_by,
            condition: self.condition,
            aggregation: self.aggregation,
            alias_name: self.alias_name,
        }
    }
}
