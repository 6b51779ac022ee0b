//! Views and their attributes.
//!
//! A view is anything that can appear as a FROM-clause source: either a
//! base table or a previously built query. Views are immutable once
//! constructed and are shared as [`ViewRef`]. Identity is the [`ViewId`]
//! handed out at construction, never structural equality, so two tables
//! with the same name are still two different views.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SqlqubeError};
use crate::query_builder::{QueryView, SelectAttributeBuilder};
use crate::sql_types::SqlType;

pub type ViewRef = Arc<View>;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ViewId(u64);

impl ViewId {
    pub(crate) fn next() -> Self {
        ViewId(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub enum View {
    Table(TableView),
    Query(QueryView),
}

impl View {
    pub fn id(&self) -> ViewId {
        match self {
            View::Table(t) => t.id(),
            View::Query(q) => q.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            View::Table(t) => t.name(),
            View::Query(q) => q.name(),
        }
    }

    /// Text usable in a FROM clause: the table name, or the parenthesized
    /// statement of a query view.
    pub fn source(&self) -> Result<String> {
        match self {
            View::Table(t) => Ok(t.source().to_string()),
            View::Query(q) => q.source(),
        }
    }

    pub fn attribute(&self, name: &str) -> Result<Attribute> {
        match self {
            View::Table(t) => t.attribute(name),
            View::Query(q) => q.attribute(name),
        }
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        match self {
            View::Table(t) => t.attributes(),
            View::Query(q) => q.attributes(),
        }
    }

    pub fn attribute_names(&self) -> Vec<String> {
        match self {
            View::Table(t) => t.attribute_names(),
            View::Query(q) => q.attribute_names(),
        }
    }

    pub fn as_table(&self) -> Option<&TableView> {
        match self {
            View::Table(t) => Some(t),
            View::Query(_) => None,
        }
    }

    pub fn as_query(&self) -> Option<&QueryView> {
        match self {
            View::Query(q) => Some(q),
            View::Table(_) => None,
        }
    }

    pub fn into_ref(self) -> ViewRef {
        Arc::new(self)
    }
}

impl From<TableView> for View {
    fn from(table: TableView) -> Self {
        View::Table(table)
    }
}

impl From<QueryView> for View {
    fn from(query: QueryView) -> Self {
        View::Query(query)
    }
}

/// A base table known to the database under `source`.
#[derive(Debug, Clone)]
pub struct TableView {
    id: ViewId,
    name: String,
    source: String,
    attributes: BTreeMap<String, Attribute>,
}

impl TableView {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: ViewId::next(),
            name: name.into(),
            source: source.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(self, db_name: impl Into<String>, sql_type: SqlType) -> Self {
        self.with_attribute_def(db_name.into(), None, sql_type)
    }

    /// Add a column that carries its own user-facing name.
    pub fn with_named_attribute(
        self,
        db_name: impl Into<String>,
        user_name: impl Into<String>,
        sql_type: SqlType,
    ) -> Self {
        self.with_attribute_def(db_name.into(), Some(user_name.into()), sql_type)
    }

    fn with_attribute_def(
        mut self,
        db_name: String,
        user_name: Option<String>,
        sql_type: SqlType,
    ) -> Self {
        let attribute = Attribute {
            view: self.id,
            view_name: self.name.clone(),
            db_name: db_name.clone(),
            user_name,
            sql_type,
        };
        self.attributes.insert(db_name, attribute);
        self
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Look up a column by its database name.
    pub fn attribute(&self, name: &str) -> Result<Attribute> {
        self.attributes
            .get(name)
            .cloned()
            .ok_or_else(|| SqlqubeError::UnknownAttribute {
                view: self.name.clone(),
                name: name.to_string(),
            })
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        self.attributes.values().cloned().collect()
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }
}

/// A column belonging to exactly one view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Attribute {
    view: ViewId,
    view_name: String,
    db_name: String,
    user_name: Option<String>,
    sql_type: SqlType,
}

impl Attribute {
    pub(crate) fn new(
        view: ViewId,
        view_name: impl Into<String>,
        db_name: impl Into<String>,
        user_name: Option<String>,
        sql_type: SqlType,
    ) -> Self {
        Self {
            view,
            view_name: view_name.into(),
            db_name: db_name.into(),
            user_name,
            sql_type,
        }
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    /// `<view name>.<db name>`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.view_name, self.db_name)
    }

    /// Start describing how one query uses this column.
    pub fn select(&self) -> SelectAttributeBuilder {
        SelectAttributeBuilder::new(self.clone())
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.user_name {
            Some(user) => write!(f, "{} ({user})", self.full_name()),
            None => write!(f, "{}", self.full_name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
}

impl Aggregation {
    pub fn render(&self, expr: &str) -> String {
        match self {
            Aggregation::Count => format!("COUNT({expr})"),
            Aggregation::CountDistinct => format!("COUNT(DISTINCT {expr})"),
            Aggregation::Sum => format!("SUM({expr})"),
            Aggregation::Avg => format!("AVG({expr})"),
            Aggregation::Min => format!("MIN({expr})"),
            Aggregation::Max => format!("MAX({expr})"),
        }
    }

    /// Type of the aggregated value given the column's type.
    pub fn result_type(&self, input: SqlType) -> SqlType {
        match self {
            Aggregation::Count | Aggregation::CountDistinct => SqlType::INTEGER,
            Aggregation::Avg => SqlType::DOUBLE,
            Aggregation::Sum | Aggregation::Min | Aggregation::Max => input,
        }
    }
}
