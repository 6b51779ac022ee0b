//! Compose parameterized SQL SELECT statements from a graph of views.
//!
//! Tables and previously built queries are registered in a [`Schema`]
//! together with the equi-join relations between them. A [`QueryBuilder`]
//! collects the columns a query needs, places each column's view in a join
//! tree, and renders the statement text along with the positions of its
//! `?` placeholders. A built [`QueryView`] can itself be registered in the
//! schema and joined as a nested source.

pub mod aliases;
pub mod condition;
pub mod config;
pub mod error;
pub mod query;
pub mod query_builder;
pub mod relations;
pub mod schema;
pub mod sql_types;
pub mod views;

pub use aliases::AliasAllocator;
pub use condition::{Condition, Connective, Operator};
pub use config::QubeConfig;
pub use error::{Result, SqlqubeError};
pub use query::{Query, QueryParam};
pub use query_builder::{BuildOptions, JoinKind, QueryBuilder, QueryView, SelectAttribute};
pub use relations::{AttributesPair, ViewsRelation};
pub use schema::Schema;
pub use sql_types::SqlType;
pub use views::{Aggregation, Attribute, TableView, View, ViewId, ViewRef};
