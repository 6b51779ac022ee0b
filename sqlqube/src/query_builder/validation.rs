//! Aggregation / grouping consistency of a SELECT list.
//!
//! Over the visible attributes, one of these must hold:
//! - nothing is grouped and nothing is aggregated;
//! - nothing is grouped and every visible column is aggregated;
//! - every visible column is either a grouping key or an aggregate, never
//!   both, and there is at least one of each.

use std::collections::HashSet;

use crate::error::{Result, SqlqubeError};

use super::select::SelectAttribute;

pub(crate) fn validate_projection(attributes: &[SelectAttribute]) -> Result<()> {
    let mut visible: HashSet<usize> = HashSet::new();
    let mut grouped: HashSet<usize> = HashSet::new();
    let mut aggregated: HashSet<usize> = HashSet::new();
    for (idx, attr) in attributes.iter().enumerate() {
        if !attr.is_visible() {
            continue;
        }
        visible.insert(idx);
        if attr.aggregation().is_some() {
            aggregated.insert(idx);
        }
        if attr.is_group_by() {
            grouped.insert(idx);
        }
    }

    check(
        !visible.is_empty(),
        "query selects no visible attributes".to_string(),
    )?;

    if grouped.is_empty() && aggregated.is_empty() {
        return Ok(());
    }
    if grouped.is_empty() {
        return check(
            visible == aggregated,
            format!(
                "{} visible attribute(s) are neither aggregated nor grouped",
                visible.len() - aggregated.len()
            ),
        );
    }
    if aggregated.is_empty() {
        return Err(SqlqubeError::InconsistentProjection(
            "group by without any aggregated attribute".to_string(),
        ));
    }

    check(
        grouped.is_disjoint(&aggregated),
        "an attribute is both grouped and aggregated".to_string(),
    )?;
    let covered: HashSet<usize> = grouped.union(&aggregated).copied().collect();
    check(
        visible == covered,
        format!(
            "{} visible attribute(s) are neither aggregated nor grouped",
            visible.len() - covered.len()
        ),
    )
}

fn check(condition: bool, message: String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(SqlqubeError::InconsistentProjection(message))
    }
}
