//! Translation of listing query parameters into a store query.

use serde::Deserialize;

use roster_core::query::{Expr, Filter, Query};

use crate::student::summary_projection;

/// Optional query parameters accepted by the listing endpoint.
///
/// An empty `country` or an `age` of zero constrains nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StudentFilter {
    pub country: Option<String>,
    pub age: Option<i64>,
}

impl StudentFilter {
    /// Builds the filter expression, or `None` when every record matches.
    pub fn to_expr(&self) -> Option<Expr> {
        let mut clauses = Vec::new();

        if let Some(country) = self.country.as_deref().filter(|country| !country.is_empty()) {
            clauses.push(Filter::eq("address.country", country));
        }

        if let Some(age) = self.age.filter(|age| *age != 0) {
            clauses.push(Filter::gte("age", age));
        }

        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Filter::and(clauses)),
        }
    }

    /// Builds the listing query: the filter plus the summary projection.
    pub fn into_query(self) -> Query {
        Query::builder()
            .maybe_filter(self.to_expr())
            .projection(summary_projection())
            .build()
    }
}
