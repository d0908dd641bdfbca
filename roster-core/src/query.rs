//! Query construction and filtering API for document stores.
//!
//! This module provides query construction with filtering and projection, and a
//! visitor pattern for query execution across different backends.
//!
//! # Query Building
//!
//! Queries can be constructed using the fluent builder API:
//!
//! ```ignore
//! use roster_core::query::{Query, Filter, Projection};
//!
//! let query = Query::builder()
//!     .filter(Filter::eq("address.country", "Y").and(Filter::gte("age", 18)))
//!     .projection(Projection::exclude(["_id", "address"]))
//!     .build();
//! ```
//!
//! # Field Paths
//!
//! Field names may be dotted paths (`address.country`) that address a field
//! inside an embedded document.

use bson::{Bson, Document};

use crate::error::DocumentStoreError;

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    /// Equal to (exact match).
    Eq,
    /// Greater than or equal to.
    Gte,
}

/// A filter expression for querying documents.
///
/// Field comparisons are combined with `And` to build conjunctive predicates.
///
/// # Example
///
/// ```ignore
/// use roster_core::query::Filter;
///
/// let expr = Filter::and(vec![
///     Filter::eq("address.country", "Y"),
///     Filter::gte("age", 18),
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Field comparison expression.
    Field {
        /// The field path to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The value to compare against.
        value: Bson,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended
    /// to the list. Otherwise, a new AND expression is created.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }
}

/// Fields removed from every document a query returns.
///
/// Only exclusion projections are supported; everything not listed is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    excluded: Vec<String>,
}

impl Projection {
    /// A projection that keeps every field.
    pub fn all() -> Self {
        Self::default()
    }

    /// A projection that drops the given field paths.
    pub fn exclude<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }

    /// Removes the excluded paths from `document`.
    pub fn apply(&self, mut document: Document) -> Document {
        for path in &self.excluded {
            remove_path(&mut document, path);
        }

        document
    }
}

fn remove_path(document: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            document.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(nested)) = document.get_mut(head) {
                remove_path(nested, rest);
            }
        }
    }
}

/// Resolves a dotted field path inside `document`.
pub fn lookup_path<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    match path.split_once('.') {
        None => document.get(path),
        Some((head, rest)) => match document.get(head)? {
            Bson::Document(nested) => lookup_path(nested, rest),
            _ => None,
        },
    }
}

/// A structured query for retrieving and filtering documents.
///
/// Use [`QueryBuilder`] for ergonomic construction. An absent filter matches
/// every document in the collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Optional filter expression to match documents.
    pub filter: Option<Expr>,
    /// Fields removed from each returned document.
    pub projection: Projection,
}

impl Query {
    /// Creates a new empty query that matches everything and keeps every field.
    pub fn new() -> Self {
        Query {
            filter: None,
            projection: Projection::all(),
        }
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

/// Helper struct for constructing filter expressions.
///
/// All methods accept field names and values as `Into<String>` and `Into<Bson>` for ergonomics.
pub struct Filter;

impl Filter {
    /// Matches documents where the field equals the specified value.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// Matches documents where the field is greater than or equal to the specified value.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    /// Combines multiple expressions such that all must match for a document to be included.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Sets the filter expression for this query.
    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(filter);
        self
    }

    /// Sets or clears the filter expression.
    pub fn maybe_filter(mut self, filter: Option<Expr>) -> Self {
        self.query.filter = filter;
        self
    }

    /// Sets the projection applied to each returned document.
    pub fn projection(mut self, projection: Projection) -> Self {
        self.query.projection = projection;
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

pub trait QueryVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}
