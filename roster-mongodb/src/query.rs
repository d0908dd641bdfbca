//! Query translation from roster's query AST to MongoDB query syntax.
//!
//! This module translates abstract query expressions and projections into
//! MongoDB BSON documents for execution by the MongoDB query engine.

use bson::{Document, Bson, doc};

use roster_core::{
    query::{QueryVisitor, Expr, FieldOp, Projection},
    error::DocumentStoreError,
};


/// Translates query expressions into MongoDB query documents.
///
/// This struct implements the [`QueryVisitor`] trait to convert abstract
/// query expressions into MongoDB's native BSON query syntax. Dotted field
/// paths pass through unchanged since MongoDB resolves them natively.
pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    /// Renders an optional filter, matching everything when absent.
    pub fn filter_document(filter: Option<&Expr>) -> Result<Document, DocumentStoreError> {
        match filter {
            Some(expr) => MongoQueryTranslator.visit_expr(expr),
            None => Ok(doc! {}),
        }
    }

    /// Renders an exclusion projection, or `None` when every field is kept.
    pub fn projection_document(projection: &Projection) -> Option<Document> {
        if projection.is_empty() {
            return None;
        }

        Some(
            projection
                .excluded()
                .iter()
                .map(|field| (field.clone(), Bson::Int32(0)))
                .collect()
        )
    }
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Gte => doc! { "$gte": value },
            }
        })
    }
}
