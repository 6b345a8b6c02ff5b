//! Open star cluster catalogs
//!
//! This crate provides read-only access to the two catalogs the dashboard
//! works with:
//!
//! - the reference **Hunt** catalog, stored as two parquet tables (one row per
//!   cluster, one row per member star), see [`store`]
//! - the internally fitted **our** catalog, a `;`-delimited text table plus one
//!   photometry file per cluster, see [`our_catalog`]
//!
//! Both catalogs are loaded once and never mutated. Lookups go through name
//! indexes built at load time. Joins between the catalogs are keyed strictly by
//! exact cluster-name equality, see [`compare`].

pub mod compare;
pub mod membership;
pub mod our_catalog;
pub mod records;
pub mod store;
pub mod table;

use std::path::PathBuf;
use thiserror::Error;

pub use compare::{compare_catalogs, intersect_names, CatalogComparison, ParameterPairs};
pub use membership::{order_by_probability, probability_order};
pub use our_catalog::{load_our_members, OurCatalog, OurClusterRecord, OurMemberStar};
pub use records::{ClusterKind, ClusterParameters, ClusterRecord, MemberStar};
pub use store::{ClusterTable, MemberTable};

/// Errors raised while loading or querying catalog tables
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("delimited table error: {0}")]
    Delimited(#[from] csv::Error),

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("column '{column}' cannot be read as {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    #[error("row {row} has no cluster name")]
    MissingName { row: usize },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
