//! Domain models
//!
//! Named entity types for the Credo service. Every row coming out of the
//! database maps into one of these structs; no positional tuples cross a
//! module boundary.

pub mod article;
pub mod report;
pub mod user;

pub use article::{Article, Label, RankedArticle};
pub use report::{Report, ReportView, ResolveAction, Resolution};
pub use user::{User, UserRole, GUEST_USERNAME};
