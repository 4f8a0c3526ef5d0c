//! Recovery services: collaborator traits, production adapters, and the
//! extraction / classification / enrichment / aggregation pipeline.

pub mod aggregate;
pub mod backends;
pub mod classify;
pub mod extract;
pub mod metadata;
pub mod pipeline;
pub mod tools;
