//! querygate - A read-only, queryable HTTP API over structured record
//! collections
//!
//! URL query parameters are translated into typed filter/sort/pagination
//! predicates against a declared schema; matched records are reduced to a
//! format-agnostic primitive tree and rendered as JSON, JSONP, XML, or CSV.

pub mod api;
pub mod cli;
pub mod config;
pub mod executor;
pub mod fixtures;
pub mod query;
pub mod record;
pub mod render;
pub mod schema;
pub mod serialize;
