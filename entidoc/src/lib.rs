//! # Entidoc - Entity Repository over a Partitioned Document Store
//!
//! Entidoc is a repository operations layer that maps a persistent-entity
//! abstraction onto a schemaless, partitioned NoSQL document database. It
//! turns typed entities into wire document trees, routes operations by
//! partition key, and executes parametrized queries through a pluggable
//! client seam.
//!
//! ## Key Features
//!
//! - **Entity Mapping**: Typed entities convert to and from document trees
//!   through the [`common::Convertible`] seam
//! - **Concurrency Tokens**: Declared version fields map onto the store's
//!   reserved `_etag` field, with if-match preconditions on mutations
//! - **Partition Routing**: Partition key values are derived from entity
//!   metadata and the encoded document tree
//! - **Provisioning**: Databases and containers are created on demand with
//!   create-if-not-exists semantics and configurable throughput
//! - **Prepared Queries**: Parametrized query execution with declaration-order
//!   binding, auto-population and value-converter hooks
//! - **Streaming Results**: Lazy, single-pass typed result streams
//! - **Clean API**: PIMPL pattern provides stable, encapsulated interface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use entidoc::config::DatabaseConfiguration;
//! use entidoc::metadata::{EntityDescriptor, PersistentProperty, IdKind};
//! use entidoc::query::ParameterBinder;
//! use entidoc::repository::{InsertOperation, RepositoryOperations};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = EntityDescriptor::new("book")
//!     .identity(PersistentProperty::new("id").generated(IdKind::String))
//!     .property(PersistentProperty::new("title"))
//!     .build();
//!
//! let operations = RepositoryOperations::initialize(
//!     client,
//!     &DatabaseConfiguration::new("mydb"),
//!     &[root.clone()],
//!     ParameterBinder::new(),
//! )?;
//!
//! let persisted = operations.persist(InsertOperation::new(book, root.clone()))?;
//! let found = operations.find_one_by_id::<Book>(&root, &persisted_id)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Pattern
//!
//! Entidoc uses the **PIMPL (Pointer To IMPLementation)** design pattern:
//! facade types like [`repository::RepositoryOperations`] are cheap to clone
//! and share their state through an inner `Arc`, keeping the public surface
//! stable while the implementation evolves.
//!
//! ## Module Organization
//!
//! - [`client`] - The document client seam implemented by the store driver
//! - [`common`] - Document trees, values, conversion traits and constants
//! - [`config`] - Database-level configuration
//! - [`container`] - Container property resolution and provisioning
//! - [`errors`] - Error types and result definitions
//! - [`metadata`] - Entity descriptors, properties and container annotations
//! - [`query`] - Prepared queries and parameter binding
//! - [`repository`] - The repository operations facade

pub mod client;
pub mod common;
pub mod config;
pub mod container;
pub mod errors;
pub mod metadata;
pub mod query;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;
