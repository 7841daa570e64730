//! # Rota Core Library
//!
//! A task tracker built around recurring chores: task definitions carry an
//! optional recurrence rule (weekly on a weekday, or monthly on a day of the
//! month), and the generation engine materializes concrete, datable
//! instances of each definition into the future.
//!
//! ## Features
//!
//! - **Recurrence Generation**: weekly and monthly rules expanded into
//!   pending instances, bounded by a configurable count cap and lookahead
//!   horizon, without duplicating or disturbing completed work
//! - **Idempotent Regeneration**: rule edits purge only future pending
//!   instances and re-materialize; history is preserved
//! - **Settings Overrides**: generation caps resolved from a key/value
//!   store with built-in fallbacks
//! - **Transactional Composition**: generation runs inside the caller's
//!   transaction so instance creation commits with the surrounding write
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`repository`]: Data access layer with Repository pattern
//! - [`recurrence`]: Recurrence schedule computation and generation caps
//! - [`settings`]: Resolution of engine tunables from the override store
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rota_core::{
//!     db,
//!     models::{NewDefinitionData, RuleSpec},
//!     repository::{DefinitionRepository, SqliteRepository},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = db::establish_connection("rota.db").await?;
//!     let repo = SqliteRepository::new(pool);
//!
//!     // A weekly chore, due every Friday; the first batch of instances
//!     // is generated in the same transaction.
//!     let data = NewDefinitionData {
//!         title: "Water the plants".to_string(),
//!         rule: Some(RuleSpec::weekly(5)),
//!         ..Default::default()
//!     };
//!
//!     let definition = repo.add_definition(data).await?;
//!     println!("Created definition: {}", definition.title);
//!
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod repository;
pub mod settings;
