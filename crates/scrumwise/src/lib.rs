//! Client for the Scrumwise API
//!
//! Mirrors the account snapshot (`getData`) into an in-memory object graph and
//! batches write calls for later execution.
//!
//! ## Object graph
//! - `data` - ScrumwiseData (root: persons and projects)
//! - `project`, `backlog_item`, `task`, `tag` - entity types and their domain calls
//! - `collection` - EntityCollection, the id-keyed container with merge and lookups
//! - `entity` - Entity trait, ObjectKind and EntityId
//! - `models` - wire fragments
//!
//! ## Calls
//! - `requests` - ApiCall (one API endpoint invocation)
//! - `queue` - RequestQueue with fail-fast batch execution
//! - `client` - Transport, HttpTransport and Connection
//! - `session` - Session, tying the graph, the queue and the connection together
//! - `fake` - FakeTransport, a scripted transport for tests and offline use

pub mod backlog_item;
pub mod client;
pub mod collection;
pub mod config;
pub mod data;
pub mod entity;
pub mod error;
pub mod fake;
pub mod logging;
pub mod models;
pub mod project;
pub mod queue;
pub mod requests;
pub mod session;
pub mod tag;
pub mod task;

pub use backlog_item::BacklogItem;
pub use client::{ApiResponse, Connection, HttpRequest, HttpResponse, HttpTransport, Transport};
pub use collection::{EntityCollection, Selection};
pub use config::ScrumwiseConfig;
pub use data::ScrumwiseData;
pub use entity::{Entity, EntityId, ObjectKind};
pub use error::{Result, ScrumwiseError};
pub use fake::FakeTransport;
pub use logging::{LoggingConfig, init_logging};
pub use project::Project;
pub use queue::{CallBatch, RequestQueue};
pub use requests::ApiCall;
pub use session::Session;
pub use tag::Tag;
pub use task::Task;
