//! Local annotation server: renders batches of CSV tasks into an HTML form
//! and appends the submitted records to an output CSV.

pub mod compiler;
pub mod config;
pub mod error;
pub mod render;
pub mod runtime;
pub mod server;
pub mod store;
pub mod submission;

pub use compiler::template::Template;
pub use config::Config;
pub use error::{Result, TurkError};
pub use runtime::service::{Page, TurkService};
pub use runtime::workflow::Workflow;
pub use store::{Record, TabularStore};
