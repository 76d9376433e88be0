//! kiep: single-article web archiver.
//!
//! One invocation fetches a page, derives a readable rendering, captures a
//! self-contained offline snapshot, submits the URL to the Wayback Machine,
//! and commits all artifacts plus a metadata record into a dated directory
//! under the configured archive root.

pub mod assemble;
pub mod bundle;
pub mod config;
pub mod constants;
pub mod download;
pub mod error;
pub mod extract;
pub mod fullpage;
pub mod pipeline;
pub mod readable;
pub mod record;
pub mod templates;
pub mod wayback;
