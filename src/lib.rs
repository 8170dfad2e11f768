//! Snapshots an RSS/Atom feed as a JSON document for a static site.
//!
//! One run fetches the feed (falling back to a proxy mirror), normalizes its
//! entries into [`feed::Article`] records and writes them, stamped with the
//! current time, to a JSON file. See [`pipeline::run`].

pub mod config;
pub mod feed;
pub mod output;
pub mod pipeline;
pub mod util;
