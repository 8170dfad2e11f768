//! Feed retrieval and parsing.
//!
//! - **Fetching**: one GET per source URL, primary first, then the proxy mirror
//! - **Parsing**: Atom or RSS XML into normalized [`Article`] records
//!
//! # Architecture
//!
//! - [`fetcher`] - HTTP retrieval with per-request timeout and fallback sources
//! - [`parser`] - Feed-family detection and per-entry field extraction
//! - [`xml`] - Namespace-aware element tree the parsers query
//!
//! # Example
//!
//! ```ignore
//! use feedsnap::feed::{build_client, fetch_feed, parse_feed, ParseOptions};
//!
//! let client = build_client(&config)?;
//! let bytes = fetch_feed(&client, &config.sources(), config.timeout()).await?;
//! let result = parse_feed(&bytes, &ParseOptions::default())?;
//! ```

pub mod fetcher;
pub mod parser;
pub mod xml;

pub use fetcher::{build_client, fetch_feed, fetch_one, ClientBuildError, FetchError, TransportError};
pub use parser::{
    parse_atom, parse_feed, parse_rss, Article, FeedKind, ParseError, ParseOptions, ParseResult,
    ATOM_NS,
};
