//! Text and date normalization shared by the feed parsers and the writer.
//!
//! - **Text**: HTML fragments from feeds reduced to single-line plain text
//! - **Dates**: RFC-822 feed dates normalized to ISO-8601 UTC
//!
//! # Examples
//!
//! ```
//! use feedsnap::util::{rfc822_to_iso8601, strip_html};
//!
//! assert_eq!(strip_html("<p>Hello &amp; world</p>"), "Hello & world");
//! assert_eq!(
//!     rfc822_to_iso8601("Tue, 02 Jan 2024 03:04:05 GMT"),
//!     "2024-01-02T03:04:05+00:00"
//! );
//! ```

mod date;
mod text;

pub use date::{now_iso8601, rfc822_to_iso8601};
pub use text::{collapse_whitespace, strip_html};
