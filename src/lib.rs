//! Poststats: top-N statistics over line-delimited JSON post dumps
//!
//! Three independent statistics are computed from a JSONL corpus of posts:
//!
//! 1. **q1** -- The dates with the most posts, and the most active author on each
//! 2. **q2** -- The most used emoji across post text
//! 3. **q3** -- The most mentioned usernames
//!
//! # Architecture
//!
//! Each run flows through the same stages:
//!
//! - **Parsing** -- One JSON object per line; malformed lines are skipped and counted
//! - **Extraction** -- Pulls the fields a statistic needs, tolerating absent or mistyped ones
//! - **Aggregation** -- Either a streaming pass with running counts (memory bounded by
//!   distinct keys) or a bulk pass that buffers fields and sorts them (memory bounded by input)
//! - **Ranking** -- Top-N by count with a deterministic tie-break
//! - **Emitting** -- Shapes ranked results into `(date, user)` or `(key, count)` rows
//!
//! # Key Modules
//!
//! - [`parser`] -- Line decoding and the record iterator
//! - [`source`] -- Input opening with transparent BZ2 decompression
//! - [`extract`] -- Per-statistic field extraction and date parsing
//! - [`emoji`] -- Emoji code point ranges and tokenization policy
//! - [`aggregate`] -- Streaming and bulk count-table strategies
//! - [`rank`] -- Top-N selection and tie-breaking
//! - [`emit`] -- Result row shaping
//! - [`sink`] -- CSV and in-memory result sinks
//! - [`pipeline`] -- End-to-end runs over readers and files
//! - [`stats`] -- Per-pass counters
//! - [`config`] -- Constants and the optional JSON settings file
//!
//! # Example Usage
//!
//! ```bash
//! # Busiest dates, bounded-memory strategy
//! poststats run -q q1 -m streaming -i farmers-protest-tweets.json
//!
//! # Everything, written to CSV
//! poststats run -q all -i tweets.json.bz2 -o results/
//!
//! # Check that both strategies agree
//! poststats compare -i tweets.json
//! ```

pub mod aggregate;
pub mod config;
pub mod emit;
pub mod emoji;
pub mod extract;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod rank;
pub mod sink;
pub mod source;
pub mod stats;
