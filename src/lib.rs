//! Stratum wire codec and stats view for a Decred mining pool.
//!
//! The heart of the crate is [`stratum`]: the message envelope, typed codecs
//! for the five `mining.*` methods, and the block-header assembler that
//! reconstructs solved Decred headers from submissions while compensating for
//! the byte-layout quirks of specific ASIC models. [`chain`] carries the
//! fixed binary header format the assembler targets, and [`api`] serves the
//! paginated JSON projection of the pool's stats [`cache`].
//!
//! Connection handling, share accounting, persistent storage, and payment
//! processing live outside this crate; the codec is pure and the stats view
//! only reads cache snapshots.

pub mod api;
pub mod cache;
pub mod chain;
pub mod daemon;
pub mod stratum;
pub mod tracing;
