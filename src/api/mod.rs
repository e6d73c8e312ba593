//! HTTP stats view.
//!
//! Serves read-only, paginated JSON projections of the pool stats cache.
//! Built on Axum; every endpoint takes `pageNumber` and `pageSize` query
//! parameters and answers `{ "data": [...], "count": total }`.

mod pagination;
mod server;

pub use server::{serve, ApiConfig};
