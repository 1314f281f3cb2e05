//! # vaultdrop server
//!
//! HTTP surface of the envelope store. Clients upload ciphertext produced
//! by `vaultdrop-core` together with its envelope metadata; the server
//! assigns an id, persists both through a [`Store`](vaultdrop_store::Store)
//! and hands them back on request. It never holds a private key.
//!
//! ## Routes
//!
//! | Method | Path        | Response |
//! |--------|-------------|----------|
//! | POST   | `/upload`   | `{message, id, metadata}` |
//! | GET    | `/file/:id` | blob body, record in `X-Metadata` (base64 JSON) |
//! | GET    | `/list`     | JSON array of records |

pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;

pub use config::{AllowedOrigins, ServerConfig};
pub use error::{ApiError, ConfigError};
pub use routes::{router, AppState, UploadResponse, METADATA_HEADER};
