//! HTTP integration.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, trace + timeout layers)
//!     → layer.rs (SassCompiler: maybe compile, then forward)
//!     → ServeDir (reads the freshly written CSS)
//!     → Send to client
//! ```

pub mod layer;
pub mod server;

pub use layer::{SassCompiler, SassLayer};
pub use server::DevServer;
