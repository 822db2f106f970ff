//! Diagnostic store implementations.
//!
//! Available backends:
//! - `MemoryDiagnosticStore` - In-memory bundles (testing and dry runs)
//! - `FsDiagnosticStore` - `<id>_<tag>.png` / `.html` files in a directory

pub mod fs;
pub mod memory;

pub use fs::FsDiagnosticStore;
pub use memory::MemoryDiagnosticStore;
