#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` carries the two output channels used while selecting a
//! fill-segment kernel and benchmarking Argon2:
//!
//! - [`ProgressSink`]: human-readable, labelled progress lines written to an
//!   optional [`io::Write`](std::io::Write) target. Output is best effort.
//! - [`init_tracing`]: structured diagnostics through `tracing`, filtered by
//!   `RUST_LOG` or a [`LogConfig`] fallback directive.
//!
//! # Invariants
//!
//! - A disabled sink never touches a writer.
//! - A write failure disables the sink instead of surfacing an error.
//! - Every progress message ends in exactly one newline.
//!
//! # Examples
//!
//! ```
//! use logging::ProgressSink;
//!
//! let mut sink = ProgressSink::with_label(Vec::new(), "[libargon2] ");
//! sink.line(format_args!("  Done!"));
//!
//! let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
//! assert_eq!(output, "[libargon2]   Done!\n");
//! ```

mod config;
mod sink;
mod tracing_bridge;

pub use config::{DEFAULT_DIRECTIVE, LogConfig};
pub use sink::ProgressSink;
pub use tracing_bridge::init_tracing;
