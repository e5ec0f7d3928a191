//! Diagnostic infrastructure for liftc.
//!
//! Passes never abort on user errors. They push structured [`Diagnostic`]s
//! into a [`Diagnostics`] sink and keep going; whoever owns the sink decides
//! whether the result is fatal.
//!
//! # Example
//!
//! ```
//! use liftc_diagnostics::{
//!     Diagnostic, DiagnosticCode, DiagnosticEmitter, Diagnostics, SimpleEmitter, SourceCache,
//!     Span,
//! };
//!
//! let mut cache = SourceCache::new();
//! let file_id = cache.add_file("demo.lift", "let f(x) { class C {} }".to_string());
//!
//! let mut sink = Diagnostics::new();
//! sink.push(
//!     Diagnostic::new(DiagnosticCode::MissingMemberVisibility, "member lacks visibility")
//!         .with_span(Span::new(file_id, 11, 18))
//!         .build(),
//! );
//!
//! let mut out = Vec::new();
//! SimpleEmitter::new(&mut out).emit_all(&sink, &cache).unwrap();
//! assert!(String::from_utf8(out).unwrap().starts_with("demo.lift:1:12: error"));
//! ```

pub mod diagnostic;
pub mod emitter;
pub mod source_cache;
pub mod span;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Diagnostics, RelatedInfo, Severity};
pub use emitter::{DiagnosticEmitter, JsonEmitter, SimpleEmitter, TerminalEmitter};
pub use source_cache::{SourceCache, SourceFile};
pub use span::{FileId, Label, Location, Span};
