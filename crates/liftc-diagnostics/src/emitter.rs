//! Diagnostic emitters for different output formats.

use crate::diagnostic::{Diagnostic, Diagnostics, Severity};
use crate::source_cache::SourceCache;
use std::io::Write;

/// Trait for emitting diagnostics in various formats.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic, cache: &SourceCache) -> std::io::Result<()>;

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &Diagnostics, cache: &SourceCache) -> std::io::Result<()> {
        for diag in diagnostics.iter() {
            self.emit(diag, cache)?;
        }
        Ok(())
    }

    /// Emit a summary line.
    fn emit_summary(&mut self, diagnostics: &Diagnostics) -> std::io::Result<()>;
}

/// Terminal output with optional ANSI colors.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colored: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, colored: bool) -> Self {
        Self { writer, colored }
    }

    fn paint(&self, code: &'static str) -> &'static str {
        if self.colored {
            code
        } else {
            ""
        }
    }

    fn severity_color(&self, severity: Severity) -> &'static str {
        self.paint(match severity {
            Severity::Error => "\x1b[31m",
            Severity::Warning => "\x1b[33m",
            Severity::Hint => "\x1b[34m",
        })
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic, cache: &SourceCache) -> std::io::Result<()> {
        let color = self.severity_color(diagnostic.severity);
        let reset = self.paint("\x1b[0m");
        let bold = self.paint("\x1b[1m");
        let cyan = self.paint("\x1b[36m");

        // error[L001]: message
        writeln!(
            self.writer,
            "{}{}{}[{}]{}: {}",
            bold,
            color,
            diagnostic.severity.as_str(),
            diagnostic.code.as_str(),
            reset,
            diagnostic.message
        )?;

        if let Some(loc) = cache.location(diagnostic.span) {
            writeln!(self.writer, "  {}-->{} {}", cyan, reset, loc)?;
            if let Some(line_text) = cache
                .get_file(diagnostic.span.file_id)
                .and_then(|file| file.line_text(loc.line))
            {
                let gutter = loc.line.to_string();
                let padding = " ".repeat(gutter.len());
                let underline_len = (diagnostic.span.len().max(1) as usize)
                    .min(line_text.len().saturating_sub(loc.column as usize - 1))
                    .max(1);
                writeln!(self.writer, "{} {}|{}", padding, cyan, reset)?;
                writeln!(self.writer, "{}{} |{} {}", cyan, gutter, reset, line_text)?;
                writeln!(
                    self.writer,
                    "{} {}|{} {}{}{}{}",
                    padding,
                    cyan,
                    reset,
                    " ".repeat(loc.column as usize - 1),
                    color,
                    "^".repeat(underline_len),
                    reset
                )?;
            }
        }

        for label in &diagnostic.labels {
            match cache.location(label.span) {
                Some(loc) => writeln!(
                    self.writer,
                    "  {}note{}: {} ({})",
                    cyan, reset, label.message, loc
                )?,
                None => writeln!(self.writer, "  {}note{}: {}", cyan, reset, label.message)?,
            }
        }

        if let Some(ref explanation) = diagnostic.explanation {
            writeln!(self.writer, "  {}= help:{} {}", cyan, reset, explanation)?;
        }

        writeln!(self.writer)?;
        Ok(())
    }

    fn emit_summary(&mut self, diagnostics: &Diagnostics) -> std::io::Result<()> {
        let errors = diagnostics.error_count();
        let warnings = diagnostics.warning_count();
        if errors == 0 && warnings == 0 {
            return Ok(());
        }

        let color = if errors > 0 {
            self.severity_color(Severity::Error)
        } else {
            self.severity_color(Severity::Warning)
        };
        let reset = self.paint("\x1b[0m");
        let plural = |n: usize| if n == 1 { "" } else { "s" };

        write!(self.writer, "{}", color)?;
        if errors > 0 {
            write!(self.writer, "{} error{}", errors, plural(errors))?;
        }
        if errors > 0 && warnings > 0 {
            write!(self.writer, " and ")?;
        }
        if warnings > 0 {
            write!(self.writer, "{} warning{}", warnings, plural(warnings))?;
        }
        writeln!(self.writer, " emitted{}", reset)
    }
}

/// JSON lines output for tooling integration.
pub struct JsonEmitter<W: Write> {
    writer: W,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> DiagnosticEmitter for JsonEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic, cache: &SourceCache) -> std::io::Result<()> {
        let loc = cache.location(diagnostic.span);

        let json = serde_json::json!({
            "code": diagnostic.code.as_str(),
            "severity": diagnostic.severity.as_str(),
            "message": diagnostic.message,
            "location": loc.map(|l| serde_json::json!({
                "file": l.file,
                "line": l.line,
                "column": l.column,
            })),
            "span": if diagnostic.span.is_dummy() {
                serde_json::Value::Null
            } else {
                serde_json::json!({
                    "start": diagnostic.span.start,
                    "end": diagnostic.span.end,
                })
            },
            "values": diagnostic.values,
            "help": diagnostic.explanation,
        });

        serde_json::to_writer(&mut self.writer, &json)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn emit_summary(&mut self, diagnostics: &Diagnostics) -> std::io::Result<()> {
        let summary = serde_json::json!({
            "type": "summary",
            "errors": diagnostics.error_count(),
            "warnings": diagnostics.warning_count(),
            "hints": diagnostics.hint_count(),
            "total": diagnostics.len(),
        });
        serde_json::to_writer(&mut self.writer, &summary)?;
        writeln!(self.writer)?;
        Ok(())
    }
}

/// Plain `file:line:col: severity: message [code]` lines.
pub struct SimpleEmitter<W: Write> {
    writer: W,
}

impl<W: Write> SimpleEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> DiagnosticEmitter for SimpleEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic, cache: &SourceCache) -> std::io::Result<()> {
        if let Some(loc) = cache.location(diagnostic.span) {
            write!(self.writer, "{}: ", loc)?;
        }
        writeln!(
            self.writer,
            "{}: {} [{}]",
            diagnostic.severity.as_str(),
            diagnostic.message,
            diagnostic.code.as_str()
        )
    }

    fn emit_summary(&mut self, diagnostics: &Diagnostics) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{} error(s), {} warning(s)",
            diagnostics.error_count(),
            diagnostics.warning_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCode;
    use crate::span::Span;

    #[test]
    fn test_json_emitter_writes_one_line_per_diagnostic() {
        let mut cache = SourceCache::new();
        let file = cache.add_file("m.lift", "let x;\nlet x;\n".to_string());
        let mut sink = Diagnostics::new();
        sink.push(
            Diagnostic::new(DiagnosticCode::CannotCaptureMultiplyDeclared, "x declared twice")
                .with_span(Span::new(file, 7, 12))
                .with_value("x__0")
                .build(),
        );

        let mut out = Vec::new();
        JsonEmitter::new(&mut out).emit_all(&sink, &cache).unwrap();
        let text = String::from_utf8(out).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(parsed["code"], "L001");
        assert_eq!(parsed["location"]["line"], 2);
        assert_eq!(parsed["values"][0], "x__0");
    }

    #[test]
    fn test_terminal_emitter_without_color_has_no_escapes() {
        let cache = SourceCache::new();
        let mut sink = Diagnostics::new();
        sink.push(Diagnostic::new(DiagnosticCode::SupertypeCycle, "I extends I").build());

        let mut out = Vec::new();
        {
            let mut emitter = TerminalEmitter::new(&mut out, false);
            emitter.emit_all(&sink, &cache).unwrap();
            emitter.emit_summary(&sink).unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("warning[L003]: I extends I"));
        assert!(text.contains("1 warning emitted"));
        assert!(!text.contains('\x1b'));
    }
}
