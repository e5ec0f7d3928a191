//! Explain command - explain diagnostic codes

use anyhow::{anyhow, Result};
use clap::Args;

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// Diagnostic code to explain (e.g., L001)
    pub code: String,
}

struct ErrorExplanation {
    code: &'static str,
    title: &'static str,
    description: &'static str,
    example: Option<&'static str>,
    suggestion: Option<&'static str>,
    related: &'static [&'static str],
}

const ERROR_EXPLANATIONS: &[ErrorExplanation] = &[
    // Local type lifting
    ErrorExplanation {
        code: "L001",
        title: "Cannot Capture Multiply Declared Variable",
        description: r#"A method of a local type uses a variable of an enclosing function, but that
variable's name is declared more than once in the enclosing code.

Captured variables are moved into a closure record built in the scope that
declares them. With two declarations there is no single scope to build it in,
so the variable is left as it was and the type keeps referring to it directly."#,
        example: Some(r#"let f = fn () {
  let x = 1;
  { let x = 2; }
  class C { let m = fn (this) { x } }
}"#),
        suggestion: Some("Give each declaration its own name before this pass runs."),
        related: &[],
    },
    ErrorExplanation {
        code: "L002",
        title: "Missing Member Visibility",
        description: r#"Members of a class (a concrete local type) must state their visibility before
the type can be lifted to module top level. The diagnostic lists every member
of the type that has none; it is reported once per type."#,
        example: Some("class C { let m = fn (this) {} }  // no @public/@protected/@private"),
        suggestion: Some("Mark each listed member public, protected or private."),
        related: &[],
    },
    ErrorExplanation {
        code: "L003",
        title: "Supertype Cycle",
        description: r#"A type reaches itself by following its supertypes. Closure record properties
are inherited along supertype edges, so the cycle is cut at the repeated type
and that type contributes no inherited properties."#,
        example: Some("interface I extends J {}\ninterface J extends I {}"),
        suggestion: Some("Remove one of the supertype edges."),
        related: &[],
    },
    // Module loading
    ErrorExplanation {
        code: "M001",
        title: "Malformed Module",
        description: r#"The serialized module could not be loaded: the JSON did not parse, or the
tree it describes breaks a structural rule (the root must be a parentless
block, every child must name its parent, type ids must refer to known shapes)."#,
        example: None,
        suggestion: Some("Regenerate the module with the producer that wrote it."),
        related: &["I001"],
    },
    // Internal errors
    ErrorExplanation {
        code: "I001",
        title: "Internal Error",
        description: "The pass produced a tree that fails the structural checks it was loaded with.",
        example: None,
        suggestion: Some("Report the problem together with the input module."),
        related: &["M001"],
    },
];

pub fn run(args: ExplainArgs, format: OutputFormat, use_color: bool) -> Result<()> {
    let code = args.code.to_uppercase();

    let explanation = find(&code).ok_or_else(|| anyhow!("Unknown diagnostic code: {}", code))?;

    match format {
        OutputFormat::Text => {
            if use_color {
                println!(
                    "\n{}: {}\n{}",
                    console::style(&code).bold().cyan(),
                    console::style(explanation.title).bold(),
                    "=".repeat(code.len() + explanation.title.len() + 2)
                );
            } else {
                println!(
                    "\n{}: {}\n{}",
                    code,
                    explanation.title,
                    "=".repeat(code.len() + explanation.title.len() + 2)
                );
            }

            println!("\n{}\n", explanation.description);

            if let Some(example) = explanation.example {
                if use_color {
                    println!("{}:", console::style("Example").bold());
                } else {
                    println!("Example:");
                }
                for line in example.lines() {
                    println!("  {}", line);
                }
                println!();
            }

            if let Some(suggestion) = explanation.suggestion {
                if use_color {
                    println!("{}:", console::style("Suggestion").bold().green());
                } else {
                    println!("Suggestion:");
                }
                for line in suggestion.lines() {
                    println!("  {}", line);
                }
                println!();
            }

            if !explanation.related.is_empty() {
                if use_color {
                    println!(
                        "{}: {}",
                        console::style("Related").dim(),
                        explanation.related.join(", ")
                    );
                } else {
                    println!("Related: {}", explanation.related.join(", "));
                }
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "code": explanation.code,
                "title": explanation.title,
                "description": explanation.description,
                "example": explanation.example,
                "suggestion": explanation.suggestion,
                "related": explanation.related,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn find(code: &str) -> Option<&'static ErrorExplanation> {
    ERROR_EXPLANATIONS.iter().find(|e| e.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftc_diagnostics::DiagnosticCode;

    #[test]
    fn test_every_code_is_explained() {
        for code in [
            DiagnosticCode::CannotCaptureMultiplyDeclared,
            DiagnosticCode::MissingMemberVisibility,
            DiagnosticCode::SupertypeCycle,
            DiagnosticCode::MalformedModule,
            DiagnosticCode::InternalError,
        ] {
            assert!(find(code.as_str()).is_some(), "{} has no explanation", code.as_str());
        }
    }

    #[test]
    fn test_related_codes_exist() {
        for explanation in ERROR_EXPLANATIONS {
            for related in explanation.related {
                assert!(find(related).is_some(), "{} -> {}", explanation.code, related);
                assert!(DiagnosticCode::from_code_str(related).is_some());
            }
        }
    }
}
