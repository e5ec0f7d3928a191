//! Convert command - lift the local types of a serialized module

use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use liftc_diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticEmitter, Diagnostics, JsonEmitter, SourceCache,
    TerminalEmitter,
};
use liftc_hir::{Module, PseudoCode};
use liftc_transform::{convert_local_types, ConvertedTypeInfo};
use liftc_types::TypeId;
use std::fs;
use std::path::PathBuf;

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Serialized module (JSON)
    pub input: PathBuf,

    /// Source file the module's positions refer to, for diagnostic snippets
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// How to print the converted module
    #[arg(long, value_enum, default_value = "pseudo")]
    pub emit: EmitKind,

    /// Write the converted module to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum EmitKind {
    /// Readable pseudo-code
    #[default]
    Pseudo,
    /// The module in the same JSON form it was loaded from
    Json,
}

pub fn run(args: ConvertArgs, format: OutputFormat, use_color: bool, quiet: bool) -> Result<()> {
    let json = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let mut source_cache = SourceCache::new();
    if let Some(source) = &args.source {
        let text = fs::read_to_string(source)
            .with_context(|| format!("Failed to read {}", source.display()))?;
        source_cache.add_file(source, text);
    }

    let mut diagnostics = Diagnostics::new();
    let converted = convert_module(&json, &mut diagnostics);

    if let Some((module, _)) = &converted {
        let rendered = render_module(module, args.emit)?;
        match &args.output {
            Some(path) => fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?,
            None => println!("{}", rendered),
        }
    }

    let info = converted.as_ref().map(|(_, info)| info);
    match format {
        OutputFormat::Text => {
            let mut emitter = TerminalEmitter::new(std::io::stderr().lock(), use_color);
            emitter.emit_all(&diagnostics, &source_cache)?;
            if !quiet {
                if let (Some((module, _)), Some(info)) = (&converted, info) {
                    print_lifted(module, info, use_color);
                }
                emitter.emit_summary(&diagnostics)?;
            }
        }
        OutputFormat::Json => {
            let mut emitter = JsonEmitter::new(std::io::stdout().lock());
            emitter.emit_all(&diagnostics, &source_cache)?;

            let lifted: Vec<serde_json::Value> = converted
                .iter()
                .flat_map(|(module, info)| {
                    info.types.iter().map(move |ty| {
                        serde_json::json!({
                            "type": type_name(module, ty.shape),
                            "after_members": ty.after_members.map(|id| id.0),
                        })
                    })
                })
                .collect();
            let summary = serde_json::json!({
                "type": "summary",
                "success": !diagnostics.has_errors(),
                "module": converted.as_ref().map(|(module, _)| module.name.clone()),
                "converted": lifted,
                "errors": diagnostics.error_count(),
                "warnings": diagnostics.warning_count(),
            });
            println!("{}", serde_json::to_string(&summary)?);
        }
    }

    if diagnostics.has_errors() {
        Err(anyhow!("Conversion failed with errors"))
    } else {
        Ok(())
    }
}

/// Load, convert and re-check a module. `None` if it could not be loaded.
fn convert_module(json: &str, diagnostics: &mut Diagnostics) -> Option<(Module, ConvertedTypeInfo)> {
    let mut module = match Module::from_json(json) {
        Ok(module) => module,
        Err(e) => {
            diagnostics.push(
                Diagnostic::error(DiagnosticCode::MalformedModule, format!("cannot load module: {}", e))
                    .with_help("the module must be the JSON form written by `Module::to_json`")
                    .build(),
            );
            return None;
        }
    };
    log::info!(
        "Loaded module {} ({} nodes, {} types)",
        module.name,
        module.tree.len(),
        module.types.len()
    );

    let info = convert_local_types(&mut module, diagnostics);
    log::info!("Lifted {} local type(s)", info.len());

    if let Err(e) = module.validate() {
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCode::InternalError,
                format!("conversion left module {} inconsistent: {}", module.name, e),
            )
            .build(),
        );
    }
    Some((module, info))
}

fn render_module(module: &Module, emit: EmitKind) -> Result<String> {
    Ok(match emit {
        EmitKind::Pseudo => PseudoCode::new(&module.tree)
            .with_types(&module.types)
            .render(module.root),
        EmitKind::Json => module.to_json()?,
    })
}

fn type_name(module: &Module, ty: TypeId) -> String {
    module
        .types
        .get(ty)
        .map_or_else(|| format!("type#{}", ty), |shape| shape.name.to_string())
}

fn print_lifted(module: &Module, info: &ConvertedTypeInfo, use_color: bool) {
    if info.is_empty() {
        eprintln!("No local types in {}", module.name);
        return;
    }
    let names: Vec<String> = info.types.iter().map(|ty| type_name(module, ty.shape)).collect();
    let label = format!("Lifted {} type(s)", info.len());
    if use_color {
        eprintln!("{}: {}", console::style(label).green().bold(), names.join(", "));
    } else {
        eprintln!("{}: {}", label, names.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftc_diagnostics::Span;
    use liftc_hir::{DeclNode, DeclRole, Planter};
    use liftc_types::{Abstractness, Symbol, Visibility};

    fn module_with_local_class() -> Module {
        let mut module = Module::new("demo");
        let class_name = module.names.unused_source_name("C");
        let c = module.types.define(class_name, "demo", Abstractness::Concrete);
        let f = module.names.unused_source_name("f");
        let local = module.names.unused_source_name("C");
        let field = module.names.unused_source_name("n");
        let property = DeclNode::new(
            field,
            DeclRole::Property {
                symbol: Symbol::new("n"),
                abstractness: Abstractness::Concrete,
            },
        )
        .with_visibility(Visibility::Public);
        let root = module.root;
        let planted = Planter::grow(&mut module.tree, Span::DUMMY, |p| {
            p.decl(DeclNode::local(f.clone()), |p| {
                p.fun(|p| {
                    p.block(|p| {
                        p.decl(DeclNode::local(local.clone()), |p| {
                            p.type_fun(c, |p| p.block(|p| p.bare_decl(property.clone())));
                        });
                    });
                });
            });
        });
        module.tree.insert_children(root, 0, planted);
        module
    }

    #[test]
    fn test_convert_module_lifts_types() {
        let json = module_with_local_class().to_json().unwrap();
        let mut diagnostics = Diagnostics::new();
        let (module, info) = convert_module(&json, &mut diagnostics).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(info.len(), 1);
        let rendered = render_module(&module, EmitKind::Pseudo).unwrap();
        assert!(rendered.contains("@fromType(C__0)"), "{}", rendered);
        assert!(rendered.contains("= C__0"), "{}", rendered);
    }

    #[test]
    fn test_malformed_module_is_a_diagnostic() {
        let mut diagnostics = Diagnostics::new();
        assert!(convert_module("{\"name\": 3}", &mut diagnostics).is_none());
        assert_eq!(diagnostics.with_code(DiagnosticCode::MalformedModule).count(), 1);
    }

    #[test]
    fn test_json_output_reloads() {
        let json = module_with_local_class().to_json().unwrap();
        let mut diagnostics = Diagnostics::new();
        let (module, _) = convert_module(&json, &mut diagnostics).unwrap();
        let emitted = render_module(&module, EmitKind::Json).unwrap();
        let reloaded = Module::from_json(&emitted).unwrap();
        assert_eq!(reloaded.tree.children(reloaded.root).len(), 2);
    }
}
