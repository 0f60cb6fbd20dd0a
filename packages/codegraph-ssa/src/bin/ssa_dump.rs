//! SSA Dump CLI
//!
//! Lower a TypeScript/JavaScript file and print its SSA form.
//!
//! # Usage
//!
//! ```bash
//! # Functions, blocks and values as text
//! cargo run --bin ssa-dump -- src/app.ts
//!
//! # Blueprints and diagnostics as JSON, strict preset
//! cargo run --bin ssa-dump -- src/app.ts --preset strict --format json
//!
//! # Settings from a YAML v1 file
//! cargo run --bin ssa-dump -- src/app.ts --config ssa.yaml
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use codegraph_ssa::config::{BuildConfig, Preset};
use codegraph_ssa::features::lowering::application::build_named_source;
use codegraph_ssa::features::ssa::domain::Terminator;
use codegraph_ssa::{CodegraphError, SsaUnit};

#[derive(Parser)]
#[command(name = "ssa-dump")]
#[command(about = "Print the SSA form of a TypeScript/JavaScript file", long_about = None)]
struct Cli {
    /// Source file to lower
    file: PathBuf,

    /// Build preset (lenient, balanced, strict)
    #[arg(short, long, default_value = "balanced")]
    preset: String,

    /// YAML v1 configuration file; overrides --preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Exit with a failure status when any error diagnostic is reported
    #[arg(long)]
    fail_on_error: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(unit) if cli.fail_on_error && unit.errors().next().is_some() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> codegraph_ssa::Result<SsaUnit> {
    let config = load_config(cli)?;
    let name = cli.file.display().to_string();
    let source = std::fs::read_to_string(&cli.file)
        .map_err(|e| CodegraphError::from(e).with_file(name.as_str()))?;
    let unit = build_named_source(&name, &source, &config)?;

    match cli.format {
        OutputFormat::Text => print_text(&unit),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json_report(&unit))?),
    }
    Ok(unit)
}

fn load_config(cli: &Cli) -> codegraph_ssa::Result<BuildConfig> {
    let config = match &cli.config {
        Some(path) => BuildConfig::from_yaml(path)?,
        None => BuildConfig::preset(Preset::from_str(&cli.preset)?).build()?,
    };
    Ok(config)
}

fn print_text(unit: &SsaUnit) {
    let program = unit.program();
    for function in unit.functions() {
        let params: Vec<String> = function.params.iter().map(|&p| unit.render(p)).collect();
        println!("function {}({})", function.name, params.join(", "));
        for &block_id in &function.blocks {
            let Some(block) = program.block(block_id) else {
                continue;
            };
            let preds: Vec<String> = block.preds.iter().map(|p| p.to_string()).collect();
            println!("  {} {} <- [{}]", block.id, block.name, preds.join(", "));
            for &value in block.phis.iter().chain(block.instructions.iter()) {
                let ty = unit
                    .ty(value)
                    .map(|t| format!(" : {}", t.full_name()))
                    .unwrap_or_default();
                println!("    {} = {}{}", value, unit.render(value), ty);
            }
            if let Some(terminator) = &block.terminator {
                println!("    {}", render_terminator(unit, terminator));
            }
        }
        println!();
    }

    for bp in unit.blueprints().iter() {
        let parents: Vec<String> = bp
            .parents
            .iter()
            .filter_map(|&p| unit.blueprints().get(p).map(|b| b.name.clone()))
            .collect();
        println!(
            "{:?} {} extends [{}]: {} entries",
            bp.kind,
            bp.name,
            parents.join(", "),
            bp.table_size()
        );
    }

    for diagnostic in unit.diagnostics() {
        println!("{}", diagnostic);
    }
}

fn render_terminator(unit: &SsaUnit, terminator: &Terminator) -> String {
    match terminator {
        Terminator::Jump(target) => format!("jump {}", target),
        Terminator::If {
            cond,
            then_block,
            else_block,
        } => format!("if {} then {} else {}", unit.render(*cond), then_block, else_block),
        Terminator::Loop {
            cond, body, exit, ..
        } => format!("loop {} body {} exit {}", unit.render(*cond), body, exit),
        Terminator::Switch {
            discriminant,
            cases,
            default,
        } => format!(
            "switch {} ({} cases) default {}",
            unit.render(*discriminant),
            cases.len(),
            default
        ),
        Terminator::Return(value) => format!("return {}", unit.render(*value)),
        Terminator::ErrorHandler {
            try_block, done, ..
        } => format!("try {} done {}", try_block, done),
    }
}

fn json_report(unit: &SsaUnit) -> serde_json::Value {
    let functions: Vec<serde_json::Value> = unit
        .functions()
        .iter()
        .map(|f| {
            serde_json::json!({
                "name": f.name,
                "params": f.param_names,
                "blocks": f.blocks.len(),
                "returnType": f.return_type.as_ref().map(|t| t.full_name()),
            })
        })
        .collect();
    let exports: serde_json::Map<String, serde_json::Value> = unit
        .exports()
        .values
        .iter()
        .map(|(name, &value)| (name.clone(), serde_json::Value::String(unit.render(value))))
        .collect();

    serde_json::json!({
        "unit": unit.name(),
        "values": unit.program().graph.len(),
        "functions": functions,
        "blueprints": unit.blueprints().iter().collect::<Vec<_>>(),
        "exports": exports,
        "diagnostics": unit.diagnostics(),
        "stopped": unit.is_stopped(),
    })
}
