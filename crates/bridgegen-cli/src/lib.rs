//! Library interface for the bridgegen CLI

use anyhow::{Context, Result};
use bridgegen_codegen::{BindingGenerator, GenerationOutput, GeneratorConfig};
use bridgegen_core::{DeclarationSet, MemberKind, MemberSymbols};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default config file looked up next to the declarations when `--config`
/// is not given.
pub const CONFIG_FILE_NAME: &str = "bridgegen.toml";

pub fn load_declarations(input: &Path) -> Result<DeclarationSet> {
    DeclarationSet::load(input)
        .with_context(|| format!("Failed to load declarations: {:?}", input))
}

/// Explicit path, else `bridgegen.toml` beside `input`, else defaults.
pub fn load_config(explicit: Option<&Path>, input: &Path) -> Result<GeneratorConfig> {
    let implicit = input.parent().map(|dir| dir.join(CONFIG_FILE_NAME));
    match (explicit, implicit) {
        (Some(path), _) => GeneratorConfig::load(path)
            .with_context(|| format!("Failed to load config: {:?}", path)),
        (None, Some(path)) if path.is_file() => {
            debug!("Using config found beside the input: {:?}", path);
            GeneratorConfig::load(&path)
                .with_context(|| format!("Failed to load config: {:?}", path))
        }
        _ => Ok(GeneratorConfig::default()),
    }
}

pub fn run_generator(input: &Path, config: Option<&Path>) -> Result<GenerationOutput> {
    let set = load_declarations(input)?;
    let config = load_config(config, input)?;
    let output = BindingGenerator::new(config)
        .generate_set(&set)
        .context("Binding generation failed")?;
    Ok(output)
}

/// Files written by [`handle_generate`].
#[derive(Debug, Clone, Default)]
pub struct GenerateSummary {
    pub written: Vec<PathBuf>,
    pub members: usize,
    pub diagnostics: usize,
    /// Grouped diagnostic summary, when anything was skipped.
    pub report: Option<String>,
}

pub fn handle_generate(
    input: &Path,
    output_dir: &Path,
    config: Option<&Path>,
    allow_diagnostics: bool,
) -> Result<GenerateSummary> {
    info!("Generating bindings from {:?}", input);
    let output = run_generator(input, config)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut summary = GenerateSummary {
        members: output.member_count(),
        diagnostics: output.diagnostics.count(),
        report: output
            .diagnostics
            .has_errors()
            .then(|| output.diagnostics.format_summary()),
        ..GenerateSummary::default()
    };
    for unit in &output.units {
        let path = output_dir.join(&unit.file_name);
        fs::write(&path, &unit.source)
            .with_context(|| format!("Failed to write output: {:?}", path))?;
        debug!("Wrote {:?} ({} members)", path, unit.members.len());
        summary.written.push(path);
    }

    info!(
        "Generated {} members in {} files under {:?}",
        summary.members,
        summary.written.len(),
        output_dir
    );

    if !allow_diagnostics {
        output.check()?;
    } else if let Some(report) = &summary.report {
        warn!("Skipped declarations:\n{}", report);
    }
    Ok(summary)
}

/// Run every check without writing anything.
pub fn handle_check(input: &Path, config: Option<&Path>) -> Result<GenerationOutput> {
    info!("Checking declarations in {:?}", input);
    let output = run_generator(input, config)?;
    output.check()?;
    info!(
        "{} declarations bind cleanly to {} types",
        output.member_count(),
        output.units.len()
    );
    Ok(output)
}

/// One row of the `symbols` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolRow {
    pub container: String,
    pub member: String,
    pub kind: MemberKind,
    pub entry_point: String,
    pub function: String,
}

/// Entry points every declaration would bind to, legal or not.
pub fn handle_symbols(input: &Path, config: Option<&Path>) -> Result<Vec<SymbolRow>> {
    let set = load_declarations(input)?;
    let config = load_config(config, input)?;
    Ok(set
        .declarations
        .iter()
        .map(|decl| {
            let symbols = MemberSymbols::compute(decl, &config.receiver_name);
            SymbolRow {
                container: decl.container.path.clone(),
                member: decl.name.clone(),
                kind: decl.kind,
                entry_point: symbols.entry_point,
                function: symbols.fn_name,
            }
        })
        .collect())
}

pub fn format_symbols(rows: &[SymbolRow], json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(rows).context("Failed to serialize symbols");
    }
    let width = rows.iter().map(|r| r.entry_point.len()).max().unwrap_or(0);
    Ok(rows
        .iter()
        .map(|r| {
            format!(
                "{:width$}  {}::{} ({})",
                r.entry_point,
                r.container,
                r.function,
                r.kind,
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Default configuration as TOML, optionally written to `output`.
pub fn handle_init_config(output: Option<&Path>) -> Result<String> {
    let text = GeneratorConfig::default()
        .to_toml_string()
        .context("Failed to render default config")?;
    if let Some(path) = output {
        if path.exists() {
            anyhow::bail!("Refusing to overwrite existing config: {:?}", path);
        }
        fs::write(path, &text).with_context(|| format!("Failed to write config: {:?}", path))?;
        info!("Wrote default config to {:?}", path);
    }
    Ok(text)
}
