//! RAISE - authorization-level engine CLI
//!
//! The `raise` command evaluates opportunity JSON files against the engine
//! settings.
//!
//! ## Commands
//!
//! - `level`: Calculate the RAISE authorization level
//! - `fast-track`: Check fast-track eligibility
//! - `checkpoints`: List the checkpoints of a phase
//! - `assess`: Full assessment as JSON
//! - `check-condition`: Validate (and optionally evaluate) a condition
//! - `validate-settings`: Load and validate a settings file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use raise_core::{
    assess, parse_condition, validate_condition, EngineSettings, JsonFileStore, KeyValueStore,
    MemoryStore, Opportunity, Phase, ResolverOptions, SettingsSnapshot, TelemetryConfig, TestMode,
};

#[derive(Parser)]
#[command(name = "raise")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "RAISE authorization-level engine", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Engine settings file (.toml or .json); built-in defaults when omitted
    #[arg(long, global = true, env = "RAISE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Key-value store (flat JSON object) holding runtime flags
    #[arg(long, global = true, env = "RAISE_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the RAISE level of an opportunity
    Level {
        /// Opportunity JSON file
        opportunity: PathBuf,

        /// List the rules that produced the level
        #[arg(long)]
        explain: bool,
    },

    /// Check fast-track eligibility
    FastTrack {
        /// Opportunity JSON file
        opportunity: PathBuf,
    },

    /// List the checkpoints of a phase
    Checkpoints {
        /// Opportunity JSON file
        opportunity: PathBuf,

        /// Phase to resolve (default: the opportunity's current phase)
        #[arg(short, long)]
        phase: Option<Phase>,
    },

    /// Print the full assessment as JSON
    Assess {
        /// Opportunity JSON file
        opportunity: PathBuf,

        /// Phase to resolve (default: the opportunity's current phase)
        #[arg(short, long)]
        phase: Option<Phase>,
    },

    /// Validate a condition, evaluating it when an opportunity is given
    CheckCondition {
        /// Condition expression, e.g. "opp.isRti === true"
        expression: String,

        /// Opportunity JSON file to evaluate against
        #[arg(short, long)]
        opportunity: Option<PathBuf>,
    },

    /// Load and validate the settings file
    ValidateSettings,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    raise_core::init_tracing(TelemetryConfig::from_flags(cli.json, cli.verbose, cli.quiet));

    let settings = load_settings(cli.settings.as_deref())?;
    let snapshot = SettingsSnapshot::new(settings).context("Failed to snapshot settings")?;
    debug!(digest = snapshot.short_digest(), "settings ready");

    let options = resolver_options(cli.store.as_deref())?;
    let mut out = std::io::stdout().lock();

    let result = match cli.command {
        Commands::Level {
            opportunity,
            explain,
        } => cmd_level(&mut out, &snapshot, &opportunity, explain),
        Commands::FastTrack { opportunity } => cmd_fast_track(&mut out, &snapshot, &opportunity),
        Commands::Checkpoints { opportunity, phase } => {
            cmd_checkpoints(&mut out, &snapshot, &opportunity, phase, options)
        }
        Commands::Assess { opportunity, phase } => {
            cmd_assess(&mut out, &snapshot, &opportunity, phase, options)
        }
        Commands::CheckCondition {
            expression,
            opportunity,
        } => cmd_check_condition(&mut out, &expression, opportunity.as_deref()),
        Commands::ValidateSettings => {
            cmd_validate_settings(&mut out, &snapshot, cli.settings.as_deref())
        }
    };

    raise_core::METRICS.flush();
    result
}

fn load_settings(path: Option<&Path>) -> Result<EngineSettings> {
    match path {
        Some(path) => EngineSettings::load(path)
            .with_context(|| format!("Failed to load settings from {:?}", path)),
        None => Ok(EngineSettings::default()),
    }
}

fn resolver_options(store: Option<&Path>) -> Result<ResolverOptions> {
    let store: Box<dyn KeyValueStore> = match store {
        Some(path) => Box::new(
            JsonFileStore::open(path).with_context(|| format!("Failed to open store {:?}", path))?,
        ),
        None => Box::new(MemoryStore::new()),
    };
    let mode = TestMode::resolve(store.as_ref());
    if mode.active {
        info!("test mode active: checkpoints are not required");
    }
    Ok(ResolverOptions::from(mode))
}

fn read_opportunity(path: &Path) -> Result<Opportunity> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read opportunity file: {:?}", path))?;
    serde_json::from_str(&raw).context("Failed to parse opportunity as JSON")
}

/// Calculate and print the RAISE level
fn cmd_level(
    out: &mut dyn Write,
    snapshot: &SettingsSnapshot,
    path: &Path,
    explain: bool,
) -> Result<()> {
    let opp = read_opportunity(path)?;
    let decision = snapshot.explain_level(&opp);

    writeln!(out, "{} ({})", decision.level, decision.level.description())?;
    if explain {
        for rule in &decision.applied {
            writeln!(out, "  {}", serde_json::to_string(rule)?)?;
        }
    }
    Ok(())
}

fn cmd_fast_track(out: &mut dyn Write, snapshot: &SettingsSnapshot, path: &Path) -> Result<()> {
    let opp = read_opportunity(path)?;
    let verdict = snapshot.fast_track(&opp);

    if verdict.eligible() {
        writeln!(out, "eligible")?;
    } else {
        writeln!(out, "not eligible")?;
        for blocker in &verdict.blockers {
            writeln!(out, "  - {blocker}")?;
        }
    }
    Ok(())
}

fn cmd_checkpoints(
    out: &mut dyn Write,
    snapshot: &SettingsSnapshot,
    path: &Path,
    phase: Option<Phase>,
    options: ResolverOptions,
) -> Result<()> {
    let opp = read_opportunity(path)?;
    let phase = phase.unwrap_or(opp.current_phase);
    let resolution = snapshot.checkpoints(phase, &opp, options);

    writeln!(out, "{} checkpoints for phase {}", resolution.checkpoints.len(), phase)?;
    for cp in &resolution.checkpoints {
        let marker = if cp.required { "*" } else { " " };
        writeln!(out, "  [{marker}] {:<24} {}", cp.id, cp.label)?;
    }
    for failure in &resolution.rejected {
        writeln!(out, "  skipped {}: {}", failure.control_id, failure.error)?;
    }
    Ok(())
}

fn cmd_assess(
    out: &mut dyn Write,
    snapshot: &SettingsSnapshot,
    path: &Path,
    phase: Option<Phase>,
    options: ResolverOptions,
) -> Result<()> {
    let opp = read_opportunity(path)?;
    let assessment = assess(&opp, snapshot, phase, options);
    writeln!(out, "{}", serde_json::to_string_pretty(&assessment)?)?;
    Ok(())
}

fn cmd_check_condition(
    out: &mut dyn Write,
    expression: &str,
    opportunity: Option<&Path>,
) -> Result<()> {
    validate_condition(expression).context("Invalid condition")?;
    let parsed = parse_condition(expression)?;
    writeln!(out, "valid: {parsed}")?;

    if let Some(path) = opportunity {
        let opp = read_opportunity(path)?;
        let holds = raise_core::try_evaluate_condition(expression, &opp)
            .context("Condition could not be evaluated")?;
        writeln!(out, "result: {holds}")?;
    }
    Ok(())
}

fn cmd_validate_settings(
    out: &mut dyn Write,
    snapshot: &SettingsSnapshot,
    path: Option<&Path>,
) -> Result<()> {
    let settings = snapshot.settings();
    match path {
        Some(path) => writeln!(out, "{:?}: ok", path)?,
        None => writeln!(out, "built-in defaults: ok")?,
    }
    writeln!(out, "  matrix entries: {}", settings.matrix.entries().len())?;
    writeln!(out, "  controls:       {}", settings.controls.len())?;
    writeln!(out, "  digest:         {}", snapshot.digest())?;
    Ok(())
}
