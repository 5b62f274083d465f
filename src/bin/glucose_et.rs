//! Glucose ET CLI - Command-line interface for Glucose ET
//!
//! Commands:
//! - analyze: Analyze one meal from bare values or an input document
//! - validate: Validate a meal input document
//! - schema: Print input/output schema information
//! - doctor: Diagnose engine configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use glucose_et::config::{
    ReferenceBounds, DEFAULT_G_MAX, DEFAULT_G_MIN, GLUCOSE_INPUT_MAX, GLUCOSE_INPUT_MIN,
    GREEN_THRESHOLD_PCT, NEUTRAL_MEAN_REL_PCT, SAMPLE_COUNT, YELLOW_THRESHOLD_PCT,
};
use glucose_et::encoder::REPORT_VERSION;
use glucose_et::{
    ComputeError, MealAnalyzer, MealInput, MealReport, ValidationError, ENGINE_VERSION,
    MODEL_LABEL, PRODUCER_NAME, SCHEMA_VERSION,
};

/// Environment variable holding the log filter
const LOG_ENV: &str = "GLUCOSE_ET_LOG";

/// Glucose ET - Relative Bio-Time shift for one meal
#[derive(Parser)]
#[command(name = "glucose-et")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Classify a meal's Bio-Time impact from five glucose readings", long_about = None)]
struct Cli {
    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one meal
    Analyze {
        /// Five glucose readings in mmol/L, pre-meal first
        #[arg(allow_negative_numbers = true)]
        values: Vec<f64>,

        /// Input document path (use - for stdin)
        #[arg(short, long, conflicts_with = "values")]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Validate a meal input document
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },

    /// Diagnose engine configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Plain-text summary
    Text,
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (glucose.meal_input.v1)
    Input,
    /// Output schema (meal report)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "glucose_et=debug" } else { "glucose_et=warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<(), EtCliError> {
    match cli.command {
        Commands::Analyze {
            values,
            input,
            format,
        } => cmd_analyze(values, input.as_deref(), format),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),

        Commands::Doctor { json } => cmd_doctor(json),
    }
}

fn cmd_analyze(
    values: Vec<f64>,
    input: Option<&Path>,
    format: OutputFormat,
) -> Result<(), EtCliError> {
    let meal = match input {
        Some(path) => MealInput::from_json(&read_input(path)?)?,
        None if !values.is_empty() => MealInput::from_values(&values),
        None if !atty::is(atty::Stream::Stdin) => {
            debug!("reading meal input document from piped stdin");
            MealInput::from_json(&read_input(Path::new("-"))?)?
        }
        None => return Err(EtCliError::NoInput),
    };

    let analyzer = MealAnalyzer::new();
    let report = analyzer.report(&meal)?;
    info!(status = %report.analysis.status, "meal analyzed");

    println!("{}", format_report(analyzer.encoder(), &report, &format)?);
    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), EtCliError> {
    let meal = MealInput::from_json(&read_input(input)?)?;
    let errors = meal.validation_errors();

    let report = ValidationReport {
        schema_version: meal.schema_version.clone(),
        readings: meal.readings.len(),
        valid: errors.is_empty(),
        errors: errors.iter().map(|e| e.to_string()).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Schema:   {}", report.schema_version);
        println!("Readings: {}", report.readings);
        println!("Valid:    {}", if report.valid { "yes" } else { "no" });

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - {err}");
            }
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(EtCliError::ValidationFailed(report.errors.len()))
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), EtCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {SCHEMA_VERSION}");
                println!();
                println!("A meal input document contains:");
                println!();
                println!("- schema_version: {SCHEMA_VERSION} (optional)");
                println!("- meal_id: Free-form identifier (optional)");
                println!("- readings: Exactly {SAMPLE_COUNT} entries, pre-meal first:");
                println!("  - label: Display label, e.g. \"Pre\", \"+30m\" (optional)");
                println!("  - time: Wall-clock time HH:MM:SS (optional)");
                println!(
                    "  - glucose_mmol_l: Glucose in mmol/L, {GLUCOSE_INPUT_MIN:.1}-{GLUCOSE_INPUT_MAX:.1}"
                );
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: meal report {REPORT_VERSION}");
                println!();
                println!("- report_version, model, computed_at_utc, meal_id");
                println!("- producer: {{ name, version, instance_id }}");
                println!("- readings: {{ label, time, glucose_mmol_l }} x {SAMPLE_COUNT}");
                println!("- analysis:");
                println!("  - status: GREEN | YELLOW | RED");
                println!("  - reason, guidance: Fixed text for the status");
                println!("  - step_changes: 4 percentages (null when not computable)");
                println!("  - net_shift, undefined_steps");
                println!("  - e_pre, e_min, e_mean, e_mean_rel");
                println!("  - glucose, t_index, e_index");
            }
        }
    }

    Ok(())
}

fn cmd_doctor(json: bool) -> Result<(), EtCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Engine version {ENGINE_VERSION} ({MODEL_LABEL})"),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {SCHEMA_VERSION}"),
    });

    checks.push(match ReferenceBounds::new(DEFAULT_G_MIN, DEFAULT_G_MAX) {
        Ok(bounds) => DoctorCheck {
            name: "reference_bounds".to_string(),
            status: CheckStatus::Ok,
            message: format!("g_min={} g_max={} mmol/L", bounds.g_min(), bounds.g_max()),
        },
        Err(e) => DoctorCheck {
            name: "reference_bounds".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    });

    let bands_ordered =
        GREEN_THRESHOLD_PCT > YELLOW_THRESHOLD_PCT && NEUTRAL_MEAN_REL_PCT >= GREEN_THRESHOLD_PCT;
    checks.push(DoctorCheck {
        name: "status_bands".to_string(),
        status: if bands_ordered {
            CheckStatus::Ok
        } else {
            CheckStatus::Error
        },
        message: format!(
            "GREEN >= {GREEN_THRESHOLD_PCT}%, YELLOW >= {YELLOW_THRESHOLD_PCT}%, neutral {NEUTRAL_MEAN_REL_PCT}%"
        ),
    });

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass values or --input)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (documents can be piped to analyze)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Glucose ET Doctor Report");
        println!("========================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(EtCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(path: &Path) -> Result<String, EtCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn format_report(
    encoder: &glucose_et::encoder::ReportEncoder,
    report: &MealReport,
    format: &OutputFormat,
) -> Result<String, EtCliError> {
    let output = match format {
        OutputFormat::Text => encoder.encode_to_text(report)?,
        OutputFormat::Json => encoder.encode_to_json(report)?,
        OutputFormat::JsonPretty => encoder.encode_to_json_pretty(report)?,
    };
    Ok(output)
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SCHEMA_VERSION,
        "description": "Five post-prandial glucose readings for one meal",
        "type": "object",
        "required": ["readings"],
        "properties": {
            "schema_version": { "type": "string", "const": SCHEMA_VERSION },
            "meal_id": { "type": "string" },
            "readings": {
                "type": "array",
                "minItems": SAMPLE_COUNT,
                "maxItems": SAMPLE_COUNT,
                "items": {
                    "type": "object",
                    "required": ["glucose_mmol_l"],
                    "properties": {
                        "label": { "type": "string" },
                        "time": { "type": "string", "format": "time" },
                        "glucose_mmol_l": {
                            "type": "number",
                            "minimum": GLUCOSE_INPUT_MIN,
                            "maximum": GLUCOSE_INPUT_MAX
                        }
                    }
                }
            }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let nullable_number = serde_json::json!({ "type": ["number", "null"] });
    let sample_array = serde_json::json!({
        "type": "array",
        "items": { "type": "number" },
        "minItems": SAMPLE_COUNT,
        "maxItems": SAMPLE_COUNT
    });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "glucose.meal_report",
        "description": "Glucose ET meal report",
        "type": "object",
        "required": ["report_version", "producer", "model", "computed_at_utc", "readings", "analysis"],
        "properties": {
            "report_version": { "type": "string", "const": REPORT_VERSION },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "model": { "type": "string" },
            "computed_at_utc": { "type": "string", "format": "date-time" },
            "meal_id": { "type": "string" },
            "readings": { "type": "array", "items": { "type": "object" } },
            "analysis": {
                "type": "object",
                "properties": {
                    "status": { "type": "string", "enum": ["GREEN", "YELLOW", "RED"] },
                    "reason": { "type": "string" },
                    "step_changes": { "type": "array", "items": nullable_number, "minItems": 4, "maxItems": 4 },
                    "net_shift": { "type": "number" },
                    "undefined_steps": { "type": "integer" },
                    "e_pre": { "type": "number" },
                    "e_min": { "type": "number" },
                    "e_mean": { "type": "number" },
                    "e_mean_rel": { "type": "number" },
                    "guidance": { "type": "string" },
                    "glucose": sample_array.clone(),
                    "t_index": sample_array.clone(),
                    "e_index": sample_array
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum EtCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    Validation(ValidationError),
    NoInput,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for EtCliError {
    fn from(e: io::Error) -> Self {
        EtCliError::Io(e)
    }
}

impl From<ComputeError> for EtCliError {
    fn from(e: ComputeError) -> Self {
        match e {
            ComputeError::Validation(v) => EtCliError::Validation(v),
            other => EtCliError::Compute(other),
        }
    }
}

impl From<serde_json::Error> for EtCliError {
    fn from(e: serde_json::Error) -> Self {
        EtCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<EtCliError> for CliError {
    fn from(e: EtCliError) -> Self {
        match e {
            EtCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            EtCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Provide exactly {SAMPLE_COUNT} finite glucose readings")),
            },
            EtCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches {SCHEMA_VERSION}")),
            },
            EtCliError::Validation(e) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'glucose-et validate' for details".to_string()),
            },
            EtCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "No glucose readings given".to_string(),
                hint: Some("Pass five values, --input FILE, or pipe a document".to_string()),
            },
            EtCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{count} validation error(s)"),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            EtCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    schema_version: String,
    readings: usize,
    valid: bool,
    errors: Vec<String>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Error,
}
