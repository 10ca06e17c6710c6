use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand, ValueEnum};
use jobage_config::{EngineConfig, load_or_default};
use jobage_error::{EngineError, ErrorCategory};
use jobage_export::{ExportFormat, write_export};
use jobage_filter::{FilterField, PredicateSet, distinct_values, selectable_options};
use jobage_ingest_csv::CsvSource;
use jobage_ingest_json::JsonlSource;
use jobage_ingest_xlsx::XlsxSource;
use jobage_logging::{LogFormat, LogLevel};
use jobage_ports::{RecordSource, ReportRenderer};
use jobage_render_md::MarkdownRenderer;
use jobage_report::{BandSelection, ReportContext, ReportRequest, build_report};
use jobage_schema::ServiceRecord;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const WARRANTY_OPTIONS: [&str; 2] = ["IW", "OOW"];
const SERVICE_TYPE_OPTIONS: [&str; 2] = ["Repair", "Inspection"];

#[derive(Parser, Debug)]
#[command(name = "jobage")]
#[command(about = "Pending-duration reports over service-order exports.", long_about = None)]
struct Cli {
    /// Engine configuration (.yaml, .yml or .json). Defaults apply without one.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level: off, error, warn, info, debug, trace. JOBAGE_LOG overrides.
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
    /// Log format: plain, json, compact.
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    cmd: Command,
}

/// Filter selections; `All` (the default) leaves a field unconstrained.
#[derive(Args, Debug)]
struct FilterArgs {
    /// Warranty status, e.g. IW or OOW.
    #[arg(long, default_value = "All")]
    warranty: String,
    /// Service type, e.g. Repair or Inspection.
    #[arg(long, default_value = "All")]
    service_type: String,
    /// Service center.
    #[arg(long, default_value = "All")]
    center: String,
    /// Parts picking status.
    #[arg(long, default_value = "All")]
    parts_status: String,
}

impl FilterArgs {
    fn predicates(&self) -> PredicateSet {
        PredicateSet::new()
            .with_warranty(self.warranty.as_str())
            .with_service_type(self.service_type.as_str())
            .with_center(self.center.as_str())
            .with_parts_status(self.parts_status.as_str())
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    Markdown,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the aging report for one input file.
    Report {
        /// Service-order records: .csv, .tsv, .jsonl, or a workbook (.xlsx, .xls, .ods).
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
        /// Reference instant, e.g. "2025-06-01 12:00:00". Defaults to local now.
        #[arg(long, value_parser = parse_reference)]
        now: Option<NaiveDateTime>,
        /// Drill into a band, e.g. overall:50+, other:30-50, or CENTER:0-3. Repeatable.
        #[arg(long = "band", value_name = "SCOPE:LABEL")]
        bands: Vec<BandSelection>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,
        /// Write here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write the filtered records to a file.
    Export {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
        /// csv, tsv, json or jsonl. Inferred from --out when omitted, else tsv.
        #[arg(long)]
        format: Option<ExportFormat>,
        #[arg(long)]
        out: PathBuf,
    },

    /// Print the values each filter offers given the warranty selection.
    Options {
        #[arg(long, default_value = "All")]
        warranty: String,
        /// Offer the values present in this file instead of the standard lists.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Print the duration band catalog.
    Bands,
}

fn parse_reference(raw: &str) -> Result<NaiveDateTime, String> {
    jobage_duration::parse_timestamp(raw).ok_or_else(|| format!("unrecognised date-time: {raw:?}"))
}

fn source_for(path: &Path) -> Box<dyn RecordSource> {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jsonl" | "ndjson") => Box::new(JsonlSource::new(path)),
        Some("xlsx" | "xlsm" | "xls" | "ods") => Box::new(XlsxSource::new(path)),
        _ => Box::new(CsvSource::new(path)),
    }
}

fn load(path: &Path) -> Result<Vec<ServiceRecord>> {
    let source = source_for(path);
    let records = source.load().with_context(|| format!("load {}", source.describe()))?;
    tracing::info!(source = %source.describe(), records = records.len(), "records loaded");
    Ok(records)
}

fn emit(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("write {path:?}"))?;
            println!("wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn run_report(
    config: &EngineConfig,
    input: &Path,
    filters: PredicateSet,
    now: Option<NaiveDateTime>,
    bands: Vec<BandSelection>,
    format: ReportFormat,
    out: Option<&Path>,
) -> Result<()> {
    let records = load(input)?;
    let reference = now.unwrap_or_else(jobage_duration::reference_now);
    let request = bands
        .into_iter()
        .fold(ReportRequest::new(reference).with_filters(filters), ReportRequest::with_selection);
    let report = build_report(&records, &request, config)?;

    let text = match format {
        ReportFormat::Markdown => MarkdownRenderer.render(&report)?,
        ReportFormat::Json => {
            let mut json = serde_json::to_string_pretty(&report).context("serialize report")?;
            json.push('\n');
            json
        }
    };
    emit(out, &text)
}

fn run_export(
    config: &EngineConfig,
    input: &Path,
    filters: PredicateSet,
    format: Option<ExportFormat>,
    out: &Path,
) -> Result<()> {
    let records = load(input)?;
    let ctx = ReportContext::new(&records, config, filters, jobage_duration::reference_now())?;
    if let Some(err) = ctx.filter_error() {
        tracing::warn!(%err, "filters exclude every record");
    }
    let subset = ctx.filtered_records();
    let format = format
        .or_else(|| ExportFormat::from_path(out))
        .unwrap_or(ExportFormat::Tsv);
    write_export(out, &subset, format)?;
    println!("wrote {} records to {}", subset.len(), out.display());
    Ok(())
}

fn run_options(config: &EngineConfig, warranty: &str, input: Option<&Path>) -> Result<()> {
    let records = input.map(load).transpose()?;
    let predicates = PredicateSet::new().with_warranty(warranty);

    for field in FilterField::ALL {
        let base: Vec<String> = match (&records, field) {
            (Some(records), _) => distinct_values(records, field),
            (None, FilterField::WarrantyStatus) => WARRANTY_OPTIONS.map(String::from).to_vec(),
            (None, FilterField::ServiceType) => SERVICE_TYPE_OPTIONS.map(String::from).to_vec(),
            (None, FilterField::ServiceCenter) => config.main_centers.clone(),
            (None, FilterField::PartsPickingStatus) => Vec::new(),
        };
        let base: Vec<&str> = base.iter().map(String::as_str).collect();
        let options = selectable_options(field, &base, &predicates, &config.exclusion_rules);
        println!("{field}: {}", options.join(", "));
    }
    Ok(())
}

fn run_bands(config: &EngineConfig) -> Result<()> {
    let catalog = config.band_catalog()?;
    for band in catalog.bands() {
        match band.upper {
            Some(upper) => println!("{}\t{} <= days < {}", band.label, band.lower, upper),
            None => println!("{}\tdays >= {}", band.label, band.lower),
        }
    }
    Ok(())
}

/// Exit status for a failed run, after the sysexits conventions.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<EngineError>().map(EngineError::category) {
        Some(ErrorCategory::Query) => ExitCode::from(64),
        Some(ErrorCategory::Parse | ErrorCategory::Validation) => ExitCode::from(65),
        Some(ErrorCategory::Config) => ExitCode::from(78),
        None => ExitCode::FAILURE,
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            exit_code(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_or_default(cli.config.as_deref())?;
    let mut logging = config.logging.clone();
    if let Some(level) = cli.log_level {
        logging = logging.with_level(level);
    }
    if let Some(format) = cli.log_format {
        logging = logging.with_format(format);
    }
    jobage_logging::init(&logging)?;

    match cli.cmd {
        Command::Report { input, filters, now, bands, format, out } => {
            run_report(&config, &input, filters.predicates(), now, bands, format, out.as_deref())
        }
        Command::Export { input, filters, format, out } => {
            run_export(&config, &input, filters.predicates(), format, &out)
        }
        Command::Options { warranty, input } => run_options(&config, &warranty, input.as_deref()),
        Command::Bands => run_bands(&config),
    }
}
