//! Command-line interface for social-probe
//!
//! # Usage Examples
//!
//! ## Classify
//! ```bash
//! # One buffer as hex (whitespace and a 0x prefix are ignored)
//! social-probe classify --hex 0a0608f503100a
//!
//! # Raw bytes from a file, JSON output
//! social-probe classify --file capture.bin --format json
//!
//! # Alternate schema
//! social-probe classify --base64 CgA= \
//!   --proto-file snapshot.proto \
//!   --envelope-type SnapshotNotify --bare-type Snapshot --envelope-field snapshot
//! ```
//!
//! ## Batch
//! ```bash
//! # One hex buffer per line, `#` comments allowed
//! social-probe batch captures.txt --encoding hex
//! ```
//!
//! ## Sample & Schema
//! ```bash
//! social-probe sample --schema bare --encoding base64
//! social-probe schema
//! ```
//!
//! Logs go to stderr and are controlled by `RUST_LOG`; stdout carries only
//! reports.

use anyhow::Context;
use clap::{Parser, Subcommand};
use social_core::{
    render, Classification, Classifier, ClassifierConfig, LineSink, TracingSink, WriterSink,
};
use social_probe::input::encode_text;
use social_probe::output::text_lines;
use social_probe::{
    encode_sample, load_schema, parse_batch, schema_lines, BatchSummary, ClassifierOpts,
    ClassifyOutput, InputEncoding, InputOpts, OutputFormat, SampleSchema,
};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "social-probe")]
#[command(about = "A tool for recognizing and reporting encoded player social buffers")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one buffer and print its report
    Classify {
        #[command(flatten)]
        input: InputOpts,

        #[command(flatten)]
        classifier: ClassifierOpts,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Emit report lines as log events instead of printing them
        #[arg(long)]
        log_report: bool,
    },

    /// Classify every buffer of a file, one encoded buffer per line
    Batch {
        /// File with one buffer per line
        file: PathBuf,

        /// Text encoding of each line
        #[arg(long, value_enum, default_value = "hex", env = "SOCIAL_PROBE_ENCODING")]
        encoding: InputEncoding,

        #[command(flatten)]
        classifier: ClassifierOpts,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print a demonstration buffer
    Sample {
        /// Shape to encode the demonstration root as
        #[arg(long, value_enum, default_value = "envelope")]
        schema: SampleSchema,

        /// Text encoding of the printed buffer
        #[arg(long, value_enum, default_value = "hex")]
        encoding: InputEncoding,
    },

    /// List the loaded schema's messages and fields
    Schema {
        /// `.proto` file to load instead of the embedded schema
        #[arg(long, env = "SOCIAL_PROBE_PROTO_FILE")]
        proto_file: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for reports
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify {
            input,
            classifier,
            format,
            log_report,
        } => run_classify(input, classifier, format, log_report),
        Commands::Batch {
            file,
            encoding,
            classifier,
            format,
        } => run_batch(file, encoding, classifier, format),
        Commands::Sample { schema, encoding } => {
            let bytes = encode_sample(schema)?;
            println!("{}", encode_text(encoding, &bytes));
            Ok(())
        }
        Commands::Schema { proto_file } => {
            let schema = load_schema(proto_file.as_ref())?;
            let mut sink = WriterSink::new(std::io::stdout().lock());
            for line in schema_lines(&schema)? {
                sink.write_line(&line)?;
            }
            Ok(())
        }
    }
}

fn build_classifier(opts: &ClassifierOpts) -> anyhow::Result<Classifier> {
    let config = ClassifierConfig::from(opts);
    Classifier::from_config(&config).context("Failed to build classifier")
}

fn run_classify(
    input: InputOpts,
    opts: ClassifierOpts,
    format: OutputFormat,
    log_report: bool,
) -> anyhow::Result<()> {
    let classifier = build_classifier(&opts)?;
    let bytes = input.read()?;
    info!("Classifying {} bytes", bytes.len());

    let classification = classifier.classify(&bytes);
    let mut stdout = WriterSink::new(std::io::stdout().lock());

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&ClassifyOutput::from(&classification))?;
            stdout.write_line(&json)?;
        }
        OutputFormat::Text => match &classification {
            Classification::Matched(m) if log_report => {
                info!("Recognized as {} ({})", m.schema, m.message_type);
                render(&m.root).emit(&mut TracingSink)?;
            }
            _ => {
                for line in text_lines(&classification) {
                    stdout.write_line(&line)?;
                }
            }
        },
    }

    stdout.into_inner().flush()?;
    Ok(())
}

fn run_batch(
    file: PathBuf,
    encoding: InputEncoding,
    opts: ClassifierOpts,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let classifier = build_classifier(&opts)?;
    let contents = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read batch file {}", file.display()))?;
    let entries = parse_batch(&contents, encoding)?;
    info!("Classifying {} buffers from {}", entries.len(), file.display());

    let mut summary = BatchSummary::default();
    let mut stdout = WriterSink::new(std::io::stdout().lock());

    for (n, entry) in entries.iter().enumerate() {
        let classification = classifier.classify(&entry.bytes);
        summary.record(&classification);

        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string(&ClassifyOutput::from(&classification))?;
                stdout.write_line(&json)?;
            }
            OutputFormat::Text => {
                stdout.write_line(&format!("== buffer {} (line {})", n + 1, entry.line))?;
                for line in text_lines(&classification) {
                    stdout.write_line(&line)?;
                }
            }
        }
    }

    match format {
        OutputFormat::Json => stdout.write_line(&serde_json::to_string(&summary)?)?,
        OutputFormat::Text => stdout.write_line(&summary.to_string())?,
    }
    info!("{summary}");

    stdout.into_inner().flush()?;
    Ok(())
}
