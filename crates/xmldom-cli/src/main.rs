//! xmldom CLI - parse a file and print the serialized document

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xmldom::{DomParser, LocatorConfig, ParserConfig, ParserOptions, XmlSerializer};

#[derive(Parser, Debug)]
#[command(name = "xmldom")]
#[command(version)]
#[command(about = "Parse XML or HTML into a document and print it", long_about = None)]
struct Cli {
    /// Input file
    file: PathBuf,

    /// Media type of the input; HTML types enable HTML entities and attributes
    #[arg(short = 't', long, default_value = "text/xml")]
    content_type: String,

    /// Source identity reported with positions (defaults to the file path)
    #[arg(long)]
    system_id: Option<String>,

    /// Do not track line and column positions
    #[arg(long)]
    no_locator: bool,

    /// Namespace binding in scope before the root element (PREFIX=URI)
    #[arg(long, value_parser = parse_binding)]
    xmlns: Vec<(String, String)>,

    /// JSON file with parser settings (`locator`, `xmlns`)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_binding(value: &str) -> std::result::Result<(String, String), String> {
    match value.split_once('=') {
        Some((prefix, uri)) => Ok((prefix.to_string(), uri.to_string())),
        None => Err(format!("expected PREFIX=URI, got `{value}`")),
    }
}

fn load_config(path: &PathBuf) -> Result<ParserConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid parser config in {}", path.display()))
}

fn build_options(cli: &Cli) -> Result<ParserOptions> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ParserConfig::default(),
    };
    let mut options = ParserOptions::from_config(config);

    if cli.no_locator {
        options = options.without_locator();
    } else if let Some(locator) = options.locator.as_mut() {
        if let Some(system_id) = &cli.system_id {
            locator.system_id = Some(system_id.clone());
        } else if locator.system_id.is_none() {
            locator.system_id = Some(cli.file.display().to_string());
        }
    } else if let Some(system_id) = &cli.system_id {
        // An explicit system id turns tracking back on
        options = options.with_locator(LocatorConfig::new().with_system_id(system_id.as_str()));
    }

    for (prefix, uri) in &cli.xmlns {
        options = options.with_namespace(prefix.as_str(), uri.as_str());
    }
    Ok(options)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xmldom=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    debug!(?cli, "Parsed arguments");

    let source = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let options = build_options(&cli)?;

    let mut parser = DomParser::with_options(options);
    let document = parser
        .parse_from_string(&source, &cli.content_type)
        .with_context(|| format!("Failed to parse {}", cli.file.display()))?;

    let Some(document) = document else {
        bail!("No document produced from {}", cli.file.display());
    };

    println!(
        "{}",
        XmlSerializer::new().serialize_to_string(&document, document.root())
    );
    Ok(())
}
