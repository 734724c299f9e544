//! Slotted CLI
//!
//! Usage:
//!   slotted [OPTIONS] <TEMPLATE>
//!
//! Options:
//!   -c, --config <FILE>     Manifest declaring engine settings and components (TOML)
//!   -t, --templates <DIR>   Template directory (repeatable)
//!   -d, --data <JSON>       Context data as a JSON object
//!   --check                 Compile only, do not render
//!   -v, --verbose           Log debug output to stderr
//!   -h, --help              Print help

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use slotted::value::data_from_json;
use slotted::{ContextData, Manifest, RenderError};

#[derive(Parser)]
#[command(name = "slotted")]
#[command(about = "Render templates with reusable slotted components")]
struct Cli {
    /// Template file, or a template name looked up in the template directories
    template: String,

    /// Manifest declaring engine settings and components (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Template directory; may be given more than once
    #[arg(short, long = "templates")]
    templates: Vec<PathBuf>,

    /// Context data as a JSON object
    #[arg(short, long)]
    data: Option<String>,

    /// Only compile the template and report errors
    #[arg(long)]
    check: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // Load manifest
    let mut manifest = match &cli.config {
        Some(path) => match Manifest::from_file(path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error loading manifest '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Manifest::default(),
    };
    manifest.engine.template_dirs.extend(cli.templates.iter().cloned());
    let engine = manifest.into_engine();

    // Parse context data
    let data = match &cli.data {
        Some(json) => match serde_json::from_str(json).map(data_from_json) {
            Ok(Some(data)) => data,
            Ok(None) => {
                eprintln!("Error: --data must be a JSON object");
                return ExitCode::FAILURE;
            }
            Err(e) => {
                eprintln!("Error parsing --data: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => ContextData::new(),
    };

    // Read template: a file path wins over a template name
    let (name, source) = if Path::new(&cli.template).is_file() {
        match fs::read_to_string(&cli.template) {
            Ok(content) => (cli.template.clone(), content),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", cli.template, e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        match engine.template_source(&cli.template) {
            Ok(content) => (cli.template.clone(), content),
            Err(e) => {
                eprintln!("Error: {}", e);
                for location in &e.tried {
                    eprintln!("  tried: {}", location);
                }
                return ExitCode::FAILURE;
            }
        }
    };

    let template = match engine.compile_named(&name, &source) {
        Ok(t) => t,
        Err(e) => {
            eprint!("{}", e.format(&source, &name));
            return ExitCode::FAILURE;
        }
    };

    if cli.check {
        return ExitCode::SUCCESS;
    }

    match engine.render_template(&template, data) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(RenderError::Compile { name, error }) => {
            // A component template failed to compile; show it with its own source
            match engine.template_source(&name) {
                Ok(source) => eprint!("{}", error.format(&source, &name)),
                Err(_) => eprintln!("Error: {}", error),
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
