mod report;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use kjoint::{
    DesignSettings, Designer, JsonParameterStore, MemoryParameterStore, ParameterStore,
    ReportSink, Sheet, SheetSettings, SheetSink,
};
use report::render_summary;
use tracing_subscriber::EnvFilter;

/// Size a welded tubular K-joint truss for fatigue and support pins.
#[derive(Debug, Parser)]
#[command(name = "kjoint", version, about)]
struct Cli {
    /// JSON parameter file; the built-in reference set is used when omitted.
    #[arg(long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// Worksheet JSON file to export the results into.
    #[arg(long, value_name = "FILE")]
    sheet: Option<PathBuf>,

    /// Create the worksheet from the standard layout before exporting.
    #[arg(long, requires = "sheet")]
    new_sheet: bool,

    /// Print the ordered export records as JSON instead of the report.
    #[arg(long)]
    json: bool,

    /// Partial factor for fatigue strength.
    #[arg(long, default_value_t = DesignSettings::default().partial_factor)]
    partial_factor: f64,

    /// First worksheet row searched for a label.
    #[arg(long, default_value_t = SheetSettings::default().first_row)]
    first_row: usize,

    /// Last worksheet row searched for a label.
    #[arg(long, default_value_t = SheetSettings::default().search_limit)]
    search_limit: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Parameters come from a file or from the reference set shipped in the crate.
    let parameters = match &cli.params {
        Some(path) => JsonParameterStore.read(&path.to_string_lossy())?,
        None => MemoryParameterStore::with_example().read("example")?,
    };
    let settings = DesignSettings {
        partial_factor: cli.partial_factor,
    };
    let designer = Designer::with_settings(parameters, settings)?;
    let results = designer.results()?;

    if let Some(path) = &cli.sheet {
        if cli.new_sheet {
            let members: Vec<&str> = designer
                .model()
                .members()
                .iter()
                .map(|member| member.label.as_str())
                .collect();
            let roles: Vec<&str> = results.roles.iter().map(String::as_str).collect();
            Sheet::template(&members, &roles).save(path)?;
        }
        let mut sink = SheetSink::open(path, SheetSettings {
            first_row: cli.first_row,
            search_limit: cli.search_limit,
        })?;
        kjoint::export::export_results(&results, &mut sink)?;
    }

    if cli.json {
        let mut recorder = ReportSink::new();
        kjoint::export::export_results(&results, &mut recorder)?;
        println!("{}", recorder.to_json()?);
    } else {
        println!("{}", render_summary(&results));
    }

    Ok(())
}
