use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use signalroom_core::{gather, BriefEntry, FileSource, Pipeline, PipelineReport, SignalSource};

use crate::common::{config_dir, load_config, resolve_mode, resolve_now};

#[derive(Args)]
pub struct BriefArgs {
    /// Directory of `<tool>.json` payload files (default: <config dir>/inbox)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Intent mode: calm, on_the_go, work, focus (default: from config)
    #[arg(long)]
    mode: Option<String>,
    /// Evaluate as of this RFC 3339 instant instead of now
    #[arg(long)]
    now: Option<String>,
    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: BriefArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let mode = resolve_mode(args.mode.as_deref(), &config)?;
    let now = resolve_now(args.now.as_deref())?;
    let input = args.input.unwrap_or_else(|| config_dir().join("inbox"));

    let sources: Vec<Arc<dyn SignalSource>> = FileSource::discover(&input)
        .map_err(|e| format!("cannot read {}: {e}", input.display()))?
        .into_iter()
        .map(|s| Arc::new(s) as Arc<dyn SignalSource>)
        .collect();
    if sources.is_empty() {
        tracing::warn!(dir = %input.display(), "no provider payloads found");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let batches = runtime.block_on(gather(&sources, &config.fetch_config()));
    // A timed-out fetch may still be parked on the blocking pool; don't wait for it.
    runtime.shutdown_background();
    for batch in &batches {
        if let Some(error) = batch.error() {
            eprintln!("warning: {} unavailable: {error}", batch.provider);
        }
    }

    let report = Pipeline::from_config(&config).run(&batches, mode, now);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &PipelineReport) {
    println!("{} ({} mode)", report.brief.summary, report.mode);
    print_section("Needs attention", &report.brief.needs_attention);
    print_section("FYI", &report.brief.fyi);
    print_section("Handled", &report.brief.handled);
    println!();
    println!("Coverage: {}", report.coverage.message);
}

fn print_section(heading: &str, entries: &[BriefEntry]) {
    if entries.is_empty() {
        return;
    }
    println!();
    println!("{heading}:");
    for entry in entries {
        let label = entry.category.map_or("-", |c| c.as_str());
        println!("  [{label}] {} ({})", entry.title, entry.source);
        if let Some(reason) = &entry.reason {
            println!("      {reason}");
        }
        if let Some(url) = &entry.url {
            println!("      {url}");
        }
    }
}
