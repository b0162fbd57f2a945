use clap::Args;

use signalroom_core::CoverageAssessor;

use crate::common::load_config;

#[derive(Args)]
pub struct CoverageArgs {
    /// Connected tools, comma separated (e.g. "slack,linear")
    #[arg(long, value_delimiter = ',')]
    tools: Vec<String>,
    /// Print the assessment as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: CoverageArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let assessment = CoverageAssessor::new(config.tool_catalog()).assess(&args.tools);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
        return Ok(());
    }

    println!(
        "Coverage: {}% ({})",
        assessment.percentage,
        assessment.overall.as_str()
    );
    println!("  communication: {}%", assessment.communication_coverage);
    println!("  tasks:         {}%", assessment.task_coverage);
    println!("{}", assessment.message);
    Ok(())
}
