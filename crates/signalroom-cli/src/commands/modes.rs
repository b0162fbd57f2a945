use clap::Args;
use serde_json::json;

use signalroom_core::IntentMode;

#[derive(Args)]
pub struct ModesArgs {
    /// Print the policy tables as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ModesArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.json {
        let modes: Vec<_> = IntentMode::ALL
            .iter()
            .map(|mode| {
                json!({
                    "mode": mode,
                    "description": mode.description(),
                    "rules": mode.policy().rules,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&modes)?);
        return Ok(());
    }

    for mode in IntentMode::ALL {
        println!("{mode}: {}", mode.description());
        for rule in mode.policy().rules {
            let categories: Vec<&str> = rule.categories.iter().map(|c| c.as_str()).collect();
            println!("  >= {:.2}  {}", rule.min_confidence, categories.join(", "));
        }
    }
    Ok(())
}
