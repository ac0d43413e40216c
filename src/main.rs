use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use pokedex_lib::build_engine;
use pokedex_lib::crawling::{AggregationEngine, LoadOutcome, TransportError};
use pokedex_lib::infrastructure::{logging, AppConfig};
use pokedex_lib::presentation::{self, PromptAction, LOADING_LABEL, TITLE};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging_with_config(&config.logging).context("Failed to initialize logging")?;
    logging::log_system_info();

    let engine = build_engine(&config).context("Failed to build catalog engine")?;

    println!("{TITLE}\n");
    println!("{LOADING_LABEL}");
    report(engine.start().await);
    let mut shown = render_new_items(&engine, 0);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let snapshot = engine.snapshot();
        let Some(label) = presentation::trigger_label(&snapshot) else {
            println!("\nAll Pokémon loaded.");
            break;
        };

        println!("\n[{label}] press Enter, or q to quit");
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        match presentation::parse_prompt(&line) {
            PromptAction::LoadMore => {}
            PromptAction::Quit => break,
            PromptAction::Ignore => {
                println!("Unrecognised input {:?}", line.trim());
                continue;
            }
        }

        println!("{LOADING_LABEL}");
        report(engine.load_next_page().await);
        shown = render_new_items(&engine, shown);
    }

    Ok(())
}

fn render_new_items(engine: &AggregationEngine, shown: usize) -> usize {
    let snapshot = engine.snapshot();
    if snapshot.len() > shown {
        println!("{}", presentation::render_items_from(&snapshot, shown));
    }
    println!("\n{}", presentation::render_footer(&snapshot));
    snapshot.len()
}

fn report(outcome: Result<LoadOutcome, TransportError>) {
    match outcome {
        Ok(LoadOutcome::Loaded(_) | LoadOutcome::Skipped(_)) => {}
        Err(e) => eprintln!("Failed to load Pokémon: {e}. Try again."),
    }
}
