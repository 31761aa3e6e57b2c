use clap::{Parser, Subcommand};
use colored::*;
use spinners::{Spinner, Spinners};

use llm_companion::api::Server;
use llm_companion::config::AppConfig;
use llm_companion::movie::{MovieQuery, MISSING_FIELDS_ERROR, PREFERENCES_TIP};
use llm_companion::search::{
    SearchModel, SearchOutcome, AGENT_ERROR_NOTICE, EMPTY_QUERY_WARNING, NO_RESULTS_NOTICE,
};

/// Command line arguments for the companion
#[derive(Parser)]
#[clap(
    name = "companion",
    about = "Movie recommendations and web-search answers from hosted LLMs"
)]
struct CliArgs {
    /// Provider request timeout in seconds (unset waits indefinitely)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the web interface
    Serve {
        /// Address to bind to, overrides COMPANION_ADDR
        #[arg(long)]
        addr: Option<String>,
    },
    /// Recommend movies similar to the given one
    Movies {
        /// Movie name
        name: String,
        /// Release year
        year: String,
        /// What you particularly enjoyed about it
        #[arg(long, short, default_value = "")]
        preferences: String,
    },
    /// Answer a query with the web search agent
    Search {
        query: String,
        /// Model identifier
        #[arg(long, short, default_value_t = SearchModel::default())]
        model: SearchModel,
        /// Maximum agent turns, overrides COMPANION_AGENT_MAX_TURNS
        #[arg(long)]
        max_turns: Option<u32>,
    },
}

fn rule() -> ColoredString {
    "─".repeat(50).bright_black()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    llm_companion::init_logging();
    let args = CliArgs::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(timeout) = args.timeout {
        config.timeout_seconds = Some(timeout);
    }

    match args.command {
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.addr.clone());
            let server = Server::new(
                config.build_movie_recommender()?,
                config.build_search_pipeline()?,
            );
            println!("{} http://{}", "Serving on".bright_cyan(), addr);
            server.run(&addr).await?;
        }
        Command::Movies {
            name,
            year,
            preferences,
        } => {
            let query = MovieQuery::new(name, year).preferences(preferences);
            if !query.is_complete() {
                eprintln!("{} {}", "Error:".bright_red(), MISSING_FIELDS_ERROR);
                std::process::exit(2);
            }

            let recommender = config.build_movie_recommender()?;
            let mut sp = Spinner::new(
                Spinners::Dots12,
                "Analyzing your movie and finding perfect matches..."
                    .bright_magenta()
                    .to_string(),
            );
            let result = recommender.recommend(&query).await;
            sp.stop();
            print!("\r\x1B[K");

            match result {
                Ok(markdown) => {
                    println!("{}", "Your Personalized Movie Recommendations".bright_green());
                    println!("{}", rule());
                    println!("{markdown}");
                    println!("{}", rule());
                    println!("{}", PREFERENCES_TIP.bright_blue());
                }
                Err(e) => {
                    eprintln!("{} {}", "Error:".bright_red(), e);
                    std::process::exit(1);
                }
            }
        }
        Command::Search {
            query,
            model,
            max_turns,
        } => {
            if query.trim().is_empty() {
                eprintln!("{} {}", "Warning:".bright_yellow(), EMPTY_QUERY_WARNING);
                return Ok(());
            }
            if let Some(turns) = max_turns {
                config.agent_max_turns = turns;
            }

            let pipeline = config.build_search_pipeline()?;
            let mut sp = Spinner::new(
                Spinners::Dots12,
                format!("Searching with {model}...").bright_magenta().to_string(),
            );
            let report = pipeline.run(&query, model).await;
            sp.stop();
            print!("\r\x1B[K");

            match report.outcome {
                SearchOutcome::Results(text) => {
                    println!("{text}");
                    println!("{}", rule());
                }
                SearchOutcome::NoResults => println!("{}", NO_RESULTS_NOTICE.bright_blue()),
                SearchOutcome::Error(e) => {
                    log::debug!("agent error: {e}");
                    eprintln!("{} {}", "Error:".bright_red(), AGENT_ERROR_NOTICE);
                }
            }
        }
    }

    Ok(())
}
