mod bootstrap;
mod report;
mod run;
mod trends;

use clap::{Parser, Subcommand};

use trendcast_core::Tone;

#[derive(Debug, Parser)]
#[command(name = "trendcast-cli")]
#[command(about = "trendcast content pipeline command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full pipeline once and print the summary.
    Run {
        /// Feed sources to analyze (must exist in the source catalog).
        #[arg(long, value_delimiter = ',')]
        sources: Option<Vec<String>>,
        /// Maximum trends to rank.
        #[arg(long)]
        max_trends: Option<usize>,
        /// Maximum posts to schedule.
        #[arg(long)]
        max_posts: Option<usize>,
        /// Content tones, comma-separated (professional, casual, technical).
        #[arg(long, value_delimiter = ',')]
        tones: Option<Vec<Tone>>,
        /// Disable the duplicate-topic filter for this run.
        #[arg(long)]
        no_dedup: bool,
    },
    /// Refresh trends only, without generating content.
    Trends {
        #[arg(long)]
        max_trends: Option<usize>,
    },
    /// Print recent run summaries from the activity log.
    Report {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            sources,
            max_trends,
            max_posts,
            tones,
            no_dedup,
        } => run::execute(sources, max_trends, max_posts, tones, no_dedup).await,
        Commands::Trends { max_trends } => trends::execute(max_trends).await,
        Commands::Report { limit } => report::execute(limit).await,
    }
}
