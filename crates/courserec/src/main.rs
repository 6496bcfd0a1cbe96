use anyhow::Result;
use clap::{Parser, Subcommand};
use courserec_common::{logger, AppConfig};
use courserec_vector::{Corpus, Recommendation, SimilarityEngine};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "courserec")]
#[command(about = "CourseRec - embedding-based course recommendation", long_about = None)]
struct Cli {
    /// Configuration file (TOML/JSON/YAML); environment variables otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Course corpus (.csv or .json) with an embeddings column
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },

    /// Recommend courses similar to the named one
    Recommend {
        /// Exact course name
        name: String,

        /// Number of recommendations
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Find courses whose name contains the query
    Search {
        query: String,

        /// Match case exactly
        #[arg(long)]
        case_sensitive: bool,
    },

    /// Write the processed corpus as flat CSV (one column per dimension)
    Export {
        /// Output file (config export path by default)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Corpus size and rating distribution
    Stats,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };
    if let Some(data) = &cli.data {
        config.data_path = data.clone();
    }
    Ok(config)
}

fn print_recommendations(name: &str, recs: &[Recommendation], preview_chars: usize) {
    println!("Recommended courses for '{}':", name);
    for (rank, rec) in recs.iter().enumerate() {
        let rating = rec
            .rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        println!("{:>2}. [{:.4}] {} (rating: {})", rank + 1, rec.score, rec.name, rating);
        println!("      {}", rec.preview(preview_chars));
        println!("      {}", rec.url);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            config.validate()?;
            config.ensure_directories()?;
            logger::setup_logging(&config.log_dir, &config.log_level)?;

            tracing::info!("CourseRec starting...");
            tracing::info!("  Corpus: {}", config.data_path.display());
            tracing::info!("  Bind: {}", config.server_bind_address());

            println!("Server listening on http://{}", config.server_bind_address());
            courserec_server::start_server(config).await?;
        }
        Some(Commands::Recommend { name, top_k, json }) => {
            logger::setup_console_logging(&config.log_level)?;
            let engine = SimilarityEngine::load(&config.data_path, &config.embeddings_column)?;
            let recs = engine.recommend_by_name(&name, top_k.unwrap_or(config.default_top_k))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&recs)?);
            } else {
                print_recommendations(&name, &recs, config.description_preview_chars);
            }
        }
        Some(Commands::Search {
            query,
            case_sensitive,
        }) => {
            logger::setup_console_logging(&config.log_level)?;
            let corpus = Corpus::load(&config.data_path, &config.embeddings_column)?;
            let matches = corpus.search(&query, !case_sensitive);

            println!("{} course(s) matching '{}':", matches.len(), query);
            for item in matches {
                println!("{}", serde_json::to_string(&corpus.record(item, false))?);
            }
        }
        Some(Commands::Export { output }) => {
            logger::setup_console_logging(&config.log_level)?;
            let corpus = Corpus::load(&config.data_path, &config.embeddings_column)?;
            let path = output.unwrap_or_else(|| config.export_path.clone());
            corpus.export(&path)?;

            println!("Processed data saved as '{}'", path.display());
        }
        Some(Commands::Stats) => {
            logger::setup_console_logging(&config.log_level)?;
            let corpus = Corpus::load(&config.data_path, &config.embeddings_column)?;

            println!("Courses:   {}", corpus.len());
            println!("Dimension: {}", corpus.dimension());
            println!("Rating distribution:");
            for bucket in corpus.rating_distribution() {
                let label = bucket
                    .rating
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "unrated".to_string());
                println!("  {:>8}  {:>5}  {:>5.1}%", label, bucket.count, bucket.percentage);
            }
        }
        None => {
            config.ensure_directories()?;
            logger::setup_logging(&config.log_dir, &config.log_level)?;

            tracing::info!("CourseRec starting with default configuration...");

            println!("Server listening on http://{}", config.server_bind_address());
            courserec_server::start_server(config).await?;
        }
    }

    Ok(())
}
