use anyhow::{Result, anyhow};
use bpscan::config::{AnalyzerConfig, load_config_from_yaml};
use bpscan::extract::build_element_tree;
use bpscan::model::Analysis;
use bpscan::service::AnalysisService;
use bpscan::storage::AnalysisStore;
use bpscan::storage::InMemoryAnalysisStore;
use bpscan::storage::redis_storage::RedisAnalysisStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML config file (limits, extra VBO name patterns, Redis key prefix)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze export files and print the results as JSON
    Analyze {
        /// .bpprocess, .bpobject or .bprelease files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the Application Modeller tree of a business object
    Tree {
        /// Path to a .bpobject file
        file: PathBuf,
    },

    /// Analyze a file and persist the result to Redis
    Submit {
        file: PathBuf,

        /// Redis connection URL
        #[arg(long, default_value = "redis://127.0.0.1:6379/0")]
        redis: String,
    },

    /// Fetch a stored analysis from Redis
    Show {
        id: Uuid,

        /// Redis connection URL
        #[arg(long, default_value = "redis://127.0.0.1:6379/0")]
        redis: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AnalyzerConfig> {
    match path {
        Some(p) => load_config_from_yaml(&p.to_string_lossy()),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn redis_store(url: &str, config: &AnalyzerConfig) -> Result<Arc<RedisAnalysisStore>> {
    let client = redis::Client::open(url).map_err(|e| anyhow!("Invalid Redis URL {}: {}", url, e))?;
    Ok(Arc::new(RedisAnalysisStore::new(client, config.redis_key_prefix.clone())))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Analyze { files, pretty } => {
            let service = AnalysisService::new(config, Arc::new(InMemoryAnalysisStore::new()))?;
            let mut failures = 0;

            for file in files {
                match service.ingest_file(&file).await {
                    Ok(record) => {
                        let json = if pretty {
                            serde_json::to_string_pretty(&record)?
                        } else {
                            serde_json::to_string(&record)?
                        };
                        println!("{}", json);
                    }
                    Err(e) => {
                        error!("Failed to analyze {}: {:#}", file.display(), e);
                        failures += 1;
                    }
                }
            }

            if failures > 0 {
                return Err(anyhow!("{} file(s) could not be analyzed", failures));
            }
        }

        Commands::Tree { file } => {
            let service = AnalysisService::new(config, Arc::new(InMemoryAnalysisStore::new()))?;
            let record = service.ingest_file(&file).await?;
            let Analysis::Vbo(vbo) = record.analysis else {
                return Err(anyhow!("{} is not a business object", file.display()));
            };
            let tree = build_element_tree(&vbo.elements);
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }

        Commands::Submit { file, redis } => {
            info!("Submitting to Redis: {}", redis);
            let store = redis_store(&redis, &config)?;
            let service = AnalysisService::new(config, store)?;

            let record = service.ingest_file(&file).await?;
            info!("Analysis submitted successfully! Record ID: {}", record.id);
            println!("{}", record.id);
        }

        Commands::Show { id, redis } => {
            let store = redis_store(&redis, &config)?;
            match store.get(id).await? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => return Err(anyhow!("No analysis stored with id {}", id)),
            }
        }
    }

    Ok(())
}
