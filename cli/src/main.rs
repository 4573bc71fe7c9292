//! `catalog` - command-line front end for the literary catalog.

mod render;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use catalog_core::{
    AggregateComposer, Catalog, ClientConfig, Composition, NewGenre, NewReview, TitleFilter, TitleKind,
};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "catalog", version, about = "Browse and manage the literary catalog")]
struct Cli {
    /// Base URL of the catalog API [env: CATALOG_API_URL].
    #[arg(long)]
    api_url: Option<String>,

    /// Per-request timeout in seconds [env: CATALOG_HTTP_TIMEOUT_SECS].
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show a title with its kind-specific record, genres and credits.
    Detail { id: String },
    /// List titles, optionally filtered by name and kind.
    Titles {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        kind: Option<TitleKind>,
    },
    /// Delete a title.
    Delete {
        id: String,
        /// Skip the confirmation guard.
        #[arg(long)]
        yes: bool,
    },
    /// List genres, or create one with --name and --description.
    Genres {
        #[arg(long, requires = "description")]
        name: Option<String>,
        #[arg(long, requires = "name")]
        description: Option<String>,
    },
    /// List persons.
    Persons,
    /// List the credits of a title.
    Credits { id: String },
    /// Submit a review for a title.
    Review {
        id: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = 5)]
        rating: u8,
        #[arg(long, default_value = "")]
        comment: String,
        #[arg(long)]
        spoiler: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.api_url {
        config.base_url = url.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    debug!(?config, "resolved configuration");

    match cli.command {
        Command::Detail { id } => detail(&config, &id).await,
        Command::Titles { search, kind } => {
            let catalog = Catalog::from_config(&config)?;
            let titles = catalog.list_titles().await.context("could not load titles")?;
            let filter = TitleFilter::new(&search, kind);
            print!("{}", render::titles(&filter.apply(&titles)));
            Ok(())
        }
        Command::Delete { id, yes } => {
            if !yes {
                bail!("refusing to delete `{id}` without --yes");
            }
            let composer = AggregateComposer::from_config(&config)?;
            composer
                .delete_title(&id)
                .await
                .with_context(|| format!("could not delete title `{id}`"))?;
            info!(%id, "deleted");
            println!("Title deleted.");
            Ok(())
        }
        Command::Genres { name, description } => {
            let catalog = Catalog::from_config(&config)?;
            if let (Some(name), Some(description)) = (name, description) {
                let genre = catalog.create_genre(&NewGenre { name, description }).await?;
                println!("Created genre {} ({}).", genre.name, genre.id_genre);
                return Ok(());
            }
            let genres = catalog.list_genres().await.context("could not load genres")?;
            print!("{}", render::genres(&genres));
            Ok(())
        }
        Command::Persons => {
            let catalog = Catalog::from_config(&config)?;
            let persons = catalog.list_persons().await.context("could not load persons")?;
            print!("{}", render::persons(&persons));
            Ok(())
        }
        Command::Credits { id } => {
            let catalog = Catalog::from_config(&config)?;
            let credits = catalog.title_credits(&id).await.context("could not load credits")?;
            for credit in credits {
                println!("{:>4}  {} - {}", credit.id_person, credit.person_name, credit.role);
            }
            Ok(())
        }
        Command::Review {
            id,
            email,
            rating,
            comment,
            spoiler,
        } => {
            let catalog = Catalog::from_config(&config)?;
            let mut review = NewReview::new(&id, &email, rating, &comment);
            review.spoiler = spoiler;
            catalog.submit_review(&review).await.context("could not submit review")?;
            println!("Review submitted.");
            Ok(())
        }
    }
}

async fn detail(config: &ClientConfig, id: &str) -> Result<()> {
    let composer = AggregateComposer::from_config(config)?;
    match composer.load(id).await {
        Ok(Composition::Ready(aggregate)) => {
            print!("{}", render::aggregate(&aggregate));
            Ok(())
        }
        Ok(Composition::Skipped) => bail!("a title id is required"),
        Ok(Composition::Superseded) => Ok(()),
        Err(e) => Err(e).context("could not load the title detail"),
    }
}
