use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

mod catalog;
mod tmdb;
mod types;
mod util;

use types::Genre;

#[derive(Parser, Debug)]
#[command(name = "moviefix", version, about = "Browse TMDB movies by year and genre", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Print debug logs
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the provider's movie genres
    Genres,

    /// Top movies of one release year, optionally narrowed by genre
    Year {
        year: u16,
        /// Genre name filter; repeat to select several
        #[arg(short, long = "genre")]
        genres: Vec<String>,
    },

    /// Full detail for one movie id, credits included
    #[command(visible_alias = "show")]
    Detail { id: u64 },

    /// Build the 2010-2024 catalog, optionally narrowed by genre and title search
    #[command(visible_alias = "build")]
    Catalog {
        /// Genre name filter; repeat to select several
        #[arg(short, long = "genre")]
        genres: Vec<String>,

        /// Keep only titles containing this text
        #[arg(short, long)]
        search: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    util::set_debug(cli.debug);

    let key = tmdb::api_key()?;
    let client = tmdb::client();

    match cli.command {
        Commands::Genres => {
            let genres = tmdb::fetch_genres(&client, &key).await?;
            if cli.json {
                util::print_output(&genres, true);
            } else {
                util::print_genres_table(&genres);
            }
            Ok(())
        }
        Commands::Year { year, genres } => {
            let directory = load_directory(&client, &key).await;
            let summaries = catalog::query_year(&client, &key, &directory, year, &genres).await;
            if cli.json {
                util::print_output(&summaries, true);
            } else {
                util::print_summaries_table(&summaries);
            }
            Ok(())
        }
        Commands::Detail { id } => {
            let detail = tmdb::fetch_detail(&client, &key, id).await?;
            if cli.json {
                util::print_output(&detail, true);
            } else {
                util::print_detail_human(&detail);
            }
            Ok(())
        }
        Commands::Catalog { genres, search } => {
            let directory = load_directory(&client, &key).await;
            let pb = year_progress();
            let built = catalog::rebuild(&client, &key, &directory, &genres, Some(&pb)).await;
            pb.finish_and_clear();

            let shown = match search.as_deref() {
                Some(term) => catalog::filter_by_title(&built, term),
                None => built,
            };
            if cli.json {
                util::print_output(&shown, true);
            } else {
                util::print_catalog_human(&shown);
            }
            Ok(())
        }
    }
}

/// The genre directory loads once per run. In pipeline contexts a failed load
/// degrades to an empty directory, so genre selections resolve to nothing and
/// queries run unrestricted.
async fn load_directory(c: &reqwest::Client, key: &str) -> Vec<Genre> {
    match tmdb::fetch_genres(c, key).await {
        Ok(genres) => genres,
        Err(err) => {
            util::warn(format!(
                "genre list unavailable, genre filters will be ignored: {:#}",
                err
            ));
            Vec::new()
        }
    }
}

fn year_progress() -> ProgressBar {
    let pb = ProgressBar::new(types::YEARS.count() as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
            .expect("progress template"),
    );
    pb
}
