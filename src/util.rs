use colored::*;
use serde::Serialize;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::tmdb;
use crate::types::{Catalog, Genre, MovieDetail, MovieSummary};

static DEBUG: AtomicBool = AtomicBool::new(false);

pub fn set_debug(on: bool) {
    DEBUG.store(on, Ordering::Relaxed);
}

pub fn is_debug() -> bool {
    DEBUG.load(Ordering::Relaxed)
}

pub fn debug<S: AsRef<str>>(msg: S) {
    if is_debug() {
        eprintln!("[DEBUG] {}", msg.as_ref());
    }
}

/// Swallowed pipeline failures still get a line on stderr.
pub fn warn<S: AsRef<str>>(msg: S) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg.as_ref());
}

pub fn print_output<T: Serialize + std::fmt::Debug>(value: &T, json: bool) {
    if json {
        match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(_) => println!("{:?}", value),
        }
    } else {
        println!("{:?}", value);
    }
}

/// Long overviews render as their first 97 characters plus an ellipsis.
pub fn truncate_overview(overview: &str) -> String {
    if overview.chars().count() > 100 {
        let head: String = overview.chars().take(97).collect();
        format!("{}...", head)
    } else {
        overview.to_string()
    }
}

pub fn print_genres_table(genres: &[Genre]) {
    println!("{} {}", "Total".bold(), genres.len());

    let id_header = "ID";
    let name_header = "Genre";
    let id_width = std::cmp::max(
        id_header.len(),
        genres.iter().map(|g| g.id.to_string().len()).max().unwrap_or(0),
    );

    println!("{:<iw$}  {}", id_header.bold(), name_header.bold(), iw = id_width);
    println!("{:<iw$}  {}", "-".repeat(id_width), "-".repeat(10), iw = id_width);
    for g in genres {
        println!("{:<iw$}  {}", g.id, g.name, iw = id_width);
    }
}

pub fn print_summaries_table(items: &[MovieSummary]) {
    println!("{} {}", "Total".bold(), items.len());

    let index_header = "#";
    let id_header = "ID";
    let title_header = "Title";

    let index_width = std::cmp::max(index_header.len(), items.len().to_string().len());
    let id_width = std::cmp::max(
        id_header.len(),
        items.iter().map(|i| i.id.to_string().len()).max().unwrap_or(0),
    );

    println!(
        "{:<iw$}  {:<dw$}  {}",
        index_header.bold(),
        id_header.bold(),
        title_header.bold(),
        iw = index_width,
        dw = id_width
    );
    println!(
        "{:<iw$}  {:<dw$}  {}",
        "-".repeat(index_width),
        "-".repeat(id_width),
        "-".repeat(10),
        iw = index_width,
        dw = id_width
    );
    for (idx, item) in items.iter().enumerate() {
        let date = item.release_date.as_deref().unwrap_or("");
        println!(
            "{:<iw$}  {:<dw$}  {}  {}",
            idx + 1,
            item.id,
            item.title,
            date.dimmed(),
            iw = index_width,
            dw = id_width
        );
    }
}

pub fn print_detail_human(detail: &MovieDetail) {
    println!("{} {}", detail.title.bold(), format!("({})", detail.id).dimmed());
    if let Some(date) = &detail.release_date {
        println!("Released: {}", date);
    }
    if !detail.genres.is_empty() {
        println!("Genres:   {}", detail.genres.join(", "));
    }
    if !detail.cast.is_empty() {
        println!("Cast:     {}", detail.cast.join(", "));
    }
    println!("Director: {}", detail.director);
    if detail.vote_average > 0.0 {
        println!("Rating:   {:.1}", detail.vote_average);
    }
    if let Some(path) = &detail.poster_path {
        println!("Poster:   {}", tmdb::poster_url(path));
    }
    if !detail.overview.is_empty() {
        println!("Overview: {}", truncate_overview(&detail.overview));
    }
}

pub fn print_catalog_human(catalog: &Catalog) {
    for (year, movies) in catalog {
        println!();
        println!("{}", year.to_string().bold().cyan());
        if movies.is_empty() {
            println!("  {}", "(no movies)".dimmed());
            continue;
        }
        for m in movies {
            println!("  {} | {}", m.title.bold(), m.director);
            if !m.genres.is_empty() {
                println!("    {}", m.genres.join(", ").dimmed());
            }
            if !m.cast.is_empty() {
                println!("    Cast: {}", m.cast.join(", "));
            }
            if !m.overview.is_empty() {
                println!("    {}", truncate_overview(&m.overview));
            }
        }
    }
}
