use futures::future::join_all;
use indicatif::ProgressBar;

use crate::tmdb;
use crate::types::{Catalog, Genre, MovieDetail, MovieSummary, YEARS};
use crate::util;

/// Resolve selected genre names to provider ids via the directory. Names the
/// directory does not carry are skipped, not errors; an empty directory
/// therefore resolves every selection to nothing.
pub fn resolve_genre_ids(directory: &[Genre], names: &[String]) -> Vec<u64> {
    names
        .iter()
        .filter_map(|name| directory.iter().find(|g| &g.name == name).map(|g| g.id))
        .collect()
}

/// Top movies of one release year narrowed to the selected genres. Transport
/// and parse failures degrade to an empty list after a warning; other years
/// are unaffected.
pub async fn query_year(
    c: &reqwest::Client,
    key: &str,
    directory: &[Genre],
    year: u16,
    genre_names: &[String],
) -> Vec<MovieSummary> {
    let ids = resolve_genre_ids(directory, genre_names);
    match tmdb::discover_year(c, key, year, &ids).await {
        Ok(results) => results,
        Err(err) => {
            util::warn(format!("movies for year {} unavailable: {:#}", year, err));
            Vec::new()
        }
    }
}

/// Fetch one movie's enriched record. A failed fetch drops the movie from its
/// year after a warning; there is no retry.
pub async fn enrich(c: &reqwest::Client, key: &str, movie_id: u64) -> Option<MovieDetail> {
    match tmdb::fetch_detail(c, key, movie_id).await {
        Ok(detail) => Some(detail),
        Err(err) => {
            util::warn(format!("movie {} dropped: {:#}", movie_id, err));
            None
        }
    }
}

/// Build the full year-keyed catalog for the selected genres.
///
/// Years run strictly in ascending order. Within a year every detail fetch is
/// launched together and the year's entry is recorded only once all of them
/// settle, keeping the query's popularity order and dropping failures. Every
/// year in the range ends up present, empty or not.
pub async fn rebuild(
    c: &reqwest::Client,
    key: &str,
    directory: &[Genre],
    genre_names: &[String],
    progress: Option<&ProgressBar>,
) -> Catalog {
    let mut catalog = Catalog::new();
    for year in YEARS {
        if let Some(pb) = progress {
            pb.set_message(year.to_string());
        }
        let summaries = query_year(c, key, directory, year, genre_names).await;
        let details = join_all(summaries.iter().map(|s| enrich(c, key, s.id))).await;
        catalog.insert(year, details.into_iter().flatten().collect());
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }
    catalog
}

/// Keep only entries whose title contains `term`, case-insensitively. An
/// empty term keeps everything; year keys are always preserved.
pub fn filter_by_title(catalog: &Catalog, term: &str) -> Catalog {
    let needle = term.to_lowercase();
    catalog
        .iter()
        .map(|(year, movies)| {
            let kept = movies
                .iter()
                .filter(|m| m.title.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            (*year, kept)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNKNOWN_DIRECTOR;

    fn directory() -> Vec<Genre> {
        vec![
            Genre { id: 28, name: "Action".into() },
            Genre { id: 35, name: "Comedy".into() },
        ]
    }

    fn movie(id: u64, title: &str) -> MovieDetail {
        MovieDetail {
            id,
            title: title.into(),
            overview: String::new(),
            poster_path: None,
            release_date: None,
            vote_average: 0.0,
            genres: vec!["Action".into()],
            cast: vec!["A".into()],
            director: UNKNOWN_DIRECTOR.into(),
        }
    }

    #[test]
    fn resolves_selected_names_to_ids() {
        assert_eq!(resolve_genre_ids(&directory(), &["Action".into()]), vec![28]);
        assert_eq!(
            resolve_genre_ids(&directory(), &["Comedy".into(), "Action".into()]),
            vec![35, 28]
        );
    }

    #[test]
    fn unknown_names_resolve_as_if_omitted() {
        assert_eq!(
            resolve_genre_ids(&directory(), &["Action".into(), "Horrer".into()]),
            vec![28]
        );
        assert!(resolve_genre_ids(&[], &["Action".into()]).is_empty());
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let mut catalog = Catalog::new();
        catalog.insert(2010, vec![movie(1, "Inception"), movie(2, "Shutter Island")]);
        catalog.insert(2011, vec![movie(3, "Drive")]);

        let narrowed = filter_by_title(&catalog, "incep");
        assert_eq!(narrowed[&2010].len(), 1);
        assert_eq!(narrowed[&2010][0].title, "Inception");
        assert!(narrowed[&2011].is_empty());
    }

    #[test]
    fn filter_keeps_all_year_keys() {
        let mut catalog = Catalog::new();
        for year in YEARS {
            catalog.insert(year, vec![movie(u64::from(year), "Something")]);
        }
        let narrowed = filter_by_title(&catalog, "no such title");
        assert_eq!(narrowed.len(), catalog.len());
        assert!(narrowed.keys().eq(catalog.keys()));
    }

    #[test]
    fn filter_is_idempotent() {
        let mut catalog = Catalog::new();
        catalog.insert(2012, vec![movie(1, "The Avengers"), movie(2, "Skyfall")]);
        let once = filter_by_title(&catalog, "sky");
        let twice = filter_by_title(&once, "sky");
        assert_eq!(once[&2012].len(), twice[&2012].len());
        assert_eq!(once[&2012][0].title, twice[&2012][0].title);
    }

    #[test]
    fn empty_term_is_identity() {
        let mut catalog = Catalog::new();
        catalog.insert(2015, vec![movie(1, "Mad Max: Fury Road")]);
        let narrowed = filter_by_title(&catalog, "");
        assert_eq!(narrowed[&2015].len(), 1);
    }

    // Every request hits a closed local port, so every per-year query fails
    // and is swallowed; the catalog must still carry all fifteen years.
    #[tokio::test]
    async fn rebuild_yields_all_years_even_when_transport_fails() {
        std::env::set_var("TMDB_API_BASE", "http://127.0.0.1:9/3");
        let client = tmdb::client();
        let catalog = rebuild(&client, "test-key", &directory(), &["Action".into()], None).await;
        std::env::remove_var("TMDB_API_BASE");

        assert_eq!(catalog.len(), 15);
        assert_eq!(*catalog.keys().next().unwrap(), 2010);
        assert_eq!(*catalog.keys().last().unwrap(), 2024);
        assert!(catalog.values().all(|movies| movies.is_empty()));
    }
}
