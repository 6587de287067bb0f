use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;

use crate::types::{Genre, MovieDetail, MovieSummary, UNKNOWN_DIRECTOR};
use crate::util;

const DEFAULT_API_BASE: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
const DEFAULT_LANGUAGE: &str = "en-US";

pub fn api_key() -> Result<String> {
    std::env::var("TMDB_API_KEY")
        .ok()
        .filter(|s| !s.is_empty())
        .context("TMDB_API_KEY is not set; export your TMDB API key first")
}

fn api_base() -> String {
    std::env::var("TMDB_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string())
}

fn language() -> String {
    std::env::var("TMDB_LANGUAGE").unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string())
}

pub fn client() -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(proxy) = std::env::var("TMDB_HTTP_PROXY").ok() {
        if let Ok(px) = reqwest::Proxy::all(proxy) { builder = builder.proxy(px); }
    }
    builder.build().expect("client build")
}

/// Full-size poster URL for a `poster_path` as returned by the provider.
pub fn poster_url(poster_path: &str) -> String {
    format!("{}{}", IMAGE_BASE, poster_path)
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    results: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    id: u64,
    title: String,
    #[serde(default)]
    overview: String,
    poster_path: Option<String>,
    release_date: Option<String>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    genres: Vec<Genre>,
    credits: CreditsBlock,
}

#[derive(Debug, Default, Deserialize)]
struct CreditsBlock {
    #[serde(default)]
    cast: Vec<CastEntry>,
    #[serde(default)]
    crew: Vec<CrewEntry>,
}

#[derive(Debug, Deserialize)]
struct CastEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CrewEntry {
    job: String,
    name: String,
}

fn genre_list_url(base: &str, key: &str, lang: &str) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/genre/movie/list", base)).context("bad API base URL")?;
    url.query_pairs_mut()
        .append_pair("api_key", key)
        .append_pair("language", lang);
    Ok(url)
}

// with_genres is always present, empty when nothing resolved; the provider
// treats an empty filter as unrestricted.
fn discover_url(base: &str, key: &str, lang: &str, year: u16, genre_ids: &[u64]) -> Result<Url> {
    let ids = genre_ids.iter().map(u64::to_string).collect::<Vec<_>>().join(",");
    let mut url = Url::parse(&format!("{}/discover/movie", base)).context("bad API base URL")?;
    url.query_pairs_mut()
        .append_pair("api_key", key)
        .append_pair("language", lang)
        .append_pair("sort_by", "popularity.desc")
        .append_pair("include_adult", "false")
        .append_pair("include_video", "false")
        .append_pair("page", "1")
        .append_pair("primary_release_year", &year.to_string())
        .append_pair("with_genres", &ids);
    Ok(url)
}

fn detail_url(base: &str, key: &str, lang: &str, movie_id: u64) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/movie/{}", base, movie_id)).context("bad API base URL")?;
    url.query_pairs_mut()
        .append_pair("api_key", key)
        .append_pair("language", lang)
        .append_pair("append_to_response", "credits");
    Ok(url)
}

/// The provider's full genre directory, in provider order.
pub async fn fetch_genres(c: &reqwest::Client, key: &str) -> Result<Vec<Genre>> {
    let url = genre_list_url(&api_base(), key, &language())?;
    util::debug(format!("GET {}", url.path()));
    let resp: GenreListResponse = c
        .get(url)
        .send()
        .await
        .context("genre list request failed")?
        .error_for_status()
        .context("genre list non-success status")?
        .json()
        .await
        .context("genre list parse failed")?;
    Ok(resp.genres)
}

/// First page of movies for one release year, most popular first, optionally
/// restricted to a set of genre ids. Never paginates past page 1.
pub async fn discover_year(
    c: &reqwest::Client,
    key: &str,
    year: u16,
    genre_ids: &[u64],
) -> Result<Vec<MovieSummary>> {
    let url = discover_url(&api_base(), key, &language(), year, genre_ids)?;
    util::debug(format!("GET {} year={}", url.path(), year));
    let resp: DiscoverResponse = c
        .get(url)
        .send()
        .await
        .with_context(|| format!("discover request for {} failed", year))?
        .error_for_status()
        .with_context(|| format!("discover non-success status for {}", year))?
        .json()
        .await
        .with_context(|| format!("discover parse failed for {}", year))?;
    Ok(resp.results)
}

/// One movie with credits appended, folded into a [`MovieDetail`].
pub async fn fetch_detail(c: &reqwest::Client, key: &str, movie_id: u64) -> Result<MovieDetail> {
    let url = detail_url(&api_base(), key, &language(), movie_id)?;
    util::debug(format!("GET {}", url.path()));
    let raw: DetailResponse = c
        .get(url)
        .send()
        .await
        .with_context(|| format!("detail request for movie {} failed", movie_id))?
        .error_for_status()
        .with_context(|| format!("detail non-success status for movie {}", movie_id))?
        .json()
        .await
        .with_context(|| format!("detail parse failed for movie {}", movie_id))?;
    Ok(fold_detail(raw))
}

fn fold_detail(raw: DetailResponse) -> MovieDetail {
    let genres = raw.genres.into_iter().map(|g| g.name).collect();
    let cast = raw
        .credits
        .cast
        .into_iter()
        .take(3)
        .map(|c| c.name)
        .collect();
    let director = raw
        .credits
        .crew
        .into_iter()
        .find(|c| c.job == "Director")
        .map(|c| c.name)
        .unwrap_or_else(|| UNKNOWN_DIRECTOR.to_string());
    MovieDetail {
        id: raw.id,
        title: raw.title,
        overview: raw.overview,
        poster_path: raw.poster_path,
        release_date: raw.release_date,
        vote_average: raw.vote_average,
        genres,
        cast,
        director,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_from_json(json: &str) -> MovieDetail {
        fold_detail(serde_json::from_str::<DetailResponse>(json).expect("detail json"))
    }

    #[test]
    fn picks_director_from_crew() {
        let detail = detail_from_json(
            r#"{
                "id": 603,
                "title": "The Matrix",
                "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
                "credits": {
                    "cast": [],
                    "crew": [
                        {"job": "Writer", "name": "A"},
                        {"job": "Director", "name": "B"},
                        {"job": "Director", "name": "C"}
                    ]
                }
            }"#,
        );
        assert_eq!(detail.director, "B");
        assert_eq!(detail.genres, vec!["Action", "Science Fiction"]);
    }

    #[test]
    fn missing_director_uses_sentinel() {
        let detail = detail_from_json(
            r#"{
                "id": 1,
                "title": "Untitled",
                "credits": {"cast": [], "crew": [{"job": "Writer", "name": "A"}]}
            }"#,
        );
        assert_eq!(detail.director, UNKNOWN_DIRECTOR);
        assert!(!detail.director.is_empty());
    }

    #[test]
    fn cast_is_capped_at_three() {
        let detail = detail_from_json(
            r#"{
                "id": 2,
                "title": "Crowded",
                "credits": {
                    "cast": [
                        {"name": "A"}, {"name": "B"}, {"name": "C"}, {"name": "D"}, {"name": "E"}
                    ],
                    "crew": []
                }
            }"#,
        );
        assert_eq!(detail.cast, vec!["A", "B", "C"]);
    }

    #[test]
    fn discover_url_carries_resolved_genres() {
        let url = discover_url("https://api.themoviedb.org/3", "k", "en-US", 2015, &[28]).unwrap();
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("with_genres".into(), "28".into())));
        assert!(query.contains(&("primary_release_year".into(), "2015".into())));
        assert!(query.contains(&("sort_by".into(), "popularity.desc".into())));
        assert!(query.contains(&("page".into(), "1".into())));
    }

    #[test]
    fn discover_url_joins_ids_with_commas() {
        let url = discover_url("https://api.themoviedb.org/3", "k", "en-US", 2020, &[28, 35]).unwrap();
        assert!(url.query().unwrap().contains("with_genres=28%2C35"));
    }

    #[test]
    fn detail_url_appends_credits() {
        let url = detail_url("https://api.themoviedb.org/3", "k", "en-US", 603).unwrap();
        assert_eq!(url.path(), "/3/movie/603");
        assert!(url.query().unwrap().contains("append_to_response=credits"));
    }

    #[test]
    fn poster_url_uses_w500() {
        assert_eq!(
            poster_url("/abc.jpg"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }
}
