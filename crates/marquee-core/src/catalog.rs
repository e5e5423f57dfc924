//! Catalog collaborator
//!
//! Read-only metadata API client for the home screen rows and the detail
//! view of a selected title. The detail record carries a nested video
//! listing; its first trailer becomes the [`MediaRef`] the playback view
//! embeds.

use crate::{
    types::{EmbedProvider, MediaRef},
    Error, Result,
};
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Default metadata API root
pub const DEFAULT_API_BASE: &str = "https://api.themoviedb.org/3/";
/// Artwork root, w500 rendition
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "MARQUEE_API_KEY";

/// Media type of a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Movie,
    Tv,
    #[serde(other)]
    Other,
}

impl MediaType {
    /// Detail endpoint segment. Anything that isn't tv is looked up as a movie
    pub fn path_segment(&self) -> &'static str {
        match self {
            MediaType::Tv => "tv",
            MediaType::Movie | MediaType::Other => "movie",
        }
    }
}

/// Title record as returned in list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl Title {
    /// `title`, then `name`, then `original_name`
    pub fn display_name(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .or(self.original_name.as_deref())
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type.unwrap_or_default()
    }

    /// Year of `release_date`, or `first_air_date` for shows
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .filter(|d| !d.is_empty())
            .or(self.first_air_date.as_deref().filter(|d| !d.is_empty()))
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(|d| d.year())
    }

    /// Backdrop artwork, falling back to the poster
    pub fn artwork_path(&self) -> Option<&str> {
        self.backdrop_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .or(self.poster_path.as_deref().filter(|p| !p.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Entry of a title's nested video listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Video {
    /// Media reference for a supported host
    pub fn media_ref(&self) -> Option<MediaRef> {
        let provider = match self.site.to_ascii_lowercase().as_str() {
            "youtube" => EmbedProvider::YouTube,
            "vimeo" => EmbedProvider::Vimeo,
            _ => return None,
        };
        Some(MediaRef::new(provider, self.key.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoListing {
    #[serde(default)]
    pub results: Vec<Video>,
}

/// Detail record for a selected title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleDetails {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub videos: Option<VideoListing>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
}

impl TitleDetails {
    /// First video of type "Trailer"
    pub fn trailer(&self) -> Option<&Video> {
        self.videos
            .as_ref()?
            .results
            .iter()
            .find(|v| v.kind == "Trailer")
    }

    /// Embeddable reference for the trailer, if it is on a supported host
    pub fn trailer_ref(&self) -> Option<MediaRef> {
        self.trailer().and_then(Video::media_ref)
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Page {
    #[serde(default)]
    results: Vec<Title>,
}

/// Home screen rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Row {
    Originals,
    Trending,
    TopRated,
    Action,
    Comedy,
    Horror,
    Romance,
    Documentaries,
}

impl Row {
    pub const ALL: [Row; 8] = [
        Row::Originals,
        Row::Trending,
        Row::TopRated,
        Row::Action,
        Row::Comedy,
        Row::Horror,
        Row::Romance,
        Row::Documentaries,
    ];

    /// Endpoint path and extra query pairs
    fn endpoint(&self) -> (&'static str, Option<(&'static str, &'static str)>) {
        match self {
            Row::Originals => ("discover/tv", Some(("with_networks", "213"))),
            Row::Trending => ("trending/all/week", None),
            Row::TopRated => ("movie/top_rated", None),
            Row::Action => ("discover/movie", Some(("with_genres", "28"))),
            Row::Comedy => ("discover/movie", Some(("with_genres", "35"))),
            Row::Horror => ("discover/movie", Some(("with_genres", "27"))),
            Row::Romance => ("discover/movie", Some(("with_genres", "10749"))),
            Row::Documentaries => ("discover/movie", Some(("with_genres", "99"))),
        }
    }
}

/// Titles fetched for every home screen row. A failed row is empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeScreen {
    pub rows: Vec<(Row, Vec<Title>)>,
}

impl HomeScreen {
    pub fn row(&self, row: Row) -> &[Title] {
        self.rows
            .iter()
            .find(|(r, _)| *r == row)
            .map(|(_, titles)| titles.as_slice())
            .unwrap_or(&[])
    }
}

/// Catalog client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: Url,
    pub image_base: String,
    pub api_key: String,
    pub language: String,
    pub request_timeout_ms: u64,
}

impl CatalogConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(DEFAULT_API_BASE)?,
            image_base: DEFAULT_IMAGE_BASE.to_string(),
            api_key: api_key.into(),
            language: "en-US".to_string(),
            request_timeout_ms: 10_000,
        })
    }

    /// Read the API key from `MARQUEE_API_KEY`
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(API_KEY_ENV)
            .map_err(|_| Error::InvalidConfig(format!("{} is not set", API_KEY_ENV)))?;
        Self::new(key)
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Full artwork URL for a title
    pub fn image_url(&self, title: &Title) -> Option<String> {
        title
            .artwork_path()
            .map(|path| format!("{}{}", self.image_base.trim_end_matches('/'), path))
    }

    /// Detail call for a selected title, with the video listing appended
    pub fn detail_url(&self, id: u64, media_type: MediaType) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("{}/{}", media_type.path_segment(), id))?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("language", &self.language)
            .append_pair("append_to_response", "videos");
        Ok(url)
    }

    pub fn row_url(&self, row: Row) -> Result<Url> {
        let (path, extra) = row.endpoint();
        let mut url = self.base_url.join(path)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("api_key", &self.api_key)
                .append_pair("language", &self.language);
            if let Some((key, value)) = extra {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

/// HTTP client for the metadata API
#[derive(Debug, Clone)]
pub struct CatalogClient {
    config: CatalogConfig,
    client: Client,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Fetch the detail record of a selected title
    #[instrument(skip(self))]
    pub async fn details(&self, id: u64, media_type: MediaType) -> Result<TitleDetails> {
        let url = self.config.detail_url(id, media_type)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::CatalogFetch(format!(
                "{} {} returned {}",
                media_type.path_segment(),
                id,
                response.status()
            )));
        }
        let details: TitleDetails = response.json().await?;
        debug!(
            id,
            videos = details.videos.as_ref().map(|v| v.results.len()).unwrap_or(0),
            "Title details fetched"
        );
        Ok(details)
    }

    /// Trailer reference for a title, `None` when it has none
    pub async fn trailer(&self, title: &Title) -> Result<Option<MediaRef>> {
        let details = self.details(title.id, title.media_type()).await?;
        Ok(details.trailer_ref())
    }

    /// Fetch one row
    #[instrument(skip(self))]
    pub async fn row(&self, row: Row) -> Result<Vec<Title>> {
        let url = self.config.row_url(row)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::CatalogFetch(format!("{:?} returned {}", row, response.status())));
        }
        let page: Page = response.json().await?;
        Ok(page.results)
    }

    /// Fetch every row concurrently; a failed row comes back empty
    pub async fn home(&self) -> HomeScreen {
        let (originals, trending, top_rated, action, comedy, horror, romance, documentaries) = tokio::join!(
            self.row_or_empty(Row::Originals),
            self.row_or_empty(Row::Trending),
            self.row_or_empty(Row::TopRated),
            self.row_or_empty(Row::Action),
            self.row_or_empty(Row::Comedy),
            self.row_or_empty(Row::Horror),
            self.row_or_empty(Row::Romance),
            self.row_or_empty(Row::Documentaries),
        );

        HomeScreen {
            rows: vec![
                (Row::Originals, originals),
                (Row::Trending, trending),
                (Row::TopRated, top_rated),
                (Row::Action, action),
                (Row::Comedy, comedy),
                (Row::Horror, horror),
                (Row::Romance, romance),
                (Row::Documentaries, documentaries),
            ],
        }
    }

    async fn row_or_empty(&self, row: Row) -> Vec<Title> {
        match self.row(row).await {
            Ok(titles) => titles,
            Err(e) => {
                warn!(row = ?row, error = %e, "Row fetch failed");
                Vec::new()
            }
        }
    }
}
