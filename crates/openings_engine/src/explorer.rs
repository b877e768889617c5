use std::collections::HashMap;
use std::io::{self, BufRead, BufReader};
use std::time::Duration;

use chess_core::Variant;
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;

use crate::config::BookConfig;
use crate::error::TransportError;
use crate::opening_book::BookQueryResult;

// Perf keys tried, in order, when a tracked player's standard rating is needed
const STANDARD_PERF_KEYS: [&str; 4] = ["blitz", "rapid", "classical", "bullet"];

/// Ordered query-string parameters for one explorer request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    // Replaces an existing key so a probe can reuse a parameter set
    pub fn set(&mut self, key: &'static str, value: impl ToString) {
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }
}

/// Whether the explorer has finished indexing a player's games.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexingStatus {
    Indexed,
    NotYetIndexed,
    Failed,
}

pub trait BookClient {
    fn query(&self, endpoint: &str, params: &QueryParams) -> Result<BookQueryResult, TransportError>;

    /// Asks for a player book only to learn whether it is ready. The server
    /// keeps indexing in the background; a timeout means it is still busy.
    fn probe(&self, endpoint: &str, params: &QueryParams) -> IndexingStatus {
        match self.query(endpoint, params) {
            Ok(_) => IndexingStatus::Indexed,
            Err(err) if err.is_timeout() => IndexingStatus::NotYetIndexed,
            Err(err) => {
                warn!("Indexing probe to {} failed: {}", endpoint, err);
                IndexingStatus::Failed
            }
        }
    }
}

/// Public profile of a player; `perfs` maps a variant or speed key to stats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Profile {
    #[serde(default)]
    perfs: HashMap<String, Perf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct Perf {
    #[serde(default)]
    rating: Option<u32>,
}

impl Profile {
    pub fn with_rating(mut self, key: &str, rating: u32) -> Self {
        self.perfs.insert(key.to_string(), Perf { rating: Some(rating) });
        self
    }

    // A missing key means no rated games for it
    pub fn rating(&self, key: &str) -> Option<u32> {
        self.perfs.get(key).and_then(|perf| perf.rating)
    }

    pub fn rating_for(&self, variant: Variant) -> Option<u32> {
        if variant.is_standard() {
            STANDARD_PERF_KEYS.iter().find_map(|key| self.rating(key))
        } else {
            self.rating(variant.key())
        }
    }
}

pub trait ProfileLookup {
    fn get_profile(&self, username: &str) -> Result<Profile, TransportError>;
}

/// Explorer answers are a single JSON document, except the player endpoint
/// which streams one document per line as indexing progresses; the last
/// complete line is the freshest.
pub fn decode_book_response(body: &str) -> Result<BookQueryResult, TransportError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(BookQueryResult::default());
    }
    if let Ok(result) = serde_json::from_str::<BookQueryResult>(body) {
        return Ok(result);
    }

    let last_line = body
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();
    serde_json::from_str(last_line).map_err(|err| TransportError::Decode(err.to_string()))
}

/// Reads a book response as it arrives. A player book that is still being
/// indexed keeps the stream open; when the read then times out or breaks,
/// the last complete line already received is the answer. Only a stream
/// that never delivered a full line is an error.
pub fn read_book_stream<R: BufRead>(mut reader: R) -> Result<BookQueryResult, TransportError> {
    let mut body = String::new();
    let mut last_line: Option<String> = None;

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => return decode_book_response(&body),
            Ok(_) => {
                if line.ends_with('\n') && !line.trim().is_empty() {
                    last_line = Some(line.trim().to_string());
                }
                body.push_str(&line);
            }
            Err(err) => {
                return match last_line {
                    Some(line) => {
                        debug!("Book stream cut short ({}), using the last complete line", err);
                        decode_book_response(&line)
                    }
                    None => Err(map_io_error(err)),
                };
            }
        }
    }
}

fn map_io_error(err: io::Error) -> TransportError {
    let reqwest_timeout = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
        .map_or(false, reqwest::Error::is_timeout);
    match err.kind() {
        _ if reqwest_timeout => TransportError::Timeout,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::Timeout,
        io::ErrorKind::InvalidData => TransportError::Decode(err.to_string()),
        _ => TransportError::Network(err.to_string()),
    }
}

/// Blocking HTTP client for the explorer and profile endpoints. It does not
/// retry; a failed request surfaces as a [`TransportError`].
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: Client,
    profile_url: String,
    probe_timeout: Duration,
}

impl ExplorerClient {
    pub fn new(config: &BookConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("openings-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self {
            http,
            profile_url: config.profile_url.trim_end_matches('/').to_string(),
            probe_timeout: config.probe_timeout(),
        })
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = request.send().map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if let Some(status) = err.status() {
        TransportError::Status {
            status: status.as_u16(),
        }
    } else if err.is_decode() {
        TransportError::Decode(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}

impl BookClient for ExplorerClient {
    fn query(&self, endpoint: &str, params: &QueryParams) -> Result<BookQueryResult, TransportError> {
        debug!("GET {} {:?}", endpoint, params.pairs());
        let response = self.send(self.http.get(endpoint).query(params.pairs()))?;
        read_book_stream(BufReader::new(response))
    }

    fn probe(&self, endpoint: &str, params: &QueryParams) -> IndexingStatus {
        let request = self
            .http
            .get(endpoint)
            .query(params.pairs())
            .timeout(self.probe_timeout);
        // Indexed means the whole stream finished inside the probe timeout
        match self.send(request).and_then(|response| response.text().map_err(map_reqwest_error)) {
            Ok(_) => IndexingStatus::Indexed,
            Err(TransportError::Timeout) => IndexingStatus::NotYetIndexed,
            Err(err) => {
                warn!("Indexing probe to {} failed: {}", endpoint, err);
                IndexingStatus::Failed
            }
        }
    }
}

impl ProfileLookup for ExplorerClient {
    fn get_profile(&self, username: &str) -> Result<Profile, TransportError> {
        let url = format!("{}/{}", self.profile_url, username);
        self.send(self.http.get(url))?
            .json::<Profile>()
            .map_err(map_reqwest_error)
    }
}
