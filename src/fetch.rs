//! Paginated nearby-search queries against one grid cell.
//!
//! The external API has a two-request shape that must be preserved exactly:
//! the first request is parameterized by location, type and ranking; every
//! continuation request is parameterized solely by the page token (location
//! and type are implicit in it). Tokens are single-use and need a fixed
//! delay before they become valid.

use log::{debug, warn};
use tokio::time::sleep;

use crate::config::{PAGE_TOKEN_DELAY, PLACES_API_URL};
use crate::error_handling::FetchError;
use crate::models::{LatLng, SearchResponse};
use crate::store::{ResultStore, UpsertOutcome};

/// One of the API's two request shapes.
#[derive(Debug, Clone)]
pub enum PageQuery<'a> {
    /// First page of a cell: location + category + nearest-first ranking.
    Initial {
        location: LatLng,
        search_type: &'a str,
    },
    /// Follow-up page: continuation token only.
    Continuation { token: &'a str },
}

/// One page fetch against the nearby search API.
///
/// The seam between the traversal and the HTTP layer; tests drive the drain
/// loop with a scripted implementation and tokio's paused clock.
pub trait NearbyClient {
    fn fetch_page(
        &self,
        query: PageQuery<'_>,
    ) -> impl std::future::Future<Output = Result<SearchResponse, FetchError>>;
}

/// `reqwest`-backed client for the real endpoint.
pub struct PlacesClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PlacesClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        PlacesClient {
            http,
            api_key,
            base_url: PLACES_API_URL.to_string(),
        }
    }
}

impl NearbyClient for PlacesClient {
    async fn fetch_page(&self, query: PageQuery<'_>) -> Result<SearchResponse, FetchError> {
        let request = match query {
            PageQuery::Initial {
                location,
                search_type,
            } => {
                debug!("requesting page at {location} type={search_type}");
                self.http.get(&self.base_url).query(&[
                    ("location", location.to_string()),
                    ("type", search_type.to_string()),
                    ("rankby", "distance".to_string()),
                    ("key", self.api_key.clone()),
                ])
            }
            PageQuery::Continuation { token } => {
                debug!("requesting continuation page");
                self.http.get(&self.base_url).query(&[
                    ("pagetoken", token.to_string()),
                    ("key", self.api_key.clone()),
                ])
            }
        };
        let response: SearchResponse = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        check_envelope(response)
    }
}

/// Maps the API's in-band `status` field onto the error taxonomy.
/// `ZERO_RESULTS` is a successful empty page, not an error.
fn check_envelope(response: SearchResponse) -> Result<SearchResponse, FetchError> {
    match response.status.as_str() {
        "OK" | "ZERO_RESULTS" => Ok(response),
        _ => Err(FetchError::Api {
            status: response.status,
            detail: response
                .error_message
                .map(|m| format!(": {m}"))
                .unwrap_or_default(),
        }),
    }
}

/// Aggregate counts for one drained cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct CellStats {
    pub new: usize,
    pub duplicates: usize,
    pub pages: usize,
}

/// Pagination position within one cell.
enum PageState {
    Initial,
    /// A continuation token is pending; the fixed delay runs before it is
    /// redeemed.
    Draining(String),
}

/// Drains every page of one cell, feeding each record into the store.
///
/// Any transport or API error aborts the traversal step; there is no retry.
/// The zero-new / zero-duplicate conditions are advisory telemetry only: no
/// duplicates suggests the grid cells do not overlap, nothing new suggests
/// an already-cached or empty area.
pub async fn drain_cell<C: NearbyClient>(
    client: &C,
    cell: LatLng,
    search_type: &str,
    store: &mut ResultStore,
) -> Result<CellStats, FetchError> {
    let mut stats = CellStats::default();
    let mut state = PageState::Initial;

    loop {
        let response = match &state {
            PageState::Initial => {
                client
                    .fetch_page(PageQuery::Initial {
                        location: cell,
                        search_type,
                    })
                    .await?
            }
            PageState::Draining(token) => {
                sleep(PAGE_TOKEN_DELAY).await;
                client.fetch_page(PageQuery::Continuation { token }).await?
            }
        };
        stats.pages += 1;

        for record in response.results {
            match store.upsert(record) {
                UpsertOutcome::New => stats.new += 1,
                UpsertOutcome::Duplicate => stats.duplicates += 1,
            }
        }

        match response.next_page_token {
            Some(token) => state = PageState::Draining(token),
            None => break,
        }
    }

    if stats.duplicates == 0 {
        warn!("no duplicates at {cell}; grid cells may not overlap");
    }
    if stats.new == 0 {
        warn!("nothing new at {cell}; area already cached or empty");
    }
    if stats.pages > 1 {
        debug!("{cell}: drained {} pages", stats.pages);
    }
    Ok(stats)
}
