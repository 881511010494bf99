//! Data model shared across the crate.
//!
//! `RawRecord` mirrors one result object from the Places nearby search
//! response and is stored verbatim in the cache file; `Marker` is the
//! filtered, renderable projection of a record that passed classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A geographic coordinate as the Places API represents it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Error parsing a `"lat,lng"` coordinate string.
#[derive(Error, Debug)]
#[error("expected a 'lat,lng' coordinate pair, got {0:?}")]
pub struct ParseLatLngError(pub String);

impl FromStr for LatLng {
    type Err = ParseLatLngError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .trim()
            .split_once(',')
            .ok_or_else(|| ParseLatLngError(s.to_string()))?;
        let lat = lat
            .trim()
            .parse()
            .map_err(|_| ParseLatLngError(s.to_string()))?;
        let lng = lng
            .trim()
            .parse()
            .map_err(|_| ParseLatLngError(s.to_string()))?;
        Ok(LatLng { lat, lng })
    }
}

/// Geometry block of a place result. Only the location is used; any other
/// geometry fields (viewport etc.) ride along in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One result from the nearby search API, kept byte-faithful for the cache.
///
/// Fields the classifier and emitter care about are typed; everything else
/// the API returns is preserved through the flattened `extra` map so the
/// cache file round-trips without losing data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    /// Opaque identifier, globally unique per physical place.
    pub place_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    pub geometry: Geometry,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response envelope for one page of a nearby search.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<RawRecord>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// One `(name, value)` entry of a marker's extended-data block.
#[derive(Debug, Clone, PartialEq)]
pub struct DataEntry {
    pub name: &'static str,
    /// `None` renders as an empty value (e.g. a place with no price level).
    pub value: Option<String>,
}

/// A renderable map marker derived from a `RawRecord` that passed the
/// rating thresholds. Never persisted; always recomputed from the record.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub style_url: String,
    pub description: String,
    /// KML point coordinates, `"lng,lat,0"`.
    pub coordinates: String,
    /// Exactly three entries: rating, price_level, user_ratings_total.
    pub data: Vec<DataEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_latlng_with_negative_latitude() {
        let p: LatLng = "-33.85441,151.2012".parse().unwrap();
        assert_eq!(p.lat, -33.85441);
        assert_eq!(p.lng, 151.2012);
    }

    #[test]
    fn parses_latlng_with_surrounding_whitespace() {
        // A leading space is how shells keep the minus sign from looking
        // like an option prefix.
        let p: LatLng = " -33.0, 151.0".parse().unwrap();
        assert_eq!(p.lat, -33.0);
        assert_eq!(p.lng, 151.0);
    }

    #[test]
    fn rejects_malformed_latlng() {
        assert!("151.2012".parse::<LatLng>().is_err());
        assert!("a,b".parse::<LatLng>().is_err());
        assert!("".parse::<LatLng>().is_err());
    }

    #[test]
    fn raw_record_preserves_unknown_fields() {
        let json = r#"{
            "place_id": "abc",
            "name": "Cafe",
            "rating": 4.6,
            "user_ratings_total": 210,
            "types": ["cafe", "food"],
            "vicinity": "12 George St",
            "geometry": {"location": {"lat": -33.86, "lng": 151.2}},
            "business_status": "OPERATIONAL",
            "scope": "GOOGLE"
        }"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.place_id, "abc");
        assert_eq!(record.rating, Some(4.6));
        assert!(record.extra.contains_key("business_status"));

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["scope"], "GOOGLE");
        assert_eq!(out["geometry"]["location"]["lat"], -33.86);
    }

    #[test]
    fn search_response_tolerates_missing_results() {
        let resp: SearchResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS"}"#).unwrap();
        assert!(resp.results.is_empty());
        assert!(resp.next_page_token.is_none());
    }
}
