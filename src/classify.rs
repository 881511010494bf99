//! Turns a raw search record into a renderable marker, or rejects it.

use crate::config::Thresholds;
use crate::models::{DataEntry, Marker, RawRecord};
use crate::styles::StyleCatalog;

/// Classifies one record against the rating thresholds.
///
/// Returns `None` when the rating or rating count is absent, or when either
/// falls below its inclusive minimum. Pure: no I/O, deterministic for
/// identical inputs.
pub fn classify(
    record: &RawRecord,
    thresholds: Thresholds,
    catalog: &StyleCatalog,
) -> Option<Marker> {
    let rating = record.rating?;
    let user_ratings_total = record.user_ratings_total?;
    if rating < thresholds.min_rating || user_ratings_total < thresholds.min_user_ratings {
        return None;
    }

    let location = record.geometry.location;
    Some(Marker {
        name: record.name.clone(),
        style_url: catalog.style_for(&record.types).to_string(),
        description: record.vicinity.clone().unwrap_or_default(),
        coordinates: format!("{},{},0", location.lng, location.lat),
        data: vec![
            DataEntry {
                name: "rating",
                value: Some(rating.to_string()),
            },
            DataEntry {
                name: "price_level",
                value: record.price_level.map(|p| p.to_string()),
            },
            DataEntry {
                name: "user_ratings_total",
                value: Some(user_ratings_total.to_string()),
            },
        ],
    })
}
