//! Rectangular grid enumeration and the traversal loop.
//!
//! The grid starts at its north-west corner and is scanned row-major:
//! latitude decreases one cell size per row (north to south) while each row
//! sweeps longitude west to east. Traversal is strictly sequential with one
//! outstanding request at a time; the first fetch error aborts the run.

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use thiserror::Error;

use crate::config::KM_TO_DEGREES;
use crate::error_handling::FetchError;
use crate::fetch::{drain_cell, NearbyClient};
use crate::models::LatLng;
use crate::store::ResultStore;

/// Grid extent as cell counts, parsed from the `WxH` CLI form
/// (W cells along longitude, H cells along latitude).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridExtent {
    pub lng_total: u32,
    pub lat_total: u32,
}

/// Error parsing a `"WxH"` grid extent.
#[derive(Error, Debug)]
#[error("expected a WxH pair of positive cell counts, got {0:?}")]
pub struct ParseGridExtentError(pub String);

impl FromStr for GridExtent {
    type Err = ParseGridExtentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| ParseGridExtentError(s.to_string()))?;
        let lng_total: u32 = w
            .trim()
            .parse()
            .map_err(|_| ParseGridExtentError(s.to_string()))?;
        let lat_total: u32 = h
            .trim()
            .parse()
            .map_err(|_| ParseGridExtentError(s.to_string()))?;
        if lng_total == 0 || lat_total == 0 {
            return Err(ParseGridExtentError(s.to_string()));
        }
        Ok(GridExtent {
            lng_total,
            lat_total,
        })
    }
}

impl fmt::Display for GridExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.lng_total, self.lat_total)
    }
}

/// The traversal configuration: start corner, cell size and extent.
#[derive(Debug, Clone, Copy)]
pub struct GridSpec {
    /// North-west corner of the grid.
    pub start: LatLng,
    pub block_size_km: f64,
    pub extent: GridExtent,
}

impl GridSpec {
    /// Cell size converted to degrees with the fixed linear approximation.
    pub fn cell_size_degrees(&self) -> f64 {
        KM_TO_DEGREES * self.block_size_km
    }

    pub fn cell_count(&self) -> usize {
        self.extent.lat_total as usize * self.extent.lng_total as usize
    }

    /// Enumerates every cell coordinate in row-major scan order.
    pub fn cells(&self) -> impl Iterator<Item = LatLng> + '_ {
        let step = self.cell_size_degrees();
        (0..self.extent.lat_total).flat_map(move |row| {
            (0..self.extent.lng_total).map(move |col| LatLng {
                lat: self.start.lat - step * row as f64,
                lng: self.start.lng + step * col as f64,
            })
        })
    }
}

/// Aggregate counts for one full traversal.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkStats {
    pub cells: usize,
    pub pages: usize,
    pub new: usize,
    pub duplicates: usize,
}

/// Visits every grid cell in order, draining its pages into the store.
///
/// Returns the failing cell's coordinate alongside any fetch error so the
/// caller can report where the run aborted.
pub async fn walk<C: NearbyClient>(
    spec: &GridSpec,
    search_type: &str,
    client: &C,
    store: &mut ResultStore,
) -> Result<WalkStats, (LatLng, FetchError)> {
    info!(
        "scanning {} grid of {}km cells from {}",
        spec.extent, spec.block_size_km, spec.start
    );
    let mut stats = WalkStats::default();
    for cell in spec.cells() {
        debug!("cell {}/{} at {cell}", stats.cells + 1, spec.cell_count());
        let cell_stats = drain_cell(client, cell, search_type, store)
            .await
            .map_err(|e| (cell, e))?;
        stats.cells += 1;
        stats.pages += cell_stats.pages;
        stats.new += cell_stats.new;
        stats.duplicates += cell_stats.duplicates;
    }
    info!(
        "scanned {} cells over {} pages: {} new, {} duplicates, {} records total",
        stats.cells,
        stats.pages,
        stats.new,
        stats.duplicates,
        store.record_count()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grid_extent() {
        let extent: GridExtent = "10x30".parse().unwrap();
        assert_eq!(
            extent,
            GridExtent {
                lng_total: 10,
                lat_total: 30
            }
        );
    }

    #[test]
    fn rejects_bad_extents() {
        assert!("10".parse::<GridExtent>().is_err());
        assert!("0x5".parse::<GridExtent>().is_err());
        assert!("5x0".parse::<GridExtent>().is_err());
        assert!("axb".parse::<GridExtent>().is_err());
    }

    #[test]
    fn enumerates_cells_row_major_north_to_south() {
        let spec = GridSpec {
            start: LatLng {
                lat: -33.0,
                lng: 151.0,
            },
            block_size_km: 0.5,
            extent: GridExtent {
                lng_total: 3,
                lat_total: 2,
            },
        };
        let step = 0.0090 * 0.5;
        let cells: Vec<LatLng> = spec.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(spec.cell_count(), 6);

        // First row sweeps east at the start latitude.
        assert_eq!(cells[0], LatLng { lat: -33.0, lng: 151.0 });
        assert_eq!(cells[1].lng, 151.0 + step);
        assert_eq!(cells[2].lng, 151.0 + 2.0 * step);
        assert!(cells[..3].iter().all(|c| c.lat == -33.0));

        // Second row moved one step south, sweeping east again.
        assert_eq!(cells[3], LatLng { lat: -33.0 - step, lng: 151.0 });
        assert_eq!(cells[5].lng, 151.0 + 2.0 * step);
    }

    #[test]
    fn single_cell_grid_is_just_the_start() {
        let spec = GridSpec {
            start: LatLng { lat: 10.0, lng: 20.0 },
            block_size_km: 1.0,
            extent: GridExtent {
                lng_total: 1,
                lat_total: 1,
            },
        };
        let cells: Vec<LatLng> = spec.cells().collect();
        assert_eq!(cells, vec![LatLng { lat: 10.0, lng: 20.0 }]);
    }
}
