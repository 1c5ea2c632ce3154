//! Bounded, grid-keyed enrichment cache with single-flight lookups.
//!
//! Nearby points share one cache cell: coordinates are rounded to a fixed
//! angular grid (~0.002 degrees, 100-220m depending on latitude) so a
//! route passing through a block issues one outbound call per cell, not
//! one per sampled point. Each cell holds a `tokio` once-cell, so
//! concurrent misses on the same cell wait for a single in-flight fetch
//! instead of duplicating it. Entries persist until the capacity bound
//! evicts the oldest cells.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;

pub const DEFAULT_GRID_DEG: f64 = 0.002;
pub const DEFAULT_MAX_ENTRIES: usize = 4096;

/// Coordinates rounded to the nearest grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridKey {
    lat_cell: i64,
    lon_cell: i64,
}

impl GridKey {
    pub fn new(lat: f64, lon: f64, grid_deg: f64) -> Self {
        let grid = grid_deg.max(1e-9);
        Self {
            lat_cell: (lat / grid).round() as i64,
            lon_cell: (lon / grid).round() as i64,
        }
    }
}

struct CacheSlot<V> {
    inserted_at: Instant,
    cell: Arc<OnceCell<V>>,
}

pub struct GridCache<V> {
    slots: DashMap<GridKey, CacheSlot<V>>,
    grid_deg: f64,
    max_entries: usize,
}

impl<V: Clone> GridCache<V> {
    pub fn new(grid_deg: f64, max_entries: usize) -> Self {
        Self {
            slots: DashMap::new(),
            grid_deg,
            max_entries: max_entries.max(1),
        }
    }

    /// Return the cached value for the cell containing (lat, lon), or run
    /// `fetch` to populate it. At most one fetch per cell is in flight at
    /// a time; a failed fetch leaves the cell empty so the next caller
    /// retries.
    pub async fn get_or_fetch<F, Fut, E>(&self, lat: f64, lon: f64, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let key = GridKey::new(lat, lon, self.grid_deg);
        let cell = {
            let slot = self.slots.entry(key).or_insert_with(|| CacheSlot {
                inserted_at: Instant::now(),
                cell: Arc::new(OnceCell::new()),
            });
            slot.cell.clone()
        };

        let value = cell.get_or_try_init(fetch).await?.clone();
        self.prune_to_capacity();
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Evict oldest cells while over capacity.
    fn prune_to_capacity(&self) {
        if self.slots.len() <= self.max_entries {
            return;
        }

        let mut entries: Vec<(GridKey, Instant)> = self
            .slots
            .iter()
            .map(|entry| (*entry.key(), entry.value().inserted_at))
            .collect();
        entries.sort_by_key(|(_, inserted_at)| *inserted_at);

        for (key, _) in entries {
            if self.slots.len() <= self.max_entries {
                break;
            }
            self.slots.remove(&key);
        }
    }
}
