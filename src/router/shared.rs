use arc_swap::{ArcSwap, Guard};
use std::ops::Deref;
use std::sync::Arc;
use tracing::info;

use super::RouteTable;

/// One published table together with the generation it was published as.
///
/// Dereferences to the [`RouteTable`], so a snapshot routes directly.
pub struct PublishedTable<H> {
    generation: u64,
    table: Arc<RouteTable<H>>,
}

impl<H> PublishedTable<H> {
    /// Generation of this table, starting at 1.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn table(&self) -> &Arc<RouteTable<H>> {
        &self.table
    }
}

impl<H> Deref for PublishedTable<H> {
    type Target = RouteTable<H>;

    fn deref(&self) -> &RouteTable<H> {
        &self.table
    }
}

/// A published [`RouteTable`] that worker threads read without locking.
///
/// Readers take a snapshot with [`load`](Self::load); a reload builds a
/// complete new table off to the side and swaps it in with
/// [`publish`](Self::publish). A snapshot a reader already holds stays valid
/// until it is dropped, so in-flight requests finish against the table they
/// started with. The generation travels in the same swap as the table, so a
/// snapshot always reports the generation of the table it holds.
pub struct SharedRouteTable<H> {
    current: Arc<ArcSwap<PublishedTable<H>>>,
}

impl<H> Clone for SharedRouteTable<H> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

impl<H> SharedRouteTable<H> {
    #[must_use]
    pub fn new(table: RouteTable<H>) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(PublishedTable {
                generation: 1,
                table: Arc::new(table),
            })),
        }
    }

    /// Cheap, lock-free snapshot for the hot path.
    #[inline]
    #[must_use]
    pub fn load(&self) -> Guard<Arc<PublishedTable<H>>> {
        self.current.load()
    }

    /// Owned snapshot, for holding across longer work.
    #[must_use]
    pub fn snapshot(&self) -> Arc<PublishedTable<H>> {
        self.current.load_full()
    }

    /// Atomically replace the published table. Returns the new generation.
    ///
    /// Concurrent publishers each get a distinct generation; the last swap
    /// wins.
    pub fn publish(&self, table: RouteTable<H>) -> u64 {
        let routes_count = table.len();
        let table = Arc::new(table);
        let previous = self.current.rcu(|current| PublishedTable {
            generation: current.generation + 1,
            table: Arc::clone(&table),
        });
        let generation = previous.generation + 1;
        info!(generation, routes_count, "Routing table published");
        generation
    }

    /// Generation of the currently published table, starting at 1.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.current.load().generation
    }
}
