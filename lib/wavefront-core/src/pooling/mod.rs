//! Object pooling.
use std::sync::Arc;

use metrics::{Counter, Gauge};

mod fixed;
pub use self::fixed::FixedSizeObjectPool;

mod on_demand;
pub use self::on_demand::OnDemandObjectPool;

pub mod helpers;

/// An item that can be cleared.
pub trait Clearable {
    /// Clears the item.
    fn clear(&mut self) {}
}

/// An item that is poolable.
///
/// This meta-trait is used to mark a type as being poolable, where the type itself wraps a piece of data
/// (`Self::Data`), and the data itself is the actual value which gets pooled and reused.
///
/// The wrapping type owns the data for as long as it is checked out, and hands it back to the pool through its
/// [`ReclaimStrategy`] when dropped. This is what guarantees that data is returned to the pool on every exit path of
/// the code holding it, including early returns on error.
pub trait Poolable {
    /// The inner data value that is stored in the object pool.
    type Data: Clearable + Send + 'static;

    /// Creates a new `Self` from the object pool strategy and data value.
    fn from_data(strategy: Arc<dyn ReclaimStrategy<Self> + Send + Sync>, data: Self::Data) -> Self;
}

/// Object pool reclamation strategy.
///
/// This trait is used to define the strategy for reclaiming items to an object pool.
pub trait ReclaimStrategy<T>
where
    T: Poolable,
{
    /// Returns an item to the object pool.
    fn reclaim(&self, data: T::Data);
}

/// An object pool.
///
/// Acquiring from a pool never blocks: implementations must always be able to hand out an item, building a new one if
/// necessary.
pub trait ObjectPool: Send + Sync {
    /// The pooled value.
    type Item: Send;

    /// Acquires an item from the object pool.
    fn acquire(&self) -> Self::Item;
}

impl<P> ObjectPool for &P
where
    P: ObjectPool,
{
    type Item = P::Item;

    fn acquire(&self) -> Self::Item {
        (**self).acquire()
    }
}

impl<P> ObjectPool for Arc<P>
where
    P: ObjectPool,
{
    type Item = P::Item;

    fn acquire(&self) -> Self::Item {
        (**self).acquire()
    }
}

#[derive(Clone)]
struct PoolMetrics {
    acquired: Counter,
    released: Counter,
    created: Counter,
    in_use: Gauge,
}

impl PoolMetrics {
    fn new(pool_name: String) -> Self {
        Self {
            acquired: metrics::counter!("object_pool_acquired", "pool_name" => pool_name.clone()),
            released: metrics::counter!("object_pool_released", "pool_name" => pool_name.clone()),
            created: metrics::counter!("object_pool_created", "pool_name" => pool_name.clone()),
            in_use: metrics::gauge!("object_pool_in_use", "pool_name" => pool_name),
        }
    }

    fn track_acquire(&self) {
        self.acquired.increment(1);
        self.in_use.increment(1.0);
    }

    fn track_release(&self) {
        self.released.increment(1);
        self.in_use.decrement(1.0);
    }
}
