use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use tracing::trace;

use super::{Clearable, ObjectPool, PoolMetrics, Poolable, ReclaimStrategy};

/// A fixed-size object pool.
///
/// All items for this object pool are created up front and held in a bounded, lock-free queue. When the pool is empty,
/// `acquire` builds a new item rather than waiting for one to be returned, so callers never block. When an item is
/// returned to a pool that is already holding `capacity` idle items, the returned item is dropped.
///
/// The capacity is always at least one.
pub struct FixedSizeObjectPool<T: Poolable> {
    strategy: Arc<FixedSizeStrategy<T>>,
}

impl<T> FixedSizeObjectPool<T>
where
    T: Poolable + 'static,
    T::Data: Default,
{
    /// Creates a new `FixedSizeObjectPool` with the given capacity.
    pub fn with_capacity<S>(pool_name: S, capacity: usize) -> Self
    where
        S: Into<String>,
    {
        Self::with_builder(pool_name, capacity, T::Data::default)
    }
}

impl<T> FixedSizeObjectPool<T>
where
    T: Poolable + 'static,
{
    /// Creates a new `FixedSizeObjectPool` with the given capacity and item builder.
    ///
    /// `builder` is called to construct each item, both up front and whenever the pool runs dry.
    pub fn with_builder<S, B>(pool_name: S, capacity: usize, builder: B) -> Self
    where
        S: Into<String>,
        B: Fn() -> T::Data + Send + Sync + 'static,
    {
        Self {
            strategy: Arc::new(FixedSizeStrategy::with_builder(pool_name, capacity, builder)),
        }
    }

    /// Returns the number of idle items currently held by the pool.
    pub fn available(&self) -> usize {
        self.strategy.items.len()
    }

    /// Returns the maximum number of idle items the pool will hold.
    pub fn capacity(&self) -> usize {
        self.strategy.items.capacity()
    }
}

impl<T: Poolable> Clone for FixedSizeObjectPool<T> {
    fn clone(&self) -> Self {
        Self {
            strategy: Arc::clone(&self.strategy),
        }
    }
}

impl<T> ObjectPool for FixedSizeObjectPool<T>
where
    T: Poolable + Send + 'static,
{
    type Item = T;

    fn acquire(&self) -> Self::Item {
        let data = self.strategy.acquire();
        let strategy_ref = Arc::clone(&self.strategy);
        T::from_data(strategy_ref, data)
    }
}

struct FixedSizeStrategy<T: Poolable> {
    pool_name: String,
    items: ArrayQueue<T::Data>,
    builder: Box<dyn Fn() -> T::Data + Send + Sync>,
    metrics: PoolMetrics,
}

impl<T: Poolable> FixedSizeStrategy<T> {
    fn with_builder<S, B>(pool_name: S, capacity: usize, builder: B) -> Self
    where
        S: Into<String>,
        B: Fn() -> T::Data + Send + Sync + 'static,
    {
        let pool_name = pool_name.into();
        let metrics = PoolMetrics::new(pool_name.clone());

        let items = ArrayQueue::new(capacity.max(1));
        while !items.is_full() {
            metrics.created.increment(1);
            if items.push(builder()).is_err() {
                break;
            }
        }

        Self {
            pool_name,
            items,
            builder: Box::new(builder),
            metrics,
        }
    }

    fn acquire(&self) -> T::Data {
        self.metrics.track_acquire();

        match self.items.pop() {
            Some(data) => data,
            None => {
                trace!(pool_name = %self.pool_name, "Object pool exhausted. Building new item.");
                self.metrics.created.increment(1);
                (self.builder)()
            }
        }
    }
}

impl<T: Poolable> ReclaimStrategy<T> for FixedSizeStrategy<T> {
    fn reclaim(&self, mut data: T::Data) {
        data.clear();
        self.metrics.track_release();

        if self.items.push(data).is_err() {
            trace!(pool_name = %self.pool_name, "Object pool full. Dropping returned item.");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::pooled_newtype;

    #[derive(Default)]
    pub struct Counted {
        pub value: u32,
    }

    impl Clearable for Counted {
        fn clear(&mut self) {
            self.value = 0;
        }
    }

    pooled_newtype! {
        outer => PooledCounted,
        inner => Counted,
    }

    #[test]
    fn prebuilds_capacity() {
        let pool = FixedSizeObjectPool::<PooledCounted>::with_capacity("test", 4);
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.available(), 4);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let pool = FixedSizeObjectPool::<PooledCounted>::with_capacity("test", 0);
        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn returns_items_on_drop() {
        let pool = FixedSizeObjectPool::<PooledCounted>::with_capacity("test", 2);

        let first = pool.acquire();
        let second = pool.acquire();
        assert_eq!(pool.available(), 0);

        drop(first);
        assert_eq!(pool.available(), 1);

        drop(second);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn clears_items_on_reclaim() {
        let pool = FixedSizeObjectPool::<PooledCounted>::with_capacity("test", 1);

        let mut item = pool.acquire();
        item.value = 42;
        drop(item);

        let item = pool.acquire();
        assert_eq!(item.value, 0);
    }

    #[test]
    fn builds_beyond_capacity_without_blocking() {
        let pool = FixedSizeObjectPool::<PooledCounted>::with_capacity("test", 1);

        let items = (0..5).map(|_| pool.acquire()).collect::<Vec<_>>();
        assert_eq!(items.len(), 5);
        assert_eq!(pool.available(), 0);

        // Only `capacity` items are retained once everything comes back.
        drop(items);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn concurrent_acquire_release() {
        let pool = FixedSizeObjectPool::<PooledCounted>::with_capacity("test", 4);

        let handles = (0..8)
            .map(|i| {
                let pool = pool.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        let mut item = pool.acquire();
                        assert_eq!(item.value, 0);
                        item.value = i;
                    }
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().expect("worker thread should not panic");
        }

        assert_eq!(pool.available(), 4);
    }
}
