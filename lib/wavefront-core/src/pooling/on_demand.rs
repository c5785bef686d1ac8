use std::sync::Arc;

use super::{Clearable, ObjectPool, PoolMetrics, Poolable, ReclaimStrategy};

/// An object pool that allocates objects on demand.
///
/// This pool implementation is meant to satisfy the interface of [`ObjectPool`] without performing any actual pooling:
/// every call to `acquire` builds a fresh item, and returned items are dropped. It is useful as a stand-in wherever an
/// encoder needs a pool but reuse is irrelevant, such as in tests.
pub struct OnDemandObjectPool<T: Poolable> {
    strategy: Arc<OnDemandStrategy<T>>,
}

impl<T> OnDemandObjectPool<T>
where
    T: Poolable + 'static,
    T::Data: Default,
{
    /// Creates a new `OnDemandObjectPool`.
    pub fn new<S>(pool_name: S) -> Self
    where
        S: Into<String>,
    {
        Self::with_builder(pool_name, T::Data::default)
    }
}

impl<T> OnDemandObjectPool<T>
where
    T: Poolable + 'static,
{
    /// Creates a new `OnDemandObjectPool` with the given item builder.
    ///
    /// `builder` is called to construct each item.
    pub fn with_builder<S, B>(pool_name: S, builder: B) -> Self
    where
        S: Into<String>,
        B: Fn() -> T::Data + Send + Sync + 'static,
    {
        let strategy = Arc::new(OnDemandStrategy::with_builder(pool_name, builder));

        Self { strategy }
    }
}

impl<T: Poolable> Clone for OnDemandObjectPool<T> {
    fn clone(&self) -> Self {
        Self {
            strategy: Arc::clone(&self.strategy),
        }
    }
}

impl<T> ObjectPool for OnDemandObjectPool<T>
where
    T: Poolable + Send + 'static,
{
    type Item = T;

    fn acquire(&self) -> Self::Item {
        let strategy = Arc::clone(&self.strategy);
        let item = strategy.build();
        T::from_data(strategy, item)
    }
}

struct OnDemandStrategy<T: Poolable> {
    builder: Box<dyn Fn() -> T::Data + Send + Sync>,
    metrics: PoolMetrics,
}

impl<T: Poolable> OnDemandStrategy<T> {
    fn with_builder<S, B>(pool_name: S, builder: B) -> Self
    where
        S: Into<String>,
        B: Fn() -> T::Data + Send + Sync + 'static,
    {
        Self {
            builder: Box::new(builder),
            metrics: PoolMetrics::new(pool_name.into()),
        }
    }

    fn build(&self) -> T::Data {
        self.metrics.created.increment(1);
        self.metrics.track_acquire();

        (self.builder)()
    }
}

impl<T: Poolable> ReclaimStrategy<T> for OnDemandStrategy<T> {
    fn reclaim(&self, mut data: T::Data) {
        data.clear();
        drop(data);

        self.metrics.track_release();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};

    use super::*;
    use crate::pooled_newtype;

    #[derive(Default)]
    pub struct Scratch {
        pub bytes: Vec<u8>,
    }

    impl Clearable for Scratch {
        fn clear(&mut self) {
            self.bytes.clear();
        }
    }

    pooled_newtype! {
        outer => PooledScratch,
        inner => Scratch,
    }

    #[test]
    fn builds_fresh_item_per_acquire() {
        let built = Arc::new(AtomicUsize::new(0));
        let builder_built = Arc::clone(&built);
        let pool = OnDemandObjectPool::<PooledScratch>::with_builder("test", move || {
            builder_built.fetch_add(1, Relaxed);
            Scratch::default()
        });

        let mut first = pool.acquire();
        first.bytes.extend_from_slice(b"hello");
        drop(first);

        let second = pool.acquire();
        assert!(second.bytes.is_empty());
        assert_eq!(built.load(Relaxed), 2);
    }
}
