//! Helpers for creating and working with poolable objects.

use std::{marker::PhantomData, sync::Arc};

use super::{Poolable, ReclaimStrategy};

/// Creates a struct that can be stored in an object pool, based on an existing struct definition.
///
/// In order to store a value in an object pool, the item must implement the [`Poolable`] trait. This trait, and overall
/// design of [`ObjectPool`][super::ObjectPool], dictates that a pooled data type actually holds an inner value, which
/// is the value that is actually pooled, while the outer struct is simply a wrapper around the data that ensures it is
/// returned to the object pool when no longer in use.
///
/// Implementors are required to define their data struct, including an implementation of
/// [`Clearable`][super::Clearable], and then use `pooled_newtype!` to wrap it. The generated wrapper dereferences to the
/// inner struct, so methods defined on the inner struct can be called directly on the wrapper.
///
/// ## Usage
///
/// ```rust
/// use wavefront_core::{pooled_newtype, pooling::Clearable};
///
/// #[derive(Default)]
/// pub struct Scratch {
///     data: Vec<u8>,
/// }
///
/// impl Scratch {
///     pub fn push(&mut self, buf: &[u8]) {
///         self.data.extend_from_slice(buf);
///     }
///
///     pub fn len(&self) -> usize {
///         self.data.len()
///     }
/// }
///
/// impl Clearable for Scratch {
///     fn clear(&mut self) {
///         self.data.clear();
///     }
/// }
///
/// pooled_newtype! {
///     outer => PooledScratch,
///     inner => Scratch,
/// }
///
/// fn use_scratch(mut buf: PooledScratch) {
///     assert_eq!(buf.len(), 0);
///
///     buf.push(b"Hello, world!");
///     assert_eq!(buf.len(), 13);
/// }
/// ```
#[macro_export]
macro_rules! pooled_newtype {
    (outer => $name:ident, inner => $inner_ty:ty $(,)?) => {
        #[doc = concat!("Poolable version of `", stringify!($inner_ty), "`.")]
        pub struct $name {
            strategy_ref: ::std::sync::Arc<dyn $crate::pooling::ReclaimStrategy<$name> + Send + Sync>,
            data: ::std::mem::ManuallyDrop<$inner_ty>,
        }

        impl $name {
            /// Gets a reference to the inner data.
            #[allow(dead_code)]
            pub fn data(&self) -> &$inner_ty {
                &self.data
            }

            /// Gets a mutable reference to the inner data.
            #[allow(dead_code)]
            pub fn data_mut(&mut self) -> &mut $inner_ty {
                &mut self.data
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $inner_ty;

            fn deref(&self) -> &Self::Target {
                &self.data
            }
        }

        impl ::std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.data
            }
        }

        impl $crate::pooling::Poolable for $name {
            type Data = $inner_ty;

            fn from_data(
                strategy_ref: ::std::sync::Arc<dyn $crate::pooling::ReclaimStrategy<Self> + Send + Sync>,
                data: Self::Data,
            ) -> Self {
                Self {
                    strategy_ref,
                    data: ::std::mem::ManuallyDrop::new(data),
                }
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                // SAFETY: We never use `self.data` again since we're already dropping `self`.
                let data = unsafe { ::std::mem::ManuallyDrop::take(&mut self.data) };
                self.strategy_ref.reclaim(data);
            }
        }
    };
}

pub use pooled_newtype;

/// An object pool strategy that performs no pooling.
struct NoopStrategy<T> {
    _t: PhantomData<fn() -> T>,
}

impl<T> NoopStrategy<T> {
    const fn new() -> Self {
        Self { _t: PhantomData }
    }
}

impl<T> ReclaimStrategy<T> for NoopStrategy<T>
where
    T: Poolable,
{
    fn reclaim(&self, _: T::Data) {}
}

/// Creates a poolable object (of type `T`) when `T::Data` implements `Default`.
///
/// The object is not attached to any pool, and its data is simply dropped when the object is dropped.
pub fn get_pooled_object_via_default<T>() -> T
where
    T: Poolable + 'static,
    T::Data: Default,
{
    T::from_data(Arc::new(NoopStrategy::<T>::new()), T::Data::default())
}

/// Creates a poolable object (of type `T`) from the data returned by `f`.
///
/// The object is not attached to any pool, and its data is simply dropped when the object is dropped.
pub fn get_pooled_object_via_builder<F, T>(f: F) -> T
where
    F: FnOnce() -> T::Data,
    T: Poolable + 'static,
{
    T::from_data(Arc::new(NoopStrategy::<T>::new()), f())
}
