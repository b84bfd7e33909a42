//! Size Estimation Module
//!
//! Best-effort byte accounting for cached keys and values. The numbers feed
//! the approximate memory gauge only; capacity is always enforced by entry
//! count.

use std::mem;
use std::sync::Arc;

// == Estimate Size ==
/// Approximate in-memory footprint of a cached value.
///
/// The default is the size of the value's own representation, which for
/// heap-backed types only counts the handle. Buffer-like types override it
/// to count their contents instead.
pub trait EstimateSize {
    fn estimate_size(&self) -> usize {
        mem::size_of_val(self)
    }
}

impl EstimateSize for str {
    fn estimate_size(&self) -> usize {
        self.len()
    }
}

impl EstimateSize for String {
    fn estimate_size(&self) -> usize {
        self.len()
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Arc<T> {
    fn estimate_size(&self) -> usize {
        (**self).estimate_size()
    }
}

/// Numeric buffers count `len * size_of::<T>()`.
macro_rules! impl_numeric_buffers {
    ($($t:ty),* $(,)?) => {
        $(
            impl EstimateSize for $t {}

            impl EstimateSize for [$t] {
                fn estimate_size(&self) -> usize {
                    self.len() * mem::size_of::<$t>()
                }
            }

            impl EstimateSize for Vec<$t> {
                fn estimate_size(&self) -> usize {
                    self.as_slice().estimate_size()
                }
            }

            impl EstimateSize for Box<[$t]> {
                fn estimate_size(&self) -> usize {
                    (**self).estimate_size()
                }
            }
        )*
    };
}

impl_numeric_buffers!(u8, i8, u16, i16, u32, i32, f32, u64, i64, f64, usize, isize);

impl EstimateSize for bool {}
impl EstimateSize for char {}
impl EstimateSize for () {}
