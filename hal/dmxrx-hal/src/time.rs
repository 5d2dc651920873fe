//! Millisecond timekeeping

/// Monotonic millisecond clock
///
/// The counter is allowed to wrap; consumers compute intervals with
/// `wrapping_sub`, so an interval is correct as long as it is shorter
/// than one full wrap (~49.7 days for a `u32`).
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
