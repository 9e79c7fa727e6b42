//! Unified error type for glowring.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for
//! efficient on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Storage
    /// Settings write did not reach flash.
    Storage(StorageError),

    // UI / Display
    /// Pixel push to the panel failed.
    Display,

    /// A screen has no room left for another widget.
    SceneFull,

    /// A style or state change named a widget that was never built.
    UnknownWidget,
}

/// Subset of flash errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// The map write did not complete.
    WriteFailed,
    /// The settings region is full and could not be compacted.
    Full,
    /// The backing store is unavailable (test doubles use this).
    Unavailable,
}

// Convenience conversions

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}
