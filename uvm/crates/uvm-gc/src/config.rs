//! Heap configuration.

/// 1 Kilobyte.
const KB: usize = 1024;
/// 1 Megabyte.
const MB: usize = 1024 * KB;

/// Default block size: 32 KiB.
pub const DEFAULT_BLOCK_SIZE: usize = 32 * KB;
/// Default space size: 4 MiB.
pub const DEFAULT_SPACE_SIZE: usize = 4 * MB;

/// Configuration for a [`crate::heap::Heap`].
///
/// # Examples
///
/// ```rust
/// use uvm_gc::HeapConfig;
///
/// let config = HeapConfig::new(4 * 1024 * 1024, 64 * 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct HeapConfig {
    /// Total size of the Space's backing region, in bytes.
    ///
    /// Must be a multiple of `block_size`.
    /// Default: 4 MiB.
    pub space_size: usize,

    /// Size of each block, in bytes.
    ///
    /// Must be a power of two. All allocations returned to a mutator lie
    /// wholly within one block, except large objects.
    /// Default: 32 KiB.
    pub block_size: usize,

    /// Objects whose GC-to-user span exceeds `block_size` normally fail
    /// with `ObjectTooBig`. When set, objects up to this size are instead
    /// routed to a dedicated large-object block run.
    ///
    /// Default: `None` (hard-fail, per the core's chosen policy).
    pub large_object_threshold: Option<usize>,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            space_size: DEFAULT_SPACE_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            large_object_threshold: None,
        }
    }
}

impl HeapConfig {
    pub fn new(space_size: usize, block_size: usize) -> Self {
        Self {
            space_size,
            block_size,
            large_object_threshold: None,
        }
    }

    /// Check if all values are in valid ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 || !self.block_size.is_power_of_two() {
            return Err(ConfigError::InvalidBlockSize(self.block_size));
        }
        if self.space_size == 0 || self.space_size % self.block_size != 0 {
            return Err(ConfigError::InvalidSpaceSize {
                space_size: self.space_size,
                block_size: self.block_size,
            });
        }
        if let Some(threshold) = self.large_object_threshold {
            if threshold < self.block_size {
                return Err(ConfigError::InvalidLargeObjectThreshold(threshold));
            }
        }
        Ok(())
    }

    /// Number of blocks the Space partitions its region into.
    pub fn block_count(&self) -> usize {
        self.space_size / self.block_size
    }
}

/// Error type for invalid [`HeapConfig`] values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("block_size must be a nonzero power of two, got {0}")]
    InvalidBlockSize(usize),

    #[error("space_size {space_size} is not a multiple of block_size {block_size}")]
    InvalidSpaceSize { space_size: usize, block_size: usize },

    #[error("large_object_threshold {0} is smaller than block_size")]
    InvalidLargeObjectThreshold(usize),
}
