/// Tunables of an [`Mtbdd`][crate::mtbdd::Mtbdd] instance.
///
/// ```
/// use mtbdd_rs::config::MtbddConfig;
///
/// let config = MtbddConfig::default()
///     .with_max_fixpoint_iterations(50)
///     .with_fixpoint_history(4);
/// assert_eq!(config.max_fixpoint_iterations, 50);
/// assert_eq!(config.cache_capacity_bits, 14);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtbddConfig {
    /// Hard cap on fixpoint iterations.
    pub max_fixpoint_iterations: usize,
    /// Number of trailing iterates searched for a repeat (oscillation guard).
    pub fixpoint_history: usize,
    /// Each operation cache starts with room for `2^bits` entries.
    pub cache_capacity_bits: usize,
}

impl Default for MtbddConfig {
    fn default() -> Self {
        Self {
            max_fixpoint_iterations: 1000,
            fixpoint_history: 10,
            cache_capacity_bits: 14,
        }
    }
}

impl MtbddConfig {
    pub fn with_max_fixpoint_iterations(mut self, max: usize) -> Self {
        self.max_fixpoint_iterations = max;
        self
    }

    pub fn with_fixpoint_history(mut self, history: usize) -> Self {
        self.fixpoint_history = history;
        self
    }

    pub fn with_cache_capacity_bits(mut self, bits: usize) -> Self {
        self.cache_capacity_bits = bits;
        self
    }
}
