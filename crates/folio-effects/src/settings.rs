//! Effect tuning

/// Effect constants and attribute defaults
#[derive(Debug, Clone, PartialEq)]
pub struct EffectSettings {
    /// Glitch re-roll period (ms)
    pub glitch_period_ms: u64,
    /// Per-character replacement probability of one glitch pass
    pub glitch_probability: f64,
    /// Upper bound (exclusive, seconds) of a shake letter's animation delay
    pub shake_max_delay: f64,
    /// `force` when the markup omits it
    pub default_shake_force: u64,
    /// `speed` of a fade when the markup omits it
    pub default_fade_speed: u64,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            glitch_period_ms: 200,
            glitch_probability: 0.1,
            shake_max_delay: 0.5,
            default_shake_force: 1,
            default_fade_speed: 1,
        }
    }
}
