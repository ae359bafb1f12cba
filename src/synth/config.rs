use crate::MAX_BLOCK_SIZE;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("sample rate must be finite and positive, got {0}")]
    SampleRate(f32),
    #[error("block size must be between 1 and {max}, got {got}", max = MAX_BLOCK_SIZE)]
    BlockSize { got: usize },
}

/// Fixed for the lifetime of a voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    sample_rate: f32,
    block_size: usize,
}

impl EngineConfig {
    pub fn new(sample_rate: f32, block_size: usize) -> Result<Self, ConfigError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ConfigError::SampleRate(sample_rate));
        }
        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::BlockSize { got: block_size });
        }
        Ok(Self {
            sample_rate,
            block_size,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Samples per control block; envelopes step once per block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Highest cutoff handed to the filter, just under Nyquist.
    pub fn max_cutoff(&self) -> f32 {
        self.sample_rate * 0.49
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            block_size: 128,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_sample_rates() {
        assert_eq!(
            EngineConfig::new(0.0, 128),
            Err(ConfigError::SampleRate(0.0))
        );
        assert!(EngineConfig::new(f32::NAN, 128).is_err());
        assert!(EngineConfig::new(-44_100.0, 128).is_err());
    }

    #[test]
    fn rejects_bad_block_sizes() {
        assert_eq!(
            EngineConfig::new(48_000.0, 0),
            Err(ConfigError::BlockSize { got: 0 })
        );
        assert!(EngineConfig::new(48_000.0, MAX_BLOCK_SIZE + 1).is_err());
        assert!(EngineConfig::new(48_000.0, MAX_BLOCK_SIZE).is_ok());
    }

    #[test]
    fn default_is_48k_128() {
        let config = EngineConfig::default();
        assert_eq!(config.sample_rate(), 48_000.0);
        assert_eq!(config.block_size(), 128);
        assert!(config.max_cutoff() < 24_000.0);
    }
}
