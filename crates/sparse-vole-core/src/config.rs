use derive_builder::Builder;

/// Default upper bound on the number of instances in one batch.
pub const DEFAULT_MAX_BATCH_NUM: usize = 1 << 10;
/// Default upper bound on the length of each single-point vector.
pub const DEFAULT_MAX_EACH_NUM: usize = 1 << 12;

/// Single-point correlation generator configuration.
///
/// Both parties must use the same configuration.
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SpcgConfig {
    /// Whether the consistency check is run after each extension.
    #[builder(setter(custom), default = "false")]
    malicious: bool,
    /// The maximum number of instances in one batch. Larger requests are split.
    #[builder(default = "DEFAULT_MAX_BATCH_NUM")]
    max_batch_num: usize,
    /// The maximum length of each vector, a power of two.
    #[builder(default = "DEFAULT_MAX_EACH_NUM")]
    max_each_num: usize,
}

impl SpcgConfigBuilder {
    /// Enables the consistency check.
    pub fn malicious(&mut self) -> &mut Self {
        self.malicious = Some(true);
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.max_batch_num == Some(0) {
            return Err("max_batch_num must be non-zero".to_string());
        }

        if let Some(n) = self.max_each_num {
            if !n.is_power_of_two() {
                return Err(format!("max_each_num must be a power of two, got {n}"));
            }
        }

        Ok(())
    }
}

impl SpcgConfig {
    /// Creates a new builder for SpcgConfig.
    pub fn builder() -> SpcgConfigBuilder {
        SpcgConfigBuilder::default()
    }

    /// Whether the consistency check is run after each extension.
    pub fn malicious(&self) -> bool {
        self.malicious
    }

    /// The maximum number of instances in one batch.
    pub fn max_batch_num(&self) -> usize {
        self.max_batch_num
    }

    /// The maximum length of each vector.
    pub fn max_each_num(&self) -> usize {
        self.max_each_num
    }

    /// The depth of the largest tree, `log2(max_each_num)`.
    pub fn max_depth(&self) -> usize {
        self.max_each_num.trailing_zeros() as usize
    }
}

impl Default for SpcgConfig {
    fn default() -> Self {
        Self {
            malicious: false,
            max_batch_num: DEFAULT_MAX_BATCH_NUM,
            max_each_num: DEFAULT_MAX_EACH_NUM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SpcgConfig::builder().build().unwrap();
        assert!(!config.malicious());
        assert_eq!(config.max_batch_num(), DEFAULT_MAX_BATCH_NUM);
        assert_eq!(config.max_depth(), 12);

        let config = SpcgConfig::builder()
            .malicious()
            .max_each_num(64)
            .build()
            .unwrap();
        assert!(config.malicious());
        assert_eq!(config.max_depth(), 6);
    }

    #[test]
    fn test_config_rejects_invalid_limits() {
        assert!(SpcgConfig::builder().max_each_num(12).build().is_err());
        assert!(SpcgConfig::builder().max_batch_num(0).build().is_err());
    }
}
