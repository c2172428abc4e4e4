//! Runtime tuning of the timing controller.

use smart_default::SmartDefault;

/// Tunables for sync tracking and redraw pacing.
#[derive(Clone, Debug, SmartDefault)]
pub struct OsdConfig {
    /// Redraw (and swap buffers) on every Nth field.
    #[default = 2]
    pub redraw_divisor: u32,
    /// Vertical sync edges closer together than this are noise.
    #[default = 10_000]
    pub min_vsync_interval_us: u32,
    /// Number of consecutive noisy vertical sync edges that shuts down sync
    /// processing until `re_enable`.
    #[default = 8]
    pub spurious_edge_limit: u32,
    /// Fields with more lines than this are PAL.
    #[default = 270]
    pub pal_threshold_lines: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `redraw_divisor` was zero.
    ZeroRedrawDivisor,
    /// `spurious_edge_limit` was zero, which would fault on the first edge.
    ZeroSpuriousLimit,
    /// The PAL threshold can't separate a 240-line field from a 300-line
    /// one.
    ThresholdOutOfRange(u32),
}

impl OsdConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.redraw_divisor == 0 {
            return Err(ConfigError::ZeroRedrawDivisor);
        }
        if self.spurious_edge_limit == 0 {
            return Err(ConfigError::ZeroSpuriousLimit);
        }
        if self.pal_threshold_lines < 240 || self.pal_threshold_lines >= 300 {
            return Err(ConfigError::ThresholdOutOfRange(self.pal_threshold_lines));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = OsdConfig::default();
        assert_eq!(c.redraw_divisor, 2);
        assert_eq!(c.min_vsync_interval_us, 10_000);
        assert_eq!(c.spurious_edge_limit, 8);
        assert_eq!(c.pal_threshold_lines, 270);
        assert_eq!(c.validate(), Ok(()));
    }

    #[test]
    fn rejects_nonsense() {
        let c = OsdConfig {
            redraw_divisor: 0,
            ..OsdConfig::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroRedrawDivisor));

        let c = OsdConfig {
            spurious_edge_limit: 0,
            ..OsdConfig::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroSpuriousLimit));

        let c = OsdConfig {
            pal_threshold_lines: 300,
            ..OsdConfig::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ThresholdOutOfRange(300)));
    }
}
