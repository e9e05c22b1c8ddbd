//! Channel downmix to normalized mono

/// Full-scale reference for 16-bit and rescaled 8-bit samples
pub const FULL_SCALE: f64 = 32768.0;

/// Average a frame's summed channel values and normalize to `[-1.0, 1.0]`
///
/// `channel_count` is at least 1; the decoder rejects zero-channel files
/// before any frame reaches this stage.
#[inline]
pub fn downmix(sum_of_channel_values: f64, channel_count: u16) -> f64 {
    sum_of_channel_values / channel_count as f64 / FULL_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_is_plain_scaling() {
        for v in [0.0, 1.0, -1.0, 12345.0, -32768.0, 32767.0] {
            assert_eq!(downmix(v, 1), v / 32768.0);
        }
    }

    #[test]
    fn test_full_scale_bounds() {
        assert_eq!(downmix(-32768.0, 1), -1.0);
        assert!(downmix(32767.0, 1) < 1.0);
        assert_eq!(downmix(-32768.0 * 2.0, 2), -1.0);
    }

    #[test]
    fn test_stereo_averages() {
        assert_eq!(downmix(16384.0 - 16384.0, 2), 0.0);
        assert_eq!(downmix(16384.0 + 16384.0, 2), 0.5);
        assert_eq!(downmix(8192.0, 2), 0.125);
    }
}
