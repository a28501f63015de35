//! BS81x register map for the two-wire bus transport

use bitflags::bitflags;

/// Key status, keys 0-7 (bit set = touched)
pub const KEY_STATUS_LOW: u8 = 0x08;
/// Key status, keys 8-15 (bit set = touched)
pub const KEY_STATUS_HIGH: u8 = 0x09;
/// Option register
pub const OPTION: u8 = 0xB0;
/// Sensitivity register of key 0; key `k` lives at `SENSITIVITY_BASE + k`
pub const SENSITIVITY_BASE: u8 = 0xB5;

/// Largest key count in the family (BS8116A-3)
pub const MAX_KEYS: usize = 16;

/// Keys addressable through the single status byte read by `is_touched`
pub const STATUS_BYTE_KEYS: u8 = 8;

bitflags! {
    /// Option register (0xB0) bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OptionFlags: u8 {
        /// Wake-up function disabled. Cleared means wake-up is enabled.
        const WAKEUP_DISABLE = 1 << 7;
    }
}

impl OptionFlags {
    /// Apply the wake-up setting, leaving every other bit as read
    pub fn with_wakeup(mut self, enable: bool) -> Self {
        self.set(Self::WAKEUP_DISABLE, !enable);
        self
    }

    /// Whether the wake-up function is enabled
    pub fn wakeup_enabled(self) -> bool {
        !self.contains(Self::WAKEUP_DISABLE)
    }
}

/// Sensitivity register address of `key`, if the key exists on the chip
pub fn sensitivity_register(key: u8) -> Option<u8> {
    if (key as usize) < MAX_KEYS {
        Some(SENSITIVITY_BASE + key)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitivity_register_range() {
        assert_eq!(sensitivity_register(0), Some(0xB5));
        assert_eq!(sensitivity_register(3), Some(0xB8));
        assert_eq!(sensitivity_register(15), Some(0xC4));
        assert_eq!(sensitivity_register(16), None);
    }

    #[test]
    fn test_wakeup_keeps_other_bits() {
        let reg = OptionFlags::from_bits_retain(0xFF).with_wakeup(true);
        assert_eq!(reg.bits(), 0x7F);
        assert!(reg.wakeup_enabled());

        let reg = OptionFlags::from_bits_retain(0x05).with_wakeup(false);
        assert_eq!(reg.bits(), 0x85);
        assert!(!reg.wakeup_enabled());
    }
}
