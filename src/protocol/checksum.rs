//! LIN frame checksum (classic and enhanced)
//!
//! The checksum is the inverted 8-bit sum of the covered bytes, where every
//! carry out of the low byte is added back in (end-around carry). Classic
//! mode covers the data bytes only; enhanced mode also covers the protected
//! identifier.

use std::fmt;

use super::{DIAGNOSTIC_MASTER_REQUEST, DIAGNOSTIC_SLAVE_RESPONSE};

/// Which bytes the checksum covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ChecksumMode {
    /// LIN 1.x: data bytes only
    Classic = 0,
    /// LIN 2.x: protected identifier and data bytes
    #[default]
    Enhanced = 1,
}

impl ChecksumMode {
    /// Mode conventionally used for a frame identifier
    ///
    /// Diagnostic frames (`0x3C`, `0x3D`) use classic, everything else uses
    /// enhanced. The driver never calls this itself; callers pick the mode.
    #[must_use]
    pub const fn for_identifier(id: u8) -> Self {
        match id {
            DIAGNOSTIC_MASTER_REQUEST | DIAGNOSTIC_SLAVE_RESPONSE => Self::Classic,
            _ => Self::Enhanced,
        }
    }
}

impl fmt::Display for ChecksumMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic => write!(f, "classic"),
            Self::Enhanced => write!(f, "enhanced"),
        }
    }
}

#[inline]
fn add_with_carry(sum: u16, byte: u8) -> u16 {
    let sum = sum + u16::from(byte);
    if sum > 0xFF { sum - 0xFF } else { sum }
}

/// Compute the checksum byte for `data`
///
/// `pid` is the protected identifier byte; it is only summed in
/// [`ChecksumMode::Enhanced`].
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn compute(pid: u8, data: &[u8], mode: ChecksumMode) -> u8 {
    let seed = match mode {
        ChecksumMode::Classic => 0,
        ChecksumMode::Enhanced => u16::from(pid),
    };
    let sum = data.iter().fold(seed, |sum, &byte| add_with_carry(sum, byte));
    // sum never exceeds 0xFF after the carry fold
    !(sum as u8)
}

/// Check a received checksum byte
#[must_use]
pub fn verify(pid: u8, data: &[u8], mode: ChecksumMode, expected: u8) -> bool {
    compute(pid, data, mode) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_checksum() {
        // ~(0x01 + 0x02 + 0x03 + 0x04) = ~0x0A
        assert_eq!(compute(0x50, &[0x01, 0x02, 0x03, 0x04], ChecksumMode::Classic), 0xF5);
    }

    #[test]
    fn test_enhanced_checksum() {
        // PID of 0x10 is 0x50: ~(0x50 + 0x0A) = ~0x5A
        assert_eq!(
            compute(0x50, &[0x01, 0x02, 0x03, 0x04], ChecksumMode::Enhanced),
            0xA5
        );
    }

    #[test]
    fn test_end_around_carry() {
        // 0xFF + 0x01 = 0x100 -> 0x01
        assert_eq!(compute(0, &[0xFF, 0x01], ChecksumMode::Classic), 0xFE);
        // 0xFF + 0xFF = 0x1FE -> 0xFF
        assert_eq!(compute(0, &[0xFF, 0xFF], ChecksumMode::Classic), 0x00);
        // 0x4A + 0x55 + 0x93 + 0xE5 = 0x217 -> 0x19
        assert_eq!(compute(0x4A, &[0x55, 0x93, 0xE5], ChecksumMode::Enhanced), 0xE6);
    }

    #[test]
    fn test_mode_changes_result() {
        let data = [0x10, 0x20];
        assert_ne!(
            compute(0x42, &data, ChecksumMode::Classic),
            compute(0x42, &data, ChecksumMode::Enhanced)
        );
        // classic ignores the PID entirely
        assert_eq!(
            compute(0x00, &data, ChecksumMode::Classic),
            compute(0xFF, &data, ChecksumMode::Classic)
        );
    }

    #[test]
    fn test_mode_for_identifier() {
        assert_eq!(ChecksumMode::for_identifier(0x3C), ChecksumMode::Classic);
        assert_eq!(ChecksumMode::for_identifier(0x3D), ChecksumMode::Classic);
        assert_eq!(ChecksumMode::for_identifier(0x10), ChecksumMode::Enhanced);
    }

    #[test]
    fn test_verify_rejects_wrong_byte() {
        let data = [0xDE, 0xAD];
        let chk = compute(0x80, &data, ChecksumMode::Enhanced);
        assert!(verify(0x80, &data, ChecksumMode::Enhanced, chk));
        assert!(!verify(0x80, &data, ChecksumMode::Enhanced, chk.wrapping_add(1)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn mode_strategy() -> impl Strategy<Value = ChecksumMode> {
            prop_oneof![Just(ChecksumMode::Classic), Just(ChecksumMode::Enhanced)]
        }

        proptest! {
            /// Property: a computed checksum always verifies
            #[test]
            fn prop_checksum_roundtrip(
                pid in any::<u8>(),
                data in prop::collection::vec(any::<u8>(), 0..=8),
                mode in mode_strategy(),
            ) {
                let chk = compute(pid, &data, mode);
                prop_assert!(verify(pid, &data, mode, chk));
            }

            /// Property: a frame whose bytes and checksum are summed together
            /// yields 0xFF, which is how receivers commonly check it
            #[test]
            fn prop_sum_with_checksum_is_ff(
                data in prop::collection::vec(any::<u8>(), 1..=8),
            ) {
                let chk = compute(0, &data, ChecksumMode::Classic);
                let total = data
                    .iter()
                    .chain(core::iter::once(&chk))
                    .fold(0u16, |sum, &byte| add_with_carry(sum, byte));
                prop_assert_eq!(total, 0xFF);
            }

            /// Property: changing one data byte breaks verification, except
            /// for the one swap the arithmetic cannot see
            #[test]
            fn prop_corruption_detected(
                pid in any::<u8>(),
                data in prop::collection::vec(any::<u8>(), 1..=8),
                index in any::<prop::sample::Index>(),
                flip in 1u8..=255,
                mode in mode_strategy(),
            ) {
                let chk = compute(pid, &data, mode);
                let mut corrupted = data.clone();
                let i = index.index(corrupted.len());
                corrupted[i] ^= flip;
                // 0x00 and 0xFF are both zero in one's complement arithmetic
                prop_assume!(!matches!((data[i], corrupted[i]), (0x00, 0xFF) | (0xFF, 0x00)));
                prop_assert!(!verify(pid, &corrupted, mode, chk));
            }
        }
    }
}
