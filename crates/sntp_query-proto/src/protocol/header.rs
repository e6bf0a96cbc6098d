use super::{LeapIndicator, Mode, Version};

const LEAP_SHIFT: u8 = 6;
const LEAP_MASK: u8 = 0b1100_0000;
const VERSION_SHIFT: u8 = 3;
const VERSION_MASK: u8 = 0b0011_1000;
const MODE_MASK: u8 = 0b0000_0111;

/// The first octet of an NTP packet, packing three sub-fields:
///
/// ```ignore
///  0 1 2 3 4 5 6 7
/// +-+-+-+-+-+-+-+-+
/// |LI | VN  |Mode |
/// +-+-+-+-+-+-+-+-+
/// ```
///
/// Each setter is a read-modify-write on the single byte and leaves the other two sub-fields
/// untouched. Values wider than their sub-field are masked.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct HeaderByte(pub u8);

impl HeaderByte {
    /// Pack all three sub-fields at once.
    pub fn new(leap: LeapIndicator, version: Version, mode: Mode) -> Self {
        HeaderByte(0)
            .with_leap(leap)
            .with_version(version)
            .with_mode(mode)
    }

    /// The leap indicator (top two bits).
    pub fn leap(self) -> LeapIndicator {
        LeapIndicator::from_bits((self.0 & LEAP_MASK) >> LEAP_SHIFT)
    }

    /// The version number (middle three bits).
    pub fn version(self) -> Version {
        Version((self.0 & VERSION_MASK) >> VERSION_SHIFT)
    }

    /// The association mode (low three bits).
    pub fn mode(self) -> Mode {
        Mode::from_bits(self.0 & MODE_MASK)
    }

    /// Replace the leap indicator.
    pub fn set_leap(&mut self, leap: LeapIndicator) {
        self.0 = (self.0 & !LEAP_MASK) | (((leap as u8) << LEAP_SHIFT) & LEAP_MASK);
    }

    /// Replace the version number.
    pub fn set_version(&mut self, version: Version) {
        self.0 = (self.0 & !VERSION_MASK) | ((version.0 << VERSION_SHIFT) & VERSION_MASK);
    }

    /// Replace the association mode.
    pub fn set_mode(&mut self, mode: Mode) {
        self.0 = (self.0 & !MODE_MASK) | ((mode as u8) & MODE_MASK);
    }

    /// Builder form of [`HeaderByte::set_leap`].
    pub fn with_leap(mut self, leap: LeapIndicator) -> Self {
        self.set_leap(leap);
        self
    }

    /// Builder form of [`HeaderByte::set_version`].
    pub fn with_version(mut self, version: Version) -> Self {
        self.set_version(version);
        self
    }

    /// Builder form of [`HeaderByte::set_mode`].
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.set_mode(mode);
        self
    }
}
