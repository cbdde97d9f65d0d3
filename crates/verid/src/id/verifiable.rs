use crate::{Error, Result, SecretBlock};
use core::fmt;
use core::str::FromStr;

/// A 48-bit verifiable identifier carried in a `u64`.
///
/// - 32 bits tick (10 ms units since the generator's epoch, modulo 2^32)
/// - 8 bits sequence (per tick)
/// - 8 bits checksum (keyed by the generator's secret)
///
/// ```text
///  Bit Index:  63          48 47            16 15            8 7             0
///              +--------------+----------------+---------------+---------------+
///  Field:      | unused (16)  |   tick (32)    | sequence (8)  | checksum (8)  |
///              +--------------+----------------+---------------+---------------+
///              |<----------- MSB ---------- 64 bits ----------- LSB ------------>|
/// ```
///
/// Ordering compares the raw integer, so identifiers from one generator sort
/// by `(tick, sequence)` until the tick wraps.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VerifiableId {
    id: u64,
}

impl VerifiableId {
    /// Bitmask for extracting the 32-bit tick field. Occupies bits 16 through
    /// 47.
    pub const TICK_MASK: u64 = (1 << 32) - 1;

    /// Bitmask for extracting the 8-bit sequence field. Occupies bits 8
    /// through 15.
    pub const SEQUENCE_MASK: u64 = (1 << 8) - 1;

    /// Bitmask for extracting the 8-bit checksum field. Occupies bits 0
    /// through 7.
    pub const CHECKSUM_MASK: u64 = (1 << 8) - 1;

    /// Number of bits to shift the tick to its correct position (bit 16).
    pub const TICK_SHIFT: u64 = 16;

    /// Number of bits to shift the sequence to its correct position (bit 8).
    pub const SEQUENCE_SHIFT: u64 = 8;

    /// Number of significant bits in a well-formed identifier.
    pub const BITS: u32 = 48;

    /// Packs a tick and sequence and stamps the checksum for `block`.
    ///
    /// The tick is reduced modulo 2^32.
    pub const fn from_components(tick: u64, sequence: u8, block: SecretBlock) -> Self {
        let payload = (tick & Self::TICK_MASK) << Self::TICK_SHIFT
            | (sequence as u64) << Self::SEQUENCE_SHIFT;
        Self {
            id: payload | block.sign(payload) as u64,
        }
    }

    /// Wraps a raw value without validation.
    pub const fn from_raw(id: u64) -> Self {
        Self { id }
    }

    /// Returns the raw integer.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Extracts the tick from the packed ID.
    pub const fn tick(&self) -> u64 {
        (self.id >> Self::TICK_SHIFT) & Self::TICK_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u8 {
        ((self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK) as u8
    }

    /// Extracts the stored checksum.
    pub const fn checksum(&self) -> u8 {
        (self.id & Self::CHECKSUM_MASK) as u8
    }

    /// The ID with its checksum byte cleared.
    pub const fn payload(&self) -> u64 {
        self.id & !Self::CHECKSUM_MASK
    }

    /// Recovers the full tick count from the 32-bit field.
    ///
    /// Picks the latest value congruent to [`Self::tick`] modulo 2^32 that does
    /// not lie after `current_tick`, both measured from the generator's epoch.
    /// If `current_tick` is still below the stored tick (first cycle, or an ID
    /// minted ahead of the clock) the stored tick is returned as is.
    pub const fn unwrapped_tick(&self, current_tick: i64) -> i64 {
        const CYCLE: i64 = 1 << 32;
        let tick = self.tick() as i64;
        if current_tick < tick {
            return tick;
        }
        current_tick - (current_tick - tick).rem_euclid(CYCLE)
    }

    /// Returns `true` if no bits above the 48-bit layout are set.
    pub const fn is_valid(&self) -> bool {
        self.id >> Self::BITS == 0
    }

    /// Checks the stored checksum against `secret_key`.
    pub fn verify(&self, secret_key: &str) -> bool {
        self.verify_with(SecretBlock::derive(secret_key))
    }

    /// Checks the stored checksum against an already-derived block.
    pub const fn verify_with(&self, block: SecretBlock) -> bool {
        block.verify(self.id)
    }

    /// Lowercase hexadecimal without a prefix, e.g. `"10021"`.
    pub fn to_hex_string(&self) -> String {
        format!("{:x}", self.id)
    }

    /// Parses a hexadecimal literal, with or without a `0x`/`0X` prefix.
    ///
    /// # Errors
    ///
    /// - [`Error::ParseId`] if `s` is not a hexadecimal integer
    /// - [`Error::Overflow`] if the value exceeds the 48-bit layout
    pub fn from_hex_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        Self::checked(u64::from_str_radix(digits, 16)?)
    }

    /// Parses a decimal literal.
    ///
    /// # Errors
    ///
    /// - [`Error::ParseId`] if `s` is not a decimal integer
    /// - [`Error::Overflow`] if the value exceeds the 48-bit layout
    pub fn from_decimal_str(s: &str) -> Result<Self> {
        Self::checked(s.parse::<u64>()?)
    }

    fn checked(id: u64) -> Result<Self> {
        let id = Self::from_raw(id);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(Error::Overflow { id: id.to_raw() })
        }
    }
}

impl FromStr for VerifiableId {
    type Err = Error;

    /// Parses the decimal form produced by [`fmt::Display`].
    fn from_str(s: &str) -> Result<Self> {
        Self::from_decimal_str(s)
    }
}

impl From<VerifiableId> for u64 {
    fn from(id: VerifiableId) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for VerifiableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::LowerHex for VerifiableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.id, f)
    }
}

impl fmt::UpperHex for VerifiableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.id, f)
    }
}

impl fmt::Debug for VerifiableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifiableId")
            .field("id", &format_args!("{:#x}", self.id))
            .field("tick", &self.tick())
            .field("sequence", &self.sequence())
            .field("checksum", &format_args!("{:#04x}", self.checksum()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_round_trip_through_accessors() {
        let id = VerifiableId::from_components(0xdead_beef, 0x42, SecretBlock::default());
        assert_eq!(id.tick(), 0xdead_beef);
        assert_eq!(id.sequence(), 0x42);
        assert_eq!(id.payload(), 0xdead_beef_4200);
        assert!(id.is_valid());
        assert!(id.verify(""));
    }

    #[test]
    fn tick_wraps_modulo_two_pow_32() {
        let block = SecretBlock::derive("k");
        let wrapped = VerifiableId::from_components((1 << 32) + 5, 7, block);
        let plain = VerifiableId::from_components(5, 7, block);
        assert_eq!(wrapped, plain);
    }

    #[test]
    fn unwrapped_tick_picks_latest_cycle_not_after_now() {
        const CYCLE: i64 = 1 << 32;
        let id = VerifiableId::from_components(5, 0, SecretBlock::default());

        assert_eq!(id.unwrapped_tick(5), 5);
        assert_eq!(id.unwrapped_tick(2), 5);
        assert_eq!(id.unwrapped_tick(-100), 5);
        assert_eq!(id.unwrapped_tick(3 * CYCLE + 5), 3 * CYCLE + 5);
        assert_eq!(id.unwrapped_tick(3 * CYCLE + 10), 3 * CYCLE + 5);
        assert_eq!(id.unwrapped_tick(3 * CYCLE + 2), 2 * CYCLE + 5);
    }

    #[test]
    fn first_vector_decomposes() {
        let id = VerifiableId::from_raw(0x10021);
        assert_eq!(id.tick(), 1);
        assert_eq!(id.sequence(), 0);
        assert_eq!(id.checksum(), 0x21);
        assert!(id.verify(" "));
        assert_eq!(id.to_hex_string(), "10021");
        assert_eq!(id.to_string(), "65569");
        assert_eq!(format!("{id:X}"), "10021");
    }

    #[test]
    fn parses_decimal_and_hex() {
        assert_eq!(
            "65569".parse::<VerifiableId>().unwrap(),
            VerifiableId::from_raw(0x10021)
        );
        assert_eq!(
            VerifiableId::from_hex_str("0x10021").unwrap(),
            VerifiableId::from_raw(0x10021)
        );
        assert_eq!(
            VerifiableId::from_hex_str("FFFF").unwrap(),
            VerifiableId::from_raw(0xffff)
        );
    }

    #[test]
    fn parse_rejects_garbage_and_overflow() {
        assert!(matches!(
            "12ab".parse::<VerifiableId>(),
            Err(Error::ParseId(_))
        ));
        assert!(matches!(
            VerifiableId::from_hex_str(""),
            Err(Error::ParseId(_))
        ));
        assert_eq!(
            VerifiableId::from_hex_str("1000000000000"),
            Err(Error::Overflow { id: 1 << 48 })
        );
    }

    #[test]
    fn debug_shows_fields() {
        let dbg = format!("{:?}", VerifiableId::from_raw(0x10021));
        assert!(dbg.contains("tick: 1"));
        assert!(dbg.contains("sequence: 0"));
        assert!(dbg.contains("checksum: 0x21"));
    }

    #[test]
    fn ordering_follows_tick_then_sequence() {
        let block = SecretBlock::derive("");
        let a = VerifiableId::from_components(1, 255, block);
        let b = VerifiableId::from_components(2, 0, block);
        let c = VerifiableId::from_components(2, 1, block);
        assert!(a < b && b < c);
    }
}
