use std::fmt;
use std::hash::Hash;
use std::ops::{BitAnd, BitOr, Not};

/// Flags that can be set on a `SpanContext`.
///
/// Only a single flag is defined, [`TraceFlags::SAMPLED`]. Bits outside that
/// range are cleared on construction, so every `TraceFlags` value is within the
/// defined range.
#[derive(Clone, Debug, Default, PartialEq, Eq, Copy, Hash)]
pub struct TraceFlags(u8);

impl TraceFlags {
    /// Trace flags with the `sampled` flag set to `0`.
    ///
    /// Spans that are not sampled are not handed to exporters.
    pub const NOT_SAMPLED: TraceFlags = TraceFlags(0x00);

    /// Trace flags with the `sampled` flag set to `1`.
    pub const SAMPLED: TraceFlags = TraceFlags(0x01);

    /// Mask of every bit that has a meaning.
    pub const DEFINED_BITS: u8 = 0x01;

    /// Construct new trace flags, dropping any undefined bit.
    pub const fn new(flags: u8) -> Self {
        TraceFlags(flags & Self::DEFINED_BITS)
    }

    /// Construct trace flags from raw bits, or `None` when an undefined bit
    /// is set.
    pub const fn from_bits(flags: u8) -> Option<Self> {
        if flags & !Self::DEFINED_BITS == 0 {
            Some(TraceFlags(flags))
        } else {
            None
        }
    }

    /// Returns `true` if the `sampled` flag is set
    pub fn is_sampled(&self) -> bool {
        (*self & TraceFlags::SAMPLED) == TraceFlags::SAMPLED
    }

    /// Returns copy of the current flags with the `sampled` flag set.
    pub fn with_sampled(&self, sampled: bool) -> Self {
        if sampled {
            *self | TraceFlags::SAMPLED
        } else {
            *self & !TraceFlags::SAMPLED
        }
    }

    /// Returns the flags as a `u8`
    pub fn to_u8(self) -> u8 {
        self.0
    }
}

impl BitAnd for TraceFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for TraceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl Not for TraceFlags {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(!self.0 & Self::DEFINED_BITS)
    }
}

impl fmt::LowerHex for TraceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Returns `true` when `hex` is exactly `width` lowercase hex digits.
///
/// `from_str_radix` alone is not enough: it accepts a leading `+`, uppercase
/// digits and any width up to the integer size.
pub(crate) fn is_fixed_lower_hex(hex: &str, width: usize) -> bool {
    hex.len() == width && hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// A 16-byte value which identifies a given trace.
///
/// The id is valid if it contains at least one non-zero byte.
#[derive(Clone, PartialEq, Eq, Copy, Hash, PartialOrd, Ord)]
pub struct TraceId(u128);

impl TraceId {
    /// Invalid trace id
    pub const INVALID: TraceId = TraceId(0);

    /// Width of the hex form, in characters.
    pub const HEX_WIDTH: usize = 32;

    /// Create a trace id from its representation as a byte array.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        TraceId(u128::from_be_bytes(bytes))
    }

    /// Return the representation of this trace id as a byte array.
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Create a trace id from its integer value.
    pub const fn from_u128(value: u128) -> Self {
        TraceId(value)
    }

    /// Parses the fixed-width form produced by `Display`: exactly 32
    /// lowercase hex characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use tracebridge::trace::TraceId;
    ///
    /// assert!(TraceId::from_hex("58406520a006649127e371903a2de979").is_some());
    ///
    /// assert!(TraceId::from_hex("42").is_none());
    /// assert!(TraceId::from_hex("58406520A006649127E371903A2DE979").is_none());
    /// ```
    pub fn from_hex(hex: &str) -> Option<Self> {
        if !is_fixed_lower_hex(hex, Self::HEX_WIDTH) {
            return None;
        }
        u128::from_str_radix(hex, 16).ok().map(TraceId)
    }
}

impl From<u128> for TraceId {
    fn from(value: u128) -> Self {
        TraceId(value)
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:032x}", self.0))
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:032x}", self.0))
    }
}

impl fmt::LowerHex for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// An 8-byte value which identifies a given span.
///
/// The id is valid if it contains at least one non-zero byte.
#[derive(Clone, PartialEq, Eq, Copy, Hash, PartialOrd, Ord)]
pub struct SpanId(u64);

impl SpanId {
    /// Invalid span id
    pub const INVALID: SpanId = SpanId(0);

    /// Width of the hex form, in characters.
    pub const HEX_WIDTH: usize = 16;

    /// Create a span id from its representation as a byte array.
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        SpanId(u64::from_be_bytes(bytes))
    }

    /// Return the representation of this span id as a byte array.
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Create a span id from its integer value.
    pub const fn from_u64(value: u64) -> Self {
        SpanId(value)
    }

    /// Parses the fixed-width form produced by `Display`: exactly 16
    /// lowercase hex characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use tracebridge::trace::SpanId;
    ///
    /// assert!(SpanId::from_hex("58406520a0066491").is_some());
    ///
    /// assert!(SpanId::from_hex("not_hex").is_none());
    /// ```
    pub fn from_hex(hex: &str) -> Option<Self> {
        if !is_fixed_lower_hex(hex, Self::HEX_WIDTH) {
            return None;
        }
        u64::from_str_radix(hex, 16).ok().map(SpanId)
    }
}

impl From<u64> for SpanId {
    fn from(value: u64) -> Self {
        SpanId(value)
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:016x}", self.0))
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:016x}", self.0))
    }
}

impl fmt::LowerHex for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    fn trace_id_test_data() -> Vec<(TraceId, &'static str, [u8; 16])> {
        vec![
            (TraceId(0), "00000000000000000000000000000000", [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            (TraceId(42), "0000000000000000000000000000002a", [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 42]),
            (TraceId(126642714606581564793456114182061442190), "5f467fe7bf42676c05e20ba4a90e448e", [95, 70, 127, 231, 191, 66, 103, 108, 5, 226, 11, 164, 169, 14, 68, 142])
        ]
    }

    #[rustfmt::skip]
    fn span_id_test_data() -> Vec<(SpanId, &'static str, [u8; 8])> {
        vec![
            (SpanId(0), "0000000000000000", [0, 0, 0, 0, 0, 0, 0, 0]),
            (SpanId(42), "000000000000002a", [0, 0, 0, 0, 0, 0, 0, 42]),
            (SpanId(5508496025762705295), "4c721bf33e3caf8f", [76, 114, 27, 243, 62, 60, 175, 143])
        ]
    }

    #[test]
    fn test_trace_id() {
        for test_case in trace_id_test_data() {
            assert_eq!(format!("{}", test_case.0), test_case.1);
            assert_eq!(format!("{:032x}", test_case.0), test_case.1);
            assert_eq!(test_case.0.to_bytes(), test_case.2);

            assert_eq!(Some(test_case.0), TraceId::from_hex(test_case.1));
            assert_eq!(test_case.0, TraceId::from_bytes(test_case.2));
        }
    }

    #[test]
    fn test_span_id() {
        for test_case in span_id_test_data() {
            assert_eq!(format!("{}", test_case.0), test_case.1);
            assert_eq!(format!("{:016x}", test_case.0), test_case.1);
            assert_eq!(test_case.0.to_bytes(), test_case.2);

            assert_eq!(Some(test_case.0), SpanId::from_hex(test_case.1));
            assert_eq!(test_case.0, SpanId::from_bytes(test_case.2));
        }
    }

    #[rustfmt::skip]
    fn rejected_hex() -> Vec<(&'static str, &'static str)> {
        vec![
            ("4bf92f3577b34da6a3ce929d0e0e473", "one char short"),
            ("4bf92f3577b34da6a3ce929d0e0e47360", "one char long"),
            ("+bf92f3577b34da6a3ce929d0e0e4736", "sign prefix"),
            ("4BF92F3577B34DA6A3CE929D0E0E4736", "uppercase"),
            ("4bf92f3577b34da6a3ce929d0e0e473g", "non-hex"),
            ("4bf92f3577b34da6a3ce929d0e0e47é", "unicode"),
            ("", "empty"),
        ]
    }

    #[test]
    fn from_hex_requires_fixed_width_lowercase() {
        for (input, reason) in rejected_hex() {
            assert_eq!(TraceId::from_hex(input), None, "{reason}");
        }
        assert_eq!(SpanId::from_hex("+0f067aa0ba902b7"), None);
        assert_eq!(SpanId::from_hex("00f067aa0ba902b"), None);
    }

    #[test]
    fn trace_flags_stay_in_defined_range() {
        assert_eq!(TraceFlags::new(0xff), TraceFlags::SAMPLED);
        assert_eq!(TraceFlags::from_bits(0x01), Some(TraceFlags::SAMPLED));
        assert_eq!(TraceFlags::from_bits(0x02), None);
        assert!(!TraceFlags::SAMPLED.with_sampled(false).is_sampled());
        assert_eq!(!TraceFlags::NOT_SAMPLED, TraceFlags::SAMPLED);
    }
}
