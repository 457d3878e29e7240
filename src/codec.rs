//! Scalar quantization and the pose string alphabet.
//!
//! A [`BoundedValueCodec`] maps a value of a closed interval `[min, max]` onto
//! the digit grid `0..BASE`, and a digit onto one printable character. The
//! double precision variant splits the same value into a high and a low order
//! digit, giving `BASE²` steps over the interval.

use serde::{Deserialize, Serialize};

use crate::error::{PoseError, Result};

/// Radix of the quantization grid. Must stay even so that `BASE / 2` is the
/// exact middle of every interval.
pub const BASE: u32 = 60;

/// Digit used for neutral values and for axes that are not serialized.
pub const MID_DIGIT: u32 = BASE / 2;

/// Digit `n` is encoded as `ALPHABET[n]`. Every character is URL-safe.
pub const ALPHABET: &[u8; BASE as usize] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz01234567";

const BASE_F: f32 = BASE as f32;

/// Rounding policy applied when a packed value is turned into a digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundTo {
    #[default]
    Nearest,
    Bottom,
    Top,
}

impl RoundTo {
    fn apply(self, value: f32) -> f32 {
        match self {
            RoundTo::Nearest => value.round(),
            RoundTo::Bottom => value.floor(),
            RoundTo::Top => value.ceil(),
        }
    }
}

/// Converts one digit to its alphabet character.
pub fn to_char(digit: u32) -> Result<char> {
    ALPHABET
        .get(digit as usize)
        .map(|byte| *byte as char)
        .ok_or_else(|| {
            PoseError::serialization(format!(
                "can not convert value {digit} to string: index overflow"
            ))
        })
}

/// Converts one alphabet character back to its digit.
pub fn from_char(character: char) -> Result<u32> {
    u8::try_from(character)
        .ok()
        .and_then(|byte| ALPHABET.iter().position(|candidate| *candidate == byte))
        .map(|position| position as u32)
        .ok_or_else(|| {
            PoseError::serialization(format!(
                "can not convert string '{character}' to value: unrecognized char"
            ))
        })
}

/// Decodes exactly `N` characters into digits.
pub(crate) fn digits_from_str<const N: usize>(chars: &str) -> Result<[u32; N]> {
    let mut digits = [0u32; N];
    let mut count = 0usize;
    for character in chars.chars() {
        if count == N {
            count += 1;
            break;
        }
        digits[count] = from_char(character)?;
        count += 1;
    }

    if count != N {
        return Err(PoseError::serialization(format!(
            "field \"{chars}\" should be {N} characters long"
        )));
    }

    Ok(digits)
}

/// A quantizer between continuous values and their digit-level form.
///
/// `Value` is the continuous side (a scalar or a vector) and `Discrete` the
/// representation that is written to the pose string without further
/// rounding. Implementations are idempotent on their own output:
/// `discretize(make_continuous(d)) == d` for every reachable `d`.
pub trait Codec {
    type Value;
    type Discrete;

    /// Number of characters one value occupies in a pose string.
    fn width(&self) -> usize;

    fn discretize(&self, value: Self::Value, round_to: RoundTo) -> Self::Discrete;

    fn make_continuous(&self, discrete: &Self::Discrete) -> Self::Value;

    /// Appends the characters for `discrete` to `out`.
    fn write_discrete(&self, discrete: &Self::Discrete, out: &mut String) -> Result<()>;

    /// Parses exactly [`Codec::width`] characters.
    fn read_discrete(&self, chars: &str) -> Result<Self::Discrete>;

    /// Snaps a value onto the quantization grid.
    fn round(&self, value: Self::Value) -> Self::Value {
        self.make_continuous(&self.discretize(value, RoundTo::Nearest))
    }

    fn to_string(&self, value: Self::Value) -> Result<String> {
        let mut out = String::with_capacity(self.width());
        self.write_discrete(&self.discretize(value, RoundTo::Nearest), &mut out)?;
        Ok(out)
    }

    fn from_string(&self, chars: &str) -> Result<Self::Value> {
        Ok(self.make_continuous(&self.read_discrete(chars)?))
    }
}

// ─── Single digit ─────────────────────────────────────────────────────────────

/// Linear map between `[min, max]` and the digit grid `0..BASE`.
///
/// Digit `d` stands for `min + d * (max - min) / BASE`, so `0` is `min`,
/// [`MID_DIGIT`] is the exact middle and `BASE - 1` is one step below `max`.
/// Values at or above the last step are stored as `BASE - 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedValueCodec {
    min: f32,
    max: f32,
    range: f32,
}

impl BoundedValueCodec {
    /// Creates a codec for `[min, max]`. A degenerate interval maps every
    /// value to `min`.
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            range: max - min,
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Quantization step of one digit.
    pub fn step(&self) -> f32 {
        self.range / BASE_F
    }

    /// Clamps `value` to the interval and maps it linearly onto `[0, BASE]`.
    pub fn pack(&self, value: f32) -> f32 {
        if self.range <= 0.0 {
            return 0.0;
        }
        let clamped = value.max(self.min).min(self.max);
        (clamped - self.min) / self.range * BASE_F
    }

    pub fn unpack(&self, digit: f32) -> f32 {
        digit / BASE_F * self.range + self.min
    }

    pub fn discretize(&self, value: f32, round_to: RoundTo) -> u32 {
        let rounded = round_to.apply(self.pack(value));
        (rounded as u32).min(BASE - 1)
    }

    pub fn make_continuous(&self, digit: u32) -> f32 {
        self.unpack(digit as f32)
    }

    /// Splits `value` into a high order digit and a low order digit over a
    /// `BASE²` grid. A low digit that rounds up to `BASE` carries into the
    /// high digit.
    pub fn discretize_double(&self, value: f32, round_to: RoundTo) -> [u32; 2] {
        let fine = round_to.apply(self.pack(value) * BASE_F);
        let index = (fine as u32).min(BASE * BASE - 1);
        [index / BASE, index % BASE]
    }

    /// Inverse of [`BoundedValueCodec::discretize_double`]:
    /// `unpack(high) + low * step / BASE`.
    pub fn make_continuous_double(&self, digits: [u32; 2]) -> f32 {
        let [high, low] = digits;
        self.unpack(high as f32) + low as f32 * self.step() / BASE_F
    }

    /// Single precision view of this codec.
    pub fn single(self) -> SinglePrecision {
        SinglePrecision(self)
    }

    /// Double precision view of this codec.
    pub fn double(self) -> DoublePrecision {
        DoublePrecision(self)
    }
}

/// One character per value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinglePrecision(pub BoundedValueCodec);

impl Codec for SinglePrecision {
    type Value = f32;
    type Discrete = u32;

    fn width(&self) -> usize {
        1
    }

    fn discretize(&self, value: f32, round_to: RoundTo) -> u32 {
        self.0.discretize(value, round_to)
    }

    fn make_continuous(&self, discrete: &u32) -> f32 {
        self.0.make_continuous(*discrete)
    }

    fn write_discrete(&self, discrete: &u32, out: &mut String) -> Result<()> {
        out.push(to_char(*discrete)?);
        Ok(())
    }

    fn read_discrete(&self, chars: &str) -> Result<u32> {
        let [digit] = digits_from_str::<1>(chars)?;
        Ok(digit)
    }
}

/// Two characters per value, high order digit first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoublePrecision(pub BoundedValueCodec);

impl Codec for DoublePrecision {
    type Value = f32;
    type Discrete = [u32; 2];

    fn width(&self) -> usize {
        2
    }

    fn discretize(&self, value: f32, round_to: RoundTo) -> [u32; 2] {
        self.0.discretize_double(value, round_to)
    }

    fn make_continuous(&self, discrete: &[u32; 2]) -> f32 {
        self.0.make_continuous_double(*discrete)
    }

    fn write_discrete(&self, discrete: &[u32; 2], out: &mut String) -> Result<()> {
        out.push(to_char(discrete[0])?);
        out.push(to_char(discrete[1])?);
        Ok(())
    }

    fn read_discrete(&self, chars: &str) -> Result<[u32; 2]> {
        digits_from_str::<2>(chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degrees() -> BoundedValueCodec {
        BoundedValueCodec::new(-180.0, 180.0)
    }

    #[test]
    fn given_alphabet_when_mapping_every_digit_then_mapping_is_bijective() {
        for digit in 0..BASE {
            let character = to_char(digit).expect("digit in range");
            assert_eq!(from_char(character).expect("char in alphabet"), digit);
        }
        for byte in ALPHABET.iter() {
            let character = *byte as char;
            let digit = from_char(character).expect("char in alphabet");
            assert_eq!(to_char(digit).expect("digit in range"), character);
        }
    }

    #[test]
    fn given_out_of_range_digit_when_converting_then_serialization_error() {
        assert!(matches!(to_char(BASE), Err(PoseError::Serialization(_))));
        assert!(matches!(from_char('-'), Err(PoseError::Serialization(_))));
        assert!(matches!(from_char('8'), Err(PoseError::Serialization(_))));
        assert!(matches!(from_char('é'), Err(PoseError::Serialization(_))));
    }

    #[test]
    fn given_degree_codec_when_discretizing_boundaries_then_digits_are_pinned() {
        let codec = degrees();
        assert_eq!(codec.discretize(-180.0, RoundTo::Nearest), 0);
        assert_eq!(codec.discretize(0.0, RoundTo::Nearest), 30);
        assert_eq!(codec.discretize(180.0, RoundTo::Nearest), 59);
    }

    #[test]
    fn given_degree_codec_when_encoding_then_characters_match_alphabet() {
        let codec = degrees().single();
        assert_eq!(codec.to_string(-180.0).unwrap(), "A");
        assert_eq!(codec.to_string(0.0).unwrap(), "e");
        assert_eq!(codec.to_string(180.0).unwrap(), "7");
        assert_eq!(codec.from_string("A").unwrap(), -180.0);
        assert_eq!(codec.from_string("e").unwrap(), 0.0);
    }

    #[test]
    fn given_values_outside_bounds_when_discretizing_then_they_are_clamped() {
        let codec = degrees();
        assert_eq!(
            codec.discretize(-180.5, RoundTo::Nearest),
            codec.discretize(-180.0, RoundTo::Nearest)
        );
        assert_eq!(
            codec.discretize(181.0, RoundTo::Nearest),
            codec.discretize(180.0, RoundTo::Nearest)
        );
        assert_eq!(codec.discretize(f32::NAN, RoundTo::Nearest), 0);
        assert_eq!(degrees().single().round(-190.0), -180.0);
        assert_eq!(degrees().single().round(0.2), 0.0);
    }

    #[test]
    fn given_rounding_policies_when_discretizing_then_floor_and_ceil_are_applied() {
        let codec = degrees();
        // 2 degrees packs to 30.333...
        assert_eq!(codec.discretize(2.0, RoundTo::Nearest), 30);
        assert_eq!(codec.discretize(2.0, RoundTo::Bottom), 30);
        assert_eq!(codec.discretize(2.0, RoundTo::Top), 31);
        assert_eq!(codec.discretize(179.0, RoundTo::Top), 59);
    }

    #[test]
    fn given_any_value_when_reencoding_decoded_value_then_digit_is_stable() {
        let codec = BoundedValueCodec::new(-85f32.to_radians(), 85f32.to_radians());
        let mut value = -2.0f32;
        while value <= 2.0 {
            let digit = codec.discretize(value, RoundTo::Nearest);
            let decoded = codec.make_continuous(digit);
            assert_eq!(codec.discretize(decoded, RoundTo::Nearest), digit);

            let digits = codec.discretize_double(value, RoundTo::Nearest);
            let decoded = codec.make_continuous_double(digits);
            assert_eq!(codec.discretize_double(decoded, RoundTo::Nearest), digits);

            value += 0.0137;
        }
    }

    #[test]
    fn given_double_precision_when_encoding_small_value_then_error_is_below_fine_step() {
        let codec = degrees().double();
        let encoded = codec.to_string(0.1).unwrap();
        assert_eq!(encoded.len(), 2);
        let decoded = codec.from_string(&encoded).unwrap();
        assert!((decoded - 0.1).abs() <= 360.0 / 3600.0);
    }

    #[test]
    fn given_double_precision_when_encoding_boundaries_then_digits_are_pinned() {
        let codec = degrees();
        assert_eq!(codec.discretize_double(-180.0, RoundTo::Nearest), [0, 0]);
        assert_eq!(codec.discretize_double(0.0, RoundTo::Nearest), [30, 0]);
        assert_eq!(codec.discretize_double(180.0, RoundTo::Nearest), [59, 59]);
        assert_eq!(codec.make_continuous_double([30, 0]), 0.0);
    }

    #[test]
    fn given_low_digit_rounding_up_when_discretizing_double_then_high_digit_carries() {
        let codec = degrees();
        // 29.9999 packed digits: the remainder rounds to BASE and must carry.
        let value = codec.unpack(29.9999);
        assert_eq!(codec.discretize_double(value, RoundTo::Nearest), [30, 0]);
    }

    #[test]
    fn given_wrong_field_width_when_reading_then_serialization_error() {
        assert!(degrees().single().from_string("AA").is_err());
        assert!(degrees().single().from_string("").is_err());
        assert!(degrees().double().from_string("A").is_err());
        assert!(degrees().double().from_string("AAA").is_err());
    }

    #[test]
    fn given_degenerate_interval_when_packing_then_value_is_min() {
        let codec = BoundedValueCodec::new(0.0, 0.0);
        assert_eq!(codec.discretize(1.0, RoundTo::Nearest), 0);
        assert_eq!(codec.make_continuous(MID_DIGIT), 0.0);
    }
}
