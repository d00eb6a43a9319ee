//! Byte and text decoding shared by every reader.
//!
//! SMC replies arrive as a four-character data type plus up to 32 raw bytes.
//! Integer and fixed-point types are big-endian; `flt ` and `ioft` are
//! little-endian (Apple Silicon firmware).

use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

// ---------------------------------------------------------------------------
// Four-character codes
// ---------------------------------------------------------------------------

/// A four-byte ASCII key packed big-endian into a `u32` (`"TC0P"` -> `0x54433050`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FourCharCode(pub u32);

impl FourCharCode {
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl FromStr for FourCharCode {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| CodecError::KeyLength(s.len()))?;
        Ok(Self::from_bytes(bytes))
    }
}

impl fmt::Display for FourCharCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_bytes() {
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixed-point decoding
// ---------------------------------------------------------------------------

/// Decode the legacy `fpe2` fan-speed encoding: 14 integer bits, 2 fraction
/// bits, fraction discarded.
pub fn fpe2(bytes: [u8; 2]) -> u32 {
    (u32::from(bytes[0]) << 6) + (u32::from(bytes[1]) >> 2)
}

/// Unsigned big-endian 16-bit fixed point with `fraction_bits` fraction bits.
pub fn unsigned_fixed(bytes: [u8; 2], fraction_bits: u32) -> f64 {
    f64::from(u16::from_be_bytes(bytes)) / f64::from(1u32 << fraction_bits)
}

/// Signed big-endian 16-bit fixed point (`sp78` is 7 integer, 8 fraction bits).
pub fn signed_fixed(bytes: [u8; 2], fraction_bits: u32) -> f64 {
    f64::from(i16::from_be_bytes(bytes)) / f64::from(1u32 << fraction_bits)
}

/// A decoded firmware reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Number(f64),
    Text(String),
}

impl Decoded {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

/// Decode `bytes` according to the SMC `data_type`.
pub fn decode(data_type: FourCharCode, bytes: &[u8]) -> Result<Decoded, CodecError> {
    let name = data_type.to_string();
    let tag = name.as_str();

    let need = |n: usize| take(bytes, n, tag);

    let value = match tag {
        "ui8 " | "flag" => f64::from(need(1)?[0]),
        "ui16" => f64::from(u16::from_be_bytes(array(need(2)?))),
        "ui32" => f64::from(u32::from_be_bytes(array(need(4)?))),
        "ui64" => u64::from_be_bytes(array(need(8)?)) as f64,
        "si8 " => f64::from(need(1)?[0] as i8),
        "si16" => f64::from(i16::from_be_bytes(array(need(2)?))),
        "si32" => f64::from(i32::from_be_bytes(array(need(4)?))),
        "flt " => f64::from(f32::from_le_bytes(array(need(4)?))),
        "ioft" => u64::from_le_bytes(array(need(8)?)) as f64 / 65536.0,
        "fpe2" => f64::from(fpe2(array(need(2)?))),
        "ch8*" => return Ok(Decoded::Text(ascii(bytes))),
        // Fan descriptor: type, zone, location, reserved, 12-byte name.
        "{fds" => return Ok(Decoded::Text(ascii(bytes.get(4..).unwrap_or_default()))),
        _ => match fixed_point_fraction(tag) {
            Some((signed, fraction)) => {
                let raw = array(need(2)?);
                if signed {
                    signed_fixed(raw, fraction)
                } else {
                    unsigned_fixed(raw, fraction)
                }
            }
            None => return Err(CodecError::Unsupported(tag.to_string())),
        },
    };

    Ok(Decoded::Number(value))
}

/// `fpXY` / `spXY`: X integer bits, Y fraction bits, both hex digits.
fn fixed_point_fraction(tag: &str) -> Option<(bool, u32)> {
    let signed = match tag.get(..2)? {
        "fp" => false,
        "sp" => true,
        _ => return None,
    };
    let mut digits = tag[2..].chars();
    let integer = digits.next()?.to_digit(16)?;
    let fraction = digits.next()?.to_digit(16)?;
    if integer + fraction > 16 {
        return None;
    }
    Some((signed, fraction))
}

fn take<'a>(bytes: &'a [u8], n: usize, tag: &str) -> Result<&'a [u8], CodecError> {
    bytes.get(..n).ok_or_else(|| CodecError::ShortBuffer {
        data_type: tag.to_string(),
        expected: n,
        actual: bytes.len(),
    })
}

fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

fn ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| char::from(b))
        .collect::<String>()
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Parse a decimal number that may use `,` as its decimal separator.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let value: f64 = text.trim().replace(',', ".").parse().ok()?;
    value.is_finite().then_some(value)
}

/// Round `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let divisor = 10f64.powi(places);
    (value * divisor).round() / divisor
}

/// Human-readable byte count with one decimal (`1536.0` -> `"1.5 KB"`).
pub fn readable_size(bytes: f64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes;
    let mut index = 0;
    while value >= 1024.0 && index < UNITS.len() - 1 {
        value /= 1024.0;
        index += 1;
    }
    format!("{value:.1} {}", UNITS[index])
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}
