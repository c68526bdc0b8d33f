use thiserror::Error;

/// The error type that describes failures to decode Base64 encoded strings.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// An invalid byte was found in the input. The offset and offending byte are provided.
    #[error("invalid byte {1} at offset {0}")]
    InvalidByte(usize, u8),
    /// The input length cannot be produced by an unpadded encoder.
    #[error("invalid input length {0}")]
    InvalidLength(usize),
}

/// URL-safe Base64 decoding, no padding.
///
/// Trailing bits which do not complete a byte are dropped, and they are not required to be zero.
pub fn decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    // a single dangling character holds less than a byte
    if s.len() % 4 == 1 {
        return Err(DecodeError::InvalidLength(s.len()));
    }

    let mut buffer = Vec::with_capacity(s.len() * 3 / 4);
    let mut acc = 0u32;
    let mut acc_bits = 0;

    for (offset, b) in s.bytes().enumerate() {
        let value = base64_value(b).ok_or(DecodeError::InvalidByte(offset, b))?;
        acc = (acc << 6) | u32::from(value);
        acc_bits += 6;

        if acc_bits >= 8 {
            acc_bits -= 8;
            buffer.push((acc >> acc_bits) as u8);
            acc &= (1 << acc_bits) - 1;
        }
    }

    Ok(buffer)
}

fn base64_value(b: u8) -> Option<u8> {
    match b {
        b'A'..=b'Z' => Some(b - b'A'),
        b'a'..=b'z' => Some(b - b'a' + 26),
        b'0'..=b'9' => Some(b - b'0' + 52),
        b'-' => Some(62),
        b'_' => Some(63),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(b'A' => Some(0))]
    #[test_case(b'Z' => Some(25))]
    #[test_case(b'a' => Some(26))]
    #[test_case(b'z' => Some(51))]
    #[test_case(b'0' => Some(52))]
    #[test_case(b'9' => Some(61))]
    #[test_case(b'-' => Some(62) ; "dash")]
    #[test_case(b'_' => Some(63) ; "underscore")]
    #[test_case(b'+' => None ; "plus")]
    #[test_case(b'/' => None ; "slash")]
    #[test_case(b'=' => None ; "equal")]
    fn base64_value_map(b: u8) -> Option<u8> {
        base64_value(b)
    }

    #[test_case("" => is empty ; "empty string")]
    #[test_case("AQID" => vec![1, 2, 3] ; "aligned")]
    #[test_case("AQI" => vec![1, 2] ; "two bytes")]
    #[test_case("AQ" => vec![1] ; "one byte")]
    #[test_case("AR" => vec![1] ; "non zero trailing bits")]
    #[test_case("_-8" => vec![255, 239] ; "url safe alphabet")]
    #[test_case("BONMj34ONMj34ABACDENALqAAAAAplY" => vec![
        4, 227, 76, 143, 126, 14, 52, 200, 247, 224, 0, 64, 8, 49, 13, 0, 186, 128, 0, 0, 0, 166, 86
    ] ; "v1 consent string")]
    fn decode_base64(s: &str) -> Vec<u8> {
        decode(s).unwrap()
    }

    #[test_case("===" => DecodeError::InvalidByte(0, b'=') ; "equal signs")]
    #[test_case("a  a" => DecodeError::InvalidByte(1, b' ') ; "whitespaces")]
    #[test_case("AQID+w" => DecodeError::InvalidByte(4, b'+') ; "standard alphabet")]
    #[test_case("A" => DecodeError::InvalidLength(1) ; "single character")]
    #[test_case("AQIDB" => DecodeError::InvalidLength(5) ; "dangling character")]
    fn error(s: &str) -> DecodeError {
        decode(s).unwrap_err()
    }
}
