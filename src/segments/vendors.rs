use crate::core::{DataReader, FromDataReader, IdSet};
use crate::error::TcfDecodeError;
use crate::segments::read_vendor_set;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A Disclosed Vendors (segment type 1) or Allowed Vendors (segment type 2) segment.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct Vendors {
    pub segment_type: u8,
    pub max_vendor_id: u16,
    pub consented_vendors: IdSet,
}

impl FromDataReader for Vendors {
    type Err = TcfDecodeError;

    fn from_data_reader(r: &mut DataReader) -> Result<Self, Self::Err> {
        let segment_type = r.read_fixed_integer(3)?;
        let max_vendor_id = r.read_fixed_integer(16)?;
        let consented_vendors = read_vendor_set(r, max_vendor_id, max_vendor_id)?;

        Ok(Self {
            segment_type,
            max_vendor_id,
            consented_vendors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::DecodeOptions;
    use crate::segments::Base64EncodedStr;
    use test_case::test_case;

    fn parse(s: &str) -> Result<Vendors, TcfDecodeError> {
        s.parse_base64_str(&DecodeOptions::default())
    }

    #[test_case("IAEIEA" => Vendors {
        segment_type: 1,
        max_vendor_id: 8,
        consented_vendors: IdSet::from([1, 8]),
    } ; "disclosed bitfield")]
    #[test_case("QAKQAYAHgAoA" => Vendors {
        segment_type: 2,
        max_vendor_id: 20,
        consented_vendors: (15..=20).collect(),
    } ; "allowed range")]
    #[test_case("QD5QAoBAAECAfIA" => Vendors {
        segment_type: 2,
        max_vendor_id: 498,
        consented_vendors: IdSet::from([128, 129, 498]),
    } ; "allowed ranges")]
    fn parse_vendors(s: &str) -> Vendors {
        parse(s).unwrap()
    }

    #[test]
    fn disclosed_vendors_bitfield() {
        let v = parse("IFoEUQQgAIQwgIwQABAEAAAAOIAACAIAAAAQAIAgEAACEAAAAAgAQBAAAAAAAGBAAgAAAAAAAFAAECAAAgAAQARAEQAAAAAJAAIAAgAAAYQEAAAQmAgBC3ZAYzUw").unwrap();

        assert_eq!(v.segment_type, 1);
        assert_eq!(v.max_vendor_id, 720);
        assert_eq!(v.consented_vendors.len(), 79);
        assert!(v.consented_vendors.contains(2));
        assert!(v.consented_vendors.contains(720));
        assert!(!v.consented_vendors.contains(1));
    }

    #[test]
    fn from_str() {
        let v: Vendors = "QAKQAYAHgAoA".parse().unwrap();

        assert_eq!(v.segment_type, 2);
        assert_eq!(v.consented_vendors, (15..=20).collect::<IdSet>());
        assert!(matches!(
            "IAE".parse::<Vendors>(),
            Err(TcfDecodeError::UnexpectedEof { .. })
        ));
    }

    #[test_case("IAE" => matches TcfDecodeError::UnexpectedEof { .. } ; "truncated bitfield")]
    #[test_case("QAKQAYAH" => matches TcfDecodeError::UnexpectedEof { .. } ; "truncated range")]
    fn error(s: &str) -> TcfDecodeError {
        parse(s).unwrap_err()
    }
}
