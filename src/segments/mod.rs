//! Decoders for the segments a consent string is made of.
//!
//! A v1.1 string is a single core segment. A v2.0 string is a core segment optionally followed
//! by `.` separated trailing segments, each of them starting with a 3 bits [`SegmentType`].
//!
//! Every segment type implements [`FromDataReader`] and reads its fields in the exact order in
//! which they are laid out in the bit stream.
//!
//! Every segment type also implements [`FromStr`](std::str::FromStr), which decodes a single
//! stand-alone Base64 segment with the default [`DecodeOptions`]:
//!
//! ```
//! use iab_tcf::segments::vendors::Vendors;
//! use iab_tcf::TcfDecodeError;
//!
//! fn main() -> Result<(), TcfDecodeError> {
//!     let v: Vendors = "IAEIEA".parse()?;
//!
//!     assert_eq!(v.max_vendor_id, 8);
//!     assert!(v.consented_vendors.contains(8));
//!     Ok(())
//! }
//! ```
//!
//! Parsing a [`ConsentV2`](core_v2::ConsentV2) this way only decodes the core segment, use
//! [`ParsedConsent`](crate::ParsedConsent) for a string with trailing segments.
//!
use crate::consent::DecodeOptions;
use crate::core::{DataReader, DecodeExt, FromDataReader, IdSet};
use crate::error::TcfDecodeError;
use num_derive::{FromPrimitive, ToPrimitive};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum_macros::Display;

pub mod core_v1;
pub mod core_v2;
pub mod publisher_tc;
pub mod vendors;

/// The kind of a v2.0 segment, stored in its first 3 bits.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum SegmentType {
    Core = 0,
    DisclosedVendors = 1,
    AllowedVendors = 2,
    PublisherTc = 3,
}

pub(crate) trait Base64EncodedStr<T> {
    fn parse_base64_str(&self, options: &DecodeOptions) -> Result<T, TcfDecodeError>;
}

impl<T> Base64EncodedStr<T> for str
where
    T: FromDataReader<Err = TcfDecodeError>,
{
    fn parse_base64_str(&self, options: &DecodeOptions) -> Result<T, TcfDecodeError> {
        let b = self.decode_base64_url()?;
        options.reader(&b).parse()
    }
}

macro_rules! impl_from_base64_str {
    ($($segment:ty),+ $(,)?) => {
        $(impl std::str::FromStr for $segment {
            type Err = TcfDecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse_base64_str(&DecodeOptions::default())
            }
        })+
    };
}

impl_from_base64_str!(
    core_v1::ConsentV1,
    core_v2::ConsentV2,
    vendors::Vendors,
    publisher_tc::PublisherTc,
);

/// Reads an encoding flag followed by a vendor set.
///
/// Range entries are read with `max_vendor_id` as upper bound, a bitfield is `bitfield_len` bits
/// long.
pub(crate) fn read_vendor_set(
    r: &mut DataReader,
    max_vendor_id: u16,
    bitfield_len: u16,
) -> Result<IdSet, TcfDecodeError> {
    let is_range_encoding = r.read_bool()?;
    if is_range_encoding {
        let num_entries = r.read_fixed_integer(12)?;
        r.read_range_entries(num_entries, max_vendor_id, false)
    } else {
        r.read_fixed_bitfield(usize::from(bitfield_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tests::b;
    use num_traits::{FromPrimitive, ToPrimitive};
    use test_case::test_case;

    #[test_case(0 => Some(SegmentType::Core))]
    #[test_case(1 => Some(SegmentType::DisclosedVendors))]
    #[test_case(2 => Some(SegmentType::AllowedVendors))]
    #[test_case(3 => Some(SegmentType::PublisherTc))]
    #[test_case(4 => None ; "unknown")]
    fn segment_type(n: u8) -> Option<SegmentType> {
        SegmentType::from_u8(n)
    }

    #[test]
    fn segment_type_value() {
        assert_eq!(SegmentType::PublisherTc.to_u8(), Some(3));
        assert_eq!(SegmentType::AllowedVendors.to_string(), "AllowedVendors");
    }

    #[test_case("0 10110", 5 => IdSet::from([1, 3, 4]) ; "bitfield")]
    #[test_case("1 000000000001 1 0000000000000010 0000000000000100", 5 => IdSet::from([2, 3, 4]) ; "range")]
    fn vendor_set(s: &str, max_vendor_id: u16) -> IdSet {
        read_vendor_set(&mut DataReader::new(&b(s)), max_vendor_id, max_vendor_id).unwrap()
    }

    #[test]
    fn vendor_set_bitfield_length() {
        let buf = b("0 10110 111");
        let mut r = DataReader::new(&buf);
        assert_eq!(
            read_vendor_set(&mut r, 2, 8).unwrap(),
            IdSet::from([1, 3, 4, 6, 7, 8])
        );
    }
}
