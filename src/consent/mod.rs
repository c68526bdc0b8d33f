//! Decoding of complete consent strings.
//!
//! The first character of a consent string designates its version: `B` for TCF v1.1 and `C` for
//! TCF v2.0. A v1.1 string is a single Base64 encoded segment, while a v2.0 string is made of a
//! core segment optionally followed by `.` separated trailing segments:
//!
//! ```text
//! COvVNSUOvVNSUKyACDENAPCEANAAABwAAAIgBAwAgAVQCAAIEAgYAQAQoBAAECAA.QD5QAoBAAECAfIA
//! ```
//!
//! A [`ParsedConsent`] can be obtained in several ways.
//!
//! # Examples
//!
//! Using [`ParsedConsent::parse_str`]:
//!
//! ```
//! use iab_tcf::{ParsedConsent, TcfDecodeError};
//!
//! fn main() -> Result<(), TcfDecodeError> {
//!     let c = ParsedConsent::parse_str("BONMj34ONMj34ABACDENALqAAAAAplY")?;
//!     assert_eq!(c.version(), 1);
//!     Ok(())
//! }
//! ```
//!
//! Using [`str::parse`], since [`ParsedConsent`] implements [`FromStr`]:
//!
//! ```
//! use iab_tcf::{ParsedConsent, TcfDecodeError};
//!
//! fn main() -> Result<(), TcfDecodeError> {
//!     let c: ParsedConsent = "BONMj34ONMj34ABACDENALqAAAAAplY".parse()?;
//!     assert!(c.vendor_allowed(9));
//!     Ok(())
//! }
//! ```
//!
//! Or with explicit [`DecodeOptions`]:
//!
//! ```
//! use iab_tcf::{DecodeOptions, ParsedConsent, TcfDecodeError};
//!
//! // the language code of this string holds a letter code above 25
//! let r = ParsedConsent::parse_with("BONMj34ONMj34ABACDeNALqAAAAAplY", &DecodeOptions::strict());
//!
//! assert!(matches!(r, Err(TcfDecodeError::InvalidCharacter { code: 30 })));
//! ```
//!
//! # Trailing segments
//!
//! Only the core segment is mandatory. A trailing segment which cannot be decoded, or whose type
//! is unknown, is skipped and does not prevent the consent string from being returned.
//!
use crate::core::{DataReader, DecodeExt, IdSet};
use crate::error::TcfDecodeError;
use crate::segments::core_v1::ConsentV1;
use crate::segments::core_v2::ConsentV2;
use crate::segments::publisher_tc::PublisherTc;
use crate::segments::vendors::Vendors;
use crate::segments::{Base64EncodedStr, SegmentType};
use num_traits::FromPrimitive;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::SystemTime;
use tracing::{debug, trace, warn};

const V1_PREFIX: char = 'B';
const V2_PREFIX: char = 'C';
const SEGMENT_SEPARATOR: char = '.';

/// Options which tune how consent strings are decoded.
///
/// The default options decode strings the lenient way.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DecodeOptions {
    /// Reject letter codes above 25 in language and country codes.
    ///
    /// When disabled, such codes are mapped to the characters following `Z` in ASCII.
    pub strict_strings: bool,
}

impl DecodeOptions {
    /// Options with every strict check enabled.
    pub fn strict() -> Self {
        Self {
            strict_strings: true,
        }
    }

    pub(crate) fn reader<'a>(&self, bytes: &'a [u8]) -> DataReader<'a> {
        DataReader::new(bytes).with_strict_strings(self.strict_strings)
    }
}

/// A decoded consent string, either TCF v1.1 or TCF v2.0.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum ParsedConsent {
    V1(ConsentV1),
    V2(ConsentV2),
}

impl ParsedConsent {
    /// Parses a consent string with the default [`DecodeOptions`].
    ///
    /// # Errors
    ///
    /// Returns a [`TcfDecodeError`] if the string is empty, has an unsupported version, or if its
    /// core segment cannot be decoded.
    ///
    /// # Example
    ///
    /// ```
    /// use iab_tcf::ParsedConsent;
    ///
    /// let r = ParsedConsent::parse_str("COvVNSUOvVNSUKyACDENAPCEANAAABwAAAIgBAwAgAVQCAAIEAgYAQAQoBAAECAA");
    ///
    /// assert!(matches!(r, Ok(ParsedConsent::V2(_))));
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, TcfDecodeError> {
        s.parse()
    }

    /// Parses a consent string with the given options.
    ///
    /// # Errors
    ///
    /// Same as [`parse_str`](ParsedConsent::parse_str), plus the checks enabled in `options`.
    pub fn parse_with(s: &str, options: &DecodeOptions) -> Result<Self, TcfDecodeError> {
        let first = s.chars().next().ok_or(TcfDecodeError::TooShort)?;
        match first {
            V1_PREFIX => {
                trace!("decoding v1.1 consent string");
                s.parse_base64_str(options).map(Self::V1)
            }
            V2_PREFIX => {
                trace!("decoding v2.0 consent string");
                decode_v2(s, options).map(Self::V2)
            }
            found => Err(TcfDecodeError::UnsupportedVersion { found }),
        }
    }

    pub fn as_v1(&self) -> Option<&ConsentV1> {
        match self {
            Self::V1(c) => Some(c),
            Self::V2(_) => None,
        }
    }

    pub fn as_v2(&self) -> Option<&ConsentV2> {
        match self {
            Self::V1(_) => None,
            Self::V2(c) => Some(c),
        }
    }

    pub fn version(&self) -> u8 {
        match self {
            Self::V1(c) => c.version,
            Self::V2(c) => c.version,
        }
    }

    pub fn created(&self) -> SystemTime {
        match self {
            Self::V1(c) => c.created,
            Self::V2(c) => c.created,
        }
    }

    pub fn last_updated(&self) -> SystemTime {
        match self {
            Self::V1(c) => c.last_updated,
            Self::V2(c) => c.last_updated,
        }
    }

    pub fn cmp_id(&self) -> u16 {
        match self {
            Self::V1(c) => c.cmp_id,
            Self::V2(c) => c.cmp_id,
        }
    }

    pub fn cmp_version(&self) -> u16 {
        match self {
            Self::V1(c) => c.cmp_version,
            Self::V2(c) => c.cmp_version,
        }
    }

    pub fn consent_screen(&self) -> u8 {
        match self {
            Self::V1(c) => c.consent_screen,
            Self::V2(c) => c.consent_screen,
        }
    }

    /// Two letters ISO 639-1 language code of the consent screen.
    pub fn consent_language(&self) -> &str {
        match self {
            Self::V1(c) => &c.consent_language,
            Self::V2(c) => &c.consent_language,
        }
    }

    pub fn vendor_list_version(&self) -> u16 {
        match self {
            Self::V1(c) => c.vendor_list_version,
            Self::V2(c) => c.vendor_list_version,
        }
    }

    pub fn purposes_allowed(&self) -> &IdSet {
        match self {
            Self::V1(c) => &c.purposes_allowed,
            Self::V2(c) => &c.purposes_allowed,
        }
    }

    pub fn max_vendor_id(&self) -> u16 {
        match self {
            Self::V1(c) => c.max_vendor_id,
            Self::V2(c) => c.max_vendor_id,
        }
    }

    pub fn consented_vendors(&self) -> &IdSet {
        match self {
            Self::V1(c) => &c.consented_vendors,
            Self::V2(c) => &c.consented_vendors,
        }
    }

    /// Returns true if every one of the given purposes is allowed.
    ///
    /// An empty list of purposes is always allowed.
    ///
    /// # Example
    ///
    /// ```
    /// use iab_tcf::{ParsedConsent, TcfDecodeError};
    ///
    /// fn main() -> Result<(), TcfDecodeError> {
    ///     let c = ParsedConsent::parse_str("BONMj34ONMj34ABACDENALqAAAAAplY")?;
    ///
    ///     assert!(c.every_purpose_allowed(&[1, 3]));
    ///     assert!(!c.every_purpose_allowed(&[1, 2]));
    ///     Ok(())
    /// }
    /// ```
    pub fn every_purpose_allowed(&self, purpose_ids: &[u8]) -> bool {
        let allowed = self.purposes_allowed();
        purpose_ids.iter().all(|&id| allowed.contains(u16::from(id)))
    }

    /// Returns true if the vendor has consent.
    pub fn vendor_allowed(&self, vendor_id: u16) -> bool {
        self.consented_vendors().contains(vendor_id)
    }
}

impl FromStr for ParsedConsent {
    type Err = TcfDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with(s, &DecodeOptions::default())
    }
}

enum TrailingSegment {
    DisclosedVendors(Vendors),
    AllowedVendors(Vendors),
    PublisherTc(PublisherTc),
}

fn decode_v2(s: &str, options: &DecodeOptions) -> Result<ConsentV2, TcfDecodeError> {
    let mut segments = s.split(SEGMENT_SEPARATOR);
    let core = segments.next().unwrap_or_default();
    let mut consent: ConsentV2 = core.parse_base64_str(options)?;
    trace!(trailing_segments = segments.clone().count(), "decoded core segment");

    for (index, segment) in segments.enumerate().map(|(i, seg)| (i + 1, seg)) {
        if segment.is_empty() {
            debug!(index, "skipping empty segment");
            continue;
        }

        match decode_trailing_segment(segment, options) {
            Ok(Some(TrailingSegment::DisclosedVendors(v))) => {
                fill(&mut consent.disclosed_vendors, v, SegmentType::DisclosedVendors)
            }
            Ok(Some(TrailingSegment::AllowedVendors(v))) => {
                fill(&mut consent.allowed_vendors, v, SegmentType::AllowedVendors)
            }
            Ok(Some(TrailingSegment::PublisherTc(p))) => {
                fill(&mut consent.publisher_tc, p, SegmentType::PublisherTc)
            }
            Ok(None) => debug!(index, "skipping segment of unknown type"),
            Err(error) => warn!(index, %error, "skipping undecodable segment"),
        }
    }

    Ok(consent)
}

fn decode_trailing_segment(
    s: &str,
    options: &DecodeOptions,
) -> Result<Option<TrailingSegment>, TcfDecodeError> {
    let b = s.decode_base64_url()?;
    let segment_type = DataReader::new(&b).read_fixed_integer::<u8>(3)?;
    trace!(segment_type, "decoding trailing segment");

    let mut r = options.reader(&b);
    let segment = match SegmentType::from_u8(segment_type) {
        Some(SegmentType::DisclosedVendors) => Some(TrailingSegment::DisclosedVendors(r.parse()?)),
        Some(SegmentType::AllowedVendors) => Some(TrailingSegment::AllowedVendors(r.parse()?)),
        Some(SegmentType::PublisherTc) => Some(TrailingSegment::PublisherTc(r.parse()?)),
        Some(SegmentType::Core) | None => None,
    };
    Ok(segment)
}

// the last occurrence of a segment type wins
fn fill<T>(slot: &mut Option<T>, value: T, segment_type: SegmentType) {
    if slot.replace(value).is_some() {
        debug!(%segment_type, "segment type seen more than once, replacing previous one");
    }
}
