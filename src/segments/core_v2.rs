use crate::core::{DataReader, FromDataReader, IdSet, RestrictionEntry};
use crate::error::TcfDecodeError;
use crate::segments::publisher_tc::PublisherTc;
use crate::segments::read_vendor_set;
use crate::segments::vendors::Vendors;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use strum_macros::Display;

/// A TCF v2.0 consent string: the core segment and the optional trailing segments.
///
/// Decoding the core segment through [`FromDataReader`] leaves the trailing segments empty,
/// they are filled in by [`ParsedConsent`](crate::ParsedConsent) when present in the string.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct ConsentV2 {
    pub version: u8,
    pub created: SystemTime,
    pub last_updated: SystemTime,
    pub cmp_id: u16,
    pub cmp_version: u16,
    pub consent_screen: u8,
    pub consent_language: String,
    pub vendor_list_version: u16,
    pub policy_version: u8,
    pub is_specific_service: bool,
    pub use_non_standard_stacks: bool,
    pub special_feature_optins: IdSet,
    pub purposes_allowed: IdSet,
    pub purposes_transparency: IdSet,
    pub purpose_one_treatment: bool,
    pub publisher_cc: String,
    pub max_vendor_id: u16,
    pub consented_vendors: IdSet,
    pub legit_max_vendor_id: u16,
    pub legit_consented_vendors: IdSet,
    pub num_pub_restrictions: u16,
    pub pub_restrictions: Vec<PubRestriction>,
    pub disclosed_vendors: Option<Vendors>,
    pub allowed_vendors: Option<Vendors>,
    pub publisher_tc: Option<PublisherTc>,
}

impl ConsentV2 {
    /// Returns true if the vendor is allowed to process data on the basis of legitimate interest.
    pub fn vendor_legitimate_interest(&self, vendor_id: u16) -> bool {
        self.legit_consented_vendors.contains(vendor_id)
    }

    /// Returns the publisher restrictions which apply to the given purpose.
    pub fn restrictions_for_purpose(
        &self,
        purpose_id: u16,
    ) -> impl Iterator<Item = &PubRestriction> + '_ {
        self.pub_restrictions
            .iter()
            .filter(move |r| r.purpose_id == purpose_id)
    }
}

impl FromDataReader for ConsentV2 {
    type Err = TcfDecodeError;

    fn from_data_reader(r: &mut DataReader) -> Result<Self, Self::Err> {
        let version = r.read_fixed_integer(6)?;
        let created = r.read_datetime()?;
        let last_updated = r.read_datetime()?;
        let cmp_id = r.read_fixed_integer(12)?;
        let cmp_version = r.read_fixed_integer(12)?;
        let consent_screen = r.read_fixed_integer(6)?;
        let consent_language = r.read_string(2)?;
        let vendor_list_version = r.read_fixed_integer(12)?;
        let policy_version = r.read_fixed_integer(6)?;
        let is_specific_service = r.read_bool()?;
        let use_non_standard_stacks = r.read_bool()?;
        let special_feature_optins = r.read_fixed_bitfield(12)?;
        let purposes_allowed = r.read_fixed_bitfield(24)?;
        let purposes_transparency = r.read_fixed_bitfield(24)?;
        let purpose_one_treatment = r.read_bool()?;
        let publisher_cc = r.read_string(2)?;
        let max_vendor_id = r.read_fixed_integer(16)?;
        let consented_vendors = read_vendor_set(r, max_vendor_id, max_vendor_id)?;
        let legit_max_vendor_id = r.read_fixed_integer(16)?;
        // as a bitfield, legitimate interests span max_vendor_id bits, not legit_max_vendor_id
        let legit_consented_vendors = read_vendor_set(r, legit_max_vendor_id, max_vendor_id)?;
        let num_pub_restrictions = r.read_fixed_integer(12)?;
        let pub_restrictions = r
            .read_restriction_entries(num_pub_restrictions)?
            .into_iter()
            .map(PubRestriction::from)
            .collect();

        Ok(Self {
            version,
            created,
            last_updated,
            cmp_id,
            cmp_version,
            consent_screen,
            consent_language,
            vendor_list_version,
            policy_version,
            is_specific_service,
            use_non_standard_stacks,
            special_feature_optins,
            purposes_allowed,
            purposes_transparency,
            purpose_one_treatment,
            publisher_cc,
            max_vendor_id,
            consented_vendors,
            legit_max_vendor_id,
            legit_consented_vendors,
            num_pub_restrictions,
            pub_restrictions,
            disclosed_vendors: None,
            allowed_vendors: None,
            publisher_tc: None,
        })
    }
}

/// A publisher restriction: the vendors it lists are restricted for one purpose.
///
/// Restrictions are only produced by decoding, they cannot be built outside of this crate:
///
/// ```compile_fail
/// use iab_tcf::IdSet;
/// use iab_tcf::segments::core_v2::{PubRestriction, RestrictionType};
///
/// let r = PubRestriction {
///     purpose_id: 1,
///     restriction_type: RestrictionType::NotAllowed,
///     num_entries: 0,
///     restricted_vendors: IdSet::new(),
/// };
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct PubRestriction {
    pub purpose_id: u16,
    pub restriction_type: RestrictionType,
    pub num_entries: u16,
    pub restricted_vendors: IdSet,
}

impl From<RestrictionEntry> for PubRestriction {
    fn from(r: RestrictionEntry) -> Self {
        Self {
            purpose_id: r.purpose_id,
            restriction_type: RestrictionType::from_u8(r.restriction_type)
                .unwrap_or(RestrictionType::Reserved),
            num_entries: r.num_entries,
            restricted_vendors: r.vendor_ids,
        }
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum RestrictionType {
    NotAllowed = 0,
    RequireConsent = 1,
    RequireLegitimateInterest = 2,
    Reserved = 3,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::DecodeOptions;
    use crate::segments::Base64EncodedStr;
    use test_case::test_case;

    fn parse(s: &str) -> Result<ConsentV2, TcfDecodeError> {
        s.parse_base64_str(&DecodeOptions::default())
    }

    #[test]
    fn core_segment() {
        let c = parse("COvVNSUOvVNSUKyACDENAPCEANAAABwAAAIgBAwAgAVQCAAIEAgYAQAQoBAAECAA").unwrap();

        assert_eq!(c.version, 2);
        assert_eq!(c.cmp_id, 690);
        assert_eq!(c.cmp_version, 2);
        assert_eq!(c.consent_screen, 3);
        assert_eq!(c.consent_language, "EN");
        assert_eq!(c.vendor_list_version, 15);
        assert_eq!(c.policy_version, 2);
        assert!(!c.is_specific_service);
        assert!(!c.use_non_standard_stacks);
        assert_eq!(c.special_feature_optins, IdSet::from([2]));
        assert_eq!(c.purposes_allowed, IdSet::from([1, 2, 4]));
        assert_eq!(c.purposes_transparency, IdSet::from([4, 5, 6]));
        assert!(!c.purpose_one_treatment);
        assert_eq!(c.publisher_cc, "BE");
        assert_eq!(c.max_vendor_id, 129);
        assert_eq!(c.consented_vendors, IdSet::from([42, 128, 129]));
        assert_eq!(c.legit_max_vendor_id, 129);
        assert_eq!(c.legit_consented_vendors, IdSet::from([66, 128, 129]));
        assert_eq!(c.num_pub_restrictions, 0);
        assert!(c.pub_restrictions.is_empty());
        assert_eq!(c.disclosed_vendors, None);
        assert_eq!(c.allowed_vendors, None);
        assert_eq!(c.publisher_tc, None);
    }

    #[test]
    fn bitfields_and_restrictions() {
        let c = parse("CONMj34ONMj34AHABDFRAwCsALAAAEIAAIqIADFQADRABAACAAwAKAAwAB4AIAAYALA").unwrap();

        assert_eq!(c.consent_language, "FR");
        assert_eq!(c.vendor_list_version, 48);
        assert!(c.is_specific_service);
        assert!(c.purpose_one_treatment);
        assert_eq!(c.special_feature_optins, IdSet::from([1, 2]));
        assert_eq!(c.purposes_allowed, IdSet::from([1, 3, 4]));
        assert_eq!(c.purposes_transparency, IdSet::from([2, 7]));
        assert_eq!(c.max_vendor_id, 6);
        assert_eq!(c.consented_vendors, IdSet::from([2, 4, 6]));
        assert_eq!(c.legit_max_vendor_id, 3);
        // read over max_vendor_id bits, not legit_max_vendor_id
        assert_eq!(c.legit_consented_vendors, IdSet::from([1, 5]));
        assert_eq!(c.num_pub_restrictions, 2);
        assert_eq!(
            c.pub_restrictions,
            vec![
                PubRestriction {
                    purpose_id: 1,
                    restriction_type: RestrictionType::NotAllowed,
                    num_entries: 1,
                    restricted_vendors: IdSet::from([10, 11, 12]),
                },
                PubRestriction {
                    purpose_id: 7,
                    restriction_type: RestrictionType::RequireLegitimateInterest,
                    num_entries: 2,
                    restricted_vendors: IdSet::from([3, 44]),
                },
            ]
        );

        assert!(c.vendor_legitimate_interest(5));
        assert!(!c.vendor_legitimate_interest(2));
        assert_eq!(c.restrictions_for_purpose(7).count(), 1);
        assert_eq!(c.restrictions_for_purpose(2).count(), 0);
    }

    #[test_case(0 => RestrictionType::NotAllowed)]
    #[test_case(1 => RestrictionType::RequireConsent)]
    #[test_case(2 => RestrictionType::RequireLegitimateInterest)]
    #[test_case(3 => RestrictionType::Reserved)]
    fn restriction_type(n: u8) -> RestrictionType {
        PubRestriction::from(RestrictionEntry {
            purpose_id: 1,
            restriction_type: n,
            num_entries: 0,
            vendor_ids: IdSet::new(),
        })
        .restriction_type
    }

    #[test]
    fn from_str_decodes_core_segment_only() {
        let c: ConsentV2 = "COvVNSUOvVNSUKyACDENAPCEANAAABwAAAIgBAwAgAVQCAAIEAgYAQAQoBAAECAA"
            .parse()
            .unwrap();
        assert_eq!(c.cmp_id, 690);
        assert_eq!(c.disclosed_vendors, None);

        let with_trailing =
            "COvVNSUOvVNSUKyACDENAPCEANAAABwAAAIgBAwAgAVQCAAIEAgYAQAQoBAAECAA.IAEIEA"
                .parse::<ConsentV2>();
        assert!(matches!(
            with_trailing,
            Err(TcfDecodeError::DecodeSegment(_))
        ));
    }

    #[test_case("CPX" => matches TcfDecodeError::UnexpectedEof { .. } ; "truncated")]
    #[test_case("" => matches TcfDecodeError::UnexpectedEof { .. } ; "empty string")]
    #[test_case("COvVNSUOvVNSUKyACDENAPCEANAAABwAAAIgBAwAgAVQCAAIEAgYAQAQ" => matches TcfDecodeError::UnexpectedEof { .. } ; "missing restrictions")]
    #[test_case("COvVNSUOvVNSUKyACDENAPCEANAAABwAAAIg*" => matches TcfDecodeError::DecodeSegment(_) ; "invalid character")]
    fn error(s: &str) -> TcfDecodeError {
        parse(s).unwrap_err()
    }
}
