use crate::core::{DataReader, FromDataReader, IdSet};
use crate::error::TcfDecodeError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

// See https://github.com/InteractiveAdvertisingBureau/GDPR-Transparency-and-Consent-Framework/blob/master/Consent%20string%20and%20vendor%20list%20formats%20v1.1%20Final.md
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct ConsentV1 {
    pub version: u8,
    pub created: SystemTime,
    pub last_updated: SystemTime,
    pub cmp_id: u16,
    pub cmp_version: u16,
    pub consent_screen: u8,
    pub consent_language: String,
    pub vendor_list_version: u16,
    pub purposes_allowed: IdSet,
    pub max_vendor_id: u16,
    pub consented_vendors: IdSet,
}

impl FromDataReader for ConsentV1 {
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
        let purposes_allowed = r.read_fixed_bitfield(24)?;
        let max_vendor_id = r.read_fixed_integer(16)?;
        let consented_vendors = parse_vendor_consents(r, max_vendor_id)?;

        Ok(Self {
            version,
            created,
            last_updated,
            cmp_id,
            cmp_version,
            consent_screen,
            consent_language,
            vendor_list_version,
            purposes_allowed,
            max_vendor_id,
            consented_vendors,
        })
    }
}

fn parse_vendor_consents(r: &mut DataReader, max_vendor_id: u16) -> Result<IdSet, TcfDecodeError> {
    let is_range = r.read_bool()?;
    if is_range {
        // with a default consent, entries list the vendors who do not consent
        let default_consent = r.read_bool()?;
        let num_entries = r.read_fixed_integer(12)?;
        r.read_range_entries(num_entries, max_vendor_id, default_consent)
    } else {
        r.read_fixed_bitfield(usize::from(max_vendor_id))
    }
}
