use crate::core::{DataReader, FromDataReader, IdSet};
use crate::error::TcfDecodeError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The Publisher Transparency and Consent segment (segment type 3).
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct PublisherTc {
    pub segment_type: u8,
    pub pub_purposes_consent: IdSet,
    pub pub_purposes_li_transparency: IdSet,
    pub num_custom_purposes: u8,
    pub custom_purposes_consent: IdSet,
    pub custom_purposes_li_transparency: IdSet,
}

impl FromDataReader for PublisherTc {
    type Err = TcfDecodeError;

    fn from_data_reader(r: &mut DataReader) -> Result<Self, Self::Err> {
        let segment_type = r.read_fixed_integer(3)?;
        let pub_purposes_consent = r.read_fixed_bitfield(24)?;
        let pub_purposes_li_transparency = r.read_fixed_bitfield(24)?;
        let num_custom_purposes = r.read_fixed_integer(6)?;
        let custom_purposes_consent = r.read_fixed_bitfield(usize::from(num_custom_purposes))?;
        let custom_purposes_li_transparency =
            r.read_fixed_bitfield(usize::from(num_custom_purposes))?;

        Ok(Self {
            segment_type,
            pub_purposes_consent,
            pub_purposes_li_transparency,
            num_custom_purposes,
            custom_purposes_consent,
            custom_purposes_li_transparency,
        })
    }
}
