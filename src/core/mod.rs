use crate::core::base64::DecodeError;
use crate::error::TcfDecodeError;
use bitstream_io::{BigEndian, BitRead, BitReader};
use num_traits::FromPrimitive;
use std::iter::repeat_with;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub mod base64;
mod id_set;

pub use id_set::IdSet;

const DECISECOND_MILLIS: u64 = 100;

pub trait DecodeExt {
    fn decode_base64_url(&self) -> Result<Vec<u8>, DecodeError>;
}

impl DecodeExt for str {
    fn decode_base64_url(&self) -> Result<Vec<u8>, DecodeError> {
        base64::decode(self)
    }
}

/// Types which can be decoded field by field from a [`DataReader`].
pub trait FromDataReader: Sized {
    type Err;

    fn from_data_reader(r: &mut DataReader) -> Result<Self, Self::Err>;
}

/// A raw publisher restriction entry, as laid out in the bit stream.
#[derive(Debug, Eq, PartialEq)]
pub struct RestrictionEntry {
    pub purpose_id: u16,
    pub restriction_type: u8,
    pub num_entries: u16,
    pub vendor_ids: IdSet,
}

/// A forward-only reader over a byte buffer, interpreted as a big-endian, MSB-first bit stream.
///
/// Besides raw bit reads, it knows how to read the composite field types found in consent
/// strings: timestamps, letter codes, bitfields, range-encoded sets and publisher restrictions.
///
/// Every read fails with [`TcfDecodeError::UnexpectedEof`] if the buffer does not hold enough
/// bits, in which case nothing is consumed.
pub struct DataReader<'a> {
    bit_reader: BitReader<&'a [u8], BigEndian>,
    remaining: u64,
    strict_strings: bool,
}

impl<'a> DataReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bit_reader: BitReader::endian(bytes, BigEndian),
            remaining: bytes.len() as u64 * 8,
            strict_strings: false,
        }
    }

    /// Makes [`read_string`](DataReader::read_string) reject letter codes above 25.
    pub fn with_strict_strings(mut self, strict: bool) -> Self {
        self.strict_strings = strict;
        self
    }

    pub fn parse<F>(&mut self) -> Result<F, <F as FromDataReader>::Err>
    where
        F: FromDataReader,
    {
        FromDataReader::from_data_reader(self)
    }

    /// Number of bits left in the stream.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn consume(&mut self, bits: u32) -> Result<(), TcfDecodeError> {
        if u64::from(bits) > self.remaining {
            return Err(TcfDecodeError::UnexpectedEof {
                needed: bits,
                remaining: self.remaining,
            });
        }
        self.remaining -= u64::from(bits);
        Ok(())
    }

    /// Reads `bits` bits (between 1 and 64) and returns them right-aligned.
    pub fn read_bits(&mut self, bits: u32) -> Result<u64, TcfDecodeError> {
        if !(1..=64).contains(&bits) {
            return Err(TcfDecodeError::InvalidBitCount { bits });
        }
        self.consume(bits)?;
        Ok(self.bit_reader.read_unsigned_var::<u64>(bits)?)
    }

    pub fn read_bool(&mut self) -> Result<bool, TcfDecodeError> {
        self.consume(1)?;
        Ok(self.bit_reader.read_bit()?)
    }

    /// Reads `bits` bits as an unsigned integer of type `N`.
    ///
    /// Fails with [`TcfDecodeError::InvalidBitCount`], without consuming anything, if `N` cannot
    /// hold every value `bits` bits can encode.
    pub fn read_fixed_integer<N: FromPrimitive>(&mut self, bits: u32) -> Result<N, TcfDecodeError> {
        if !(1..=64).contains(&bits) || N::from_u64(u64::MAX >> (64 - bits)).is_none() {
            return Err(TcfDecodeError::InvalidBitCount { bits });
        }
        let value = self.read_bits(bits)?;
        N::from_u64(value).ok_or(TcfDecodeError::InvalidBitCount { bits })
    }

    /// Reads a 36 bits count of deciseconds since the Unix epoch.
    pub fn read_datetime(&mut self) -> Result<SystemTime, TcfDecodeError> {
        let deciseconds = self.read_bits(36)?;
        Ok(UNIX_EPOCH + Duration::from_millis(deciseconds * DECISECOND_MILLIS))
    }

    /// Reads `chars` letters, 6 bits each, where 0 is `A` and 25 is `Z`.
    pub fn read_string(&mut self, chars: usize) -> Result<String, TcfDecodeError> {
        repeat_with(|| self.read_letter())
            .take(chars)
            .collect::<Result<String, _>>()
    }

    fn read_letter(&mut self) -> Result<char, TcfDecodeError> {
        let code = self.read_fixed_integer::<u8>(6)?;
        if self.strict_strings && code > 25 {
            return Err(TcfDecodeError::InvalidCharacter { code });
        }
        Ok((b'A' + code) as char)
    }

    /// Reads `bits` bits, the resulting set contains `i` if the `i`-th bit read is set.
    pub fn read_fixed_bitfield(&mut self, bits: usize) -> Result<IdSet, TcfDecodeError> {
        let mut result = u16::try_from(bits)
            .map(IdSet::with_max_id)
            .unwrap_or_default();
        for i in 1..=bits {
            if self.read_bool()? {
                result.insert(i as u16);
            }
        }

        Ok(result)
    }

    /// Reads `num_entries` run-length encoded entries, each one being either a single id or an
    /// inclusive interval of ids.
    ///
    /// When `default_consent` is false, the entries are the members of the set. Otherwise the set
    /// starts out with every id in `0..=max` and the entries are removed from it.
    pub fn read_range_entries(
        &mut self,
        num_entries: u16,
        max: u16,
        default_consent: bool,
    ) -> Result<IdSet, TcfDecodeError> {
        let mut ids = if default_consent {
            let mut all = IdSet::with_max_id(max);
            all.insert_range(0..=max);
            all
        } else {
            IdSet::new()
        };

        for _ in 0..num_entries {
            let is_range = self.read_bool()?;
            let start = self.read_fixed_integer::<u16>(16)?;
            let end = if is_range {
                self.read_fixed_integer::<u16>(16)?
            } else {
                start
            };

            if default_consent {
                ids.remove_range(start..=end);
            } else {
                ids.insert_range(start..=end);
            }
        }

        Ok(ids)
    }

    /// Reads `n` publisher restriction entries.
    pub fn read_restriction_entries(
        &mut self,
        n: u16,
    ) -> Result<Vec<RestrictionEntry>, TcfDecodeError> {
        repeat_with(|| -> Result<RestrictionEntry, TcfDecodeError> {
            let purpose_id = self.read_fixed_integer(16)?;
            let restriction_type = self.read_fixed_integer(2)?;
            let num_entries = self.read_fixed_integer(12)?;
            Ok(RestrictionEntry {
                purpose_id,
                restriction_type,
                num_entries,
                vendor_ids: self.read_range_entries(num_entries, 0, false)?,
            })
        })
        .take(usize::from(n))
        .collect()
    }
}
