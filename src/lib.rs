//! This crate decodes IAB Transparency and Consent Framework (TCF) consent strings, as found in
//! the `euconsent` cookies set by Consent Management Platforms.
//!
//! Both TCF v1.1 and TCF v2.0 strings are supported, including the optional trailing segments of
//! v2.0 strings (disclosed vendors, allowed vendors and publisher TC).
//!
//! NOTE: This is not an official IAB library.
//!
//! # Parsing consent strings
//!
//! The [`ParsedConsent`] type is used to parse consent strings. The version of the string is
//! detected from its first character.
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use iab_tcf::ParsedConsent;
//!
//! let s = "COvVNSUOvVNSUKyACDENAPCEANAAABwAAAIgBAwAgAVQCAAIEAgYAQAQoBAAECAA.QD5QAoBAAECAfIA";
//! let consent = ParsedConsent::parse_str(s)?;
//!
//! match &consent {
//!     ParsedConsent::V1(c) => println!("v1.1 string created by CMP {}", c.cmp_id),
//!     ParsedConsent::V2(c) => println!("v2.0 string, publisher country {}", c.publisher_cc),
//!     _ => {}
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Checking consent
//!
//! The fields shared by every version are available directly on [`ParsedConsent`], along with
//! a couple of helpers to check whether purposes and vendors are allowed.
//!
//! The following example checks that vendor 42 is allowed to store and access information on a
//! device (purpose 1) and to create a personalised ads profile (purpose 2).
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use iab_tcf::ParsedConsent;
//!
//! let s = "COvVNSUOvVNSUKyACDENAPCEANAAABwAAAIgBAwAgAVQCAAIEAgYAQAQoBAAECAA";
//! let consent: ParsedConsent = s.parse()?;
//!
//! assert!(consent.every_purpose_allowed(&[1, 2]));
//! assert!(consent.vendor_allowed(42));
//! # Ok(())
//! # }
//! ```
//!
//! # Error handling
//!
//! A consent string whose core segment cannot be fully decoded is considered as an error,
//! in order to avoid obtaining erroneous user consent information from a corrupted payload.
//!
//! Trailing segments of v2.0 strings are optional: one which fails to decode is skipped with a
//! warning emitted through [`tracing`](https://docs.rs/tracing), and the rest of the string is
//! still returned.
//!
pub mod consent;
pub mod core;
mod error;
pub mod segments;

pub use crate::consent::{DecodeOptions, ParsedConsent};
pub use crate::core::IdSet;
pub use crate::error::TcfDecodeError;

/// Parses a consent string with the default [`DecodeOptions`].
///
/// This is a shortcut for [`ParsedConsent::parse_str`].
///
/// # Errors
///
/// Returns a [`TcfDecodeError`] if the string cannot be decoded.
pub fn parse(s: &str) -> Result<ParsedConsent, TcfDecodeError> {
    ParsedConsent::parse_str(s)
}
