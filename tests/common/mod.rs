use assert_json_diff::assert_json_eq;
use iab_tcf::ParsedConsent;
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Deserialize)]
pub struct TestCase {
    consent_string: String,
    expected: ParsedConsent,
}

impl TestCase {
    pub fn load_from_file<P: AsRef<Path>>(p: P) -> io::Result<Self> {
        let f = File::open(p)?;
        let tc: Self = serde_json::from_reader(&f)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;
        Ok(tc)
    }

    pub fn assert_json_matches(&self) {
        let consent = match ParsedConsent::parse_str(&self.consent_string) {
            Ok(c) => c,
            Err(e) => panic!("consent string decode error: {e}"),
        };

        assert_json_eq!(consent, self.expected);
    }

    pub fn assert_expected_matches(&self) {
        let consent = ParsedConsent::parse_str(&self.consent_string).expect("invalid consent string");

        assert_eq!(consent, self.expected);
    }
}
