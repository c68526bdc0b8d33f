#![cfg(feature = "serde")]

mod common;

include!(concat!(env!("OUT_DIR"), "/decode_tests.rs"));
