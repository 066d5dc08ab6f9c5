#![no_main]
use libfuzzer_sys::fuzz_target;
use graphcodec::fuzz::roundtrip::*;

fuzz_target!(|data: FuzzCase| harness(data));
