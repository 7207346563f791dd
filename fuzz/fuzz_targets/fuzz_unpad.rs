#![no_main]
use ciphercore_crypto::modes::{Padding, PaddingCheck};
use ciphercore_types::PaddingMode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() || data.len() > 255 {
        return;
    }
    for mode in PaddingMode::ALL {
        for check in [PaddingCheck::Lenient, PaddingCheck::Strict] {
            let Ok(padding) = Padding::new(mode, data.len()) else {
                continue;
            };
            let mut block = data.to_vec();
            if let Ok(len) = padding.with_check(check).unpad(&mut block, true) {
                assert!(len <= data.len());
                assert_eq!(block.len(), len);
            }
        }
    }
});
