#![no_main]

use billing_convert::convert::Converter;
use billing_convert::core::Regime;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    // Anything that parses must convert or fail cleanly, for either regime.
    for regime in [Regime::de(), Regime::es()] {
        let _ = Converter::new(regime).convert_json(s);
    }
});
