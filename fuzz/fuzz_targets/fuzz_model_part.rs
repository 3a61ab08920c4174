#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = threemf::parse_model_part("3D/3dmodel.model", data);
});
