//! Build script - puts `memory.x` (nRF52840, no SoftDevice, settings
//! region carved off the end of flash) where cortex-m-rt's `link.x`
//! can find it.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));

    fs::copy("memory.x", out_dir.join("memory.x")).expect("memory.x missing from crate root");
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}
