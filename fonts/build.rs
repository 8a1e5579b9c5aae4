use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    // Output font path; always present so the library can include_bytes! it.
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let target_font = out_dir.join("embedded-font.bin");

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=BAG_FONT_FILE");

    // Optional embedded font: BAG_FONT_FILE=/path/to/font.ttf
    if let Ok(path) = env::var("BAG_FONT_FILE") {
        let src = PathBuf::from(&path);
        println!("cargo:rerun-if-changed={}", src.display());
        match fs::copy(&src, &target_font) {
            Ok(_) => return,
            Err(e) => println!("cargo:warning=failed to copy BAG_FONT_FILE {path}: {e}"),
        }
    }

    // No embedded font: runtime font sources only.
    fs::write(&target_font, b"").expect("write empty font placeholder");
}
