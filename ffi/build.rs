use std::path::PathBuf;

fn main() {
    let crate_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let out = crate_dir.join("include").join("ses_ffi.h");

    println!("cargo:rerun-if-changed=src");
    if let Err(e) = std::fs::create_dir_all(crate_dir.join("include")) {
        println!("cargo:warning=cannot create include dir: {e}");
        return;
    }

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("SES_FFI_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(out);
        }
        Err(e) => println!("cargo:warning=cbindgen skipped: {e}"),
    }
}
