use std::env;
use std::path::PathBuf;

fn main() {
    let lib = pkg_config::Config::new()
        .print_system_libs(false)
        .probe("libfprint")
        .expect("libfprint not found by pkg-config");

    lib.include_paths.iter().for_each(|path| {
        println!("cargo:include={}", path.display());
    });

    let header = lib
        .include_paths
        .iter()
        .map(|include| include.join("fprint.h"))
        .find(|header| header.exists())
        .expect("fprint.h not found in libfprint include paths");

    let bindings = bindgen::Builder::default()
        .header(header.to_string_lossy())
        .clang_args(
            lib.include_paths
                .iter()
                .map(|path| format!("-I{}", path.display())),
        )
        .generate_comments(true)
        .ctypes_prefix("libc")
        .allowlist_function("fp_.*")
        .allowlist_type("fp_.*")
        .allowlist_var("FP_.*")
        .blocklist_type("max_align_t")
        .blocklist_type("__fsid_t")
        .generate()
        .expect("unable to generate libfprint bindings");

    let out = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo")).join("fprint.rs");
    bindings
        .write_to_file(out)
        .expect("unable to write libfprint bindings");
}
