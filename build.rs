//! Build script for the Lean runtime backend
//!
//! Without the `lean-runtime` feature nothing is compiled: the crate runs on
//! its in-process heap. With it, `lean_shim.c` is compiled against the
//! toolchain's `lean.h` and `leanshared` is linked.
//!
//! Sysroot lookup order: `LEAN_SYSROOT`, `LEAN_ROOT`, then
//! `$ELAN_HOME/toolchains/<toolchain>` with the toolchain read from the
//! first line of `lean-toolchain`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=lean_shim.c");
    println!("cargo:rerun-if-env-changed=LEAN_SYSROOT");
    println!("cargo:rerun-if-env-changed=LEAN_ROOT");
    println!("cargo:rerun-if-env-changed=ELAN_HOME");

    if env::var("CARGO_FEATURE_LEAN_RUNTIME").is_err() {
        return;
    }

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    println!(
        "cargo:rerun-if-changed={}",
        manifest_dir.join("lean-toolchain").display()
    );

    let sysroot = match lean_sysroot(&manifest_dir) {
        Some(root) => root,
        None => panic!(
            "Lean sysroot not found: set LEAN_SYSROOT or add a lean-toolchain file next to Cargo.toml"
        ),
    };
    if !sysroot.exists() {
        panic!("Lean sysroot not found at {}", sysroot.display());
    }

    let lib_dir = sysroot.join("lib").join("lean");
    println!("cargo:rustc-link-search=native={}", lib_dir.display());
    println!("cargo:rustc-link-lib=dylib=leanshared");
    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows" {
        println!("cargo:rustc-link-arg=-Wl,-rpath,{}", lib_dir.display());
    }

    cc::Build::new()
        .include(sysroot.join("include"))
        .flag_if_supported("-std=c11")
        .file(manifest_dir.join("lean_shim.c"))
        .compile("lithe_lean_shim");
}

/// First non-empty line of a `lean-toolchain` file
fn read_toolchain(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.lines().next().map(|l| l.trim().to_string()))
        .filter(|s| !s.is_empty())
}

/// `leanprover/lean4:v4.9.0` -> `leanprover--lean4---v4.9.0`
fn toolchain_dir_name(toolchain: &str) -> String {
    toolchain.replace('/', "--").replace(':', "---")
}

fn lean_sysroot(manifest_dir: &Path) -> Option<PathBuf> {
    if let Ok(root) = env::var("LEAN_SYSROOT") {
        return Some(PathBuf::from(root));
    }
    if let Ok(root) = env::var("LEAN_ROOT") {
        return Some(PathBuf::from(root));
    }

    let toolchain = read_toolchain(&manifest_dir.join("lean-toolchain"))?;
    let elan_home = env::var("ELAN_HOME")
        .ok()
        .or_else(|| env::var("HOME").ok().map(|h| format!("{}/.elan", h)))?;

    Some(
        PathBuf::from(elan_home)
            .join("toolchains")
            .join(toolchain_dir_name(&toolchain)),
    )
}
