//! Stamp the git revision into `ledgerlink --version`.
//! `LEDGERLINK_BUILD_SHA` set at build time takes precedence over git.

use std::path::Path;
use std::process::Command;

fn git_short_sha(repo: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    println!("cargo:rerun-if-env-changed=LEDGERLINK_BUILD_SHA");
    println!("cargo:rerun-if-changed=../.git/HEAD");

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let workspace = Path::new(&manifest_dir).join("..");

    let sha = std::env::var("LEDGERLINK_BUILD_SHA")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| git_short_sha(&workspace))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=LEDGERLINK_BUILD_SHA={}", sha);
}
