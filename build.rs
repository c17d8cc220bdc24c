use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed=GIT_VERSION");

    println!("cargo:rustc-env=GIT_VERSION={}", build_version());
}

/// Version string for `/health`: an explicit `GIT_VERSION` from CI wins,
/// then `git describe`, then the crate version.
fn build_version() -> String {
    env::var("GIT_VERSION")
        .ok()
        .filter(|version| !version.trim().is_empty())
        .or_else(describe_head)
        .unwrap_or_else(|| format!("v{}", env!("CARGO_PKG_VERSION")))
}

fn describe_head() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!described.is_empty()).then_some(described)
}
