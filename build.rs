use std::process::Command;

fn main() {
    // Builds without a checkout (e.g. container images) pass the hash in.
    if let Ok(hash) = std::env::var("SMUGGLER_GIT_HASH") {
        println!("cargo:rustc-env=GIT_HASH={}", hash.trim());
        println!("cargo:rerun-if-env-changed=SMUGGLER_GIT_HASH");
        return;
    }

    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok();

    let git_hash = output
        .and_then(|o| {
            if o.status.success() {
                String::from_utf8(o.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);

    println!("cargo:rerun-if-env-changed=SMUGGLER_GIT_HASH");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
}
