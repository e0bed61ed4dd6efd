use std::process::Command;

/// Output of `git <args>`, or "unknown" outside a checkout.
fn git(args: &[&str]) -> String {
    match Command::new("git").args(args).output() {
        Ok(output) if output.status.success() => String::from_utf8(output.stdout)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| "unknown".to_string()),
        _ => "unknown".to_string(),
    }
}

fn main() {
    // shown by `muddle --version` (long form)
    println!("cargo:rustc-env=GIT_HASH={}", git(&["rev-parse", "--short", "HEAD"]));
    println!("cargo:rustc-env=GIT_HASH_FULL={}", git(&["rev-parse", "HEAD"]));

    println!("cargo:rerun-if-changed=.git/HEAD");
}
