use std::process::Command;

fn git(args: &[&str]) -> String {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default()
}

fn main() {
    // Set only when HEAD is exactly a tagged release.
    let release = git(&["describe", "--tags", "--exact-match"]);
    println!("cargo:rustc-env=RELEASE_VERSION={release}");

    let latest = git(&["describe", "--tags", "--abbrev=0"]);
    println!("cargo:rustc-env=LATEST_TAG={latest}");

    let ahead = if latest.is_empty() {
        String::new()
    } else {
        git(&["rev-list", "--count", &format!("{latest}..HEAD")])
    };
    println!("cargo:rustc-env=COMMITS_AHEAD={ahead}");
}
