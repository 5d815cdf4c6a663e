use git_version::git_version;

// include -modified if the working tree has uncommitted changes
const COMMIT: &str = git_version!(
    args = ["--abbrev=10", "--always", "--dirty=-modified"],
    fallback = "unknown"
);

fn describe_version() -> String {
    let release = option_env!("RELEASE_VERSION").unwrap_or("");
    let latest = option_env!("LATEST_TAG").unwrap_or("");
    let ahead = option_env!("COMMITS_AHEAD").unwrap_or("");
    if !release.is_empty() {
        format!("release {release}")
    } else if !latest.is_empty() && !ahead.is_empty() {
        format!("development, {ahead} commits ahead of {latest}")
    } else if !latest.is_empty() {
        format!("development, ahead of {latest}")
    } else {
        format!("development {}", env!("CARGO_PKG_VERSION"))
    }
}

/// One-line-per-fact build description shown in the page footer and at
/// `/api/info`.
pub fn get_system_info() -> String {
    let profile = if cfg!(debug_assertions) {
        "Dev"
    } else {
        "Release"
    };
    format!(
        "{} - {}\nCommit: {}\n{} build",
        env!("CARGO_PKG_NAME"),
        describe_version(),
        COMMIT,
        profile
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_info_mentions_commit_and_profile() {
        let info = get_system_info();
        assert!(info.starts_with("glucoplan - "));
        assert!(info.contains(COMMIT));
        assert!(info.contains("Dev build") || info.contains("Release build"));
        assert!(info.contains("release") || info.contains("development"));
    }
}
