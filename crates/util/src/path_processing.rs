use std::path::PathBuf;

use dirs_next::home_dir;

/// Expand a leading `~` to the current user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let p = path.trim();
    if p == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_plain_paths_alone() {
        assert_eq!(expand_tilde(" /etc/ceprace.json "), PathBuf::from("/etc/ceprace.json"));
        assert_eq!(expand_tilde("relative/config.json"), PathBuf::from("relative/config.json"));
    }

    #[test]
    fn expands_home_prefix() {
        let Some(home) = home_dir() else { return };
        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde("~/ceprace/config.json"), home.join("ceprace/config.json"));
    }
}
