//! Environment/runtime helpers
//!
//! Makes sure the instance directory holding a file-backed SQLite database
//! exists before the pool tries to open it.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Return the on-disk path of a SQLite URL, or `None` for in-memory and
/// non-SQLite URLs.
pub fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url.strip_prefix("sqlite:")?;
    let rest = rest.trim_start_matches("//");
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Create the parent directory of a file-backed SQLite database.
pub async fn ensure_instance_dir(database_url: &str) -> anyhow::Result<()> {
    let Some(file) = sqlite_file_path(database_url) else {
        debug!("database is not file-backed sqlite; nothing to prepare");
        return Ok(());
    };
    let dir = file.parent().unwrap_or_else(|| Path::new(""));
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    info!(dir = %dir.display(), "instance directory ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_paths_are_extracted() {
        assert_eq!(sqlite_file_path("sqlite://instance/blog.sqlite?mode=rwc"), Some(PathBuf::from("instance/blog.sqlite")));
        assert_eq!(sqlite_file_path("sqlite:blog.sqlite"), Some(PathBuf::from("blog.sqlite")));
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://u:p@localhost/blog"), None);
    }

    #[tokio::test]
    async fn non_sqlite_urls_are_a_no_op() {
        ensure_instance_dir("postgres://u:p@localhost/blog").await.unwrap();
    }
}
