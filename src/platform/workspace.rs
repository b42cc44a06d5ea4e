// dataprofiler - platform/workspace.rs
//
// Per-run workspace directory resolution (spec §6, "Persisted layout
// (recommended, not bit-exact required): per-run directory containing
// the distinct store backing files, the final profile document, and
// the audit record"). Uses the `directories` crate for XDG/AppData/
// Library-compliant base paths, same as the platform layer's original
// config resolution.

use crate::util::constants;
use directories::ProjectDirs;
use std::path::PathBuf;

/// Resolved base data directory under which each run gets its own
/// subdirectory named by `run_id`.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths, falling back to the current
    /// directory if they cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_NAME) {
            let data_dir = proj_dirs.data_dir().to_path_buf();
            tracing::debug!(data = %data_dir.display(), "platform data directory resolved");
            Self { data_dir }
        } else {
            tracing::warn!("could not determine platform data directory, using current directory");
            Self {
                data_dir: PathBuf::from("."),
            }
        }
    }

    /// Directory for a single run's artifacts: distinct-store backing
    /// files, the profile document, and the audit record. Created if
    /// it does not already exist.
    pub fn run_dir(&self, run_id: &str) -> std::io::Result<PathBuf> {
        let dir = self.data_dir.join("runs").join(run_id);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn distinct_store_path(&self, run_id: &str) -> std::io::Result<PathBuf> {
        Ok(self.run_dir(run_id)?.join("distinct.sqlite3"))
    }

    pub fn profile_path(&self, run_id: &str) -> std::io::Result<PathBuf> {
        Ok(self.run_dir(run_id)?.join("profile.json"))
    }

    pub fn audit_path(&self, run_id: &str) -> std::io::Result<PathBuf> {
        Ok(self.run_dir(run_id)?.join("audit.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_dir_is_created_under_data_dir() {
        let temp = tempfile::tempdir().unwrap();
        let paths = PlatformPaths {
            data_dir: temp.path().to_path_buf(),
        };
        let dir = paths.run_dir("abc123").unwrap();
        assert!(dir.exists());
        assert_eq!(dir, temp.path().join("runs").join("abc123"));
    }

    #[test]
    fn artifact_paths_are_nested_under_run_dir() {
        let temp = tempfile::tempdir().unwrap();
        let paths = PlatformPaths {
            data_dir: temp.path().to_path_buf(),
        };
        let distinct = paths.distinct_store_path("r1").unwrap();
        let profile = paths.profile_path("r1").unwrap();
        let audit = paths.audit_path("r1").unwrap();
        assert_eq!(distinct.file_name().unwrap(), "distinct.sqlite3");
        assert_eq!(profile.file_name().unwrap(), "profile.json");
        assert_eq!(audit.file_name().unwrap(), "audit.json");
    }
}
