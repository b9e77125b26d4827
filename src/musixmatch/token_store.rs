use crate::musixmatch::session::Credential;
use anyhow::Context;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-backed credential cache, one JSON file per logical token name.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `musixmatch_token` and `musixmatch_token.json` name the same file.
    pub fn path_for(&self, name: &str) -> PathBuf {
        if name.ends_with(".json") {
            self.dir.join(name)
        } else {
            self.dir.join(format!("{name}.json"))
        }
    }

    /// Read a cached credential. A missing file is `Ok(None)`.
    pub async fn load(&self, name: &str) -> anyhow::Result<Option<Credential>> {
        let path = self.path_for(name);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };
        let cred = serde_json::from_str::<Credential>(&raw)
            .with_context(|| format!("parse {}", path.display()))?;
        Ok(Some(cred))
    }

    pub async fn save(&self, name: &str, cred: &Credential) -> anyhow::Result<()> {
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(cred).context("serialize token")?;
        tokio::fs::write(&path, raw)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        #[cfg(unix)]
        set_private(&path).await;
        Ok(())
    }
}

#[cfg(unix)]
async fn set_private(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    use tracing::warn;
    if let Err(e) = tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await {
        warn!("could not restrict permissions on {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for_appends_extension_once() {
        let store = TokenStore::new("/tmp/tokens");
        assert_eq!(store.path_for("musixmatch_token"), PathBuf::from("/tmp/tokens/musixmatch_token.json"));
        assert_eq!(store.path_for("musixmatch_token.json"), PathBuf::from("/tmp/tokens/musixmatch_token.json"));
    }

    #[tokio::test]
    async fn test_missing_file_is_none() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = TokenStore::new(dir.path());
        assert!(store.load("musixmatch_token").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_save_then_load() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = TokenStore::new(dir.path().join("nested"));
        let cred = Credential {
            value: "abc123".to_string(),
            expires_at: 1_700_000_055_000,
        };
        store.save("musixmatch_token", &cred).await?;
        assert_eq!(store.load("musixmatch_token.json").await?, Some(cred));

        let raw = std::fs::read_to_string(store.path_for("musixmatch_token"))?;
        let v: serde_json::Value = serde_json::from_str(&raw)?;
        assert_eq!(v["value"], "abc123");
        assert_eq!(v["expires"], 1_700_000_055_000u64);
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_private() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir()?;
        let store = TokenStore::new(dir.path());
        let cred = Credential {
            value: "abc123".to_string(),
            expires_at: 1,
        };
        store.save("musixmatch_token", &cred).await?;
        let mode = std::fs::metadata(store.path_for("musixmatch_token"))?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = TokenStore::new(dir.path());
        std::fs::write(store.path_for("broken"), "{not json")?;
        assert!(store.load("broken").await.is_err());
        Ok(())
    }
}
