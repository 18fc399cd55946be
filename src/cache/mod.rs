//! Content-addressable disk cache for normalized logos
//!
//! One file per channel at `<output_dir>/<number>_<code>.png`. Presence of
//! the file is the idempotency signal: the orchestrator skips all resolution
//! work for cached entries. Writes go through a temp file and a rename so a
//! reader never observes a partial file.

use std::io::Write;
use std::path::PathBuf;
use tokio::fs;

#[derive(Clone)]
pub struct LogoCache {
    output_dir: PathBuf,
}

impl LogoCache {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    pub async fn ensure_dir(&self) -> Result<(), std::io::Error> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir).await?;
        }
        Ok(())
    }

    /// Deterministic on-disk location for a channel, the cache key.
    pub fn canonical_path(&self, number: u32, code: &str) -> PathBuf {
        self.output_dir.join(format!("{number}_{code}.png"))
    }

    pub fn exists(&self, number: u32, code: &str) -> bool {
        self.canonical_path(number, code).exists()
    }

    /// Atomically persist the finished PNG at the canonical path.
    pub async fn write(
        &self,
        number: u32,
        code: &str,
        bytes: Vec<u8>,
    ) -> Result<PathBuf, std::io::Error> {
        let path = self.canonical_path(number, code);
        let dir = self.output_dir.clone();
        let final_path = path.clone();

        tokio::task::spawn_blocking(move || -> Result<(), std::io::Error> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&final_path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_path_is_number_underscore_code() {
        let cache = LogoCache::new(PathBuf::from("/tmp/logos"));
        assert_eq!(
            cache.canonical_path(7, "ESPN"),
            PathBuf::from("/tmp/logos/7_ESPN.png")
        );
    }

    #[tokio::test]
    async fn write_then_exists_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LogoCache::new(dir.path().to_path_buf());
        cache.ensure_dir().await.unwrap();

        assert!(!cache.exists(3, "HBO"));
        let path = cache.write(3, "HBO", vec![1, 2, 3]).await.unwrap();
        assert!(cache.exists(3, "HBO"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), vec![1, 2, 3]);

        // no temp residue left behind
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name());
        }
        assert_eq!(names.len(), 1);
    }
}
