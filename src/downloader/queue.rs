// Persisted URL queue: one URL per line, `#` comments and blank lines ignored

use std::path::{Path, PathBuf};

use tokio::fs;

use super::errors::QueueError;

/// True for lines that are never submitted for download
pub fn is_comment_or_blank(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Non-comment, non-blank lines of `text`, trimmed, in file order
pub fn parse_entries(text: &str) -> Vec<String> {
    text.lines()
        .filter(|l| !is_comment_or_blank(l))
        .map(|l| l.trim().to_string())
        .collect()
}

#[derive(Debug, Clone)]
pub struct UrlQueue {
    path: PathBuf,
    entries: Vec<String>,
}

impl UrlQueue {
    /// Read the queue file once. A missing file is an error; an empty one is not.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, QueueError> {
        let path = path.as_ref().to_path_buf();
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(QueueError::Missing(path));
            }
            Err(source) => return Err(QueueError::Io { path, source }),
        };

        Ok(Self {
            entries: parse_entries(&text),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries still present in the file right now
    pub async fn pending(&self) -> Result<Vec<String>, QueueError> {
        let text = fs::read_to_string(&self.path)
            .await
            .map_err(|source| QueueError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(parse_entries(&text))
    }

    /// Wipe the file, comments included
    pub async fn clear(&self) -> Result<(), QueueError> {
        fs::write(&self.path, "")
            .await
            .map_err(|source| QueueError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URLS: [&str; 3] = [
        "https://www.youtube.com/watch?v=a",
        "https://www.youtube.com/watch?v=b",
        "https://youtu.be/c",
    ];

    #[test]
    fn test_comments_and_blanks_are_skipped_anywhere() {
        let layouts = [
            format!("# head\n\n{}\n{}\n{}\n", URLS[0], URLS[1], URLS[2]),
            format!("{}\n# mid\n\n{}\n   \n{}", URLS[0], URLS[1], URLS[2]),
            format!("{}\n{}\n{}\n\n#tail\n", URLS[0], URLS[1], URLS[2]),
            format!("\r\n  {}  \r\n#x\r\n{}\r\n\r\n{}\r\n", URLS[0], URLS[1], URLS[2]),
        ];
        for text in layouts {
            assert_eq!(parse_entries(&text), URLS.to_vec(), "layout: {:?}", text);
        }
    }

    #[tokio::test]
    async fn test_load_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        std::fs::write(&path, format!("# queue\n{}\n\n{}\n", URLS[0], URLS[1])).unwrap();

        let queue = UrlQueue::load(&path).await.unwrap();
        assert_eq!(queue.entries(), &URLS[..2]);
        assert_eq!(queue.pending().await.unwrap().len(), 2);

        queue.clear().await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = UrlQueue::load(dir.path().join("nope.txt")).await.unwrap_err();
        assert!(matches!(err, QueueError::Missing(_)));
    }

    #[tokio::test]
    async fn test_only_comments_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        std::fs::write(&path, "# nothing\n\n").unwrap();
        assert!(UrlQueue::load(&path).await.unwrap().is_empty());
    }
}
