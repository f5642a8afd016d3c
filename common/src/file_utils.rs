use std::io;
use std::path::{Path, PathBuf};

use crate::config::OutputFormat;
use crate::types::Topic;

/// Output file name for a deck about `topic`.
pub fn output_filename(topic: &Topic, format: OutputFormat) -> String {
    let slug = create_slug(topic.as_str());
    let slug = if slug.is_empty() { "deck".to_string() } else { slug };
    format!("presentation-{slug}.{}", format.extension())
}

/// Create a URL-friendly slug from a title
pub fn create_slug(title: &str) -> String {
    title
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(50)
        .collect::<String>()
        .trim_end_matches('-')
        .to_string()
}

/// Write the finished document into `dir`, creating the directory if needed.
pub async fn save_document<P: AsRef<Path>>(
    dir: P,
    filename: &str,
    bytes: &[u8],
) -> io::Result<PathBuf> {
    let dir = dir.as_ref();
    if !dir.exists() {
        tokio::fs::create_dir_all(dir).await?;
    }

    let file_path = dir.join(filename);
    tokio::fs::write(&file_path, bytes).await?;

    Ok(file_path)
}
