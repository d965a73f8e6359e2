use serde::Deserialize;
use tokio::process::Command;

use super::Track;

#[derive(Deserialize)]
struct YtDlpOutput {
    title: Option<String>,
    uploader: Option<String>,
    channel: Option<String>,
    duration: Option<f64>,
    webpage_url: Option<String>,
    original_url: Option<String>,
}

impl YtDlpOutput {
    fn into_track(self, query: &str) -> Track {
        Track {
            title: self.title.unwrap_or_else(|| "Unknown title".to_string()),
            author: self.uploader.or(self.channel),
            uri: self
                .webpage_url
                .or(self.original_url)
                .unwrap_or_else(|| query.to_string()),
            length_secs: self.duration.filter(|d| *d >= 0.0).map(|d| d as u64),
            requester_id: None,
            requester_name: String::new(),
        }
    }
}

fn is_url(query: &str) -> bool {
    query.starts_with("http://") || query.starts_with("https://")
}

/// Resolves a URL or free-text search into track metadata via yt-dlp.
pub async fn resolve(query: &str) -> Result<Track, Box<dyn std::error::Error + Send + Sync>> {
    let search_query = if is_url(query) {
        query.to_string()
    } else {
        format!("ytsearch1:{query}")
    };

    let output = Command::new("yt-dlp")
        .args([
            "-j",
            "-f",
            "bestaudio",
            "--no-playlist",
            "--no-warnings",
            &search_query,
        ])
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("yt-dlp failed: {}", stderr.trim()).into());
    }

    let info: YtDlpOutput = serde_json::from_slice(&output.stdout)?;
    Ok(info.into_track(query))
}
