use arena_bot::music::source;

#[tokio::test]
#[ignore] // Requires yt-dlp installed and network access
async fn test_resolve_url() {
    let result = source::resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await;
    assert!(result.is_ok(), "resolve failed: {:?}", result.err());
    let track = result.unwrap();
    assert!(!track.title.is_empty());
    assert!(track.uri.contains("youtube.com") || track.uri.contains("youtu.be"));
    assert!(track.length_secs.is_some());
}

#[tokio::test]
#[ignore] // Requires yt-dlp installed and network access
async fn test_resolve_search() {
    let result = source::resolve("never gonna give you up rick astley").await;
    assert!(result.is_ok(), "search failed: {:?}", result.err());
    let track = result.unwrap();
    assert!(!track.title.is_empty());
    assert!(track.author.is_some());
}
