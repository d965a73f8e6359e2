//! Text to speech through Google Translate's speech endpoint, streamed into
//! songbird like any other HTTP source.

use std::sync::Arc;

use songbird::input::HttpRequest;
use songbird::Call;
use tokio::sync::Mutex;
use tracing::warn;

const TTS_URL: &str = "https://translate.google.com/translate_tts";

/// The endpoint refuses longer texts.
pub const MAX_CHUNK_CHARS: usize = 200;

/// Splits `text` at whitespace into pieces the endpoint accepts. A single
/// word longer than the limit is cut by characters.
pub fn chunks(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > MAX_CHUNK_CHARS {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            out.push(word.drain(..MAX_CHUNK_CHARS).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > MAX_CHUNK_CHARS {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        out.push(current);
    }
    out
}

pub fn speech_url(text: &str, lang: &str) -> Option<String> {
    let params = [("ie", "UTF-8"), ("client", "tw-ob"), ("tl", lang), ("q", text)];
    reqwest::Url::parse_with_params(TTS_URL, &params)
        .ok()
        .map(|url| url.to_string())
}

/// Replaces whatever the call is saying with `text`. Returns how many
/// clips were queued.
pub async fn speak(
    call: &Arc<Mutex<Call>>,
    client: &reqwest::Client,
    lang: &str,
    text: &str,
) -> usize {
    let mut handler = call.lock().await;
    handler.queue().stop();

    let mut queued = 0;
    for chunk in chunks(text) {
        let Some(url) = speech_url(&chunk, lang) else {
            warn!("could not build a speech url for {chunk:?}");
            continue;
        };
        let input = HttpRequest::new(client.clone(), url);
        handler.enqueue_input(input.into()).await;
        queued += 1;
    }
    queued
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(chunks("  hello   there  "), ["hello there"]);
        assert!(chunks("   ").is_empty());
    }

    #[test]
    fn test_chunks_split_on_words_under_the_limit() {
        let word = "abcdefghi"; // 9 chars, 10 with the space
        let text = vec![word; 45].join(" ");
        let pieces = chunks(&text);

        assert_eq!(pieces.len(), 3);
        assert!(pieces.iter().all(|p| p.chars().count() <= MAX_CHUNK_CHARS));
        assert_eq!(pieces.join(" "), text);
    }

    #[test]
    fn test_overlong_word_is_cut() {
        let long = "é".repeat(450);
        let pieces = chunks(&format!("hi {long} bye"));

        assert_eq!(pieces[0], "hi");
        assert_eq!(pieces[1].chars().count(), MAX_CHUNK_CHARS);
        assert_eq!(pieces[2].chars().count(), MAX_CHUNK_CHARS);
        assert_eq!(pieces[3], format!("{} bye", "é".repeat(50)));
    }

    #[test]
    fn test_speech_url_encodes_query() {
        let url = speech_url("what's up?", "en").unwrap();
        assert!(url.starts_with("https://translate.google.com/translate_tts?"));
        assert!(url.contains("tl=en"));
        assert!(url.contains("q=what%27s+up%3F"));
    }
}
