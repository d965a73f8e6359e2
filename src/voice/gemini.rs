use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Speaker, Turn};

const API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

const SYSTEM_PROMPT: &str = "\
You are a friendly voice assistant in a Discord voice channel.
Your replies are read out loud, so keep them short and conversational:
one or two sentences, no markdown, no lists, no emoji.";

/// Replies longer than this are cut short before they reach the speaker.
const MAX_OUTPUT_TOKENS: u32 = 80;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
}

#[derive(Serialize)]
struct Request {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug, PartialEq)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize, Debug, PartialEq)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct Response {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

fn extract_text(response: Response) -> Result<Option<String>, GeminiError> {
    if let Some(err) = response.error {
        return Err(GeminiError::Api(err.message));
    }

    Ok(response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .and_then(|p| p.into_iter().next())
        .and_then(|p| p.text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty()))
}

/// Turns the conversation into Gemini contents. Consecutive turns of the
/// same role are merged and leading bot turns dropped, since the API wants
/// the conversation to open with the user.
fn contents(turns: &[Turn]) -> Vec<Content> {
    let mut contents: Vec<Content> = Vec::new();

    for turn in turns {
        let (role, text) = match &turn.speaker {
            Speaker::Bot => ("model", turn.text.clone()),
            Speaker::Member(name) => ("user", format!("[{name}] {}", turn.text)),
        };

        if let Some(last) = contents.last_mut() {
            if last.role == Some(role) {
                last.parts.push(Part { text });
                continue;
            }
        } else if role == "model" {
            continue;
        }

        contents.push(Content {
            role: Some(role),
            parts: vec![Part { text }],
        });
    }

    contents
}

/// Asks Gemini for a short spoken reply to the latest turns.
pub async fn reply(client: &reqwest::Client, api_key: &str, turns: &[Turn]) -> Result<String, GeminiError> {
    let contents = contents(turns);
    if contents.is_empty() {
        return Err(GeminiError::Api("no member message to answer".to_string()));
    }

    let request = Request {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: SYSTEM_PROMPT.to_string(),
            }],
        },
        contents,
        generation_config: GenerationConfig {
            max_output_tokens: MAX_OUTPUT_TOKENS,
        },
    };

    let response: Response = client
        .post(format!("{API_URL}?key={api_key}"))
        .json(&request)
        .send()
        .await?
        .json()
        .await?;

    extract_text(response)?.ok_or_else(|| GeminiError::Api("empty response".to_string()))
}
