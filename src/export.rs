//! Channel history export as JSON, plain text or CSV.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serenity::model::channel::Message;

pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, poise::ChoiceParameter)]
pub enum ExportFormat {
    #[name = "json"]
    Json,
    #[name = "txt"]
    Txt,
    #[name = "csv"]
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Txt => "txt",
            Self::Csv => "csv",
        }
    }

    pub fn render(self, meta: &ExportMeta, messages: &[ExportedMessage]) -> Result<String, serde_json::Error> {
        match self {
            Self::Json => to_json(meta, messages),
            Self::Txt => Ok(to_txt(meta, messages)),
            Self::Csv => Ok(to_csv(messages)),
        }
    }
}

/// Where and when an export was taken.
#[derive(Clone, Debug)]
pub struct ExportMeta {
    pub guild_id: u64,
    pub guild_name: String,
    pub channel_id: u64,
    pub channel_name: String,
    pub extracted_at: DateTime<Utc>,
    pub requested_limit: u32,
}

impl ExportMeta {
    pub fn file_name(&self, format: ExportFormat) -> String {
        format!(
            "messages_{}_{}_{}.{}",
            self.guild_id,
            self.channel_id,
            self.extracted_at.format("%Y%m%d_%H%M%S"),
            format.extension()
        )
    }
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ExportedAttachment {
    pub filename: String,
    pub url: String,
    pub size: u64,
    pub content_type: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ExportedReaction {
    pub emoji: String,
    pub count: u64,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ExportedReference {
    pub message_id: Option<String>,
    pub channel_id: String,
}

/// One message flattened for export. Ids are strings so JSON consumers
/// don't lose precision on snowflakes.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ExportedMessage {
    pub message_id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_display_name: String,
    pub author_bot: bool,
    pub content: String,
    pub timestamp: String,
    pub edited_timestamp: Option<String>,
    pub attachments: Vec<ExportedAttachment>,
    pub embeds: usize,
    pub reactions: Vec<ExportedReaction>,
    pub mentions: Vec<String>,
    pub role_mentions: Vec<String>,
    pub pinned: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub reference: Option<ExportedReference>,
}

impl From<&Message> for ExportedMessage {
    fn from(msg: &Message) -> Self {
        Self {
            message_id: msg.id.to_string(),
            author_id: msg.author.id.to_string(),
            author_name: msg.author.name.clone(),
            author_display_name: msg.author.display_name().to_string(),
            author_bot: msg.author.bot,
            content: msg.content.clone(),
            timestamp: msg.timestamp.to_string(),
            edited_timestamp: msg.edited_timestamp.map(|t| t.to_string()),
            attachments: msg
                .attachments
                .iter()
                .map(|a| ExportedAttachment {
                    filename: a.filename.clone(),
                    url: a.url.clone(),
                    size: u64::from(a.size),
                    content_type: a.content_type.clone(),
                })
                .collect(),
            embeds: msg.embeds.len(),
            reactions: msg
                .reactions
                .iter()
                .map(|r| ExportedReaction {
                    emoji: r.reaction_type.to_string(),
                    count: r.count,
                })
                .collect(),
            mentions: msg.mentions.iter().map(|u| u.id.to_string()).collect(),
            role_mentions: msg.mention_roles.iter().map(|r| r.to_string()).collect(),
            pinned: msg.pinned,
            kind: format!("{:?}", msg.kind),
            reference: msg.message_reference.as_ref().map(|r| ExportedReference {
                message_id: r.message_id.map(|id| id.to_string()),
                channel_id: r.channel_id.to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
struct JsonMetadata<'a> {
    server_id: String,
    server_name: &'a str,
    channel_id: String,
    channel_name: &'a str,
    extraction_time: String,
    requested_limit: u32,
    actual_count: usize,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    metadata: JsonMetadata<'a>,
    messages: &'a [ExportedMessage],
}

pub fn to_json(meta: &ExportMeta, messages: &[ExportedMessage]) -> Result<String, serde_json::Error> {
    let export = JsonExport {
        metadata: JsonMetadata {
            server_id: meta.guild_id.to_string(),
            server_name: &meta.guild_name,
            channel_id: meta.channel_id.to_string(),
            channel_name: &meta.channel_name,
            extraction_time: meta.extracted_at.to_rfc3339(),
            requested_limit: meta.requested_limit,
            actual_count: messages.len(),
        },
        messages,
    };
    serde_json::to_string_pretty(&export)
}

pub fn to_txt(meta: &ExportMeta, messages: &[ExportedMessage]) -> String {
    let rule = "=".repeat(80);
    let mut lines = vec![
        "Message Extraction Report".to_string(),
        rule.clone(),
        format!("Server: {} ({})", meta.guild_name, meta.guild_id),
        format!("Channel: {} ({})", meta.channel_name, meta.channel_id),
        format!(
            "Extraction Time: {}",
            meta.extracted_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        format!("Messages Extracted: {} / {}", messages.len(), meta.requested_limit),
        rule,
        String::new(),
    ];

    for msg in messages {
        lines.push(format!("[{}] {} ({})", msg.timestamp, msg.author_name, msg.author_id));
        if !msg.content.is_empty() {
            lines.push(format!("  {}", msg.content));
        }
        if !msg.attachments.is_empty() {
            lines.push(format!("  📎 Attachments: {}", msg.attachments.len()));
            for att in &msg.attachments {
                lines.push(format!("    - {} ({})", att.filename, att.url));
            }
        }
        if !msg.reactions.is_empty() {
            let reactions: Vec<String> = msg
                .reactions
                .iter()
                .map(|r| format!("{} ({})", r.emoji, r.count))
                .collect();
            lines.push(format!("  👍 Reactions: {}", reactions.join(", ")));
        }
        if let Some(reply_to) = msg.reference.as_ref().and_then(|r| r.message_id.as_deref()) {
            lines.push(format!("  ↩️ Reply to: {reply_to}"));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

const CSV_HEADER: [&str; 13] = [
    "Message ID",
    "Timestamp",
    "Author ID",
    "Author Name",
    "Author Display Name",
    "Is Bot",
    "Content",
    "Attachments Count",
    "Embeds Count",
    "Reactions Count",
    "Pinned",
    "Type",
    "Reply To",
];

/// Quotes a field when it holds a separator, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let fields: Vec<String> = fields.into_iter().map(|f| csv_field(f.as_ref())).collect();
    fields.join(",")
}

pub fn to_csv(messages: &[ExportedMessage]) -> String {
    let mut out = csv_row(CSV_HEADER);
    out.push_str("\r\n");

    for msg in messages {
        let reply_to = msg
            .reference
            .as_ref()
            .and_then(|r| r.message_id.clone())
            .unwrap_or_default();
        let row = csv_row([
            msg.message_id.clone(),
            msg.timestamp.clone(),
            msg.author_id.clone(),
            msg.author_name.clone(),
            msg.author_display_name.clone(),
            msg.author_bot.to_string(),
            msg.content.replace(['\r', '\n'], " "),
            msg.attachments.len().to_string(),
            msg.embeds.to_string(),
            msg.reactions.len().to_string(),
            msg.pinned.to_string(),
            msg.kind.clone(),
            reply_to,
        ]);
        out.push_str(&row);
        out.push_str("\r\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meta() -> ExportMeta {
        ExportMeta {
            guild_id: 10,
            guild_name: "Arena".to_string(),
            channel_id: 20,
            channel_name: "general".to_string(),
            extracted_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap(),
            requested_limit: 50,
        }
    }

    fn plain(id: u64, content: &str) -> ExportedMessage {
        ExportedMessage {
            message_id: id.to_string(),
            author_id: "7".to_string(),
            author_name: "alice".to_string(),
            author_display_name: "Alice".to_string(),
            content: content.to_string(),
            timestamp: "2024-03-01T12:00:00Z".to_string(),
            kind: "Regular".to_string(),
            ..Default::default()
        }
    }

    fn decorated() -> ExportedMessage {
        ExportedMessage {
            attachments: vec![ExportedAttachment {
                filename: "cat.png".to_string(),
                url: "https://cdn.example/cat.png".to_string(),
                size: 1024,
                content_type: Some("image/png".to_string()),
            }],
            reactions: vec![
                ExportedReaction {
                    emoji: "👍".to_string(),
                    count: 3,
                },
                ExportedReaction {
                    emoji: "🎉".to_string(),
                    count: 1,
                },
            ],
            reference: Some(ExportedReference {
                message_id: Some("41".to_string()),
                channel_id: "20".to_string(),
            }),
            ..plain(42, "look at this")
        }
    }

    #[test]
    fn test_json_has_metadata_and_messages() {
        let out = to_json(&meta(), &[plain(1, "hi"), decorated()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        let metadata = &value["metadata"];
        assert_eq!(metadata["server_id"], "10");
        assert_eq!(metadata["channel_name"], "general");
        assert_eq!(metadata["requested_limit"], 50);
        assert_eq!(metadata["actual_count"], 2);
        assert_eq!(metadata["extraction_time"], "2024-03-01T12:30:05+00:00");

        let messages = value["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["type"], "Regular");
        assert!(messages[0]["reference"].is_null());
        assert_eq!(messages[1]["attachments"][0]["size"], 1024);
        assert_eq!(messages[1]["reference"]["message_id"], "41");
    }

    #[test]
    fn test_txt_report_layout() {
        let out = to_txt(&meta(), &[plain(1, ""), decorated()]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Message Extraction Report");
        assert_eq!(lines[2], "Server: Arena (10)");
        assert_eq!(lines[4], "Extraction Time: 2024-03-01 12:30:05 UTC");
        assert_eq!(lines[5], "Messages Extracted: 2 / 50");

        // an empty message only gets its header line
        assert_eq!(lines[8], "[2024-03-01T12:00:00Z] alice (7)");
        assert_eq!(lines[9], "");

        assert!(out.contains("  look at this\n"));
        assert!(out.contains("  📎 Attachments: 1\n    - cat.png (https://cdn.example/cat.png)"));
        assert!(out.contains("  👍 Reactions: 👍 (3), 🎉 (1)"));
        assert!(out.contains("  ↩️ Reply to: 41"));
    }

    #[test]
    fn test_csv_quotes_and_flattens_content() {
        let tricky = plain(5, "hello, \"world\"\nsecond line");
        let out = to_csv(&[tricky, decorated()]);
        let rows: Vec<&str> = out.split("\r\n").collect();

        assert!(rows[0].starts_with("Message ID,Timestamp,Author ID"));
        assert_eq!(
            rows[1],
            "5,2024-03-01T12:00:00Z,7,alice,Alice,false,\"hello, \"\"world\"\" second line\",0,0,0,false,Regular,"
        );
        assert_eq!(
            rows[2],
            "42,2024-03-01T12:00:00Z,7,alice,Alice,false,look at this,1,0,2,false,Regular,41"
        );
        assert_eq!(rows[3], "");
    }

    #[test]
    fn test_file_name_carries_ids_and_time() {
        assert_eq!(
            meta().file_name(ExportFormat::Csv),
            "messages_10_20_20240301_123005.csv"
        );
    }
}
