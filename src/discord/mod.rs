mod commands;

use std::sync::Arc;
use chrono::SecondsFormat;
pub use commands::*;

use crate::error::StickerError;
use crate::ingest::{AttachmentFetcher, UploadRequest};
use crate::sticker::Sticker;
use crate::store::{RegistryHandle, StickerRegistry};
use tracing::*;
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;

/// Discord's hard limit on message length
pub const MESSAGE_LIMIT: usize = 2000;

/// The parts of a chat message the router looks at
#[derive(Clone, Debug, Default)]
pub struct Incoming<'a> {
    pub content: &'a str,
    pub author: &'a str,
    /// URL and filename of the first attachment, if any
    pub attachment: Option<(&'a str, &'a str)>,
}

/// Maps chat commands onto registry operations and renders the replies
#[derive(Clone)]
pub struct StickerRouter {
    prefix: String,
    fetcher: Arc<dyn AttachmentFetcher>,
}

impl StickerRouter {
    pub fn new(prefix: impl Into<String>, fetcher: Arc<dyn AttachmentFetcher>) -> Self {
        StickerRouter {
            prefix: prefix.into(),
            fetcher,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Reply text for a message, `None` when it is not a command
    pub async fn respond(&self, registry: &StickerRegistry, msg: &Incoming<'_>) -> Option<String> {
        let command = parse_command(&self.prefix, msg.content)?;
        debug!("{} issued {:?}", msg.author, command);

        let reply = match command {
            Command::Sticker(None) | Command::Delete(None) => "Please provide a sticker name".to_string(),
            Command::Sticker(Some(name)) => match self.upload(registry, &name, msg).await {
                Some(reply) => reply,
                None => error_reply(registry.get(&name).await.map(|sticker| sticker.url)),
            },
            Command::Direct(name) => match self.upload(registry, &name, msg).await {
                Some(reply) => reply,
                None => match registry.get(&name).await {
                    Ok(sticker) => sticker.url,
                    Err(_) => format!(
                        "Sticker '{name}' not found. Use {}help to see available commands.",
                        self.prefix
                    ),
                },
            },
            Command::Add { name, url, tags } => {
                let sticker = Sticker::new(name.as_str(), url, msg.author).with_tags(tags);
                error_reply(registry.add(sticker).await.map(|_| format!("Successfully added sticker: {name}")))
            }
            Command::AddUsage => format!("Usage: {}add [name] [url] [tags...]", self.prefix),
            Command::Delete(Some(name)) => {
                error_reply(registry.delete(&name).await.map(|_| format!("Successfully deleted sticker: {name}")))
            }
            Command::List => list_reply(registry.list().await),
            Command::Help => help_text(&self.prefix),
            Command::Debug => debug_reply(registry).await,
            Command::Reload => error_reply(registry.reload().await.map(|(previous, current)| {
                format!("Stickers reloaded. Previous count: {previous}, New count: {current}")
            })),
        };
        Some(reply)
    }

    /// Ingests the message's attachment under `name`, if it has one
    async fn upload(&self, registry: &StickerRegistry, name: &str, msg: &Incoming<'_>) -> Option<String> {
        let (source_url, source_filename) = msg.attachment?;
        let request = UploadRequest {
            name,
            source_url,
            source_filename,
            added_by: msg.author,
        };
        Some(error_reply(
            registry
                .ingest(self.fetcher.as_ref(), request)
                .await
                .map(|_| format!("Successfully added sticker: {name}")),
        ))
    }
}

fn error_reply(result: Result<String, StickerError>) -> String {
    result.unwrap_or_else(|e| {
        warn!("command failed: {e}");
        format!("Error: {e}")
    })
}

fn list_reply(mut stickers: Vec<Sticker>) -> String {
    if stickers.is_empty() {
        return "No stickers available".to_string();
    }
    stickers.sort_by(|a, b| a.name.cmp(&b.name));

    let mut reply = String::from("Available stickers:\n");
    for sticker in stickers {
        reply.push_str(&format!("- {sticker}\n"));
    }
    reply
}

async fn debug_reply(registry: &StickerRegistry) -> String {
    let working_dir = std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|e| format!("unknown ({e})"));
    let file_status = match registry.file_status().await {
        Ok(Some(status)) => format!(
            "File exists, size: {} bytes, modified: {}",
            status.size,
            status
                .modified
                .map(|time| time.to_rfc3339_opts(SecondsFormat::Secs, false))
                .unwrap_or_else(|| "unknown".into())
        ),
        Ok(None) => "File not found".to_string(),
        Err(e) => format!("Error: {e}"),
    };

    let mut stickers = registry.list().await;
    stickers.sort_by(|a, b| a.name.cmp(&b.name));
    let sticker_list = if stickers.is_empty() {
        "None".to_string()
    } else {
        stickers
            .iter()
            .map(|s| format!("- {s} ({})\n", s.url))
            .collect()
    };

    format!(
        "Debug Information:\n\
         - Working Directory: {working_dir}\n\
         - Sticker File Path: {}\n\
         - File Status: {file_status}\n\
         - Stickers in Memory: {}\n\
         - Sticker List:\n{sticker_list}",
        registry.file_path().display(),
        stickers.len(),
    )
}

/// Splits a reply into messages that fit [`MESSAGE_LIMIT`], breaking on lines
pub fn split_reply(reply: &str, limit: usize) -> Vec<String> {
    let mut chunks = vec![];
    let mut current = String::new();
    for line in reply.split_inclusive('\n') {
        let mut line = line;
        while !line.is_empty() {
            if current.len() + line.len() <= limit {
                current.push_str(line);
                break;
            }
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                continue;
            }
            // A single line longer than the limit
            let mut cut = limit;
            while !line.is_char_boundary(cut) {
                cut -= 1;
            }
            if cut == 0 {
                cut = line.chars().next().map_or(line.len(), char::len_utf8);
            }
            chunks.push(line[..cut].to_string());
            line = &line[cut..];
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Serenity event handler routing messages to the sticker registry
pub struct Handler {
    router: StickerRouter,
}

impl Handler {
    pub fn new(router: StickerRouter) -> Self {
        Handler { router }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected, listening for {}", ready.user.name, self.router.prefix());
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || !msg.content.starts_with(self.router.prefix()) {
            return;
        }

        let registry = {
            let data = ctx.data.read().await;
            data.get::<RegistryHandle>().cloned()
        };
        let Some(registry) = registry else {
            error!("sticker registry missing from client data");
            return;
        };

        let incoming = Incoming {
            content: &msg.content,
            author: &msg.author.name,
            attachment: msg
                .attachments
                .first()
                .map(|a| (a.url.as_str(), a.filename.as_str())),
        };
        let Some(reply) = self.router.respond(&registry, &incoming).await else {
            return;
        };

        for chunk in split_reply(&reply, MESSAGE_LIMIT) {
            if let Err(why) = msg.channel_id.say(&ctx.http, chunk).await {
                error!("Error sending message: {why:?}");
                break;
            }
        }
    }
}
