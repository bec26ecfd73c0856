use std::fmt::Write;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::webhooks::github::events::{Commit, ValidPush};

/// https://discord.com/branding
const EMBED_COLOR: u32 = 0x5865F2;

/// Identity the relay posts under, fixed no matter where the push came from.
const WEBHOOK_USERNAME: &str = "GitHub";
const WEBHOOK_AVATAR: &str =
    "https://cdn.discordapp.com/avatars/1037833960673259581/df91181b3f1cf0ef1592fbe18e0962d7.png?size=128";

const COMMIT_MESSAGE_LIMIT: usize = 75;
const COMMIT_LIST_LIMIT: usize = 15;

/// Body of a Discord webhook execution, see
/// https://discord.com/developers/docs/resources/webhook#execute-webhook
#[derive(Debug, Serialize)]
pub struct WebhookMessage {
    username: &'static str,
    avatar_url: &'static str,
    embeds: [Embed; 1],
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    color: u32,
    url: String,
    timestamp: String,
    author: Author,
    fields: Vec<Field>,
}

#[derive(Debug, Serialize)]
struct Author {
    name: String,
    icon_url: String,
    url: String,
}

#[derive(Debug, Serialize)]
struct Field {
    name: String,
    value: String,
}

impl WebhookMessage {
    /// Builds the notification for a validated push. Deterministic apart
    /// from the timestamp; the same message is reused for every destination.
    pub fn from_push(push: &ValidPush) -> Self {
        // the title counts every commit, the list below only shows the first
        // COMMIT_LIST_LIMIT of them
        let total = push.commits.len();
        let noun = if total <= 1 { "commit" } else { "commits" };

        let lines = push
            .commits
            .iter()
            .take(COMMIT_LIST_LIMIT)
            .map(commit_line)
            .collect::<Vec<_>>();

        let embed = Embed {
            title: format!("{} new {}, presented by {}", total, noun, push.sender.login),
            color: EMBED_COLOR,
            url: push.compare.to_owned(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            author: Author {
                name: push.sender.login.clone(),
                icon_url: push.sender.avatar_url.clone(),
                url: push.sender.html_url.clone(),
            },
            fields: vec![
                Field {
                    name: "Repository/Branches".to_owned(),
                    value: format!("{}/{}", push.repository.name, branch(push.r#ref)),
                },
                Field {
                    name: format!("Commits [{}]", total),
                    value: lines.join("\n"),
                },
            ],
        };

        WebhookMessage {
            username: WEBHOOK_USERNAME,
            avatar_url: WEBHOOK_AVATAR,
            embeds: [embed],
        }
    }
}

fn commit_line(commit: &Commit) -> String {
    let id = commit.id.chars().take(6).collect::<String>();
    let mut line = format!(
        "- [`{}`]({}) {}",
        id,
        commit.url,
        shorten(&commit.message, COMMIT_MESSAGE_LIMIT)
    );
    if let Some(username) = commit
        .committer
        .as_ref()
        .and_then(|committer| committer.username.as_deref())
    {
        write!(line, " - {}", username).unwrap();
    }
    line
}

/// Branch part of a ref like `refs/heads/main`. A ref with no separator, or
/// one ending in a separator, is kept as is.
fn branch(r#ref: &str) -> &str {
    match r#ref.split('/').last() {
        Some(last) if !last.is_empty() => last,
        _ => r#ref,
    }
}

fn shorten(message: &str, limit: usize) -> String {
    if message.chars().count() <= limit {
        message.to_owned()
    } else {
        message.chars().take(limit).collect::<String>() + "..."
    }
}
