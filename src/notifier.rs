use reqwest::Client;
use tracing::error;
use url::Url;

pub mod embed;
pub use embed::WebhookMessage;

/// Sends finished notifications to Discord.
pub struct Notifier {
    http: Client,
}

impl Notifier {
    pub fn new() -> Self {
        Notifier {
            http: Client::new(),
        }
    }

    /// Posts the same message to every hook, in order, one at a time. A hook
    /// that can't be reached is logged and skipped; the remaining ones are
    /// still attempted, and the caller never learns about the failure.
    pub async fn broadcast(&self, hooks: &[Url], message: &WebhookMessage) {
        for hook in hooks {
            if let Err(err) = self.deliver(hook, message).await {
                error!("failed to deliver notification to {}: {:#}", hook, err);
            }
        }
    }

    async fn deliver(&self, hook: &Url, message: &WebhookMessage) -> anyhow::Result<()> {
        self.http
            .post(hook.clone())
            .json(message)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    use super::*;
    use crate::webhooks::github::events::{Commit, Owner, Repository, Sender, ValidPush};

    /// Accepts a single request, answers 204 and hands back the body.
    fn capture_one_request(listener: TcpListener) -> mpsc::Receiver<String> {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end().to_ascii_lowercase();
                if line.is_empty() {
                    break;
                }
                if let Some(value) = line.strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
            }
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();
            reader
                .get_mut()
                .write_all(b"HTTP/1.1 204 No Content\r\ncontent-length: 0\r\n\r\n")
                .unwrap();
            sender.send(String::from_utf8(body).unwrap()).unwrap();
        });
        receiver
    }

    fn hook(listener: &TcpListener) -> Url {
        let port = listener.local_addr().unwrap().port();
        Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap()
    }

    #[rocket::async_test]
    async fn broadcast_keeps_going_past_a_dead_destination() {
        let first = TcpListener::bind("127.0.0.1:0").unwrap();
        let second = TcpListener::bind("127.0.0.1:0").unwrap();
        let hooks = vec![
            hook(&first),
            // nothing listens on the reserved port, this delivery fails
            Url::parse("http://127.0.0.1:1/").unwrap(),
            hook(&second),
        ];
        let first = capture_one_request(first);
        let second = capture_one_request(second);

        let repository = Repository {
            name: "teamproj".to_owned(),
            owner: Some(Owner {
                name: Some("octocat".to_owned()),
            }),
        };
        let sender = Sender {
            id: Some(1),
            login: "octocat".to_owned(),
            avatar_url: "a".to_owned(),
            html_url: "b".to_owned(),
        };
        let commits = vec![Commit {
            id: "abcdef123456".to_owned(),
            url: "u".to_owned(),
            message: "fix bug".to_owned(),
            committer: None,
        }];
        let push = ValidPush {
            repository: &repository,
            sender: &sender,
            commits: &commits,
            r#ref: "refs/heads/main",
            compare: "c",
        };
        let message = WebhookMessage::from_push(&push);

        Notifier::new().broadcast(&hooks, &message).await;

        let first = first.recv().unwrap();
        let second = second.recv().unwrap();
        assert_eq!(first, second);

        let body: serde_json::Value = serde_json::from_str(&first).unwrap();
        assert_eq!(body["username"], "GitHub");
        assert_eq!(
            body["embeds"][0]["title"],
            "1 new commit, presented by octocat"
        );
    }
}
