use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    response::{status::Custom, Redirect},
    serde::json::Json,
    uri, Request, State,
};
use tracing::{debug, info};
use url::Url;

use crate::{
    config::RelayConfig,
    notifier::{Notifier, WebhookMessage},
};

pub mod events;
use events::{GitHubPayload, ValidPush};

const X_GITHUB_EVENT: &str = "X-GitHub-Event";

/// The `X-GitHub-Event` header, if any. Never refuses the request: the
/// header is checked inside [`screen`] so that rejections fire in the
/// documented order.
pub struct GitHubEventType(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GitHubEventType {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let event_type = request
            .headers()
            .get_one(X_GITHUB_EVENT)
            .map(str::to_owned);
        Outcome::Success(GitHubEventType(event_type))
    }
}

/// Outcome of screening one delivery.
#[derive(Debug)]
pub enum Screened<'a> {
    /// GitHub's webhook-registration handshake, acknowledged without fanout.
    Ping,
    Push {
        push: ValidPush<'a>,
        hooks: &'a [Url],
    },
}

#[derive(Debug)]
pub struct Rejection {
    pub status: Status,
    pub reason: String,
}

impl Rejection {
    fn forbidden(reason: impl Into<String>) -> Self {
        Rejection {
            status: Status::Forbidden,
            reason: reason.into(),
        }
    }
}

/// Runs the guard checks in order and stops at the first failing one; later
/// checks never mask an earlier rejection.
pub fn screen<'a>(
    config: &'a RelayConfig,
    mortem: &str,
    event_type: Option<&str>,
    payload: &'a GitHubPayload,
) -> Result<Screened<'a>, Rejection> {
    if mortem.is_empty() {
        return Err(Rejection {
            status: Status::BadRequest,
            reason: "invalid mortem.".to_owned(),
        });
    }

    let hooks = match config.destinations(mortem) {
        Some(hooks) => hooks,
        None => {
            return Err(Rejection::forbidden(format!(
                "[{}] is not a whitelisted mortem.",
                mortem
            )))
        }
    };

    let event_type = match event_type.filter(|event| !event.is_empty()) {
        Some(event) => event,
        None => return Err(Rejection::forbidden("no github event presented.")),
    };

    // GitHub pings right after the webhook is registered
    if event_type == "ping" {
        return Ok(Screened::Ping);
    }

    if event_type != "push" {
        return Err(Rejection::forbidden(
            "only expect \"push\" from github event.",
        ));
    }

    let repository = payload
        .repository
        .as_ref()
        .filter(|repository| repository.owner.is_some())
        .ok_or_else(|| Rejection::forbidden("invalid repository owner."))?;

    let owner = repository
        .owner
        .as_ref()
        .and_then(|owner| owner.name.as_deref());
    if !config
        .owners
        .iter()
        .any(|allowed| Some(allowed.as_str()) == owner)
    {
        return Err(Rejection::forbidden("mismatched github repository owner."));
    }

    let sender = payload
        .sender
        .as_ref()
        .filter(|sender| sender.id.is_some())
        .ok_or_else(|| Rejection::forbidden("no sender presented."))?;

    if payload.commits.is_empty() {
        return Err(Rejection::forbidden("no commits presented."));
    }

    Ok(Screened::Push {
        push: ValidPush {
            repository,
            sender,
            commits: &payload.commits,
            r#ref: &payload.r#ref,
            compare: &payload.compare,
        },
        hooks,
    })
}

#[rocket::post("/<mortem>", data = "<payload>")]
pub async fn github_webhook(
    mortem: &str,
    event_type: GitHubEventType,
    payload: Json<GitHubPayload>,
    config: &State<RelayConfig>,
    notifier: &State<Notifier>,
) -> Custom<String> {
    match screen(config, mortem, event_type.0.as_deref(), &payload) {
        Ok(Screened::Ping) => Custom(Status::Ok, String::new()),
        Ok(Screened::Push { push, hooks }) => {
            info!(
                "relaying {} commit(s) to {} destination(s) for [{}]",
                push.commits.len(),
                hooks.len(),
                mortem
            );
            let message = WebhookMessage::from_push(&push);
            notifier.broadcast(hooks, &message).await;
            Custom(Status::NoContent, String::new())
        }
        Err(rejection) => {
            debug!("refused delivery for [{}]: {}", mortem, rejection.reason);
            Custom(rejection.status, rejection.reason)
        }
    }
}

/// GitHub can't reach us without a mortem in the path, but someone poking
/// the root should still be told what's missing.
#[rocket::post("/")]
pub fn missing_mortem() -> Custom<&'static str> {
    Custom(Status::BadRequest, "invalid mortem.")
}

#[rocket::get("/")]
pub fn index() -> Redirect {
    Redirect::found(uri!("https://github.com/prologin/gitcord"))
}
