use serde::Deserialize;

/// Body of a GitHub webhook delivery, as far as the relay cares about it.
///
/// Every field the screening checks look at is optional: payloads are
/// untrusted input, and the check order decides which missing field produces
/// which rejection, so none of them may fail deserialization outright.
#[derive(Debug, Default, Deserialize)]
pub struct GitHubPayload {
    pub repository: Option<Repository>,
    pub sender: Option<Sender>,
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub r#ref: String,
    #[serde(default)]
    pub compare: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub name: String,
    pub owner: Option<Owner>,
}

/// Owner of a pushed-to repository. `name` is only set for repositories
/// owned by users that expose one, hence the extra layer of `Option`.
#[derive(Debug, Default, Deserialize)]
pub struct Owner {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Sender {
    pub id: Option<u64>,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub message: String,
    pub committer: Option<Committer>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Committer {
    pub username: Option<String>,
}

/// View of a payload that passed every screening check, borrowing the fields
/// the checks proved present.
#[derive(Debug)]
pub struct ValidPush<'a> {
    pub repository: &'a Repository,
    pub sender: &'a Sender,
    pub commits: &'a [Commit],
    pub r#ref: &'a str,
    pub compare: &'a str,
}
