use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
pub struct RelayConfig {
    /// Port the HTTP server should listen on
    pub port: u16,
    /// GitHub account names whose repositories are allowed to trigger
    /// notifications. An empty list rejects every push.
    pub owners: Vec<String>,
    /// Maps a mortem (the path segment GitHub posts to) to the list of
    /// Discord webhook URLs that should receive its push notifications.
    pub hooks: BTreeMap<String, Vec<Url>>,
}

impl RelayConfig {
    /// Returns the destinations registered for a mortem. A mortem mapped to
    /// an empty list is treated the same as an unknown one.
    pub fn destinations(&self, mortem: &str) -> Option<&[Url]> {
        self.hooks
            .get(mortem)
            .map(Vec::as_slice)
            .filter(|hooks| !hooks.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> RelayConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn empty_hook_list_is_not_registered() {
        let config = config(
            r#"
            port: 1337
            owners: [ "octocat" ]
            hooks:
              empty: []
              teamproj: [ "https://discord.example/hook" ]
            "#,
        );

        assert!(config.destinations("empty").is_none());
        assert!(config.destinations("unknown").is_none());
        assert_eq!(config.destinations("teamproj").map(<[_]>::len), Some(1));
    }
}
