pub mod github;
pub use github::{github_webhook, index, missing_mortem};
