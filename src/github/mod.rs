pub mod client;

pub use client::{GitHubClient, GitHubResponse, RestGitHubClient};
