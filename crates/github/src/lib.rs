//! preview-comments-github: thread text codec and the remote storage
//! adapter backed by issue comments on a pull request.
//!
//! The codec makes an ordinary, human-readable PR comment double as a
//! structured record: a legible header and reply blocks followed by a
//! machine-readable trailer. The adapter keeps no cache and rewrites
//! whole comment bodies, so the last writer wins.

pub mod adapter;
pub mod api;
pub mod codec;

pub use adapter::GitHubAdapter;
pub use api::{ApiUser, GitHubApi, IssueComment, IssueCommentApi};
pub use codec::{parse_thread, serialize_thread, ParsedThread, SerializedComment};
