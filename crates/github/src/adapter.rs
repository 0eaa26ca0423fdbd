//! Remote storage adapter: threads encoded inside issue comments.
//!
//! No local cache: every mutation re-fetches the external record,
//! rewrites the full re-encoded body, and writes it back. A concurrent
//! editor's changes between the read and the write are lost; the
//! intended usage is low-concurrency human review.
//!
//! Reply ids are positional (`<record id>-<index>`) because the wire
//! format has nowhere to store generated ids: deleting reply 0 shifts
//! every later reply's effective id.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use preview_comments_core::adapter::Adapter;
use preview_comments_core::auth::TokenProvider;
use preview_comments_core::error::AdapterError;
use preview_comments_core::types::{Author, Comment, PinAnchor, Thread};

use crate::api::{GitHubApi, IssueComment, IssueCommentApi};
use crate::codec::{parse_thread, serialize_thread, SerializedComment};

pub struct GitHubAdapter {
    api: Arc<dyn IssueCommentApi>,
}

impl GitHubAdapter {
    /// Adapter for `repo` (`owner/name`) and PR number `pr`.
    pub fn new(repo: impl Into<String>, pr: u64, token: Arc<dyn TokenProvider>) -> Self {
        Self {
            api: Arc::new(GitHubApi::new(repo, pr, token)),
        }
    }

    /// Adapter over a custom transport (tests, enterprise proxies).
    pub fn with_api(api: Arc<dyn IssueCommentApi>) -> Self {
        Self { api }
    }
}

fn reply_id(record_id: u64, index: usize) -> String {
    format!("{record_id}-{index}")
}

/// `<record id>-<index>` back into its parts.
fn split_reply_id(comment_id: &str) -> Result<(u64, usize), AdapterError> {
    let not_found = || AdapterError::CommentNotFound {
        id: comment_id.to_string(),
    };
    let (record, index) = comment_id.split_once('-').ok_or_else(not_found)?;
    let record = record.parse().map_err(|_| not_found())?;
    let index = index.parse().map_err(|_| not_found())?;
    Ok((record, index))
}

fn parse_record_id(thread_id: &str) -> Result<u64, AdapterError> {
    thread_id.parse().map_err(|_| AdapterError::ThreadNotFound {
        id: thread_id.to_string(),
    })
}

/// Decode an external record into a thread. Unrelated comments on the
/// same issue yield `None` and are skipped.
fn to_thread(record: &IssueComment) -> Option<Thread> {
    let parsed = parse_thread(&record.body)?;
    let thread_id = record.id.to_string();
    let comments = parsed
        .comments
        .into_iter()
        .enumerate()
        .map(|(index, comment)| Comment {
            id: reply_id(record.id, index),
            thread_id: thread_id.clone(),
            author: Author {
                name: comment.author,
                avatar_url: String::new(),
            },
            body: comment.body,
            created_at: record.created_at,
            resolved: false,
        })
        .collect();
    Some(Thread {
        id: thread_id,
        anchor: parsed.anchor,
        comments,
        resolved: parsed.resolved,
        created_at: record.created_at,
    })
}

#[async_trait]
impl Adapter for GitHubAdapter {
    async fn get_threads(&self) -> Result<Vec<Thread>, AdapterError> {
        let records = self.api.list_comments().await?;
        Ok(records.iter().filter_map(to_thread).collect())
    }

    async fn create_thread(
        &self,
        anchor: PinAnchor,
        body: &str,
    ) -> Result<Thread, AdapterError> {
        let user = self.api.current_user().await?;
        let serialized = serialize_thread(
            &anchor,
            &[SerializedComment {
                author: user.login,
                body: body.to_string(),
            }],
            false,
        );
        let record = self.api.create_comment(&serialized).await?;
        to_thread(&record).ok_or_else(|| AdapterError::MalformedRecord {
            message: "created record did not round-trip".to_string(),
        })
    }

    async fn resolve_thread(&self, thread_id: &str) -> Result<(), AdapterError> {
        let record_id = parse_record_id(thread_id)?;
        let record = self.api.get_comment(record_id).await?;
        let Some(parsed) = parse_thread(&record.body) else {
            // Not a managed thread; nothing to toggle.
            return Ok(());
        };
        let updated = serialize_thread(&parsed.anchor, &parsed.comments, !parsed.resolved);
        self.api.update_comment(record_id, &updated).await
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<(), AdapterError> {
        let record_id = parse_record_id(thread_id)?;
        self.api.delete_comment(record_id).await
    }

    async fn add_comment(&self, thread_id: &str, body: &str) -> Result<Comment, AdapterError> {
        let record_id = parse_record_id(thread_id)?;
        let user = self.api.current_user().await?;
        let record = self.api.get_comment(record_id).await?;
        let mut parsed =
            parse_thread(&record.body).ok_or_else(|| AdapterError::ThreadNotFound {
                id: thread_id.to_string(),
            })?;

        parsed.comments.push(SerializedComment {
            author: user.login.clone(),
            body: body.to_string(),
        });
        let updated = serialize_thread(&parsed.anchor, &parsed.comments, parsed.resolved);
        self.api.update_comment(record_id, &updated).await?;

        Ok(Comment {
            id: reply_id(record_id, parsed.comments.len() - 1),
            thread_id: thread_id.to_string(),
            author: Author {
                name: user.login,
                avatar_url: user.avatar_url,
            },
            body: body.to_string(),
            created_at: Utc::now(),
            resolved: false,
        })
    }

    async fn edit_comment(&self, comment_id: &str, body: &str) -> Result<Comment, AdapterError> {
        let (record_id, index) = split_reply_id(comment_id)?;
        let record = self.api.get_comment(record_id).await?;
        let mut parsed =
            parse_thread(&record.body).ok_or_else(|| AdapterError::CommentNotFound {
                id: comment_id.to_string(),
            })?;
        let entry = parsed
            .comments
            .get_mut(index)
            .ok_or_else(|| AdapterError::CommentNotFound {
                id: comment_id.to_string(),
            })?;

        entry.body = body.to_string();
        let author = entry.author.clone();
        let updated = serialize_thread(&parsed.anchor, &parsed.comments, parsed.resolved);
        self.api.update_comment(record_id, &updated).await?;

        Ok(Comment {
            id: comment_id.to_string(),
            thread_id: record_id.to_string(),
            author: Author {
                name: author,
                avatar_url: String::new(),
            },
            body: body.to_string(),
            created_at: Utc::now(),
            resolved: false,
        })
    }

    async fn delete_comment(&self, comment_id: &str) -> Result<(), AdapterError> {
        let (record_id, index) = split_reply_id(comment_id)?;
        let record = self.api.get_comment(record_id).await?;
        let mut parsed =
            parse_thread(&record.body).ok_or_else(|| AdapterError::ThreadNotFound {
                id: record_id.to_string(),
            })?;
        if index >= parsed.comments.len() {
            return Err(AdapterError::CommentNotFound {
                id: comment_id.to_string(),
            });
        }

        parsed.comments.remove(index);
        if parsed.comments.is_empty() {
            // No empty threads: the whole record goes.
            return self.api.delete_comment(record_id).await;
        }
        let updated = serialize_thread(&parsed.anchor, &parsed.comments, parsed.resolved);
        self.api.update_comment(record_id, &updated).await
    }
}
