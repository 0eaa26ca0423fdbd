//! preview-comments-core: position encoding and storage contracts for
//! attaching positional review comments ("pins") to a rendered page.
//!
//! The crate covers the durable parts of the system:
//! - a data model for anchors, comments and threads,
//! - a selector generator and anchor codec over a [`dom::Document`] boundary,
//! - the polymorphic [`adapter::Adapter`] storage contract and its error
//!   taxonomy,
//! - a small observable state container for the presentation layer,
//! - the credential acquisition boundary (token access, authorize URL,
//!   handshake messages).
//!
//! Concrete storage backends live in the companion crates
//! `preview-comments-github` and `preview-comments-local`.

pub mod adapter;
pub mod anchor;
pub mod auth;
pub mod dom;
pub mod error;
pub mod page;
pub mod selector;
pub mod session;
pub mod types;

pub use adapter::Adapter;
pub use anchor::{create_anchor, resolve_anchor, ResolvedPosition, Strategy};
pub use auth::{AuthMessage, OAuthConfig, StaticToken, TokenProvider};
pub use dom::{Document, Rect};
pub use error::AdapterError;
pub use page::PageModel;
pub use selector::generate_selector;
pub use session::{Mode, SessionStore, State, SubscriptionId, User};
pub use types::{parse_anchor, Author, Comment, PinAnchor, Thread, Viewport};
