//! The submission/profile directory (OpenReview).
//!
//! Two operations are consumed: iterate the submissions of an invitation,
//! and look up a profile by identifier. [`Directory`] is the seam the census
//! runs against; [`OpenReviewClient`] talks to the real service.

pub mod openreview;

use miette::Diagnostic;
use thiserror::Error;

use crate::profile::AuthorProfile;
use crate::submission::Submission;

pub use openreview::OpenReviewClient;

/// Errors talking to the directory. All are fatal for the run.
#[derive(Debug, Error, Diagnostic)]
pub enum DirectoryError {
    #[error("directory request failed: {url}: {message}")]
    #[diagnostic(
        code(census::directory::request),
        help("Check network access to the directory service (directory.base_url).")
    )]
    Request { url: String, message: String },

    #[error("directory returned HTTP {status} for {url}: {message}")]
    #[diagnostic(
        code(census::directory::status),
        help("The service rejected the request. Verify the invitation ids under [venues].")
    )]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("failed to decode directory response from {url}: {message}")]
    #[diagnostic(
        code(census::directory::decode),
        help("The service answered with an unexpected payload. Is directory.base_url an API endpoint?")
    )]
    Decode { url: String, message: String },
}

pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;

/// Result of a profile lookup. Not-found is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileLookup {
    Found(AuthorProfile),
    NotFound,
}

/// Lazy sequence of submissions for one invitation.
pub type Submissions<'a> = Box<dyn Iterator<Item = DirectoryResult<Submission>> + 'a>;

/// Read access to submissions and profiles.
pub trait Directory {
    /// All submissions posted under `invitation`, fetched lazily.
    fn submissions<'a>(&'a self, invitation: &str) -> Submissions<'a>;

    /// Look up the profile behind an author identifier.
    fn profile(&self, author_id: &str) -> DirectoryResult<ProfileLookup>;
}

impl<D: Directory + ?Sized> Directory for &D {
    fn submissions<'a>(&'a self, invitation: &str) -> Submissions<'a> {
        (**self).submissions(invitation)
    }

    fn profile(&self, author_id: &str) -> DirectoryResult<ProfileLookup> {
        (**self).profile(author_id)
    }
}
