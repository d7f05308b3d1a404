//! OpenReview REST client (guest access, blocking).

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use super::{Directory, DirectoryError, DirectoryResult, ProfileLookup, Submissions};
use crate::config::{DirectoryConfig, MAX_PAGE_SIZE};
use crate::profile::AuthorProfile;
use crate::submission::Submission;

/// Guest client for `/notes` and `/profiles`.
pub struct OpenReviewClient {
    base_url: String,
    page_size: usize,
    http: ureq::Agent,
}

#[derive(Deserialize)]
struct NotesPage {
    #[serde(default)]
    notes: Vec<Submission>,
}

#[derive(Deserialize)]
struct ProfilesPage {
    #[serde(default)]
    profiles: Vec<AuthorProfile>,
}

impl OpenReviewClient {
    pub fn new(config: &DirectoryConfig) -> Self {
        let http = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.clamp(1, MAX_PAGE_SIZE),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` with `query` and decode the JSON body.
    fn get(&self, path: &str, query: &[(&str, &str)]) -> DirectoryResult<Value> {
        let url = self.url(path);
        let request = query
            .iter()
            .fold(self.http.get(&url), |req, (k, v)| req.query(k, v));

        match request.call() {
            Ok(resp) => resp.into_json::<Value>().map_err(|e| DirectoryError::Decode {
                url,
                message: e.to_string(),
            }),
            Err(ureq::Error::Status(status, resp)) => {
                let message = resp.into_string().unwrap_or_default();
                Err(DirectoryError::Status {
                    url,
                    status,
                    message,
                })
            }
            Err(ureq::Error::Transport(transport)) => Err(DirectoryError::Request {
                url,
                message: transport.to_string(),
            }),
        }
    }

    /// One page of notes starting at `offset`.
    fn fetch_notes(&self, invitation: &str, offset: usize) -> DirectoryResult<Vec<Submission>> {
        let offset_str = offset.to_string();
        let limit_str = self.page_size.to_string();
        let body = self.get(
            "/notes",
            &[
                ("invitation", invitation),
                ("offset", &offset_str),
                ("limit", &limit_str),
            ],
        )?;
        let notes = decode_notes(body, &self.url("/notes"))?;
        tracing::debug!(invitation, offset, count = notes.len(), "fetched notes page");
        Ok(notes)
    }
}

impl Directory for OpenReviewClient {
    fn submissions<'a>(&'a self, invitation: &str) -> Submissions<'a> {
        let invitation = invitation.to_string();
        Box::new(NotePages::new(self.page_size, move |offset| {
            self.fetch_notes(&invitation, offset)
        }))
    }

    fn profile(&self, author_id: &str) -> DirectoryResult<ProfileLookup> {
        let response = self.get("/profiles", &[profile_query(author_id)]);
        profile_lookup(response, &self.url("/profiles"))
    }
}

/// Offset-paginated iterator over `/notes`. A page is requested only once
/// the previous one has been consumed; a short page ends the sequence, and
/// so does the first failed request.
struct NotePages<F> {
    fetch: F,
    page_size: usize,
    offset: usize,
    buffer: std::vec::IntoIter<Submission>,
    exhausted: bool,
}

impl<F> NotePages<F>
where
    F: FnMut(usize) -> DirectoryResult<Vec<Submission>>,
{
    fn new(page_size: usize, fetch: F) -> Self {
        Self {
            fetch,
            page_size,
            offset: 0,
            buffer: Vec::new().into_iter(),
            exhausted: false,
        }
    }
}

impl<F> Iterator for NotePages<F>
where
    F: FnMut(usize) -> DirectoryResult<Vec<Submission>>,
{
    type Item = DirectoryResult<Submission>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(note) = self.buffer.next() {
                return Some(Ok(note));
            }
            if self.exhausted {
                return None;
            }
            match (self.fetch)(self.offset) {
                Ok(page) => {
                    self.exhausted = page.len() < self.page_size;
                    self.offset += page.len();
                    self.buffer = page.into_iter();
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Map a `/profiles` response to a lookup. The directory answers unknown or
/// malformed ids with 400/404; every other failure propagates.
pub fn profile_lookup(
    response: DirectoryResult<Value>,
    url: &str,
) -> DirectoryResult<ProfileLookup> {
    match response {
        Ok(body) => decode_profiles(body, url),
        Err(DirectoryError::Status {
            status: 400 | 404,
            ..
        }) => Ok(ProfileLookup::NotFound),
        Err(e) => Err(e),
    }
}

/// Identifiers containing `@` are emails; everything else is a profile id.
pub fn profile_query(author_id: &str) -> (&'static str, &str) {
    if author_id.contains('@') {
        ("email", author_id)
    } else {
        ("id", author_id)
    }
}

/// Decode a `/notes` body.
pub fn decode_notes(body: Value, url: &str) -> DirectoryResult<Vec<Submission>> {
    serde_json::from_value::<NotesPage>(body)
        .map(|page| page.notes)
        .map_err(|e| DirectoryError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
}

/// Decode a `/profiles` body; an empty list means the profile does not exist.
pub fn decode_profiles(body: Value, url: &str) -> DirectoryResult<ProfileLookup> {
    let page: ProfilesPage =
        serde_json::from_value(body).map_err(|e| DirectoryError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;
    Ok(page
        .profiles
        .into_iter()
        .next()
        .map_or(ProfileLookup::NotFound, ProfileLookup::Found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn emails_and_ids_use_different_query_keys() {
        assert_eq!(profile_query("a@x.com"), ("email", "a@x.com"));
        assert_eq!(profile_query("~Jo_Doe1"), ("id", "~Jo_Doe1"));
    }

    #[test]
    fn decodes_notes_page() {
        let notes = decode_notes(
            json!({
                "notes": [
                    {"id": "n1", "content": {"authors": ["A"], "authorids": ["a@x.com"]}},
                    {"id": "n2", "content": {"authors": "B", "author_emails": "b@x.com"}}
                ],
                "count": 2
            }),
            "test",
        )
        .unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1].id, "n2");
    }

    #[test]
    fn missing_notes_key_is_an_empty_page() {
        assert!(decode_notes(json!({}), "test").unwrap().is_empty());
    }

    #[test]
    fn malformed_notes_are_decode_errors() {
        let err = decode_notes(json!({"notes": 5}), "https://api/notes").unwrap_err();
        assert!(matches!(err, DirectoryError::Decode { ref url, .. } if url == "https://api/notes"));
    }

    #[test]
    fn empty_profile_list_is_not_found() {
        let lookup = decode_profiles(json!({"profiles": []}), "test").unwrap();
        assert_eq!(lookup, ProfileLookup::NotFound);
    }

    #[test]
    fn first_profile_is_returned() {
        let lookup = decode_profiles(
            json!({"profiles": [
                {"id": "~Jo_Doe1", "content": {"names": [{"first": "Jo", "last": "Doe"}]}}
            ]}),
            "test",
        )
        .unwrap();
        match lookup {
            ProfileLookup::Found(profile) => {
                assert_eq!(profile.id, "~Jo_Doe1");
                assert_eq!(profile.names.len(), 1);
            }
            ProfileLookup::NotFound => panic!("expected a profile"),
        }
    }

    fn status(status: u16) -> DirectoryResult<Value> {
        Err(DirectoryError::Status {
            url: "https://api/profiles".into(),
            status,
            message: String::new(),
        })
    }

    #[test]
    fn missing_and_malformed_ids_are_not_found() {
        for code in [400, 404] {
            assert_eq!(
                profile_lookup(status(code), "test").unwrap(),
                ProfileLookup::NotFound
            );
        }
        assert_eq!(
            profile_lookup(Ok(json!({"profiles": []})), "test").unwrap(),
            ProfileLookup::NotFound
        );
    }

    #[test]
    fn other_profile_failures_propagate() {
        for code in [401, 403, 429, 500, 503] {
            let err = profile_lookup(status(code), "test").unwrap_err();
            assert!(matches!(err, DirectoryError::Status { status, .. } if status == code));
        }
        let transport = Err(DirectoryError::Request {
            url: "https://api/profiles".into(),
            message: "connection refused".into(),
        });
        assert!(matches!(
            profile_lookup(transport, "test").unwrap_err(),
            DirectoryError::Request { .. }
        ));
    }

    fn notes(count: usize) -> Vec<Submission> {
        (0..count)
            .map(|i| Submission::new(format!("n{i}"), json!({"authors": ["a"]})))
            .collect()
    }

    /// Serves `pages` in order and records the offset of every request.
    fn paged(
        pages: Vec<DirectoryResult<Vec<Submission>>>,
        offsets: &RefCell<Vec<usize>>,
    ) -> impl FnMut(usize) -> DirectoryResult<Vec<Submission>> + '_ {
        let mut pages = pages.into_iter();
        move |offset| {
            offsets.borrow_mut().push(offset);
            pages.next().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[test]
    fn short_page_ends_the_sequence() {
        let offsets = RefCell::new(Vec::new());
        let pages = NotePages::new(2, paged(vec![Ok(notes(2)), Ok(notes(1))], &offsets));
        let items: Vec<_> = pages.collect();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| item.is_ok()));
        assert_eq!(*offsets.borrow(), vec![0, 2]);
    }

    #[test]
    fn full_page_triggers_one_more_request() {
        let offsets = RefCell::new(Vec::new());
        let pages = NotePages::new(2, paged(vec![Ok(notes(2)), Ok(notes(2))], &offsets));
        assert_eq!(pages.count(), 4);
        assert_eq!(*offsets.borrow(), vec![0, 2, 4]);
    }

    #[test]
    fn pages_are_fetched_lazily() {
        let offsets = RefCell::new(Vec::new());
        let mut pages = NotePages::new(2, paged(vec![Ok(notes(2)), Ok(notes(2))], &offsets));
        assert!(pages.next().unwrap().is_ok());
        assert!(pages.next().unwrap().is_ok());
        assert_eq!(*offsets.borrow(), vec![0]);
    }

    #[test]
    fn failed_page_is_yielded_once() {
        let offsets = RefCell::new(Vec::new());
        let failure = Err(DirectoryError::Request {
            url: "https://api/notes".into(),
            message: "connection reset".into(),
        });
        let mut pages = NotePages::new(2, paged(vec![Ok(notes(2)), failure], &offsets));
        assert!(pages.next().unwrap().is_ok());
        assert!(pages.next().unwrap().is_ok());
        assert!(matches!(pages.next(), Some(Err(DirectoryError::Request { .. }))));
        assert!(pages.next().is_none());
        assert!(pages.next().is_none());
        assert_eq!(*offsets.borrow(), vec![0, 2]);
    }

    #[test]
    fn client_clamps_page_size_and_trims_url() {
        let client = OpenReviewClient::new(&DirectoryConfig {
            base_url: "https://api.openreview.net/".into(),
            page_size: 0,
            timeout_secs: 5,
        });
        assert_eq!(client.page_size, 1);
        assert_eq!(client.url("/notes"), "https://api.openreview.net/notes");

        let client = OpenReviewClient::new(&DirectoryConfig {
            page_size: 5000,
            ..Default::default()
        });
        assert_eq!(client.page_size, MAX_PAGE_SIZE);
    }
}
