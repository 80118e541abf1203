//! Paginated attendee fetcher
//!
//! Walks `GET {base}/events/{id}/attendees/?page={n}` from page 1 until a
//! page reports `pagination.has_more_items == false`. Name and email always
//! come from the nested `profile` object of each record; the top-level copies
//! may be stale or absent.

use log::debug;
use reqwest::blocking::{Client, ClientBuilder};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::FetchSettings;
use crate::error::{GuestlistError, Result};

/// One answer to a custom registration question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub question_id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
}

/// A normalized attendee record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attendee {
    pub id: u64,
    pub name: String,
    pub email: String,
    /// Trimmed answer to the platform-email question, empty when unanswered.
    pub platform_email: String,
    pub ticket_type: String,
    pub answers: Vec<Answer>,
}

/// Attendees decoded from a single page plus its continuation flag.
#[derive(Debug, Clone, Default)]
pub struct AttendeePage {
    pub attendees: Vec<Attendee>,
    pub has_more: bool,
}

/// Source of raw page bodies, keyed by 1-based page index.
pub trait PageSource {
    fn fetch_page(&mut self, page: u32) -> Result<String>;
}

#[derive(Deserialize)]
struct Pagination {
    #[serde(default, deserialize_with = "null_as_default")]
    has_more_items: bool,
}

#[derive(Deserialize)]
struct PageBody {
    pagination: Option<Pagination>,
    #[serde(default, deserialize_with = "null_as_default")]
    attendees: Vec<Value>,
}

#[derive(Deserialize)]
struct Profile {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    email: String,
}

#[derive(Deserialize)]
struct RecordBody {
    #[serde(default, deserialize_with = "null_as_default")]
    ticket_class_name: String,
    #[serde(default, alias = "Answers", deserialize_with = "null_as_default")]
    answers: Vec<Answer>,
}

/// Decode a field that the API may send as `null`, using the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Fetch every attendee of the event, page by page.
///
/// Pages are requested strictly in order and the result preserves page order
/// and per-page record order. The first error aborts the whole fetch.
pub fn fetch_all<S: PageSource + ?Sized>(
    source: &mut S,
    platform_question_id: &str,
) -> Result<Vec<Attendee>> {
    let mut attendees = Vec::new();
    let mut page = 1u32;

    loop {
        let body = source.fetch_page(page)?;
        let parsed = parse_page(page, &body, platform_question_id)?;
        debug!(
            "page {}: {} attendee(s), has_more={}",
            page,
            parsed.attendees.len(),
            parsed.has_more
        );
        attendees.extend(parsed.attendees);

        if !parsed.has_more {
            break;
        }
        page += 1;
    }

    Ok(attendees)
}

/// Decode one page body.
pub fn parse_page(page: u32, body: &str, platform_question_id: &str) -> Result<AttendeePage> {
    let data: PageBody =
        serde_json::from_str(body).map_err(|source| GuestlistError::MalformedPage { page, source })?;

    let attendees = data
        .attendees
        .iter()
        .enumerate()
        .map(|(index, raw)| parse_attendee(page, index, raw, platform_question_id))
        .collect::<Result<Vec<_>>>()?;

    Ok(AttendeePage {
        attendees,
        has_more: data.pagination.is_some_and(|p| p.has_more_items),
    })
}

fn parse_attendee(
    page: u32,
    index: usize,
    raw: &Value,
    platform_question_id: &str,
) -> Result<Attendee> {
    let malformed = |reason: String| GuestlistError::MalformedRecord {
        page,
        index,
        reason,
    };

    let fields = raw
        .as_object()
        .ok_or_else(|| malformed("parsing attendee: expected a JSON object".to_string()))?;

    let id = match fields.get("id") {
        Some(Value::String(s)) => s.parse::<u64>().map_err(|_| GuestlistError::InvalidAttendeeId {
            page,
            index,
            value: s.clone(),
        })?,
        Some(other) => {
            return Err(malformed(format!(
                "unable to parse attendee id: expected a string, got {other}"
            )))
        }
        None => return Err(malformed("unable to parse attendee id: missing".to_string())),
    };

    let profile = match fields.get("profile") {
        None | Some(Value::Null) => return Err(GuestlistError::MissingProfile { page, index }),
        Some(p) => Profile::deserialize(p)
            .map_err(|e| malformed(format!("parsing attendee profile: {e}")))?,
    };

    let record = RecordBody::deserialize(raw)
        .map_err(|e| malformed(format!("decoding attendee: {e}")))?;

    let platform_email = record
        .answers
        .iter()
        .rev()
        .find(|a| a.question_id == platform_question_id)
        .map(|a| a.answer.trim().to_string())
        .unwrap_or_default();

    Ok(Attendee {
        id,
        name: profile.name,
        email: profile.email.trim().to_string(),
        platform_email,
        ticket_type: record.ticket_class_name,
        answers: record.answers,
    })
}

/// [`PageSource`] backed by the registration API over HTTPS.
pub struct HttpPageSource {
    client: Client,
    settings: FetchSettings,
}

impl HttpPageSource {
    pub fn new(settings: FetchSettings) -> Result<Self> {
        Self::from_builder(settings, Client::builder())
    }

    /// Build the client from a caller-supplied builder. The configured
    /// timeout always overrides whatever the builder carries.
    pub fn from_builder(settings: FetchSettings, builder: ClientBuilder) -> Result<Self> {
        let client = builder
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GuestlistError::InvalidSetting {
                name: "http client",
                reason: e.to_string(),
            })?;
        Ok(Self { client, settings })
    }

    pub fn page_url(&self, page: u32) -> String {
        format!(
            "{}/events/{}/attendees/?page={}",
            self.settings.base_url, self.settings.event_id, page
        )
    }
}

impl PageSource for HttpPageSource {
    fn fetch_page(&mut self, page: u32) -> Result<String> {
        let url = self.page_url(page);
        debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.settings.token)
            .send()
            .map_err(|source| GuestlistError::Transport { page, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GuestlistError::Status {
                page,
                status: status.as_u16(),
            });
        }

        resp.text()
            .map_err(|source| GuestlistError::Transport { page, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    const QID: &str = "76109979";

    #[test]
    fn test_profile_wins_over_top_level_fields() {
        let body = r#"{
            "pagination": {"has_more_items": false},
            "attendees": [{
                "id": "1001",
                "name": "Stale Name",
                "email": "stale@x.com",
                "profile": {"name": "Real Name", "email": " real@x.com "},
                "ticket_class_name": "Day1"
            }]
        }"#;

        let page = parse_page(1, body, QID).unwrap();
        assert!(!page.has_more);
        let a = &page.attendees[0];
        assert_eq!(a.id, 1001);
        assert_eq!(a.name, "Real Name");
        assert_eq!(a.email, "real@x.com");
        assert_eq!(a.ticket_type, "Day1");
    }

    #[test]
    fn test_platform_email_extracted_and_trimmed() {
        let body = r#"{
            "pagination": {"has_more_items": true},
            "attendees": [{
                "id": "7",
                "profile": {"name": "A", "email": "a@x.com"},
                "ticket_class_name": "Day1",
                "answers": [
                    {"question": "Company", "question_id": "1", "type": "text", "answer": "Acme"},
                    {"question": "Login", "question_id": "76109979", "type": "text", "answer": " p@x.com "}
                ]
            }]
        }"#;

        let page = parse_page(1, body, QID).unwrap();
        assert!(page.has_more);
        let a = &page.attendees[0];
        assert_eq!(a.platform_email, "p@x.com");
        assert_eq!(a.answers.len(), 2);
        assert_eq!(a.answers[0].kind, "text");
    }

    #[test]
    fn test_platform_email_empty_without_matching_question() {
        let body = r#"{
            "pagination": {"has_more_items": false},
            "attendees": [{
                "id": "7",
                "profile": {"name": "A", "email": "a@x.com"},
                "answers": [{"question_id": "1", "answer": "p@x.com"}]
            }]
        }"#;

        let a = &parse_page(1, body, QID).unwrap().attendees[0];
        assert_eq!(a.platform_email, "");
        assert_eq!(a.ticket_type, "");
    }

    #[test]
    fn test_missing_profile_is_fatal() {
        let body = r#"{"pagination": {"has_more_items": false},
                       "attendees": [{"id": "7", "email": "a@x.com"}]}"#;
        let err = parse_page(4, body, QID).unwrap_err();
        assert!(matches!(err, GuestlistError::MissingProfile { page: 4, index: 0 }));
    }

    #[test]
    fn test_non_numeric_id_is_fatal() {
        let body = r#"{"pagination": {"has_more_items": false},
                       "attendees": [{"id": "abc", "profile": {"name": "A", "email": "a"}}]}"#;
        let err = parse_page(1, body, QID).unwrap_err();
        assert!(matches!(err, GuestlistError::InvalidAttendeeId { ref value, .. } if value == "abc"));
    }

    #[test]
    fn test_unquoted_id_is_malformed() {
        let body = r#"{"pagination": {"has_more_items": false},
                       "attendees": [{"id": 12, "profile": {"name": "A", "email": "a"}}]}"#;
        let err = parse_page(1, body, QID).unwrap_err();
        assert!(matches!(err, GuestlistError::MalformedRecord { .. }));
    }

    #[test]
    fn test_null_fields_decode_as_empty() {
        let body = r#"{
            "pagination": {"has_more_items": null},
            "attendees": [{
                "id": "8",
                "profile": {"name": null, "email": "a@x.com"},
                "ticket_class_name": null,
                "answers": [
                    {"question": null, "question_id": "76109979", "type": null, "answer": null}
                ]
            }]
        }"#;

        let page = parse_page(1, body, QID).unwrap();
        assert!(!page.has_more);
        let a = &page.attendees[0];
        assert_eq!(a.name, "");
        assert_eq!(a.email, "a@x.com");
        assert_eq!(a.ticket_type, "");
        assert_eq!(a.platform_email, "");
        assert_eq!(a.answers[0], Answer {
            question_id: QID.to_string(),
            ..Answer::default()
        });
    }

    #[test]
    fn test_null_answers_list_is_empty() {
        let body = r#"{"pagination": null,
                       "attendees": [{"id": "9", "profile": {"name": "A", "email": null},
                                      "answers": null}]}"#;
        let page = parse_page(1, body, QID).unwrap();
        assert!(!page.has_more);
        assert_eq!(page.attendees[0].email, "");
        assert!(page.attendees[0].answers.is_empty());
    }

    #[test]
    fn test_wrongly_typed_field_is_still_malformed() {
        let body = r#"{"pagination": {"has_more_items": false},
                       "attendees": [{"id": "9", "profile": {"name": "A", "email": "a"},
                                      "ticket_class_name": 4}]}"#;
        let err = parse_page(1, body, QID).unwrap_err();
        assert!(matches!(err, GuestlistError::MalformedRecord { .. }));
    }

    #[test]
    fn test_malformed_body() {
        let err = parse_page(2, "<html>oops</html>", QID).unwrap_err();
        assert!(matches!(err, GuestlistError::MalformedPage { page: 2, .. }));
    }

    #[test]
    fn test_page_url() {
        let source = HttpPageSource::new(FetchSettings {
            base_url: "https://api.example.com/v3".to_string(),
            event_id: 123456,
            token: "tok".to_string(),
            timeout: Duration::from_secs(5),
            platform_question_id: QID.to_string(),
        })
        .unwrap();
        assert_eq!(
            source.page_url(3),
            "https://api.example.com/v3/events/123456/attendees/?page=3"
        );
    }

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Answer one loopback connection per response, in order, after `delay`.
    /// The handle yields the lowercased request heads.
    fn serve(responses: Vec<String>, delay: Duration) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let mut heads = Vec::new();
            for response in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&buf[..n]);
                }
                thread::sleep(delay);
                // The client may already have given up.
                let _ = stream.write_all(response.as_bytes());
                heads.push(String::from_utf8_lossy(&head).to_lowercase());
            }
            heads
        });
        (format!("http://{addr}/v3"), handle)
    }

    fn loopback_source(base_url: String, timeout: Duration) -> HttpPageSource {
        let settings = FetchSettings {
            base_url,
            event_id: 42,
            token: "tok".to_string(),
            timeout,
            platform_question_id: QID.to_string(),
        };
        HttpPageSource::from_builder(settings, Client::builder().no_proxy()).unwrap()
    }

    #[test]
    fn test_http_page_sends_bearer_token() {
        let body = r#"{"pagination": {"has_more_items": false}, "attendees": []}"#;
        let (base, server) = serve(vec![http_response("200 OK", body)], Duration::ZERO);
        let mut source = loopback_source(base, Duration::from_secs(5));

        assert_eq!(source.fetch_page(2).unwrap(), body);

        let heads = server.join().unwrap();
        assert!(heads[0].starts_with("get /v3/events/42/attendees/?page=2 http/1.1\r\n"));
        assert!(heads[0].contains("\r\nauthorization: bearer tok\r\n"));
    }

    #[test]
    fn test_http_unauthorized_is_status_error() {
        let (base, server) = serve(
            vec![http_response("401 Unauthorized", r#"{"error": "INVALID_AUTH"}"#)],
            Duration::ZERO,
        );
        let mut source = loopback_source(base, Duration::from_secs(5));

        let err = source.fetch_page(1).unwrap_err();
        assert!(matches!(err, GuestlistError::Status { page: 1, status: 401 }));
        server.join().unwrap();
    }

    #[test]
    fn test_http_timeout_is_transport_error() {
        let body = r#"{"attendees": []}"#;
        let (base, server) = serve(vec![http_response("200 OK", body)], Duration::from_secs(3));
        let mut source = loopback_source(base, Duration::from_secs(1));

        let err = source.fetch_page(1).unwrap_err();
        assert!(
            matches!(err, GuestlistError::Transport { page: 1, ref source } if source.is_timeout()),
            "{err:?}"
        );
        assert_eq!(err.kind(), crate::error::ErrorKind::Fetch);
        server.join().unwrap();
    }

    #[test]
    fn test_fetch_all_over_http() {
        let first = r#"{"pagination": {"has_more_items": true},
                        "attendees": [{"id": "1", "profile": {"name": "A", "email": "a@x.com"}}]}"#;
        let second = r#"{"pagination": {"has_more_items": false},
                         "attendees": [{"id": "2", "profile": {"name": "B", "email": "b@x.com"}}]}"#;
        let (base, server) = serve(
            vec![http_response("200 OK", first), http_response("200 OK", second)],
            Duration::ZERO,
        );
        let mut source = loopback_source(base, Duration::from_secs(5));

        let attendees = fetch_all(&mut source, QID).unwrap();
        let ids: Vec<u64> = attendees.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let heads = server.join().unwrap();
        assert!(heads[0].contains("?page=1 "));
        assert!(heads[1].contains("?page=2 "));
    }
}
