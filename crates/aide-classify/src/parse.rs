//! Defensive parsing of the model's decision document.
//!
//! The completion text is untrusted input. Instead of try/catch control
//! flow, parsing returns an explicit variant the router consumes directly:
//! either a typed [`Decision`] or the raw text when the outer layer is not
//! the expected JSON object.

use crate::decision::Decision;
use aide_core::event::{CalendarProvider, MeetingRequest};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::debug;

/// Fallback clarification when the model flags scheduling but ships no
/// usable message of its own.
pub const DEFAULT_DETAILS_PROMPT: &str =
    "Please provide a valid meeting time and duration (not in the past).";

/// Result of parsing one completion.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(Decision),
    /// Not a JSON object at the outer layer. Carries the raw completion
    /// text so the router can reply with it verbatim.
    Malformed(String),
}

/// Parse a raw completion into a decision. Never fails; every malformed
/// shape maps to a safe variant.
pub fn parse(raw: &str, now: DateTime<Utc>) -> ParseOutcome {
    let root: Value = match serde_json::from_str(raw.trim()) {
        Ok(v) => v,
        Err(_) => return ParseOutcome::Malformed(raw.to_string()),
    };
    if !root.is_object() {
        // Valid JSON but not the decision document (e.g. a bare string).
        return ParseOutcome::Malformed(raw.to_string());
    }

    let action = root["action"].as_str().unwrap_or("");

    // Email-triage actions are recognized regardless of the isScheduling flag.
    match action {
        "ignore" => return ParseOutcome::Parsed(Decision::Ignore),
        "escalate" => {
            return ParseOutcome::Parsed(Decision::Escalate {
                sender_email: str_field(&root, "senderEmail"),
                subject: str_field(&root, "subject"),
                body: str_field(&root, "body"),
                suggested_reply: str_field(&root, "suggestedReply"),
            });
        }
        _ => {}
    }

    // Strict boolean check: anything but a JSON `true` means not scheduling.
    let is_scheduling = root["isScheduling"].as_bool().unwrap_or(false);
    if !is_scheduling {
        return ParseOutcome::Parsed(Decision::Reply {
            text: message_or_raw(&root, raw),
        });
    }

    match action {
        "schedule_meeting" => ParseOutcome::Parsed(parse_meeting(&root, raw, now)),
        "ask_for_details" => ParseOutcome::Parsed(Decision::AskForDetails {
            text: message_or_default(&root),
        }),
        other => {
            debug!("unrecognized action {other:?}, treating as plain reply");
            ParseOutcome::Parsed(Decision::Reply {
                text: message_or_raw(&root, raw),
            })
        }
    }
}

/// Validate a `schedule_meeting` document into a meeting or a downgrade.
fn parse_meeting(root: &Value, raw: &str, now: DateTime<Utc>) -> Decision {
    let start = root["start"].as_str().and_then(parse_datetime);
    let end = root["end"].as_str().and_then(parse_datetime);

    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if s >= now && s < e => (s, e),
        _ => {
            // Missing, unparseable, past, or inverted: ask, never guess.
            return Decision::AskForDetails {
                text: message_or_default(root),
            };
        }
    };

    // Outlook only on an explicit JSON `true`; any other representation
    // (absent, string, number) falls back to Google.
    let provider = if root["isOutlook"].as_bool() == Some(true) {
        CalendarProvider::Outlook
    } else {
        CalendarProvider::Google
    };

    let attendees = root["attendees"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let timezone = match root["timeZone"].as_str() {
        Some(tz) if !tz.is_empty() => tz.to_string(),
        _ => "UTC".to_string(),
    };

    debug!("valid schedule_meeting for {provider}: {raw}");

    Decision::ScheduleMeeting(MeetingRequest {
        summary: str_field(root, "summary"),
        description: str_field(root, "description"),
        start,
        end,
        timezone,
        attendees,
        provider,
        user_message: str_field(root, "userMessage"),
    })
}

/// Accept RFC 3339 as well as common naive "date time" shapes (read as UTC).
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

fn str_field(root: &Value, key: &str) -> String {
    root[key].as_str().unwrap_or_default().to_string()
}

fn message_or_default(root: &Value) -> String {
    match root["message"].as_str() {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => DEFAULT_DETAILS_PROMPT.to_string(),
    }
}

fn message_or_raw(root: &Value, raw: &str) -> String {
    match root["message"].as_str() {
        Some(m) => m.to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        at(2025, 6, 1, 12)
    }

    fn meeting_json(start: &str, end: &str, extra: &str) -> String {
        format!(
            r#"{{"isScheduling": true, "action": "schedule_meeting",
                 "summary": "Sync", "description": "Weekly sync",
                 "start": "{start}", "end": "{end}", "timeZone": "Europe/Berlin",
                 "attendees": ["bob@x.com"], "userMessage": "Done! Here is the link to your event:",
                 "message": "Need more details."{extra}}}"#
        )
    }

    #[test]
    fn test_non_json_is_malformed_with_raw_text() {
        let raw = "I'd be happy to help you schedule that!";
        assert_eq!(parse(raw, now()), ParseOutcome::Malformed(raw.to_string()));
    }

    #[test]
    fn test_json_scalar_is_malformed() {
        assert_eq!(parse("42", now()), ParseOutcome::Malformed("42".into()));
        assert_eq!(
            parse(r#""hello""#, now()),
            ParseOutcome::Malformed(r#""hello""#.into())
        );
    }

    #[test]
    fn test_not_scheduling_yields_reply_message() {
        let raw = r#"{"isScheduling": false, "message": "Paris."}"#;
        assert_eq!(
            parse(raw, now()),
            ParseOutcome::Parsed(Decision::Reply { text: "Paris.".into() })
        );
    }

    #[test]
    fn test_missing_is_scheduling_treated_as_false() {
        let raw = r#"{"message": "Just chatting."}"#;
        assert_eq!(
            parse(raw, now()),
            ParseOutcome::Parsed(Decision::Reply {
                text: "Just chatting.".into()
            })
        );
    }

    #[test]
    fn test_non_boolean_is_scheduling_treated_as_false() {
        let raw = r#"{"isScheduling": "true", "action": "schedule_meeting", "message": "hm"}"#;
        assert_eq!(
            parse(raw, now()),
            ParseOutcome::Parsed(Decision::Reply { text: "hm".into() })
        );
    }

    #[test]
    fn test_object_without_message_falls_back_to_raw() {
        let raw = r#"{"isScheduling": false}"#;
        assert_eq!(
            parse(raw, now()),
            ParseOutcome::Parsed(Decision::Reply { text: raw.into() })
        );
    }

    #[test]
    fn test_valid_meeting_parses_with_fields() {
        let raw = meeting_json("2025-06-02T10:00:00Z", "2025-06-02T11:00:00Z", "");
        let ParseOutcome::Parsed(Decision::ScheduleMeeting(req)) = parse(&raw, now()) else {
            panic!("expected a meeting");
        };
        assert_eq!(req.summary, "Sync");
        assert_eq!(req.start, at(2025, 6, 2, 10));
        assert_eq!(req.end, at(2025, 6, 2, 11));
        assert_eq!(req.timezone, "Europe/Berlin");
        assert_eq!(req.attendees, vec!["bob@x.com".to_string()]);
        assert_eq!(req.provider, CalendarProvider::Google);
        assert!(req.user_message.starts_with("Done!"));
    }

    #[test]
    fn test_naive_datetimes_read_as_utc() {
        let raw = meeting_json("2025-06-02 10:00", "2025-06-02 11:00:00", "");
        let ParseOutcome::Parsed(Decision::ScheduleMeeting(req)) = parse(&raw, now()) else {
            panic!("expected a meeting");
        };
        assert_eq!(req.start, at(2025, 6, 2, 10));
    }

    #[test]
    fn test_missing_start_or_end_asks_for_details() {
        for raw in [
            r#"{"isScheduling": true, "action": "schedule_meeting", "end": "2025-06-02T11:00:00Z", "message": "When should it start?"}"#,
            r#"{"isScheduling": true, "action": "schedule_meeting", "start": "2025-06-02T10:00:00Z", "message": "When should it end?"}"#,
            r#"{"isScheduling": true, "action": "schedule_meeting"}"#,
        ] {
            match parse(raw, now()) {
                ParseOutcome::Parsed(Decision::AskForDetails { .. }) => {}
                other => panic!("expected AskForDetails, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unparseable_dates_ask_for_details() {
        let raw = meeting_json("tomorrow at ten", "eleven", "");
        assert_eq!(
            parse(&raw, now()),
            ParseOutcome::Parsed(Decision::AskForDetails {
                text: "Need more details.".into()
            })
        );
    }

    #[test]
    fn test_past_start_asks_for_details() {
        let raw = meeting_json("2025-05-30T10:00:00Z", "2025-05-30T11:00:00Z", "");
        match parse(&raw, now()) {
            ParseOutcome::Parsed(Decision::AskForDetails { .. }) => {}
            other => panic!("expected AskForDetails, got {other:?}"),
        }
    }

    #[test]
    fn test_end_before_start_asks_for_details() {
        let raw = meeting_json("2025-06-02T11:00:00Z", "2025-06-02T10:00:00Z", "");
        match parse(&raw, now()) {
            ParseOutcome::Parsed(Decision::AskForDetails { .. }) => {}
            other => panic!("expected AskForDetails, got {other:?}"),
        }
    }

    #[test]
    fn test_downgrade_uses_default_prompt_when_message_missing() {
        let raw = r#"{"isScheduling": true, "action": "schedule_meeting", "start": "soon"}"#;
        assert_eq!(
            parse(raw, now()),
            ParseOutcome::Parsed(Decision::AskForDetails {
                text: DEFAULT_DETAILS_PROMPT.into()
            })
        );
    }

    #[test]
    fn test_outlook_only_on_explicit_true() {
        let cases = [
            (r#", "isOutlook": true"#, CalendarProvider::Outlook),
            (r#", "isOutlook": false"#, CalendarProvider::Google),
            (r#", "isOutlook": "true""#, CalendarProvider::Google),
            (r#", "isOutlook": 1"#, CalendarProvider::Google),
            ("", CalendarProvider::Google),
        ];
        for (extra, expected) in cases {
            let raw = meeting_json("2025-06-02T10:00:00Z", "2025-06-02T11:00:00Z", extra);
            let ParseOutcome::Parsed(Decision::ScheduleMeeting(req)) = parse(&raw, now()) else {
                panic!("expected a meeting for {extra:?}");
            };
            assert_eq!(req.provider, expected, "for isOutlook variant {extra:?}");
        }
    }

    #[test]
    fn test_ask_for_details_action() {
        let raw = r#"{"isScheduling": true, "action": "ask_for_details", "message": "Which day?"}"#;
        assert_eq!(
            parse(raw, now()),
            ParseOutcome::Parsed(Decision::AskForDetails {
                text: "Which day?".into()
            })
        );
    }

    #[test]
    fn test_unknown_action_is_plain_reply() {
        let raw = r#"{"isScheduling": true, "action": "dance", "message": "No."}"#;
        assert_eq!(
            parse(raw, now()),
            ParseOutcome::Parsed(Decision::Reply { text: "No.".into() })
        );
    }

    #[test]
    fn test_ignore_action() {
        let raw = r#"{"isScheduling": false, "action": "ignore", "message": ""}"#;
        assert_eq!(parse(raw, now()), ParseOutcome::Parsed(Decision::Ignore));
    }

    #[test]
    fn test_escalate_action_extracts_fields() {
        let raw = r#"{"isScheduling": false, "action": "escalate",
                      "senderEmail": "boss@x.com", "subject": "Budget",
                      "body": "Need a decision today.", "suggestedReply": "Approved."}"#;
        assert_eq!(
            parse(raw, now()),
            ParseOutcome::Parsed(Decision::Escalate {
                sender_email: "boss@x.com".into(),
                subject: "Budget".into(),
                body: "Need a decision today.".into(),
                suggested_reply: "Approved.".into(),
            })
        );
    }

    #[test]
    fn test_attendees_filtered_of_empty_strings() {
        let raw = r#"{"isScheduling": true, "action": "schedule_meeting",
                      "start": "2025-06-02T10:00:00Z", "end": "2025-06-02T11:00:00Z",
                      "attendees": ["", "a@x.com", ""]}"#;
        let ParseOutcome::Parsed(Decision::ScheduleMeeting(req)) = parse(raw, now()) else {
            panic!("expected a meeting");
        };
        assert_eq!(req.attendees, vec!["a@x.com".to_string()]);
        assert_eq!(req.timezone, "UTC");
    }
}
