use serde::{Deserialize, Deserializer, Serialize};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct NewUserRequest {
    pub username: String,
}

/// Request body for appending an exercise entry.
#[derive(Debug, Deserialize)]
pub struct AddExerciseRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub description: String,
    #[serde(deserialize_with = "duration_minutes")]
    pub duration: i64,
    #[serde(default)]
    pub date: Option<String>,
}

// Clients send duration as a JSON number or a numeric string; both coerce.
fn duration_minutes<'de, D>(de: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(i64),
        Str(String),
    }
    match NumOrStr::deserialize(de)? {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s.trim().parse::<i64>().map_err(serde::de::Error::custom),
    }
}

/// Public part of a user: id and username only.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
}

/// Response for a newly appended exercise entry.
#[derive(Debug, Serialize)]
pub struct AddExerciseResponse {
    pub id: String,
    pub username: String,
    pub description: String,
    pub duration: i64,
    pub date: String,
}

/// Query parameters for the log endpoint.
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<u32>,
}

/// One rendered log entry.
#[derive(Debug, Serialize)]
pub struct LogEntryView {
    pub description: String,
    pub duration: i64,
    pub date: String,
}

/// Response for the log endpoint. `from`/`to` are echoed back only when the
/// caller supplied them.
#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub count: usize,
    pub log: Vec<LogEntryView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_accepts_number_and_numeric_string() {
        let body: AddExerciseRequest =
            serde_json::from_str(r#"{"userId":"u1","description":"run","duration":30}"#)
                .expect("number form");
        assert_eq!(body.duration, 30);

        let body: AddExerciseRequest =
            serde_json::from_str(r#"{"userId":"u1","description":"run","duration":" 30 "}"#)
                .expect("string form");
        assert_eq!(body.duration, 30);
    }

    #[test]
    fn duration_rejects_non_numeric_string() {
        let err = serde_json::from_str::<AddExerciseRequest>(
            r#"{"userId":"u1","description":"run","duration":"3x"}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn add_request_date_is_optional() {
        let body: AddExerciseRequest =
            serde_json::from_str(r#"{"userId":"u1","description":"run","duration":5}"#)
                .expect("no date");
        assert!(body.date.is_none());
    }

    #[test]
    fn log_response_omits_absent_bounds() {
        let response = LogResponse {
            id: "abc123".into(),
            username: "alice".into(),
            from: None,
            to: None,
            count: 0,
            log: vec![],
        };
        let json = serde_json::to_string(&response).expect("serialize");
        assert!(!json.contains("from"));
        assert!(!json.contains("to"));
        assert!(json.contains(r#""count":0"#));
    }

    #[test]
    fn log_response_echoes_given_bounds() {
        let response = LogResponse {
            id: "abc123".into(),
            username: "alice".into(),
            from: Some("Thu Jan 05 2023".into()),
            to: None,
            count: 1,
            log: vec![LogEntryView {
                description: "run".into(),
                duration: 30,
                date: "Thu Jan 05 2023".into(),
            }],
        };
        let json = serde_json::to_string(&response).expect("serialize");
        assert!(json.contains(r#""from":"Thu Jan 05 2023""#));
        assert!(!json.contains(r#""to""#));
    }

    #[test]
    fn log_query_uses_camel_case_user_id() {
        let q: LogQuery = serde_json::from_str(r#"{"userId":"u1","limit":5}"#).expect("parse");
        assert_eq!(q.user_id, "u1");
        assert_eq!(q.limit, Some(5));
        assert!(q.from.is_none());
    }
}
