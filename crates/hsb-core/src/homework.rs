//! Validation of the homework status payload and rendering of status changes.

use serde::Deserialize;
use serde_json::Value;

use crate::{domain::Cursor, errors::Error, Result};

/// Review status reported for a homework submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

/// Validated body of a `homework_statuses` response.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBatch {
    /// Most recent submission first, as returned by the API.
    pub homeworks: Vec<Value>,
    pub current_date: Option<Cursor>,
}

/// A status change ready to be sent to the chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: HomeworkStatus,
    pub message: String,
}

/// Checks the shape of a decoded API response.
pub fn check_response(response: Value) -> Result<StatusBatch> {
    let mut body = match response {
        Value::Object(body) => body,
        other => {
            return Err(Error::NotAMapping {
                found: json_type(&other),
            })
        }
    };

    let homeworks = match body.remove("homeworks") {
        None => return Err(Error::MissingKey("homeworks".to_string())),
        Some(Value::Array(list)) => list,
        Some(other) => {
            return Err(Error::WrongType {
                key: "homeworks".to_string(),
                expected: "списком",
                found: json_type(&other),
            })
        }
    };

    let current_date = match body.get("current_date") {
        None | Some(Value::Null) => None,
        Some(v) => Some(Cursor(v.as_i64().ok_or_else(|| Error::WrongType {
            key: "current_date".to_string(),
            expected: "целым числом",
            found: json_type(v),
        })?)),
    };

    Ok(StatusBatch {
        homeworks,
        current_date,
    })
}

/// Renders the chat message for a single homework record.
pub fn parse_status(homework: &Value) -> Result<StatusUpdate> {
    let raw_status = homework
        .get("status")
        .ok_or_else(|| Error::KeyLookup("status".to_string()))?;
    let name = homework
        .get("homework_name")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::KeyLookup("homework_name".to_string()))?;

    let status = HomeworkStatus::deserialize(raw_status).map_err(|_| {
        Error::KeyLookup(
            raw_status
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| raw_status.to_string()),
        )
    })?;

    Ok(StatusUpdate {
        status,
        message: format!(
            "Изменился статус проверки работы \"{name}\". {}",
            status.verdict()
        ),
    })
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "логическое значение",
        Value::Number(_) => "число",
        Value::String(_) => "строка",
        Value::Array(_) => "массив",
        Value::Object(_) => "словарь",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use serde_json::json;

    #[test]
    fn rejects_non_mapping_payloads() {
        let err = check_response(json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::NotAMapping { found: "массив" }));
        assert_eq!(err.kind(), ErrorKind::WrongType);
    }

    #[test]
    fn missing_homeworks_is_missing_key() {
        let err = check_response(json!({"current_date": 5})).unwrap_err();
        assert!(matches!(err, Error::MissingKey(ref k) if k == "homeworks"));
    }

    #[test]
    fn homeworks_must_be_a_list() {
        for bad in [json!(7), json!({"a": 1}), json!("x")] {
            let err = check_response(json!({"homeworks": bad, "current_date": 1})).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::WrongType, "{err}");
        }
    }

    #[test]
    fn empty_list_and_cursor_are_returned() {
        let batch = check_response(json!({"homeworks": [], "current_date": 1000})).unwrap();
        assert!(batch.homeworks.is_empty());
        assert_eq!(batch.current_date, Some(Cursor(1000)));
    }

    #[test]
    fn absent_current_date_is_none() {
        let batch = check_response(json!({"homeworks": [{"status": "approved"}]})).unwrap();
        assert_eq!(batch.homeworks.len(), 1);
        assert_eq!(batch.current_date, None);
    }

    #[test]
    fn non_integer_current_date_is_rejected() {
        let err = check_response(json!({"homeworks": [], "current_date": "soon"})).unwrap_err();
        assert!(matches!(err, Error::WrongType { ref key, .. } if key == "current_date"));
    }

    #[test]
    fn formats_every_known_status() {
        let cases = [
            ("approved", "Работа проверена: ревьюеру всё понравилось. Ура!"),
            ("reviewing", "Работа взята на проверку ревьюером."),
            ("rejected", "Работа проверена: у ревьюера есть замечания."),
        ];
        for (status, verdict) in cases {
            let update = parse_status(&json!({"status": status, "homework_name": "hw_bot"})).unwrap();
            assert!(update.message.contains("hw_bot"));
            assert!(update.message.ends_with(verdict));
        }
    }

    #[test]
    fn approved_message_is_exact() {
        let update = parse_status(&json!({"status": "approved", "homework_name": "hw1"})).unwrap();
        assert_eq!(update.status, HomeworkStatus::Approved);
        assert_eq!(
            update.message,
            "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!"
        );
    }

    #[test]
    fn unknown_status_is_key_lookup() {
        let err = parse_status(&json!({"status": "unknown", "homework_name": "hw1"})).unwrap_err();
        assert!(matches!(err, Error::KeyLookup(ref k) if k == "unknown"));
    }

    #[test]
    fn missing_fields_are_key_lookup() {
        let err = parse_status(&json!({"homework_name": "hw1"})).unwrap_err();
        assert!(matches!(err, Error::KeyLookup(ref k) if k == "status"));

        let err = parse_status(&json!({"status": "approved"})).unwrap_err();
        assert!(matches!(err, Error::KeyLookup(ref k) if k == "homework_name"));
    }
}
