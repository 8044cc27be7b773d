//! Response validation and verdict extraction
//!
//! Enforces the documented response shape and turns the newest homework
//! record into the notification text. Both steps are stateless: duplicate
//! suppression belongs entirely to the notifier, keyed by the exact text of
//! the last delivered message.

use serde_json::Value;
use thiserror::Error;

/// Review verdict codes and their display text
pub const HOMEWORK_VERDICTS: &[(&str, &str)] = &[
    ("approved", "Работа проверена: ревьюеру всё понравилось. Ура!"),
    ("reviewing", "Работа взята на проверку ревьюером."),
    ("rejected", "Работа проверена: у ревьюера есть замечания."),
];

/// Errors produced while checking a response body or a homework record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    /// The body or one of its values has the wrong JSON type.
    #[error("Ответ API не соответствует документации: {0}")]
    Shape(String),

    /// A documented key is absent.
    #[error("Отсутствует ожидаемый ключ в ответе API: {0}")]
    MissingField(&'static str),

    /// The record's status is not one of the known verdict codes.
    #[error("Получен неожиданный статус: {0}")]
    UnknownVerdict(String),
}

/// Check the response body against the documented shape and return the
/// homework list. An empty list is a normal outcome meaning "nothing new
/// this cycle". `current_date` is not required here; its absence only keeps
/// the cursor where it was.
///
/// # Errors
///
/// Returns [`StatusError::Shape`] if the body is not an object or
/// `homeworks` is not an array, and [`StatusError::MissingField`] if
/// `homeworks` is absent.
pub fn validate(body: &Value) -> Result<&[Value], StatusError> {
    let map = body
        .as_object()
        .ok_or_else(|| StatusError::Shape("ответ не является словарём".to_owned()))?;

    let homeworks = map
        .get("homeworks")
        .ok_or(StatusError::MissingField("homeworks"))?;

    homeworks
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| StatusError::Shape("значение homeworks не является списком".to_owned()))
}

/// Build the notification text for one homework record.
///
/// Every valid record yields text, whether or not its status differs from
/// any previous cycle; the notifier decides if it is worth sending.
///
/// # Errors
///
/// Returns [`StatusError::MissingField`] if `status` or `homework_name` is
/// absent (or not a string), and [`StatusError::UnknownVerdict`] for a
/// status outside the verdict table.
pub fn parse_status(record: &Value) -> Result<String, StatusError> {
    let status = record
        .get("status")
        .and_then(Value::as_str)
        .ok_or(StatusError::MissingField("status"))?;

    let name = record
        .get("homework_name")
        .and_then(Value::as_str)
        .ok_or(StatusError::MissingField("homework_name"))?;

    let verdict = verdict_text(status)
        .ok_or_else(|| StatusError::UnknownVerdict(status.to_owned()))?;

    Ok(format!(
        "Изменился статус проверки работы \"{name}\". {verdict}"
    ))
}

fn verdict_text(code: &str) -> Option<&'static str> {
    HOMEWORK_VERDICTS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, text)| *text)
}

#[cfg(test)]
mod tests {
    use super::{parse_status, validate, StatusError};
    use serde_json::json;

    #[test]
    fn empty_homework_list_is_not_an_error() {
        let body = json!({"homeworks": [], "current_date": 100});
        let homeworks = validate(&body).expect("empty list is a normal outcome");
        assert!(homeworks.is_empty());
    }

    #[test]
    fn non_object_body_is_a_shape_error() {
        let err = validate(&json!([])).expect_err("list instead of object");
        assert!(matches!(err, StatusError::Shape(_)));
    }

    #[test]
    fn non_list_homeworks_is_a_shape_error() {
        let err = validate(&json!({"homeworks": "x"})).expect_err("string instead of list");
        assert!(matches!(err, StatusError::Shape(_)));
    }

    #[test]
    fn missing_homeworks_key_is_reported() {
        let err = validate(&json!({"current_date": 100})).expect_err("no homeworks key");
        assert_eq!(err, StatusError::MissingField("homeworks"));
    }

    #[test]
    fn approved_record_formats_the_exact_message() {
        let record = json!({"status": "approved", "homework_name": "X"});
        assert_eq!(
            parse_status(&record).expect("valid record"),
            "Изменился статус проверки работы \"X\". \
             Работа проверена: ревьюеру всё понравилось. Ура!"
        );
    }

    #[test]
    fn reviewing_and_rejected_use_their_verdicts() {
        let reviewing = json!({"status": "reviewing", "homework_name": "HW"});
        assert_eq!(
            parse_status(&reviewing).expect("valid record"),
            "Изменился статус проверки работы \"HW\". Работа взята на проверку ревьюером."
        );

        let rejected = json!({"status": "rejected", "homework_name": "HW"});
        assert_eq!(
            parse_status(&rejected).expect("valid record"),
            "Изменился статус проверки работы \"HW\". \
             Работа проверена: у ревьюера есть замечания."
        );
    }

    #[test]
    fn missing_status_is_reported() {
        let err = parse_status(&json!({"homework_name": "X"})).expect_err("no status");
        assert_eq!(err, StatusError::MissingField("status"));
    }

    #[test]
    fn missing_name_is_reported() {
        let err = parse_status(&json!({"status": "approved"})).expect_err("no name");
        assert_eq!(err, StatusError::MissingField("homework_name"));
    }

    #[test]
    fn unknown_verdict_is_rejected() {
        let err = parse_status(&json!({"status": "unknown_code", "homework_name": "X"}))
            .expect_err("code outside the verdict table");
        assert_eq!(err, StatusError::UnknownVerdict("unknown_code".to_owned()));
    }
}
