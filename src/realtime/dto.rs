use serde::{Deserialize, Serialize};

use crate::classes::repo::Class;
use crate::homework::dto::Assignment;

/// Events a connected client may send after the upgrade.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundEvent {
    JoinClass(JoinClass),
    JoinStudent(JoinStudent),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinClass {
    pub class_name: String,
    pub section: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinStudent {
    pub student_id: String,
}

/// Events pushed to clients. `new_task` goes to a single student room,
/// `new_class` to every connection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    NewTask(Assignment),
    NewClass(Class),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_join_class() {
        let event: InboundEvent = serde_json::from_str(
            r#"{"event":"join_class","data":{"className":"Hifz 3","section":"A"}}"#,
        )
        .unwrap();
        match event {
            InboundEvent::JoinClass(join) => {
                assert_eq!(join.class_name, "Hifz 3");
                assert_eq!(join.section, "A");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn parses_join_student() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"event":"join_student","data":{"studentId":"S100"}}"#)
                .unwrap();
        match event {
            InboundEvent::JoinStudent(join) => assert_eq!(join.student_id, "S100"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_event() {
        assert!(serde_json::from_str::<InboundEvent>(r#"{"event":"noop","data":{}}"#).is_err());
    }
}
