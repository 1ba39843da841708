use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::homework::dto::{Assignment, AssignmentPayload, SurahPayload, SurahRef};

pub const STATUS_ASSIGNED: &str = "assigned";
const DEFAULT_TYPE: &str = "lesson";
const DEFAULT_TITLE: &str = "Assignment";

/// Collapses any of the historically supported payload shapes into the
/// canonical assignment record.
///
/// Title precedence: explicit title, then a named start surah rendered as
/// "Surah {name} ({startVerse}-{endVerse})", then a name synthesized from a
/// numeric code or the legacy `selectedSurah` value, then "Assignment".
/// The verse range is appended only when both bounds are present.
pub fn normalize_assignment(
    payload: &AssignmentPayload,
    student_id: &str,
    default_teacher: Option<Uuid>,
    now: OffsetDateTime,
) -> Assignment {
    let start_named = payload
        .start_surah
        .as_ref()
        .and_then(|s| s.name.as_deref())
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let start_synth = payload
        .start_surah
        .as_ref()
        .and_then(|s| s.number)
        .map(|n| format!("Surah {n}"))
        .or_else(|| {
            payload
                .selected_surah
                .as_ref()
                .map(|s| format!("Surah {}", s.trim()))
        });

    let end_named = payload
        .end_surah
        .as_ref()
        .and_then(|s| s.name.as_deref())
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let end_synth = payload
        .end_surah
        .as_ref()
        .and_then(|s| s.number)
        .map(|n| format!("Surah {n}"))
        .or_else(|| {
            payload
                .selected_surah
                .as_ref()
                .map(|s| format!("Surah {}", s.trim()))
        });

    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| {
            start_named
                .as_ref()
                .map(|n| with_verse_range(format!("Surah {n}"), payload))
        })
        .or_else(|| start_synth.clone().map(|n| with_verse_range(n, payload)))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let start_surah = SurahRef {
        name: start_named
            .or(start_synth)
            .unwrap_or_else(|| title.clone()),
    };
    let end_surah = SurahRef {
        name: end_named.or(end_synth).unwrap_or_else(|| title.clone()),
    };

    let activity_type = payload
        .activity_type
        .clone()
        .or_else(|| payload.legacy_type.clone())
        .unwrap_or_else(|| DEFAULT_TYPE.to_string());

    Assignment {
        student_id: student_id.to_string(),
        teacher_id: payload.teacher_id.or(default_teacher),
        title,
        activity_type,
        description: payload.description.clone(),
        due_date: payload.due_date.clone(),
        start_surah,
        end_surah,
        start_verse: payload.start_verse,
        end_verse: payload.end_verse,
        status: STATUS_ASSIGNED.to_string(),
        created_at: now.format(&Rfc3339).unwrap_or_default(),
    }
}

fn with_verse_range(name: String, payload: &AssignmentPayload) -> String {
    match (payload.start_verse, payload.end_verse) {
        (Some(start), Some(end)) => format!("{name} ({start}-{end})"),
        _ => name,
    }
}

/// Case-insensitive status filter shared by every read path. An absent or
/// empty filter matches everything.
pub fn matches_status(assignment: &Assignment, filter: Option<&str>) -> bool {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(f) => assignment.status.eq_ignore_ascii_case(f),
        None => true,
    }
}

/// Turns the per-student snapshot into the wire-facing list. A student only
/// ever carries the most recent assignment, so the result holds zero or one
/// records after the status filter is applied.
pub fn snapshot_assignments(snapshot: Option<Assignment>, status: Option<&str>) -> Vec<Assignment> {
    snapshot
        .into_iter()
        .filter(|a| matches_status(a, status))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn normalize(payload: AssignmentPayload) -> Assignment {
        normalize_assignment(&payload, "S100", None, datetime!(2025-03-01 12:00:00 UTC))
    }

    #[test]
    fn selected_surah_code_only() {
        let assignment = normalize(AssignmentPayload {
            student_id: Some("S100".into()),
            selected_surah: Some("2".into()),
            ..Default::default()
        });
        assert_eq!(assignment.title, "Surah 2");
        assert_eq!(assignment.start_surah.name, "Surah 2");
        assert_eq!(assignment.end_surah.name, "Surah 2");
        assert_eq!(assignment.activity_type, "lesson");
        assert_eq!(assignment.status, "assigned");
    }

    #[test]
    fn named_start_surah_with_verses() {
        let assignment = normalize(AssignmentPayload {
            start_surah: Some(SurahPayload {
                name: Some("Baqarah".into()),
                number: None,
            }),
            start_verse: Some(1),
            end_verse: Some(5),
            ..Default::default()
        });
        assert_eq!(assignment.title, "Surah Baqarah (1-5)");
        assert_eq!(assignment.start_surah.name, "Baqarah");
        assert_eq!(assignment.start_verse, Some(1));
        assert_eq!(assignment.end_verse, Some(5));
    }

    #[test]
    fn numeric_start_surah_with_verses() {
        let assignment = normalize(AssignmentPayload {
            start_surah: Some(SurahPayload {
                name: None,
                number: Some(2),
            }),
            start_verse: Some(10),
            end_verse: Some(20),
            ..Default::default()
        });
        assert_eq!(assignment.title, "Surah 2 (10-20)");
        assert_eq!(assignment.start_surah.name, "Surah 2");
        assert_eq!(assignment.activity_type, "lesson");
        assert_eq!(assignment.status, "assigned");
        assert_eq!(assignment.start_verse, Some(10));
        assert_eq!(assignment.end_verse, Some(20));
    }

    #[test]
    fn explicit_title_wins() {
        let assignment = normalize(AssignmentPayload {
            title: Some("Weekly revision".into()),
            start_surah: Some(SurahPayload {
                name: Some("Baqarah".into()),
                number: None,
            }),
            start_verse: Some(1),
            end_verse: Some(5),
            ..Default::default()
        });
        assert_eq!(assignment.title, "Weekly revision");
        assert_eq!(assignment.start_surah.name, "Baqarah");
    }

    #[test]
    fn type_precedence() {
        let assignment = normalize(AssignmentPayload {
            activity_type: Some("sabak".into()),
            legacy_type: Some("revision".into()),
            ..Default::default()
        });
        assert_eq!(assignment.activity_type, "sabak");

        let assignment = normalize(AssignmentPayload {
            legacy_type: Some("manzil".into()),
            ..Default::default()
        });
        assert_eq!(assignment.activity_type, "manzil");
    }

    #[test]
    fn bare_payload_falls_back_to_defaults() {
        let assignment = normalize(AssignmentPayload::default());
        assert_eq!(assignment.title, "Assignment");
        assert_eq!(assignment.start_surah.name, "Assignment");
        assert_eq!(assignment.activity_type, "lesson");
        assert_eq!(assignment.start_verse, None);
        assert_eq!(assignment.end_verse, None);
    }

    #[test]
    fn single_verse_bound_does_not_render_a_range() {
        let assignment = normalize(AssignmentPayload {
            start_surah: Some(SurahPayload {
                name: Some("Mulk".into()),
                number: None,
            }),
            start_verse: Some(1),
            ..Default::default()
        });
        assert_eq!(assignment.title, "Surah Mulk");
    }

    #[test]
    fn default_teacher_used_when_payload_has_none() {
        let teacher = Uuid::new_v4();
        let assignment = normalize_assignment(
            &AssignmentPayload::default(),
            "S100",
            Some(teacher),
            datetime!(2025-03-01 12:00:00 UTC),
        );
        assert_eq!(assignment.teacher_id, Some(teacher));
    }

    #[test]
    fn created_at_is_rfc3339() {
        let assignment = normalize(AssignmentPayload::default());
        assert_eq!(assignment.created_at, "2025-03-01T12:00:00Z");
    }

    #[test]
    fn absent_verses_serialize_as_null() {
        let value = serde_json::to_value(normalize(AssignmentPayload {
            selected_surah: Some("2".into()),
            ..Default::default()
        }))
        .unwrap();
        assert!(value.as_object().unwrap().contains_key("startVerse"));
        assert!(value["startVerse"].is_null());
        assert!(value["endVerse"].is_null());
        assert_eq!(value["type"], "lesson");
        assert_eq!(value["startSurah"]["name"], "Surah 2");
    }

    #[test]
    fn no_snapshot_yields_an_empty_list() {
        assert!(snapshot_assignments(None, None).is_empty());
        assert!(snapshot_assignments(None, Some("assigned")).is_empty());
    }

    #[test]
    fn snapshot_hidden_when_status_does_not_match() {
        let assignment = normalize(AssignmentPayload::default());
        assert!(snapshot_assignments(Some(assignment), Some("completed")).is_empty());
    }

    #[test]
    fn snapshot_listed_when_status_matches_any_case() {
        let assignment = normalize(AssignmentPayload::default());
        let listed = snapshot_assignments(Some(assignment), Some("ASSIGNED"));
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, "assigned");
    }

    #[test]
    fn newer_snapshot_replaces_the_previous_assignment() {
        let first = normalize(AssignmentPayload {
            title: Some("Morning sabak".into()),
            ..Default::default()
        });
        let second = normalize(AssignmentPayload {
            title: Some("Evening revision".into()),
            ..Default::default()
        });

        // The store keeps a single JSONB snapshot per student, so a second
        // assignment overwrites the first and only the newest is listed.
        let mut snapshot = Some(first);
        let previous = snapshot.replace(second);
        assert_eq!(previous.unwrap().title, "Morning sabak");
        let listed = snapshot_assignments(snapshot, None);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Evening revision");
    }

    #[test]
    fn status_filter_is_case_insensitive() {
        let assignment = normalize(AssignmentPayload::default());
        assert!(matches_status(&assignment, None));
        assert!(matches_status(&assignment, Some("")));
        assert!(matches_status(&assignment, Some("assigned")));
        assert!(matches_status(&assignment, Some("ASSIGNED")));
        assert!(matches_status(&assignment, Some("Assigned")));
        assert!(!matches_status(&assignment, Some("completed")));
    }
}
