use std::collections::HashSet;

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::classes::repo::Class;
use crate::homework::dto::Assignment;
use crate::realtime::dto::OutboundEvent;

pub type ConnId = Uuid;

/// Room-scoped fan-out for connected clients. Rooms are plain names:
/// class rooms are the class name and section concatenated, student rooms
/// are the student identifier. Membership lives only as long as the
/// connection; delivery is at-most-once with no queueing for absent members.
#[derive(Default)]
pub struct RealtimeHub {
    conns: DashMap<ConnId, mpsc::UnboundedSender<OutboundEvent>>,
    rooms: DashMap<String, HashSet<ConnId>>,
    joined: DashMap<ConnId, HashSet<String>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and hands back its outbound event stream.
    pub fn register(&self) -> (ConnId, mpsc::UnboundedReceiver<OutboundEvent>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.conns.insert(id, tx);
        (id, rx)
    }

    /// Drops a connection and its room memberships. A reconnecting client
    /// starts from scratch and must rejoin its rooms.
    pub fn unregister(&self, conn: ConnId) {
        self.conns.remove(&conn);
        if let Some((_, rooms)) = self.joined.remove(&conn) {
            for room in rooms {
                if let Some(mut members) = self.rooms.get_mut(&room) {
                    members.remove(&conn);
                }
            }
            self.rooms.retain(|_, members| !members.is_empty());
        }
    }

    pub fn join_class_room(&self, conn: ConnId, class_name: &str, section: &str) {
        self.join(conn, format!("{class_name}{section}"));
    }

    pub fn join_student_room(&self, conn: ConnId, student_id: &str) {
        self.join(conn, student_id.to_string());
    }

    fn join(&self, conn: ConnId, room: String) {
        if !self.conns.contains_key(&conn) {
            return;
        }
        self.rooms.entry(room.clone()).or_default().insert(conn);
        self.joined.entry(conn).or_default().insert(room);
    }

    /// Delivers the assignment to every current member of the student's
    /// room. An empty room is a valid no-op. Returns the delivery count.
    pub fn publish_new_assignment(&self, student_id: &str, assignment: &Assignment) -> usize {
        self.publish(student_id, OutboundEvent::NewTask(assignment.clone()))
    }

    /// Pushes a freshly created class to every connection.
    pub fn broadcast_new_class(&self, class: &Class) -> usize {
        let event = OutboundEvent::NewClass(class.clone());
        let mut delivered = 0;
        for entry in self.conns.iter() {
            if entry.value().send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    fn publish(&self, room: &str, event: OutboundEvent) -> usize {
        let Some(members) = self.rooms.get(room) else {
            return 0;
        };
        let mut delivered = 0;
        for conn in members.iter() {
            if let Some(tx) = self.conns.get(conn) {
                if tx.send(event.clone()).is_ok() {
                    delivered += 1;
                }
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::homework::dto::{AssignmentPayload, SurahPayload};
    use crate::homework::services::normalize_assignment;
    use time::macros::datetime;

    fn sample_assignment(student_id: &str) -> Assignment {
        normalize_assignment(
            &AssignmentPayload {
                start_surah: Some(SurahPayload {
                    name: Some("Baqarah".into()),
                    number: None,
                }),
                start_verse: Some(1),
                end_verse: Some(5),
                ..Default::default()
            },
            student_id,
            None,
            datetime!(2025-03-01 12:00:00 UTC),
        )
    }

    fn sample_class(name: &str) -> Class {
        Class {
            id: Uuid::new_v4(),
            name: name.into(),
            sections: vec!["A".into(), "B".into()],
            created_by: Uuid::new_v4(),
            created_at: time::OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn publish_to_empty_room_is_a_noop() {
        let hub = RealtimeHub::new();
        let delivered = hub.publish_new_assignment("S100", &sample_assignment("S100"));
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn student_room_member_receives_new_task() {
        let hub = RealtimeHub::new();
        let (conn, mut rx) = hub.register();
        hub.join_student_room(conn, "S100");

        let assignment = sample_assignment("S100");
        assert_eq!(hub.publish_new_assignment("S100", &assignment), 1);

        match rx.recv().await {
            Some(OutboundEvent::NewTask(received)) => {
                assert_eq!(received.title, "Surah Baqarah (1-5)");
                assert_eq!(received.student_id, "S100");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delivery_is_room_scoped() {
        let hub = RealtimeHub::new();
        let (first, mut first_rx) = hub.register();
        let (second, mut second_rx) = hub.register();
        hub.join_student_room(first, "S100");
        hub.join_student_room(second, "S200");

        assert_eq!(hub.publish_new_assignment("S100", &sample_assignment("S100")), 1);
        assert!(first_rx.recv().await.is_some());
        assert!(second_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn class_room_key_is_name_and_section() {
        let hub = RealtimeHub::new();
        let (conn, mut rx) = hub.register();
        hub.join_class_room(conn, "Hifz 3", "A");

        // Student rooms share the namespace, so a publish into the
        // concatenated key reaches the class observer.
        assert_eq!(hub.publish("Hifz 3A", OutboundEvent::NewClass(sample_class("Hifz 3"))), 1);
        assert!(rx.recv().await.is_some());
        assert_eq!(hub.publish("Hifz 3B", OutboundEvent::NewClass(sample_class("Hifz 3"))), 0);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connection() {
        let hub = RealtimeHub::new();
        let (_a, mut a_rx) = hub.register();
        let (b, mut b_rx) = hub.register();
        hub.join_student_room(b, "S100");

        assert_eq!(hub.broadcast_new_class(&sample_class("Hifz 1")), 2);
        assert!(matches!(a_rx.recv().await, Some(OutboundEvent::NewClass(_))));
        assert!(matches!(b_rx.recv().await, Some(OutboundEvent::NewClass(_))));
    }

    #[tokio::test]
    async fn disconnect_leaves_all_rooms() {
        let hub = RealtimeHub::new();
        let (conn, rx) = hub.register();
        hub.join_student_room(conn, "S100");
        hub.join_class_room(conn, "Hifz 3", "A");
        drop(rx);

        hub.unregister(conn);
        assert_eq!(hub.publish_new_assignment("S100", &sample_assignment("S100")), 0);

        // Joining requires a registered connection.
        hub.join_student_room(conn, "S100");
        assert_eq!(hub.publish_new_assignment("S100", &sample_assignment("S100")), 0);
    }

    #[tokio::test]
    async fn membership_survives_multiple_rooms() {
        let hub = RealtimeHub::new();
        let (conn, mut rx) = hub.register();
        hub.join_student_room(conn, "S100");
        hub.join_class_room(conn, "Hifz 3", "A");

        assert_eq!(hub.publish_new_assignment("S100", &sample_assignment("S100")), 1);
        assert!(rx.recv().await.is_some());
    }
}
