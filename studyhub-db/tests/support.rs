use studyhub_catalog::*;
use studyhub_db::*;

fn setup_db() -> rusqlite::Connection {
    let conn = open_memory().unwrap();
    for (id, name) in [(1, "Ada"), (2, "Support")] {
        insert_student(
            &conn,
            &Student {
                id,
                name: name.into(),
                email: format!("{name}@example.com"),
            },
        )
        .unwrap();
    }
    conn
}

#[test]
fn topic_conversation_in_order() {
    let conn = setup_db();
    let topic = open_topic(&conn, 1, "payments", "Refund", "I was charged twice").unwrap();
    reply_to_topic(&conn, topic, 2, "Looking into it").unwrap();
    reply_to_topic(&conn, topic, 1, "Thanks").unwrap();

    let messages = topic_messages(&conn, topic).unwrap();
    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["I was charged twice", "Looking into it", "Thanks"]);
    assert_eq!(messages[0].author_name, "Ada");
    assert_eq!(messages[1].author_id, 2);
}

#[test]
fn staff_reply_notifies_owner() {
    let conn = setup_db();
    let topic = open_topic(&conn, 1, "courses", "Broken video", "Module 3 video is 404").unwrap();
    reply_to_topic(&conn, topic, 1, "Still broken").unwrap();
    assert_eq!(count_unread(&conn, 1).unwrap(), 0);

    reply_to_topic(&conn, topic, 2, "Fixed").unwrap();
    let notes = notifications_of_student(&conn, 1, None).unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::SupportTopic);
    assert_eq!(notes[0].reference_id, Some(topic));
}

#[test]
fn closed_topic_rejects_replies() {
    let conn = setup_db();
    let topic = open_topic(&conn, 1, "other", "Hello", "Just saying hi").unwrap();
    close_topic(&conn, topic).unwrap();
    assert!(get_topic(&conn, topic).unwrap().unwrap().closed);
    assert!(matches!(
        reply_to_topic(&conn, topic, 2, "too late"),
        Err(OperationError::NotFound { .. })
    ));
}

#[test]
fn missing_topic() {
    let conn = setup_db();
    assert!(get_topic(&conn, 5).unwrap().is_none());
    assert!(topic_messages(&conn, 5).unwrap().is_empty());
    assert!(matches!(
        close_topic(&conn, 5),
        Err(OperationError::NotFound { .. })
    ));
    assert!(matches!(
        open_topic(&conn, 0, "x", "y", "z"),
        Err(OperationError::InvalidArgument { .. })
    ));
}
