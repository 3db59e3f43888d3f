use crate::{Event, MockBackend, Person};
use quarry::{ConnectionState, Options, QuarryError, Session, SqlWriter, col};
use std::sync::Arc;

fn person() -> Person {
    Person {
        id: 0,
        first_name: "Joe".into(),
        last_name: "Smith".into(),
        age: 25,
    }
}

pub fn lifecycle(writer: Arc<dyn SqlWriter>) {
    let backend = MockBackend::new();
    let mut session = Session::new(backend.connection(), writer, backend.executor());
    assert_eq!(session.state(), ConnectionState::Closed);

    // Each operation opens and closes
    let people = session
        .query_where::<Person>(col("age").gt(30), &Options::new())
        .expect("Query failed");
    assert!(people.is_empty());
    let events = backend.take_events();
    assert!(matches!(
        events.as_slice(),
        [
            Event::Open,
            Event::Fetch {
                in_transaction: false,
                ..
            },
            Event::Close
        ]
    ));
    assert_eq!(session.state(), ConnectionState::Closed);

    // Opened by the caller, stays open
    session.open().expect("Could not open");
    session.open().expect("Opening twice must be a no-op");
    session
        .insert(&person(), &Options::new())
        .expect("Insert failed");
    session
        .insert(&person(), &Options::new())
        .expect("Insert failed");
    let events = backend.take_events();
    assert!(matches!(
        events.as_slice(),
        [Event::Open, Event::Execute { .. }, Event::Execute { .. }]
    ));
    assert_eq!(session.state(), ConnectionState::Open);
    session.close().expect("Could not close");
    session.close().expect("Closing twice must be a no-op");
    assert_eq!(backend.take_events(), [Event::Close]);

    // Closed also when the statement fails
    backend.fail_next("connection reset by peer");
    let error = session
        .insert(&person(), &Options::new())
        .expect_err("The insert should fail");
    assert!(format!("{:#}", error).contains("connection reset by peer"));
    assert_eq!(backend.take_events(), [Event::Open, Event::Close]);
    assert_eq!(session.state(), ConnectionState::Closed);

    // Broken connection is closed before reopening
    backend.break_connection();
    assert_eq!(session.state(), ConnectionState::Broken);
    session
        .delete_where::<Person>(&col("age").lt(18), &Options::new())
        .expect("Delete failed");
    let events = backend.take_events();
    assert!(matches!(
        events.as_slice(),
        [
            Event::Close,
            Event::Open,
            Event::Execute { .. },
            Event::Close
        ]
    ));

    // Disposed
    session.dispose().expect("Could not dispose");
    session.dispose().expect("Disposing twice must be a no-op");
    assert!(session.is_disposed());
    let error = session
        .insert(&person(), &Options::new())
        .expect_err("A disposed session must refuse work");
    assert!(matches!(
        error.downcast_ref::<QuarryError>(),
        Some(QuarryError::ResourceState(..))
    ));
    let error = session
        .begin_transaction(None)
        .err()
        .expect("A disposed session must refuse transactions");
    assert!(matches!(
        error.downcast_ref::<QuarryError>(),
        Some(QuarryError::ResourceState(..))
    ));
    assert!(backend.take_events().is_empty());
}
