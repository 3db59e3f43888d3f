use crate::{Event, MockBackend, Person};
use quarry::{
    ConnectionState, IsolationLevel, KeyValues, Options, QuarryError, Session, SqlWriter, col,
};
use std::sync::Arc;

fn person() -> Person {
    Person {
        id: 3,
        first_name: "Ada".into(),
        last_name: "Byron".into(),
        age: 36,
    }
}

pub fn transactions(writer: Arc<dyn SqlWriter>) {
    let backend = MockBackend::new();
    let mut session = Session::new(backend.connection(), writer, backend.executor());

    // Nested levels share one physical transaction
    {
        let mut outer = session
            .begin_transaction(Some(IsolationLevel::Serializable))
            .expect("Could not begin");
        assert_eq!(outer.depth(), 1);
        assert_eq!(outer.transaction_depth(), 1);
        outer
            .insert(&person(), &Options::new())
            .expect("Insert failed");
        {
            let inner = outer
                .begin_transaction(Some(IsolationLevel::ReadCommitted))
                .expect("Could not begin nested");
            assert_eq!(inner.depth(), 2);
            assert_eq!(inner.isolation_level(), Some(IsolationLevel::Serializable));
            inner.commit().expect("Nested commit failed");
        }
        assert_eq!(outer.transaction_depth(), 1);
        assert_eq!(outer.state(), ConnectionState::Open);
        outer.commit().expect("Commit failed");
    }
    assert_eq!(session.transaction_depth(), 0);
    assert!(!session.in_transaction());
    assert_eq!(session.state(), ConnectionState::Closed);
    let events = backend.take_events();
    assert!(matches!(
        events.as_slice(),
        [
            Event::Open,
            Event::Begin(Some(IsolationLevel::Serializable)),
            Event::Execute {
                in_transaction: true,
                ..
            },
            Event::Commit,
            Event::Close,
        ]
    ));

    // Depth is begins minus commits
    {
        let mut first = session.begin_transaction(None).expect("Could not begin");
        {
            let mut second = first.begin_transaction(None).expect("Could not begin");
            {
                let third = second.begin_transaction(None).expect("Could not begin");
                assert_eq!(third.transaction_depth(), 3);
                third.commit().expect("Commit failed");
            }
            assert_eq!(second.transaction_depth(), 2);
            second.commit().expect("Commit failed");
        }
        assert_eq!(first.transaction_depth(), 1);
        assert!(first.in_transaction());
        // Dropped without commit
    }
    assert_eq!(session.transaction_depth(), 0);
    assert_eq!(
        backend.take_events(),
        [Event::Open, Event::Begin(None), Event::Rollback, Event::Close]
    );

    // Rollback of a nested level ends the whole transaction
    {
        let mut outer = session.begin_transaction(None).expect("Could not begin");
        {
            let inner = outer.begin_transaction(None).expect("Could not begin");
            inner.rollback().expect("Rollback failed");
        }
        assert_eq!(outer.transaction_depth(), 0);
        assert!(!outer.in_transaction());
        outer
            .delete_by_key::<Person>(&KeyValues::new().with("id", 3), &Options::new())
            .expect("Delete failed");
        let error = outer
            .commit()
            .expect_err("The transaction of this level was rolled back");
        assert!(matches!(
            error.downcast_ref::<QuarryError>(),
            Some(QuarryError::ResourceState(..))
        ));
    }
    let events = backend.take_events();
    assert!(matches!(
        events.as_slice(),
        [
            Event::Open,
            Event::Begin(None),
            Event::Rollback,
            Event::Close,
            Event::Open,
            Event::Execute {
                in_transaction: false,
                ..
            },
            Event::Close,
        ]
    ));

    // Dropping a nested level rolls back and the outer level cannot commit anymore
    {
        let mut outer = session.begin_transaction(None).expect("Could not begin");
        outer
            .insert(&person(), &Options::new())
            .expect("Insert failed");
        {
            let _inner = outer.begin_transaction(None).expect("Could not begin");
        }
        assert!(!outer.in_transaction());
        outer
            .insert(&person(), &Options::new())
            .expect("Insert failed");
        let error = outer
            .commit()
            .expect_err("The transaction of this level was rolled back");
        assert!(matches!(
            error.downcast_ref::<QuarryError>(),
            Some(QuarryError::ResourceState(..))
        ));
    }
    let events = backend.take_events();
    assert!(matches!(
        events.as_slice(),
        [
            Event::Open,
            Event::Begin(None),
            Event::Execute {
                in_transaction: true,
                ..
            },
            Event::Rollback,
            Event::Close,
            Event::Open,
            Event::Execute {
                in_transaction: false,
                ..
            },
            Event::Close,
        ]
    ));

    // A stale level does not touch a newer transaction
    {
        let mut outer = session.begin_transaction(None).expect("Could not begin");
        {
            let inner = outer.begin_transaction(None).expect("Could not begin");
            inner.rollback().expect("Rollback failed");
        }
        {
            let fresh = outer.begin_transaction(None).expect("Could not begin");
            assert_eq!(fresh.depth(), 1);
            fresh.commit().expect("Commit failed");
        }
        assert!(outer.commit().is_err());
    }
    assert_eq!(
        backend.take_events(),
        [
            Event::Open,
            Event::Begin(None),
            Event::Rollback,
            Event::Close,
            Event::Open,
            Event::Begin(None),
            Event::Commit,
            Event::Close,
        ]
    );

    // Rollback without transaction
    {
        let mut outer = session.begin_transaction(None).expect("Could not begin");
        {
            let inner = outer.begin_transaction(None).expect("Could not begin");
            inner.rollback().expect("Rollback failed");
        }
        let error = outer
            .rollback()
            .expect_err("Nothing is left to roll back");
        assert!(matches!(
            error.downcast_ref::<QuarryError>(),
            Some(QuarryError::ResourceState(..))
        ));
    }
    backend.take_events();

    // Connection opened by the caller is left open
    session.open().expect("Could not open");
    {
        let mut transaction = session.begin_transaction(None).expect("Could not begin");
        transaction
            .update(&person(), &Options::new())
            .expect("Update failed");
        transaction.commit().expect("Commit failed");
    }
    assert_eq!(session.state(), ConnectionState::Open);
    let events = backend.take_events();
    assert!(matches!(
        events.as_slice(),
        [
            Event::Open,
            Event::Begin(None),
            Event::Execute {
                in_transaction: true,
                ..
            },
            Event::Commit,
        ]
    ));
    let error = {
        let mut transaction = session.begin_transaction(None).expect("Could not begin");
        let error = transaction
            .close()
            .expect_err("Closing inside a transaction must fail");
        transaction.commit().expect("Commit failed");
        error
    };
    assert!(matches!(
        error.downcast_ref::<QuarryError>(),
        Some(QuarryError::ResourceState(..))
    ));
    session.close().expect("Could not close");
    backend.take_events();

    // Failed begin releases the connection
    backend.fail_begin();
    assert!(session.begin_transaction(None).is_err());
    assert_eq!(session.transaction_depth(), 0);
    assert_eq!(backend.take_events(), [Event::Open, Event::Close]);

    // Statement failure inside a transaction leaves it to the caller
    {
        let mut transaction = session.begin_transaction(None).expect("Could not begin");
        backend.fail_next("deadlock detected");
        assert!(
            transaction
                .query_where::<Person>(col("age").ge(18), &Options::new())
                .is_err()
        );
        assert!(transaction.in_transaction());
        transaction.rollback().expect("Rollback failed");
    }
    assert_eq!(
        backend.take_events(),
        [Event::Open, Event::Begin(None), Event::Rollback, Event::Close]
    );

    // Dispose rolls back
    {
        let mut transaction = session.begin_transaction(None).expect("Could not begin");
        transaction.dispose().expect("Could not dispose");
        assert!(transaction.is_disposed());
    }
    assert_eq!(
        backend.take_events(),
        [Event::Open, Event::Begin(None), Event::Rollback, Event::Close]
    );
}
