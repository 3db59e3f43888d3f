use crate::{AuditEntry, Citizen, Event, Invoice, MockBackend, Person};
use quarry::{
    DeleteFilter, KeyValues, Options, QuarryError, RowLabeled, Session, SqlWriter,
    StatementBuilder, Value, col,
};
use rust_decimal::Decimal;
use std::sync::Arc;

fn joe() -> Person {
    Person {
        id: 7,
        first_name: "Joe".into(),
        last_name: "Smith".into(),
        age: 31,
    }
}

fn kind(error: &quarry::Error) -> Option<&QuarryError> {
    error.downcast_ref::<QuarryError>()
}

pub fn crud(writer: Arc<dyn SqlWriter>) {
    let backend = MockBackend::new();
    let mut session = Session::new(backend.connection(), writer.clone(), backend.executor());
    let builder = StatementBuilder::new(writer.as_dyn());

    // Lookup by id
    backend.push_rows(vec![joe().row_labeled()]);
    let found = session
        .get_by_id::<Person>(7, &Options::new())
        .expect("Lookup failed")
        .expect("Joe should be found");
    assert_eq!(found, joe());
    let expected = session
        .select::<Person>()
        .filter(col("id").eq(7))
        .to_sql()
        .expect("Could not render the select");
    assert_eq!(backend.statements(), [expected]);
    backend.take_events();

    // Nothing found
    assert_eq!(
        session
            .get_by_id::<Person>(8, &Options::new())
            .expect("Lookup failed"),
        None
    );
    backend.take_events();

    // More than one row
    backend.push_rows(vec![joe().row_labeled(), joe().row_labeled()]);
    assert!(
        session
            .get_by_key::<Person>(&KeyValues::new().with("Id", 7), &Options::new())
            .is_err()
    );
    backend.take_events();

    // Rows mapped in order
    let mut ada = joe();
    ada.id = 8;
    ada.first_name = "Ada".into();
    backend.push_rows(vec![joe().row_labeled(), ada.row_labeled()]);
    let people = session
        .query(&session.select::<Person>().order_by("id"))
        .expect("Query failed");
    assert_eq!(people, [joe(), ada.clone()]);
    backend.take_events();

    // Missing column
    let partial: RowLabeled = [("Id", Value::from(1)), ("FirstName", Value::from("A"))]
        .into_iter()
        .collect();
    backend.push_rows(vec![partial]);
    let error = session
        .query_where::<Person>(col("id").eq(1), &Options::new())
        .expect_err("A row without every column cannot be mapped");
    assert!(format!("{:#}", error).contains("Column `LastName` does not exist"));
    backend.take_events();

    // Insert and read back
    backend.push_rows(vec![joe().row_labeled()]);
    let inserted = session
        .insert_returning(
            &Person {
                id: 0,
                ..joe()
            },
            &Options::new(),
        )
        .expect("Insert failed");
    assert_eq!(inserted, Some(joe()));
    let expected = builder
        .insert(
            &Person {
                id: 0,
                ..joe()
            },
            &Options::new().select_after_mutation(true),
        )
        .expect("Could not render the insert");
    assert_eq!(backend.statements(), [expected]);
    backend.take_events();

    // Update and read back
    backend.push_rows(vec![joe().row_labeled()]);
    let updated = session
        .update_returning(&joe(), &Options::new())
        .expect("Update failed");
    assert_eq!(updated, Some(joe()));
    backend.take_events();

    // Row counts
    backend.set_rows_affected(3);
    assert_eq!(
        session
            .delete_where::<Person>(&col("age").gt(100), &Options::new())
            .expect("Delete failed"),
        3
    );
    assert_eq!(
        session
            .update_where(&joe(), &col("last_name").eq("Smith"), &Options::new())
            .expect("Update failed"),
        3
    );
    backend.set_rows_affected(1);
    let citizen = Citizen {
        id: 1,
        ssn: "abc".into(),
        name: "Alan".into(),
        birth_date: None,
    };
    assert_eq!(
        session
            .delete(&citizen, &Options::new())
            .expect("Delete failed"),
        1
    );
    let expected = builder
        .delete::<Citizen>(
            DeleteFilter::Keys(&KeyValues::new().with("id", 1i64).with("ssn", "abc")),
            &Options::new(),
        )
        .expect("Could not render the delete");
    assert_eq!(backend.statements().last(), Some(&expected));
    backend.take_events();

    // Table override
    session
        .insert(
            &Invoice {
                id: 0,
                person_id: 7,
                amount: Decimal::new(1999, 2),
                total: Decimal::ZERO,
                note: "not stored".into(),
            },
            &Options::new().table_name("archive.Invoice"),
        )
        .expect("Insert failed");
    let statement = backend
        .statements()
        .pop()
        .expect("The insert should be recorded");
    assert!(statement.sql.contains(&writer.format_table("archive.Invoice")));
    assert_eq!(
        statement.parameters.values().cloned().collect::<Vec<_>>(),
        [Value::from(7), Value::from(Decimal::new(1999, 2))]
    );
    backend.take_events();

    // Composite key, entries in any order
    let citizen = Citizen {
        id: 1,
        ssn: "abc".into(),
        name: "Alan".into(),
        birth_date: None,
    };
    backend.push_rows(vec![
        [
            ("Id", Value::from(1i64)),
            ("SSN", Value::from("abc")),
            ("Name", Value::from("Alan")),
            ("BirthDate", Value::Date(None)),
        ]
        .into_iter()
        .collect(),
    ]);
    let found = session
        .get_by_key::<Citizen>(
            &KeyValues::new().with("SSN", "abc").with("Id", 1i64),
            &Options::new(),
        )
        .expect("Lookup failed");
    assert_eq!(found, Some(citizen));
    let expected = session
        .select::<Citizen>()
        .filter(col("id").eq(1i64).and(col("ssn").eq("abc")))
        .to_sql()
        .expect("Could not render the select");
    assert_eq!(backend.statements(), [expected]);
    backend.take_events();

    // Configuration and argument errors are raised before touching the connection
    let error = session
        .get_by_id::<Citizen>(1i64, &Options::new())
        .expect_err("Composite keys cannot be looked up by id");
    assert!(matches!(kind(&error), Some(QuarryError::Configuration(..))));
    let error = session
        .get_by_key::<Citizen>(&KeyValues::new().with("Id", 1i64), &Options::new())
        .expect_err("Every key member must be supplied");
    assert!(matches!(kind(&error), Some(QuarryError::Argument(..))));
    let error = session
        .get_by_key::<Person>(&KeyValues::new().with("Age", 31), &Options::new())
        .expect_err("Only key members identify an entity");
    assert!(matches!(kind(&error), Some(QuarryError::Argument(..))));
    let error = session
        .get_by_key::<Citizen>(
            &KeyValues::new()
                .with("Id", 1i64)
                .with("SSN", "abc")
                .with("Name", "Alan"),
            &Options::new(),
        )
        .expect_err("Only key members identify an entity");
    assert!(matches!(kind(&error), Some(QuarryError::Argument(..))));
    let error = session
        .get_by_id::<AuditEntry>(1, &Options::new())
        .expect_err("Keyless entities cannot be looked up");
    assert!(matches!(kind(&error), Some(QuarryError::Configuration(..))));
    let error = session
        .delete(
            &AuditEntry {
                message: "m".into(),
                level: 1,
            },
            &Options::new(),
        )
        .expect_err("Keyless entities cannot be deleted by instance");
    assert!(matches!(kind(&error), Some(QuarryError::Configuration(..))));
    let error = session
        .update(
            &AuditEntry {
                message: "m".into(),
                level: 1,
            },
            &Options::new(),
        )
        .expect_err("Keyless entities cannot be updated");
    assert!(matches!(kind(&error), Some(QuarryError::Configuration(..))));
    let error = session
        .delete_by_key::<Person>(&KeyValues::new(), &Options::new())
        .expect_err("An empty key map is refused");
    assert!(matches!(kind(&error), Some(QuarryError::Argument(..))));
    let error = session
        .update_where(
            &joe(),
            &col("age").gt(1).and(col("age").lt(3)),
            &Options::new(),
        )
        .expect_err("Only a single comparison filters an update");
    assert!(matches!(
        kind(&error),
        Some(QuarryError::UnsupportedExpression(..))
    ));
    let error = session
        .query_where::<Person>(col("age").eq(col("id")), &Options::new())
        .expect_err("Member against member is not translated");
    assert!(matches!(
        kind(&error),
        Some(QuarryError::UnsupportedExpression(..))
    ));
    assert!(
        backend
            .take_events()
            .iter()
            .all(|v| !matches!(v, Event::Open))
    );
}
