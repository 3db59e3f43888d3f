#[cfg(test)]
mod tests {
    use indoc::indoc;
    use quarry::{
        DeleteFilter, Entity, KeyValues, Options, QuarryError, SqlWriter, StatementBuilder, Value,
        col,
    };
    use quarry_mssql::SqlServerSqlWriter;
    use quarry_postgres::{CaseFolding, PostgresSqlWriter};
    use rust_decimal::Decimal;

    #[derive(Entity)]
    #[quarry(name = "Person")]
    struct Person {
        #[quarry(name = "Id", primary_key, identity)]
        id: i32,
        #[quarry(name = "FirstName")]
        first_name: String,
        #[quarry(name = "LastName")]
        last_name: String,
        #[quarry(name = "Age")]
        age: i32,
    }

    #[derive(Entity)]
    #[quarry(name = "T")]
    struct Tally {
        #[quarry(name = "Id", primary_key)]
        id: i32,
        #[quarry(name = "Age")]
        age: i32,
    }

    #[derive(Entity)]
    #[quarry(name = "Citizen", schema = "registry")]
    struct Citizen {
        #[quarry(name = "Id", primary_key)]
        id: i64,
        #[quarry(name = "SSN", primary_key)]
        ssn: String,
        #[quarry(name = "Name")]
        name: String,
    }

    #[derive(Entity)]
    #[quarry(name = "Invoice")]
    struct Invoice {
        #[quarry(name = "Id", primary_key, identity)]
        id: i64,
        #[quarry(name = "PersonId")]
        person_id: i32,
        #[quarry(name = "Amount")]
        amount: Decimal,
        #[quarry(name = "Total", computed)]
        total: Decimal,
        #[quarry(not_mapped)]
        note: String,
    }

    #[derive(Entity)]
    struct AuditEntry {
        message: String,
        level: i16,
    }

    #[derive(Entity)]
    #[quarry(name = "Tag")]
    struct Tag {
        #[quarry(name = "Id", primary_key, identity)]
        id: i32,
    }

    const POSTGRES: PostgresSqlWriter = PostgresSqlWriter {
        case: CaseFolding::None,
    };
    const MSSQL: SqlServerSqlWriter = SqlServerSqlWriter {};

    fn joe() -> Person {
        Person {
            id: 0,
            first_name: "Joe".into(),
            last_name: "Smith".into(),
            age: 25,
        }
    }

    fn citizen() -> Citizen {
        Citizen {
            id: 1,
            ssn: "abc".into(),
            name: "Alan".into(),
        }
    }

    fn invoice() -> Invoice {
        Invoice {
            id: 4,
            person_id: 7,
            amount: Decimal::new(1999, 2),
            total: Decimal::new(2439, 2),
            note: "draft".into(),
        }
    }

    fn read_back() -> Options {
        Options::new().select_after_mutation(true)
    }

    fn error_kind(error: &quarry::Error) -> Option<&QuarryError> {
        error.downcast_ref::<QuarryError>()
    }

    #[test]
    fn insert_with_generated_key() {
        let statement = StatementBuilder::new(&POSTGRES)
            .insert(&joe(), &read_back())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                INSERT INTO "Person" ("FirstName", "LastName", "Age") VALUES (@FirstName, @LastName, @Age); SELECT * FROM "Person" WHERE "Id" = currval(pg_get_serial_sequence('"Person"', 'Id'))
            "#}
            .trim_end()
        );
        assert_eq!(
            statement
                .parameters
                .iter()
                .map(|(k, v)| (k, v.clone()))
                .collect::<Vec<_>>(),
            [
                ("@FirstName", Value::from("Joe")),
                ("@LastName", Value::from("Smith")),
                ("@Age", Value::from(25)),
            ]
        );

        let statement = StatementBuilder::new(&MSSQL)
            .insert(&joe(), &read_back())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            indoc! {"
                INSERT INTO [Person] ([FirstName], [LastName], [Age]) VALUES (@FirstName, @LastName, @Age); SELECT * FROM [Person] WHERE [Id] = SCOPE_IDENTITY()
            "}
            .trim_end()
        );
        assert_eq!(statement.parameters.len(), 3);
    }

    #[test]
    fn insert_without_read_back() {
        let statement = StatementBuilder::new(&POSTGRES)
            .insert(&joe(), &Options::new())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            r#"INSERT INTO "Person" ("FirstName", "LastName", "Age") VALUES (@FirstName, @LastName, @Age)"#
        );
        let statement = StatementBuilder::new(&MSSQL)
            .insert(&invoice(), &read_back())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            "INSERT INTO [Invoice] ([PersonId], [Amount]) VALUES (@PersonId, @Amount); SELECT * FROM [Invoice] WHERE [Id] = SCOPE_IDENTITY()"
        );
        assert_eq!(
            statement.parameters.values().cloned().collect::<Vec<_>>(),
            [Value::from(7), Value::from(Decimal::new(1999, 2))]
        );
    }

    #[test]
    fn insert_with_natural_key() {
        let statement = StatementBuilder::new(&POSTGRES)
            .insert(&citizen(), &read_back())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                INSERT INTO "registry"."Citizen" ("Id", "SSN", "Name") VALUES (@Id, @SSN, @Name); SELECT * FROM "registry"."Citizen" WHERE "Id" = @Id AND "SSN" = @SSN
            "#}
            .trim_end()
        );
        assert_eq!(statement.parameters.len(), 3);
    }

    #[test]
    fn insert_only_generated() {
        let statement = StatementBuilder::new(&MSSQL)
            .insert(&Tag { id: 0 }, &Options::new())
            .expect("Could not render");
        assert_eq!(statement.sql, "INSERT INTO [Tag] DEFAULT VALUES");
        assert!(statement.parameters.is_empty());
    }

    #[test]
    fn insert_keyless() {
        let statement = StatementBuilder::new(&POSTGRES)
            .insert(
                &AuditEntry {
                    message: "started".into(),
                    level: 2,
                },
                &read_back(),
            )
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            r#"INSERT INTO "AuditEntry" ("message", "level") VALUES (@message, @level)"#
        );
    }

    #[test]
    fn insert_table_override() {
        let statement = StatementBuilder::new(&POSTGRES)
            .insert(&joe(), &read_back().table_name("archive.Person"))
            .expect("Could not render");
        assert!(statement.sql.starts_with(r#"INSERT INTO "archive"."Person" ("#));
        assert!(statement.sql.ends_with(
            r#"WHERE "Id" = currval(pg_get_serial_sequence('"archive"."Person"', 'Id'))"#
        ));
    }

    #[test]
    fn update_by_key() {
        let statement = StatementBuilder::new(&MSSQL)
            .update(&Tally { id: 7, age: 31 }, &read_back())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            "UPDATE [T] SET [Age] = @Age WHERE [Id] = @Id; SELECT * FROM [T] WHERE [Id] = @Id"
        );
        assert_eq!(
            statement
                .parameters
                .iter()
                .map(|(k, v)| (k, v.clone()))
                .collect::<Vec<_>>(),
            [("@Age", Value::from(31)), ("@Id", Value::from(7))]
        );
        let statement = StatementBuilder::new(&POSTGRES)
            .update(&Tally { id: 7, age: 31 }, &Options::new())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            r#"UPDATE "T" SET "Age" = @Age WHERE "Id" = @Id"#
        );
    }

    #[test]
    fn update_skips_generated_and_not_mapped() {
        let statement = StatementBuilder::new(&POSTGRES)
            .update(&invoice(), &Options::new())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            r#"UPDATE "Invoice" SET "PersonId" = @PersonId, "Amount" = @Amount WHERE "Id" = @Id"#
        );
        assert_eq!(statement.parameters.get("@Id"), Some(&Value::Int64(Some(4))));

        let statement = StatementBuilder::new(&MSSQL)
            .update(&citizen(), &Options::new())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            "UPDATE [registry].[Citizen] SET [Name] = @Name WHERE [Id] = @Id AND [SSN] = @SSN"
        );
    }

    #[test]
    fn update_with_predicate() {
        let statement = StatementBuilder::new(&POSTGRES)
            .update_where(&joe(), &col("last_name").eq("Smith"), &Options::new())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                UPDATE "Person" SET "FirstName" = @FirstName, "LastName" = @LastName, "Age" = @Age WHERE "LastName" = @p3
            "#}
            .trim_end()
        );
        assert_eq!(
            statement.parameters.names().collect::<Vec<_>>(),
            ["@FirstName", "@LastName", "@Age", "@p3"]
        );

        let statement = StatementBuilder::new(&MSSQL)
            .update_where(&Tally { id: 7, age: 40 }, &col("age").lt(40), &read_back())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            "UPDATE [T] SET [Age] = @Age WHERE [Age] < @p1; SELECT * FROM [T] WHERE [Id] = @Id"
        );
    }

    #[test]
    fn update_errors() {
        let builder = StatementBuilder::new(&POSTGRES);
        let error = builder
            .update(
                &AuditEntry {
                    message: "m".into(),
                    level: 1,
                },
                &Options::new(),
            )
            .expect_err("Keyless entities have nothing to match");
        assert!(matches!(error_kind(&error), Some(QuarryError::Configuration(..))));
        let error = builder
            .update(&Tag { id: 1 }, &Options::new())
            .expect_err("Nothing to set");
        assert!(matches!(error_kind(&error), Some(QuarryError::Configuration(..))));
        let error = builder
            .update_where(
                &joe(),
                &col("age").gt(1).or(col("age").lt(0)),
                &Options::new(),
            )
            .expect_err("Only one comparison is accepted");
        assert!(matches!(
            error_kind(&error),
            Some(QuarryError::UnsupportedExpression(..))
        ));
        let error = builder
            .update_where(&joe(), &col("id").is_in([1, 2]), &Options::new())
            .expect_err("Only one comparison is accepted");
        assert!(matches!(
            error_kind(&error),
            Some(QuarryError::UnsupportedExpression(..))
        ));
        let error = builder
            .update_row(Person::entity_def(), &[Value::from(1)], &Options::new())
            .expect_err("The row does not match the definition");
        assert!(matches!(error_kind(&error), Some(QuarryError::Configuration(..))));
    }

    #[test]
    fn delete_by_keys() {
        // Terms follow the order of the supplied keys
        let keys = KeyValues::new().with("ssn", "abc").with("id", 1i64);
        let statement = StatementBuilder::new(&POSTGRES)
            .delete::<Citizen>(DeleteFilter::Keys(&keys), &Options::new())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            r#"DELETE FROM "registry"."Citizen" WHERE "SSN" = @SSN AND "Id" = @Id"#
        );
        assert_eq!(
            statement.parameters.values().cloned().collect::<Vec<_>>(),
            [Value::from("abc"), Value::from(1i64)]
        );

        let keys = KeyValues::new().with("Id", 1i64).with("SSN", "abc");
        let statement = StatementBuilder::new(&MSSQL)
            .delete::<Citizen>(DeleteFilter::Keys(&keys), &Options::new())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            "DELETE FROM [registry].[Citizen] WHERE [Id] = @Id AND [SSN] = @SSN"
        );
    }

    #[test]
    fn delete_entity() {
        let builder = StatementBuilder::new(&MSSQL);
        let statement = builder
            .delete_entity(&citizen(), &Options::new())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            "DELETE FROM [registry].[Citizen] WHERE [Id] = @Id AND [SSN] = @SSN"
        );
        let statement = builder
            .delete_entity(&invoice(), &Options::new().table_name("old.Invoice"))
            .expect("Could not render");
        assert_eq!(statement.sql, "DELETE FROM [old].[Invoice] WHERE [Id] = @Id");
        let error = builder
            .delete_entity(
                &AuditEntry {
                    message: "m".into(),
                    level: 1,
                },
                &Options::new(),
            )
            .expect_err("Keyless entities cannot be deleted by instance");
        assert!(matches!(error_kind(&error), Some(QuarryError::Configuration(..))));
    }

    #[test]
    fn delete_by_predicate() {
        let statement = StatementBuilder::new(&POSTGRES)
            .delete::<Person>(
                DeleteFilter::Predicate(&col("age").lt(18).or(col("last_name").is_in(["X"]))),
                &Options::new(),
            )
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            r#"DELETE FROM "Person" WHERE ("Age" < @p0) OR ("LastName" IN (@p1))"#
        );
        assert_eq!(statement.parameters.len(), 2);
    }

    #[test]
    fn delete_errors() {
        let builder = StatementBuilder::new(&POSTGRES);
        let error = builder
            .delete::<Person>(DeleteFilter::Keys(&KeyValues::new()), &Options::new())
            .expect_err("At least one key is needed");
        assert!(matches!(error_kind(&error), Some(QuarryError::Argument(..))));
        let error = builder
            .delete::<Person>(
                DeleteFilter::Predicate(&col("age").eq(col("id"))),
                &Options::new(),
            )
            .expect_err("Member against member is not translated");
        assert!(matches!(
            error_kind(&error),
            Some(QuarryError::UnsupportedExpression(..))
        ));
    }

    #[test]
    fn case_folded_read_back() {
        let writer = PostgresSqlWriter::with_case(CaseFolding::LowerSnake);
        let statement = StatementBuilder::new(&writer)
            .insert(&joe(), &read_back())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                INSERT INTO "person" ("first_name", "last_name", "age") VALUES (@FirstName, @LastName, @Age); SELECT "id" AS "Id", "first_name" AS "FirstName", "last_name" AS "LastName", "age" AS "Age" FROM "person" WHERE "id" = currval(pg_get_serial_sequence('"person"', 'id'))
            "#}
            .trim_end()
        );
        let statement = StatementBuilder::new(&writer)
            .update(&Tally { id: 1, age: 2 }, &read_back())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            r#"UPDATE "t" SET "age" = @Age WHERE "id" = @Id; SELECT "id" AS "Id", "age" AS "Age" FROM "t" WHERE "id" = @Id"#
        );
    }

    #[test]
    fn identifiers() {
        let writers: [&dyn SqlWriter; 2] = [&POSTGRES, &MSSQL];
        for writer in writers {
            let once = writer.format_column("FirstName");
            assert_eq!(writer.format_column(&once), once);
            let once = writer.format_table("dbo.Person");
            assert_eq!(writer.format_table(&once), once);
        }
        assert_eq!(POSTGRES.format_column(r#"odd"name"#), r#""odd""name""#);
        assert_eq!(MSSQL.format_column("odd]name"), "[odd]]name]");
        assert_eq!(MSSQL.format_table("[my.schema].Person"), "[my.schema].[Person]");
    }
}
