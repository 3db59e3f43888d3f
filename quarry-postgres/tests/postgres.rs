#[cfg(test)]
mod tests {
    use indoc::indoc;
    use quarry::{Options, Query, SqlWriter, StatementBuilder, col};
    use quarry_postgres::{CaseFolding, PostgresSqlWriter, lower_snake_case};
    use quarry_tests::{Citizen, Person, execute_tests, init_logs};
    use std::sync::Arc;

    fn joe() -> Person {
        Person {
            id: 0,
            first_name: "Joe".into(),
            last_name: "Smith".into(),
            age: 25,
        }
    }

    #[test]
    fn postgres() {
        init_logs();
        execute_tests(Arc::new(PostgresSqlWriter::new()));
        execute_tests(Arc::new(PostgresSqlWriter::with_case(CaseFolding::Lower)));
        execute_tests(Arc::new(PostgresSqlWriter::with_case(
            CaseFolding::LowerSnake,
        )));
    }

    #[test]
    fn identity_expression() {
        let writer = PostgresSqlWriter::new();
        assert_eq!(
            writer.identity_value_expression("Person", "Id"),
            r#"currval(pg_get_serial_sequence('"Person"', 'Id'))"#
        );
        assert_eq!(
            writer.identity_value_expression("sales.Order", "OrderId"),
            r#"currval(pg_get_serial_sequence('"sales"."Order"', 'OrderId'))"#
        );
        assert_eq!(
            writer.identity_value_expression("it's", "Id"),
            r#"currval(pg_get_serial_sequence('"it''s"', 'Id'))"#
        );
        let writer = PostgresSqlWriter::with_case(CaseFolding::Lower);
        assert_eq!(
            writer.identity_value_expression("Person", "Id"),
            r#"currval(pg_get_serial_sequence('"person"', 'id'))"#
        );
    }

    #[test]
    fn case_folding() {
        assert_eq!(lower_snake_case("FirstName"), "first_name");
        assert_eq!(lower_snake_case("SSN"), "ssn");
        assert_eq!(lower_snake_case("person_id"), "person_id");
        assert_eq!(lower_snake_case("Order Date"), "order_date");
        assert_eq!(lower_snake_case("Address2Line"), "address2_line");
        assert_eq!(lower_snake_case("_Id"), "id");

        let writer = PostgresSqlWriter::with_case(CaseFolding::Lower);
        assert_eq!(writer.fold_identifier("FirstName"), "firstname");
        assert_eq!(writer.format_column("FirstName"), r#""firstname""#);
        assert_eq!(writer.format_table("Sales.OrderLine"), r#""sales"."orderline""#);
        let writer = PostgresSqlWriter::new();
        assert_eq!(writer.fold_identifier("FirstName"), "FirstName");
    }

    #[test]
    fn lower_case_statements() {
        let writer: Arc<dyn SqlWriter> =
            Arc::new(PostgresSqlWriter::with_case(CaseFolding::Lower));
        let statement = Query::<Citizen>::new(writer.clone())
            .filter(col("ssn").eq("abc"))
            .skip(5)
            .to_sql()
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                SELECT "id" AS "Id", "ssn" AS "SSN", "name" AS "Name", "birthdate" AS "BirthDate" FROM "registry"."citizen" WHERE "ssn" = @p0 OFFSET 5
            "#}
            .trim_end()
        );
        let statement = StatementBuilder::new(writer.as_dyn())
            .update(&joe(), &Options::new())
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                UPDATE "person" SET "firstname" = @FirstName, "lastname" = @LastName, "age" = @Age WHERE "id" = @Id
            "#}
            .trim_end()
        );
    }

    #[test]
    fn insert_read_back() {
        let statement = StatementBuilder::new(&PostgresSqlWriter::new())
            .insert(&joe(), &Options::new().select_after_mutation(true))
            .expect("Could not render");
        assert_eq!(
            statement.sql,
            indoc! {r#"
                INSERT INTO "Person" ("FirstName", "LastName", "Age") VALUES (@FirstName, @LastName, @Age); SELECT * FROM "Person" WHERE "Id" = currval(pg_get_serial_sequence('"Person"', 'Id'))
            "#}
            .trim_end()
        );
    }
}
