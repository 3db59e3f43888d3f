#[cfg(test)]
mod tests {
    use quarry::{
        Entity, Expression, Operand, Parameters, PredicateTranslator, QuarryError, Value, call, col,
        contains, val,
    };
    use quarry_mssql::SqlServerSqlWriter;
    use quarry_postgres::{CaseFolding, PostgresSqlWriter};

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

    const POSTGRES: PostgresSqlWriter = PostgresSqlWriter {
        case: CaseFolding::None,
    };
    const MSSQL: SqlServerSqlWriter = SqlServerSqlWriter {};

    fn translate(expression: &Expression) -> (String, Parameters) {
        let mut parameters = Parameters::new();
        let sql = PredicateTranslator::new(&POSTGRES, Person::entity_def())
            .translate(expression, &mut parameters)
            .expect("Expression should be translatable");
        (sql, parameters)
    }

    fn unsupported(expression: &Expression) -> bool {
        let mut parameters = Parameters::new();
        let error = PredicateTranslator::new(&POSTGRES, Person::entity_def())
            .translate(expression, &mut parameters)
            .expect_err("Expression should be refused");
        matches!(
            error.downcast_ref::<QuarryError>(),
            Some(QuarryError::UnsupportedExpression(..))
        )
    }

    #[test]
    fn comparisons() {
        let (sql, parameters) = translate(&col("age").gt(30));
        assert_eq!(sql, r#""Age" > @p0"#);
        assert_eq!(parameters.names().collect::<Vec<_>>(), ["@p0"]);
        assert_eq!(parameters.get("@p0"), Some(&Value::Int32(Some(30))));

        assert_eq!(translate(&col("first_name").eq("Joe")).0, r#""FirstName" = @p0"#);
        assert_eq!(translate(&col("LastName").ne("Smith")).0, r#""LastName" != @p0"#);
        assert_eq!(translate(&col("age").le(18)).0, r#""Age" <= @p0"#);
        assert_eq!(translate(&col("age").ge(18)).0, r#""Age" >= @p0"#);
        assert_eq!(translate(&col("age").lt(18)).0, r#""Age" < @p0"#);
    }

    #[test]
    fn constant_on_the_left() {
        // 30 < Age is Age > 30
        let (sql, parameters) = translate(&val(30).lt(col("age")));
        assert_eq!(sql, r#""Age" > @p0"#);
        assert_eq!(parameters.values().collect::<Vec<_>>(), [&Value::Int32(Some(30))]);
        assert_eq!(translate(&val(7).eq(col("id"))).0, r#""Id" = @p0"#);
        assert_eq!(translate(&val(7).ge(col("id"))).0, r#""Id" <= @p0"#);
    }

    #[test]
    fn logical_combinations() {
        let (sql, parameters) = translate(&col("age").gt(1).and(col("id").is_in([2, 3])));
        assert_eq!(sql, r#"("Age" > @p0) AND ("Id" IN (@p1, @p2))"#);
        assert_eq!(
            parameters.values().cloned().collect::<Vec<_>>(),
            [Value::from(1), Value::from(2), Value::from(3)]
        );

        let (sql, parameters) = translate(
            &col("first_name")
                .eq("Ada")
                .or(col("last_name").eq("Lovelace").and(col("age").lt(40))),
        );
        assert_eq!(
            sql,
            r#"("FirstName" = @p0) OR (("LastName" = @p1) AND ("Age" < @p2))"#
        );
        assert_eq!(
            parameters.values().cloned().collect::<Vec<_>>(),
            [Value::from("Ada"), Value::from("Lovelace"), Value::from(40)]
        );
    }

    #[test]
    fn membership() {
        let (sql, parameters) = translate(&col("last_name").is_in(["Smith", "Jones"]));
        assert_eq!(sql, r#""LastName" IN (@p0, @p1)"#);
        assert_eq!(parameters.len(), 2);
        assert_eq!(
            translate(&!col("age").is_in([18, 21])).0,
            r#""Age" NOT IN (@p0, @p1)"#
        );
        let list = Expression::from(Operand::List(vec![Value::from(4)]));
        assert_eq!(translate(&contains(list, col("id"))).0, r#""Id" IN (@p0)"#);
    }

    #[test]
    fn empty_membership() {
        let (sql, parameters) = translate(&col("id").is_in(Vec::<i32>::new()));
        assert_eq!(sql, "1 = 0");
        assert!(parameters.is_empty());
        let (sql, parameters) = translate(&!col("id").is_in(Vec::<i32>::new()));
        assert_eq!(sql, "1 = 1");
        assert!(parameters.is_empty());
        assert_eq!(
            translate(&col("age").gt(3).and(col("id").is_in(Vec::<i32>::new()))).0,
            r#"("Age" > @p0) AND (1 = 0)"#
        );
    }

    #[test]
    fn continues_numbering() {
        let mut parameters = Parameters::new();
        parameters.bind("@FirstName", Value::from("Joe"));
        let sql = PredicateTranslator::new(&POSTGRES, Person::entity_def())
            .translate(&col("age").eq(25), &mut parameters)
            .expect("Expression should be translatable");
        assert_eq!(sql, r#""Age" = @p1"#);
        assert_eq!(
            parameters.names().collect::<Vec<_>>(),
            ["@FirstName", "@p1"]
        );
    }

    #[test]
    fn qualified_columns() {
        let mut parameters = Parameters::new();
        let sql = PredicateTranslator::new(&MSSQL, Person::entity_def())
            .qualified(Some("dbo.Person"))
            .translate(&col("age").gt(30), &mut parameters)
            .expect("Expression should be translatable");
        assert_eq!(sql, "[dbo].[Person].[Age] > @p0");
    }

    #[test]
    fn unsupported_shapes() {
        assert!(unsupported(&col("age").eq(col("id"))));
        assert!(unsupported(&val(1).eq(val(1))));
        assert!(unsupported(&col("age").eq(val(Value::Null))));
        assert!(unsupported(&col("age").eq(Option::<i32>::None)));
        assert!(unsupported(&!col("age").eq(3)));
        assert!(unsupported(&col("age")));
        assert!(unsupported(&col("first_name").like("J%")));
        assert!(unsupported(&(col("age") + 1).gt(3)));
        assert!(unsupported(&col("age").eq(col("id") + 1)));
        assert!(unsupported(&col("age").gt(1).and(col("id").eq(col("age")))));
        assert!(unsupported(
            &call("lower", vec![col("first_name")]).eq("joe")
        ));
        assert!(unsupported(&contains(col("first_name"), col("last_name"))));
    }
}
