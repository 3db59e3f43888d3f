#[cfg(test)]
mod tests {
    use quarry::{ColumnDef, Entity, Generated, RowLabeled, Value};
    use rust_decimal::Decimal;
    use time::macros::date;
    use uuid::Uuid;

    #[derive(Entity, Debug, PartialEq)]
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

    #[derive(Entity, Debug, PartialEq)]
    #[quarry(name = "Citizen", schema = "registry")]
    struct Citizen {
        #[quarry(name = "Id", primary_key)]
        id: i64,
        #[quarry(name = "SSN", primary_key)]
        ssn: String,
        birth_date: Option<time::Date>,
    }

    #[derive(Entity, Debug, PartialEq)]
    #[quarry(schema = "billing")]
    struct Invoice {
        #[quarry(primary_key, identity)]
        id: i64,
        external: Option<Uuid>,
        amount: Decimal,
        #[quarry(computed)]
        total: Decimal,
        #[quarry(not_mapped)]
        note: String,
        _flags: u8,
    }

    #[derive(Entity)]
    struct AuditEntry {
        message: String,
        level: i16,
    }

    #[test]
    fn person_definition() {
        let def = Person::entity_def();
        assert_eq!(def.type_name, "Person");
        assert_eq!(def.table_name(), "Person");
        assert_eq!(def.columns.len(), 4);
        assert_eq!(
            def.columns[0],
            ColumnDef::new("id").name("Id").primary_key().identity()
        );
        assert_eq!(def.columns[1].field, "first_name");
        assert_eq!(def.columns[1].name, "FirstName");
        assert!(def.columns[1].is_insertable());
        assert!(!def.columns[0].is_insertable());
        assert_eq!(
            def.primary_key_def().map(|c| c.name).collect::<Vec<_>>(),
            ["Id"]
        );
        assert_eq!(def.column_name("last_name"), "LastName");
        assert_eq!(def.column_name("LastName"), "LastName");
        assert_eq!(def.column_name("unknown"), "unknown");
        assert!(std::ptr::eq(def, Person::entity_def()));
    }

    #[test]
    fn schema_qualified_names() {
        assert_eq!(Citizen::entity_def().table_name(), "registry.Citizen");
        assert_eq!(Invoice::entity_def().table_name(), "billing.Invoice");
        assert_eq!(AuditEntry::entity_def().table_name(), "AuditEntry");
        assert_eq!(AuditEntry::entity_def().table_name, None);
        assert_eq!(
            Citizen::entity_def()
                .primary_key_def()
                .map(|c| c.name)
                .collect::<Vec<_>>(),
            ["Id", "SSN"]
        );
        assert_eq!(Citizen::entity_def().columns[2].name, "birth_date");
        assert_eq!(AuditEntry::entity_def().primary_key_def().count(), 0);
    }

    #[test]
    fn generated_and_not_mapped() {
        let def = Invoice::entity_def();
        assert_eq!(def.columns.len(), 6);
        assert_eq!(def.columns[0].generated, Generated::Identity);
        assert_eq!(def.columns[3].generated, Generated::Computed);
        assert!(def.columns[4].not_mapped);
        assert_eq!(def.columns[5].name, "flags");
        assert_eq!(def.columns[5].field, "_flags");
        assert_eq!(
            def.mapped_columns().map(|c| c.name).collect::<Vec<_>>(),
            ["id", "external", "amount", "total", "flags"]
        );
        assert!(def.column("note").is_none());
        assert_eq!(def.resolve_table_name(None), "billing.Invoice");
        assert_eq!(def.resolve_table_name(Some("")), "billing.Invoice");
        assert_eq!(def.resolve_table_name(Some("archive.Invoice")), "archive.Invoice");
    }

    #[test]
    fn row_values() {
        let invoice = Invoice {
            id: 12,
            external: None,
            amount: Decimal::new(1050, 2),
            total: Decimal::new(1281, 2),
            note: "ignored".into(),
            _flags: 3,
        };
        let row = invoice.row();
        assert_eq!(row.len(), 6);
        assert_eq!(row[0], Value::Int64(Some(12)));
        assert!(matches!(row[1], Value::Uuid(None)));
        assert_eq!(row[2], Value::Decimal(Some(Decimal::new(1050, 2))));
        assert!(matches!(row[4], Value::Null));
        assert_eq!(row[5], Value::UInt8(Some(3)));
        let key = invoice.primary_key();
        assert_eq!(key.len(), 1);
        assert_eq!(key[0].0.name, "id");
        assert_eq!(key[0].1, Value::Int64(Some(12)));

        let citizen = Citizen {
            id: 5,
            ssn: "abc".into(),
            birth_date: Some(date!(1990 - 04 - 21)),
        };
        assert_eq!(
            citizen
                .primary_key()
                .into_iter()
                .map(|(c, v)| (c.name, v))
                .collect::<Vec<_>>(),
            [
                ("Id", Value::Int64(Some(5))),
                ("SSN", Value::Varchar(Some("abc".into())))
            ]
        );
    }

    #[test]
    fn from_row() {
        let row: RowLabeled = [
            ("Age", Value::Int64(Some(44))),
            ("LastName", Value::from("Hopper")),
            ("Extra", Value::Boolean(Some(true))),
            ("FirstName", Value::from("Grace")),
            ("Id", Value::Int32(Some(2))),
        ]
        .into_iter()
        .collect();
        let person = Person::from_row(row).expect("The row should map onto a person");
        assert_eq!(
            person,
            Person {
                id: 2,
                first_name: "Grace".into(),
                last_name: "Hopper".into(),
                age: 44,
            }
        );

        let row: RowLabeled = [
            ("id", Value::Int64(Some(1))),
            ("external", Value::Varchar(None)),
            ("amount", Value::Int32(Some(10))),
            ("total", Value::Float64(Some(12.5))),
            ("flags", Value::UInt8(Some(0))),
        ]
        .into_iter()
        .collect();
        let invoice = Invoice::from_row(row).expect("The row should map onto an invoice");
        assert_eq!(invoice.external, None);
        assert_eq!(invoice.amount, Decimal::from(10));
        assert_eq!(invoice.total, Decimal::new(125, 1));
        assert_eq!(invoice.note, String::new());
    }

    #[test]
    fn from_row_errors() {
        let row: RowLabeled = [("Id", Value::Int32(Some(1)))].into_iter().collect();
        let error = Person::from_row(row).expect_err("The row misses columns");
        assert_eq!(
            error.to_string(),
            "Column `FirstName` does not exist in the row provided"
        );

        let row: RowLabeled = [
            ("message", Value::from("disk full")),
            ("level", Value::Int64(Some(100_000))),
        ]
        .into_iter()
        .collect();
        assert!(AuditEntry::from_row(row).is_err());
    }
}
