use quarry::{Entity, RowLabeled, Value};
use rust_decimal::Decimal;
use time::Date;

#[derive(Entity, Debug, Clone, PartialEq)]
#[quarry(name = "Person")]
pub struct Person {
    #[quarry(name = "Id", primary_key, identity)]
    pub id: i32,
    #[quarry(name = "FirstName")]
    pub first_name: String,
    #[quarry(name = "LastName")]
    pub last_name: String,
    #[quarry(name = "Age")]
    pub age: i32,
}

impl Person {
    pub fn row_labeled(&self) -> RowLabeled {
        [
            ("Id", Value::from(self.id)),
            ("FirstName", Value::from(self.first_name.clone())),
            ("LastName", Value::from(self.last_name.clone())),
            ("Age", Value::from(self.age)),
        ]
        .into_iter()
        .collect()
    }
}

/// Composite natural key, nothing generated.
#[derive(Entity, Debug, Clone, PartialEq)]
#[quarry(name = "Citizen", schema = "registry")]
pub struct Citizen {
    #[quarry(name = "Id", primary_key)]
    pub id: i64,
    #[quarry(name = "SSN", primary_key)]
    pub ssn: String,
    #[quarry(name = "Name")]
    pub name: String,
    #[quarry(name = "BirthDate")]
    pub birth_date: Option<Date>,
}

#[derive(Entity, Debug, Clone, PartialEq)]
#[quarry(name = "Invoice")]
pub struct Invoice {
    #[quarry(name = "Id", primary_key, identity)]
    pub id: i64,
    #[quarry(name = "PersonId")]
    pub person_id: i32,
    #[quarry(name = "Amount")]
    pub amount: Decimal,
    #[quarry(name = "Total", computed)]
    pub total: Decimal,
    #[quarry(not_mapped)]
    pub note: String,
}

/// Without a key it can be read and inserted, nothing else.
#[derive(Entity, Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub message: String,
    pub level: i16,
}
