use crate::{
    Assignment, Entity, EntityDef, Expression, Filter, KeyValues, Options, Parameters,
    PredicateTranslator, QuarryError, Result, SqlWriter, Value, truncate_long,
};
use std::fmt::{self, Display, Formatter};

/// SQL text with the parameters it references.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub parameters: Parameters,
}

impl Statement {
    pub fn new(sql: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            sql: sql.into(),
            parameters,
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))?;
        if !self.parameters.is_empty() {
            write!(f, " {}", self.parameters)?;
        }
        Ok(())
    }
}

/// Row selection of a `DELETE`.
#[derive(Debug, Clone, Copy)]
pub enum DeleteFilter<'a> {
    /// Any translatable predicate.
    Predicate(&'a Expression),
    /// Equality on each entry, member or column names, in the given order.
    Keys(&'a KeyValues),
}

/// Builds `INSERT`, `UPDATE` and `DELETE` statements from entity metadata, leaving the
/// text to the dialect.
pub struct StatementBuilder<'a> {
    writer: &'a dyn SqlWriter,
}

impl<'a> StatementBuilder<'a> {
    pub fn new(writer: &'a dyn SqlWriter) -> Self {
        Self { writer }
    }

    pub fn insert<E: Entity>(&self, entity: &E, options: &Options) -> Result<Statement> {
        self.insert_row(E::entity_def(), &entity.row(), options)
    }

    /// `INSERT` of every column written by the application. With
    /// `select_after_mutation` a read-back scoped by the primary key follows, generated
    /// keys are matched against the dialect identity expression.
    pub fn insert_row(
        &self,
        def: &EntityDef,
        row: &[Value],
        options: &Options,
    ) -> Result<Statement> {
        check_row(def, row)?;
        let table = def.resolve_table_name(options.table_name.as_deref());
        let mut parameters = Parameters::new();
        let mut values = Vec::new();
        let mut read_back = Vec::new();
        for (column, value) in def.columns.iter().zip(row) {
            if column.not_mapped {
                continue;
            }
            let placeholder = if column.is_insertable() {
                let placeholder = self
                    .writer
                    .bind_named(&mut parameters, column.name, value.clone());
                values.push(Assignment::new(column.name, placeholder.clone()));
                Some(placeholder)
            } else {
                None
            };
            if column.primary_key && options.select_after_mutation {
                let key = if column.is_identity() {
                    self.writer.identity_value_expression(table, column.name)
                } else if let Some(placeholder) = placeholder {
                    placeholder
                } else {
                    self.writer
                        .bind_named(&mut parameters, column.name, value.clone())
                };
                read_back.push(Assignment::new(column.name, key));
            }
        }
        let columns = mapped_names(def);
        let mut sql = String::with_capacity(128);
        self.writer
            .write_insert(&mut sql, table, &values, options, &columns, &read_back);
        Ok(Statement::new(sql, parameters))
    }

    pub fn update<E: Entity>(&self, entity: &E, options: &Options) -> Result<Statement> {
        self.update_row(E::entity_def(), &entity.row(), options)
    }

    /// `UPDATE` of the non key columns matched by the primary key.
    pub fn update_row(
        &self,
        def: &EntityDef,
        row: &[Value],
        options: &Options,
    ) -> Result<Statement> {
        check_row(def, row)?;
        let table = def.resolve_table_name(options.table_name.as_deref());
        let mut parameters = Parameters::new();
        let set = self.set_assignments(def, row, &mut parameters);
        let keys = self.key_assignments(def, row, &mut parameters);
        if keys.is_empty() {
            return Err(QuarryError::configuration(format!(
                "`{}` has no primary key, it cannot be updated by key",
                def.type_name
            ))
            .into());
        }
        check_set(def, &set)?;
        let columns = mapped_names(def);
        let mut sql = String::with_capacity(128);
        self.writer.write_update(
            &mut sql,
            table,
            &set,
            Filter::Equalities(&keys),
            options,
            &columns,
            &keys,
        );
        Ok(Statement::new(sql, parameters))
    }

    pub fn update_where<E: Entity>(
        &self,
        entity: &E,
        predicate: &Expression,
        options: &Options,
    ) -> Result<Statement> {
        self.update_row_where(E::entity_def(), &entity.row(), predicate, options)
    }

    /// `UPDATE` of the non key columns matched by a single comparison instead of the key.
    pub fn update_row_where(
        &self,
        def: &EntityDef,
        row: &[Value],
        predicate: &Expression,
        options: &Options,
    ) -> Result<Statement> {
        check_row(def, row)?;
        match predicate {
            Expression::Binary(v) if v.op.is_comparison() => {}
            _ => {
                return Err(QuarryError::unsupported(format!(
                    "`{}`: an update filter must be a single comparison",
                    predicate
                ))
                .into());
            }
        }
        let table = def.resolve_table_name(options.table_name.as_deref());
        let mut parameters = Parameters::new();
        let set = self.set_assignments(def, row, &mut parameters);
        check_set(def, &set)?;
        let where_sql =
            PredicateTranslator::new(self.writer, def).translate(predicate, &mut parameters)?;
        let keys = if options.select_after_mutation {
            self.key_assignments(def, row, &mut parameters)
        } else {
            Vec::new()
        };
        let columns = mapped_names(def);
        let mut sql = String::with_capacity(128);
        self.writer.write_update(
            &mut sql,
            table,
            &set,
            Filter::Sql(&where_sql),
            options,
            &columns,
            &keys,
        );
        Ok(Statement::new(sql, parameters))
    }

    pub fn delete<E: Entity>(&self, filter: DeleteFilter, options: &Options) -> Result<Statement> {
        self.delete_from(E::entity_def(), filter, options)
    }

    /// `DELETE` of the rows matched by the primary key of `entity`.
    pub fn delete_entity<E: Entity>(&self, entity: &E, options: &Options) -> Result<Statement> {
        let def = E::entity_def();
        let keys: KeyValues = entity
            .primary_key()
            .into_iter()
            .map(|(c, v)| (c.name, v))
            .collect();
        if keys.is_empty() {
            return Err(QuarryError::configuration(format!(
                "`{}` has no primary key, it cannot be deleted by instance",
                def.type_name
            ))
            .into());
        }
        self.delete_from(def, DeleteFilter::Keys(&keys), options)
    }

    pub fn delete_from(
        &self,
        def: &EntityDef,
        filter: DeleteFilter,
        options: &Options,
    ) -> Result<Statement> {
        let table = def.resolve_table_name(options.table_name.as_deref());
        let mut parameters = Parameters::new();
        let mut sql = String::with_capacity(64);
        let where_sql = match filter {
            DeleteFilter::Keys(keys) => {
                if keys.is_empty() {
                    return Err(QuarryError::argument(format!(
                        "deleting from `{}` by key requires at least one key value",
                        table
                    ))
                    .into());
                }
                let equalities: Vec<_> = keys
                    .iter()
                    .map(|(name, value)| {
                        let column = def.column_name(name);
                        let placeholder =
                            self.writer
                                .bind_named(&mut parameters, column, value.clone());
                        Assignment::new(column, placeholder)
                    })
                    .collect();
                self.writer
                    .write_delete(&mut sql, table, Filter::Equalities(&equalities));
                None
            }
            DeleteFilter::Predicate(predicate) => {
                let where_sql = PredicateTranslator::new(self.writer, def)
                    .translate(predicate, &mut parameters)?;
                self.writer
                    .write_delete(&mut sql, table, Filter::Sql(&where_sql));
                Some(where_sql)
            }
        };
        if let Some(where_sql) = where_sql {
            if !where_sql.is_empty() && !sql.contains(" WHERE ") {
                sql.push_str(" WHERE ");
                sql.push_str(&where_sql);
            }
        }
        Ok(Statement::new(sql, parameters))
    }

    fn set_assignments(
        &self,
        def: &EntityDef,
        row: &[Value],
        parameters: &mut Parameters,
    ) -> Vec<Assignment> {
        def.columns
            .iter()
            .zip(row)
            .filter(|(c, _)| !c.not_mapped && !c.primary_key && !c.is_computed())
            .map(|(c, v)| {
                let placeholder = self.writer.bind_named(parameters, c.name, v.clone());
                Assignment::new(c.name, placeholder)
            })
            .collect()
    }

    fn key_assignments(
        &self,
        def: &EntityDef,
        row: &[Value],
        parameters: &mut Parameters,
    ) -> Vec<Assignment> {
        def.columns
            .iter()
            .zip(row)
            .filter(|(c, _)| !c.not_mapped && c.primary_key)
            .map(|(c, v)| {
                let placeholder = self.writer.bind_named(parameters, c.name, v.clone());
                Assignment::new(c.name, placeholder)
            })
            .collect()
    }
}

fn check_row(def: &EntityDef, row: &[Value]) -> Result<()> {
    if def.columns.len() != row.len() {
        return Err(QuarryError::configuration(format!(
            "`{}` describes {} columns but its row has {} values",
            def.type_name,
            def.columns.len(),
            row.len()
        ))
        .into());
    }
    Ok(())
}

fn check_set(def: &EntityDef, set: &[Assignment]) -> Result<()> {
    if set.is_empty() {
        return Err(QuarryError::configuration(format!(
            "`{}` has no column that can be updated",
            def.type_name
        ))
        .into());
    }
    Ok(())
}

fn mapped_names(def: &EntityDef) -> Vec<&'static str> {
    def.mapped_columns().map(|c| c.name).collect()
}
