use crate::{
    DeleteFilter, Entity, EntityDef, Expression, FunctionSource, JoinNode, JoinType, Options,
    Order, OrderTerm, Parameters, PredicateTranslator, Result, SelectNode, SelectSource,
    SqlWriter, Statement, StatementBuilder, Value, truncate_long,
};
use std::{borrow::Cow, fmt, marker::PhantomData, sync::Arc};

#[derive(Debug)]
enum Step {
    Filter(Expression),
    Order {
        member: Cow<'static, str>,
        order: Order,
    },
    Skip(u64),
    Take(u64),
    Join {
        entity: &'static EntityDef,
        left: Cow<'static, str>,
        right: Cow<'static, str>,
        join_type: JoinType,
    },
    FromFunction(FunctionSource),
}

#[derive(Debug)]
struct Node {
    step: Step,
    parent: Option<Arc<Node>>,
}

/// Immutable description of a `SELECT` over `E`.
///
/// Every call returns a new query sharing the previous steps, nothing is rendered until
/// [`Query::to_sql`]:
/// ```ignore
/// let statement = Query::<Person>::new(writer)
///     .filter(col("Age").gt(30))
///     .order_by("LastName")
///     .skip(10)
///     .take(5)
///     .to_sql()?;
/// ```
pub struct Query<E> {
    writer: Arc<dyn SqlWriter>,
    node: Option<Arc<Node>>,
    table_name: Option<Arc<str>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Query<E> {
    fn clone(&self) -> Self {
        Self {
            writer: self.writer.clone(),
            node: self.node.clone(),
            table_name: self.table_name.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for Query<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("writer", &self.writer.name())
            .field("node", &self.node)
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl<E: Entity> Query<E> {
    pub fn new(writer: Arc<dyn SqlWriter>) -> Self {
        Self {
            writer,
            node: None,
            table_name: None,
            _entity: PhantomData,
        }
    }

    pub fn writer(&self) -> &dyn SqlWriter {
        self.writer.as_dyn()
    }

    fn push(&self, step: Step) -> Self {
        Self {
            writer: self.writer.clone(),
            node: Some(Arc::new(Node {
                step,
                parent: self.node.clone(),
            })),
            table_name: self.table_name.clone(),
            _entity: PhantomData,
        }
    }

    /// Keep the rows matching `predicate`, combined with `AND` to previous filters.
    pub fn filter(&self, predicate: Expression) -> Self {
        self.push(Step::Filter(predicate))
    }

    pub fn order_by(&self, member: impl Into<Cow<'static, str>>) -> Self {
        self.push(Step::Order {
            member: member.into(),
            order: Order::ASC,
        })
    }

    pub fn order_by_descending(&self, member: impl Into<Cow<'static, str>>) -> Self {
        self.push(Step::Order {
            member: member.into(),
            order: Order::DESC,
        })
    }

    /// Secondary ordering, applied after the previous ones.
    pub fn then_by(&self, member: impl Into<Cow<'static, str>>) -> Self {
        self.order_by(member)
    }

    pub fn then_by_descending(&self, member: impl Into<Cow<'static, str>>) -> Self {
        self.order_by_descending(member)
    }

    pub fn skip(&self, count: u64) -> Self {
        self.push(Step::Skip(count))
    }

    pub fn take(&self, count: u64) -> Self {
        self.push(Step::Take(count))
    }

    /// `INNER JOIN` the table of `I` on `E.left = I.right`, members or column names.
    pub fn join<I: Entity>(
        &self,
        left: impl Into<Cow<'static, str>>,
        right: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.push(Step::Join {
            entity: I::entity_def(),
            left: left.into(),
            right: right.into(),
            join_type: JoinType::Inner,
        })
    }

    pub fn left_join<I: Entity>(
        &self,
        left: impl Into<Cow<'static, str>>,
        right: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.push(Step::Join {
            entity: I::entity_def(),
            left: left.into(),
            right: right.into(),
            join_type: JoinType::Left,
        })
    }

    /// Select from the table valued function `name(args...)` instead of the table.
    pub fn from_function<I, V>(&self, name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(Step::FromFunction(FunctionSource {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }))
    }

    /// Replace the table name of `E` for this query and the statements derived from it.
    pub fn with_table_name(&self, table_name: impl AsRef<str>) -> Self {
        Self {
            table_name: Some(table_name.as_ref().into()),
            ..self.clone()
        }
    }

    fn steps(&self) -> impl Iterator<Item = &Step> {
        std::iter::successors(self.node.as_deref(), |v| v.parent.as_deref()).map(|v| &v.step)
    }

    /// Resolve the chain into the select tree, together with the predicate parameters.
    pub fn to_select_node(&self) -> Result<(SelectNode, Parameters)> {
        let def = E::entity_def();
        let table = def.resolve_table_name(self.table_name.as_deref());
        let mut skip = None;
        let mut take = None;
        let mut function = None;
        let mut orders = Vec::new();
        let mut joins = Vec::new();
        let mut filter: Option<Expression> = None;
        // Outermost step first
        for step in self.steps() {
            match step {
                Step::Filter(predicate) => {
                    filter = Some(match filter {
                        Some(outer) => outer.and(predicate.clone()),
                        None => predicate.clone(),
                    });
                }
                Step::Order { member, order } => orders.push(OrderTerm {
                    column: def.column_name(member).to_string(),
                    order: *order,
                }),
                Step::Skip(v) => {
                    skip.get_or_insert(*v);
                }
                Step::Take(v) => {
                    take.get_or_insert(*v);
                }
                Step::Join {
                    entity,
                    left,
                    right,
                    join_type,
                } => joins.push(JoinNode {
                    join_type: *join_type,
                    table: entity.table_name().to_string(),
                    left_column: def.column_name(left).to_string(),
                    right_column: entity.column_name(right).to_string(),
                }),
                Step::FromFunction(v) => {
                    if function.is_none() {
                        function = Some(v.clone());
                    }
                }
            }
        }
        orders.reverse();
        joins.reverse();
        let mut node = SelectNode::table(table);
        if let Some(function) = function {
            node.source = SelectSource::Function(function);
        }
        node.columns = def.mapped_columns().map(|c| c.name.to_string()).collect();
        node.primary_keys = def.primary_key_def().map(|c| c.name.to_string()).collect();
        node.skip = skip;
        node.take = take;
        node.order_by = orders;
        node.joins = joins;
        let mut parameters = Parameters::new();
        if let Some(filter) = filter {
            let qualifier = node.qualifier();
            let where_sql = PredicateTranslator::new(self.writer.as_dyn(), def)
                .qualified(qualifier)
                .translate(&filter, &mut parameters)?;
            node.where_sql = Some(where_sql);
        }
        Ok((node, parameters))
    }

    pub fn to_sql(&self) -> Result<Statement> {
        let (node, mut parameters) = self.to_select_node()?;
        let mut sql = String::with_capacity(128);
        self.writer.write_select(&mut sql, &node, &mut parameters);
        log::debug!("{}: {}", self.writer.name(), truncate_long!(sql));
        Ok(Statement::new(sql, parameters))
    }

    fn options(&self, options: &Options) -> Options {
        match (&options.table_name, &self.table_name) {
            (None, Some(table_name)) => options.clone().table_name(table_name.as_ref()),
            _ => options.clone(),
        }
    }

    fn builder(&self) -> StatementBuilder<'_> {
        StatementBuilder::new(self.writer.as_dyn())
    }

    pub fn to_insert_sql(&self, entity: &E, options: &Options) -> Result<Statement> {
        self.builder().insert(entity, &self.options(options))
    }

    pub fn to_update_sql(&self, entity: &E, options: &Options) -> Result<Statement> {
        self.builder().update(entity, &self.options(options))
    }

    pub fn to_update_sql_where(
        &self,
        entity: &E,
        predicate: &Expression,
        options: &Options,
    ) -> Result<Statement> {
        self.builder()
            .update_where(entity, predicate, &self.options(options))
    }

    pub fn to_delete_sql(&self, predicate: &Expression, options: &Options) -> Result<Statement> {
        self.builder()
            .delete::<E>(DeleteFilter::Predicate(predicate), &self.options(options))
    }

    pub fn to_delete_sql_entity(&self, entity: &E, options: &Options) -> Result<Statement> {
        self.builder()
            .delete_entity(entity, &self.options(options))
    }
}
