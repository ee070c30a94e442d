use sqlx::{Postgres, postgres::PgArguments, query::Query};

use crate::infrastructure::persistence::schema::{ColumnRef, Table, quoted};

/// Composable SELECT builder. Values are bound as `$n` parameters in the
/// order they appear in the generated SQL.
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    from_table: Table<'a>,
    select: Vec<SelectItem<'a>>,
    joins: Vec<Join<'a>>,
    where_conditions: Vec<Condition<'a>>,
    group_by: Vec<ColumnRef<'a>>,
    having: Vec<Condition<'a>>,
    order_by: Vec<OrderBy<'a>>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Clone)]
pub enum SelectItem<'a> {
    Column(ColumnRef<'a>),
    /// Computed value, `expression AS "alias"`
    Expression {
        expression: String,
        alias: &'static str,
    },
}

/// A where or having condition; conditions are AND'ed together
#[derive(Debug, Clone)]
pub enum Condition<'a> {
    /// column = value
    Equals {
        column: ColumnRef<'a>,
        value: SqlParameter,
    },

    /// value = ANY(expression), for array valued expressions
    AnyEquals {
        expression: String,
        value: SqlParameter,
    },
}

#[derive(Debug, Clone)]
pub struct OrderBy<'a> {
    pub column: ColumnRef<'a>,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone)]
pub struct Join<'a> {
    pub join_type: JoinType,
    pub target_table: Table<'a>,
    pub main_column: ColumnRef<'a>,
    pub target_column: ColumnRef<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum JoinType {
    Left,
}

impl<'a> From<Table<'a>> for QueryBuilder<'a> {
    fn from(value: Table<'a>) -> Self {
        QueryBuilder {
            from_table: value,
            select: vec![],
            joins: vec![],
            where_conditions: vec![],
            group_by: vec![],
            having: vec![],
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }
}

impl<'a> QueryBuilder<'a> {
    /// Select specified items
    pub fn select(mut self, items: Vec<SelectItem<'a>>) -> Self {
        self.select = items;
        self
    }

    pub fn join(mut self, join: Join<'a>) -> Self {
        self.joins.push(join);
        self
    }

    /// Add where condition
    pub fn where_condition(mut self, condition: Condition<'a>) -> Self {
        self.where_conditions.push(condition);
        self
    }

    pub fn group_by(mut self, columns: Vec<ColumnRef<'a>>) -> Self {
        self.group_by = columns;
        self
    }

    /// Add condition evaluated after grouping
    pub fn having(mut self, condition: Condition<'a>) -> Self {
        self.having.push(condition);
        self
    }

    pub fn order_by(mut self, column: ColumnRef<'a>, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy { column, direction });
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Build the SQL query string
    pub fn build(self) -> (String, Vec<SqlParameter>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        let mut param_counter = 1;

        // SELECT clause
        sql.push_str("SELECT ");
        let items: Vec<String> = self.select.iter().map(SelectItem::to_sql).collect();
        sql.push_str(&items.join(", "));

        // FROM clause
        sql.push_str(&format!("\nFROM {}", self.from_table.qualified()));

        // JOIN clauses
        for join in &self.joins {
            let join_keyword = match join.join_type {
                JoinType::Left => "LEFT JOIN",
            };
            sql.push_str(&format!(
                "\n{} {} ON {} = {}",
                join_keyword,
                join.target_table.qualified(),
                join.main_column.qualified(),
                join.target_column.qualified()
            ));
        }

        // WHERE clause
        if !self.where_conditions.is_empty() {
            sql.push_str("\nWHERE ");
            let (where_clause, where_params) =
                Self::generate_conditions(&self.where_conditions, &mut param_counter);
            sql.push_str(&where_clause);
            params.extend(where_params);
        }

        // GROUP BY clause
        if !self.group_by.is_empty() {
            let columns: Vec<String> = self.group_by.iter().map(|c| c.qualified()).collect();
            sql.push_str(&format!("\nGROUP BY {}", columns.join(", ")));
        }

        // HAVING clause
        if !self.having.is_empty() {
            sql.push_str("\nHAVING ");
            let (having_clause, having_params) =
                Self::generate_conditions(&self.having, &mut param_counter);
            sql.push_str(&having_clause);
            params.extend(having_params);
        }

        // ORDER BY clause
        if !self.order_by.is_empty() {
            sql.push_str("\nORDER BY ");
            let order_clauses: Vec<String> = self
                .order_by
                .iter()
                .map(|ob| {
                    let direction = match ob.direction {
                        SortDirection::Ascending => "ASC",
                        SortDirection::Descending => "DESC",
                    };
                    format!("{} {}", ob.column.qualified(), direction)
                })
                .collect();
            sql.push_str(&order_clauses.join(", "));
        }

        // LIMIT clause
        if let Some(limit) = self.limit {
            sql.push_str(&format!("\nLIMIT {}", limit));
        }
        // OFFSET clause
        if let Some(offset) = self.offset {
            sql.push_str(&format!("\nOFFSET {}", offset));
        }

        (sql, params)
    }

    fn generate_conditions(
        conditions: &[Condition],
        param_counter: &mut usize,
    ) -> (String, Vec<SqlParameter>) {
        let mut sql = Vec::new();
        let mut params = Vec::new();

        for condition in conditions {
            let (cond_sql, cond_params) = condition.to_sql(param_counter);
            sql.push(cond_sql);
            params.extend(cond_params);
        }

        (sql.join(" AND "), params)
    }
}

impl SelectItem<'_> {
    fn to_sql(&self) -> String {
        match self {
            SelectItem::Column(column) => column.qualified(),
            SelectItem::Expression { expression, alias } => {
                format!("{} AS {}", expression, quoted(alias))
            }
        }
    }
}

impl Condition<'_> {
    pub fn to_sql(&self, param_counter: &mut usize) -> (String, Vec<SqlParameter>) {
        match self {
            Condition::Equals { column, value } => {
                let sql = format!("{} = ${}", column.qualified(), param_counter);
                *param_counter += 1;
                (sql, vec![value.clone()])
            }

            Condition::AnyEquals { expression, value } => {
                let sql = format!("${} = ANY({})", param_counter, expression);
                *param_counter += 1;
                (sql, vec![value.clone()])
            }
        }
    }
}

/// UPDATE of a single table that writes only the assigned columns.
#[derive(Debug, Clone)]
pub struct UpdateBuilder<'a> {
    table: &'a str,
    assignments: Vec<Assignment<'a>>,
    where_conditions: Vec<(&'a str, SqlParameter)>,
    returning: Vec<&'a str>,
}

#[derive(Debug, Clone)]
enum Assignment<'a> {
    Value {
        column: &'a str,
        value: SqlParameter,
    },
    /// Server side expression such as `now()`
    Expression {
        column: &'a str,
        expression: &'static str,
    },
}

impl<'a> UpdateBuilder<'a> {
    pub fn table(table: &'a str) -> Self {
        Self {
            table,
            assignments: vec![],
            where_conditions: vec![],
            returning: vec![],
        }
    }

    pub fn set(mut self, column: &'a str, value: SqlParameter) -> Self {
        self.assignments.push(Assignment::Value { column, value });
        self
    }

    pub fn set_expression(mut self, column: &'a str, expression: &'static str) -> Self {
        self.assignments.push(Assignment::Expression { column, expression });
        self
    }

    pub fn where_equals(mut self, column: &'a str, value: SqlParameter) -> Self {
        self.where_conditions.push((column, value));
        self
    }

    pub fn returning(mut self, columns: Vec<&'a str>) -> Self {
        self.returning = columns;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// `None` when nothing is assigned: there is no statement to run.
    pub fn build(self) -> Option<(String, Vec<SqlParameter>)> {
        if self.is_empty() {
            return None;
        }

        let mut params = Vec::new();
        let mut param_counter = 1;

        let assignments: Vec<String> = self
            .assignments
            .into_iter()
            .map(|assignment| match assignment {
                Assignment::Value { column, value } => {
                    let sql = format!("{} = ${}", quoted(column), param_counter);
                    param_counter += 1;
                    params.push(value);
                    sql
                }
                Assignment::Expression { column, expression } => {
                    format!("{} = {}", quoted(column), expression)
                }
            })
            .collect();

        let mut sql = format!("UPDATE {} SET {}", quoted(self.table), assignments.join(", "));

        if !self.where_conditions.is_empty() {
            let conditions: Vec<String> = self
                .where_conditions
                .into_iter()
                .map(|(column, value)| {
                    let sql = format!("{} = ${}", quoted(column), param_counter);
                    param_counter += 1;
                    params.push(value);
                    sql
                })
                .collect();
            sql.push_str(&format!(" WHERE {}", conditions.join(" AND ")));
        }

        if !self.returning.is_empty() {
            let columns: Vec<String> = self.returning.iter().map(|c| quoted(c)).collect();
            sql.push_str(&format!(" RETURNING {}", columns.join(", ")));
        }

        Some((sql, params))
    }
}

// SQL parameter that will be bound to query
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParameter {
    Text(String),
    OptionalText(Option<String>),
    Integer(i64),
    OptionalInteger(Option<i64>),
}

impl SqlParameter {
    /// Bind to sqlx query
    pub fn bind_to_query<'q>(
        self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            SqlParameter::Text(s) => query.bind(s),
            SqlParameter::OptionalText(s) => query.bind(s),
            SqlParameter::Integer(i) => query.bind(i),
            SqlParameter::OptionalInteger(i) => query.bind(i),
        }
    }
}

/// Binds all parameters in order
pub fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: Vec<SqlParameter>,
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = param.bind_to_query(query);
    }
    query
}
