//! SQL text generation.
//!
//! [`render`] produces parameterized SQL plus the ordered parameter list,
//! ready to hand to a database driver. [`render_inline`] embeds literals
//! instead and exists for logs and the `sql` CLI command.

use std::fmt::{self, Write as _};

use overlay_types::Value;
use serde::{Deserialize, Serialize};

use crate::ast::{Expr, Predicate, Query, Select, Source};
use crate::error::QueryResult;

/// Target database flavour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    Postgres,
    Mysql,
}

impl SqlDialect {
    /// Placeholder for the `index`-th (1-based) bound parameter.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${index}"),
            Self::Mysql => "?".to_string(),
        }
    }

    /// Literal form of a binary value.
    pub fn quote_binary(&self, bytes: &[u8]) -> String {
        match self {
            Self::Postgres => format!("'\\x{}'", hex::encode(bytes)),
            Self::Mysql => format!("0x{}", hex::encode(bytes)),
        }
    }

    /// `LIKE` operator to use. MySQL collations already compare
    /// case-insensitively.
    pub fn like_operator(&self, case_insensitive: bool) -> &'static str {
        match (self, case_insensitive) {
            (Self::Postgres, true) => "ILIKE",
            _ => "LIKE",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "pgsql" | "postgresql" => Ok(Self::Postgres),
            "mysql" => Ok(Self::Mysql),
            other => Err(format!("unknown SQL dialect '{other}'")),
        }
    }
}

/// SQL text and its bound parameters in placeholder order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedSql {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Render a query with bound parameters.
pub fn render(query: &Query, dialect: SqlDialect) -> QueryResult<RenderedSql> {
    query.validate()?;
    let mut w = Writer::new(dialect, false);
    w.query(query);
    Ok(RenderedSql {
        sql: w.sql,
        params: w.params,
    })
}

/// Render a query with literals inlined. Not for execution.
pub fn render_inline(query: &Query, dialect: SqlDialect) -> QueryResult<String> {
    query.validate()?;
    let mut w = Writer::new(dialect, true);
    w.query(query);
    Ok(w.sql)
}

struct Writer {
    dialect: SqlDialect,
    inline: bool,
    sql: String,
    params: Vec<Value>,
}

impl Writer {
    fn new(dialect: SqlDialect, inline: bool) -> Self {
        Self {
            dialect,
            inline,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    fn query(&mut self, query: &Query) {
        match query {
            Query::Select(select) => self.select(select),
            Query::Union { parts, all } => {
                let glue = if *all { " UNION ALL " } else { " UNION " };
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        self.push(glue);
                    }
                    self.push("(");
                    self.select(part);
                    self.push(")");
                }
            }
        }
    }

    fn select(&mut self, select: &Select) {
        self.push("SELECT ");
        for (i, p) in select.projection.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.expr(&p.expr);
            let _ = write!(self.sql, " AS {}", p.alias);
        }

        self.push(" FROM ");
        match &select.from {
            Source::Table(t) => {
                let _ = write!(self.sql, "{} {}", t.name, t.alias);
            }
            Source::Derived { query, alias } => {
                self.push("(");
                self.query(query);
                let _ = write!(self.sql, ") {alias}");
            }
        }

        for join in &select.joins {
            let _ = write!(
                self.sql,
                " {} {} {} ON ",
                join.kind.keyword(),
                join.table.name,
                join.table.alias
            );
            self.predicate(&join.on);
        }

        if !select.filters.is_empty() {
            self.push(" WHERE ");
            for (i, f) in select.filters.iter().enumerate() {
                if i > 0 {
                    self.push(" AND ");
                }
                self.wrapped(f);
            }
        }

        if !select.order_by.is_empty() {
            self.push(" ORDER BY ");
            for (i, o) in select.order_by.iter().enumerate() {
                if i > 0 {
                    self.push(", ");
                }
                self.expr(&o.expr);
                self.push(if o.descending { " DESC" } else { " ASC" });
            }
        }

        if let Some(limit) = select.limit {
            let _ = write!(self.sql, " LIMIT {limit}");
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Column(c) => match &c.qualifier {
                Some(q) => {
                    let _ = write!(self.sql, "{q}.{}", c.name);
                }
                None => self.push(&c.name),
            },
            Expr::Param(v) => self.value(v.clone()),
            Expr::Coalesce(args) => {
                self.push("COALESCE(");
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(a);
                }
                self.push(")");
            }
        }
    }

    fn value(&mut self, value: Value) {
        if !self.inline {
            self.params.push(value);
            let placeholder = self.dialect.placeholder(self.params.len());
            self.push(&placeholder);
            return;
        }
        let literal = match &value {
            Value::Null => "NULL".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Bytes(b) => self.dialect.quote_binary(b),
        };
        self.push(&literal);
    }

    /// Compound predicates get parentheses when nested.
    fn wrapped(&mut self, predicate: &Predicate) {
        if matches!(predicate, Predicate::And(_) | Predicate::Or(_)) {
            self.push("(");
            self.predicate(predicate);
            self.push(")");
        } else {
            self.predicate(predicate);
        }
    }

    fn predicate(&mut self, predicate: &Predicate) {
        match predicate {
            Predicate::True => self.push("1 = 1"),
            Predicate::False => self.push("1 = 0"),
            Predicate::Eq(a, b) => {
                self.expr(a);
                self.push(" = ");
                self.expr(b);
            }
            Predicate::IsNull(e) => {
                self.expr(e);
                self.push(" IS NULL");
            }
            Predicate::IsNotNull(e) => {
                self.expr(e);
                self.push(" IS NOT NULL");
            }
            Predicate::Like {
                expr,
                pattern,
                case_insensitive,
            } => {
                self.expr(expr);
                let op = self.dialect.like_operator(*case_insensitive);
                let _ = write!(self.sql, " {op} ");
                self.value(Value::Text(pattern.clone()));
            }
            Predicate::InList(e, values) => {
                if values.is_empty() {
                    self.push("1 = 0");
                    return;
                }
                self.expr(e);
                self.push(" IN (");
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.value(v.clone());
                }
                self.push(")");
            }
            Predicate::InSelect(e, select) => {
                self.expr(e);
                self.push(" IN (");
                self.select(select);
                self.push(")");
            }
            Predicate::And(parts) => self.joined(parts, " AND "),
            Predicate::Or(parts) => self.joined(parts, " OR "),
            Predicate::Not(inner) => {
                self.push("NOT (");
                self.predicate(inner);
                self.push(")");
            }
        }
    }

    fn joined(&mut self, parts: &[Predicate], glue: &str) {
        for (i, p) in parts.iter().enumerate() {
            if i > 0 {
                self.push(glue);
            }
            self.wrapped(p);
        }
    }
}
