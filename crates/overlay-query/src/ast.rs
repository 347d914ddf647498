//! Relational query AST.
//!
//! The AST covers exactly what overlay queries need: projections, joins,
//! conjunctive filters, set unions over sub-selects, ordering and a limit.
//! All literals are carried as bound parameters ([`Expr::Param`]).

use overlay_types::Value;

use crate::error::{QueryError, QueryResult};

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// A possibly qualified column reference (`o.object_name` or `object_name`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnRef {
    pub qualifier: Option<String>,
    pub name: String,
}

/// A scalar expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Column(ColumnRef),
    /// A bound parameter. Bytes are bound binary-safe.
    Param(Value),
    /// First non-NULL argument.
    Coalesce(Vec<Expr>),
}

impl Expr {
    /// Qualified column reference.
    pub fn col(qualifier: &str, name: &str) -> Self {
        Self::Column(ColumnRef {
            qualifier: Some(qualifier.to_string()),
            name: name.to_string(),
        })
    }

    /// Unqualified column reference, resolved against whatever is in scope.
    pub fn name(name: &str) -> Self {
        Self::Column(ColumnRef {
            qualifier: None,
            name: name.to_string(),
        })
    }

    pub fn param(value: impl Into<Value>) -> Self {
        Self::Param(value.into())
    }

    pub fn coalesce(first: Expr, second: Expr) -> Self {
        Self::Coalesce(vec![first, second])
    }

    pub fn equals(self, other: Expr) -> Predicate {
        Predicate::Eq(self, other)
    }

    pub fn is_null(self) -> Predicate {
        Predicate::IsNull(self)
    }

    pub fn is_not_null(self) -> Predicate {
        Predicate::IsNotNull(self)
    }

    pub fn in_list(self, values: Vec<Value>) -> Predicate {
        Predicate::InList(self, values)
    }

    pub fn in_select(self, select: Select) -> Predicate {
        Predicate::InSelect(self, Box::new(select))
    }

    pub fn like(self, pattern: impl Into<String>, case_insensitive: bool) -> Predicate {
        Predicate::Like {
            expr: self,
            pattern: pattern.into(),
            case_insensitive,
        }
    }
}

/// Escape `%`, `_` and `\\` so `text` matches literally inside a LIKE pattern.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// A boolean condition with SQL three-valued semantics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    True,
    False,
    Eq(Expr, Expr),
    IsNull(Expr),
    IsNotNull(Expr),
    /// `LIKE` with `%`/`_` wildcards and `\` as escape character.
    Like {
        expr: Expr,
        pattern: String,
        case_insensitive: bool,
    },
    InList(Expr, Vec<Value>),
    /// Membership in the single-column result of an uncorrelated sub-select.
    InSelect(Expr, Box<Select>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Conjunction, flattening trivially true members.
    pub fn and(parts: Vec<Predicate>) -> Self {
        let parts: Vec<_> = parts.into_iter().filter(|p| *p != Self::True).collect();
        match parts.len() {
            0 => Self::True,
            1 => parts.into_iter().next().unwrap_or(Self::True),
            _ => Self::And(parts),
        }
    }

    /// Disjunction. An empty disjunction is false.
    pub fn or(parts: Vec<Predicate>) -> Self {
        match parts.len() {
            0 => Self::False,
            1 => parts.into_iter().next().unwrap_or(Self::False),
            _ => Self::Or(parts),
        }
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }
}

// ---------------------------------------------------------------------------
// Sources and joins
// ---------------------------------------------------------------------------

/// A named table with the alias it is referenced by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub alias: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
        }
    }
}

/// What a select reads from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Table(TableRef),
    /// A parenthesized sub-query with an alias.
    Derived { query: Box<Query>, alias: String },
}

impl Source {
    pub fn alias(&self) -> &str {
        match self {
            Self::Table(t) => &t.alias,
            Self::Derived { alias, .. } => alias,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableRef,
    pub on: Predicate,
}

// ---------------------------------------------------------------------------
// Select / Query
// ---------------------------------------------------------------------------

/// One output column: `expr AS alias`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    pub alias: String,
    pub expr: Expr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub expr: Expr,
    pub descending: bool,
}

/// A single `SELECT` statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Select {
    pub projection: Vec<Projection>,
    pub from: Source,
    pub joins: Vec<Join>,
    /// Conditions combined with `AND`.
    pub filters: Vec<Predicate>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
}

impl Select {
    pub fn from_table(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::from_source(Source::Table(TableRef::new(name, alias)))
    }

    pub fn from_derived(query: Query, alias: impl Into<String>) -> Self {
        Self::from_source(Source::Derived {
            query: Box::new(query),
            alias: alias.into(),
        })
    }

    fn from_source(from: Source) -> Self {
        Self {
            projection: Vec::new(),
            from,
            joins: Vec::new(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn column(mut self, alias: impl Into<String>, expr: Expr) -> Self {
        self.projection.push(Projection {
            alias: alias.into(),
            expr,
        });
        self
    }

    pub fn join(mut self, kind: JoinKind, table: TableRef, on: Predicate) -> Self {
        self.joins.push(Join { kind, table, on });
        self
    }

    pub fn left_join(self, name: &str, alias: &str, on: Predicate) -> Self {
        self.join(JoinKind::Left, TableRef::new(name, alias), on)
    }

    pub fn right_join(self, name: &str, alias: &str, on: Predicate) -> Self {
        self.join(JoinKind::Right, TableRef::new(name, alias), on)
    }

    pub fn inner_join(self, name: &str, alias: &str, on: Predicate) -> Self {
        self.join(JoinKind::Inner, TableRef::new(name, alias), on)
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.add_filter(predicate);
        self
    }

    /// Add a condition in place. Used by restrictions narrowing a select.
    pub fn add_filter(&mut self, predicate: Predicate) {
        if predicate != Predicate::True {
            self.filters.push(predicate);
        }
    }

    pub fn order_by(mut self, expr: Expr) -> Self {
        self.order_by.push(OrderBy {
            expr,
            descending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Output column aliases in projection order.
    pub fn output_columns(&self) -> Vec<String> {
        self.projection.iter().map(|p| p.alias.clone()).collect()
    }

    /// Aliases of every table or derived source in scope.
    pub fn aliases(&self) -> Vec<&str> {
        std::iter::once(self.from.alias())
            .chain(self.joins.iter().map(|j| j.table.alias.as_str()))
            .collect()
    }

    /// Structural validation of this select and everything nested in it.
    pub fn validate(&self) -> QueryResult<()> {
        if self.projection.is_empty() {
            return Err(QueryError::EmptyProjection {
                source_name: self.from.alias().to_string(),
            });
        }
        if let Source::Derived { query, .. } = &self.from {
            query.validate()?;
        }
        for predicate in self.filters.iter().chain(self.joins.iter().map(|j| &j.on)) {
            validate_predicate(predicate)?;
        }
        Ok(())
    }
}

fn validate_predicate(predicate: &Predicate) -> QueryResult<()> {
    match predicate {
        Predicate::InSelect(_, select) => select.validate(),
        Predicate::And(parts) | Predicate::Or(parts) => {
            parts.iter().try_for_each(validate_predicate)
        }
        Predicate::Not(inner) => validate_predicate(inner),
        _ => Ok(()),
    }
}

/// A complete query: a single select or a set union of selects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    Select(Box<Select>),
    /// `UNION` (duplicate-free) or `UNION ALL` of parenthesized selects.
    Union { parts: Vec<Select>, all: bool },
}

impl Query {
    /// Duplicate-eliminating union of the given parts.
    pub fn union(parts: Vec<Select>) -> Self {
        Self::Union { parts, all: false }
    }

    pub fn output_columns(&self) -> Vec<String> {
        match self {
            Self::Select(select) => select.output_columns(),
            Self::Union { parts, .. } => parts
                .first()
                .map(Select::output_columns)
                .unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> QueryResult<()> {
        match self {
            Self::Select(select) => select.validate(),
            Self::Union { parts, .. } => {
                let first = parts.first().ok_or(QueryError::EmptyUnion)?;
                let expected = first.output_columns();
                for (index, part) in parts.iter().enumerate() {
                    part.validate()?;
                    let actual = part.output_columns();
                    if actual != expected {
                        return Err(QueryError::MismatchedUnion {
                            index,
                            expected,
                            actual,
                        });
                    }
                }
                Ok(())
            }
        }
    }
}

impl From<Select> for Query {
    fn from(select: Select) -> Self {
        Self::Select(Box::new(select))
    }
}
