//! Query evaluation over in-memory tables.
//!
//! Joins are nested loops. Every source in scope contributes a row set;
//! a binding is one index (or NULL extension) per source. Predicates are
//! evaluated with three-valued logic and only TRUE keeps a binding.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use overlay_query::{ColumnRef, Expr, JoinKind, Predicate, Query, Select, Source};
use overlay_types::{Row, Value};

use crate::error::{StoreError, StoreResult};
use crate::table::Table;

/// SQL truth value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    fn from_bool(b: bool) -> Self {
        if b {
            Self::True
        } else {
            Self::False
        }
    }

    fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }
}

/// The sources in scope of one select and their materialized rows.
struct Frame {
    aliases: Vec<String>,
    columns: Vec<Vec<String>>,
    rows: Vec<Vec<Row>>,
}

/// One candidate result: a row index per source, `None` when NULL-extended.
type Binding = Vec<Option<usize>>;

impl Frame {
    fn push(&mut self, alias: &str, columns: Vec<String>, rows: Vec<Row>) {
        self.aliases.push(alias.to_string());
        self.columns.push(columns);
        self.rows.push(rows);
    }

    fn lookup(&self, binding: &Binding, column: &ColumnRef) -> StoreResult<Value> {
        let source = match &column.qualifier {
            Some(q) => {
                let idx = self
                    .aliases
                    .iter()
                    .position(|a| a == q)
                    .ok_or_else(|| StoreError::UnknownAlias(q.clone()))?;
                if !self.columns[idx].iter().any(|c| c == &column.name) {
                    return Err(StoreError::UnknownColumn(format!("{q}.{}", column.name)));
                }
                idx
            }
            None => {
                let mut found = self
                    .columns
                    .iter()
                    .enumerate()
                    .filter(|(_, cols)| cols.iter().any(|c| c == &column.name))
                    .map(|(i, _)| i);
                let first = found
                    .next()
                    .ok_or_else(|| StoreError::UnknownColumn(column.name.clone()))?;
                if found.next().is_some() {
                    return Err(StoreError::AmbiguousColumn(column.name.clone()));
                }
                first
            }
        };
        Ok(match binding.get(source).copied().flatten() {
            Some(row) => self.rows[source][row].get(&column.name).clone(),
            None => Value::Null,
        })
    }
}

/// Evaluates queries against a set of named tables.
pub struct Evaluator<'a> {
    tables: &'a BTreeMap<String, Table>,
}

impl<'a> Evaluator<'a> {
    pub fn new(tables: &'a BTreeMap<String, Table>) -> Self {
        Self { tables }
    }

    /// Evaluate a validated query.
    pub fn query(&self, query: &Query) -> StoreResult<Vec<Row>> {
        match query {
            Query::Select(select) => self.select(select),
            Query::Union { parts, all } => {
                let mut out = Vec::new();
                let mut seen = HashSet::new();
                for part in parts {
                    for row in self.select(part)? {
                        if *all || seen.insert(row.clone()) {
                            out.push(row);
                        }
                    }
                }
                Ok(out)
            }
        }
    }

    pub fn select(&self, select: &Select) -> StoreResult<Vec<Row>> {
        let mut frame = Frame {
            aliases: Vec::new(),
            columns: Vec::new(),
            rows: Vec::new(),
        };

        let (columns, rows) = self.source(&select.from)?;
        frame.push(select.from.alias(), columns, rows);
        let mut bindings: Vec<Binding> = (0..frame.rows[0].len()).map(|i| vec![Some(i)]).collect();

        for join in &select.joins {
            let table = self.table(&join.table.name)?;
            frame.push(&join.table.alias, table.columns.clone(), table.rows.clone());
            bindings = self.join(&frame, bindings, join.kind, &join.on)?;
        }

        let mut kept = Vec::new();
        for binding in bindings {
            let mut keep = true;
            for filter in &select.filters {
                if self.predicate(&frame, &binding, filter)? != Truth::True {
                    keep = false;
                    break;
                }
            }
            if keep {
                kept.push(binding);
            }
        }

        let mut results = Vec::with_capacity(kept.len());
        for binding in kept {
            let mut row = Row::new();
            for p in &select.projection {
                row.insert(p.alias.clone(), self.expr(&frame, &binding, &p.expr)?);
            }
            let keys = select
                .order_by
                .iter()
                .map(|o| self.sort_key(&frame, &binding, &row, &o.expr))
                .collect::<StoreResult<Vec<_>>>()?;
            results.push((keys, row));
        }

        if !select.order_by.is_empty() {
            results.sort_by(|(a, _), (b, _)| {
                for ((x, y), o) in a.iter().zip(b).zip(&select.order_by) {
                    let cmp = x.sort_cmp(y);
                    let cmp = if o.descending { cmp.reverse() } else { cmp };
                    if cmp != Ordering::Equal {
                        return cmp;
                    }
                }
                Ordering::Equal
            });
        }

        let mut rows: Vec<Row> = results.into_iter().map(|(_, row)| row).collect();
        if let Some(limit) = select.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    fn table(&self, name: &str) -> StoreResult<&'a Table> {
        self.tables
            .get(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    fn source(&self, source: &Source) -> StoreResult<(Vec<String>, Vec<Row>)> {
        match source {
            Source::Table(t) => {
                let table = self.table(&t.name)?;
                Ok((table.columns.clone(), table.rows.clone()))
            }
            Source::Derived { query, .. } => Ok((query.output_columns(), self.query(query)?)),
        }
    }

    fn join(
        &self,
        frame: &Frame,
        left: Vec<Binding>,
        kind: JoinKind,
        on: &Predicate,
    ) -> StoreResult<Vec<Binding>> {
        let right_len = frame.rows[frame.rows.len() - 1].len();
        let mut out = Vec::new();
        let mut right_matched = vec![false; right_len];

        for l in &left {
            let mut matched = false;
            for (r, seen) in right_matched.iter_mut().enumerate() {
                let mut candidate = l.clone();
                candidate.push(Some(r));
                if self.predicate(frame, &candidate, on)? == Truth::True {
                    matched = true;
                    *seen = true;
                    out.push(candidate);
                }
            }
            if !matched && kind == JoinKind::Left {
                let mut candidate = l.clone();
                candidate.push(None);
                out.push(candidate);
            }
        }

        if kind == JoinKind::Right {
            let width = frame.aliases.len() - 1;
            for (r, seen) in right_matched.into_iter().enumerate() {
                if !seen {
                    let mut candidate: Binding = vec![None; width];
                    candidate.push(Some(r));
                    out.push(candidate);
                }
            }
        }
        Ok(out)
    }

    /// ORDER BY may name an output alias that no source provides.
    fn sort_key(&self, frame: &Frame, binding: &Binding, row: &Row, expr: &Expr) -> StoreResult<Value> {
        match self.expr(frame, binding, expr) {
            Err(StoreError::UnknownColumn(name)) if row.contains(&name) => Ok(row.get(&name).clone()),
            other => other,
        }
    }

    fn expr(&self, frame: &Frame, binding: &Binding, expr: &Expr) -> StoreResult<Value> {
        match expr {
            Expr::Column(c) => frame.lookup(binding, c),
            Expr::Param(v) => Ok(v.clone()),
            Expr::Coalesce(args) => {
                for arg in args {
                    let v = self.expr(frame, binding, arg)?;
                    if !v.is_null() {
                        return Ok(v);
                    }
                }
                Ok(Value::Null)
            }
        }
    }

    fn predicate(&self, frame: &Frame, binding: &Binding, predicate: &Predicate) -> StoreResult<Truth> {
        Ok(match predicate {
            Predicate::True => Truth::True,
            Predicate::False => Truth::False,
            Predicate::Eq(a, b) => {
                let a = self.expr(frame, binding, a)?;
                let b = self.expr(frame, binding, b)?;
                if a.is_null() || b.is_null() {
                    Truth::Unknown
                } else {
                    Truth::from_bool(a == b)
                }
            }
            Predicate::IsNull(e) => Truth::from_bool(self.expr(frame, binding, e)?.is_null()),
            Predicate::IsNotNull(e) => Truth::from_bool(!self.expr(frame, binding, e)?.is_null()),
            Predicate::Like {
                expr,
                pattern,
                case_insensitive,
            } => match self.expr(frame, binding, expr)? {
                Value::Null => Truth::Unknown,
                Value::Bytes(_) => Truth::False,
                v => Truth::from_bool(like(&v.to_string(), pattern, *case_insensitive)),
            },
            Predicate::InList(e, values) => {
                let v = self.expr(frame, binding, e)?;
                membership(&v, values)
            }
            Predicate::InSelect(e, select) => {
                let v = self.expr(frame, binding, e)?;
                let values = self.single_column(select)?;
                membership(&v, &values)
            }
            Predicate::And(parts) => {
                let mut result = Truth::True;
                for p in parts {
                    match self.predicate(frame, binding, p)? {
                        Truth::False => return Ok(Truth::False),
                        Truth::Unknown => result = Truth::Unknown,
                        Truth::True => {}
                    }
                }
                result
            }
            Predicate::Or(parts) => {
                let mut result = Truth::False;
                for p in parts {
                    match self.predicate(frame, binding, p)? {
                        Truth::True => return Ok(Truth::True),
                        Truth::Unknown => result = Truth::Unknown,
                        Truth::False => {}
                    }
                }
                result
            }
            Predicate::Not(inner) => self.predicate(frame, binding, inner)?.not(),
        })
    }

    fn single_column(&self, select: &Select) -> StoreResult<Vec<Value>> {
        if select.projection.len() != 1 {
            return Err(StoreError::SubqueryColumns(select.projection.len()));
        }
        let alias = &select.projection[0].alias;
        Ok(self
            .select(select)?
            .into_iter()
            .map(|row| row.get(alias).clone())
            .collect())
    }
}

fn membership(value: &Value, set: &[Value]) -> Truth {
    if value.is_null() {
        return Truth::Unknown;
    }
    if set.contains(value) {
        Truth::True
    } else if set.iter().any(Value::is_null) {
        Truth::Unknown
    } else {
        Truth::False
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Any,
    One,
    Lit(char),
}

fn tokenize(pattern: &str, fold: bool) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => Token::Any,
            '_' => Token::One,
            '\\' => Token::Lit(chars.next().unwrap_or('\\')),
            c => Token::Lit(c),
        });
    }
    if fold {
        for t in &mut tokens {
            if let Token::Lit(c) = t {
                *c = fold_char(*c);
            }
        }
    }
    tokens
}

fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// SQL `LIKE` matching with `\` as escape character.
pub(crate) fn like(text: &str, pattern: &str, case_insensitive: bool) -> bool {
    let tokens = tokenize(pattern, case_insensitive);
    let text: Vec<char> = if case_insensitive {
        text.chars().map(fold_char).collect()
    } else {
        text.chars().collect()
    };

    // matches[j]: tokens[..i] match text[..j]
    let mut matches = vec![false; text.len() + 1];
    matches[0] = true;
    for token in &tokens {
        let mut next = vec![false; text.len() + 1];
        match token {
            Token::Any => {
                let mut reachable = false;
                for j in 0..=text.len() {
                    reachable |= matches[j];
                    next[j] = reachable;
                }
            }
            Token::One => {
                for j in 1..=text.len() {
                    next[j] = matches[j - 1];
                }
            }
            Token::Lit(c) => {
                for j in 1..=text.len() {
                    next[j] = matches[j - 1] && text[j - 1] == *c;
                }
            }
        }
        matches = next;
    }
    matches[text.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_query::Expr;

    fn tables() -> BTreeMap<String, Table> {
        let mut base = Table::new("base", ["id", "name", "flag"]);
        base.insert(Row::new().with("id", 1).with("name", "alpha").with("flag", "n"))
            .unwrap();
        base.insert(Row::new().with("id", 2).with("name", "beta")).unwrap();
        base.insert(Row::new().with("id", 3).with("name", "gamma").with("flag", "y"))
            .unwrap();

        let mut delta = Table::new("delta", ["object_id", "name"]);
        delta.insert(Row::new().with("object_id", 2).with("name", "BETA")).unwrap();
        delta.insert(Row::new().with("name", "fresh")).unwrap();

        [base, delta].into_iter().map(|t| (t.name.clone(), t)).collect()
    }

    fn names(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.get_str("name").unwrap_or("<null>")).collect()
    }

    #[test]
    fn left_join_keeps_unmatched_rows() {
        let t = tables();
        let select = Select::from_table("base", "b")
            .column(
                "name",
                Expr::coalesce(Expr::col("d", "name"), Expr::col("b", "name")),
            )
            .left_join(
                "delta",
                "d",
                Expr::col("d", "object_id").equals(Expr::col("b", "id")),
            );
        let rows = Evaluator::new(&t).select(&select).unwrap();
        assert_eq!(names(&rows), vec!["alpha", "BETA", "gamma"]);
    }

    #[test]
    fn right_join_emits_unmatched_right_rows_with_null_left() {
        let t = tables();
        let select = Select::from_table("base", "b")
            .column("id", Expr::col("b", "id"))
            .column("name", Expr::col("d", "name"))
            .right_join(
                "delta",
                "d",
                Expr::col("d", "object_id").equals(Expr::col("b", "id")),
            )
            .filter(Expr::col("b", "id").is_null());
        let rows = Evaluator::new(&t).select(&select).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("name"), Some("fresh"));
        assert!(rows[0].get("id").is_null());
    }

    #[test]
    fn null_comparisons_are_unknown() {
        let t = tables();
        let select = Select::from_table("base", "b")
            .column("name", Expr::col("b", "name"))
            .filter(Expr::col("b", "flag").equals(Expr::param("n")).negate());
        let rows = Evaluator::new(&t).select(&select).unwrap();
        // beta has NULL flag: NOT(NULL = 'n') is unknown and filtered out
        assert_eq!(names(&rows), vec!["gamma"]);
    }

    #[test]
    fn or_with_is_null_keeps_null_rows() {
        let t = tables();
        let select = Select::from_table("base", "b")
            .column("name", Expr::col("b", "name"))
            .filter(Predicate::or(vec![
                Expr::col("b", "flag").is_null(),
                Expr::col("b", "flag").equals(Expr::param("n")),
            ]));
        let rows = Evaluator::new(&t).select(&select).unwrap();
        assert_eq!(names(&rows), vec!["alpha", "beta"]);
    }

    #[test]
    fn ambiguous_unqualified_column_is_an_error() {
        let t = tables();
        let select = Select::from_table("base", "b")
            .column("name", Expr::name("name"))
            .left_join("delta", "d", Predicate::False);
        let err = Evaluator::new(&t).select(&select).unwrap_err();
        assert!(matches!(err, StoreError::AmbiguousColumn(c) if c == "name"));
    }

    #[test]
    fn unknown_references_are_errors() {
        let t = tables();
        let bad_column = Select::from_table("base", "b").column("x", Expr::col("b", "missing"));
        assert!(matches!(
            Evaluator::new(&t).select(&bad_column),
            Err(StoreError::UnknownColumn(_))
        ));
        let bad_alias = Select::from_table("base", "b").column("x", Expr::col("z", "id"));
        assert!(matches!(
            Evaluator::new(&t).select(&bad_alias),
            Err(StoreError::UnknownAlias(_))
        ));
        let bad_table = Select::from_table("nope", "n").column("x", Expr::col("n", "id"));
        assert!(matches!(
            Evaluator::new(&t).select(&bad_table),
            Err(StoreError::UnknownTable(_))
        ));
    }

    #[test]
    fn union_removes_duplicates_and_derived_table_sorts() {
        let t = tables();
        let part = Select::from_table("base", "b").column("name", Expr::col("b", "name"));
        let outer = Select::from_derived(Query::union(vec![part.clone(), part]), "u")
            .column("name", Expr::name("name"))
            .order_by(Expr::name("name"))
            .limit(2);
        let rows = Evaluator::new(&t).select(&outer).unwrap();
        assert_eq!(names(&rows), vec!["alpha", "beta"]);
    }

    #[test]
    fn nulls_sort_first() {
        let t = tables();
        let select = Select::from_table("base", "b")
            .column("name", Expr::col("b", "name"))
            .order_by(Expr::col("b", "flag"));
        let rows = Evaluator::new(&t).select(&select).unwrap();
        assert_eq!(names(&rows), vec!["beta", "alpha", "gamma"]);
    }

    #[test]
    fn in_select_uses_single_column_result() {
        let t = tables();
        let ids = Select::from_table("delta", "d").column("object_id", Expr::col("d", "object_id"));
        let select = Select::from_table("base", "b")
            .column("name", Expr::col("b", "name"))
            .filter(Expr::col("b", "id").in_select(ids));
        let rows = Evaluator::new(&t).select(&select).unwrap();
        assert_eq!(names(&rows), vec!["beta"]);
    }

    #[test]
    fn not_in_with_null_member_is_unknown() {
        let t = tables();
        let ids = Select::from_table("delta", "d").column("object_id", Expr::col("d", "object_id"));
        let select = Select::from_table("base", "b")
            .column("name", Expr::col("b", "name"))
            .filter(Expr::col("b", "id").in_select(ids).negate());
        assert!(Evaluator::new(&t).select(&select).unwrap().is_empty());
    }

    #[test]
    fn like_wildcards_and_escapes() {
        assert!(like("webserver", "%server", false));
        assert!(like("web1", "web_", false));
        assert!(!like("web12", "web_", false));
        assert!(like("WebServer", "%server%", true));
        assert!(!like("WebServer", "%server%", false));
        assert!(like("100%", "100\\%", false));
        assert!(!like("1000", "100\\%", false));
        assert!(like("a_b", "a\\_b", false));
        assert!(!like("axb", "a\\_b", false));
        assert!(like("", "%", false));
    }
}
