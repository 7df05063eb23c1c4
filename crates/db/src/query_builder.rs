//! Conditional SQL assembly.
//!
//! Entity modules describe WHERE conditions, SET assignments and INSERT
//! columns declaratively, each paired with an `include` flag. Only included
//! pieces reach the SQL, and each piece carries its own parameters, so the
//! positional parameter list always lines up with the placeholders.
//!
//! Fragments are written with `?` placeholders; [`Statement::build`]
//! rewrites them to Postgres `$n` in order. Only fixed column/table names
//! and keywords are ever interpolated.

use flock_core::error::CoreError;
use flock_core::patch::Patch;
use serde::Deserialize;

use crate::cache::QueryCache;
use crate::gateway::{Gateway, QueryOutput, SqlValue};

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// One condition or assignment with its bound values.
#[derive(Debug, Clone)]
pub struct Fragment {
    sql: String,
    params: Vec<SqlValue>,
    include: bool,
}

impl Fragment {
    /// Fragment without placeholders, e.g. `archived = FALSE`.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            include: true,
        }
    }

    /// Fragment with exactly one `?` placeholder.
    pub fn bind(sql: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params: vec![value.into()],
            include: true,
        }
    }

    /// Included only when `value` is present.
    pub fn optional<V: Into<SqlValue>>(sql: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => Self::bind(sql, v),
            None => Self::raw(sql).when(false),
        }
    }

    /// `column = ANY(?)` over a list of ids, omitted when the list is absent
    /// or empty (an empty IN-list is not valid SQL).
    pub fn any_id(column: &str, ids: Option<&[i64]>) -> Self {
        match ids {
            Some(ids) if !ids.is_empty() => Self::bind(format!("{column} = ANY(?)"), ids),
            _ => Self::raw(column).when(false),
        }
    }

    /// Assignment for a clearable column: `column = ?` for a value,
    /// `column = NULL` for an explicit clear, omitted when unset.
    pub fn patch<V: Clone + Into<SqlValue>>(column: &str, patch: &Patch<V>) -> Self {
        match patch {
            Patch::Unset => Self::raw(column).when(false),
            Patch::Null => Self::raw(format!("{column} = NULL")),
            Patch::Value(v) => Self::bind(format!("{column} = ?"), v.clone()),
        }
    }

    pub fn when(mut self, include: bool) -> Self {
        self.include = include;
        self
    }

    pub fn is_included(&self) -> bool {
        self.include
    }
}

/// Boolean operator joining WHERE fragments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Joiner {
    #[default]
    And,
    Or,
}

impl Joiner {
    fn as_sql(self) -> &'static str {
        match self {
            Joiner::And => " AND ",
            Joiner::Or => " OR ",
        }
    }
}

/// A rendered clause and the parameters its placeholders consume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clause {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Clause {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

fn join_included(fragments: Vec<Fragment>, separator: &str) -> Clause {
    let mut parts = Vec::new();
    let mut params = Vec::new();
    for fragment in fragments.into_iter().filter(|f| f.include) {
        parts.push(fragment.sql);
        params.extend(fragment.params);
    }
    Clause {
        sql: parts.join(separator),
        params,
    }
}

/// ` WHERE a AND b`, or an empty clause if nothing is included.
pub fn where_clause(fragments: Vec<Fragment>, joiner: Joiner) -> Clause {
    let mut clause = join_included(fragments, joiner.as_sql());
    if !clause.is_empty() {
        clause.sql = format!(" WHERE {}", clause.sql);
    }
    clause
}

/// ` SET a = ?, b = ?`, or an empty clause if nothing is included.
pub fn set_clause(fragments: Vec<Fragment>) -> Clause {
    let mut clause = join_included(fragments, ", ");
    if !clause.is_empty() {
        clause.sql = format!(" SET {}", clause.sql);
    }
    clause
}

// ---------------------------------------------------------------------------
// INSERT columns
// ---------------------------------------------------------------------------

/// One INSERT column with its value and placeholder expression.
#[derive(Debug, Clone)]
pub struct InsertColumn {
    column: &'static str,
    placeholder: &'static str,
    value: Option<SqlValue>,
}

impl InsertColumn {
    pub fn new(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Self {
            column,
            placeholder: "?",
            value: Some(value.into()),
        }
    }

    /// Included only when `value` is present; otherwise the column default
    /// applies.
    pub fn optional<V: Into<SqlValue>>(column: &'static str, value: Option<V>) -> Self {
        Self {
            column,
            placeholder: "?",
            value: value.map(Into::into),
        }
    }

    /// Override the placeholder expression, e.g. `?::NUMERIC`.
    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

/// `(a, b) VALUES (?, ?)` over the included columns, in the order given.
pub fn insert_clause(columns: Vec<InsertColumn>) -> Clause {
    let mut names = Vec::new();
    let mut placeholders = Vec::new();
    let mut params = Vec::new();
    for column in columns {
        if let Some(value) = column.value {
            names.push(column.column);
            placeholders.push(column.placeholder);
            params.push(value);
        }
    }
    if names.is_empty() {
        return Clause::default();
    }
    Clause {
        sql: format!("({}) VALUES ({})", names.join(", "), placeholders.join(", ")),
        params,
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A sortable field of one entity, mapped to a fixed column name.
pub trait SortKey {
    fn column(&self) -> &'static str;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination<K> {
    pub sort_key: K,
    #[serde(default)]
    pub sort_order: SortOrder,
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

/// ` ORDER BY <key> <order> LIMIT <n> OFFSET <m>`, or an empty string.
pub fn pagination_clause<K: SortKey>(pagination: Option<&Pagination<K>>) -> String {
    match pagination {
        Some(p) => format!(
            " ORDER BY {} {} LIMIT {} OFFSET {}",
            p.sort_key.column(),
            p.sort_order.as_sql(),
            p.limit,
            p.offset
        ),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Statement
// ---------------------------------------------------------------------------

/// A statement under construction: SQL text with `?` placeholders plus the
/// parameters consumed by them, in order.
#[derive(Debug, Clone, Default)]
pub struct Statement {
    sql: String,
    params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append literal SQL (no placeholders).
    pub fn push(mut self, sql: &str) -> Self {
        self.sql.push_str(sql);
        self
    }

    /// Bind the value for the next `?` already present in the SQL.
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn clause(mut self, clause: Clause) -> Self {
        self.sql.push_str(&clause.sql);
        self.params.extend(clause.params);
        self
    }

    /// Rewrite `?` placeholders to `$1..$n` and return the final statement.
    pub fn build(self) -> (String, Vec<SqlValue>) {
        let mut sql = String::with_capacity(self.sql.len() + 8);
        let mut n = 0;
        for ch in self.sql.chars() {
            if ch == '?' {
                n += 1;
                sql.push('$');
                sql.push_str(&n.to_string());
            } else {
                sql.push(ch);
            }
        }
        debug_assert_eq!(n, self.params.len(), "placeholder/parameter mismatch: {sql}");
        (sql, self.params)
    }

    pub async fn run(self, gateway: &dyn Gateway) -> Result<QueryOutput, CoreError> {
        let (sql, params) = self.build();
        gateway.query(&sql, &params).await
    }

    /// Like [`Statement::run`], but answered from `cache` when possible.
    pub async fn run_cached(
        self,
        gateway: &dyn Gateway,
        cache: &QueryCache,
    ) -> Result<QueryOutput, CoreError> {
        let (sql, params) = self.build();
        cache.cache_query(gateway, &sql, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum TestKey {
        Name,
    }

    impl SortKey for TestKey {
        fn column(&self) -> &'static str {
            match self {
                TestKey::Name => "name",
            }
        }
    }

    #[test]
    fn where_clause_keeps_only_included_fragments() {
        let clause = where_clause(
            vec![
                Fragment::any_id("id", Some(&[1, 2])),
                Fragment::any_id("household_id", None),
                Fragment::raw("archived = FALSE"),
            ],
            Joiner::And,
        );
        assert_eq!(clause.sql, " WHERE id = ANY(?) AND archived = FALSE");
        assert_eq!(clause.params, vec![SqlValue::IntList(vec![1, 2])]);
    }

    #[test]
    fn where_clause_is_empty_when_nothing_included() {
        let clause = where_clause(
            vec![
                Fragment::any_id("id", Some(&[])),
                Fragment::raw("archived = FALSE").when(false),
            ],
            Joiner::And,
        );
        assert!(clause.is_empty());
        assert!(clause.params.is_empty());
    }

    #[test]
    fn where_clause_supports_or() {
        let clause = where_clause(
            vec![Fragment::raw("a = 1"), Fragment::raw("b = 2")],
            Joiner::Or,
        );
        assert_eq!(clause.sql, " WHERE a = 1 OR b = 2");
    }

    #[test]
    fn set_clause_joins_with_commas() {
        let clause = set_clause(vec![
            Fragment::optional("name = ?", Some("Smith Family")),
            Fragment::optional::<String>("city = ?", None),
            Fragment::raw("head_id = NULL"),
            Fragment::bind("modified_by = ?", 9_i64),
        ]);
        assert_eq!(clause.sql, " SET name = ?, head_id = NULL, modified_by = ?");
        assert_eq!(
            clause.params,
            vec![SqlValue::from("Smith Family"), SqlValue::Int(9)]
        );
    }

    #[test]
    fn patch_fragments_distinguish_unset_null_and_value() {
        let clause = set_clause(vec![
            Fragment::patch("phone", &Patch::<String>::Unset),
            Fragment::patch("email", &Patch::<String>::Null),
            Fragment::patch("title", &Patch::Value("Deacon".to_string())),
        ]);
        assert_eq!(clause.sql, " SET email = NULL, title = ?");
        assert_eq!(clause.params, vec![SqlValue::from("Deacon")]);
    }

    #[test]
    fn insert_clause_keeps_columns_and_values_aligned() {
        let clause = insert_clause(vec![
            InsertColumn::new("name", "Smith Family"),
            InsertColumn::optional::<String>("address_line2", None),
            InsertColumn::new("amount", "10.00").placeholder("?::NUMERIC"),
            InsertColumn::new("created_by", 3_i64),
        ]);
        assert_eq!(
            clause.sql,
            "(name, amount, created_by) VALUES (?, ?::NUMERIC, ?)"
        );
        assert_eq!(clause.params.len(), 3);
        assert_eq!(clause.params[1], SqlValue::from("10.00"));
    }

    #[test]
    fn pagination_clause_renders_or_is_empty() {
        let p = Pagination {
            sort_key: TestKey::Name,
            sort_order: SortOrder::Desc,
            limit: 20,
            offset: 40,
        };
        assert_eq!(
            pagination_clause(Some(&p)),
            " ORDER BY name DESC LIMIT 20 OFFSET 40"
        );
        assert_eq!(pagination_clause::<TestKey>(None), "");
    }

    #[test]
    fn build_numbers_placeholders_in_order() {
        let (sql, params) = Statement::new("UPDATE households")
            .clause(set_clause(vec![Fragment::bind("name = ?", "Doe")]))
            .push(" WHERE id = ?")
            .bind(5_i64)
            .build();
        assert_eq!(sql, "UPDATE households SET name = $1 WHERE id = $2");
        assert_eq!(params, vec![SqlValue::from("Doe"), SqlValue::Int(5)]);
    }
}
