//! SELECT-clause parsing for column attribution.
//!
//! Uses sqlparser-rs with the PostgreSQL dialect to extract the projection
//! shape and FROM table from generated SQL, replacing pattern-matching on the
//! query text. Anything the parser cannot handle degrades to
//! `Projection::Unknown` and is resolved by label reconciliation.

use sqlparser::ast::{
    Expr, FunctionArg, FunctionArgExpr, FunctionArguments, Select, SelectItem, SetExpr, Statement,
    TableFactor,
};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

/// Aggregate function names that collapse the projection to a single label.
const AGGREGATE_FUNCTIONS: [&str; 5] = ["count", "sum", "avg", "min", "max"];

/// The shape of a SELECT projection, as far as label inference cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `SELECT *` (or `SELECT t.*`): labels come from schema metadata.
    Wildcard,
    /// A recognized aggregate call: one synthesized label.
    /// `column` is None for a wildcard argument (`COUNT(*)`).
    Aggregate {
        function: String,
        column: Option<String>,
    },
    /// An explicit column list: one label per projection item, in order.
    Columns(Vec<String>),
    /// The SQL could not be parsed as a SELECT.
    Unknown,
}

/// Result of parsing a SQL string for label inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelect {
    /// The projection shape.
    pub projection: Projection,
    /// The table named in the FROM clause, if one was found.
    pub from_table: Option<String>,
}

impl ParsedSelect {
    fn unknown() -> Self {
        Self {
            projection: Projection::Unknown,
            from_table: None,
        }
    }
}

/// Parses a SQL string and extracts the projection shape and FROM table.
///
/// Never fails: unparseable input yields `Projection::Unknown` with no table.
pub fn parse_select(sql: &str) -> ParsedSelect {
    let dialect = PostgreSqlDialect {};
    let statements = match Parser::parse_sql(&dialect, sql) {
        Ok(statements) => statements,
        Err(_) => return ParsedSelect::unknown(),
    };

    let select = match statements.first() {
        Some(Statement::Query(query)) => match query.body.as_ref() {
            SetExpr::Select(select) => select.clone(),
            _ => return ParsedSelect::unknown(),
        },
        _ => return ParsedSelect::unknown(),
    };

    ParsedSelect {
        projection: infer_projection(&select),
        from_table: from_table(&select),
    }
}

/// Determines the projection shape from a parsed SELECT.
fn infer_projection(select: &Select) -> Projection {
    // A lone wildcard defers entirely to schema metadata.
    if select.projection.len() == 1
        && matches!(
            select.projection[0],
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(_, _)
        )
    {
        return Projection::Wildcard;
    }

    // The first recognized aggregate wins and collapses to a single label,
    // mirroring how the original attribution treated aggregated queries.
    for item in &select.projection {
        let expr = match item {
            SelectItem::UnnamedExpr(expr) => expr,
            SelectItem::ExprWithAlias { expr, .. } => expr,
            _ => continue,
        };
        if let Expr::Function(function) = expr {
            let name = function
                .name
                .0
                .last()
                .map(|ident| ident.value.to_lowercase())
                .unwrap_or_default();
            if AGGREGATE_FUNCTIONS.contains(&name.as_str()) {
                return Projection::Aggregate {
                    function: name.to_uppercase(),
                    column: aggregate_argument(&function.args),
                };
            }
        }
    }

    Projection::Columns(select.projection.iter().map(item_label).collect())
}

/// Extracts the column argument of an aggregate call, or None for wildcards.
fn aggregate_argument(args: &FunctionArguments) -> Option<String> {
    let list = match args {
        FunctionArguments::List(list) => list,
        _ => return None,
    };

    match list.args.first() {
        Some(FunctionArg::Unnamed(FunctionArgExpr::Wildcard)) => None,
        Some(FunctionArg::Unnamed(FunctionArgExpr::QualifiedWildcard(_))) => None,
        Some(FunctionArg::Unnamed(FunctionArgExpr::Expr(expr))) => Some(expr_label(expr)),
        _ => None,
    }
}

/// Renders a projection item as a display label.
fn item_label(item: &SelectItem) -> String {
    match item {
        SelectItem::UnnamedExpr(expr) => expr_label(expr),
        SelectItem::ExprWithAlias { alias, .. } => alias.value.clone(),
        SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(_, _) => "*".to_string(),
    }
}

/// Renders an expression as a label, with identifier quoting stripped.
fn expr_label(expr: &Expr) -> String {
    match expr {
        Expr::Identifier(ident) => ident.value.clone(),
        Expr::CompoundIdentifier(idents) => idents
            .iter()
            .map(|ident| ident.value.clone())
            .collect::<Vec<_>>()
            .join("."),
        other => other.to_string(),
    }
}

/// Extracts the table name from the first FROM relation.
fn from_table(select: &Select) -> Option<String> {
    let relation = &select.from.first()?.relation;
    match relation {
        TableFactor::Table { name, .. } => name.0.last().map(|ident| ident.value.clone()),
        _ => None,
    }
}
