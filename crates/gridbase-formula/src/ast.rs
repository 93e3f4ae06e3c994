//! Formula expression tree

use std::fmt;

use rust_decimal::Decimal;

/// Binary arithmetic operators, in formula syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    /// The operator's formula-syntax symbol
    pub fn symbol(&self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Subtract => '-',
            BinaryOp::Multiply => '*',
            BinaryOp::Divide => '/',
        }
    }
}

/// A formula reference, exactly one of the two user-facing shapes
///
/// The one-hop limit on cross-table references is structural: there is no
/// general path type, so deeper chains cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `{Name}` — a column on the formula's own table
    Column(String),
    /// `{Lookup.Field}` — a field on the record linked through a lookup
    /// column of the formula's own table
    CrossTable { lookup: String, field: String },
}

/// A formula expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(Decimal),
    /// Column or cross-table reference
    Reference(Reference),
    /// Binary arithmetic
    BinaryOp {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Parenthesized sub-expression, kept so re-serialization preserves
    /// the user's grouping
    Grouping(Box<Expr>),
}

impl Expr {
    /// All references in the expression, left to right
    pub fn references(&self) -> Vec<&Reference> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a Reference>) {
        match self {
            Expr::Number(_) => {}
            Expr::Reference(r) => refs.push(r),
            Expr::BinaryOp { left, right, .. } => {
                left.collect_references(refs);
                right.collect_references(refs);
            }
            Expr::Grouping(inner) => inner.collect_references(refs),
        }
    }

    /// Whether the expression contains any cross-table reference
    pub fn uses_cross_table_refs(&self) -> bool {
        self.references()
            .iter()
            .any(|r| matches!(r, Reference::CrossTable { .. }))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Column(name) => write!(f, "{{{name}}}"),
            Reference::CrossTable { lookup, field } => write!(f, "{{{lookup}.{field}}}"),
        }
    }
}

/// Canonical re-serialization; re-parsing the output reproduces an equal tree
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{n}"),
            Expr::Reference(r) => write!(f, "{r}"),
            Expr::BinaryOp { op, left, right } => {
                write!(f, "{left} {} {right}", op.symbol())
            }
            Expr::Grouping(inner) => write!(f, "({inner})"),
        }
    }
}
