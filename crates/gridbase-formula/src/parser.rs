//! Formula parser
//!
//! A recursive descent parser over the token stream, with standard
//! arithmetic precedence and left associativity:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := NUMBER | reference | '(' expr ')'
//! ```

use crate::ast::{BinaryOp, Expr, Reference};
use crate::error::{FormulaError, FormulaResult};
use crate::token::{tokenize, Token};

/// Parse a formula string into an expression tree
///
/// # Example
/// ```rust
/// use gridbase_formula::parse_formula;
///
/// let expr = parse_formula("{Subtotal} * (1 + {Category.TaxRate})").unwrap();
/// assert!(expr.uses_cross_table_refs());
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<Expr> {
    let tokens = tokenize(formula)?;
    let mut parser = Parser::new(&tokens);
    let expr = parser.parse_expr()?;

    // Reject trailing tokens: `{A} {B}` is an error, not silently `{A}`.
    match parser.peek() {
        None => Ok(expr),
        Some(Token::RightParen) => Err(FormulaError::Parse("unmatched ')'".into())),
        Some(tok) => Err(FormulaError::Parse(format!(
            "unexpected '{tok}' after expression; expected an operator"
        ))),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_expr(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_operand(op, Self::parse_term)?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_factor()?;

        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Multiply,
                Some(Token::Slash) => BinaryOp::Divide,
                _ => break,
            };
            self.advance();
            let right = self.parse_operand(op, Self::parse_factor)?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parse the right operand of `op`, naming the operator on failure
    fn parse_operand(
        &mut self,
        op: BinaryOp,
        parse: fn(&mut Self) -> FormulaResult<Expr>,
    ) -> FormulaResult<Expr> {
        if self.peek().is_none() {
            return Err(FormulaError::Parse(format!(
                "expected operand after '{}'",
                op.symbol()
            )));
        }
        parse(self)
    }

    fn parse_factor(&mut self) -> FormulaResult<Expr> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(*n)),

            Some(Token::Reference(body)) => Ok(Expr::Reference(parse_reference(body)?)),

            Some(Token::LeftParen) => {
                let inner = self.parse_expr()?;
                match self.advance() {
                    Some(Token::RightParen) => Ok(Expr::Grouping(Box::new(inner))),
                    _ => Err(FormulaError::Parse("unclosed '(': expected ')'".into())),
                }
            }

            Some(tok) => Err(FormulaError::Parse(format!(
                "expected a number, reference, or '(' but found '{tok}'"
            ))),

            None => Err(FormulaError::Parse(
                "unexpected end of formula: expected a number, reference, or '('".into(),
            )),
        }
    }
}

/// Split a reference body on its first dot
///
/// No dot is a plain column reference; one dot is a one-hop cross-table
/// reference. Deeper chains are rejected here, in the parser, so the rest
/// of the engine never sees them.
fn parse_reference(body: &str) -> FormulaResult<Reference> {
    if body.is_empty() {
        return Err(FormulaError::Parse("empty reference '{}'".into()));
    }

    match body.split_once('.') {
        None => Ok(Reference::Column(body.to_string())),
        Some((lookup, field)) => {
            if field.contains('.') {
                return Err(FormulaError::Parse(format!(
                    "reference '{{{body}}}' has more than one '.': cross-table references \
                     support a single hop ({{Lookup.Field}})"
                )));
            }
            if lookup.is_empty() || field.is_empty() {
                return Err(FormulaError::Parse(format!(
                    "reference '{{{body}}}' is missing a name on one side of the '.'"
                )));
            }
            Ok(Reference::CrossTable {
                lookup: lookup.to_string(),
                field: field.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn column(name: &str) -> Expr {
        Expr::Reference(Reference::Column(name.into()))
    }

    fn number(n: i64) -> Expr {
        Expr::Number(Decimal::from(n))
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("42").unwrap(), number(42));
        assert_eq!(
            parse_formula("3.14").unwrap(),
            Expr::Number(Decimal::new(314, 2))
        );
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let expr = parse_formula("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                op: BinaryOp::Add,
                left: Box::new(number(1)),
                right: Box::new(Expr::BinaryOp {
                    op: BinaryOp::Multiply,
                    left: Box::new(number(2)),
                    right: Box::new(number(3)),
                }),
            }
        );
    }

    #[test]
    fn test_left_associativity() {
        // 10 - 2 - 3 parses as (10 - 2) - 3
        let expr = parse_formula("10 - 2 - 3").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                op: BinaryOp::Subtract,
                left: Box::new(Expr::BinaryOp {
                    op: BinaryOp::Subtract,
                    left: Box::new(number(10)),
                    right: Box::new(number(2)),
                }),
                right: Box::new(number(3)),
            }
        );
    }

    #[test]
    fn test_parentheses() {
        let expr = parse_formula("(1 + 2) * 3").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                op: BinaryOp::Multiply,
                left: Box::new(Expr::Grouping(Box::new(Expr::BinaryOp {
                    op: BinaryOp::Add,
                    left: Box::new(number(1)),
                    right: Box::new(number(2)),
                }))),
                right: Box::new(number(3)),
            }
        );
    }

    #[test]
    fn test_parse_references() {
        assert_eq!(parse_formula("{Subtotal}").unwrap(), column("Subtotal"));
        assert_eq!(
            parse_formula("{Category.TaxRate}").unwrap(),
            Expr::Reference(Reference::CrossTable {
                lookup: "Category".into(),
                field: "TaxRate".into(),
            })
        );
    }

    #[test]
    fn test_multi_dot_reference_rejected() {
        let err = parse_formula("{A.B.C}").unwrap_err();
        assert!(matches!(err, FormulaError::Parse(msg) if msg.contains("single hop")));
    }

    #[test]
    fn test_empty_reference_rejected() {
        assert!(matches!(
            parse_formula("{}"),
            Err(FormulaError::Parse(msg)) if msg.contains("empty reference")
        ));
        assert!(parse_formula("{.Field}").is_err());
        assert!(parse_formula("{Lookup.}").is_err());
    }

    #[test]
    fn test_missing_operand() {
        let err = parse_formula("{A} *").unwrap_err();
        assert_eq!(
            err,
            FormulaError::Parse("expected operand after '*'".into())
        );
    }

    #[test]
    fn test_unbalanced_parens_identify_side() {
        let err = parse_formula("(1 + 2").unwrap_err();
        assert!(matches!(err, FormulaError::Parse(msg) if msg.contains("unclosed '('")));

        let err = parse_formula("1 + 2)").unwrap_err();
        assert!(matches!(err, FormulaError::Parse(msg) if msg.contains("unmatched ')'")));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = parse_formula("{A} {B}").unwrap_err();
        assert!(matches!(err, FormulaError::Parse(msg) if msg.contains("after expression")));
    }

    #[test]
    fn test_display_round_trip() {
        for formula in [
            "{A} + {B} * 2",
            "({A} + {B}) * 2",
            "{Category.TaxRate} * {Subtotal}",
            "1.5 / ({A} - 3)",
            "((1))",
        ] {
            let expr = parse_formula(formula).unwrap();
            let reparsed = parse_formula(&expr.to_string()).unwrap();
            assert_eq!(reparsed, expr, "round trip failed for {formula}");
        }
    }
}
