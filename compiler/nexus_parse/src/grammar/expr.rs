//! Expression grammar: the precedence ladder.
//!
//! Lowest to highest: assignment (right-associative) < `||` < `&&` <
//! equality < relational < additive < multiplicative < unary <
//! call/property/index < primary. Same-level operators bind left to
//! right.

use crate::{ParseError, Parser};
use nexus_diagnostic::ErrorCode;
use nexus_ir::{BinaryOp, ExprId, ExprKind, LogicalOp, TokenKind, UnaryOp};

impl Parser<'_> {
    /// expression := assignment
    pub(crate) fn parse_expression(&mut self) -> Result<ExprId, ParseError> {
        self.parse_assignment()
    }

    /// assignment := (IDENT | call `.` IDENT) `=` assignment | logic-or
    fn parse_assignment(&mut self) -> Result<ExprId, ParseError> {
        let lhs = self.parse_logical_or()?;

        if self.cursor.match_kind(TokenKind::Eq) {
            let eq_span = self.cursor.previous_span();
            let value = self.parse_assignment()?;
            let lhs_span = self.arena.expr(lhs).span;
            let kind = match &self.arena.expr(lhs).kind {
                &ExprKind::Ident(name) => ExprKind::Assign { name, value },
                &ExprKind::Get { object, field } => ExprKind::Set {
                    object,
                    field,
                    value,
                },
                _ => {
                    return Err(ParseError::new(
                        ErrorCode::E1003,
                        "invalid assignment target",
                        eq_span,
                    )
                    .with_context("only variables and fields can be assigned"));
                }
            };
            let span = lhs_span.merge(self.arena.expr(value).span);
            return Ok(self.arena.alloc_expr(kind, span));
        }

        Ok(lhs)
    }

    /// logic-or := logic-and (`||` logic-and)*
    fn parse_logical_or(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_logical_and()?;
        while self.cursor.match_kind(TokenKind::PipePipe) {
            let rhs = self.parse_logical_and()?;
            expr = self.alloc_logical(LogicalOp::Or, expr, rhs);
        }
        Ok(expr)
    }

    /// logic-and := equality (`&&` equality)*
    fn parse_logical_and(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_equality()?;
        while self.cursor.match_kind(TokenKind::AmpAmp) {
            let rhs = self.parse_equality()?;
            expr = self.alloc_logical(LogicalOp::And, expr, rhs);
        }
        Ok(expr)
    }

    /// equality := relational ((`==` | `!=`) relational)*
    fn parse_equality(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_relational()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.cursor.advance();
            let rhs = self.parse_relational()?;
            expr = self.alloc_binary(op, expr, rhs);
        }
        Ok(expr)
    }

    /// relational := additive ((`<` | `<=` | `>` | `>=`) additive)*
    fn parse_relational(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_additive()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.cursor.advance();
            let rhs = self.parse_additive()?;
            expr = self.alloc_binary(op, expr, rhs);
        }
        Ok(expr)
    }

    /// additive := multiplicative ((`+` | `-`) multiplicative)*
    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.cursor.advance();
            let rhs = self.parse_multiplicative()?;
            expr = self.alloc_binary(op, expr, rhs);
        }
        Ok(expr)
    }

    /// multiplicative := unary ((`*` | `/`) unary)*
    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.cursor.advance();
            let rhs = self.parse_unary()?;
            expr = self.alloc_binary(op, expr, rhs);
        }
        Ok(expr)
    }

    /// unary := (`!` | `-`) unary | postfix
    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let op = match self.cursor.current_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        let start = self.cursor.current_span();
        self.cursor.advance();
        let operand = self.parse_unary()?;
        let span = start.merge(self.arena.expr(operand).span);
        Ok(self.arena.alloc_expr(ExprKind::Unary { op, operand }, span))
    }

    /// postfix := primary (`(` args? `)` | `.` IDENT | `[` expression `]`)*
    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::LParen => {
                    self.cursor.advance();
                    let mut args = Vec::new();
                    if !self.cursor.check(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expression()?);
                            if !self.cursor.match_kind(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.cursor.expect(TokenKind::RParen)?;
                    let args = self.arena.alloc_expr_list(args);
                    let span = self
                        .arena
                        .expr(expr)
                        .span
                        .merge(self.cursor.previous_span());
                    expr = self
                        .arena
                        .alloc_expr(ExprKind::Call { callee: expr, args }, span);
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let (field, field_span) = self.cursor.expect_ident("property name")?;
                    let span = self.arena.expr(expr).span.merge(field_span);
                    expr = self
                        .arena
                        .alloc_expr(ExprKind::Get { object: expr, field }, span);
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let index = self.parse_expression()?;
                    self.cursor.expect(TokenKind::RBracket)?;
                    let span = self
                        .arena
                        .expr(expr)
                        .span
                        .merge(self.cursor.previous_span());
                    expr = self
                        .arena
                        .alloc_expr(ExprKind::Index { object: expr, index }, span);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// primary := literal | IDENT | `(` expression `)` | array-literal
    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let span = self.cursor.current_span();
        match self.cursor.current_kind() {
            TokenKind::Number(bits) => {
                self.cursor.advance();
                Ok(self
                    .arena
                    .alloc_expr(ExprKind::Number(f64::from_bits(bits)), span))
            }
            TokenKind::Str(name) => {
                self.cursor.advance();
                Ok(self.arena.alloc_expr(ExprKind::Str(name), span))
            }
            TokenKind::True => {
                self.cursor.advance();
                Ok(self.arena.alloc_expr(ExprKind::Bool(true), span))
            }
            TokenKind::False => {
                self.cursor.advance();
                Ok(self.arena.alloc_expr(ExprKind::Bool(false), span))
            }
            TokenKind::Null => {
                self.cursor.advance();
                Ok(self.arena.alloc_expr(ExprKind::Null, span))
            }
            TokenKind::Ident(name) => {
                self.cursor.advance();
                Ok(self.arena.alloc_expr(ExprKind::Ident(name), span))
            }
            TokenKind::LParen => {
                // Grouping folds away: the parenthesized expression is
                // the node.
                self.cursor.advance();
                let expr = self.parse_expression()?;
                self.cursor.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let mut items = Vec::new();
                if !self.cursor.check(TokenKind::RBracket) {
                    loop {
                        items.push(self.parse_expression()?);
                        if !self.cursor.match_kind(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.cursor.expect(TokenKind::RBracket)?;
                let items = self.arena.alloc_expr_list(items);
                let span = span.merge(self.cursor.previous_span());
                Ok(self.arena.alloc_expr(ExprKind::Array(items), span))
            }
            other => Err(ParseError::new(
                ErrorCode::E1001,
                format!("expected expression, found {}", other.describe()),
                span,
            )),
        }
    }

    fn alloc_binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        let span = self.arena.expr(lhs).span.merge(self.arena.expr(rhs).span);
        self.arena.alloc_expr(ExprKind::Binary { op, lhs, rhs }, span)
    }

    fn alloc_logical(&mut self, op: LogicalOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        let span = self.arena.expr(lhs).span.merge(self.arena.expr(rhs).span);
        self.arena.alloc_expr(ExprKind::Logical { op, lhs, rhs }, span)
    }
}
