//! Expression grammar.
//!
//! Classic precedence-climbing recursive descent:
//!
//! ```text
//! ternary    := or ("?" expr ":" expr)?
//! or         := and ("||" and)*
//! and        := equality ("&&" equality)*
//! equality   := comparison (("==" | "!=") comparison)*
//! comparison := additive (("<" | "<=" | ">" | ">=") additive)*
//! additive   := multiplicative (("+" | "-") multiplicative)*
//! multiplicative := unary (("*" | "/" | "%") unary)*
//! unary      := ("-" | "!") unary | postfix
//! postfix    := primary ("." ident | "[" expr "]")*
//! ```

use crate::{ParseError, Parser};
use calc_ir::{BinaryOp, Expr, ExprId, ExprKind, TokenKind, UnaryOp};

impl Parser<'_> {
    // Operator matching helpers.

    fn match_equality_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::EqEq => Some(BinaryOp::Eq),
            TokenKind::NotEq => Some(BinaryOp::NotEq),
            _ => None,
        }
    }

    fn match_comparison_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::LtEq => Some(BinaryOp::LtEq),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::GtEq => Some(BinaryOp::GtEq),
            _ => None,
        }
    }

    fn match_additive_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        }
    }

    fn match_multiplicative_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Mod),
            _ => None,
        }
    }

    fn match_unary_op(&self) -> Option<UnaryOp> {
        match self.current_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        }
    }

    // Precedence levels.

    pub(crate) fn parse_ternary(&mut self) -> Result<ExprId, ParseError> {
        let cond = self.parse_or()?;

        if !self.check(&TokenKind::Question) {
            return Ok(cond);
        }
        self.advance();
        let then = self.parse_expr()?;
        self.expect(&TokenKind::Colon)?;
        let otherwise = self.parse_expr()?;

        let span = self
            .arena_get_span(cond)
            .merge(self.arena_get_span(otherwise));
        Ok(self.alloc(
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            },
            span,
        ))
    }

    fn parse_or(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.check(&TokenKind::OrOr) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = self.alloc_binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.check(&TokenKind::AndAnd) {
            self.advance();
            let rhs = self.parse_equality()?;
            lhs = self.alloc_binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_comparison()?;
        while let Some(op) = self.match_equality_op() {
            self.advance();
            let rhs = self.parse_comparison()?;
            lhs = self.alloc_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_additive()?;
        while let Some(op) = self.match_comparison_op() {
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = self.alloc_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        while let Some(op) = self.match_additive_op() {
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = self.alloc_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = self.match_multiplicative_op() {
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = self.alloc_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        if let Some(op) = self.match_unary_op() {
            let start = self.current_span();
            self.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(self.arena_get_span(operand));
            return Ok(self.alloc(ExprKind::Unary { op, operand }, span));
        }
        self.parse_postfix()
    }

    /// Parse a primary expression and apply postfix operators.
    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&TokenKind::Dot) {
                self.advance();
                let field = self.expect_ident()?;
                let span = self.arena_get_span(expr).merge(self.previous_span());
                expr = self.alloc(
                    ExprKind::Field {
                        receiver: expr,
                        field,
                    },
                    span,
                );
            } else if self.check(&TokenKind::LBracket) {
                self.advance();
                let index = self.parse_expr()?;
                self.expect(&TokenKind::RBracket)?;
                let span = self.arena_get_span(expr).merge(self.previous_span());
                expr = self.alloc(
                    ExprKind::Index {
                        receiver: expr,
                        index,
                    },
                    span,
                );
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let span = self.current_span();
        let kind = match self.current_kind().clone() {
            TokenKind::Int(n) => {
                self.advance();
                ExprKind::Int(n)
            }
            TokenKind::Float(n) => {
                self.advance();
                ExprKind::Float(n)
            }
            TokenKind::Str(s) => {
                self.advance();
                ExprKind::Str(s)
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::LBracket => return self.parse_array_literal(),
            TokenKind::Ident(name) if name == "datasources" => {
                return self.parse_datasource_ref();
            }
            TokenKind::Ident(name) => {
                self.advance();
                ExprKind::Ident(name)
            }
            other => {
                return Err(ParseError::expected_expression(&other, span));
            }
        };
        Ok(self.alloc(kind, span))
    }

    /// Parse `[a, b, c]`. A trailing comma is tolerated.
    fn parse_array_literal(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.expect(&TokenKind::LBracket)?;

        let mut items = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            items.push(self.parse_expr()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&TokenKind::RBracket)?;

        let span = start.merge(self.previous_span());
        Ok(self.alloc(ExprKind::Array(items), span))
    }

    /// Parse a datasource reference starting at the `datasources` keyword.
    ///
    /// Both syntaxes fold into one `DatasourceRef` node here:
    /// - `datasources.name`
    /// - `datasources["name"]` (single quotes work too)
    ///
    /// The name must be statically known; `datasources[expr]` is rejected
    /// so the dependency walk stays exact.
    fn parse_datasource_ref(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.advance(); // `datasources`

        let name = if self.check(&TokenKind::Dot) {
            self.advance();
            self.expect_ident()?
        } else if self.check(&TokenKind::LBracket) {
            self.advance();
            let name = match self.current_kind() {
                TokenKind::Str(s) => {
                    let s = s.clone();
                    self.advance();
                    s
                }
                other => {
                    return Err(ParseError::expected_datasource_name(
                        other,
                        self.current_span(),
                    ));
                }
            };
            self.expect(&TokenKind::RBracket)?;
            name
        } else {
            return Err(ParseError::expected_datasource_name(
                self.current_kind(),
                self.current_span(),
            ));
        };

        let span = start.merge(self.previous_span());
        Ok(self.alloc(ExprKind::DatasourceRef { name }, span))
    }

    // Arena helpers.

    fn alloc(&mut self, kind: ExprKind, span: calc_ir::Span) -> ExprId {
        self.arena_mut().alloc_expr(Expr::new(kind, span))
    }

    fn alloc_binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        let span = self.arena_get_span(lhs).merge(self.arena_get_span(rhs));
        self.alloc(ExprKind::Binary { op, lhs, rhs }, span)
    }
}
