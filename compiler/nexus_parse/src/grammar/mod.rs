//! Statement and declaration grammar.
//!
//! Expressions live in [`expr`]; this module covers declarations
//! (`var`, `const`, `func`, `class`) and block-structured statements.

mod expr;

use crate::{ParseError, Parser};
use nexus_diagnostic::ErrorCode;
use nexus_ir::{FuncId, Function, Name, Span, StmtId, StmtKind, StmtRange, TokenKind};

impl Parser<'_> {
    /// declaration := var-decl | const-decl | func-decl | class-decl
    ///              | statement
    pub(crate) fn parse_declaration(&mut self) -> Result<StmtId, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Var => self.parse_var_decl(),
            TokenKind::Const => self.parse_const_decl(),
            TokenKind::Func => {
                let func = self.parse_function()?;
                let span = self.func_span(func);
                Ok(self.arena.alloc_stmt(StmtKind::Func(func), span))
            }
            TokenKind::Class => self.parse_class_decl(),
            _ => self.parse_statement(),
        }
    }

    /// var-decl := `var` IDENT (`=` expression)? `;`
    fn parse_var_decl(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance();
        let (name, _) = self.cursor.expect_ident("variable name")?;
        let init = if self.cursor.match_kind(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.cursor.expect(TokenKind::Semicolon)?;
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_stmt(StmtKind::VarDecl { name, init }, span))
    }

    /// const-decl := `const` IDENT `=` expression `;`
    fn parse_const_decl(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance();
        let (name, _) = self.cursor.expect_ident("constant name")?;
        self.cursor.expect(TokenKind::Eq)?;
        let init = self.parse_expression()?;
        self.cursor.expect(TokenKind::Semicolon)?;
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_stmt(StmtKind::ConstDecl { name, init }, span))
    }

    /// function := `func` IDENT `(` params? `)` `{` declaration* `}`
    ///
    /// Shared by top-level declarations and class methods.
    fn parse_function(&mut self) -> Result<FuncId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.expect(TokenKind::Func)?;
        let (name, _) = self.cursor.expect_ident("function name")?;

        self.cursor.expect(TokenKind::LParen)?;
        let mut params: Vec<Name> = Vec::new();
        if !self.cursor.check(TokenKind::RParen) {
            loop {
                let (param, _) = self.cursor.expect_ident("parameter name")?;
                params.push(param);
                if !self.cursor.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.cursor.expect(TokenKind::RParen)?;

        let body = self.parse_block_range()?;
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_func(Function {
            name,
            params,
            body,
            span,
        }))
    }

    /// class-decl := `class` IDENT (`<` IDENT)? `{` function* `}`
    fn parse_class_decl(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance();
        let (name, _) = self.cursor.expect_ident("class name")?;
        let superclass = if self.cursor.match_kind(TokenKind::Lt) {
            Some(self.cursor.expect_ident("superclass name")?.0)
        } else {
            None
        };

        self.cursor.expect(TokenKind::LBrace)?;
        let mut methods = Vec::new();
        while !self.cursor.check(TokenKind::RBrace) && !self.cursor.is_at_end() {
            if !self.cursor.check(TokenKind::Func) {
                return Err(ParseError::new(
                    ErrorCode::E1001,
                    format!(
                        "expected 'func' or '}}', found {}",
                        self.cursor.current_kind().describe()
                    ),
                    self.cursor.current_span(),
                )
                .with_context("class bodies contain only methods"));
            }
            methods.push(self.parse_function()?);
        }
        self.cursor.expect(TokenKind::RBrace)?;

        let methods = self.arena.alloc_func_list(methods);
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_stmt(
            StmtKind::ClassDecl {
                name,
                superclass,
                methods,
            },
            span,
        ))
    }

    /// statement := if | while | for | break | continue | return | throw
    ///            | try | block | expression-statement
    fn parse_statement(&mut self) -> Result<StmtId, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::LBrace => self.parse_block_stmt(),
            TokenKind::Break => self.parse_simple_keyword(StmtKind::Break),
            TokenKind::Continue => self.parse_simple_keyword(StmtKind::Continue),
            TokenKind::Return => self.parse_return(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Try => self.parse_try(),
            _ => self.parse_expr_stmt(),
        }
    }

    /// `break` `;` / `continue` `;`
    fn parse_simple_keyword(&mut self, kind: StmtKind) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance();
        self.cursor.expect(TokenKind::Semicolon)?;
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_stmt(kind, span))
    }

    /// return-stmt := `return` expression? `;`
    fn parse_return(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance();
        let value = if self.cursor.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.cursor.expect(TokenKind::Semicolon)?;
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_stmt(StmtKind::Return(value), span))
    }

    /// throw-stmt := `throw` expression `;`
    fn parse_throw(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance();
        let value = self.parse_expression()?;
        self.cursor.expect(TokenKind::Semicolon)?;
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_stmt(StmtKind::Throw(value), span))
    }

    /// if-stmt := `if` `(` expression `)` block
    ///            (`elif` `(` expression `)` block)* (`else` block)?
    ///
    /// Entered at `if` or `elif`; each `elif` parses as a nested `If` in
    /// the else slot.
    fn parse_if(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance(); // `if` or `elif`
        self.cursor.expect(TokenKind::LParen)?;
        let cond = self.parse_expression()?;
        self.cursor.expect(TokenKind::RParen)?;
        let then_branch = self.parse_block_stmt()?;

        let else_branch = if self.cursor.check(TokenKind::Elif) {
            Some(self.parse_if()?)
        } else if self.cursor.match_kind(TokenKind::Else) {
            Some(self.parse_block_stmt()?)
        } else {
            None
        };

        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_stmt(
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    /// while-stmt := `while` `(` expression `)` block
    fn parse_while(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance();
        self.cursor.expect(TokenKind::LParen)?;
        let cond = self.parse_expression()?;
        self.cursor.expect(TokenKind::RParen)?;
        let body = self.parse_block_stmt()?;
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_stmt(StmtKind::While { cond, body }, span))
    }

    /// for-stmt := `for` `(` init? `;` cond? `;` update? `)` block
    ///
    /// Any clause may be empty; the init clause is a `var` declaration
    /// or an expression statement.
    fn parse_for(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance();
        self.cursor.expect(TokenKind::LParen)?;

        let init = if self.cursor.match_kind(TokenKind::Semicolon) {
            None
        } else if self.cursor.check(TokenKind::Var) {
            Some(self.parse_var_decl()?)
        } else {
            Some(self.parse_expr_stmt()?)
        };

        let cond = if self.cursor.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.cursor.expect(TokenKind::Semicolon)?;

        let update = if self.cursor.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.cursor.expect(TokenKind::RParen)?;

        let body = self.parse_block_stmt()?;
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_stmt(
            StmtKind::For {
                init,
                cond,
                update,
                body,
            },
            span,
        ))
    }

    /// try-stmt := `try` block `catch` `(` IDENT `)` block
    fn parse_try(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        self.cursor.advance();
        let body = self.parse_block_stmt()?;
        self.cursor.expect(TokenKind::Catch)?;
        self.cursor.expect(TokenKind::LParen)?;
        let (catch_name, _) = self.cursor.expect_ident("catch variable")?;
        self.cursor.expect(TokenKind::RParen)?;
        let catch_body = self.parse_block_stmt()?;
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_stmt(
            StmtKind::Try {
                body,
                catch_name,
                catch_body,
            },
            span,
        ))
    }

    /// block := `{` declaration* `}`, as a statement node.
    fn parse_block_stmt(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        let range = self.parse_block_range()?;
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_stmt(StmtKind::Block(range), span))
    }

    /// block contents as a raw statement range (function bodies use this
    /// directly; the call frame is their scope).
    fn parse_block_range(&mut self) -> Result<StmtRange, ParseError> {
        self.cursor.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.cursor.check(TokenKind::RBrace) && !self.cursor.is_at_end() {
            stmts.push(self.parse_declaration()?);
        }
        self.cursor.expect(TokenKind::RBrace)?;
        Ok(self.arena.alloc_stmt_list(stmts))
    }

    /// expression-statement := expression `;`
    fn parse_expr_stmt(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        let expr = self.parse_expression()?;
        self.cursor.expect(TokenKind::Semicolon)?;
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_stmt(StmtKind::Expr(expr), span))
    }

    fn func_span(&self, func: FuncId) -> Span {
        self.arena.func(func).span
    }
}
