//! Recursive-descent parser for Fluxo
//!
//! Statements are parsed by dispatch on the leading token, expressions by
//! precedence climbing over the table in [`super::utils`]. Statement
//! terminators (`;`) are optional and consumed when present.

use super::error::{unexpected_token, ParseResult, ParserError, ParserErrorKind};
use super::expr::{
    Assign, Binary, Expr, ExprKind, FunctionCall, Grouping, ImportExpr, Lambda, LiteralFalse,
    LiteralNull, LiteralNumber, LiteralString, LiteralTrue, MemberAccess, Unary, VarRef,
};
use super::program::Program;
use super::stmt::{
    BlockStmt, EmptyStmt, ExportListStmt, ExprStmt, ForStmt, FunctionDeclStmt, IfStmt,
    ImportFromStmt, LocalDeclStmt, ModuleStmt, ReturnStmt, Stmt, StmtKind, WaitStmt, WhileStmt,
};
use super::utils::{get_associativity, get_precedence};
use crate::compiler::lexer::token_kind::FluxoTokenKind;
use crate::kit::lexer::scanner::Token;
use crate::kit::lexer::{Lexer, SourcePosition};
use fluxo_log::{trace, Logger};
use std::sync::Arc;

pub struct Parser {
    lexer: Lexer,
    current_token: Option<Token<FluxoTokenKind>>,
    /// One-token lookahead, filled on demand
    next_token: Option<Token<FluxoTokenKind>>,
    logger: Arc<Logger>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        Self::with_logger(lexer, Logger::noop())
    }

    pub fn with_logger(lexer: Lexer, logger: Arc<Logger>) -> Self {
        let mut parser = Self {
            lexer,
            current_token: None,
            next_token: None,
            logger,
        };
        parser.consume(); // pre-read the first token
        parser
    }

    /// Parse a whole source file
    pub fn parse(&mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        while self.current_token.is_some() {
            statements.push(self.parse_statement(true)?);
        }
        // A lexical error truncates the token stream; surface it here
        if let Some(e) = self.lexer.error() {
            return Err(ParserError::here(
                ParserErrorKind::Lexical(e.message.clone()),
                e.position,
            ));
        }
        trace!(self.logger, "Parsed program with {} statements", statements.len());
        Ok(Program::new(statements))
    }

    // ==================== Token plumbing ====================

    /// Consume the current token and read the next one
    fn consume(&mut self) {
        self.current_token = match self.next_token.take() {
            Some(token) => Some(token),
            None => self.lexer.next_token(),
        };
    }

    /// Peek one token past the current one
    fn peek_next(&mut self) -> Option<&Token<FluxoTokenKind>> {
        if self.next_token.is_none() {
            self.next_token = self.lexer.next_token();
        }
        self.next_token.as_ref()
    }

    fn check(&self, kind: FluxoTokenKind) -> bool {
        self.current_token
            .as_ref()
            .map(|token| token.kind == kind)
            .unwrap_or(false)
    }

    fn match_token(&mut self, kind: FluxoTokenKind) -> bool {
        if self.check(kind) {
            self.consume();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: FluxoTokenKind) -> ParseResult<Token<FluxoTokenKind>> {
        match &self.current_token {
            Some(token) if token.kind == kind => {
                let token = token.clone();
                self.consume();
                Ok(token)
            }
            Some(token) => Err(ParserError::here(
                unexpected_token(describe_token(token), vec![kind.describe()]),
                token.span.start,
            )),
            None => Err(self.unexpected_end()),
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<(String, SourcePosition)> {
        match &self.current_token {
            Some(token) if token.kind == FluxoTokenKind::Identifier => {
                let name = token.text.clone().unwrap_or_default();
                let position = token.span.start;
                self.consume();
                Ok((name, position))
            }
            Some(token) => Err(ParserError::here(
                ParserErrorKind::ExpectedIdentifier {
                    found: describe_token(token),
                },
                token.span.start,
            )),
            None => Err(self.unexpected_end()),
        }
    }

    fn current_position(&self) -> Option<SourcePosition> {
        self.current_token.as_ref().map(|t| t.span.start)
    }

    /// Error for running out of tokens: a held lexical error wins over a
    /// plain end-of-input report
    fn unexpected_end(&self) -> ParserError {
        if let Some(e) = self.lexer.error() {
            ParserError::here(ParserErrorKind::Lexical(e.message.clone()), e.position)
        } else {
            ParserError::at_eof(ParserErrorKind::UnexpectedEndOfInput)
        }
    }

    /// Optional statement terminator
    fn eat_semicolon(&mut self) {
        let _ = self.match_token(FluxoTokenKind::Semicolon);
    }

    // ==================== Statements ====================

    fn parse_statement(&mut self, top_level: bool) -> ParseResult<Stmt> {
        let token = match &self.current_token {
            Some(token) => token.clone(),
            None => return Err(self.unexpected_end()),
        };

        match token.kind {
            FluxoTokenKind::Semicolon => {
                self.consume();
                Ok(Box::new(StmtKind::Empty(EmptyStmt)))
            }
            FluxoTokenKind::LeftCurlyBrace => self.parse_block(),
            FluxoTokenKind::Local => {
                let stmt = self.parse_local_decl()?;
                self.eat_semicolon();
                Ok(stmt)
            }
            FluxoTokenKind::Function => self.parse_function_decl(false),
            FluxoTokenKind::Export => self.parse_export(),
            FluxoTokenKind::Module => {
                if !top_level {
                    return Err(ParserError::here(
                        ParserErrorKind::ModuleNotTopLevel,
                        token.span.start,
                    ));
                }
                self.parse_module()
            }
            FluxoTokenKind::Import => {
                let next_is_from = self
                    .peek_next()
                    .map(|t| t.kind == FluxoTokenKind::From)
                    .unwrap_or(false);
                if next_is_from {
                    self.parse_import_from()
                } else {
                    let expression = self.parse_expression(1)?;
                    self.eat_semicolon();
                    Ok(Box::new(StmtKind::Expr(ExprStmt { expression })))
                }
            }
            FluxoTokenKind::Wait => self.parse_wait(),
            FluxoTokenKind::If => self.parse_if(),
            FluxoTokenKind::While => self.parse_while(),
            FluxoTokenKind::For => self.parse_for(),
            FluxoTokenKind::Return => self.parse_return(),
            _ => {
                let expression = self.parse_expression(1)?;
                self.eat_semicolon();
                Ok(Box::new(StmtKind::Expr(ExprStmt { expression })))
            }
        }
    }

    /// `{ statements }`; a missing `}` is anchored to the opening brace
    fn parse_block(&mut self) -> ParseResult<Stmt> {
        let open = self.expect(FluxoTokenKind::LeftCurlyBrace)?;
        let mut statements = Vec::new();
        loop {
            if self.match_token(FluxoTokenKind::RightCurlyBrace) {
                return Ok(Box::new(StmtKind::Block(BlockStmt { statements })));
            }
            if self.current_token.is_none() {
                if let Some(e) = self.lexer.error() {
                    return Err(ParserError::here(
                        ParserErrorKind::Lexical(e.message.clone()),
                        e.position,
                    ));
                }
                return Err(ParserError::here(
                    ParserErrorKind::MissingRightCurly,
                    open.span.start,
                ));
            }
            statements.push(self.parse_statement(false)?);
        }
    }

    /// `local name` with optional `= initializer`
    fn parse_local_decl(&mut self) -> ParseResult<Stmt> {
        let local = self.expect(FluxoTokenKind::Local)?;
        let (name, _) = self.expect_identifier()?;
        let initializer = if self.match_token(FluxoTokenKind::Equal) {
            Some(self.parse_expression(1)?)
        } else {
            None
        };
        Ok(Box::new(StmtKind::LocalDecl(LocalDeclStmt {
            name,
            initializer,
            position: local.span.start,
        })))
    }

    /// `function name(params) { body }`
    fn parse_function_decl(&mut self, exported: bool) -> ParseResult<Stmt> {
        let keyword = self.expect(FluxoTokenKind::Function)?;
        let (name, _) = self.expect_identifier()?;
        let (params, rest_param) = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(Box::new(StmtKind::FunctionDecl(FunctionDeclStmt {
            name,
            params,
            rest_param,
            body,
            exported,
            position: keyword.span.start,
        })))
    }

    /// `export function ...` or `export { a, b }`
    fn parse_export(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(FluxoTokenKind::Export)?;
        if self.check(FluxoTokenKind::Function) {
            return self.parse_function_decl(true);
        }
        if self.match_token(FluxoTokenKind::LeftCurlyBrace) {
            let mut names = Vec::new();
            if !self.check(FluxoTokenKind::RightCurlyBrace) {
                loop {
                    let (name, _) = self.expect_identifier()?;
                    names.push(name);
                    if !self.match_token(FluxoTokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(FluxoTokenKind::RightCurlyBrace)?;
            self.eat_semicolon();
            return Ok(Box::new(StmtKind::ExportList(ExportListStmt {
                names,
                position: keyword.span.start,
            })));
        }
        match &self.current_token {
            Some(token) => Err(ParserError::here(
                unexpected_token(describe_token(token), vec!["'function'", "'{'"]),
                token.span.start,
            )),
            None => Err(self.unexpected_end()),
        }
    }

    /// `module name { body }`
    fn parse_module(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(FluxoTokenKind::Module)?;
        let (name, _) = self.expect_identifier()?;
        let body = self.parse_block()?;
        Ok(Box::new(StmtKind::Module(ModuleStmt {
            name,
            body,
            position: keyword.span.start,
        })))
    }

    /// `import from "path" { a, b }`
    fn parse_import_from(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(FluxoTokenKind::Import)?;
        self.expect(FluxoTokenKind::From)?;
        let specifier = self.expect(FluxoTokenKind::LiteralString)?;
        self.expect(FluxoTokenKind::LeftCurlyBrace)?;
        let mut names = Vec::new();
        if !self.check(FluxoTokenKind::RightCurlyBrace) {
            loop {
                let (name, _) = self.expect_identifier()?;
                names.push(name);
                if !self.match_token(FluxoTokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(FluxoTokenKind::RightCurlyBrace)?;
        self.eat_semicolon();
        Ok(Box::new(StmtKind::ImportFrom(ImportFromStmt {
            specifier: specifier.text.unwrap_or_default(),
            names,
            position: keyword.span.start,
        })))
    }

    /// `wait(seconds) { body }`
    fn parse_wait(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(FluxoTokenKind::Wait)?;
        self.expect(FluxoTokenKind::LeftParenthesis)?;
        let seconds = self.parse_expression(1)?;
        self.expect_close_paren()?;
        let body = self.parse_block()?;
        Ok(Box::new(StmtKind::Wait(WaitStmt {
            seconds,
            body,
            position: keyword.span.start,
        })))
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        self.expect(FluxoTokenKind::If)?;
        self.expect(FluxoTokenKind::LeftParenthesis)?;
        let condition = self.parse_expression(1)?;
        self.expect_close_paren()?;
        let then_body = self.parse_block()?;
        let else_body = if self.match_token(FluxoTokenKind::Else) {
            if self.check(FluxoTokenKind::If) {
                Some(self.parse_if()?)
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Box::new(StmtKind::If(IfStmt {
            condition,
            then_body,
            else_body,
        })))
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        self.expect(FluxoTokenKind::While)?;
        self.expect(FluxoTokenKind::LeftParenthesis)?;
        let condition = self.parse_expression(1)?;
        self.expect_close_paren()?;
        let body = self.parse_block()?;
        Ok(Box::new(StmtKind::While(WhileStmt { condition, body })))
    }

    /// `for (init; cond; step) { body }`
    fn parse_for(&mut self) -> ParseResult<Stmt> {
        self.expect(FluxoTokenKind::For)?;
        self.expect(FluxoTokenKind::LeftParenthesis)?;

        let init = if self.match_token(FluxoTokenKind::Semicolon) {
            None
        } else {
            let stmt = if self.check(FluxoTokenKind::Local) {
                self.parse_local_decl()?
            } else {
                let expression = self.parse_expression(1)?;
                Box::new(StmtKind::Expr(ExprStmt { expression }))
            };
            self.expect(FluxoTokenKind::Semicolon)?;
            Some(stmt)
        };

        let condition = if self.check(FluxoTokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(1)?)
        };
        self.expect(FluxoTokenKind::Semicolon)?;

        let step = if self.check(FluxoTokenKind::RightParenthesis) {
            None
        } else {
            Some(self.parse_expression(1)?)
        };
        self.expect_close_paren()?;

        let body = self.parse_block()?;
        Ok(Box::new(StmtKind::For(ForStmt {
            init,
            condition,
            step,
            body,
        })))
    }

    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(FluxoTokenKind::Return)?;
        let has_value = match &self.current_token {
            None => false,
            Some(token) => !matches!(
                token.kind,
                FluxoTokenKind::Semicolon | FluxoTokenKind::RightCurlyBrace
            ),
        };
        let value = if has_value {
            Some(self.parse_expression(1)?)
        } else {
            None
        };
        self.eat_semicolon();
        Ok(Box::new(StmtKind::Return(ReturnStmt {
            value,
            position: keyword.span.start,
        })))
    }

    /// `(a, b, ...rest)`
    fn parse_params(&mut self) -> ParseResult<(Vec<String>, Option<String>)> {
        self.expect(FluxoTokenKind::LeftParenthesis)?;
        let mut params = Vec::new();
        let mut rest_param = None;
        if !self.check(FluxoTokenKind::RightParenthesis) {
            loop {
                if self.match_token(FluxoTokenKind::DotDotDot) {
                    let (name, position) = self.expect_identifier()?;
                    rest_param = Some(name);
                    if self.check(FluxoTokenKind::Comma) {
                        return Err(ParserError::here(
                            ParserErrorKind::Custom(
                                "Rest parameter must be the last parameter".to_string(),
                            ),
                            position,
                        ));
                    }
                    break;
                }
                let (name, _) = self.expect_identifier()?;
                params.push(name);
                if !self.match_token(FluxoTokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_close_paren()?;
        Ok((params, rest_param))
    }

    fn expect_close_paren(&mut self) -> ParseResult<()> {
        match &self.current_token {
            Some(token) if token.kind == FluxoTokenKind::RightParenthesis => {
                self.consume();
                Ok(())
            }
            Some(token) => Err(ParserError::here(
                ParserErrorKind::MissingRightParen,
                token.span.start,
            )),
            None => Err(self.unexpected_end()),
        }
    }

    // ==================== Expressions ====================

    /// Precedence climbing; `min_prec = 1` includes assignment
    fn parse_expression(&mut self, min_prec: i32) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let (op, position) = match &self.current_token {
                Some(token) => (token.kind, token.span.start),
                None => break,
            };
            let prec = get_precedence(op);
            if prec == 0 || prec < min_prec {
                break;
            }
            self.consume();

            let next_min = if get_associativity(op) { prec + 1 } else { prec };
            let right = self.parse_expression(next_min)?;

            left = if op == FluxoTokenKind::Equal {
                match *left {
                    ExprKind::VarRef(var) => Box::new(ExprKind::Assign(Assign {
                        name: var.name,
                        value: right,
                        position,
                    })),
                    _ => {
                        return Err(ParserError::here(
                            ParserErrorKind::InvalidAssignmentTarget,
                            position,
                        ))
                    }
                }
            } else {
                Box::new(ExprKind::Binary(Binary {
                    left,
                    op,
                    right,
                    position,
                }))
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if let Some(token) = &self.current_token {
            if matches!(
                token.kind,
                FluxoTokenKind::Minus | FluxoTokenKind::Exclamation
            ) {
                let op = token.kind;
                let position = token.span.start;
                self.consume();
                let operand = self.parse_unary()?;
                return Ok(Box::new(ExprKind::Unary(Unary {
                    op,
                    operand,
                    position,
                })));
            }
        }
        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = match &self.current_token {
            Some(token) => token.clone(),
            None => return Err(self.unexpected_end()),
        };

        match token.kind {
            FluxoTokenKind::LiteralNumber => {
                self.consume();
                let text = token.text.unwrap_or_default();
                let value: f64 = text.parse().map_err(|_| {
                    ParserError::here(
                        ParserErrorKind::InvalidNumberFormat(text.clone()),
                        token.span.start,
                    )
                })?;
                Ok(Box::new(ExprKind::LiteralNumber(LiteralNumber { value })))
            }
            FluxoTokenKind::LiteralString => {
                self.consume();
                Ok(Box::new(ExprKind::LiteralString(LiteralString {
                    value: token.text.unwrap_or_default(),
                })))
            }
            FluxoTokenKind::True => {
                self.consume();
                Ok(Box::new(ExprKind::LiteralTrue(LiteralTrue)))
            }
            FluxoTokenKind::False => {
                self.consume();
                Ok(Box::new(ExprKind::LiteralFalse(LiteralFalse)))
            }
            FluxoTokenKind::Null => {
                self.consume();
                Ok(Box::new(ExprKind::LiteralNull(LiteralNull)))
            }
            FluxoTokenKind::Identifier => {
                self.consume();
                Ok(Box::new(ExprKind::VarRef(VarRef {
                    name: token.text.unwrap_or_default(),
                    position: token.span.start,
                })))
            }
            FluxoTokenKind::LeftParenthesis => {
                self.consume();
                let expression = self.parse_expression(1)?;
                self.expect_close_paren()?;
                Ok(Box::new(ExprKind::Grouping(Grouping { expression })))
            }
            FluxoTokenKind::Function => {
                // Anonymous function in expression position
                self.consume();
                let (params, rest_param) = self.parse_params()?;
                let body = self.parse_block()?;
                Ok(Box::new(ExprKind::Lambda(Lambda {
                    params,
                    rest_param,
                    body,
                })))
            }
            FluxoTokenKind::Import => self.parse_import_expr(false),
            FluxoTokenKind::Require => self.parse_import_expr(true),
            _ => Err(ParserError::here(
                unexpected_token(describe_token(&token), Vec::<String>::new()),
                token.span.start,
            )),
        }
    }

    /// `import("path")` / `require("path")`
    fn parse_import_expr(&mut self, legacy: bool) -> ParseResult<Expr> {
        let keyword = match &self.current_token {
            Some(token) => token.clone(),
            None => return Err(self.unexpected_end()),
        };
        self.consume();
        self.expect(FluxoTokenKind::LeftParenthesis)?;
        let specifier = self.expect(FluxoTokenKind::LiteralString)?;
        self.expect_close_paren()?;
        Ok(Box::new(ExprKind::Import(ImportExpr {
            specifier: specifier.text.unwrap_or_default(),
            legacy,
            position: keyword.span.start,
        })))
    }

    /// Calls and member accesses bind tighter than any binary operator
    fn parse_postfix(&mut self, mut expr: Expr) -> ParseResult<Expr> {
        loop {
            let (kind, position) = match &self.current_token {
                Some(token) => (token.kind, token.span.start),
                None => break,
            };
            match kind {
                FluxoTokenKind::LeftParenthesis => {
                    self.consume();
                    let mut arguments = Vec::new();
                    if !self.check(FluxoTokenKind::RightParenthesis) {
                        loop {
                            arguments.push(self.parse_expression(1)?);
                            if !self.match_token(FluxoTokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect_close_paren()?;
                    expr = Box::new(ExprKind::FunctionCall(FunctionCall {
                        function_expr: expr,
                        arguments,
                        position,
                    }));
                }
                FluxoTokenKind::Dot => {
                    self.consume();
                    let (member, _) = self.expect_identifier()?;
                    expr = Box::new(ExprKind::MemberAccess(MemberAccess {
                        object: expr,
                        member,
                        position,
                    }));
                }
                _ => break,
            }
        }
        Ok(expr)
    }
}

/// Display text of a token for error messages
fn describe_token(token: &Token<FluxoTokenKind>) -> String {
    match (&token.text, token.kind) {
        (Some(text), FluxoTokenKind::Identifier) => format!("'{}'", text),
        (Some(text), FluxoTokenKind::LiteralNumber) => format!("'{}'", text),
        (Some(text), FluxoTokenKind::LiteralString) => format!("\"{}\"", text),
        _ => token.kind.describe().to_string(),
    }
}
