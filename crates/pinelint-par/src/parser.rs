//! Predictive recursive-descent statement parser coupled with a
//! precedence-climbing ("Pratt") expression parser. Ported from the
//! reference implementation's `parser.py`; see DESIGN.md for the
//! resolutions of the four points the distilled specification flagged as
//! ambiguous.

use crate::ast::*;
use crate::error::ParseError;
use pinelint_lex::{Token, TokenKind};
use pinelint_util::Span;

/// Type names recognized in type-hint position. Kept small and
/// representative, matching the built-in catalog's own scope decision (see
/// DESIGN.md's "Catalog scope" section).
const TYPE_NAMES: &[&str] = &[
    "int", "float", "bool", "string", "color", "void", "na", "line", "label", "box", "table",
    "array", "map", "matrix",
];

fn is_type_name(word: &str) -> bool {
    TYPE_NAMES.contains(&word)
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    errors: Vec<ParseError>,
    /// Net `INDENT`s consumed while crossing implicit line continuations
    /// inside the expression currently being parsed; unwound back to zero
    /// by [`Parser::parse_expression`] before it returns.
    indent_level: i32,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            tokens,
            current: 0,
            errors: Vec::new(),
            indent_level: 0,
        }
    }

    /// Parses the whole token stream into a (possibly partial) list of
    /// top-level statements, plus every recorded parse error.
    pub fn parse(mut self) -> (Vec<Stmt>, Vec<ParseError>) {
        let mut statements = Vec::new();
        self.skip_blank_lines();
        while !self.is_at_end() {
            match self.parse_statement() {
                Some(stmt) => statements.push(stmt),
                None => {
                    if !self.is_at_end() {
                        self.synchronize();
                    }
                }
            }
            self.skip_blank_lines();
        }
        (statements, self.errors)
    }

    // ---- token stream helpers -------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1).min(self.tokens.len() - 1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_keyword(&self, word: &str) -> bool {
        self.peek().is_keyword(word)
    }

    fn check_operator(&self, op: &str) -> bool {
        self.peek().is_operator(op)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, word: &str) -> bool {
        if self.check_keyword(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_operator(&mut self, op: &str) -> bool {
        if self.check_operator(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Option<Span> {
        if self.check(kind) {
            Some(self.advance().span)
        } else {
            self.error(message);
            None
        }
    }

    /// Consumes an `Operator` token with the exact given lexeme, or records
    /// `message` and leaves the cursor in place.
    fn expect_operator(&mut self, op: &str, message: &str) -> Option<Span> {
        if self.check_operator(op) {
            Some(self.advance().span)
        } else {
            self.error(message);
            None
        }
    }

    fn error(&mut self, message: &str) {
        let span = self.peek().span;
        self.errors.push(ParseError::new(message.to_string(), span));
    }

    /// Advance past tokens until the next `NEWLINE` (or `EOF`), then resume
    /// at statement position.
    fn synchronize(&mut self) {
        while !self.is_at_end() && !self.check(TokenKind::Newline) {
            self.advance();
        }
        if self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    fn skip_blank_lines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    /// If the current position is a line continuation (one or more
    /// `NEWLINE`s followed by an `INDENT`) and the token immediately past
    /// the indent satisfies `matches_operator`, returns the number of
    /// `NEWLINE`/`INDENT` tokens standing between here and that operator.
    /// Returns 0 (no match, nothing to skip) both when there is no
    /// continuation and when one exists but the far side isn't this loop's
    /// operator — e.g. a block-opening keyword, so an `if`/`for`/`while`
    /// condition's trailing `NEWLINE INDENT` is never mistaken for a
    /// continued expression.
    fn continuation_reaches(&self, matches_operator: impl Fn(&Token) -> bool) -> usize {
        if !self.check(TokenKind::Newline) {
            return 0;
        }
        let mut idx = 0usize;
        while self.peek_at(idx).kind == TokenKind::Newline {
            idx += 1;
        }
        if self.peek_at(idx).kind != TokenKind::Indent {
            return 0;
        }
        while self.peek_at(idx).kind == TokenKind::Indent {
            idx += 1;
        }
        if matches_operator(self.peek_at(idx)) {
            idx
        } else {
            0
        }
    }

    /// Consumes the `distance` `NEWLINE`/`INDENT` tokens a prior
    /// [`Parser::continuation_reaches`] call found, tracking every `INDENT`
    /// crossed so [`Parser::parse_expression`] can unwind the matching
    /// `DEDENT`s once the expression is complete.
    fn cross_continuation(&mut self, distance: usize) {
        for _ in 0..distance {
            if self.check(TokenKind::Indent) {
                self.indent_level += 1;
            }
            self.advance();
        }
    }

    /// Unconditionally skips a `NEWLINE`+`INDENT` continuation standing
    /// right before the operand about to be parsed (e.g. the line break in
    /// `1 +\n    2`). Safe to call blindly here because this only ever runs
    /// immediately after consuming a binary/unary operator or at the very
    /// start of an expression — never at a point where a statement's own
    /// block could begin.
    fn skip_operand_continuation(&mut self) {
        let distance = self.continuation_reaches(|_| true);
        if distance > 0 {
            self.cross_continuation(distance);
        }
    }

    // ---- statement dispatch ----------------------------------------------------

    fn parse_statement(&mut self) -> Option<Stmt> {
        let mut exported = false;
        let mut is_method = false;
        if self.check_keyword("export") {
            self.advance();
            exported = true;
        }
        if self.check_keyword("method") {
            self.advance();
            is_method = true;
        }
        if exported || is_method {
            if self.check_keyword("type") {
                return self.parse_type_def(exported);
            }
            return self.parse_function_def(exported, is_method, None);
        }

        if self.check_keyword("if") {
            let span = self.peek().span;
            self.advance();
            let expr = self.parse_if_expr(span)?;
            return Some(Stmt::ExpressionStatement { span: expr.span(), expr: Box::new(expr) });
        }
        if self.check_keyword("for") {
            let span = self.peek().span;
            self.advance();
            let expr = self.parse_for_expr(span)?;
            return Some(Stmt::ExpressionStatement { span: expr.span(), expr: Box::new(expr) });
        }
        if self.check_keyword("while") {
            let span = self.peek().span;
            self.advance();
            let expr = self.parse_while_expr(span)?;
            return Some(Stmt::ExpressionStatement { span: expr.span(), expr: Box::new(expr) });
        }
        if self.check_keyword("switch") {
            let span = self.peek().span;
            self.advance();
            let expr = self.parse_switch_expr(span)?;
            return Some(Stmt::ExpressionStatement { span: expr.span(), expr: Box::new(expr) });
        }
        if self.check_keyword("type") {
            return self.parse_type_def(false);
        }
        if self.check_keyword("import") {
            return self.parse_import();
        }
        if self.check_keyword("indicator") || self.check_keyword("strategy") || self.check_keyword("library") {
            return self.parse_script_decl();
        }
        if self.check_keyword("var") || self.check_keyword("varip") {
            return self.parse_var_decl(true);
        }

        if self.check(TokenKind::Identifier) && self.is_function_def_lookahead() {
            return self.parse_function_def(false, false, None);
        }

        if self.check(TokenKind::Identifier) && is_type_name(&self.peek().lexeme) {
            let next = self.peek_at(1);
            if next.kind == TokenKind::Identifier {
                let name = self.peek_at(1).lexeme.clone();
                if self.tokens.get(self.current + 2).map(|t| t.kind) == Some(TokenKind::LParen)
                    && self.is_function_def_lookahead_from(self.current + 1)
                {
                    let type_hint = self.advance().lexeme.clone();
                    return self.parse_function_def(false, false, Some(type_hint));
                }
                let type_hint = self.advance().lexeme.clone();
                let _ = name;
                return self.parse_var_decl_typed(type_hint);
            }
        }

        self.parse_expression_or_decl_statement()
    }

    /// Single balanced-paren scan starting at the first `(` after the
    /// current identifier. Deliberately does not handle chained calls like
    /// `f(x)(y)` — see DESIGN.md resolution #1.
    fn is_function_def_lookahead(&self) -> bool {
        self.is_function_def_lookahead_from(self.current)
    }

    fn is_function_def_lookahead_from(&self, name_index: usize) -> bool {
        if self.tokens.get(name_index + 1).map(|t| t.kind) != Some(TokenKind::LParen) {
            return false;
        }
        let mut depth = 0i32;
        let mut i = name_index + 1;
        loop {
            match self.tokens.get(i) {
                None => return false,
                Some(t) if t.kind == TokenKind::LParen => {
                    depth += 1;
                    i += 1;
                }
                Some(t) if t.kind == TokenKind::RParen => {
                    depth -= 1;
                    i += 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some(t) if t.kind == TokenKind::Eof => return false,
                _ => i += 1,
            }
        }
        self.tokens.get(i).map(|t| t.is_operator("=>")).unwrap_or(false)
    }

    fn parse_script_decl(&mut self) -> Option<Stmt> {
        let start = self.peek().span;
        let kind = if self.match_keyword("indicator") {
            ScriptKind::Indicator
        } else if self.match_keyword("strategy") {
            ScriptKind::Strategy
        } else {
            self.advance();
            ScriptKind::Library
        };
        self.consume(TokenKind::LParen, "expected '(' after script declaration keyword")?;
        let args = self.parse_arguments();
        self.consume(TokenKind::RParen, "expected ')' to close script declaration arguments")?;
        Some(Stmt::ScriptDecl { kind, args, span: start })
    }

    fn parse_import(&mut self) -> Option<Stmt> {
        let start = self.peek().span;
        self.advance(); // 'import'
        let mut path = String::new();
        while !self.check(TokenKind::Newline) && !self.is_at_end() && !self.check_keyword("as") {
            path.push_str(&self.advance().lexeme);
        }
        let alias = if self.match_keyword("as") {
            if self.check(TokenKind::Identifier) {
                Some(self.advance().lexeme.clone())
            } else {
                self.error("expected identifier after 'as'");
                None
            }
        } else {
            None
        };
        Some(Stmt::ImportDecl { path, alias, span: start })
    }

    fn parse_type_def(&mut self, exported: bool) -> Option<Stmt> {
        let start = self.peek().span;
        self.advance(); // 'type'
        let name = self.consume_identifier_name("expected type name")?;
        self.consume(TokenKind::Newline, "expected newline after type name")?;
        self.consume(TokenKind::Indent, "expected indented field list")?;
        let mut fields = Vec::new();
        while !self.check(TokenKind::Dedent) && !self.is_at_end() {
            if self.check(TokenKind::Newline) {
                self.advance();
                continue;
            }
            let field_span = self.peek().span;
            let type_hint = if self.check(TokenKind::Identifier) && is_type_name(&self.peek().lexeme) {
                Some(self.advance().lexeme.clone())
            } else {
                None
            };
            let field_name = self.consume_identifier_name("expected field name")?;
            fields.push(Param {
                name: field_name,
                type_hint,
                default: None,
                span: field_span,
            });
            self.match_token(TokenKind::Newline);
        }
        self.consume(TokenKind::Dedent, "expected dedent to close type body")?;
        Some(Stmt::TypeDef { name, fields, exported, span: start })
    }

    fn parse_var_decl(&mut self, with_qualifier_keyword: bool) -> Option<Stmt> {
        let start = self.peek().span;
        let qualifier = if with_qualifier_keyword {
            Some(self.advance().lexeme.clone())
        } else {
            None
        };
        let type_hint = if self.check(TokenKind::Identifier) && is_type_name(&self.peek().lexeme) {
            let next_is_name = self.peek_at(1).kind == TokenKind::Identifier || self.peek_at(1).kind == TokenKind::LBracket;
            if next_is_name {
                Some(self.advance().lexeme.clone())
            } else {
                None
            }
        } else {
            None
        };
        self.finish_var_decl(start, qualifier, type_hint)
    }

    fn parse_var_decl_typed(&mut self, type_hint: String) -> Option<Stmt> {
        let start = self.peek().span;
        self.finish_var_decl(start, None, Some(type_hint))
    }

    fn finish_var_decl(&mut self, start: Span, qualifier: Option<String>, type_hint: Option<String>) -> Option<Stmt> {
        let (name, is_tuple) = self.parse_decl_target()?;
        self.expect_operator("=", "expected '=' in declaration")?;
        let value = self.parse_expression();
        Some(Stmt::VarDecl {
            name,
            qualifier,
            type_hint,
            value: Box::new(value),
            is_tuple,
            span: start,
        })
    }

    /// Either a single identifier, or a tuple target `[a, b, c]`, joined for
    /// storage as the spec's single `name` field.
    fn parse_decl_target(&mut self) -> Option<(String, bool)> {
        if self.match_token(TokenKind::LBracket) {
            let mut names = Vec::new();
            if !self.check(TokenKind::RBracket) {
                loop {
                    names.push(self.consume_identifier_name("expected identifier in tuple target")?);
                    if !self.match_token(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RBracket, "expected ']' to close tuple target")?;
            Some((names.join(", "), true))
        } else {
            Some((self.consume_identifier_name("expected identifier")?, false))
        }
    }

    fn consume_identifier_name(&mut self, message: &str) -> Option<String> {
        if self.check(TokenKind::Identifier) {
            Some(self.advance().lexeme.clone())
        } else {
            self.error(message);
            None
        }
    }

    fn parse_function_def(&mut self, exported: bool, is_method: bool, return_type: Option<String>) -> Option<Stmt> {
        let start = self.peek().span;
        let name = self.consume_identifier_name("expected function name")?;
        self.consume(TokenKind::LParen, "expected '(' after function name")?;
        let params = self.parse_params();
        self.consume(TokenKind::RParen, "expected ')' to close parameter list")?;
        self.expect_operator("=>", "expected '=>'")?;
        let body = self.parse_function_body()?;
        Some(Stmt::FunctionDef {
            name,
            params,
            body,
            return_type,
            exported,
            is_method,
            span: start,
        })
    }

    fn parse_params(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        if self.check(TokenKind::RParen) {
            return params;
        }
        loop {
            let span = self.peek().span;
            let type_hint = if self.check(TokenKind::Identifier)
                && is_type_name(&self.peek().lexeme)
                && self.peek_at(1).kind == TokenKind::Identifier
            {
                Some(self.advance().lexeme.clone())
            } else {
                None
            };
            let name = match self.consume_identifier_name("expected parameter name") {
                Some(n) => n,
                None => break,
            };
            let default = if self.match_operator("=") {
                Some(Box::new(self.parse_expression()))
            } else {
                None
            };
            params.push(Param { name, type_hint, default, span });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        params
    }

    fn parse_function_body(&mut self) -> Option<Block> {
        if self.check(TokenKind::Newline) {
            self.parse_block()
        } else {
            let span = self.peek().span;
            let expr = self.parse_expression();
            let stmt = Stmt::ExpressionStatement { span: expr.span(), expr: Box::new(expr) };
            Some(Block { statements: vec![stmt], span })
        }
    }

    /// `NEWLINE INDENT statement+ DEDENT`.
    fn parse_block(&mut self) -> Option<Block> {
        let newline_span = self.consume(TokenKind::Newline, "expected newline before indented block")?;
        let indent_span = self.consume(TokenKind::Indent, "expected an indented block")?;
        let _ = newline_span;
        let mut statements = Vec::new();
        self.skip_blank_lines();
        while !self.check(TokenKind::Dedent) && !self.is_at_end() {
            match self.parse_statement() {
                Some(stmt) => statements.push(stmt),
                None => {
                    if !self.check(TokenKind::Dedent) && !self.is_at_end() {
                        self.synchronize();
                    }
                }
            }
            self.skip_blank_lines();
        }
        let span = statements.first().map(|s| s.span()).unwrap_or(indent_span);
        self.consume(TokenKind::Dedent, "expected dedent to close block");
        Some(Block { statements, span })
    }

    fn parse_expression_or_decl_statement(&mut self) -> Option<Stmt> {
        let start = self.peek().span;
        let expr = self.parse_expression();
        if self.check_operator("=") {
            self.advance();
            if !matches!(expr, Expr::Identifier(_) | Expr::ArrayLiteral { .. }) {
                self.error("left-hand side of '=' must be an identifier or tuple target");
                return None;
            }
            let (name, is_tuple) = match &expr {
                Expr::Identifier(id) => (id.name.clone(), false),
                Expr::ArrayLiteral { elements, .. } => {
                    let names: Vec<String> = elements
                        .iter()
                        .filter_map(|e| match e {
                            Expr::Identifier(id) => Some(id.name.clone()),
                            _ => None,
                        })
                        .collect();
                    (names.join(", "), true)
                }
                _ => unreachable!(),
            };
            let value = self.parse_expression();
            return Some(Stmt::VarDecl {
                name,
                qualifier: None,
                type_hint: None,
                value: Box::new(value),
                is_tuple,
                span: start,
            });
        }
        if self.match_operator(":=") {
            let value = self.parse_expression();
            return Some(Stmt::Assignment { target: Box::new(expr), value: Box::new(value), span: start });
        }
        Some(Stmt::ExpressionStatement { span: start, expr: Box::new(expr) })
    }

    // ---- expressions -------------------------------------------------------

    pub fn parse_expression(&mut self) -> Expr {
        let start_level = self.indent_level;
        let expr = self.parse_ternary();
        self.unwind_continuation_indent(start_level);
        expr
    }

    /// Consumes the `DEDENT`s (skipping blank `NEWLINE`s between them) that
    /// balance every `INDENT` [`Parser::cross_continuation`] crossed while
    /// parsing this expression.
    fn unwind_continuation_indent(&mut self, start_level: i32) {
        while self.indent_level > start_level {
            if self.check(TokenKind::Newline) {
                self.advance();
                continue;
            }
            self.consume(TokenKind::Dedent, "expected dedent to close continued expression");
            self.indent_level -= 1;
        }
    }

    fn parse_ternary(&mut self) -> Expr {
        let cond = self.parse_or();
        if self.match_token(TokenKind::Question) {
            let then_branch = self.parse_expression();
            self.consume(TokenKind::Colon, "expected ':' in ternary expression");
            let else_branch = self.parse_expression();
            let span = cond.span();
            return Expr::TernaryOp {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                span,
            };
        }
        cond
    }

    fn parse_or(&mut self) -> Expr {
        let mut left = self.parse_and();
        loop {
            let skip = self.continuation_reaches(|t| t.is_keyword("or"));
            if skip == 0 && !self.check_keyword("or") {
                break;
            }
            self.cross_continuation(skip);
            let op = self.advance().lexeme.clone();
            let right = self.parse_and();
            let span = left.span();
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        left
    }

    fn parse_and(&mut self) -> Expr {
        let mut left = self.parse_equality();
        loop {
            let skip = self.continuation_reaches(|t| t.is_keyword("and"));
            if skip == 0 && !self.check_keyword("and") {
                break;
            }
            self.cross_continuation(skip);
            let op = self.advance().lexeme.clone();
            let right = self.parse_equality();
            let span = left.span();
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        left
    }

    fn parse_equality(&mut self) -> Expr {
        let mut left = self.parse_comparison();
        loop {
            let skip = self.continuation_reaches(|t| t.is_operator("==") || t.is_operator("!="));
            if skip == 0 && !self.check_operator("==") && !self.check_operator("!=") {
                break;
            }
            self.cross_continuation(skip);
            let op = self.advance().lexeme.clone();
            let right = self.parse_comparison();
            let span = left.span();
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        left
    }

    fn parse_comparison(&mut self) -> Expr {
        let mut left = self.parse_additive();
        loop {
            let skip = self.continuation_reaches(|t| {
                ["<", ">", "<=", ">="].iter().any(|op| t.is_operator(op))
            });
            if skip == 0 && !["<", ">", "<=", ">="].iter().any(|op| self.check_operator(op)) {
                break;
            }
            self.cross_continuation(skip);
            let op = self.advance().lexeme.clone();
            let right = self.parse_additive();
            let span = left.span();
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        left
    }

    fn parse_additive(&mut self) -> Expr {
        let mut left = self.parse_multiplicative();
        loop {
            let skip = self.continuation_reaches(|t| t.is_operator("+") || t.is_operator("-"));
            if skip == 0 && !self.check_operator("+") && !self.check_operator("-") {
                break;
            }
            self.cross_continuation(skip);
            let op = self.advance().lexeme.clone();
            let right = self.parse_multiplicative();
            let span = left.span();
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        left
    }

    fn parse_multiplicative(&mut self) -> Expr {
        let mut left = self.parse_unary();
        loop {
            let skip = self.continuation_reaches(|t| {
                t.is_operator("*") || t.is_operator("/") || t.is_operator("%")
            });
            if skip == 0 && !self.check_operator("*") && !self.check_operator("/") && !self.check_operator("%") {
                break;
            }
            self.cross_continuation(skip);
            let op = self.advance().lexeme.clone();
            let right = self.parse_unary();
            let span = left.span();
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        left
    }

    fn parse_unary(&mut self) -> Expr {
        self.skip_operand_continuation();
        if self.check_keyword("not") || self.check_operator("-") {
            let span = self.peek().span;
            let op = self.advance().lexeme.clone();
            let operand = self.parse_unary();
            return Expr::UnaryOp { op, operand: Box::new(operand), span };
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            if self.check(TokenKind::Dot) {
                let span = self.peek().span;
                self.advance();
                let name_span = self.peek().span;
                let name = self.consume_identifier_name("expected name after '.'").unwrap_or_default();
                let right = Expr::Identifier(Identifier { name, span: name_span });
                expr = Expr::BinaryOp { left: Box::new(expr), op: ".".to_string(), right: Box::new(right), span };
            } else if self.check(TokenKind::LBracket) {
                let span = self.peek().span;
                self.advance();
                let mut indices = vec![self.parse_expression()];
                while self.match_token(TokenKind::Comma) {
                    indices.push(self.parse_expression());
                }
                self.consume(TokenKind::RBracket, "expected ']' to close index expression");
                expr = Expr::ArrayAccess { base: Box::new(expr), indices, span };
            } else if self.is_generic_call_start() {
                self.advance(); // '<'
                self.advance(); // type token
                self.advance(); // '>'
                expr = self.finish_call(expr);
            } else if self.check(TokenKind::LParen) {
                expr = self.finish_call(expr);
            } else {
                break;
            }
        }
        expr
    }

    /// `Identifier '<' TypeName '>' '('` — exactly one type token is
    /// permitted; see DESIGN.md resolution #2.
    fn is_generic_call_start(&self) -> bool {
        self.check_operator("<")
            && matches!(self.peek_at(1).kind, TokenKind::Identifier)
            && self.peek_at(2).is_operator(">")
            && self.peek_at(3).kind == TokenKind::LParen
    }

    fn finish_call(&mut self, callee: Expr) -> Expr {
        let span = self.peek().span;
        self.advance(); // '('
        let args = self.parse_arguments();
        self.consume(TokenKind::RParen, "expected ')' to close call arguments");
        let dotted_name = extract_dotted_name(&callee).unwrap_or_else(|| {
            self.error("expected a callable name");
            String::new()
        });
        Expr::FunctionCall { dotted_name, args, span }
    }

    fn parse_arguments(&mut self) -> Vec<Arg> {
        let mut args = Vec::new();
        if self.check(TokenKind::RParen) {
            return args;
        }
        loop {
            let span = self.peek().span;
            let value = self.parse_expression();
            if let Expr::Identifier(id) = &value {
                if self.check_operator("=") {
                    self.advance();
                    let named_value = self.parse_expression();
                    args.push(Arg { name: Some(id.name.clone()), value: Box::new(named_value), span });
                    if !self.match_token(TokenKind::Comma) {
                        break;
                    }
                    continue;
                }
            }
            args.push(Arg { name: None, value: Box::new(value), span });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        args
    }

    fn parse_primary(&mut self) -> Expr {
        let span = self.peek().span;
        match self.peek().kind {
            TokenKind::LiteralInteger => {
                let value = self.advance().lexeme.clone();
                Expr::Literal(Literal { value, type_tag: LiteralTag::Int, span })
            }
            TokenKind::LiteralFloat => {
                let value = self.advance().lexeme.clone();
                Expr::Literal(Literal { value, type_tag: LiteralTag::Float, span })
            }
            TokenKind::LiteralString => {
                let value = self.advance().lexeme.clone();
                Expr::Literal(Literal { value, type_tag: LiteralTag::String, span })
            }
            TokenKind::LiteralColor => {
                let value = self.advance().lexeme.clone();
                Expr::Literal(Literal { value, type_tag: LiteralTag::Color, span })
            }
            TokenKind::Keyword if self.peek().lexeme == "true" || self.peek().lexeme == "false" => {
                let value = self.advance().lexeme.clone();
                Expr::Literal(Literal { value, type_tag: LiteralTag::Bool, span })
            }
            TokenKind::Keyword if self.peek().lexeme == "na" => {
                let value = self.advance().lexeme.clone();
                Expr::Literal(Literal { value, type_tag: LiteralTag::Na, span })
            }
            TokenKind::Keyword if self.peek().lexeme == "if" => {
                self.advance();
                self.parse_if_expr(span).unwrap_or_else(|| error_placeholder(span))
            }
            TokenKind::Keyword if self.peek().lexeme == "for" => {
                self.advance();
                self.parse_for_expr(span).unwrap_or_else(|| error_placeholder(span))
            }
            TokenKind::Keyword if self.peek().lexeme == "while" => {
                self.advance();
                self.parse_while_expr(span).unwrap_or_else(|| error_placeholder(span))
            }
            TokenKind::Keyword if self.peek().lexeme == "switch" => {
                self.advance();
                self.parse_switch_expr(span).unwrap_or_else(|| error_placeholder(span))
            }
            TokenKind::Identifier => {
                let name = self.advance().lexeme.clone();
                Expr::Identifier(Identifier { name, span })
            }
            TokenKind::LParen => {
                self.advance();
                self.skip_blank_lines();
                let expr = self.parse_expression();
                self.skip_blank_lines();
                self.consume(TokenKind::RParen, "expected ')' to close grouped expression");
                expr
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(TokenKind::RBracket) {
                    loop {
                        elements.push(self.parse_expression());
                        if !self.match_token(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.consume(TokenKind::RBracket, "expected ']' to close array literal");
                Expr::ArrayLiteral { elements, span }
            }
            _ => {
                self.error("expected an expression");
                if !self.is_at_end() {
                    self.advance();
                }
                error_placeholder(span)
            }
        }
    }

    fn parse_if_expr(&mut self, span: Span) -> Option<Expr> {
        let cond = self.parse_expression();
        let then_block = self.parse_block()?;
        let else_block = if self.peek_else_branch() {
            self.skip_blank_lines();
            self.advance(); // 'else'
            if self.check_keyword("if") {
                let inner_span = self.peek().span;
                self.advance();
                let nested = self.parse_if_expr(inner_span)?;
                let stmt = Stmt::ExpressionStatement { span: nested.span(), expr: Box::new(nested) };
                Some(Block { statements: vec![stmt], span: inner_span })
            } else {
                self.parse_block()
            }
        } else {
            None
        };
        Some(Expr::If { cond: Box::new(cond), then_block, else_block, span })
    }

    fn peek_else_branch(&self) -> bool {
        let mut i = self.current;
        while self.tokens.get(i).map(|t| t.kind) == Some(TokenKind::Newline) {
            i += 1;
        }
        self.tokens.get(i).map(|t| t.is_keyword("else")).unwrap_or(false)
    }

    fn parse_for_expr(&mut self, span: Span) -> Option<Expr> {
        let var_name = self.consume_identifier_name("expected loop variable name")?;
        self.expect_operator("=", "expected '=' after loop variable")?;
        let start_expr = self.parse_expression();
        if !self.match_keyword("to") {
            self.error("expected 'to' in for range");
        }
        let end_expr = self.parse_expression();
        let step = if self.match_keyword("by") {
            Some(Box::new(self.parse_expression()))
        } else {
            None
        };
        let body = self.parse_block()?;
        Some(Expr::For { var_name, start: Box::new(start_expr), end: Box::new(end_expr), step, body, span })
    }

    fn parse_while_expr(&mut self, span: Span) -> Option<Expr> {
        let cond = self.parse_expression();
        let body = self.parse_block()?;
        Some(Expr::While { cond: Box::new(cond), body, span })
    }

    fn parse_switch_expr(&mut self, span: Span) -> Option<Expr> {
        let subject = if self.check(TokenKind::Newline) {
            None
        } else {
            Some(Box::new(self.parse_expression()))
        };
        self.consume(TokenKind::Newline, "expected newline before switch body")?;
        self.consume(TokenKind::Indent, "expected indented switch body")?;
        let mut cases = Vec::new();
        self.skip_blank_lines();
        while !self.check(TokenKind::Dedent) && !self.is_at_end() {
            let case_span = self.peek().span;
            let (value, is_default) = if self.check_operator("=>") {
                (None, true)
            } else {
                (Some(Box::new(self.parse_expression())), false)
            };
            self.expect_operator("=>", "expected '=>' in switch case");
            let body = self.parse_function_body()?;
            cases.push(SwitchCase { value, is_default, body, span: case_span });
            self.skip_blank_lines();
        }
        self.consume(TokenKind::Dedent, "expected dedent to close switch body");
        Some(Expr::Switch { subject, cases, span })
    }
}

/// Walks a chain of `.`-`BinaryOp`s down to identifiers, reconstructing the
/// dotted name a `FunctionCall` needs (`a.b.c` from nested `BinaryOp('.')`
/// nodes), e.g. for `strategy.entry(...)`.
fn extract_dotted_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(id) => Some(id.name.clone()),
        Expr::BinaryOp { left, op, right, .. } if op == "." => {
            let left_name = extract_dotted_name(left)?;
            let right_name = extract_dotted_name(right)?;
            Some(format!("{}.{}", left_name, right_name))
        }
        _ => None,
    }
}

fn error_placeholder(span: Span) -> Expr {
    Expr::Identifier(Identifier { name: String::new(), span })
}

pub fn parse(tokens: &[Token]) -> (Vec<Stmt>, Vec<ParseError>) {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinelint_lex::Lexer;

    fn parse_source(source: &str) -> (Vec<Stmt>, Vec<ParseError>) {
        let tokens = Lexer::tokenize(source).expect("lexing should succeed in these tests");
        parse(&tokens)
    }

    #[test]
    fn simple_var_decl() {
        let (stmts, errors) = parse_source("//@version=5\nvar int x = 10\n");
        assert!(errors.is_empty());
        assert!(matches!(stmts.last(), Some(Stmt::VarDecl { .. })));
    }

    #[test]
    fn script_decl_recognized() {
        let (stmts, errors) = parse_source("indicator(\"T\")\n");
        assert!(errors.is_empty());
        assert!(matches!(stmts[0], Stmt::ScriptDecl { kind: ScriptKind::Indicator, .. }));
    }

    #[test]
    fn function_def_one_liner() {
        let (stmts, errors) = parse_source("f(x) => x * 2\n");
        assert!(errors.is_empty());
        match &stmts[0] {
            Stmt::FunctionDef { name, params, .. } => {
                assert_eq!(name, "f");
                assert_eq!(params.len(), 1);
            }
            other => panic!("expected FunctionDef, got {:?}", other),
        }
    }

    #[test]
    fn dotted_call_resolves_name() {
        let (stmts, errors) = parse_source("strategy.entry(\"long\", strategy.long)\n");
        assert!(errors.is_empty());
        match &stmts[0] {
            Stmt::ExpressionStatement { expr, .. } => match expr.as_ref() {
                Expr::FunctionCall { dotted_name, .. } => assert_eq!(dotted_name, "strategy.entry"),
                other => panic!("expected FunctionCall, got {:?}", other),
            },
            other => panic!("expected ExpressionStatement, got {:?}", other),
        }
    }

    #[test]
    fn if_with_block_and_shadowing_decl() {
        let (stmts, errors) = parse_source("var x = 1\nif true\n    var x = 2\n    plot(x)\n");
        assert!(errors.is_empty());
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn chained_call_is_not_a_function_def() {
        let (_stmts, errors) = parse_source("f(x)(y) => x\n");
        assert!(!errors.is_empty());
    }

    #[test]
    fn named_argument_in_call() {
        let (stmts, errors) = parse_source("plot(close, color = color.red)\n");
        assert!(errors.is_empty());
        match &stmts[0] {
            Stmt::ExpressionStatement { expr, .. } => match expr.as_ref() {
                Expr::FunctionCall { args, .. } => {
                    assert_eq!(args[1].name.as_deref(), Some("color"));
                }
                other => panic!("expected FunctionCall, got {:?}", other),
            },
            other => panic!("expected ExpressionStatement, got {:?}", other),
        }
    }

    #[test]
    fn empty_block_has_in_span_position() {
        let (stmts, _errors) = parse_source("f() =>\n    \nplot(1)\n");
        if let Stmt::FunctionDef { body, .. } = &stmts[0] {
            assert!(body.span.line >= 1);
        }
    }

    #[test]
    fn ternary_expression() {
        let (stmts, errors) = parse_source("x = true ? 1 : 2\n");
        assert!(errors.is_empty());
        match &stmts[0] {
            Stmt::VarDecl { value, .. } => assert!(matches!(value.as_ref(), Expr::TernaryOp { .. })),
            other => panic!("expected VarDecl, got {:?}", other),
        }
    }

    #[test]
    fn for_loop_expression() {
        let (stmts, errors) = parse_source("for i = 0 to 9\n    plot(i)\n");
        assert!(errors.is_empty());
        assert!(matches!(
            stmts[0],
            Stmt::ExpressionStatement { .. }
        ));
    }

    #[test]
    fn implicit_continuation_crosses_indent() {
        let (stmts, errors) = parse_source("x = 1 +\n    2\n");
        assert!(errors.is_empty());
        match &stmts[0] {
            Stmt::VarDecl { value, .. } => match value.as_ref() {
                Expr::BinaryOp { op, .. } => assert_eq!(op, "+"),
                other => panic!("expected BinaryOp, got {:?}", other),
            },
            other => panic!("expected VarDecl, got {:?}", other),
        }
    }

    #[test]
    fn implicit_continuation_then_next_statement_parses() {
        let (stmts, errors) = parse_source("x = 1 +\n    2\nplot(x)\n");
        assert!(errors.is_empty());
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn switch_with_default_case() {
        let (stmts, errors) = parse_source(
            "x = switch\n    close > open => 1\n    => 0\n",
        );
        assert!(errors.is_empty());
        match &stmts[0] {
            Stmt::VarDecl { value, .. } => match value.as_ref() {
                Expr::Switch { cases, .. } => assert_eq!(cases.len(), 2),
                other => panic!("expected Switch, got {:?}", other),
            },
            other => panic!("expected VarDecl, got {:?}", other),
        }
    }
}
