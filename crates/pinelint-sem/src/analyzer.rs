//! Tree-walking semantic analyzer: scope-chain construction, declaration and
//! reference resolution, and the type lattice's consumer. Grounded on the
//! reference implementation's `SemanticAnalyzer` visitor.

use crate::catalog;
use crate::scope::{resolve, resolve_and_mark_used, Scope, ScopeRef, Symbol};
use crate::types::{is_compatible, infer_binary_op, BaseType, PineType};
use pinelint_par::{Arg, Block, Expr, Stmt};
use pinelint_util::Span;

#[derive(Clone, Debug)]
pub struct SemanticIssue {
    pub message: String,
    pub span: Span,
}

impl SemanticIssue {
    fn new(message: impl Into<String>, span: Span) -> Self {
        SemanticIssue { message: message.into(), span }
    }
}

pub struct SemanticAnalyzer {
    global_scope: ScopeRef,
    current_scope: ScopeRef,
    pub all_scopes: Vec<ScopeRef>,
    pub errors: Vec<SemanticIssue>,
    pub warnings: Vec<SemanticIssue>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        let global_scope = Scope::root();
        for var in catalog::VARIABLE_TABLE.values() {
            global_scope
                .borrow_mut()
                .define(Symbol::new(var.name, catalog::variable_type(var), None));
        }
        SemanticAnalyzer {
            current_scope: global_scope.clone(),
            all_scopes: vec![global_scope.clone()],
            global_scope,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn analyze(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.visit_stmt(stmt);
        }
    }

    fn push_scope(&mut self) -> ScopeRef {
        let parent = self.current_scope.clone();
        let child = Scope::child(&parent);
        self.all_scopes.push(child.clone());
        self.current_scope = child;
        parent
    }

    fn pop_scope(&mut self, parent: ScopeRef) {
        self.current_scope = parent;
    }

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.errors.push(SemanticIssue::new(message, span));
    }

    fn warn(&mut self, message: impl Into<String>, span: Span) {
        self.warnings.push(SemanticIssue::new(message, span));
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> PineType {
        match stmt {
            Stmt::ScriptDecl { args, .. } => {
                for arg in args {
                    self.visit_expr(&arg.value);
                }
                PineType::void()
            }
            Stmt::VarDecl { name, type_hint, value, span, .. } => {
                let val_type = self.visit_expr(value);
                let final_type = if let Some(hint) = type_hint {
                    let target = PineType::series(BaseType::parse_public(hint));
                    if !is_compatible(&target, &val_type) {
                        self.error(
                            format!("Type mismatch: Cannot assign '{}' to '{}'", val_type, hint),
                            *span,
                        );
                    }
                    target
                } else {
                    val_type
                };

                if self.current_scope.borrow().declares(name) {
                    self.error(format!("Variable '{}' already declared in this scope.", name), *span);
                }

                let mut ancestor = self.current_scope.borrow().parent.clone();
                while let Some(scope) = ancestor {
                    if scope.borrow().declares(name) {
                        self.warn(format!("Shadowing variable '{}' from outer scope.", name), *span);
                        break;
                    }
                    ancestor = scope.borrow().parent.clone();
                }

                self.current_scope.borrow_mut().define(
                    Symbol::new(name.clone(), final_type.clone(), Some(*span)).mutable(),
                );
                final_type
            }
            Stmt::Assignment { target, value, span } => {
                let val_type = self.visit_expr(value);
                let name = match target.as_ref() {
                    Expr::Identifier(id) => id.name.clone(),
                    _ => {
                        self.visit_expr(target);
                        return val_type;
                    }
                };
                match resolve(&self.current_scope, &name) {
                    None => {
                        self.error(format!("Undefined variable '{}'", name), *span);
                    }
                    Some(sym) => {
                        if !is_compatible(&sym.ty, &val_type) {
                            self.error(
                                format!(
                                    "Type mismatch: Cannot assign '{}' to '{}' (type '{}')",
                                    val_type, sym.name, sym.ty
                                ),
                                *span,
                            );
                        }
                    }
                }
                val_type
            }
            Stmt::FunctionDef { name, params, body, span, .. } => {
                let parent = self.push_scope();
                for param in params {
                    let p_type = param
                        .type_hint
                        .as_deref()
                        .map(|h| PineType::series(BaseType::parse_public(h)))
                        .unwrap_or_else(PineType::series_any);
                    self.current_scope
                        .borrow_mut()
                        .define(Symbol::new(param.name.clone(), p_type, Some(param.span)));
                    if let Some(default) = &param.default {
                        self.visit_expr(default);
                    }
                }
                self.visit_block(body);
                self.pop_scope(parent);

                self.current_scope.borrow_mut().define(Symbol::new(
                    name.clone(),
                    PineType::series(BaseType::Named("function".to_string())),
                    Some(*span),
                ));
                PineType::void()
            }
            Stmt::TypeDef { name, span, .. } => {
                self.current_scope.borrow_mut().define(Symbol::new(
                    name.clone(),
                    PineType::series(BaseType::Named("type".to_string())),
                    Some(*span),
                ));
                PineType::void()
            }
            Stmt::ImportDecl { alias, span, .. } => {
                if let Some(alias) = alias {
                    self.global_scope.borrow_mut().define(Symbol::new(
                        alias.clone(),
                        PineType::series(BaseType::Named("namespace".to_string())),
                        Some(*span),
                    ));
                }
                PineType::void()
            }
            Stmt::ExpressionStatement { expr, .. } => self.visit_expr(expr),
        }
    }

    fn visit_block(&mut self, block: &Block) -> PineType {
        let parent = self.push_scope();
        let mut last = PineType::void();
        for stmt in &block.statements {
            last = self.visit_stmt(stmt);
        }
        self.pop_scope(parent);
        last
    }

    fn visit_expr(&mut self, expr: &Expr) -> PineType {
        match expr {
            Expr::Literal(lit) => literal_type(lit),
            Expr::Identifier(id) => match resolve_and_mark_used(&self.current_scope, &id.name) {
                Some(sym) => sym.ty,
                None => {
                    self.error(format!("Undefined identifier '{}'", id.name), id.span);
                    PineType::series_any()
                }
            },
            Expr::BinaryOp { left, op, right, span } if op == "." => {
                if let Some(full_name) = dotted_name(expr) {
                    if let Some(sym) = resolve(&self.global_scope, &full_name) {
                        return sym.ty;
                    }
                    if let Some(var) = catalog::lookup_variable(&full_name) {
                        return catalog::variable_type(var);
                    }
                }
                self.visit_expr(left);
                self.visit_expr(right);
                let _ = span;
                PineType::series_any()
            }
            Expr::BinaryOp { left, op, right, .. } => {
                let l = self.visit_expr(left);
                let r = self.visit_expr(right);
                infer_binary_op(&l, op, &r)
            }
            Expr::UnaryOp { operand, .. } => self.visit_expr(operand),
            Expr::FunctionCall { dotted_name, args, span } => {
                self.visit_call(dotted_name, args, *span)
            }
            Expr::TernaryOp { cond, then_branch, else_branch, .. } => {
                self.visit_expr(cond);
                let t = self.visit_expr(then_branch);
                self.visit_expr(else_branch);
                t
            }
            Expr::ArrayAccess { base, indices, .. } => {
                let base_type = self.visit_expr(base);
                for idx in indices {
                    self.visit_expr(idx);
                }
                match base_type.base {
                    BaseType::Array(inner) => PineType::series(*inner),
                    _ => PineType::series_any(),
                }
            }
            Expr::ArrayLiteral { elements, .. } => {
                for el in elements {
                    self.visit_expr(el);
                }
                PineType::series(BaseType::Array(Box::new(BaseType::Any)))
            }
            Expr::If { cond, then_block, else_block, .. } => {
                self.visit_expr(cond);
                let then_type = self.visit_block(then_block);
                if let Some(else_block) = else_block {
                    self.visit_block(else_block);
                }
                then_type
            }
            Expr::For { var_name, start, end, step, body, span } => {
                let parent = self.push_scope();
                self.current_scope.borrow_mut().define(Symbol::new(
                    var_name.clone(),
                    PineType::new(crate::types::Qualifier::Simple, BaseType::Int),
                    Some(*span),
                ));
                self.visit_expr(start);
                self.visit_expr(end);
                if let Some(step) = step {
                    self.visit_expr(step);
                }
                let last = self.visit_block(body);
                self.pop_scope(parent);
                last
            }
            Expr::While { cond, body, .. } => {
                self.visit_expr(cond);
                self.visit_block(body)
            }
            Expr::Switch { subject, cases, .. } => {
                if let Some(subject) = subject {
                    self.visit_expr(subject);
                }
                let mut last = PineType::void();
                for case in cases {
                    if let Some(value) = &case.value {
                        self.visit_expr(value);
                    }
                    last = self.visit_block(&case.body);
                }
                last
            }
        }
    }

    fn visit_call(&mut self, dotted_name: &str, args: &[Arg], span: Span) -> PineType {
        let known = catalog::lookup_function(dotted_name);
        let func = match known {
            Some(f) => f,
            None => {
                if let Some(sym) = resolve(&self.current_scope, dotted_name) {
                    if matches!(&sym.ty.base, BaseType::Named(n) if n == "function") {
                        for arg in args {
                            self.visit_expr(&arg.value);
                        }
                        return PineType::series_any();
                    }
                }
                self.error(format!("Unknown function '{}'", dotted_name), span);
                for arg in args {
                    self.visit_expr(&arg.value);
                }
                return PineType::series_any();
            }
        };

        if !func.variadic && args.len() > func.params.len() {
            self.error(format!("Too many arguments for '{}'", dotted_name), span);
        }

        for arg in args {
            self.visit_expr(&arg.value);
        }

        catalog::return_type(func)
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn literal_type(lit: &pinelint_par::Literal) -> PineType {
    use pinelint_par::LiteralTag;
    let base = match lit.type_tag {
        LiteralTag::Int => BaseType::Int,
        LiteralTag::Float => BaseType::Float,
        LiteralTag::String => BaseType::String,
        LiteralTag::Bool => BaseType::Bool,
        LiteralTag::Color => BaseType::Color,
        LiteralTag::Na => BaseType::Na,
    };
    PineType::constant(base)
}

fn dotted_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(id) => Some(id.name.clone()),
        Expr::BinaryOp { left, op, right, .. } if op == "." => {
            Some(format!("{}.{}", dotted_name(left)?, dotted_name(right)?))
        }
        _ => None,
    }
}

impl BaseType {
    /// Parses a type-hint word from the AST the same way `types::PineType`
    /// parses the qualifier-prefixed form, for the unqualified words the
    /// parser stores in `VarDecl::type_hint`/`Param::type_hint`.
    pub(crate) fn parse_public(word: &str) -> BaseType {
        PineType::parse(word).base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinelint_lex::Lexer;
    use pinelint_par::parse;

    fn analyze(source: &str) -> SemanticAnalyzer {
        let tokens = Lexer::tokenize(source).unwrap();
        let (stmts, parse_errors) = parse(&tokens);
        assert!(parse_errors.is_empty(), "unexpected parse errors: {:?}", parse_errors);
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.analyze(&stmts);
        analyzer
    }

    #[test]
    fn undefined_identifier_is_an_error() {
        let analyzer = analyze("plot(undefined_thing)\n");
        assert_eq!(analyzer.errors.len(), 1);
        assert!(analyzer.errors[0].message.contains("Undefined identifier"));
    }

    #[test]
    fn builtin_variable_resolves_without_error() {
        let analyzer = analyze("plot(close)\n");
        assert!(analyzer.errors.is_empty());
    }

    #[test]
    fn redeclaration_in_same_scope_is_an_error() {
        let analyzer = analyze("x = 1\nx = 2\n");
        assert_eq!(analyzer.errors.len(), 1);
    }

    #[test]
    fn shadowing_in_nested_block_warns() {
        let analyzer = analyze("x = 1\nif true\n    x = 2\n    plot(x)\n");
        assert_eq!(analyzer.warnings.len(), 1);
    }

    #[test]
    fn unused_variable_has_zero_usage_count() {
        let analyzer = analyze("x = 1\nplot(close)\n");
        let sym = resolve(&analyzer.global_scope, "x");
        assert!(sym.is_none());
        let root_scope = &analyzer.all_scopes[0];
        let _ = root_scope;
        let scopes_with_x: Vec<_> = analyzer
            .all_scopes
            .iter()
            .filter(|s| s.borrow().declares("x"))
            .collect();
        assert_eq!(scopes_with_x.len(), 1);
        assert_eq!(scopes_with_x[0].borrow().symbols["x"].usage_count, 0);
    }

    #[test]
    fn dotted_builtin_variable_resolves() {
        let analyzer = analyze("strategy.entry(\"e\", strategy.long)\n");
        assert!(analyzer.errors.is_empty());
    }

    #[test]
    fn type_def_registers_name() {
        let analyzer = analyze("type Point\n    float x\n    float y\nplot(close)\n");
        assert!(analyzer.errors.is_empty());
        let found = analyzer
            .all_scopes
            .iter()
            .any(|s| s.borrow().declares("Point"));
        assert!(found);
    }
}
