use pinelint_util::Span;

/// A literal's tag, carried alongside its raw text so the semantic analyzer
/// never has to re-lex a literal's value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralTag {
    Int,
    Float,
    String,
    Bool,
    Color,
    Na,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Literal {
    pub value: String,
    pub type_tag: LiteralTag,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_hint: Option<String>,
    pub default: Option<Box<Expr>>,
    pub span: Span,
}

/// Every expression node. `If`/`For`/`While`/`Switch` appear here as well as
/// in [`Stmt`] because they are both statement and expression positions:
/// they yield the value of the last statement of whichever branch runs.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Identifier(Identifier),
    BinaryOp {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
        span: Span,
    },
    UnaryOp {
        op: String,
        operand: Box<Expr>,
        span: Span,
    },
    FunctionCall {
        dotted_name: String,
        args: Vec<Arg>,
        span: Span,
    },
    TernaryOp {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        span: Span,
    },
    ArrayAccess {
        base: Box<Expr>,
        indices: Vec<Expr>,
        span: Span,
    },
    ArrayLiteral {
        elements: Vec<Expr>,
        span: Span,
    },
    If {
        cond: Box<Expr>,
        then_block: Block,
        else_block: Option<Block>,
        span: Span,
    },
    For {
        var_name: String,
        start: Box<Expr>,
        end: Box<Expr>,
        step: Option<Box<Expr>>,
        body: Block,
        span: Span,
    },
    While {
        cond: Box<Expr>,
        body: Block,
        span: Span,
    },
    Switch {
        subject: Option<Box<Expr>>,
        cases: Vec<SwitchCase>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(l) => l.span,
            Expr::Identifier(i) => i.span,
            Expr::BinaryOp { span, .. }
            | Expr::UnaryOp { span, .. }
            | Expr::FunctionCall { span, .. }
            | Expr::TernaryOp { span, .. }
            | Expr::ArrayAccess { span, .. }
            | Expr::ArrayLiteral { span, .. }
            | Expr::If { span, .. }
            | Expr::For { span, .. }
            | Expr::While { span, .. }
            | Expr::Switch { span, .. } => *span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub value: Option<Box<Expr>>,
    pub is_default: bool,
    pub body: Block,
    pub span: Span,
}

/// `NEWLINE INDENT statement+ DEDENT`. Carries its own span even when empty
/// so the node-position invariant holds for degenerate blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptKind {
    Indicator,
    Strategy,
    Library,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    ScriptDecl {
        kind: ScriptKind,
        args: Vec<Arg>,
        span: Span,
    },
    VarDecl {
        name: String,
        qualifier: Option<String>,
        type_hint: Option<String>,
        value: Box<Expr>,
        is_tuple: bool,
        span: Span,
    },
    Assignment {
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    FunctionDef {
        name: String,
        params: Vec<Param>,
        body: Block,
        return_type: Option<String>,
        exported: bool,
        is_method: bool,
        span: Span,
    },
    TypeDef {
        name: String,
        fields: Vec<Param>,
        exported: bool,
        span: Span,
    },
    ImportDecl {
        path: String,
        alias: Option<String>,
        span: Span,
    },
    ExpressionStatement {
        expr: Box<Expr>,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::ScriptDecl { span, .. }
            | Stmt::VarDecl { span, .. }
            | Stmt::Assignment { span, .. }
            | Stmt::FunctionDef { span, .. }
            | Stmt::TypeDef { span, .. }
            | Stmt::ImportDecl { span, .. }
            | Stmt::ExpressionStatement { span, .. } => *span,
        }
    }
}
