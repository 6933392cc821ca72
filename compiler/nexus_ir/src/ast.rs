//! Flat arena AST for Nexus programs.
//!
//! Nodes live in contiguous vectors inside [`AstArena`] and reference each
//! other through `u32` ids; child lists (call arguments, block bodies,
//! class methods) are ranges into side pools. The whole [`Module`] is a
//! strict tree (ids only ever point at earlier allocations), which is
//! what makes it trivially serializable for the compiled-AST cache.

use crate::{Name, Span};

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id! {
    /// Id of an [`Expr`] in the arena.
    ExprId
}
arena_id! {
    /// Id of a [`Stmt`] in the arena.
    StmtId
}
arena_id! {
    /// Id of a [`Function`] in the arena's function table.
    FuncId
}

macro_rules! arena_range {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            pub start: u32,
            pub len: u32,
        }

        impl $name {
            pub const EMPTY: $name = $name { start: 0, len: 0 };

            #[inline]
            pub const fn len(self) -> usize {
                self.len as usize
            }

            #[inline]
            pub const fn is_empty(self) -> bool {
                self.len == 0
            }
        }
    };
}

arena_range! {
    /// Range into the expression pool (argument and array-element lists).
    ExprRange
}
arena_range! {
    /// Range into the statement pool (block and program bodies).
    StmtRange
}
arena_range! {
    /// Range into the function pool (class method lists).
    FuncRange
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
}

impl UnaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Binary operators (strict evaluation; `&&`/`||` are [`LogicalOp`]s).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl BinaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
        }
    }
}

/// Short-circuiting logical operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

/// An expression node.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression node kinds.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    Null,
    Bool(bool),
    Number(f64),
    /// String literal (interned body).
    Str(Name),
    /// Array literal: `[a, b, c]`.
    Array(ExprRange),
    /// Variable reference.
    Ident(Name),
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Logical {
        op: LogicalOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    /// Variable assignment: `name = value`.
    Assign {
        name: Name,
        value: ExprId,
    },
    Call {
        callee: ExprId,
        args: ExprRange,
    },
    /// Property read: `object.field`.
    Get {
        object: ExprId,
        field: Name,
    },
    /// Property write: `object.field = value`.
    Set {
        object: ExprId,
        field: Name,
        value: ExprId,
    },
    /// Array index read: `object[index]`.
    Index {
        object: ExprId,
        index: ExprId,
    },
}

/// A statement node.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Statement node kinds.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum StmtKind {
    /// Expression statement; the value is discarded.
    Expr(ExprId),
    VarDecl {
        name: Name,
        init: Option<ExprId>,
    },
    ConstDecl {
        name: Name,
        init: ExprId,
    },
    /// Function declaration; the body lives in the function table.
    Func(FuncId),
    ClassDecl {
        name: Name,
        superclass: Option<Name>,
        methods: FuncRange,
    },
    Block(StmtRange),
    /// `elif` chains desugar into nested `If` in the else slot.
    If {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While {
        cond: ExprId,
        body: StmtId,
    },
    /// C-style loop; any clause may be absent.
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        update: Option<ExprId>,
        body: StmtId,
    },
    Break,
    Continue,
    Return(Option<ExprId>),
    Throw(ExprId),
    Try {
        body: StmtId,
        catch_name: Name,
        catch_body: StmtId,
    },
}

/// A function declaration or class method.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    pub name: Name,
    pub params: Vec<Name>,
    pub body: StmtRange,
    pub span: Span,
}

/// Arena holding every node of a parsed program.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct AstArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    funcs: Vec<Function>,
    expr_pool: Vec<ExprId>,
    stmt_pool: Vec<StmtId>,
    func_pool: Vec<FuncId>,
}

impl AstArena {
    pub fn new() -> Self {
        AstArena::default()
    }

    /// Allocate an expression, returning its id.
    pub fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::from_raw(self.exprs.len() as u32);
        self.exprs.push(Expr { kind, span });
        id
    }

    /// Allocate a statement, returning its id.
    pub fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        let id = StmtId::from_raw(self.stmts.len() as u32);
        self.stmts.push(Stmt { kind, span });
        id
    }

    /// Allocate a function, returning its id.
    pub fn alloc_func(&mut self, func: Function) -> FuncId {
        let id = FuncId::from_raw(self.funcs.len() as u32);
        self.funcs.push(func);
        id
    }

    /// Move a list of expression ids into the pool.
    pub fn alloc_expr_list(&mut self, ids: Vec<ExprId>) -> ExprRange {
        let start = self.expr_pool.len() as u32;
        let len = ids.len() as u32;
        self.expr_pool.extend(ids);
        ExprRange { start, len }
    }

    /// Move a list of statement ids into the pool.
    pub fn alloc_stmt_list(&mut self, ids: Vec<StmtId>) -> StmtRange {
        let start = self.stmt_pool.len() as u32;
        let len = ids.len() as u32;
        self.stmt_pool.extend(ids);
        StmtRange { start, len }
    }

    /// Move a list of function ids into the pool.
    pub fn alloc_func_list(&mut self, ids: Vec<FuncId>) -> FuncRange {
        let start = self.func_pool.len() as u32;
        let len = ids.len() as u32;
        self.func_pool.extend(ids);
        FuncRange { start, len }
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn func(&self, id: FuncId) -> &Function {
        &self.funcs[id.index()]
    }

    #[inline]
    pub fn expr_ids(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_pool[range.start as usize..(range.start + range.len) as usize]
    }

    #[inline]
    pub fn stmt_ids(&self, range: StmtRange) -> &[StmtId] {
        &self.stmt_pool[range.start as usize..(range.start + range.len) as usize]
    }

    #[inline]
    pub fn func_ids(&self, range: FuncRange) -> &[FuncId] {
        &self.func_pool[range.start as usize..(range.start + range.len) as usize]
    }

    /// Number of allocated expressions.
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Number of allocated statements.
    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

/// One parsed program: top-level statement list plus its arena.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Module {
    pub body: StmtRange,
    pub arena: AstArena,
}
