use std::fmt::Display;

use la_arena::{Arena, Idx};

use crate::Span;

pub type NodeId = Idx<Node>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Float,
    String,
}

/// Operators, as they appear in operator nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    // Prefix
    Neg,
    Not,
    Addr,
    MutAddr,

    // Infix
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,

    // Postfix
    Unwrap,
    Try,
}

impl OperatorKind {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            OperatorKind::Add
                | OperatorKind::Sub
                | OperatorKind::Mul
                | OperatorKind::Div
                | OperatorKind::Mod
                | OperatorKind::BitAnd
                | OperatorKind::BitOr
                | OperatorKind::BitXor
                | OperatorKind::Shl
                | OperatorKind::Shr
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            OperatorKind::Eq
                | OperatorKind::Ne
                | OperatorKind::Lt
                | OperatorKind::Le
                | OperatorKind::Gt
                | OperatorKind::Ge
        )
    }
}

impl Display for OperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            OperatorKind::Neg | OperatorKind::Sub => "-",
            OperatorKind::Not => "!",
            OperatorKind::Addr | OperatorKind::BitAnd => "&",
            OperatorKind::MutAddr => "&mut",
            OperatorKind::Add => "+",
            OperatorKind::Mul => "*",
            OperatorKind::Div => "/",
            OperatorKind::Mod => "%",
            OperatorKind::BitOr => "|",
            OperatorKind::BitXor => "^",
            OperatorKind::Shl => "<<",
            OperatorKind::Shr => ">>",
            OperatorKind::Eq => "==",
            OperatorKind::Ne => "!=",
            OperatorKind::Lt => "<",
            OperatorKind::Le => "<=",
            OperatorKind::Gt => ">",
            OperatorKind::Ge => ">=",
            OperatorKind::Assign => "=",
            OperatorKind::Unwrap => ".*",
            OperatorKind::Try => "?",
        };
        write!(f, "{}", symbol)
    }
}

/// Node shapes.
///
/// Child links are arena indices into the owning [`Ast`]. Lists that carry
/// delimiters (`(...)`, `[...]`, `{...}`) are nodes of their own so that
/// diagnostics can point at them.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Module(Vec<NodeId>),
    /// Marker left by a failed parse. Never valid input to the checker.
    BadNode,
    Empty,
    Ident(String),
    Literal {
        kind: LiteralKind,
        value: String,
    },
    Operator(OperatorKind),

    /// `[N]T`, `args` is a bracket list.
    ArrayType {
        args: NodeId,
        elem: NodeId,
    },
    ParenList(Vec<NodeId>),
    BracketList(Vec<NodeId>),
    CurlyList(Vec<NodeId>),

    PrefixOp {
        op: NodeId,
        operand: NodeId,
    },
    InfixOp {
        op: NodeId,
        lhs: NodeId,
        rhs: NodeId,
    },
    PostfixOp {
        op: NodeId,
        operand: NodeId,
    },
    Call {
        callee: NodeId,
        args: NodeId,
    },
    Index {
        target: NodeId,
        args: NodeId,
    },
    /// `@name(...)` or `@name {...}`.
    BuiltInCall {
        name: NodeId,
        args: NodeId,
    },
    If {
        cond: NodeId,
        body: NodeId,
        /// Either a curly list or another `If`.
        else_: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    Signature {
        params: NodeId,
        result: Option<NodeId>,
    },

    Binding {
        name: NodeId,
        ty: Option<NodeId>,
    },
    BindingWithValue {
        name: NodeId,
        ty: Option<NodeId>,
        value: NodeId,
    },

    VarDecl {
        name: NodeId,
        ty: Option<NodeId>,
        value: Option<NodeId>,
    },
    FuncDecl {
        name: NodeId,
        signature: NodeId,
        body: Option<NodeId>,
    },
    TypeAliasDecl {
        name: NodeId,
        expr: NodeId,
    },
    StructDecl {
        name: NodeId,
        fields: Vec<NodeId>,
    },
    EnumDecl {
        name: NodeId,
        variants: Vec<NodeId>,
    },
}

impl NodeKind {
    /// Short human readable name of the node shape.
    pub fn shape(&self) -> &'static str {
        match self {
            NodeKind::Module(_) => "module",
            NodeKind::BadNode => "malformed",
            NodeKind::Empty => "empty",
            NodeKind::Ident(_) => "identifier",
            NodeKind::Literal { .. } => "literal",
            NodeKind::Operator(_) => "operator",
            NodeKind::ArrayType { .. } => "array type",
            NodeKind::ParenList(_) => "parenthesised list",
            NodeKind::BracketList(_) => "bracket list",
            NodeKind::CurlyList(_) => "block",
            NodeKind::PrefixOp { .. } => "prefix operation",
            NodeKind::InfixOp { .. } => "infix operation",
            NodeKind::PostfixOp { .. } => "postfix operation",
            NodeKind::Call { .. } => "call",
            NodeKind::Index { .. } => "index",
            NodeKind::BuiltInCall { .. } => "built-in call",
            NodeKind::If { .. } => "if",
            NodeKind::While { .. } => "while",
            NodeKind::Signature { .. } => "signature",
            NodeKind::Binding { .. } => "binding",
            NodeKind::BindingWithValue { .. } => "binding with value",
            NodeKind::VarDecl { .. } => "variable declaration",
            NodeKind::FuncDecl { .. } => "function declaration",
            NodeKind::TypeAliasDecl { .. } => "type alias declaration",
            NodeKind::StructDecl { .. } => "struct declaration",
            NodeKind::EnumDecl { .. } => "enum declaration",
        }
    }

    pub fn is_decl(&self) -> bool {
        matches!(
            self,
            NodeKind::VarDecl { .. }
                | NodeKind::FuncDecl { .. }
                | NodeKind::TypeAliasDecl { .. }
                | NodeKind::StructDecl { .. }
                | NodeKind::EnumDecl { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// A parsed compilation unit. Nodes are owned by the arena and referenced
/// by [`NodeId`] everywhere else.
#[derive(Debug, Clone)]
pub struct Ast {
    pub nodes: Arena<Node>,
    pub root: NodeId,
}

impl Ast {
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id].span.clone()
    }

    /// Name of an identifier node.
    pub fn ident_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Elements of a delimited list node.
    pub fn list(&self, id: NodeId) -> Option<&[NodeId]> {
        match &self.nodes[id].kind {
            NodeKind::ParenList(items) | NodeKind::BracketList(items) | NodeKind::CurlyList(items) => {
                Some(items)
            }
            _ => None,
        }
    }

    /// Top-level items of the module root.
    pub fn items(&self) -> &[NodeId] {
        match &self.nodes[self.root].kind {
            NodeKind::Module(items) => items,
            _ => &[],
        }
    }

    /// The node that produces the value of a block: its last statement, or
    /// the block itself when it is empty. For an `if` this is the trailing
    /// node of its first branch.
    pub fn trailing(&self, id: NodeId) -> NodeId {
        match &self.nodes[id].kind {
            NodeKind::CurlyList(items) => items.last().copied().unwrap_or(id),
            NodeKind::If { body, .. } => self.trailing(*body),
            _ => id,
        }
    }
}

/// Incrementally builds an [`Ast`]; used by the parser.
#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes: Arena<Node>,
}

impl AstBuilder {
    pub fn new() -> Self {
        AstBuilder {
            nodes: Arena::new(),
        }
    }

    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.nodes.alloc(Node { kind, span })
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id].span.clone()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    /// Replaces the shape of an already allocated node.
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id].kind = kind;
    }

    pub fn finish(self, root: NodeId) -> Ast {
        Ast {
            nodes: self.nodes,
            root,
        }
    }
}
