// AST schema: pure data, no behavior beyond the tree-walking dispatch
// done in `eval`. The variant set is closed; sequences of statements are
// stored in source order.

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(i64),
    Str(String),
    Bool(bool),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "NUM",
            Value::Str(_) => "STRING",
            Value::Bool(_) => "BOOL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumRel {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrRel {
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Plus,
    Minus,
    Times,
    Divide,
    Mod,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    Literal(Value),
    Readint,
    Readstr,
    Unary(Box<Expr>, u32),
    Binop(Box<Expr>, BinOp, Box<Expr>, u32),
    Grouping(Box<Expr>),
    Len(Box<Expr>, u32),
    Pos(Box<Expr>, Box<Expr>, u32),
    Concat(Box<Expr>, Box<Expr>, u32),
    Substr(Box<Expr>, Box<Expr>, Box<Expr>, u32),
    Not(Box<Expr>, u32),
    Boolop(Box<Expr>, BoolOp, Box<Expr>, u32),
    NumRelop(Box<Expr>, NumRel, Box<Expr>, u32),
    StrRelop(Box<Expr>, StrRel, Box<Expr>, u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimpleInstr {
    Assign(String, Expr, u32),
    Print(Expr, u32),
    If(Expr, Box<SimpleInstr>, Option<Box<SimpleInstr>>, u32),
    While(Expr, Box<SimpleInstr>, bool, u32),
    Exit,
    Block(Instr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instr(pub Vec<SimpleInstr>);

#[derive(Debug, Clone, PartialEq)]
pub struct Program(pub Instr);
