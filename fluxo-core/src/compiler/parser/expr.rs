//! Expression AST

use super::stmt::Stmt;
use crate::compiler::lexer::token_kind::FluxoTokenKind;
use crate::kit::lexer::SourcePosition;
use std::fmt;

/// Expression pointer alias
pub type Expr = Box<ExprKind>;

/// Parser expression enum
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // Number literal (all Fluxo numbers are f64)
    LiteralNumber(LiteralNumber),
    // String literal
    LiteralString(LiteralString),
    // Boolean true literal
    LiteralTrue(LiteralTrue),
    // Boolean false literal
    LiteralFalse(LiteralFalse),
    // Null literal
    LiteralNull(LiteralNull),
    // Binary operator expression
    Binary(Binary),
    // Unary operator expression
    Unary(Unary),
    // Parenthesized expression
    Grouping(Grouping),
    // Variable reference
    VarRef(VarRef),
    // Assignment expression (`x = value`)
    Assign(Assign),
    // Function call
    FunctionCall(FunctionCall),
    // Member access (`object.member`)
    MemberAccess(MemberAccess),
    // Anonymous function expression
    Lambda(Lambda),
    // Module import expression: `import("path")` / `require("path")`
    Import(ImportExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralNumber {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralString {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiteralTrue;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiteralFalse;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiteralNull;

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub left: Expr,
    pub op: FluxoTokenKind,
    pub right: Expr,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: FluxoTokenKind,
    pub operand: Expr,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    pub expression: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub name: String,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub name: String,
    pub value: Expr,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub function_expr: Expr,
    pub arguments: Vec<Expr>,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
    pub object: Expr,
    pub member: String,
    pub position: SourcePosition,
}

/// `function (params) { ... }` in expression position
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: Vec<String>,
    /// Trailing `...rest` parameter, if any
    pub rest_param: Option<String>,
    pub body: Stmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportExpr {
    pub specifier: String,
    /// `require("path")` carries the legacy spelling; semantics are
    /// identical to `import("path")`
    pub legacy: bool,
    pub position: SourcePosition,
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprKind::LiteralNumber(n) => write!(f, "{}", n.value),
            ExprKind::LiteralString(s) => write!(f, "\"{}\"", s.value),
            ExprKind::LiteralTrue(_) => write!(f, "true"),
            ExprKind::LiteralFalse(_) => write!(f, "false"),
            ExprKind::LiteralNull(_) => write!(f, "null"),
            ExprKind::Binary(bin) => {
                write!(f, "({} {} {})", bin.left, bin.op.symbol(), bin.right)
            }
            ExprKind::Unary(un) => write!(f, "({}{})", un.op.symbol(), un.operand),
            ExprKind::Grouping(g) => write!(f, "({})", g.expression),
            ExprKind::VarRef(v) => write!(f, "{}", v.name),
            ExprKind::Assign(a) => write!(f, "{} = {}", a.name, a.value),
            ExprKind::FunctionCall(call) => {
                let args = call
                    .arguments
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}({})", call.function_expr, args)
            }
            ExprKind::MemberAccess(m) => write!(f, "{}.{}", m.object, m.member),
            ExprKind::Lambda(l) => {
                let mut params = l.params.clone();
                if let Some(rest) = &l.rest_param {
                    params.push(format!("...{}", rest));
                }
                write!(f, "function ({}) {{ ... }}", params.join(", "))
            }
            ExprKind::Import(i) => {
                let keyword = if i.legacy { "require" } else { "import" };
                write!(f, "{}(\"{}\")", keyword, i.specifier)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_number_display() {
        let expr = ExprKind::LiteralNumber(LiteralNumber { value: 42.0 });
        assert_eq!(format!("{}", expr), "42");
    }

    #[test]
    fn test_literal_string_display() {
        let expr = ExprKind::LiteralString(LiteralString {
            value: "hello".to_string(),
        });
        assert_eq!(format!("{}", expr), "\"hello\"");
    }

    #[test]
    fn test_import_display() {
        let expr = ExprKind::Import(ImportExpr {
            specifier: "/lib/math".to_string(),
            legacy: true,
            position: SourcePosition::start(),
        });
        assert_eq!(format!("{}", expr), "require(\"/lib/math\")");
    }

    #[test]
    fn test_binary_display() {
        let expr = ExprKind::Binary(Binary {
            left: Box::new(ExprKind::LiteralNumber(LiteralNumber { value: 2.0 })),
            op: FluxoTokenKind::Plus,
            right: Box::new(ExprKind::LiteralNumber(LiteralNumber { value: 3.0 })),
            position: SourcePosition::start(),
        });
        assert_eq!(format!("{}", expr), "(2 + 3)");
    }

    #[test]
    fn test_expr_kind_clone() {
        let expr = ExprKind::LiteralNull(LiteralNull);
        assert_eq!(expr, expr.clone());
    }
}
