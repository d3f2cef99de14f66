//! Statement AST

use super::expr::Expr;
use crate::kit::lexer::SourcePosition;
use std::fmt;

/// Statement pointer alias
pub type Stmt = Box<StmtKind>;

/// Parser statement enum
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    // Expression statement (`a + b`)
    Expr(ExprStmt),
    // Empty statement (a lone `;`)
    Empty(EmptyStmt),
    // Block statement (`{ ... }`)
    Block(BlockStmt),
    // Local declaration (`local x = 5`)
    LocalDecl(LocalDeclStmt),
    // Function declaration (`function add(a, b) { ... }`)
    FunctionDecl(FunctionDeclStmt),
    // If statement
    If(IfStmt),
    // While loop
    While(WhileStmt),
    // C-style for loop (`for (init; cond; step) { ... }`)
    For(ForStmt),
    // Return statement
    Return(ReturnStmt),
    // Module block (`module name { ... }`, top level only)
    Module(ModuleStmt),
    // Selective export (`export { a, b }`, modules only)
    ExportList(ExportListStmt),
    // Selective import (`import from "path" { a, b }`)
    ImportFrom(ImportFromStmt),
    // Deferred block (`wait(seconds) { ... }`)
    Wait(WaitStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expression: Expr,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmptyStmt;

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalDeclStmt {
    pub name: String,
    /// `local x` without initializer leaves the binding null
    pub initializer: Option<Expr>,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclStmt {
    pub name: String,
    pub params: Vec<String>,
    /// Trailing `...rest` parameter, if any
    pub rest_param: Option<String>,
    pub body: Stmt,
    /// Declared with `export function`
    pub exported: bool,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Stmt,
    /// `else` block, or the next `if` of an `else if` chain
    pub else_body: Option<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Stmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<Stmt>,
    pub condition: Option<Expr>,
    pub step: Option<Expr>,
    pub body: Stmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleStmt {
    pub name: String,
    pub body: Stmt,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportListStmt {
    pub names: Vec<String>,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportFromStmt {
    pub specifier: String,
    pub names: Vec<String>,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaitStmt {
    /// Delay in seconds; fractional values are allowed
    pub seconds: Expr,
    pub body: Stmt,
    pub position: SourcePosition,
}

impl fmt::Display for StmtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StmtKind::Expr(stmt) => write!(f, "{};", stmt.expression),
            StmtKind::Empty(_) => write!(f, ";"),
            StmtKind::Block(block) => {
                let stmts = block
                    .statements
                    .iter()
                    .map(|s| format!("  {}", s))
                    .collect::<Vec<_>>()
                    .join("\n");
                write!(f, "{{\n{}\n}}", stmts)
            }
            StmtKind::LocalDecl(decl) => match &decl.initializer {
                Some(init) => write!(f, "local {} = {};", decl.name, init),
                None => write!(f, "local {};", decl.name),
            },
            StmtKind::FunctionDecl(func) => {
                let mut params = func.params.clone();
                if let Some(rest) = &func.rest_param {
                    params.push(format!("...{}", rest));
                }
                let prefix = if func.exported { "export " } else { "" };
                write!(
                    f,
                    "{}function {}({}) {}",
                    prefix,
                    func.name,
                    params.join(", "),
                    func.body
                )
            }
            StmtKind::If(stmt) => {
                write!(f, "if ({}) {}", stmt.condition, stmt.then_body)?;
                if let Some(else_body) = &stmt.else_body {
                    write!(f, " else {}", else_body)?;
                }
                Ok(())
            }
            StmtKind::While(stmt) => write!(f, "while ({}) {}", stmt.condition, stmt.body),
            StmtKind::For(stmt) => {
                let init = stmt
                    .init
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| ";".to_string());
                let cond = stmt
                    .condition
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                let step = stmt
                    .step
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                write!(f, "for ({} {}; {}) {}", init, cond, step, stmt.body)
            }
            StmtKind::Return(stmt) => match &stmt.value {
                Some(value) => write!(f, "return {};", value),
                None => write!(f, "return;"),
            },
            StmtKind::Module(stmt) => write!(f, "module {} {}", stmt.name, stmt.body),
            StmtKind::ExportList(stmt) => write!(f, "export {{ {} }};", stmt.names.join(", ")),
            StmtKind::ImportFrom(stmt) => write!(
                f,
                "import from \"{}\" {{ {} }};",
                stmt.specifier,
                stmt.names.join(", ")
            ),
            StmtKind::Wait(stmt) => write!(f, "wait({}) {}", stmt.seconds, stmt.body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::expr::{ExprKind, LiteralNumber};
    use super::*;

    fn num(value: f64) -> Expr {
        Box::new(ExprKind::LiteralNumber(LiteralNumber { value }))
    }

    #[test]
    fn test_empty_stmt_display() {
        assert_eq!(format!("{}", StmtKind::Empty(EmptyStmt)), ";");
    }

    #[test]
    fn test_local_decl_display() {
        let stmt = StmtKind::LocalDecl(LocalDeclStmt {
            name: "x".to_string(),
            initializer: Some(num(5.0)),
            position: SourcePosition::start(),
        });
        assert_eq!(format!("{}", stmt), "local x = 5;");
    }

    #[test]
    fn test_export_list_display() {
        let stmt = StmtKind::ExportList(ExportListStmt {
            names: vec!["a".to_string(), "b".to_string()],
            position: SourcePosition::start(),
        });
        assert_eq!(format!("{}", stmt), "export { a, b };");
    }

    #[test]
    fn test_import_from_display() {
        let stmt = StmtKind::ImportFrom(ImportFromStmt {
            specifier: "/m".to_string(),
            names: vec!["add".to_string()],
            position: SourcePosition::start(),
        });
        assert_eq!(format!("{}", stmt), "import from \"/m\" { add };");
    }

    #[test]
    fn test_wait_display() {
        let stmt = StmtKind::Wait(WaitStmt {
            seconds: num(1.5),
            body: Box::new(StmtKind::Block(BlockStmt { statements: vec![] })),
            position: SourcePosition::start(),
        });
        assert!(format!("{}", stmt).starts_with("wait(1.5)"));
    }

    #[test]
    fn test_stmt_kind_clone() {
        let stmt = StmtKind::Empty(EmptyStmt);
        assert_eq!(stmt, stmt.clone());
    }
}
