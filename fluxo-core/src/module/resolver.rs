//! Module path resolution
//!
//! Every import specifier is reduced to one canonical absolute form
//! before it touches the registry or crosses the bridge: `.` and `..`
//! segments are resolved against the importing file's directory and the
//! default `.fxm` extension is appended when none is given. The canonical
//! path is the sole cache and request key - never the specifier text as
//! written.

use crate::compiler::parser::expr::ExprKind;
use crate::compiler::parser::program::Program;
use crate::compiler::parser::stmt::{Stmt, StmtKind};

/// Resolve an import specifier against the importing file's path into a
/// canonical absolute path
///
/// # Examples
/// - `canonicalize("/m", None)` -> `/m.fxm`
/// - `canonicalize("./util", Some("/lib/main.fxm"))` -> `/lib/util.fxm`
/// - `canonicalize("../a/b.fxm", Some("/lib/x.fxm"))` -> `/a/b.fxm`
pub fn canonicalize(specifier: &str, importer: Option<&str>) -> String {
    let joined = if specifier.starts_with('/') {
        specifier.to_string()
    } else {
        let base = importer.map(dirname).unwrap_or("");
        format!("{}/{}", base, specifier)
    };

    // Collapse `.` and `..` segments
    let mut stack: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }

    let mut canonical = format!("/{}", stack.join("/"));

    // Default extension when the file name has none
    let file_name = stack.last().copied().unwrap_or("");
    if !file_name.contains('.') {
        canonical.push_str(".fxm");
    }
    canonical
}

/// Directory part of a path, without the trailing slash
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Collect every import specifier a program references, in document
/// order: `import from "p" { ... }` statements plus `import("p")` /
/// `require("p")` expressions
pub fn collect_import_specifiers(program: &Program) -> Vec<String> {
    let mut specifiers = Vec::new();
    for stmt in &program.statements {
        collect_stmt(stmt, &mut specifiers);
    }
    specifiers
}

fn collect_stmt(stmt: &Stmt, out: &mut Vec<String>) {
    match stmt.as_ref() {
        StmtKind::Expr(s) => collect_expr(&s.expression, out),
        StmtKind::Empty(_) => {}
        StmtKind::Block(s) => s.statements.iter().for_each(|s| collect_stmt(s, out)),
        StmtKind::LocalDecl(s) => {
            if let Some(init) = &s.initializer {
                collect_expr(init, out);
            }
        }
        StmtKind::FunctionDecl(s) => collect_stmt(&s.body, out),
        StmtKind::If(s) => {
            collect_expr(&s.condition, out);
            collect_stmt(&s.then_body, out);
            if let Some(else_body) = &s.else_body {
                collect_stmt(else_body, out);
            }
        }
        StmtKind::While(s) => {
            collect_expr(&s.condition, out);
            collect_stmt(&s.body, out);
        }
        StmtKind::For(s) => {
            if let Some(init) = &s.init {
                collect_stmt(init, out);
            }
            if let Some(condition) = &s.condition {
                collect_expr(condition, out);
            }
            if let Some(step) = &s.step {
                collect_expr(step, out);
            }
            collect_stmt(&s.body, out);
        }
        StmtKind::Return(s) => {
            if let Some(value) = &s.value {
                collect_expr(value, out);
            }
        }
        StmtKind::Module(s) => collect_stmt(&s.body, out),
        StmtKind::ExportList(_) => {}
        StmtKind::ImportFrom(s) => out.push(s.specifier.clone()),
        StmtKind::Wait(s) => {
            collect_expr(&s.seconds, out);
            collect_stmt(&s.body, out);
        }
    }
}

fn collect_expr(expr: &ExprKind, out: &mut Vec<String>) {
    match expr {
        ExprKind::Import(i) => out.push(i.specifier.clone()),
        ExprKind::Binary(b) => {
            collect_expr(&b.left, out);
            collect_expr(&b.right, out);
        }
        ExprKind::Unary(u) => collect_expr(&u.operand, out),
        ExprKind::Grouping(g) => collect_expr(&g.expression, out),
        ExprKind::Assign(a) => collect_expr(&a.value, out),
        ExprKind::FunctionCall(c) => {
            collect_expr(&c.function_expr, out);
            c.arguments.iter().for_each(|a| collect_expr(a, out));
        }
        ExprKind::MemberAccess(m) => collect_expr(&m.object, out),
        ExprKind::Lambda(l) => collect_stmt(&l.body, out),
        _ => {}
    }
}
