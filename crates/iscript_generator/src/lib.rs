//! iscript_generator: tree to JavaScript text output.
//!
//! Walks the statement tree and emits target-language source, performing the
//! idiom translations: built-in call rewrites (`len`, `range`, `enumerate`),
//! operator remapping (`and`/`or`/`not`/`is`, `**`, floor division),
//! method-name mapping (`append` → `push`, ...), and block-structure
//! synthesis with a 2-space indent.
//!
//! Expression emission is a lexical walk over the opaque token run produced
//! by the parser; there is no expression tree. The generator never fails —
//! malformed input degrades to syntactically odd output text.

use iscript_ast::node::*;
use iscript_ast::token::{Token, TokenKind};
use rustc_hash::FxHashMap;

/// Message used when an `assert` carries no explicit one.
const DEFAULT_ASSERT_MESSAGE: &str = "\"Assertion failed\"";

/// Alias introduced by a `with` statement that names none.
const DEFAULT_WITH_ALIAS: &str = "ctx";

/// Handler name used when an `except` clause binds none.
const DEFAULT_HANDLER_NAME: &str = "error";

/// The generator converts a [`Program`] tree to JavaScript text.
pub struct Generator {
    output: String,
    indent_level: u32,
    method_renames: FxHashMap<&'static str, &'static str>,
}

impl Generator {
    pub fn new() -> Self {
        let method_renames: FxHashMap<&'static str, &'static str> = [
            ("append", "push"),
            ("extend", "push"),
            ("upper", "toUpperCase"),
            ("lower", "toLowerCase"),
            ("strip", "trim"),
            ("lstrip", "trimStart"),
            ("rstrip", "trimEnd"),
            ("startswith", "startsWith"),
            ("endswith", "endsWith"),
            ("find", "indexOf"),
            ("index", "indexOf"),
            ("items", "entries"),
        ]
        .into_iter()
        .collect();
        Self {
            output: String::with_capacity(4096),
            indent_level: 0,
            method_renames,
        }
    }

    /// Emit a whole program as JavaScript text.
    pub fn generate(&mut self, program: &Program<'_>) -> String {
        self.output.clear();
        self.indent_level = 0;
        for stmt in program.body {
            self.emit_statement(stmt);
        }
        self.output.clone()
    }

    // ========================================================================
    // Output helpers
    // ========================================================================

    #[inline]
    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str("  ");
        }
    }

    // ========================================================================
    // Statement emission
    // ========================================================================

    fn emit_statement(&mut self, stmt: &Statement<'_>) {
        match stmt {
            Statement::FunctionDeclaration(n) => self.emit_function(n),
            Statement::ClassDeclaration(n) => self.emit_class(n),
            Statement::ForInLoop(n) => self.emit_for_in(n),
            Statement::IfStatement(n) => {
                self.write_indent();
                self.emit_if_chain(n);
                self.write("\n");
            }
            Statement::WhileLoop(n) => {
                let condition = self.expression_text(&n.condition);
                self.write_indent();
                self.write("while (");
                self.write(&condition);
                self.write(") ");
                self.emit_block(n.body);
                self.write("\n");
            }
            Statement::TryStatement(n) => self.emit_try(n),
            Statement::WithStatement(n) => self.emit_with(n),
            Statement::ReturnStatement(n) => match &n.value {
                Some(value) => {
                    let text = self.expression_text(value);
                    self.write_indent();
                    self.write("return ");
                    self.write(&text);
                    self.write(";\n");
                }
                None => {
                    self.write_indent();
                    self.write("return;\n");
                }
            },
            Statement::RaiseStatement(n) => {
                let text = self.expression_text(&n.error);
                self.write_indent();
                self.write("throw ");
                self.write(&text);
                self.write(";\n");
            }
            Statement::AssertStatement(n) => {
                let condition = self.expression_text(&n.condition);
                let message = match &n.message {
                    Some(m) => self.expression_text(m),
                    None => DEFAULT_ASSERT_MESSAGE.to_string(),
                };
                self.write_indent();
                self.write("if (!(");
                self.write(&condition);
                self.write(")) throw new Error(");
                self.write(&message);
                self.write(");\n");
            }
            Statement::PrintStatement(n) => {
                let args: Vec<String> = n
                    .arguments
                    .iter()
                    .map(|a| self.expression_text(a))
                    .collect();
                self.write_indent();
                self.write("console.log(");
                self.write(&args.join(", "));
                self.write(");\n");
            }
            Statement::ImportStatement(n) => {
                for module in n.modules {
                    self.write_indent();
                    match &module.alias {
                        Some(alias) => {
                            let line =
                                format!("import * as {} from '{}';\n", alias, module.name);
                            self.write(&line);
                        }
                        None => {
                            let line =
                                format!("import {} from '{}';\n", module.name, module.name);
                            self.write(&line);
                        }
                    }
                }
            }
            Statement::FromImportStatement(n) => self.emit_from_import(n),
            Statement::PassStatement => {}
            Statement::BreakStatement => {
                self.write_indent();
                self.write("break;\n");
            }
            Statement::ContinueStatement => {
                self.write_indent();
                self.write("continue;\n");
            }
            Statement::DeleteStatement(n) => {
                let text = self.expression_text(&n.target);
                self.write_indent();
                self.write("delete ");
                self.write(&text);
                self.write(";\n");
            }
            Statement::GlobalStatement(_) => {}
            Statement::LambdaExpression(n) => {
                let body = self.expression_text(&n.body);
                self.write_indent();
                self.write("(");
                self.write(&n.params.join(", "));
                self.write(") => ");
                self.write(&body);
                self.write(";\n");
            }
            Statement::AwaitExpression(n) => {
                let text = self.expression_text(&n.expression);
                self.write_indent();
                self.write("await ");
                self.write(&text);
                self.write(";\n");
            }
            Statement::YieldExpression(n) => match &n.value {
                Some(value) => {
                    let text = self.expression_text(value);
                    self.write_indent();
                    self.write("yield ");
                    self.write(&text);
                    self.write(";\n");
                }
                None => {
                    self.write_indent();
                    self.write("yield;\n");
                }
            },
            Statement::ExpressionStatement(n) => {
                let text = self.expression_text(&n.expression);
                self.write_indent();
                self.write(&text);
                self.write(";\n");
            }
        }
    }

    fn emit_block(&mut self, body: &[Statement<'_>]) {
        self.write("{\n");
        self.indent_level += 1;
        for stmt in body {
            self.emit_statement(stmt);
        }
        self.indent_level -= 1;
        self.write_indent();
        self.write("}");
    }

    fn emit_function(&mut self, n: &FunctionDeclaration<'_>) {
        self.write_indent();
        if n.is_async {
            self.write("async ");
        }
        self.write("function ");
        self.write(&n.name);
        self.write("(");
        self.emit_params(n.params, false);
        self.write(") ");
        self.emit_block(n.body);
        self.write("\n");
    }

    /// Method form: no `function` keyword, `__init__` becomes `constructor`,
    /// a leading `self` parameter is dropped, and the `staticmethod` and
    /// `property` decorators map to `static` and `get`.
    fn emit_method(&mut self, n: &FunctionDeclaration<'_>) {
        self.write_indent();
        match n.decorator.as_deref() {
            Some("staticmethod") => self.write("static "),
            Some("property") => self.write("get "),
            _ => {}
        }
        if n.is_async {
            self.write("async ");
        }
        if n.name == "__init__" {
            self.write("constructor");
        } else {
            self.write(&n.name);
        }
        self.write("(");
        self.emit_params(n.params, true);
        self.write(") ");
        self.emit_block(n.body);
        self.write("\n");
    }

    fn emit_params(&mut self, params: &[Param<'_>], filter_self: bool) {
        let mut first = true;
        for (i, param) in params.iter().enumerate() {
            if filter_self && i == 0 && param.spread.is_none() && param.name == "self" {
                continue;
            }
            if !first {
                self.write(", ");
            }
            first = false;
            if param.spread.is_some() {
                self.write("...");
            }
            self.write(&param.name);
            if let Some(default) = &param.default {
                let text = self.expression_text(default);
                self.write(" = ");
                self.write(&text);
            }
        }
    }

    fn emit_class(&mut self, n: &ClassDeclaration<'_>) {
        self.write_indent();
        self.write("class ");
        self.write(&n.name);
        if let Some(super_class) = &n.super_class {
            self.write(" extends ");
            self.write(super_class);
        }
        self.write(" {\n");
        self.indent_level += 1;
        for property in n.properties {
            self.emit_statement(property);
        }
        for method in n.methods {
            self.emit_method(method);
        }
        self.indent_level -= 1;
        self.write_indent();
        self.write("}\n");
    }

    fn emit_for_in(&mut self, n: &ForInLoop<'_>) {
        let iterable = self.expression_text(&n.iterable);
        self.write_indent();
        self.write("for (const ");
        if n.variables.len() == 1 {
            self.write(&n.variables[0]);
        } else {
            let variables = n.variables.join(", ");
            self.write("[");
            self.write(&variables);
            self.write("]");
        }
        self.write(" of ");
        self.write(&iterable);
        self.write(") ");
        self.emit_block(n.body);
        self.write("\n");
    }

    fn emit_if_chain(&mut self, n: &IfStatement<'_>) {
        let condition = self.expression_text(&n.condition);
        self.write("if (");
        self.write(&condition);
        self.write(") ");
        self.emit_block(n.consequent);
        match &n.alternate {
            Some(ElseBranch::ElseIf(nested)) => {
                self.write(" else ");
                self.emit_if_chain(nested);
            }
            Some(ElseBranch::Block(body)) => {
                self.write(" else ");
                self.emit_block(body);
            }
            None => {}
        }
    }

    /// Each handler emits a `catch` clause in order; the handler's error
    /// type is discarded and a missing name defaults to `error`.
    fn emit_try(&mut self, n: &TryStatement<'_>) {
        self.write_indent();
        self.write("try ");
        self.emit_block(n.try_block);
        for handler in n.handlers {
            let name = handler
                .error_name
                .clone()
                .unwrap_or_else(|| DEFAULT_HANDLER_NAME.to_string());
            self.write(" catch (");
            self.write(&name);
            self.write(") ");
            self.emit_block(handler.body);
        }
        if let Some(finally_block) = &n.finally_block {
            self.write(" finally ");
            self.emit_block(finally_block);
        }
        self.write("\n");
    }

    /// A `with` block becomes a lexically scoped block introducing
    /// `const alias = context;`.
    fn emit_with(&mut self, n: &WithStatement<'_>) {
        let alias = n
            .alias
            .clone()
            .unwrap_or_else(|| DEFAULT_WITH_ALIAS.to_string());
        let context = self.expression_text(&n.context);
        self.write_indent();
        self.write("{\n");
        self.indent_level += 1;
        self.write_indent();
        let binding = format!("const {} = {};\n", alias, context);
        self.write(&binding);
        for stmt in n.body {
            self.emit_statement(stmt);
        }
        self.indent_level -= 1;
        self.write_indent();
        self.write("}\n");
    }

    fn emit_from_import(&mut self, n: &FromImportStatement<'_>) {
        self.write_indent();
        let is_star = n.imports.len() == 1 && n.imports[0].name == "*";
        if is_star {
            let line = format!("import * from '{}';\n", n.module);
            self.write(&line);
            return;
        }
        let entries: Vec<String> = n
            .imports
            .iter()
            .map(|entry| match &entry.alias {
                Some(alias) => format!("{} as {}", entry.name, alias),
                None => entry.name.clone(),
            })
            .collect();
        let line = format!("import {{ {} }} from '{}';\n", entries.join(", "), n.module);
        self.write(&line);
    }

    // ========================================================================
    // Expression emission
    // ========================================================================

    fn expression_text(&self, expr: &Expression<'_>) -> String {
        self.emit_tokens(expr.tokens)
    }

    /// Walk a token run with a single moving index, applying the token-level
    /// rewrites, and return the emitted text (trimmed; no other
    /// normalization).
    fn emit_tokens(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        // The floor-division rewrite wraps the emission produced since the
        // last assignment operator, so `y = 7 // 2` keeps `y =` outside the
        // Math.floor call.
        let mut floor_anchor = 0usize;
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            match token.kind {
                TokenKind::FString => {
                    self.push_boundary(&mut out);
                    out.push('`');
                    out.push_str(&token.value.replace('{', "${"));
                    out.push('`');
                }
                TokenKind::Str => {
                    self.push_boundary(&mut out);
                    out.push('"');
                    out.push_str(&token.value.replace('"', "\\\""));
                    out.push('"');
                }
                TokenKind::Template => {
                    self.push_boundary(&mut out);
                    out.push('`');
                    out.push_str(&token.value);
                    out.push('`');
                }
                TokenKind::Number => self.push_word(&mut out, &token.value),
                TokenKind::Identifier => {
                    let text = if token.value == "self" {
                        "this"
                    } else {
                        token.value.as_str()
                    };
                    self.push_word(&mut out, text);
                }
                TokenKind::Keyword => match token.value.as_str() {
                    "None" => self.push_word(&mut out, "null"),
                    "True" => self.push_word(&mut out, "true"),
                    "False" => self.push_word(&mut out, "false"),
                    "and" => out.push_str(" && "),
                    "or" => out.push_str(" || "),
                    "not" => out.push('!'),
                    "is" => out.push_str(" === "),
                    "in" => out.push_str(" in "),
                    "lambda" => return self.emit_inline_lambda(out, &tokens[i + 1..]),
                    name @ ("len" | "range" | "enumerate")
                        if tokens
                            .get(i + 1)
                            .is_some_and(|t| t.matches(TokenKind::Bracket, "(")) =>
                    {
                        let (inner, next) = capture_call(tokens, i + 1);
                        let text = self.emit_builtin(name, inner);
                        self.push_word(&mut out, &text);
                        i = next;
                        continue;
                    }
                    other => self.push_word(&mut out, other),
                },
                TokenKind::Operator => match token.value.as_str() {
                    "**" => out.push_str(" ** "),
                    "//" => {
                        let divisor = self.emit_tokens(&tokens[i + 1..]);
                        let dividend = out[floor_anchor..].trim().to_string();
                        out.truncate(floor_anchor);
                        out.push_str("Math.floor(");
                        out.push_str(&dividend);
                        out.push_str(" / ");
                        out.push_str(&divisor);
                        out.push(')');
                        return out.trim().to_string();
                    }
                    op => {
                        out.push(' ');
                        out.push_str(op);
                        out.push(' ');
                        if is_assignment_operator(op) {
                            floor_anchor = out.len();
                        }
                    }
                },
                TokenKind::Bracket => out.push_str(&token.value),
                TokenKind::Punctuation => match token.value.as_str() {
                    "." => {
                        if let Some(next) = tokens.get(i + 1) {
                            if next.kind == TokenKind::Identifier {
                                if let Some(renamed) =
                                    self.method_renames.get(next.value.as_str())
                                {
                                    out.push('.');
                                    out.push_str(renamed);
                                    i += 2;
                                    continue;
                                }
                            }
                        }
                        out.push('.');
                    }
                    "," => out.push_str(", "),
                    ":" => out.push_str(": "),
                    ";" => out.push_str("; "),
                    "?" => out.push_str(" ? "),
                    other => out.push_str(other),
                },
                // Synthetic tokens can ride along inside bracketed line
                // continuations; they carry no text.
                TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof => {}
            }
            i += 1;
        }
        out.trim().to_string()
    }

    /// Insert a space when the output would otherwise glue two words.
    fn push_boundary(&self, out: &mut String) {
        if out
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            out.push(' ');
        }
    }

    fn push_word(&self, out: &mut String, text: &str) {
        self.push_boundary(out);
        out.push_str(text);
    }

    /// Built-in call rewrites, applied when a builtin keyword is followed by
    /// its balanced argument run.
    fn emit_builtin(&self, name: &str, inner: &[Token]) -> String {
        let args: Vec<String> = split_arguments(inner)
            .into_iter()
            .map(|a| self.emit_tokens(a))
            .collect();
        if args.is_empty() {
            return format!("{}()", name);
        }
        match (name, args.len()) {
            ("len", _) => format!("{}.length", args[0]),
            ("range", 1) => format!("Array.from({{length: {}}}, (_, i) => i)", args[0]),
            ("range", 2) => format!(
                "Array.from({{length: {} - {}}}, (_, i) => i + {})",
                args[1], args[0], args[0]
            ),
            ("range", 3) => format!(
                "Array.from({{length: Math.ceil(({} - {}) / {})}}, (_, i) => {} + i * {})",
                args[1], args[0], args[2], args[0], args[2]
            ),
            ("enumerate", _) => format!("{}.map((item, index) => [index, item])", args[0]),
            _ => format!("{}({})", name, args.join(", ")),
        }
    }

    /// An in-expression lambda consumes the remaining tokens: identifiers
    /// before the first `:` form the parameter list, everything after is the
    /// body.
    fn emit_inline_lambda(&self, mut out: String, rest: &[Token]) -> String {
        let colon = rest
            .iter()
            .position(|t| t.matches(TokenKind::Punctuation, ":"));
        let (head, body) = match colon {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (&rest[..0], rest),
        };
        let params: Vec<&str> = head
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.value.as_str())
            .collect();
        let body_text = self.emit_tokens(body);
        self.push_boundary(&mut out);
        out.push('(');
        out.push_str(&params.join(", "));
        out.push_str(") => ");
        out.push_str(&body_text);
        out.trim().to_string()
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `op` assigns, resetting the floor-division wrap point.
fn is_assignment_operator(op: &str) -> bool {
    matches!(
        op,
        "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "**=" | "//=" | "&=" | "|=" | "^=" | "<<=" | ">>="
    )
}

/// Capture the balanced bracket run opened at `open`. Returns the tokens
/// strictly inside the brackets and the index just past the close.
fn capture_call<'t>(tokens: &'t [Token], open: usize) -> (&'t [Token], usize) {
    let mut depth = 0usize;
    let mut i = open;
    while i < tokens.len() {
        let token = &tokens[i];
        if token.kind == TokenKind::Bracket {
            match token.value.as_str() {
                "(" | "[" | "{" => depth += 1,
                _ => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return (&tokens[open + 1..i], i + 1);
                    }
                }
            }
        }
        i += 1;
    }
    (&tokens[(open + 1).min(tokens.len())..], tokens.len())
}

/// Split an argument run at top-level commas.
fn split_arguments(tokens: &[Token]) -> Vec<&[Token]> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Bracket => match token.value.as_str() {
                "(" | "[" | "{" => depth += 1,
                _ => depth = depth.saturating_sub(1),
            },
            TokenKind::Punctuation if token.value == "," && depth == 0 => {
                args.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < tokens.len() {
        args.push(&tokens[start..]);
    }
    args
}
