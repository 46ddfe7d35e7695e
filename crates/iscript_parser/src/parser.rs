//! The IndentScript parser implementation.
//!
//! A recursive descent parser at the statement level. Expression boundaries
//! are detected lexically: the parser collects an expression's tokens into
//! an opaque [`Expression`] leaf, tracking bracket depth, and never builds
//! an expression grammar.
//!
//! Parsing is fail-fast: the first unmet expectation produces a
//! [`ParseFailure`] and terminates the parse. There is no error recovery.

use bumpalo::Bump;
use iscript_ast::node::*;
use iscript_ast::token::{Token, TokenKind};
use iscript_diagnostics::ParseFailure;

/// Allocate a Vec into the arena as a slice.
fn alloc_vec_in<T>(arena: &Bump, vec: Vec<T>) -> &[T] {
    if vec.is_empty() {
        return &[];
    }
    arena.alloc_slice_fill_iter(vec)
}

/// The parser produces a [`Program`] tree from a token stream.
pub struct Parser<'a> {
    arena: &'a Bump,
    tokens: Vec<Token>,
    pos: usize,
    /// Fallback token when the cursor runs past the stream.
    eof: Token,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, tokens: Vec<Token>) -> Self {
        let eof = tokens
            .last()
            .filter(|t| t.kind == TokenKind::Eof)
            .cloned()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, "", 1, 1));
        Self {
            arena,
            tokens,
            pos: 0,
            eof,
        }
    }

    /// Parse the whole token stream into a program.
    pub fn parse_program(mut self) -> Result<Program<'a>, ParseFailure> {
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            // Stray block tokens, e.g. from a bracketed line continuation,
            // are skipped at top level.
            if self.check(TokenKind::Indent) || self.check(TokenKind::Dedent) {
                self.advance();
                continue;
            }
            if self.check(TokenKind::Eof) {
                break;
            }
            body.push(self.parse_statement()?);
        }
        Ok(Program {
            body: alloc_vec_in(self.arena, body),
        })
    }

    // ========================================================================
    // Token management
    // ========================================================================

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&self.eof)
    }

    /// Consume and return the current token. The cursor never moves past EOF.
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    #[inline]
    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    #[inline]
    fn check_keyword(&self, value: &str) -> bool {
        self.current().matches(TokenKind::Keyword, value)
    }

    #[inline]
    fn check_punct(&self, value: &str) -> bool {
        self.current().matches(TokenKind::Punctuation, value)
    }

    #[inline]
    fn check_bracket(&self, value: &str) -> bool {
        self.current().matches(TokenKind::Bracket, value)
    }

    #[inline]
    fn check_op(&self, value: &str) -> bool {
        self.current().matches(TokenKind::Operator, value)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, value: &str) -> bool {
        if self.check_keyword(value) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_punct(&mut self, value: &str) -> bool {
        if self.check_punct(value) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_bracket(&mut self, value: &str) -> bool {
        if self.check_bracket(value) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_op(&mut self, value: &str) -> bool {
        if self.check_op(value) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, value: &str) -> Result<Token, ParseFailure> {
        if self.check_keyword(value) {
            Ok(self.advance())
        } else {
            Err(ParseFailure::new(
                TokenKind::Keyword,
                Some(value),
                self.current(),
            ))
        }
    }

    fn expect_punct(&mut self, value: &str) -> Result<Token, ParseFailure> {
        if self.check_punct(value) {
            Ok(self.advance())
        } else {
            Err(ParseFailure::new(
                TokenKind::Punctuation,
                Some(value),
                self.current(),
            ))
        }
    }

    fn expect_bracket(&mut self, value: &str) -> Result<Token, ParseFailure> {
        if self.check_bracket(value) {
            Ok(self.advance())
        } else {
            Err(ParseFailure::new(
                TokenKind::Bracket,
                Some(value),
                self.current(),
            ))
        }
    }

    /// Consume an identifier-like token and return its text. Reserved words
    /// are accepted: method and variable names in the source routinely
    /// collide with the reserved set (`get`, `set`, `range`, ...).
    fn expect_name(&mut self) -> Result<String, ParseFailure> {
        match self.current().kind {
            TokenKind::Identifier | TokenKind::Keyword => Ok(self.advance().value),
            _ => Err(ParseFailure::new(
                TokenKind::Identifier,
                None,
                self.current(),
            )),
        }
    }

    #[inline]
    fn check_name(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Identifier | TokenKind::Keyword
        )
    }

    fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    /// Whether an expression can start at the cursor (used for optional
    /// values: `return`, `yield`).
    fn expression_ahead(&self) -> bool {
        !matches!(
            self.current().kind,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof
        ) && !self.check_punct(":")
    }

    // ========================================================================
    // Statement parsing
    // ========================================================================

    fn parse_statement(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.skip_newlines();
        if self.check(TokenKind::Keyword) {
            let keyword = self.current().value.clone();
            match keyword.as_str() {
                "def" => {
                    let func = self.parse_function_declaration(false, None)?;
                    return Ok(Statement::FunctionDeclaration(func));
                }
                "async" => {
                    self.advance();
                    let func = self.parse_function_declaration(true, None)?;
                    return Ok(Statement::FunctionDeclaration(func));
                }
                "class" => return self.parse_class(),
                "for" => return self.parse_for(),
                "if" => {
                    let node = self.parse_if_statement()?;
                    return Ok(Statement::IfStatement(node));
                }
                "while" => return self.parse_while(),
                "return" => return self.parse_return(),
                "import" => return self.parse_import(),
                "from" => return self.parse_from_import(),
                "try" => return self.parse_try(),
                "raise" => return self.parse_raise(),
                "assert" => return self.parse_assert(),
                "with" => return self.parse_with(),
                "pass" => {
                    self.advance();
                    return Ok(Statement::PassStatement);
                }
                "break" => {
                    self.advance();
                    return Ok(Statement::BreakStatement);
                }
                "continue" => {
                    self.advance();
                    return Ok(Statement::ContinueStatement);
                }
                "lambda" => return self.parse_lambda(),
                "await" => return self.parse_await(),
                "del" => return self.parse_delete(),
                "global" => return self.parse_global(),
                "yield" => return self.parse_yield(),
                "print" => return self.parse_print(),
                _ => {}
            }
        }
        self.parse_expression_statement()
    }

    fn parse_expression_statement(&mut self) -> Result<Statement<'a>, ParseFailure> {
        let expression = self.parse_expression();
        if expression.tokens.is_empty() {
            return Err(ParseFailure::new(
                TokenKind::Identifier,
                None,
                self.current(),
            ));
        }
        Ok(Statement::ExpressionStatement(ExpressionStatement {
            expression,
        }))
    }

    /// `def name(params) [-> type] [:] block`, with `def` still unconsumed.
    fn parse_function_declaration(
        &mut self,
        is_async: bool,
        decorator: Option<String>,
    ) -> Result<FunctionDeclaration<'a>, ParseFailure> {
        self.expect_keyword("def")?;
        let name = self.expect_name()?;
        self.expect_bracket("(")?;
        let params = self.parse_parameters()?;
        self.expect_bracket(")")?;
        let return_type = self.parse_return_type()?;
        let body = self.parse_block()?;
        Ok(FunctionDeclaration {
            name,
            params,
            return_type,
            body,
            is_async,
            decorator,
        })
    }

    /// The return-type arrow reaches the parser as the two operator tokens
    /// `-` `>`; the operator table has no 2-character `->`.
    fn parse_return_type(&mut self) -> Result<Option<String>, ParseFailure> {
        if self.check_op("-") && self.peek(1).matches(TokenKind::Operator, ">") {
            self.advance();
            self.advance();
            let name = self.expect_name()?;
            return Ok(Some(name));
        }
        Ok(None)
    }

    fn parse_parameters(&mut self) -> Result<NodeList<'a, Param<'a>>, ParseFailure> {
        let mut params = Vec::new();
        while !self.check_bracket(")") && !self.check(TokenKind::Eof) {
            let spread = if self.eat_op("**") {
                Some(Spread::Dict)
            } else if self.eat_op("*") {
                Some(Spread::Array)
            } else {
                None
            };
            let name = self.expect_name()?;
            let default = if self.eat_op("=") {
                Some(self.parse_expression())
            } else {
                None
            };
            params.push(Param {
                name,
                default,
                spread,
            });
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(alloc_vec_in(self.arena, params))
    }

    /// `class Name [(Super)] [:] block`, with the block contents split into
    /// methods (optionally `@decorator`-prefixed `def`s) and properties.
    fn parse_class(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // class
        let name = self.expect_name()?;
        let super_class = if self.eat_bracket("(") {
            let superclass = self.expect_name()?;
            self.expect_bracket(")")?;
            Some(superclass)
        } else {
            None
        };
        self.eat_punct(":");
        self.skip_newlines();
        let mut methods = Vec::new();
        let mut properties = Vec::new();
        if self.eat(TokenKind::Indent) {
            loop {
                self.skip_newlines();
                if self.check(TokenKind::Eof) || self.eat(TokenKind::Dedent) {
                    break;
                }
                self.parse_class_member(&mut methods, &mut properties)?;
            }
        } else {
            self.parse_class_member(&mut methods, &mut properties)?;
        }
        Ok(Statement::ClassDeclaration(ClassDeclaration {
            name,
            super_class,
            methods: alloc_vec_in(self.arena, methods),
            properties: alloc_vec_in(self.arena, properties),
        }))
    }

    fn parse_class_member(
        &mut self,
        methods: &mut Vec<FunctionDeclaration<'a>>,
        properties: &mut Vec<Statement<'a>>,
    ) -> Result<(), ParseFailure> {
        if self.check_punct("@") {
            self.advance();
            let decorator = self.expect_name()?;
            self.skip_newlines();
            let is_async = self.eat_keyword("async");
            methods.push(self.parse_function_declaration(is_async, Some(decorator))?);
            return Ok(());
        }
        if self.check_keyword("def") {
            methods.push(self.parse_function_declaration(false, None)?);
            return Ok(());
        }
        if self.check_keyword("async") && self.peek(1).matches(TokenKind::Keyword, "def") {
            self.advance();
            methods.push(self.parse_function_declaration(true, None)?);
            return Ok(());
        }
        properties.push(self.parse_statement()?);
        Ok(())
    }

    /// `for a[, b, ...] in iterable [:] block`
    fn parse_for(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // for
        let mut variables = vec![self.expect_name()?];
        while self.eat_punct(",") {
            variables.push(self.expect_name()?);
        }
        self.expect_keyword("in")?;
        let iterable = self.parse_expression();
        let body = self.parse_block()?;
        Ok(Statement::ForInLoop(ForInLoop {
            variables: alloc_vec_in(self.arena, variables),
            iterable,
            body,
        }))
    }

    /// `if`/`elif` with the keyword still unconsumed. An `elif` at the same
    /// level becomes a nested IfStatement in the alternate, preserving the
    /// chain shape.
    fn parse_if_statement(&mut self) -> Result<IfStatement<'a>, ParseFailure> {
        self.advance(); // if / elif
        let condition = self.parse_expression();
        let consequent = self.parse_block()?;
        let alternate = self.parse_else_branch()?;
        Ok(IfStatement {
            condition,
            consequent,
            alternate,
        })
    }

    fn parse_else_branch(&mut self) -> Result<Option<ElseBranch<'a>>, ParseFailure> {
        let saved = self.pos;
        self.skip_newlines();
        if self.check_keyword("elif") {
            let nested = self.parse_if_statement()?;
            let nested: &IfStatement<'a> = self.arena.alloc(nested);
            return Ok(Some(ElseBranch::ElseIf(nested)));
        }
        if self.check_keyword("else") {
            self.advance();
            let body = self.parse_block()?;
            return Ok(Some(ElseBranch::Block(body)));
        }
        self.pos = saved;
        Ok(None)
    }

    fn parse_while(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // while
        let condition = self.parse_expression();
        let body = self.parse_block()?;
        Ok(Statement::WhileLoop(WhileLoop { condition, body }))
    }

    fn parse_return(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // return
        let value = if self.expression_ahead() {
            Some(self.parse_expression())
        } else {
            None
        };
        Ok(Statement::ReturnStatement(ReturnStatement { value }))
    }

    /// `try: block (except [Type [as name]]: block)* [finally: block]`
    fn parse_try(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // try
        let try_block = self.parse_block()?;
        let mut handlers = Vec::new();
        loop {
            let saved = self.pos;
            self.skip_newlines();
            if !self.check_keyword("except") {
                self.pos = saved;
                break;
            }
            self.advance();
            let error_type = if self.check_name() {
                Some(self.advance().value)
            } else {
                None
            };
            let error_name = if self.eat_keyword("as") {
                Some(self.expect_name()?)
            } else {
                None
            };
            let body = self.parse_block()?;
            handlers.push(CatchHandler {
                error_type,
                error_name,
                body,
            });
        }
        let saved = self.pos;
        self.skip_newlines();
        let finally_block = if self.check_keyword("finally") {
            self.advance();
            Some(self.parse_block()?)
        } else {
            self.pos = saved;
            None
        };
        Ok(Statement::TryStatement(TryStatement {
            try_block,
            handlers: alloc_vec_in(self.arena, handlers),
            finally_block,
        }))
    }

    fn parse_raise(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // raise
        let error = self.parse_expression();
        Ok(Statement::RaiseStatement(RaiseStatement { error }))
    }

    fn parse_assert(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // assert
        let condition = self.parse_expression();
        let message = if self.eat_punct(",") {
            Some(self.parse_expression())
        } else {
            None
        };
        Ok(Statement::AssertStatement(AssertStatement {
            condition,
            message,
        }))
    }

    /// `with context [as alias] [:] block`. The context expression stops at
    /// the `as` keyword in addition to the usual terminators.
    fn parse_with(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // with
        let context = self.parse_expression_until(|t| t.matches(TokenKind::Keyword, "as"));
        let alias = if self.eat_keyword("as") {
            Some(self.expect_name()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(Statement::WithStatement(WithStatement {
            context,
            alias,
            body,
        }))
    }

    fn parse_import(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // import
        let mut modules = Vec::new();
        loop {
            let name = self.parse_module_name()?;
            let alias = if self.eat_keyword("as") {
                Some(self.expect_name()?)
            } else {
                None
            };
            modules.push(ImportEntry { name, alias });
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(Statement::ImportStatement(ImportStatement {
            modules: alloc_vec_in(self.arena, modules),
        }))
    }

    /// `from module import *` or `from module import a [as b], c, ...`
    /// The name list reads until NEWLINE/EOF; parenthesized multiline
    /// import lists are not supported.
    fn parse_from_import(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // from
        let module = self.parse_module_name()?;
        self.expect_keyword("import")?;
        let mut imports = Vec::new();
        if self.eat_op("*") {
            imports.push(ImportEntry {
                name: "*".to_string(),
                alias: None,
            });
        } else {
            loop {
                let name = self.expect_name()?;
                let alias = if self.eat_keyword("as") {
                    Some(self.expect_name()?)
                } else {
                    None
                };
                imports.push(ImportEntry { name, alias });
                if !self.eat_punct(",") {
                    break;
                }
            }
        }
        Ok(Statement::FromImportStatement(FromImportStatement {
            module,
            imports: alloc_vec_in(self.arena, imports),
        }))
    }

    /// A possibly dotted module name.
    fn parse_module_name(&mut self) -> Result<String, ParseFailure> {
        let mut name = self.expect_name()?;
        while self.check_punct(".") && self.peek(1).kind == TokenKind::Identifier {
            self.advance();
            let part = self.advance().value;
            name.push('.');
            name.push_str(&part);
        }
        Ok(name)
    }

    fn parse_delete(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // del
        let target = self.parse_expression();
        Ok(Statement::DeleteStatement(DeleteStatement { target }))
    }

    fn parse_global(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // global
        let mut variables = vec![self.expect_name()?];
        while self.eat_punct(",") {
            variables.push(self.expect_name()?);
        }
        Ok(Statement::GlobalStatement(GlobalStatement {
            variables: alloc_vec_in(self.arena, variables),
        }))
    }

    fn parse_yield(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // yield
        let value = if self.expression_ahead() {
            Some(self.parse_expression())
        } else {
            None
        };
        Ok(Statement::YieldExpression(YieldExpression { value }))
    }

    fn parse_await(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // await
        let expression = self.parse_expression();
        Ok(Statement::AwaitExpression(AwaitExpression { expression }))
    }

    /// `lambda a, b: body` in statement position. Parameters are plain
    /// identifiers; the body is a single expression after the colon.
    fn parse_lambda(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // lambda
        let mut params = Vec::new();
        while self.check(TokenKind::Identifier) {
            params.push(self.advance().value);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(":")?;
        let body = self.parse_expression();
        Ok(Statement::LambdaExpression(LambdaExpression {
            params: alloc_vec_in(self.arena, params),
            body,
        }))
    }

    /// `print(a, b, ...)` or the paren-less `print a, b` form, whose
    /// arguments read until NEWLINE/EOF/`:`.
    fn parse_print(&mut self) -> Result<Statement<'a>, ParseFailure> {
        self.advance(); // print
        let mut arguments = Vec::new();
        if self.eat_bracket("(") {
            while !self.check_bracket(")") && !self.check(TokenKind::Eof) {
                arguments.push(self.parse_expression());
                if !self.eat_punct(",") {
                    break;
                }
            }
            self.eat_bracket(")");
        } else {
            while self.expression_ahead() {
                arguments.push(self.parse_expression());
                if !self.eat_punct(",") {
                    break;
                }
            }
        }
        Ok(Statement::PrintStatement(PrintStatement {
            arguments: alloc_vec_in(self.arena, arguments),
        }))
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    /// After an optional `:` and any NEWLINEs: an INDENT opens a statement
    /// sequence running to the matching DEDENT (or EOF); otherwise a single
    /// inline statement forms a one-element block.
    fn parse_block(&mut self) -> Result<NodeList<'a, Statement<'a>>, ParseFailure> {
        self.eat_punct(":");
        self.skip_newlines();
        let mut statements = Vec::new();
        if self.eat(TokenKind::Indent) {
            loop {
                self.skip_newlines();
                if self.check(TokenKind::Eof) || self.eat(TokenKind::Dedent) {
                    break;
                }
                statements.push(self.parse_statement()?);
            }
        } else {
            statements.push(self.parse_statement()?);
        }
        Ok(alloc_vec_in(self.arena, statements))
    }

    // ========================================================================
    // Expression extraction
    // ========================================================================

    fn parse_expression(&mut self) -> Expression<'a> {
        self.parse_expression_until(|_| false)
    }

    /// Greedily collect expression tokens, tracking bracket depth over
    /// `()[]{}`. Terminates (without consuming) at depth zero on NEWLINE,
    /// INDENT, DEDENT, `:`, `,`, a closing bracket that would take the depth
    /// negative, or any token matching `stop`.
    fn parse_expression_until(&mut self, stop: impl Fn(&Token) -> bool) -> Expression<'a> {
        let mut depth: u32 = 0;
        let mut collected = Vec::new();
        loop {
            let token = self.current();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent if depth == 0 => break,
                TokenKind::Punctuation
                    if depth == 0 && (token.value == ":" || token.value == ",") =>
                {
                    break
                }
                _ => {}
            }
            if depth == 0 && stop(token) {
                break;
            }
            if token.kind == TokenKind::Bracket {
                match token.value.as_str() {
                    "(" | "[" | "{" => depth += 1,
                    _ => {
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                    }
                }
            }
            collected.push(self.advance());
        }
        Expression {
            tokens: alloc_vec_in(self.arena, collected),
        }
    }
}
