/*!
Recursive‑descent parser for Rox.

### Logging Policy

| Location                     | Level  | Purpose                                   |
|------------------------------|--------|-------------------------------------------|
| `Parser::new`, `parse`       | `info` | Lifecycle milestones.                     |
| `declaration`, `statement`   | `debug`| High‑level descent into grammar branches. |
| Error paths (`consume`, etc.)| `debug`| Context before returning structured error.|

### Error handling

Errors that make the current declaration meaningless abort it: the parser
records the error, discards tokens up to the next statement boundary
(`synchronize`) and carries on, so one pass reports every independent
problem. Errors that leave a usable tree (a bad assignment target, too many
arguments) are recorded without unwinding.

--------------------------------------------------------------------------------
Grammar (EBNF, lowest precedence first)
--------------------------------------------------------------------------------

```text
program        → declaration* EOF ;
declaration    → classDecl | funDecl | varDecl | statement ;
classDecl      → "class" IDENT ( "extends" IDENT ( "," IDENT )* )?
                 "{" member* "}" ;
member         → "class"? IDENT ( "(" parameters? ")" )? block ;
funDecl        → "fun" IDENT "(" parameters? ")" block ;
varDecl        → "var" IDENT ( "=" expression )? ";" ;
statement      → exprStmt | printStmt | ifStmt | whileStmt | forStmt
               | breakStmt | continueStmt | returnStmt | block ;
forStmt        → "for" "(" ( varDecl | exprStmt | ";" )
                 expression? ";" expression? ")" statement ;

expression     → comma ;
comma          → assignment ( "," assignment )* ;
assignment     → ( call "." )? IDENT "=" assignment | ternary ;
ternary        → logic_or ( "?" ternary ":" ternary )? ;
logic_or       → logic_and ( "or" logic_and )* ;
logic_and      → equality ( "and" equality )* ;
equality       → bitwise ( ( "!=" | "==" ) bitwise )* ;
bitwise        → comparison ( ( "&" | "|" | "^" ) comparison )* ;
comparison     → bitshift ( ( ">" | ">=" | "<" | "<=" ) bitshift )* ;
bitshift       → term ( ( "<<" | ">>" ) term )* ;
term           → factor ( ( "-" | "+" ) factor )* ;
factor         → unary ( ( "/" | "*" | "%" ) unary )* ;
unary          → ( "!" | "-" | "~" ) unary | exponent ;
exponent       → prefix ( "**" unary )? ;
prefix         → ( "++" | "--" ) index | index ;
index          → postfix ( "[" expression ( ":" expression )? "]" )* ;
postfix        → call ( "++" | "--" )? ;
call           → primary ( "(" arguments? ")" | "." IDENT )* ;
arguments      → assignment ( "," assignment )* ;
primary        → NUMBER | STRING | "true" | "false" | "nil" | "this"
               | "super" "." IDENT | IDENT | "print"
               | "(" expression ")" | "[" elements? "]" | "{" entries? "}"
               | "fun" "(" parameters? ")" block ;
```
*/

use std::rc::Rc;

use crate::ast::{ClassDecl, Expr, ExprId, FunctionDecl, FunctionKind, LiteralValue, Stmt};
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};

use log::{debug, info};

/// Upper bound on parameters and call arguments.
const MAX_ARITY: usize = 255;

/// Top‑level parser over a scanned token list (which must end in `EOF`).
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    next_id: usize,
    errors: Vec<LoxError>,
}

impl Parser {
    /// Construct a new parser whose expression ids start at zero.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_id_base(tokens, 0)
    }

    /// Construct a parser whose expression ids start at `base`, so trees from
    /// successive inputs of one session never share an id.
    pub fn with_id_base(mut tokens: Vec<Token>, base: usize) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        if !matches!(tokens.last(), Some(t) if t.token_type == TokenType::EOF) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenType::EOF, "", line));
        }

        Self {
            tokens,
            current: 0,
            next_id: base,
            errors: Vec::new(),
        }
    }

    /// First expression id not handed out yet.
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program. Returns the statement list, or every parse
    /// error found if there was at least one.
    pub fn parse(&mut self) -> std::result::Result<Vec<Stmt>, Vec<LoxError>> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.finish(statements)
    }

    /// Parse the input as a sequence of bare expressions (interactive
    /// evaluate‑and‑print mode).
    pub fn parse_expressions(&mut self) -> std::result::Result<Vec<Expr>, Vec<LoxError>> {
        info!("Beginning expression parse phase");

        let mut expressions: Vec<Expr> = Vec::new();

        while !self.is_at_end() {
            match self.expression() {
                Ok(expr) => {
                    expressions.push(expr);
                    // Tolerate a separator between entries.
                    self.matches(TokenType::SEMICOLON);
                }
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }

        self.finish(expressions)
    }

    fn finish<T>(&mut self, items: Vec<T>) -> std::result::Result<Vec<T>, Vec<LoxError>> {
        if self.errors.is_empty() {
            info!("Parse finished with {} item(s)", items.len());

            Ok(items)
        } else {
            info!("Parse finished with {} error(s)", self.errors.len());

            Err(std::mem::take(&mut self.errors))
        }
    }

    // ──────────────────────── declaration rules ───────────────────

    /// Parse one declaration; on error record it, resynchronize and yield
    /// nothing.
    fn declaration(&mut self) -> Option<Stmt> {
        debug!("Entering declaration");

        let result = if self.matches(TokenType::CLASS) {
            self.class_declaration()
        } else if self.check(TokenType::FUN) && self.check_next(TokenType::IDENTIFIER) {
            self.advance();
            self.function(FunctionKind::Function, false)
                .map(|decl| Stmt::Function(Rc::new(decl)))
        } else if self.matches(TokenType::VAR) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(e) => {
                debug!("Parse error, synchronizing: {}", e);
                self.errors.push(e);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self.consume(TokenType::IDENTIFIER, "Expect class name.")?;

        let mut ancestors: Vec<Expr> = Vec::new();

        if self.matches(TokenType::EXTENDS) {
            loop {
                if ancestors.len() >= MAX_ARITY {
                    self.report(self.peek().clone(), "Can't have more than 255 superclasses.");
                }

                let ancestor = self.consume(TokenType::IDENTIFIER, "Expect superclass name.")?;
                let id = self.fresh_id();

                ancestors.push(Expr::Variable { id, name: ancestor });

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::LEFT_BRACE, "Expect '{' before class body.")?;

        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            let is_static = self.matches(TokenType::CLASS);

            methods.push(Rc::new(self.function(FunctionKind::Method, is_static)?));
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after class body.")?;

        Ok(Stmt::Class(ClassDecl {
            name,
            ancestors,
            methods,
        }))
    }

    /// `IDENT ( "(" parameters? ")" )? block`. The parameter list may only be
    /// omitted for class members, which makes them getters.
    fn function(&mut self, kind: FunctionKind, is_static: bool) -> Result<FunctionDecl> {
        let noun = match kind {
            FunctionKind::Method => "method",
            _ => "function",
        };

        let name: Token = self.consume(TokenType::IDENTIFIER, &format!("Expect {} name.", noun))?;

        let mut is_getter = false;
        let mut params: Vec<Token> = Vec::new();

        if kind == FunctionKind::Method && self.check(TokenType::LEFT_BRACE) {
            is_getter = true;
        } else {
            self.consume(
                TokenType::LEFT_PAREN,
                &format!("Expect '(' after {} name.", noun),
            )?;
            params = self.parameters()?;
        }

        self.consume(
            TokenType::LEFT_BRACE,
            &format!("Expect '{{' before {} body.", noun),
        )?;
        let body: Vec<Stmt> = self.block()?;

        Ok(FunctionDecl {
            name,
            params,
            body,
            kind,
            is_static,
            is_getter,
        })
    }

    /// Parameter names up to and including the closing `)`.
    fn parameters(&mut self) -> Result<Vec<Token>> {
        let mut params: Vec<Token> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARITY {
                    self.report(self.peek().clone(), "Can't have more than 255 parameters.");
                }

                params.push(self.consume(TokenType::IDENTIFIER, "Expect parameter name.")?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after parameters.")?;

        Ok(params)
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self.consume(TokenType::IDENTIFIER, "Expect variable name.")?;

        let initializer: Option<Expr> = if self.matches(TokenType::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expect ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Result<Stmt> {
        debug!("Entering statement at {:?}", self.peek().token_type);

        if self.matches(TokenType::FOR) {
            self.for_statement()
        } else if self.matches(TokenType::IF) {
            self.if_statement()
        } else if self.matches(TokenType::WHILE) {
            self.while_statement()
        } else if self.matches(TokenType::RETURN) {
            self.return_statement()
        } else if self.matches(TokenType::BREAK) {
            let keyword = self.previous().clone();
            self.consume(TokenType::SEMICOLON, "Expect ';' after 'break'.")?;
            Ok(Stmt::Break(keyword))
        } else if self.matches(TokenType::CONTINUE) {
            let keyword = self.previous().clone();
            self.consume(TokenType::SEMICOLON, "Expect ';' after 'continue'.")?;
            Ok(Stmt::Continue(keyword))
        } else if self.matches(TokenType::LEFT_BRACE) {
            Ok(Stmt::Block(self.block()?))
        } else if self.matches(TokenType::PRINT) {
            self.print_statement()
        } else {
            self.expression_statement()
        }
    }

    fn for_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(TokenType::SEMICOLON) {
            None
        } else if self.matches(TokenType::VAR) {
            Some(Box::new(self.var_declaration()?))
        } else {
            Some(Box::new(self.expression_statement()?))
        };

        let condition = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::SEMICOLON, "Expect ';' after loop condition.")?;

        let increment = if !self.check(TokenType::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after for clauses.")?;

        let body = Box::new(self.statement()?);

        Ok(Stmt::For {
            initializer,
            condition,
            increment,
            body,
        })
    }

    fn print_statement(&mut self) -> Result<Stmt> {
        let value: Expr = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expect ';' after value.")?;

        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr: Expr = self.expression()?;
        self.consume(TokenType::SEMICOLON, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'if'.")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after if condition.")?;

        let then_branch: Box<Stmt> = Box::new(self.statement()?);
        let else_branch: Option<Box<Stmt>> = if self.matches(TokenType::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'while'.")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after condition.")?;
        let body: Box<Stmt> = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn return_statement(&mut self) -> Result<Stmt> {
        let keyword: Token = self.previous().clone();
        let value: Option<Expr> = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    /// Declarations up to the closing `}` (the opening brace is already consumed).
    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after block.")?;
        Ok(statements)
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> Result<Expr> {
        self.comma()
    }

    fn comma(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.assignment()?;

        while self.matches(TokenType::COMMA) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.assignment()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn assignment(&mut self) -> Result<Expr> {
        let expr: Expr = self.ternary()?;

        if self.matches(TokenType::EQUAL) {
            let equals: Token = self.previous().clone();
            let value: Expr = self.assignment()?;

            return match expr {
                Expr::Variable { name, .. } => Ok(Expr::Assign {
                    id: self.fresh_id(),
                    name,
                    value: Box::new(value),
                }),

                Expr::Get { object, name } => Ok(Expr::Set {
                    object,
                    name,
                    value: Box::new(value),
                }),

                other => {
                    self.report(equals, "Invalid assignment target.");
                    Ok(other)
                }
            };
        }

        Ok(expr)
    }

    fn ternary(&mut self) -> Result<Expr> {
        let expr: Expr = self.logical_or()?;

        if self.matches(TokenType::QUESTION_MARK) {
            let operator: Token = self.previous().clone();
            let then_branch: Expr = self.ternary()?;
            self.consume(TokenType::COLON, "Expect ':' in ternary expression.")?;
            let else_branch: Expr = self.ternary()?;

            return Ok(Expr::Ternary {
                condition: Box::new(expr),
                operator,
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }

        Ok(expr)
    }

    /// Left‑associative binary level: `next ( op next )*`.
    fn binary_level(
        &mut self,
        operators: &[TokenType],
        next: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut expr: Expr = next(self)?;

        while self.matches_any(operators) {
            let operator: Token = self.previous().clone();
            let right: Expr = next(self)?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn logical_or(&mut self) -> Result<Expr> {
        self.binary_level(&[TokenType::OR], Self::logical_and)
    }

    fn logical_and(&mut self) -> Result<Expr> {
        self.binary_level(&[TokenType::AND], Self::equality)
    }

    fn equality(&mut self) -> Result<Expr> {
        self.binary_level(
            &[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL],
            Self::bitwise,
        )
    }

    fn bitwise(&mut self) -> Result<Expr> {
        self.binary_level(
            &[
                TokenType::BITWISE_AND,
                TokenType::BITWISE_OR,
                TokenType::BITWISE_XOR,
            ],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> Result<Expr> {
        self.binary_level(
            &[
                TokenType::GREATER,
                TokenType::GREATER_EQUAL,
                TokenType::LESS,
                TokenType::LESS_EQUAL,
            ],
            Self::bitshift,
        )
    }

    fn bitshift(&mut self) -> Result<Expr> {
        self.binary_level(
            &[TokenType::BITSHIFT_LEFT, TokenType::BITSHIFT_RIGHT],
            Self::term,
        )
    }

    fn term(&mut self) -> Result<Expr> {
        self.binary_level(&[TokenType::MINUS, TokenType::PLUS], Self::factor)
    }

    fn factor(&mut self) -> Result<Expr> {
        self.binary_level(
            &[TokenType::STAR, TokenType::SLASH, TokenType::MODULO],
            Self::unary,
        )
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.matches_any(&[TokenType::BANG, TokenType::MINUS, TokenType::BITWISE_NOT]) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.exponent()
    }

    /// The right operand re‑enters `unary`, which makes `**` right‑associative.
    fn exponent(&mut self) -> Result<Expr> {
        let expr: Expr = self.prefix()?;

        if self.matches(TokenType::STAR_STAR) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;

            return Ok(Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn prefix(&mut self) -> Result<Expr> {
        if self.matches_any(&[TokenType::PLUS_PLUS, TokenType::MINUS_MINUS]) {
            let operator: Token = self.previous().clone();
            let target: Expr = self.index()?;

            return match target {
                Expr::Variable { name, .. } => Ok(Expr::Prefix {
                    id: self.fresh_id(),
                    operator,
                    name,
                }),
                other => {
                    self.report(operator, "Invalid prefix expression.");
                    Ok(other)
                }
            };
        }

        self.index()
    }

    fn index(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.postfix()?;

        while self.matches(TokenType::LEFT_BRACK) {
            let bracket: Token = self.previous().clone();
            let start: Expr = self.expression()?;
            let end: Option<Box<Expr>> = if self.matches(TokenType::COLON) {
                Some(Box::new(self.expression()?))
            } else {
                None
            };
            self.consume(TokenType::RIGHT_BRACK, "Expect ']' after index.")?;

            expr = Expr::Index {
                bracket,
                object: Box::new(expr),
                start: Box::new(start),
                end,
            };
        }

        Ok(expr)
    }

    fn postfix(&mut self) -> Result<Expr> {
        let expr: Expr = self.call()?;

        if self.matches_any(&[TokenType::PLUS_PLUS, TokenType::MINUS_MINUS]) {
            let operator: Token = self.previous().clone();

            return match expr {
                Expr::Variable { name, .. } => Ok(Expr::Postfix {
                    id: self.fresh_id(),
                    name,
                    operator,
                }),
                other => {
                    self.report(operator, "Invalid postfix expression.");
                    Ok(other)
                }
            };
        }

        Ok(expr)
    }

    fn call(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.primary()?;

        loop {
            if self.matches(TokenType::LEFT_PAREN) {
                expr = self.finish_call(expr)?;
            } else if self.matches(TokenType::DOT) {
                let name: Token =
                    self.consume(TokenType::IDENTIFIER, "Expect property name after '.'.")?;

                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Arguments are parsed at assignment precedence so `,` separates them
    /// instead of forming a comma expression.
    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut arguments: Vec<Expr> = Vec::new();
        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    self.report(self.peek().clone(), "Can't have more than 255 arguments.");
                }

                arguments.push(self.assignment()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        let paren: Token = self.consume(TokenType::RIGHT_PAREN, "Expect ')' after arguments.")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.matches(TokenType::FALSE) {
            return Ok(Expr::Literal(LiteralValue::False));
        }
        if self.matches(TokenType::TRUE) {
            return Ok(Expr::Literal(LiteralValue::True));
        }
        if self.matches(TokenType::NIL) {
            return Ok(Expr::Literal(LiteralValue::Nil));
        }

        if let TokenType::NUMBER(n) = self.peek().token_type {
            self.advance();
            return Ok(Expr::Literal(LiteralValue::Number(n)));
        }

        if let TokenType::STRING(ref s) = self.peek().token_type {
            let s = s.clone();
            self.advance();
            return Ok(Expr::Literal(LiteralValue::Str(s)));
        }

        // `print` outside statement position names the native function.
        if self.matches_any(&[TokenType::IDENTIFIER, TokenType::PRINT]) {
            let name = self.previous().clone();
            return Ok(Expr::Variable {
                id: self.fresh_id(),
                name,
            });
        }

        if self.matches(TokenType::THIS) {
            let keyword = self.previous().clone();
            return Ok(Expr::This {
                id: self.fresh_id(),
                keyword,
            });
        }

        if self.matches(TokenType::SUPER) {
            let keyword = self.previous().clone();
            self.consume(TokenType::DOT, "Expect '.' after 'super'.")?;
            let method = self.consume(TokenType::IDENTIFIER, "Expect superclass method name.")?;
            return Ok(Expr::Super {
                id: self.fresh_id(),
                keyword,
                method,
            });
        }

        if self.matches(TokenType::FUN) {
            return self.lambda();
        }

        if self.matches(TokenType::LEFT_PAREN) {
            let expr: Expr = self.expression()?;

            self.consume(TokenType::RIGHT_PAREN, "Expect ')' after expression.")?;

            return Ok(Expr::Grouping(Box::new(expr)));
        }

        if self.matches(TokenType::LEFT_BRACK) {
            return self.list();
        }

        if self.matches(TokenType::LEFT_BRACE) {
            return self.map();
        }

        // Error production: a binary operator with its left operand missing.
        if self.matches_any(&[
            TokenType::EQUAL_EQUAL,
            TokenType::BANG_EQUAL,
            TokenType::GREATER,
            TokenType::GREATER_EQUAL,
            TokenType::LESS,
            TokenType::LESS_EQUAL,
            TokenType::PLUS,
            TokenType::SLASH,
            TokenType::STAR,
            TokenType::MODULO,
        ]) {
            let operator: Token = self.previous().clone();
            // Parse and discard the right operand so recovery starts after it.
            self.assignment()?;

            return Err(LoxError::parse(&operator, "Missing left-hand operand."));
        }

        debug!("No expression at {:?}", self.peek().token_type);

        Err(LoxError::parse(self.peek(), "Expect expression."))
    }

    fn lambda(&mut self) -> Result<Expr> {
        let keyword: Token = self.previous().clone();

        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'fun'.")?;
        let params: Vec<Token> = self.parameters()?;
        self.consume(TokenType::LEFT_BRACE, "Expect '{' before function body.")?;
        let body: Vec<Stmt> = self.block()?;

        Ok(Expr::Lambda(Rc::new(FunctionDecl {
            name: keyword,
            params,
            body,
            kind: FunctionKind::Lambda,
            is_static: false,
            is_getter: false,
        })))
    }

    fn list(&mut self) -> Result<Expr> {
        let bracket: Token = self.previous().clone();
        let mut elements: Vec<Expr> = Vec::new();

        if !self.check(TokenType::RIGHT_BRACK) {
            loop {
                elements.push(self.assignment()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_BRACK, "Expect ']' after list elements.")?;

        Ok(Expr::List { bracket, elements })
    }

    fn map(&mut self) -> Result<Expr> {
        let brace: Token = self.previous().clone();
        let mut entries: Vec<(Expr, Expr)> = Vec::new();

        if !self.check(TokenType::RIGHT_BRACE) {
            loop {
                let key: Expr = self.assignment()?;
                self.consume(TokenType::COLON, "Expect ':' after map key.")?;
                let value: Expr = self.assignment()?;

                entries.push((key, value));

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after map entries.")?;

        Ok(Expr::Map { brace, entries })
    }

    // ────────────────────── utility helpers ───────────────────────

    fn fresh_id(&mut self) -> ExprId {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Record an error that does not invalidate the tree being built.
    fn report(&mut self, token: Token, message: &str) {
        debug!("Reporting non-fatal parse error at line {}", token.line);

        self.errors.push(LoxError::parse(&token, message));
    }

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    fn matches_any(&mut self, ttypes: &[TokenType]) -> bool {
        for ttype in ttypes {
            if self.check(ttype.clone()) {
                self.advance();
                return true;
            }
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> Result<Token> {
        if self.check(ttype) {
            return Ok(self.advance().clone());
        }

        debug!("consume failed: {}", message);

        Err(LoxError::parse(self.peek(), message))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    fn check_next(&self, ttype: TokenType) -> bool {
        match self.tokens.get(self.current + 1) {
            Some(token) => token.token_type == ttype,
            None => false,
        }
    }

    #[inline(always)]
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Discards tokens until it thinks it is at a statement boundary.
    fn synchronize(&mut self) {
        self.advance(); // skip the token that caused the error

        while !self.is_at_end() {
            if matches!(self.previous().token_type, TokenType::SEMICOLON) {
                return;
            }

            match self.peek().token_type {
                TokenType::CLASS
                | TokenType::FUN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::PRINT
                | TokenType::RETURN
                | TokenType::BREAK
                | TokenType::CONTINUE => return,
                _ => {}
            }

            self.advance();
        }
    }
}
