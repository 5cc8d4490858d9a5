//! Grammar-driven translation of SPL statements to assembly.
//!
//! Statements are emitted as they are parsed; expressions and conditions
//! are built as [`ast`](crate::ast) trees and folded by [`emit`](crate::emit).
//! Lines whose first token is a reserved mnemonic (and label declarations)
//! pass through to the output untouched, so assembly can be mixed into SPL
//! bodies.

use crate::ast::{BinOp, CmpOp, Cond, Expr, Index, PrintArg};
use crate::emit::{self, CompilationUnit};
use crate::error::SyntaxError;
use crate::lexer::{token_text, Keyword, Token, TokenKind};
use splvm::constants;

/// Parses the whole token stream, returning the emitted assembly lines.
pub fn parse_program(
    tokens: &[Token],
    cu: &mut CompilationUnit,
) -> Result<Vec<String>, SyntaxError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        cu,
        out: Vec::new(),
    };
    while parser.peek().is_some() {
        parser.parse_stmt()?;
    }
    Ok(parser.out)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    cu: &'a mut CompilationUnit,
    out: Vec<String>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn line(&self) -> u32 {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(0)
    }

    fn err(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, self.line())
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), SyntaxError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.err(format!("Expected {}", what)))
        }
    }

    fn expect_assign(&mut self) -> Result<(), SyntaxError> {
        if self.eat(&TokenKind::Assign) || self.eat(&TokenKind::AssignOp) {
            Ok(())
        } else {
            Err(self.err("Expected '=' or ':='"))
        }
    }

    fn expect_name(&mut self) -> Result<String, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Name(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.err("Expected an identifier")),
        }
    }

    fn expect_number(&mut self) -> Result<i64, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Number(value)) => {
                let value = *value;
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.err("Expected a number")),
        }
    }

    // Runs `f` with a fresh output buffer and returns what it emitted.
    fn capture<F>(&mut self, f: F) -> Result<Vec<String>, SyntaxError>
    where
        F: FnOnce(&mut Self) -> Result<(), SyntaxError>,
    {
        let saved = std::mem::replace(&mut self.out, Vec::new());
        let result = f(self);
        let captured = std::mem::replace(&mut self.out, saved);
        result?;
        Ok(captured)
    }

    fn parse_stmt(&mut self) -> Result<(), SyntaxError> {
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => return Ok(()),
        };
        match token.kind {
            TokenKind::Keyword(Keyword::Var) => self.parse_var(),
            TokenKind::Keyword(Keyword::Type) => self.parse_type(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::Proc) => self.parse_proc(),
            TokenKind::Keyword(Keyword::Call) => self.parse_call(),
            TokenKind::Keyword(Keyword::Print) => self.parse_print(),
            TokenKind::Keyword(Keyword::Return) => {
                self.pos += 1;
                self.out.push("VUELVE".to_string());
                Ok(())
            }
            TokenKind::Keyword(Keyword::Para) => {
                self.pos += 1;
                self.out.push("PARA".to_string());
                Ok(())
            }
            TokenKind::Keyword(Keyword::Begin) => Err(self.err("Unexpected block start")),
            TokenKind::Keyword(Keyword::End) => Err(self.err("Unexpected block end")),
            TokenKind::Label(name) => {
                self.pos += 1;
                self.out.push(format!("{}:", name));
                Ok(())
            }
            TokenKind::Mnemonic(_) | TokenKind::Directive(_) => self.passthrough_line(),
            TokenKind::Register(index) => {
                self.pos += 1;
                self.parse_register_assign(index)
            }
            TokenKind::MemRef(address) => {
                self.pos += 1;
                let line = token.line;
                self.expect_assign()?;
                let value = self.parse_expr()?;
                let mut lines = Vec::new();
                emit::mem_store(self.cu, address, &value, line, &mut lines)?;
                self.out.extend(lines);
                Ok(())
            }
            TokenKind::Name(name) => {
                self.pos += 1;
                self.parse_name_stmt(name, token.line)
            }
            _ => Err(self.err("Unexpected token")),
        }
    }

    fn parse_block(&mut self) -> Result<(), SyntaxError> {
        self.expect(
            TokenKind::Keyword(Keyword::Begin),
            "an indented block (begin)",
        )?;
        loop {
            match self.peek_kind() {
                None => return Err(self.err("Missing block end")),
                Some(TokenKind::Keyword(Keyword::End)) => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => self.parse_stmt()?,
            }
        }
    }

    fn parse_var(&mut self) -> Result<(), SyntaxError> {
        let line = self.line();
        self.pos += 1; // var
        let name = self.expect_name()?;

        if self.eat(&TokenKind::LBracket) {
            let rows = self.expect_number()?;
            self.expect(TokenKind::RBracket, "']'")?;
            let mut dims = vec![rows];
            if self.eat(&TokenKind::LBracket) {
                dims.push(self.expect_number()?);
                self.expect(TokenKind::RBracket, "']'")?;
            }
            let size: i64 = dims.iter().product();
            if dims.iter().any(|&d| d <= 0) {
                return Err(SyntaxError::new(
                    format!("Array '{}' must have positive dimensions", name),
                    line,
                ));
            }
            self.cu.declare_array(&name, dims);
            let zeros = vec!["0"; size as usize].join(" ");
            self.cu.push_data(&name, &zeros);
            return Ok(());
        }

        if self.eat(&TokenKind::Colon) {
            let type_name = self.expect_name()?;
            let size = self.cu.type_len(&type_name).ok_or_else(|| {
                SyntaxError::new(
                    format!("Unknown type '{}' for variable {}", type_name, name),
                    line,
                )
            })?;
            let zeros = vec!["0"; size].join(" ");
            self.cu.push_data(&name, &zeros);
            return Ok(());
        }

        // Scalar declaration: the register is allocated on first use.
        Ok(())
    }

    fn parse_type(&mut self) -> Result<(), SyntaxError> {
        self.pos += 1; // type
        let name = self.expect_name()?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut fields = vec![self.expect_name()?];
        while self.eat(&TokenKind::Comma) {
            fields.push(self.expect_name()?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        self.cu.declare_type(&name, fields);
        Ok(())
    }

    fn parse_if(&mut self) -> Result<(), SyntaxError> {
        let line = self.line();
        self.pos += 1; // if
        let cond = self.parse_cond()?;
        self.expect(TokenKind::Colon, "':'")?;
        let body = self.capture(|p| p.parse_block())?;

        if self.eat(&TokenKind::Keyword(Keyword::Else)) {
            self.expect(TokenKind::Colon, "':'")?;
            let else_body = self.capture(|p| p.parse_block())?;

            let true_label = self.cu.new_label("if_true");
            let else_label = self.cu.new_label("if_else");
            let end_label = self.cu.new_label("if_end");
            let mut lines = Vec::new();
            emit::generate_cond(self.cu, &cond, &true_label, &else_label, line, &mut lines)?;
            self.out.extend(lines);
            self.out.push(format!("{}:", true_label));
            self.out.extend(body);
            self.out.push(format!("SALTA {}", end_label));
            self.out.push(format!("{}:", else_label));
            self.out.extend(else_body);
            self.out.push(format!("{}:", end_label));
        } else {
            let true_label = self.cu.new_label("if_true");
            let end_label = self.cu.new_label("if_end");
            let mut lines = Vec::new();
            emit::generate_cond(self.cu, &cond, &true_label, &end_label, line, &mut lines)?;
            self.out.extend(lines);
            self.out.push(format!("{}:", true_label));
            self.out.extend(body);
            self.out.push(format!("{}:", end_label));
        }
        Ok(())
    }

    fn parse_while(&mut self) -> Result<(), SyntaxError> {
        let line = self.line();
        self.pos += 1; // while
        let cond = self.parse_cond()?;
        self.expect(TokenKind::Colon, "':'")?;

        let loop_label = self.cu.new_label("loop");
        let body_label = self.cu.new_label("body");
        let end_label = self.cu.new_label("end");

        self.out.push(format!("{}:", loop_label));
        let mut lines = Vec::new();
        emit::generate_cond(self.cu, &cond, &body_label, &end_label, line, &mut lines)?;
        self.out.extend(lines);
        self.out.push(format!("{}:", body_label));
        self.parse_block()?;
        self.out.push(format!("SALTA {}", loop_label));
        self.out.push(format!("{}:", end_label));
        Ok(())
    }

    fn parse_proc(&mut self) -> Result<(), SyntaxError> {
        self.pos += 1; // proc
        let name = self.expect_name()?;
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            params.push(self.expect_name()?);
            while self.eat(&TokenKind::Comma) {
                params.push(self.expect_name()?);
            }
            self.expect(TokenKind::RParen, "')'")?;
        }
        self.expect(TokenKind::Colon, "':'")?;

        // Parameters live in the registers the call protocol fills.
        for (index, param) in params.iter().enumerate() {
            self.cu.bind_param(param, index as u32);
        }

        self.out.push(format!("{}:", name));
        let body_start = self.out.len();
        self.parse_block()?;
        let falls_through = self.out[body_start..]
            .last()
            .map(|l| !l.trim().to_uppercase().starts_with("VUELVE"))
            .unwrap_or(true);
        if falls_through {
            self.out.push("VUELVE".to_string());
        }
        Ok(())
    }

    fn parse_call(&mut self) -> Result<(), SyntaxError> {
        let line = self.line();
        self.pos += 1; // call
        let name = self.expect_name()?;
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.eat(&TokenKind::Comma) {
                args.push(self.parse_expr()?);
            }
            self.expect(TokenKind::RParen, "')'")?;
        }
        let mut lines = Vec::new();
        for (index, arg) in args.iter().enumerate() {
            let target = self.cu.reg_start() + index as u32;
            emit::generate_expr(self.cu, arg, target, line, &mut lines)?;
        }
        lines.push(format!("LLAMA {}", name));
        self.out.extend(lines);
        Ok(())
    }

    fn parse_print(&mut self) -> Result<(), SyntaxError> {
        let line = self.line();
        self.pos += 1; // print
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            args.push(self.parse_print_arg()?);
            while self.eat(&TokenKind::Comma) {
                args.push(self.parse_print_arg()?);
            }
            self.expect(TokenKind::RParen, "')'")?;
        }
        let mut lines = Vec::new();
        emit::print(self.cu, &args, line, &mut lines)?;
        self.out.extend(lines);
        Ok(())
    }

    fn parse_print_arg(&mut self) -> Result<PrintArg, SyntaxError> {
        if let Some(TokenKind::Str(text)) = self.peek_kind() {
            let text = text.clone();
            self.pos += 1;
            return Ok(PrintArg::Str(text));
        }
        Ok(PrintArg::Expr(self.parse_expr()?))
    }

    fn parse_register_assign(&mut self, index: u32) -> Result<(), SyntaxError> {
        let line = self.line();
        self.expect_assign()?;
        if index < constants::REG_GP_START as u32 {
            return Err(SyntaxError::new(
                format!("Assignment to R{} is not allowed", index),
                line,
            ));
        }
        if index as usize >= constants::REGISTER_COUNT {
            return Err(SyntaxError::new(
                format!("Register R{} does not exist", index),
                line,
            ));
        }
        let value = self.parse_expr()?;
        let mut lines = Vec::new();
        emit::generate_expr(self.cu, &value, index, line, &mut lines)?;
        self.out.extend(lines);
        Ok(())
    }

    fn parse_name_stmt(&mut self, name: String, line: u32) -> Result<(), SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Dot) => {
                self.pos += 1;
                let field = self.expect_name()?;
                self.expect_assign()?;
                let value = self.parse_expr()?;
                let mut lines = Vec::new();
                emit::field_assign(self.cu, &name, &field, &value, line, &mut lines)?;
                self.out.extend(lines);
                Ok(())
            }
            Some(TokenKind::LBracket) => {
                let indices = self.parse_indices()?;
                self.expect_assign()?;
                let value = self.parse_expr()?;
                let mut lines = Vec::new();
                emit::array_assign(self.cu, &name, &indices, &value, line, &mut lines)?;
                self.out.extend(lines);
                Ok(())
            }
            Some(TokenKind::Assign) | Some(TokenKind::AssignOp) => {
                self.pos += 1;
                let value = self.parse_expr()?;
                let mut lines = Vec::new();
                emit::assign_var(self.cu, &name, &value, line, &mut lines)?;
                self.out.extend(lines);
                Ok(())
            }
            // Anything else is treated as a hand-written assembly line.
            _ => self.passthrough_rest(name, line),
        }
    }

    fn parse_indices(&mut self) -> Result<Vec<Index>, SyntaxError> {
        let mut indices = Vec::new();
        while self.eat(&TokenKind::LBracket) {
            let expr = self.parse_expr()?;
            self.expect(TokenKind::RBracket, "']'")?;
            indices.push(match expr {
                Expr::Num(value) => Index::Const(value),
                other => Index::Dyn(other),
            });
        }
        Ok(indices)
    }

    // ----- expressions -----

    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_term()?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_factor()?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, SyntaxError> {
        if self.eat(&TokenKind::Minus) {
            let inner = self.parse_factor()?;
            return Ok(Expr::UMinus(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| self.err("Expected an expression"))?;
        match token.kind {
            TokenKind::Number(value) => {
                self.pos += 1;
                Ok(Expr::Num(value))
            }
            TokenKind::MemRef(address) => {
                self.pos += 1;
                Ok(Expr::MemRef(address))
            }
            TokenKind::Keyword(Keyword::Input) => {
                self.pos += 1;
                self.expect(TokenKind::LParen, "'('")?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Expr::Input)
            }
            TokenKind::Keyword(Keyword::True) => {
                self.pos += 1;
                Ok(Expr::Num(1))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.pos += 1;
                Ok(Expr::Num(0))
            }
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Name(ref name) => {
                let name = name.clone();
                self.pos += 1;
                match self.peek_kind() {
                    Some(TokenKind::LBracket) => {
                        let indices = self.parse_indices()?;
                        emit::array_ref_expr(self.cu, &name, &indices, token.line)
                    }
                    Some(TokenKind::Dot) => {
                        self.pos += 1;
                        let field = self.expect_name()?;
                        let offset = self.cu.field_offset(&field).ok_or_else(|| {
                            SyntaxError::new(
                                format!("Unknown field '{}' for variable {}", field, name),
                                token.line,
                            )
                        })?;
                        Ok(Expr::MemRefLabel { name, offset })
                    }
                    _ => Ok(Expr::Name(name)),
                }
            }
            _ => Err(self.err("Expected an expression")),
        }
    }

    // ----- conditions -----

    fn parse_cond(&mut self) -> Result<Cond, SyntaxError> {
        let mut left = self.parse_cond_and()?;
        while self.eat(&TokenKind::Keyword(Keyword::Or)) || self.eat(&TokenKind::OrSym) {
            let right = self.parse_cond_and()?;
            left = Cond::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_cond_and(&mut self) -> Result<Cond, SyntaxError> {
        let mut left = self.parse_cond_not()?;
        while self.eat(&TokenKind::Keyword(Keyword::And)) || self.eat(&TokenKind::AndSym) {
            let right = self.parse_cond_not()?;
            left = Cond::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_cond_not(&mut self) -> Result<Cond, SyntaxError> {
        if self.eat(&TokenKind::Keyword(Keyword::Not)) || self.eat(&TokenKind::Bang) {
            let inner = self.parse_cond_not()?;
            return Ok(Cond::Not(Box::new(inner)));
        }
        self.parse_cmp()
    }

    fn parse_cmp(&mut self) -> Result<Cond, SyntaxError> {
        let left = self.parse_expr()?;
        let op = match self.peek_kind() {
            Some(TokenKind::Eq) => CmpOp::Eq,
            Some(TokenKind::Ne) => CmpOp::Ne,
            Some(TokenKind::Lt) => CmpOp::Lt,
            Some(TokenKind::Le) => CmpOp::Le,
            Some(TokenKind::Gt) => CmpOp::Gt,
            Some(TokenKind::Ge) => CmpOp::Ge,
            _ => return Err(self.err("Expected a comparison operator")),
        };
        self.pos += 1;
        let right = self.parse_expr()?;
        Ok(Cond::Cmp { left, op, right })
    }

    // ----- assembly passthrough -----

    fn passthrough_line(&mut self) -> Result<(), SyntaxError> {
        let first = self.advance().unwrap();
        let line = first.line;
        self.passthrough_rest(token_text(&first.kind), line)
    }

    fn passthrough_rest(&mut self, first: String, line: u32) -> Result<(), SyntaxError> {
        let mut pieces = vec![first];
        while let Some(token) = self.peek() {
            if token.line != line {
                break;
            }
            let token = self.advance().unwrap();
            // Keep negative immediates glued together for the assembler.
            if token.kind == TokenKind::Minus {
                if let Some(TokenKind::Number(value)) = self.peek_kind() {
                    let value = *value;
                    if self.peek().map(|t| t.line) == Some(line) {
                        self.pos += 1;
                        pieces.push(format!("-{}", value));
                        continue;
                    }
                }
            }
            pieces.push(token_text(&token.kind));
        }
        self.out.push(pieces.join(" "));
        Ok(())
    }
}
