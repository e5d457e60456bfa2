// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Scope analysis over the token stream.
//!
//! This pass walks the tokens with just enough statement shape to answer
//! one question: which identifier tokens are uses of which local binding.
//! No syntax tree is materialized; expressions are consumed by a loose
//! operand/operator scanner that only cares about the constructs that
//! open scopes or declare names.
//!
//! The rules are deliberately conservative. A name is a local binding
//! only when it is declared by `local`, a function parameter list, or a
//! `for` control variable. Everything else — globals, `.`/`:` fields,
//! table keys, labels and `goto` targets — is left alone, so the rename
//! pass can never touch a name whose meaning the scanner has not fully
//! resolved.
//!
//! Scoping quirks honored here:
//! - `local x = x` walks the initializer before binding `x`, so the
//!   right-hand side resolves outward (Lua evaluation order)
//! - `local function f` binds `f` before the body, so `f` can recurse
//! - a `repeat` body's locals stay visible inside the `until` condition
//! - `for` bound expressions are walked in the enclosing scope, the
//!   control variables live in the body scope
//! - a colon-method body declares an implicit, non-renameable `self`

use std::collections::{HashMap, HashSet};

use crate::error::{position, MinifyError, Result, SourceContext};
use crate::token::{Token, TokenKind};

/// Index of a scope in [`Analysis::scopes`].
pub type ScopeId = usize;
/// Index of a binding in [`Analysis::bindings`].
pub type BindingId = usize;

/// One lexical scope: the chunk, a function body, or a block.
#[derive(Debug)]
pub struct Scope {
    /// Enclosing scope, `None` for the chunk scope.
    pub parent: Option<ScopeId>,
    /// Nested scopes in source order.
    pub children: Vec<ScopeId>,
    /// Bindings declared here, in declaration order.
    pub bindings: Vec<BindingId>,
    /// Name -> innermost binding currently visible in this scope.
    names: HashMap<String, BindingId>,
}

/// A local binding and every token that refers to it.
#[derive(Debug)]
pub struct Binding {
    /// Original name.
    pub name: String,
    /// Scope the binding lives in.
    pub scope: ScopeId,
    /// Token indices of the declaration and all resolved references.
    pub sites: Vec<usize>,
    /// False for names that must keep their spelling (implicit `self`).
    pub renameable: bool,
}

/// Result of the scope walk.
#[derive(Debug)]
pub struct Analysis {
    /// Scope tree, index 0 is the chunk scope.
    pub scopes: Vec<Scope>,
    /// All local bindings.
    pub bindings: Vec<Binding>,
    /// For each token index, the binding it refers to (if any).
    pub roles: Vec<Option<BindingId>>,
    /// Names referenced but never resolved to a local: the globals.
    pub globals: HashSet<String>,
}

/// Binary operators that let the expression scanner keep consuming.
const BINARY_OPS: [&str; 21] = [
    "+", "-", "*", "/", "//", "%", "^", "..", "==", "~=", "<=", ">=", "<", ">", "and", "or", "&",
    "|", "~", "<<", ">>",
];

/// Walks `tokens` and resolves every local name use.
///
/// `source` is only used for error positions.
pub fn analyze<'src>(source: &str, tokens: &[Token<'src>]) -> Result<Analysis> {
    let mut walker = Walker {
        src: source,
        tokens,
        pos: 0,
        analysis: Analysis {
            scopes: vec![Scope {
                parent: None,
                children: Vec::new(),
                bindings: Vec::new(),
                names: HashMap::new(),
            }],
            bindings: Vec::new(),
            roles: vec![None; tokens.len()],
            globals: HashSet::new(),
        },
        current: 0,
    };

    walker.block()?;
    if !walker.cur().is_eof() {
        return Err(walker.unexpected("statement"));
    }
    Ok(walker.analysis)
}

struct Walker<'a, 'src> {
    src: &'a str,
    tokens: &'a [Token<'src>],
    pos: usize,
    analysis: Analysis,
    current: ScopeId,
}

impl<'a, 'src> Walker<'a, 'src> {
    fn cur(&self) -> &Token<'src> {
        &self.tokens[self.pos]
    }

    fn peek(&self, ahead: usize) -> &Token<'src> {
        self.tokens
            .get(self.pos + ahead)
            .unwrap_or(&self.tokens[self.tokens.len() - 1])
    }

    /// Consumes the current token and returns its index.
    fn bump(&mut self) -> usize {
        let idx = self.pos;
        if !self.cur().is_eof() {
            self.pos += 1;
        }
        idx
    }

    fn unexpected(&self, expected: &str) -> MinifyError {
        let tok = self.cur();
        if tok.is_eof() {
            return MinifyError::UnexpectedEof {
                expected: expected.to_string(),
            };
        }
        let (line, column) = position(self.src, tok.offset);
        MinifyError::UnexpectedToken {
            found: tok.text.to_string(),
            expected: expected.to_string(),
            line,
            column,
            source_context: Some(SourceContext::from_source(self.src, line, column)),
        }
    }

    fn expect(&mut self, text: &str) -> Result<usize> {
        if self.cur().is(text) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&format!("'{text}'")))
        }
    }

    /// Consumes an identifier without resolving or declaring it
    /// (fields, methods, labels, attribs).
    fn expect_name(&mut self) -> Result<usize> {
        if self.cur().kind == TokenKind::Ident {
            Ok(self.bump())
        } else {
            Err(self.unexpected("name"))
        }
    }

    fn enter_scope(&mut self) {
        let id = self.analysis.scopes.len();
        self.analysis.scopes.push(Scope {
            parent: Some(self.current),
            children: Vec::new(),
            bindings: Vec::new(),
            names: HashMap::new(),
        });
        self.analysis.scopes[self.current].children.push(id);
        self.current = id;
    }

    fn leave_scope(&mut self) {
        // The chunk scope is never left.
        self.current = self.analysis.scopes[self.current]
            .parent
            .expect("leave_scope on chunk scope");
    }

    /// Declares the name at token index `idx` in the current scope.
    fn declare(&mut self, idx: usize) -> BindingId {
        let name = self.tokens[idx].text.to_string();
        let id = self.analysis.bindings.len();
        self.analysis.bindings.push(Binding {
            name: name.clone(),
            scope: self.current,
            sites: vec![idx],
            renameable: true,
        });
        let scope = &mut self.analysis.scopes[self.current];
        scope.bindings.push(id);
        scope.names.insert(name, id);
        self.analysis.roles[idx] = Some(id);
        id
    }

    /// Declares a binding with no declaration token (implicit `self`).
    fn declare_implicit(&mut self, name: &str) {
        let id = self.analysis.bindings.len();
        self.analysis.bindings.push(Binding {
            name: name.to_string(),
            scope: self.current,
            sites: Vec::new(),
            renameable: false,
        });
        let scope = &mut self.analysis.scopes[self.current];
        scope.bindings.push(id);
        scope.names.insert(name.to_string(), id);
    }

    /// Resolves the name at token index `idx` innermost-outward; an
    /// unresolved name is recorded as a global use.
    fn resolve(&mut self, idx: usize) {
        let name = self.tokens[idx].text;
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            if let Some(&binding) = self.analysis.scopes[id].names.get(name) {
                self.analysis.bindings[binding].sites.push(idx);
                self.analysis.roles[idx] = Some(binding);
                return;
            }
            scope = self.analysis.scopes[id].parent;
        }
        self.analysis.globals.insert(name.to_string());
    }

    /// Parses statements until a block-closing keyword or end of input.
    /// The closer is left for the caller.
    fn block(&mut self) -> Result<()> {
        loop {
            let tok = self.cur();
            if tok.is_eof() {
                return Ok(());
            }
            match tok.text {
                "end" | "until" | "else" | "elseif" if tok.kind == TokenKind::Keyword => {
                    return Ok(())
                }
                ";" => {
                    self.bump();
                }
                "return" => {
                    self.bump();
                    let tok = self.cur();
                    let block_end = tok.is_eof()
                        || tok.is(";")
                        || (tok.kind == TokenKind::Keyword
                            && matches!(tok.text, "end" | "until" | "else" | "elseif"));
                    if !block_end {
                        self.explist()?;
                    }
                    if self.cur().is(";") {
                        self.bump();
                    }
                }
                _ => self.statement()?,
            }
        }
    }

    fn statement(&mut self) -> Result<()> {
        match self.cur().text {
            "break" => {
                self.bump();
            }
            "::" => {
                self.bump();
                self.expect_name()?; // labels keep their names
                self.expect("::")?;
            }
            "goto" => {
                self.bump();
                self.expect_name()?;
            }
            "do" => {
                self.bump();
                self.enter_scope();
                self.block()?;
                self.expect("end")?;
                self.leave_scope();
            }
            "while" => {
                self.bump();
                self.expression()?;
                self.expect("do")?;
                self.enter_scope();
                self.block()?;
                self.expect("end")?;
                self.leave_scope();
            }
            "repeat" => {
                self.bump();
                self.enter_scope();
                self.block()?;
                self.expect("until")?;
                // Body locals are still visible in the condition.
                self.expression()?;
                self.leave_scope();
            }
            "if" => {
                self.bump();
                self.expression()?;
                self.expect("then")?;
                self.enter_scope();
                self.block()?;
                self.leave_scope();
                while self.cur().is("elseif") {
                    self.bump();
                    self.expression()?;
                    self.expect("then")?;
                    self.enter_scope();
                    self.block()?;
                    self.leave_scope();
                }
                if self.cur().is("else") {
                    self.bump();
                    self.enter_scope();
                    self.block()?;
                    self.leave_scope();
                }
                self.expect("end")?;
            }
            "for" => self.for_statement()?,
            "function" => {
                self.bump();
                let is_method = self.funcname()?;
                self.funcbody(is_method)?;
            }
            "local" => self.local_statement()?,
            _ => {
                if self.cur().kind == TokenKind::Ident || self.cur().is("(") {
                    self.expr_statement()?;
                } else {
                    return Err(self.unexpected("statement"));
                }
            }
        }
        Ok(())
    }

    fn for_statement(&mut self) -> Result<()> {
        self.bump(); // for
        let mut control = vec![self.expect_name()?];

        if self.cur().is("=") {
            self.bump();
            self.expression()?;
            self.expect(",")?;
            self.expression()?;
            if self.cur().is(",") {
                self.bump();
                self.expression()?;
            }
        } else {
            while self.cur().is(",") {
                self.bump();
                control.push(self.expect_name()?);
            }
            self.expect("in")?;
            self.explist()?;
        }

        self.expect("do")?;
        self.enter_scope();
        for idx in control {
            self.declare(idx);
        }
        self.block()?;
        self.expect("end")?;
        self.leave_scope();
        Ok(())
    }

    /// `Name {'.' Name} [':' Name]` after the `function` keyword.
    /// Returns true for the colon (method) form.
    fn funcname(&mut self) -> Result<bool> {
        let idx = self.expect_name()?;
        self.resolve(idx);
        while self.cur().is(".") {
            self.bump();
            self.expect_name()?; // field, never renamed
        }
        if self.cur().is(":") {
            self.bump();
            self.expect_name()?; // method name, never renamed
            return Ok(true);
        }
        Ok(false)
    }

    /// `'(' params ')' block 'end'`, opening the function scope.
    fn funcbody(&mut self, is_method: bool) -> Result<()> {
        self.expect("(")?;
        self.enter_scope();
        if is_method {
            self.declare_implicit("self");
        }

        loop {
            if self.cur().is(")") {
                break;
            }
            if self.cur().is("...") {
                self.bump();
                break;
            }
            let idx = self.expect_name()?;
            self.declare(idx);
            if self.cur().is(",") {
                self.bump();
            } else {
                break;
            }
        }

        self.expect(")")?;
        self.block()?;
        self.expect("end")?;
        self.leave_scope();
        Ok(())
    }

    fn local_statement(&mut self) -> Result<()> {
        self.bump(); // local

        if self.cur().is("function") {
            self.bump();
            let idx = self.expect_name()?;
            // Bound before the body: the function may call itself.
            self.declare(idx);
            self.funcbody(false)?;
            return Ok(());
        }

        let mut names = vec![self.expect_name()?];
        self.skip_attrib()?;
        while self.cur().is(",") {
            self.bump();
            names.push(self.expect_name()?);
            self.skip_attrib()?;
        }

        // Initializers are evaluated before the names exist, so
        // `local x = x` must resolve the right-hand `x` outward.
        if self.cur().is("=") {
            self.bump();
            self.explist()?;
        }

        for idx in names {
            self.declare(idx);
        }
        Ok(())
    }

    /// Consumes a `<const>` / `<close>` attribute if present.
    fn skip_attrib(&mut self) -> Result<()> {
        if self.cur().is("<") && self.peek(1).kind == TokenKind::Ident && self.peek(2).is(">") {
            self.bump();
            self.bump();
            self.bump();
        }
        Ok(())
    }

    /// A statement that begins with an expression: a call, or the
    /// target list of an assignment.
    fn expr_statement(&mut self) -> Result<()> {
        self.prefix_expr()?;
        if self.cur().is("=") || self.cur().is(",") {
            while self.cur().is(",") {
                self.bump();
                self.prefix_expr()?;
            }
            self.expect("=")?;
            self.explist()?;
        }
        Ok(())
    }

    fn explist(&mut self) -> Result<()> {
        self.expression()?;
        while self.cur().is(",") {
            self.bump();
            self.expression()?;
        }
        Ok(())
    }

    /// Loose expression scan: unary prefixes, one operand with suffixes,
    /// then as many binary-operator continuations as the text offers.
    /// Precedence is irrelevant here; only names and scopes matter.
    fn expression(&mut self) -> Result<()> {
        loop {
            while self.cur().is("not") || self.cur().is("-") || self.cur().is("#") || self.cur().is("~")
            {
                self.bump();
            }
            self.operand()?;

            let tok = self.cur();
            let is_binop = matches!(tok.kind, TokenKind::Symbol | TokenKind::Keyword)
                && BINARY_OPS.contains(&tok.text);
            if is_binop {
                self.bump();
            } else {
                return Ok(());
            }
        }
    }

    fn operand(&mut self) -> Result<()> {
        let tok = self.cur();
        match tok.kind {
            TokenKind::Number | TokenKind::Str | TokenKind::LongStr => {
                self.bump();
                Ok(())
            }
            TokenKind::Keyword if matches!(tok.text, "nil" | "true" | "false") => {
                self.bump();
                Ok(())
            }
            TokenKind::Keyword if tok.text == "function" => {
                self.bump();
                self.funcbody(false)
            }
            TokenKind::Symbol if tok.text == "..." => {
                self.bump();
                Ok(())
            }
            TokenKind::Symbol if tok.text == "{" => self.table_constructor(),
            TokenKind::Symbol if tok.text == "(" => self.prefix_expr(),
            TokenKind::Ident => self.prefix_expr(),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `Name | '(' exp ')'` followed by any chain of index, field,
    /// method and call suffixes.
    fn prefix_expr(&mut self) -> Result<()> {
        if self.cur().is("(") {
            self.bump();
            self.expression()?;
            self.expect(")")?;
        } else {
            let idx = self.expect_name()?;
            self.resolve(idx);
        }
        self.suffixes()
    }

    fn suffixes(&mut self) -> Result<()> {
        loop {
            let tok = self.cur();
            match tok.kind {
                TokenKind::Symbol if tok.text == "." => {
                    self.bump();
                    self.expect_name()?; // field, never renamed
                }
                TokenKind::Symbol if tok.text == ":" => {
                    self.bump();
                    self.expect_name()?; // method, never renamed
                    self.call_args()?;
                }
                TokenKind::Symbol if tok.text == "[" => {
                    self.bump();
                    self.expression()?;
                    self.expect("]")?;
                }
                TokenKind::Symbol if tok.text == "(" || tok.text == "{" => {
                    self.call_args()?;
                }
                TokenKind::Str | TokenKind::LongStr => {
                    self.bump(); // f"arg" / f[[arg]]
                }
                _ => return Ok(()),
            }
        }
    }

    fn call_args(&mut self) -> Result<()> {
        let tok = self.cur();
        match tok.kind {
            TokenKind::Symbol if tok.text == "(" => {
                self.bump();
                if !self.cur().is(")") {
                    self.explist()?;
                }
                self.expect(")")?;
                Ok(())
            }
            TokenKind::Symbol if tok.text == "{" => self.table_constructor(),
            TokenKind::Str | TokenKind::LongStr => {
                self.bump();
                Ok(())
            }
            _ => Err(self.unexpected("arguments")),
        }
    }

    fn table_constructor(&mut self) -> Result<()> {
        self.expect("{")?;
        loop {
            if self.cur().is("}") {
                self.bump();
                return Ok(());
            }
            if self.cur().is("[") {
                self.bump();
                self.expression()?;
                self.expect("]")?;
                self.expect("=")?;
                self.expression()?;
            } else if self.cur().kind == TokenKind::Ident && self.peek(1).is("=") {
                self.bump(); // key, never renamed
                self.bump(); // =
                self.expression()?;
            } else {
                self.expression()?;
            }

            if self.cur().is(",") || self.cur().is(";") {
                self.bump();
            } else {
                self.expect("}")?;
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn run(source: &str) -> Analysis {
        let tokens = lex(source).unwrap();
        analyze(source, &tokens).unwrap()
    }

    fn binding_named<'an>(analysis: &'an Analysis, name: &str) -> &'an Binding {
        analysis
            .bindings
            .iter()
            .find(|b| b.name == name)
            .unwrap_or_else(|| panic!("no binding named {name}"))
    }

    #[test]
    fn local_declaration_and_uses_resolve() {
        let analysis = run("local count = 0\ncount = count + 1\nreturn count");
        let b = binding_named(&analysis, "count");
        assert_eq!(b.sites.len(), 4); // declaration + three uses
        assert!(analysis.globals.is_empty());
    }

    #[test]
    fn unresolved_names_are_globals() {
        let analysis = run("score = score + bonus");
        assert!(analysis.bindings.is_empty());
        assert!(analysis.globals.contains("score"));
        assert!(analysis.globals.contains("bonus"));
    }

    #[test]
    fn fields_and_methods_are_not_name_uses() {
        let analysis = run("local t = {}\nt.count = 1\nt:reset(t.count)");
        let t = binding_named(&analysis, "t");
        assert_eq!(t.sites.len(), 4);
        assert!(!analysis.globals.contains("count"));
        assert!(!analysis.globals.contains("reset"));
        assert!(analysis.bindings.iter().all(|b| b.name != "count"));
    }

    #[test]
    fn table_keys_are_not_name_uses() {
        let analysis = run("local x = 1\nlocal t = {x = 2, [x] = x, x}");
        let x = binding_named(&analysis, "x");
        // declaration, bracket key, bracket value, positional value
        assert_eq!(x.sites.len(), 4);
    }

    #[test]
    fn initializer_resolves_before_binding() {
        let analysis = run("local x = x");
        let x = binding_named(&analysis, "x");
        assert_eq!(x.sites.len(), 1); // just the declaration
        assert!(analysis.globals.contains("x"));
    }

    #[test]
    fn local_function_can_recurse() {
        let analysis = run("local function fib(n)\nif n < 2 then return n end\nreturn fib(n - 1) + fib(n - 2)\nend");
        let fib = binding_named(&analysis, "fib");
        assert_eq!(fib.sites.len(), 3);
        assert!(analysis.globals.is_empty());
    }

    #[test]
    fn sibling_functions_get_sibling_scopes() {
        let analysis = run(
            "local function f(a) return a end\nlocal function g(a) return a end",
        );
        let params: Vec<_> = analysis.bindings.iter().filter(|b| b.name == "a").collect();
        assert_eq!(params.len(), 2);
        assert_ne!(params[0].scope, params[1].scope);
        let chunk = &analysis.scopes[0];
        assert_eq!(chunk.children.len(), 2);
    }

    #[test]
    fn closures_capture_enclosing_locals() {
        let analysis = run(
            "local total = 0\nlocal function add(n)\ntotal = total + n\nend\nadd(2)",
        );
        let total = binding_named(&analysis, "total");
        assert_eq!(total.sites.len(), 3);
        assert_eq!(total.scope, 0);
    }

    #[test]
    fn for_control_variables_bind_in_body() {
        let analysis = run("local i = 9\nfor i = 1, i do output.setNumber(i, 0) end");
        let bindings: Vec<_> = analysis.bindings.iter().filter(|b| b.name == "i").collect();
        assert_eq!(bindings.len(), 2);
        // The outer i: declaration + use as the loop bound.
        assert_eq!(bindings[0].sites.len(), 2);
        // The control variable: declaration + use in the body.
        assert_eq!(bindings[1].sites.len(), 2);
    }

    #[test]
    fn generic_for_declares_every_name() {
        let analysis = run("for k, v in pairs(data) do print(k, v) end");
        assert_eq!(binding_named(&analysis, "k").sites.len(), 2);
        assert_eq!(binding_named(&analysis, "v").sites.len(), 2);
        assert!(analysis.globals.contains("pairs"));
        assert!(analysis.globals.contains("data"));
    }

    #[test]
    fn repeat_locals_visible_in_until() {
        let analysis = run("repeat local done = step() until done");
        let done = binding_named(&analysis, "done");
        assert_eq!(done.sites.len(), 2);
    }

    #[test]
    fn method_body_gets_implicit_self() {
        let analysis = run("function Counter:bump()\nself.n = self.n + 1\nend");
        let this = binding_named(&analysis, "self");
        assert!(!this.renameable);
        assert_eq!(this.sites.len(), 2);
        assert!(!analysis.globals.contains("self"));
        assert!(analysis.globals.contains("Counter"));
    }

    #[test]
    fn labels_and_gotos_are_ignored() {
        let analysis = run("for i = 1, 3 do\nif i == 2 then goto continue end\n::continue::\nend");
        assert!(analysis.bindings.iter().all(|b| b.name != "continue"));
        assert!(!analysis.globals.contains("continue"));
    }

    #[test]
    fn missing_end_is_reported() {
        let tokens = lex("if x then y = 1").unwrap();
        let err = analyze("if x then y = 1", &tokens).unwrap_err();
        assert!(matches!(err, MinifyError::UnexpectedEof { .. }));
    }

    #[test]
    fn stray_end_is_reported() {
        let tokens = lex("x = 1\nend").unwrap();
        let err = analyze("x = 1\nend", &tokens).unwrap_err();
        assert!(matches!(
            err,
            MinifyError::UnexpectedToken { line: 2, .. }
        ));
    }

    #[test]
    fn varargs_and_string_calls_parse() {
        let analysis = run("local function log(...)\nprint(...)\nend\nlog \"hi\"\nlog {1, 2}");
        let log = binding_named(&analysis, "log");
        assert_eq!(log.sites.len(), 3);
    }
}
