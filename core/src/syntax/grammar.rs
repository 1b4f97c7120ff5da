//! Tolerant StreamQL grammar.
//!
//! A nom lexer turns the source into spanned tokens; a recursive-descent
//! pass assembles [`SyntaxNode`] trees from them. The parser never fails:
//! unparseable stretches are consumed up to the next pipe and flagged with
//! `error = true` so a half-typed statement still yields a usable tree.

use nom::{
    IResult, Parser as NomParser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1},
    combinator::{opt, recognize},
    sequence::{pair, preceded},
};

use super::tree::{Span, SyntaxKind, SyntaxNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Pipe,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Assign,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Colon,
    Ident,
    QuotedIdent,
    Str,
    Int,
    Dec,
    Unknown,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    span: Span,
    text: &'a str,
}

/// Words that terminate an expression or introduce a clause; a bare integer
/// followed by one of these is a plain number, not a time interval.
const RESERVED: &[&str] = &[
    "and", "or", "not", "in", "like", "rlike", "is", "null", "true", "false", "by", "asc", "desc",
    "nulls", "first", "last", "as", "on", "with", "metadata",
];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '@'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '@' || c == '.' || c == '*'
}

fn lex_ident(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (rest, text) = recognize(pair(
        take_while1(is_ident_start),
        take_while(is_ident_char),
    ))
    .parse(input)?;
    Ok((rest, (TokenKind::Ident, text)))
}

fn lex_quoted_ident(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (rest, text) = recognize((char('`'), take_while(|c| c != '`'), opt(char('`')))).parse(input)?;
    Ok((rest, (TokenKind::QuotedIdent, text)))
}

fn lex_string(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (rest, text) =
        recognize((char('"'), take_while(|c| c != '"'), opt(char('"')))).parse(input)?;
    Ok((rest, (TokenKind::Str, text)))
}

fn lex_number(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (rest, text) = recognize(pair(digit1, opt(preceded(char('.'), digit1)))).parse(input)?;
    let kind = if text.contains('.') {
        TokenKind::Dec
    } else {
        TokenKind::Int
    };
    Ok((rest, (kind, text)))
}

fn lex_operator(input: &str) -> IResult<&str, (TokenKind, &str)> {
    use TokenKind::*;
    alt((
        tag("==").map(|t| (Eq, t)),
        tag("!=").map(|t| (Neq, t)),
        tag("<=").map(|t| (Lte, t)),
        tag(">=").map(|t| (Gte, t)),
        tag("|").map(|t| (Pipe, t)),
        tag(",").map(|t| (Comma, t)),
        tag("(").map(|t| (LParen, t)),
        tag(")").map(|t| (RParen, t)),
        tag("[").map(|t| (LBracket, t)),
        tag("]").map(|t| (RBracket, t)),
        tag("=").map(|t| (Assign, t)),
        tag("<").map(|t| (Lt, t)),
        tag(">").map(|t| (Gt, t)),
        tag("+").map(|t| (Plus, t)),
        tag("-").map(|t| (Minus, t)),
        tag("*").map(|t| (Asterisk, t)),
        tag("/").map(|t| (Slash, t)),
        tag("%").map(|t| (Percent, t)),
        tag(":").map(|t| (Colon, t)),
    ))
    .parse(input)
}

fn lex_token(input: &str) -> IResult<&str, (TokenKind, &str)> {
    alt((lex_quoted_ident, lex_string, lex_number, lex_ident, lex_operator)).parse(input)
}

/// Lex the whole source into spanned tokens. Characters the lexer does not
/// recognize become single `Unknown` tokens rather than aborting the scan.
fn lex(src: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = src;
    loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        let start = src.len() - trimmed.len();
        match lex_token(trimmed) {
            Ok((after, (kind, text))) => {
                tokens.push(Token {
                    kind,
                    span: Span::new(start, start + text.len()),
                    text,
                });
                rest = after;
            }
            Err(_) => {
                let ch_len = trimmed.chars().next().map_or(1, |c| c.len_utf8());
                tokens.push(Token {
                    kind: TokenKind::Unknown,
                    span: Span::new(start, start + ch_len),
                    text: &trimmed[..ch_len],
                });
                rest = &trimmed[ch_len..];
            }
        }
    }
    tokens
}

/// Parse one statement into a `Statement` syntax node.
pub fn parse_statement(src: &str) -> SyntaxNode {
    let tokens = lex(src);
    let mut parser = Parser {
        src,
        tokens,
        pos: 0,
        last_end: 0,
    };
    parser.statement()
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    /// End offset of the most recently consumed token.
    last_end: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn nth(&self, n: usize) -> Option<&Token<'a>> {
        self.tokens.get(self.pos + n)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    fn at_word(&self, word: &str) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Ident && t.text.eq_ignore_ascii_case(word))
    }

    fn at_end(&self) -> bool {
        self.peek().is_none() || self.at(TokenKind::Pipe)
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let tok = self.tokens.get(self.pos).copied();
        if let Some(t) = tok {
            self.pos += 1;
            self.last_end = t.span.max;
        }
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        if self.at(kind) { self.bump() } else { None }
    }

    fn eat_word(&mut self, word: &str) -> Option<Token<'a>> {
        if self.at_word(word) { self.bump() } else { None }
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.src.len(), |t| t.span.min)
    }

    fn node(
        &self,
        kind: SyntaxKind,
        start: usize,
        children: Vec<SyntaxNode>,
        error: bool,
    ) -> SyntaxNode {
        let end = self.last_end.max(start);
        let span = Span::new(start, end);
        SyntaxNode {
            kind,
            span,
            text: self.src[start..end].to_string(),
            error,
            children,
        }
    }

    fn leaf(&self, kind: SyntaxKind, tok: Token<'a>) -> SyntaxNode {
        SyntaxNode::leaf(kind, tok.span, tok.text)
    }

    /// Consume everything up to the next pipe. Returns true if anything was
    /// skipped, which flags the enclosing node as recovered.
    fn recover_to_pipe(&mut self) -> bool {
        let mut skipped = false;
        while !self.at_end() {
            self.bump();
            skipped = true;
        }
        skipped
    }

    fn statement(&mut self) -> SyntaxNode {
        let start = self.offset();
        let mut children = Vec::new();
        let mut error = false;
        loop {
            if self.peek().is_none() {
                break;
            }
            if self.at(TokenKind::Pipe) {
                // empty segment
                self.bump();
                error = true;
                continue;
            }
            children.push(self.command());
            if self.eat(TokenKind::Pipe).is_none() {
                break;
            }
        }
        self.node(SyntaxKind::Statement, start, children, error)
    }

    fn command(&mut self) -> SyntaxNode {
        let start = self.offset();
        let Some(tok) = self.peek().copied() else {
            return self.node(SyntaxKind::UnknownCommand, start, vec![], true);
        };
        if tok.kind != TokenKind::Ident {
            self.recover_to_pipe();
            return self.node(SyntaxKind::UnknownCommand, start, vec![], true);
        }
        let word = tok.text.to_ascii_lowercase();
        match word.as_str() {
            "from" => self.from_command(start),
            "row" => self.row_command(start),
            "show" => self.show_command(start),
            "where" => self.where_command(start),
            "eval" => self.eval_command(start),
            "stats" => self.stats_command(start),
            "limit" => self.limit_command(start),
            "sort" => self.sort_command(start),
            "keep" => self.column_list_command(start, SyntaxKind::KeepCommand),
            "drop" => self.column_list_command(start, SyntaxKind::DropCommand),
            "mv_expand" => self.column_list_command(start, SyntaxKind::MvExpandCommand),
            "rename" => self.rename_command(start),
            "dissect" => self.dissect_command(start),
            "grok" => self.grok_command(start),
            "enrich" => self.enrich_command(start),
            _ => {
                self.bump();
                let ident = self.leaf(SyntaxKind::Identifier, tok);
                self.recover_to_pipe();
                self.node(SyntaxKind::UnknownCommand, start, vec![ident], true)
            }
        }
    }

    fn from_command(&mut self, start: usize) -> SyntaxNode {
        self.bump(); // from
        let mut children = Vec::new();
        loop {
            if let Some(source) = self.source_identifier() {
                children.push(source);
            } else {
                break;
            }
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let mut error = children.is_empty();
        if self.at(TokenKind::LBracket) {
            children.push(self.metadata_clause());
        }
        error |= self.recover_to_pipe();
        self.node(SyntaxKind::FromCommand, start, children, error)
    }

    fn metadata_clause(&mut self) -> SyntaxNode {
        let start = self.offset();
        self.bump(); // [
        let mut children = Vec::new();
        let mut error = false;
        if let Some(kw) = self.eat_word("metadata") {
            children.push(self.leaf(SyntaxKind::Keyword, kw));
            loop {
                if let Some(name) = self.qualified_name() {
                    children.push(name);
                } else {
                    break;
                }
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        } else {
            error = true;
        }
        if self.eat(TokenKind::RBracket).is_none() {
            error = true;
        }
        self.node(SyntaxKind::Metadata, start, children, error)
    }

    fn row_command(&mut self, start: usize) -> SyntaxNode {
        self.bump();
        let fields = self.fields();
        let error = fields.error || self.recover_to_pipe();
        self.node(SyntaxKind::RowCommand, start, vec![fields], error)
    }

    fn show_command(&mut self, start: usize) -> SyntaxNode {
        self.bump();
        let mut children = Vec::new();
        let mut error = false;
        if self.at_word("info") || self.at_word("functions") {
            let tok = self.bump().unwrap();
            children.push(self.leaf(SyntaxKind::Keyword, tok));
        } else {
            error = true;
        }
        error |= self.recover_to_pipe();
        self.node(SyntaxKind::ShowCommand, start, children, error)
    }

    fn where_command(&mut self, start: usize) -> SyntaxNode {
        self.bump();
        let mut children = Vec::new();
        let mut error = false;
        if self.at_end() {
            error = true;
        } else if let Some(expr) = self.boolean_expr() {
            children.push(expr);
        } else {
            error = true;
        }
        error |= self.recover_to_pipe();
        self.node(SyntaxKind::WhereCommand, start, children, error)
    }

    fn eval_command(&mut self, start: usize) -> SyntaxNode {
        self.bump();
        let fields = self.fields();
        let error = fields.error || self.recover_to_pipe();
        self.node(SyntaxKind::EvalCommand, start, vec![fields], error)
    }

    fn stats_command(&mut self, start: usize) -> SyntaxNode {
        self.bump();
        let mut children = Vec::new();
        let mut error = false;
        if !self.at_end() && !self.at_word("by") {
            let fields = self.fields();
            error |= fields.error;
            children.push(fields);
        }
        if self.at_word("by") {
            children.push(self.grouping_clause());
        }
        error |= self.recover_to_pipe();
        self.node(SyntaxKind::StatsCommand, start, children, error)
    }

    fn grouping_clause(&mut self) -> SyntaxNode {
        let start = self.offset();
        let by = self.bump().unwrap(); // by
        let mut children = vec![self.leaf(SyntaxKind::Keyword, by)];
        loop {
            if let Some(name) = self.qualified_name() {
                children.push(name);
            } else {
                break;
            }
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let error = children.len() == 1;
        self.node(SyntaxKind::Grouping, start, children, error)
    }

    fn limit_command(&mut self, start: usize) -> SyntaxNode {
        self.bump();
        let mut children = Vec::new();
        let mut error = false;
        if let Some(tok) = self.eat(TokenKind::Int) {
            children.push(self.leaf(SyntaxKind::IntegerLiteral, tok));
        } else {
            error = true;
        }
        error |= self.recover_to_pipe();
        self.node(SyntaxKind::LimitCommand, start, children, error)
    }

    fn sort_command(&mut self, start: usize) -> SyntaxNode {
        self.bump();
        let mut children = Vec::new();
        let mut error = false;
        loop {
            if self.at_end() {
                error = true;
                break;
            }
            children.push(self.order_expression());
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        error |= self.recover_to_pipe();
        self.node(SyntaxKind::SortCommand, start, children, error)
    }

    fn order_expression(&mut self) -> SyntaxNode {
        let start = self.offset();
        let mut children = Vec::new();
        let mut error = false;
        if let Some(expr) = self.boolean_expr() {
            children.push(expr);
        } else {
            error = true;
        }
        for word in ["asc", "desc"] {
            if let Some(kw) = self.eat_word(word) {
                children.push(self.leaf(SyntaxKind::Keyword, kw));
                break;
            }
        }
        if let Some(kw) = self.eat_word("nulls") {
            children.push(self.leaf(SyntaxKind::Keyword, kw));
            let mut matched = false;
            for word in ["first", "last"] {
                if let Some(inner) = self.eat_word(word) {
                    children.push(self.leaf(SyntaxKind::Keyword, inner));
                    matched = true;
                    break;
                }
            }
            error |= !matched;
        }
        self.node(SyntaxKind::OrderExpression, start, children, error)
    }

    fn column_list_command(&mut self, start: usize, kind: SyntaxKind) -> SyntaxNode {
        self.bump();
        let mut children = Vec::new();
        loop {
            if let Some(name) = self.qualified_name() {
                children.push(name);
            } else {
                break;
            }
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let mut error = children.is_empty();
        error |= self.recover_to_pipe();
        self.node(kind, start, children, error)
    }

    fn rename_command(&mut self, start: usize) -> SyntaxNode {
        self.bump();
        let mut children = Vec::new();
        let mut error = false;
        loop {
            if self.at_end() {
                error = true;
                break;
            }
            children.push(self.rename_clause());
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        error |= self.recover_to_pipe();
        self.node(SyntaxKind::RenameCommand, start, children, error)
    }

    fn rename_clause(&mut self) -> SyntaxNode {
        let start = self.offset();
        let mut children = Vec::new();
        let mut error = false;
        if let Some(old) = self.qualified_name() {
            children.push(old);
        } else {
            error = true;
        }
        if let Some(kw) = self.eat_word("as") {
            children.push(self.leaf(SyntaxKind::Keyword, kw));
            if let Some(new) = self.qualified_name() {
                children.push(new);
            } else {
                error = true;
            }
        } else {
            error = true;
        }
        self.node(SyntaxKind::RenameClause, start, children, error)
    }

    fn dissect_command(&mut self, start: usize) -> SyntaxNode {
        self.bump();
        let mut children = Vec::new();
        let mut error = false;
        if let Some(target) = self.primary() {
            children.push(target);
        } else {
            error = true;
        }
        if let Some(tok) = self.eat(TokenKind::Str) {
            children.push(self.leaf(SyntaxKind::StringLiteral, tok));
        } else {
            error = true;
        }
        while self.at(TokenKind::Ident) {
            children.push(self.command_option());
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        error |= self.recover_to_pipe();
        self.node(SyntaxKind::DissectCommand, start, children, error)
    }

    fn command_option(&mut self) -> SyntaxNode {
        let start = self.offset();
        let name = self.bump().unwrap();
        let mut children = vec![self.leaf(SyntaxKind::Identifier, name)];
        let mut error = false;
        if let Some(op) = self.eat(TokenKind::Assign) {
            children.push(self.leaf(SyntaxKind::Operator, op));
            if let Some(value) = self.constant() {
                children.push(value);
            } else {
                error = true;
            }
        } else {
            error = true;
        }
        self.node(SyntaxKind::CommandOption, start, children, error)
    }

    fn grok_command(&mut self, start: usize) -> SyntaxNode {
        self.bump();
        let mut children = Vec::new();
        let mut error = false;
        if let Some(target) = self.primary() {
            children.push(target);
        } else {
            error = true;
        }
        if let Some(tok) = self.eat(TokenKind::Str) {
            children.push(self.leaf(SyntaxKind::StringLiteral, tok));
        } else {
            error = true;
        }
        error |= self.recover_to_pipe();
        self.node(SyntaxKind::GrokCommand, start, children, error)
    }

    fn enrich_command(&mut self, start: usize) -> SyntaxNode {
        self.bump();
        let mut children = Vec::new();
        let mut error = false;
        if let Some(policy) = self.source_identifier() {
            children.push(policy);
        } else {
            error = true;
        }
        if self.at_word("on") {
            let clause_start = self.offset();
            let kw = self.bump().unwrap();
            let mut clause = vec![self.leaf(SyntaxKind::Keyword, kw)];
            let mut clause_error = false;
            if let Some(name) = self.qualified_name() {
                clause.push(name);
            } else {
                clause_error = true;
            }
            children.push(self.node(SyntaxKind::EnrichOn, clause_start, clause, clause_error));
        }
        if self.at_word("with") {
            let clause_start = self.offset();
            let kw = self.bump().unwrap();
            let mut clause = vec![self.leaf(SyntaxKind::Keyword, kw)];
            let mut clause_error = false;
            loop {
                if self.at_end() {
                    clause_error = true;
                    break;
                }
                clause.push(self.enrich_with_clause());
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            children.push(self.node(SyntaxKind::EnrichWith, clause_start, clause, clause_error));
        }
        error |= self.recover_to_pipe();
        self.node(SyntaxKind::EnrichCommand, start, children, error)
    }

    fn enrich_with_clause(&mut self) -> SyntaxNode {
        let start = self.offset();
        let mut children = Vec::new();
        let mut error = false;
        if let Some(name) = self.qualified_name() {
            children.push(name);
        } else {
            error = true;
        }
        if let Some(op) = self.eat(TokenKind::Assign) {
            children.push(self.leaf(SyntaxKind::Operator, op));
            if let Some(field) = self.qualified_name() {
                children.push(field);
            } else {
                error = true;
            }
        }
        self.node(SyntaxKind::EnrichWithClause, start, children, error)
    }

    // ---- names -----------------------------------------------------------

    /// Source names may glue identifiers with `-`, `:` and wildcards into a
    /// single reference (`logs-2024-*`, `cluster:index`), as long as the
    /// pieces are adjacent in the source.
    fn source_identifier(&mut self) -> Option<SyntaxNode> {
        use TokenKind::*;
        let first = *self.peek()?;
        if first.kind == QuotedIdent {
            self.bump();
            let mut node = self.leaf(SyntaxKind::SourceIdentifier, first);
            node.children
                .push(self.leaf(SyntaxKind::QuotedIdentifier, first));
            return Some(node);
        }
        if !matches!(first.kind, Ident | Asterisk | Int) {
            return None;
        }
        self.bump();
        let mut span = first.span;
        while let Some(next) = self.peek().copied() {
            let adjacent = next.span.min == span.max;
            let joinable = matches!(next.kind, Ident | Asterisk | Int | Dec | Minus | Colon);
            if adjacent && joinable {
                self.bump();
                span = span.cover(next.span);
            } else {
                break;
            }
        }
        Some(SyntaxNode::leaf(
            SyntaxKind::SourceIdentifier,
            span,
            &self.src[span.min..span.max],
        ))
    }

    fn qualified_name(&mut self) -> Option<SyntaxNode> {
        let tok = *self.peek()?;
        match tok.kind {
            TokenKind::Ident => {
                if RESERVED.contains(&tok.text.to_ascii_lowercase().as_str()) {
                    return None;
                }
                self.bump();
                let mut node = self.leaf(SyntaxKind::QualifiedName, tok);
                node.children.push(self.leaf(SyntaxKind::Identifier, tok));
                Some(node)
            }
            TokenKind::QuotedIdent => {
                self.bump();
                let mut node = self.leaf(SyntaxKind::QualifiedName, tok);
                node.children
                    .push(self.leaf(SyntaxKind::QuotedIdentifier, tok));
                Some(node)
            }
            _ => None,
        }
    }

    // ---- fields ----------------------------------------------------------

    fn fields(&mut self) -> SyntaxNode {
        let start = self.offset();
        let mut children = Vec::new();
        let mut error = false;
        loop {
            if self.at_end() || self.at_word("by") {
                error = true;
                break;
            }
            children.push(self.field());
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.node(SyntaxKind::Fields, start, children, error)
    }

    fn field(&mut self) -> SyntaxNode {
        let start = self.offset();
        let mut children = Vec::new();
        let mut error = false;
        // assignment head: name = expr
        let is_assignment = matches!(
            self.peek().map(|t| t.kind),
            Some(TokenKind::Ident | TokenKind::QuotedIdent)
        ) && self.nth(1).is_some_and(|t| t.kind == TokenKind::Assign)
            && !self
                .peek()
                .is_some_and(|t| RESERVED.contains(&t.text.to_ascii_lowercase().as_str()));
        if is_assignment {
            children.push(self.qualified_name().unwrap());
            let op = self.bump().unwrap(); // =
            children.push(self.leaf(SyntaxKind::Operator, op));
            if let Some(expr) = self.boolean_expr() {
                children.push(expr);
            } else {
                error = true;
            }
        } else if let Some(expr) = self.boolean_expr() {
            children.push(expr);
        } else {
            error = true;
        }
        self.node(SyntaxKind::Field, start, children, error)
    }

    // ---- expressions -----------------------------------------------------

    fn boolean_expr(&mut self) -> Option<SyntaxNode> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Option<SyntaxNode> {
        let start = self.offset();
        let mut left = self.and_expr()?;
        while let Some(op) = self.eat_word("or") {
            let mut children = vec![left, self.leaf(SyntaxKind::Operator, op)];
            let mut error = false;
            if let Some(right) = self.and_expr() {
                children.push(right);
            } else {
                error = true;
            }
            left = self.node(SyntaxKind::LogicalBinary, start, children, error);
        }
        Some(left)
    }

    fn and_expr(&mut self) -> Option<SyntaxNode> {
        let start = self.offset();
        let mut left = self.not_expr()?;
        while let Some(op) = self.eat_word("and") {
            let mut children = vec![left, self.leaf(SyntaxKind::Operator, op)];
            let mut error = false;
            if let Some(right) = self.not_expr() {
                children.push(right);
            } else {
                error = true;
            }
            left = self.node(SyntaxKind::LogicalBinary, start, children, error);
        }
        Some(left)
    }

    fn not_expr(&mut self) -> Option<SyntaxNode> {
        let start = self.offset();
        // `not` as prefix, but not the `not in` / `not like` forms which are
        // handled as predicate postfix
        if self.at_word("not") {
            let next_is_postfix = self
                .nth(1)
                .is_some_and(|t| matches!(t.text.to_ascii_lowercase().as_str(), "in" | "like" | "rlike"));
            if !next_is_postfix {
                let kw = self.bump().unwrap();
                let mut children = vec![self.leaf(SyntaxKind::Keyword, kw)];
                let mut error = false;
                if let Some(inner) = self.not_expr() {
                    children.push(inner);
                } else {
                    error = true;
                }
                return Some(self.node(SyntaxKind::LogicalNot, start, children, error));
            }
        }
        self.predicate()
    }

    fn predicate(&mut self) -> Option<SyntaxNode> {
        let start = self.offset();
        let value = self.value_expr()?;

        // IS [NOT] NULL
        if self.at_word("is") {
            self.bump();
            let mut children = vec![value];
            if let Some(not) = self.eat_word("not") {
                children.push(self.leaf(SyntaxKind::Keyword, not));
            }
            let error = if let Some(null) = self.eat_word("null") {
                children.push(self.leaf(SyntaxKind::Keyword, null));
                false
            } else {
                true
            };
            return Some(self.node(SyntaxKind::IsNull, start, children, error));
        }

        let negated = self.at_word("not")
            && self
                .nth(1)
                .is_some_and(|t| matches!(t.text.to_ascii_lowercase().as_str(), "in" | "like" | "rlike"));
        let mut prefix = Vec::new();
        if negated {
            let not = self.bump().unwrap();
            prefix.push(self.leaf(SyntaxKind::Keyword, not));
        }

        // [NOT] IN (v, ...)
        if self.at_word("in") {
            let kw = self.bump().unwrap();
            let mut children = vec![value];
            children.extend(prefix);
            children.push(self.leaf(SyntaxKind::Keyword, kw));
            let mut error = self.eat(TokenKind::LParen).is_none();
            loop {
                if let Some(item) = self.value_expr() {
                    children.push(item);
                } else {
                    break;
                }
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            error |= self.eat(TokenKind::RParen).is_none();
            return Some(self.node(SyntaxKind::LogicalIn, start, children, error));
        }

        // [NOT] LIKE/RLIKE "pattern"
        if self.at_word("like") || self.at_word("rlike") {
            let kw = self.bump().unwrap();
            let mut children = vec![value];
            children.extend(prefix);
            children.push(self.leaf(SyntaxKind::Keyword, kw));
            let error = if let Some(pattern) = self.eat(TokenKind::Str) {
                children.push(self.leaf(SyntaxKind::StringLiteral, pattern));
                false
            } else {
                true
            };
            return Some(self.node(SyntaxKind::RegexExpression, start, children, error));
        }

        if !prefix.is_empty() {
            // dangling `not` with no recognizable postfix
            let mut children = vec![value];
            children.extend(prefix);
            return Some(self.node(SyntaxKind::LogicalNot, start, children, true));
        }
        Some(value)
    }

    fn value_expr(&mut self) -> Option<SyntaxNode> {
        use TokenKind::*;
        let start = self.offset();
        let left = self.additive()?;
        if matches!(self.peek().map(|t| t.kind), Some(Eq | Neq | Lt | Lte | Gt | Gte)) {
            let op = self.bump().unwrap();
            let mut children = vec![left, self.leaf(SyntaxKind::Operator, op)];
            let mut error = false;
            if let Some(right) = self.additive() {
                children.push(right);
            } else {
                error = true;
            }
            return Some(self.node(SyntaxKind::Comparison, start, children, error));
        }
        Some(left)
    }

    fn additive(&mut self) -> Option<SyntaxNode> {
        use TokenKind::*;
        let start = self.offset();
        let mut left = self.multiplicative()?;
        while matches!(self.peek().map(|t| t.kind), Some(Plus | Minus)) {
            let op = self.bump().unwrap();
            let mut children = vec![left, self.leaf(SyntaxKind::Operator, op)];
            let mut error = false;
            if let Some(right) = self.multiplicative() {
                children.push(right);
            } else {
                error = true;
            }
            left = self.node(SyntaxKind::ArithmeticBinary, start, children, error);
        }
        Some(left)
    }

    fn multiplicative(&mut self) -> Option<SyntaxNode> {
        use TokenKind::*;
        let start = self.offset();
        let mut left = self.unary()?;
        while matches!(self.peek().map(|t| t.kind), Some(Asterisk | Slash | Percent)) {
            let op = self.bump().unwrap();
            let mut children = vec![left, self.leaf(SyntaxKind::Operator, op)];
            let mut error = false;
            if let Some(right) = self.unary() {
                children.push(right);
            } else {
                error = true;
            }
            left = self.node(SyntaxKind::ArithmeticBinary, start, children, error);
        }
        Some(left)
    }

    fn unary(&mut self) -> Option<SyntaxNode> {
        use TokenKind::*;
        let start = self.offset();
        if matches!(self.peek().map(|t| t.kind), Some(Plus | Minus)) {
            let op = self.bump().unwrap();
            let mut children = vec![self.leaf(SyntaxKind::Operator, op)];
            let mut error = false;
            if let Some(inner) = self.unary() {
                children.push(inner);
            } else {
                error = true;
            }
            return Some(self.node(SyntaxKind::ArithmeticUnary, start, children, error));
        }
        self.primary()
    }

    fn primary(&mut self) -> Option<SyntaxNode> {
        use TokenKind::*;
        let start = self.offset();
        let tok = *self.peek()?;
        match tok.kind {
            LParen => {
                self.bump();
                let mut children = Vec::new();
                let mut error = false;
                if let Some(inner) = self.boolean_expr() {
                    children.push(inner);
                } else {
                    error = true;
                }
                error |= self.eat(RParen).is_none();
                Some(self.node(SyntaxKind::Parenthesized, start, children, error))
            }
            LBracket => Some(self.array_literal()),
            Str => {
                self.bump();
                Some(self.leaf(SyntaxKind::StringLiteral, tok))
            }
            Dec => {
                self.bump();
                Some(self.leaf(SyntaxKind::DecimalLiteral, tok))
            }
            Int => {
                self.bump();
                // `1 year` style time interval: integer followed by a plain
                // alphabetic word that is not a reserved keyword
                if let Some(unit) = self.peek().copied()
                    && unit.kind == Ident
                    && unit.text.chars().all(|c| c.is_ascii_alphabetic())
                    && !RESERVED.contains(&unit.text.to_ascii_lowercase().as_str())
                    && self.nth(1).map(|t| t.kind) != Some(LParen)
                {
                    self.bump();
                    let children = vec![
                        self.leaf(SyntaxKind::IntegerLiteral, tok),
                        self.leaf(SyntaxKind::Identifier, unit),
                    ];
                    return Some(self.node(SyntaxKind::TimeIntervalLiteral, start, children, false));
                }
                Some(self.leaf(SyntaxKind::IntegerLiteral, tok))
            }
            Ident if tok.text.eq_ignore_ascii_case("null") => {
                self.bump();
                Some(self.leaf(SyntaxKind::NullLiteral, tok))
            }
            Ident
                if tok.text.eq_ignore_ascii_case("true")
                    || tok.text.eq_ignore_ascii_case("false") =>
            {
                self.bump();
                Some(self.leaf(SyntaxKind::BooleanLiteral, tok))
            }
            Ident if self.nth(1).map(|t| t.kind) == Some(LParen) => {
                self.bump();
                self.bump(); // (
                let mut children = vec![self.leaf(SyntaxKind::Identifier, tok)];
                loop {
                    if let Some(arg) = self.boolean_expr() {
                        children.push(arg);
                    } else {
                        break;
                    }
                    if self.eat(Comma).is_none() {
                        break;
                    }
                }
                let error = self.eat(RParen).is_none();
                Some(self.node(SyntaxKind::FunctionExpression, start, children, error))
            }
            Ident | QuotedIdent => self.qualified_name(),
            _ => None,
        }
    }

    fn array_literal(&mut self) -> SyntaxNode {
        use TokenKind::*;
        let start = self.offset();
        self.bump(); // [
        let mut children = Vec::new();
        loop {
            if let Some(value) = self.constant() {
                children.push(value);
            } else {
                break;
            }
            if self.eat(Comma).is_none() {
                break;
            }
        }
        let error = self.eat(RBracket).is_none();
        let kind = match children.first().map(|c| c.kind) {
            Some(SyntaxKind::StringLiteral) => SyntaxKind::StringArrayLiteral,
            Some(SyntaxKind::BooleanLiteral) => SyntaxKind::BooleanArrayLiteral,
            _ => SyntaxKind::NumericArrayLiteral,
        };
        let is_empty = children.is_empty();
        self.node(kind, start, children, error || is_empty)
    }

    fn constant(&mut self) -> Option<SyntaxNode> {
        use TokenKind::*;
        let tok = *self.peek()?;
        match tok.kind {
            Str => {
                self.bump();
                Some(self.leaf(SyntaxKind::StringLiteral, tok))
            }
            Int => {
                self.bump();
                Some(self.leaf(SyntaxKind::IntegerLiteral, tok))
            }
            Dec => {
                self.bump();
                Some(self.leaf(SyntaxKind::DecimalLiteral, tok))
            }
            Ident if tok.text.eq_ignore_ascii_case("true")
                || tok.text.eq_ignore_ascii_case("false") =>
            {
                self.bump();
                Some(self.leaf(SyntaxKind::BooleanLiteral, tok))
            }
            Ident if tok.text.eq_ignore_ascii_case("null") => {
                self.bump();
                Some(self.leaf(SyntaxKind::NullLiteral, tok))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(src: &str) -> Vec<SyntaxKind> {
        parse_statement(src).children.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn pipeline_splits_into_commands() {
        assert_eq!(
            commands("from a | where x > 1 | limit 10"),
            vec![
                SyntaxKind::FromCommand,
                SyntaxKind::WhereCommand,
                SyntaxKind::LimitCommand
            ]
        );
    }

    #[test]
    fn source_names_merge_dashes_and_wildcards() {
        let stmt = parse_statement("from logs-2024-*, cluster:index");
        let from = &stmt.children[0];
        let names: Vec<_> = from
            .children_of(SyntaxKind::SourceIdentifier)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(names, vec!["logs-2024-*", "cluster:index"]);
    }

    #[test]
    fn incomplete_where_recovers() {
        let stmt = parse_statement("from a | where ");
        assert_eq!(stmt.children.len(), 2);
        let where_cmd = &stmt.children[1];
        assert_eq!(where_cmd.kind, SyntaxKind::WhereCommand);
        assert!(where_cmd.error);
    }

    #[test]
    fn time_interval_detected() {
        let stmt = parse_statement("row a = 1 year");
        let fields = stmt.children[0].child(SyntaxKind::Fields).unwrap();
        let field = &fields.children[0];
        assert!(field
            .children
            .iter()
            .any(|c| c.kind == SyntaxKind::TimeIntervalLiteral));
    }

    #[test]
    fn unterminated_function_is_flagged() {
        let stmt = parse_statement("from a | where log10(");
        let where_cmd = &stmt.children[1];
        let expr = &where_cmd.children[0];
        assert_eq!(expr.kind, SyntaxKind::FunctionExpression);
        assert!(expr.error);
    }
}
