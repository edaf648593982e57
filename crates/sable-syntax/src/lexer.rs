use text_size::{TextRange, TextSize};

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
}

impl Token {
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.range]
    }
}

/// Lex the whole input. Every byte belongs to exactly one token; the last token is `Eof`.
pub fn lex(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.kind == SyntaxKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    tokens
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// True while only whitespace has been seen since the last newline.
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            at_line_start: true,
        }
    }

    pub fn next_token(&mut self) -> Token {
        let start = self.pos;
        let kind = match self.peek() {
            None => SyntaxKind::Eof,
            Some(c) => self.scan(c, start),
        };
        let was_whitespace = kind == SyntaxKind::Whitespace;
        let text = &self.input[start..self.pos];
        if was_whitespace {
            if text.contains('\n') || text.contains('\r') {
                self.at_line_start = true;
            }
        } else {
            self.at_line_start = false;
        }
        Token {
            kind,
            range: TextRange::new(TextSize::from(start as u32), TextSize::from(self.pos as u32)),
        }
    }

    fn scan(&mut self, c: char, start: usize) -> SyntaxKind {
        if c.is_whitespace() {
            self.eat_while(char::is_whitespace);
            return SyntaxKind::Whitespace;
        }
        if c == '#' && self.at_line_start {
            self.eat_while(|c| c != '\n' && c != '\r');
            return SyntaxKind::PreprocessorDirective;
        }
        if c == '/' {
            if self.rest().starts_with("///") {
                self.eat_while(|c| c != '\n' && c != '\r');
                return SyntaxKind::DocComment;
            }
            if self.rest().starts_with("//") {
                self.eat_while(|c| c != '\n' && c != '\r');
                return SyntaxKind::LineComment;
            }
            if self.rest().starts_with("/*") {
                let doc = self.rest().starts_with("/**") && !self.rest().starts_with("/**/");
                match self.rest()[2..].find("*/") {
                    Some(end) => self.pos += 2 + end + 2,
                    None => self.pos = self.input.len(),
                }
                return if doc {
                    SyntaxKind::DocComment
                } else {
                    SyntaxKind::MultiLineComment
                };
            }
        }
        if c == '@' || c == '$' {
            return self.scan_prefixed(c);
        }
        if is_ident_start(c) {
            self.eat_while(is_ident_continue);
            let text = &self.input[start..self.pos];
            return SyntaxKind::from_keyword(text).unwrap_or(SyntaxKind::Identifier);
        }
        if c.is_ascii_digit() || (c == '.' && self.nth_char(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }
        if c == '"' {
            self.bump();
            self.eat_quoted('"');
            return SyntaxKind::StringLiteral;
        }
        if c == '\'' {
            self.bump();
            self.eat_quoted('\'');
            return SyntaxKind::CharLiteral;
        }
        self.scan_punct()
    }

    /// `@ident`, `@"verbatim"`, `$"interpolated"`, `$@"..."` and `@$"..."`.
    fn scan_prefixed(&mut self, c: char) -> SyntaxKind {
        let rest = self.rest();
        let (prefix_len, verbatim, interpolated) = if rest.starts_with("$@\"") || rest.starts_with("@$\"") {
            (2, true, true)
        } else if rest.starts_with("@\"") {
            (1, true, false)
        } else if rest.starts_with("$\"") {
            (1, false, true)
        } else if c == '@' && self.nth_char(1).map_or(false, is_ident_start) {
            self.bump();
            self.eat_while(is_ident_continue);
            return SyntaxKind::Identifier;
        } else {
            self.bump();
            return SyntaxKind::Error;
        };

        self.pos += prefix_len + 1;
        let mut depth = 0usize;
        while let Some(ch) = self.peek() {
            self.bump();
            match ch {
                '{' if interpolated => {
                    if depth == 0 && self.peek() == Some('{') {
                        self.bump();
                    } else {
                        depth += 1;
                    }
                }
                '}' if interpolated && depth > 0 => depth -= 1,
                '\\' if !verbatim => {
                    self.bump();
                }
                '"' if depth == 0 => {
                    if verbatim && self.peek() == Some('"') {
                        self.bump();
                    } else {
                        break;
                    }
                }
                '\n' if !verbatim && depth == 0 => break,
                _ => {}
            }
        }
        SyntaxKind::StringLiteral
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let mut real = false;
        if self.rest().starts_with("0x") || self.rest().starts_with("0X") {
            self.pos += 2;
            self.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
        } else if self.rest().starts_with("0b") || self.rest().starts_with("0B") {
            self.pos += 2;
            self.eat_while(|c| c == '0' || c == '1' || c == '_');
        } else {
            self.eat_while(|c| c.is_ascii_digit() || c == '_');
            if self.peek() == Some('.') && self.nth_char(1).map_or(false, |c| c.is_ascii_digit()) {
                real = true;
                self.bump();
                self.eat_while(|c| c.is_ascii_digit() || c == '_');
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                let sign = matches!(self.nth_char(1), Some('+' | '-'));
                let digit_at = if sign { 2 } else { 1 };
                if self.nth_char(digit_at).map_or(false, |c| c.is_ascii_digit()) {
                    real = true;
                    self.pos += digit_at;
                    self.eat_while(|c| c.is_ascii_digit());
                }
            }
        }
        match self.peek() {
            Some('f' | 'F' | 'd' | 'D' | 'm' | 'M') => {
                self.bump();
                real = true;
            }
            Some('u' | 'U' | 'l' | 'L') => {
                self.eat_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
            }
            _ => {}
        }
        if real {
            SyntaxKind::RealLiteral
        } else {
            SyntaxKind::IntLiteral
        }
    }

    fn scan_punct(&mut self) -> SyntaxKind {
        const TABLE: &[(&str, SyntaxKind)] = &[
            ("??=", SyntaxKind::QuestionQuestionEq),
            ("<<=", SyntaxKind::LeftShiftEq),
            ("::", SyntaxKind::ColonColon),
            ("??", SyntaxKind::QuestionQuestion),
            ("?.", SyntaxKind::QuestionDot),
            ("=>", SyntaxKind::Arrow),
            ("==", SyntaxKind::EqEq),
            ("!=", SyntaxKind::BangEq),
            ("++", SyntaxKind::PlusPlus),
            ("+=", SyntaxKind::PlusEq),
            ("--", SyntaxKind::MinusMinus),
            ("-=", SyntaxKind::MinusEq),
            ("*=", SyntaxKind::StarEq),
            ("/=", SyntaxKind::SlashEq),
            ("%=", SyntaxKind::PercentEq),
            ("&&", SyntaxKind::AmpAmp),
            ("&=", SyntaxKind::AmpEq),
            ("||", SyntaxKind::PipePipe),
            ("|=", SyntaxKind::PipeEq),
            ("^=", SyntaxKind::CaretEq),
            ("<<", SyntaxKind::LeftShift),
            ("<=", SyntaxKind::LessEq),
            (">=", SyntaxKind::GreaterEq),
            ("(", SyntaxKind::LParen),
            (")", SyntaxKind::RParen),
            ("{", SyntaxKind::LBrace),
            ("}", SyntaxKind::RBrace),
            ("[", SyntaxKind::LBracket),
            ("]", SyntaxKind::RBracket),
            (";", SyntaxKind::Semicolon),
            (",", SyntaxKind::Comma),
            (".", SyntaxKind::Dot),
            (":", SyntaxKind::Colon),
            ("?", SyntaxKind::Question),
            ("=", SyntaxKind::Eq),
            ("!", SyntaxKind::Bang),
            ("~", SyntaxKind::Tilde),
            ("+", SyntaxKind::Plus),
            ("-", SyntaxKind::Minus),
            ("*", SyntaxKind::Star),
            ("/", SyntaxKind::Slash),
            ("%", SyntaxKind::Percent),
            ("&", SyntaxKind::Amp),
            ("|", SyntaxKind::Pipe),
            ("^", SyntaxKind::Caret),
            ("<", SyntaxKind::Less),
            (">", SyntaxKind::Greater),
        ];

        // `?.` followed by a digit is a conditional followed by a real literal (`a ?.5 : b`).
        let rest = self.rest();
        for (text, kind) in TABLE {
            if rest.starts_with(text) {
                if *kind == SyntaxKind::QuestionDot
                    && self.nth_char(2).map_or(false, |c| c.is_ascii_digit())
                {
                    continue;
                }
                self.pos += text.len();
                return *kind;
            }
        }
        self.bump();
        SyntaxKind::Error
    }

    fn eat_quoted(&mut self, quote: char) {
        while let Some(ch) = self.peek() {
            if ch == '\n' || ch == '\r' {
                break;
            }
            self.bump();
            if ch == '\\' {
                self.bump();
            } else if ch == quote {
                break;
            }
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn nth_char(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
