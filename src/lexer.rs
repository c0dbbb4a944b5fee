/// Represents the different kinds of tokens the lexer produces for a
/// JavaScript or TypeScript configuration file.
///
/// The lexer only needs to be faithful enough to recover object-literal
/// structure, so operators that never matter for that are folded into
/// [`TokenType::Punct`].
#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    // == Special Tokens ==
    /// Represents the end of the input file.
    Eof,
    /// A run of whitespace characters.
    Whitespace,
    /// A `//` line comment or a `/* */` block comment, trimmed.
    Comment(String),
    /// A literal that reached the end of input before it was closed.
    /// The payload names what was left open (`"string"`, `"template literal"`, ...).
    Unterminated(&'static str),

    // == Literals ==
    /// An identifier or keyword. Examples: `module`, `theme`, `$primary`.
    Identifier(String),
    /// A single- or double-quoted string literal, with escapes processed.
    String(String),
    /// A numeric literal, already converted to its value.
    Number(f64),
    /// A template literal. Holds the static text when the template has no
    /// `${...}` interpolation, `None` otherwise.
    Template(Option<String>),
    /// A regular expression literal such as `/\.tsx?$/i`.
    Regex(String),

    // == Punctuation ==
    /// Left Brace: `{`
    LBrace,
    /// Right Brace: `}`
    RBrace,
    /// Left Bracket: `[`
    LBracket,
    /// Right Bracket: `]`
    RBracket,
    /// Left Parenthesis: `(`
    LParen,
    /// Right Parenthesis: `)`
    RParen,
    /// Comma: `,`
    Comma,
    /// Colon: `:`
    Colon,
    /// Semicolon: `;`
    Semicolon,
    /// Dot: `.`
    Dot,
    /// Spread: `...`
    Spread,
    /// Arrow: `=>`
    Arrow,
    /// Any other operator character (`=`, `+`, `?`, `<`, `/`, ...).
    Punct(char),
}

impl TokenType {
    /// Whether a `/` following this token starts a regex literal rather than
    /// a division.
    fn allows_regex_after(&self) -> bool {
        !matches!(
            self,
            TokenType::Identifier(_)
                | TokenType::String(_)
                | TokenType::Number(_)
                | TokenType::Template(_)
                | TokenType::Regex(_)
                | TokenType::RParen
                | TokenType::RBracket
                | TokenType::RBrace
        )
    }
}

/// A token with its type and byte position
#[derive(Debug, Clone)]
pub struct Token {
    pub ttype: TokenType,
    pub pos_start: usize,
    pub pos_end: usize,
}

impl Token {
    pub fn new(ttype: TokenType, pos_start: usize, pos_end: usize) -> Token {
        Token {
            ttype,
            pos_start,
            pos_end,
        }
    }
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    position: usize,
    last_significant: Option<TokenType>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
            last_significant: None,
        }
    }

    pub fn lex(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if token.ttype == TokenType::Eof {
                tokens.push(token);
                break;
            }
            if !matches!(token.ttype, TokenType::Whitespace | TokenType::Comment(_)) {
                self.last_significant = Some(token.ttype.clone());
            }
            tokens.push(token);
        }
        tokens
    }

    pub fn next_token(&mut self) -> Token {
        let start_pos = self.position;

        let ttype = if let Some(char) = self.advance() {
            match char {
                '{' => TokenType::LBrace,
                '}' => TokenType::RBrace,
                '[' => TokenType::LBracket,
                ']' => TokenType::RBracket,
                '(' => TokenType::LParen,
                ')' => TokenType::RParen,
                ',' => TokenType::Comma,
                ':' => TokenType::Colon,
                ';' => TokenType::Semicolon,
                '=' => {
                    if self.peek() == Some(&'>') {
                        self.advance();
                        TokenType::Arrow
                    } else {
                        TokenType::Punct('=')
                    }
                }
                '.' => {
                    if self.peek().is_some_and(char::is_ascii_digit) {
                        self.read_number('.')
                    } else if self.peek() == Some(&'.') && self.peek_second() == Some('.') {
                        self.advance();
                        self.advance();
                        TokenType::Spread
                    } else {
                        TokenType::Dot
                    }
                }
                '/' => match self.peek().copied() {
                    Some('/') => self.read_line_comment(),
                    Some('*') => self.read_block_comment(),
                    _ if self.regex_allowed() => self.read_regex(),
                    _ => TokenType::Punct('/'),
                },
                '"' | '\'' => self.read_string(char),
                '`' => self.read_template(),
                c if c.is_whitespace() => self.read_whitespace(),
                c if is_identifier_start(c) => self.read_identifier(c),
                c if c.is_ascii_digit() => self.read_number(c),
                c => TokenType::Punct(c),
            }
        } else {
            TokenType::Eof
        };

        Token::new(ttype, start_pos, self.position)
    }

    fn advance(&mut self) -> Option<char> {
        let char = self.chars.next();
        if let Some(c) = char {
            self.position += c.len_utf8();
        }
        char
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn peek_second(&self) -> Option<char> {
        self.chars.clone().nth(1)
    }

    fn regex_allowed(&self) -> bool {
        self.last_significant
            .as_ref()
            .is_none_or(TokenType::allows_regex_after)
    }

    fn read_whitespace(&mut self) -> TokenType {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
        TokenType::Whitespace
    }

    fn read_line_comment(&mut self) -> TokenType {
        self.advance(); // Consume the second '/'
        let mut comment_text = String::new();
        while let Some(&c) = self.peek() {
            if c == '\n' {
                break;
            }
            comment_text.push(c);
            self.advance();
        }
        TokenType::Comment(comment_text.trim().to_string())
    }

    fn read_block_comment(&mut self) -> TokenType {
        self.advance(); // Consume the '*'
        let mut comment_text = String::new();
        while let Some(c) = self.advance() {
            if c == '*' && self.peek() == Some(&'/') {
                self.advance();
                return TokenType::Comment(comment_text.trim().to_string());
            }
            comment_text.push(c);
        }
        TokenType::Unterminated("block comment")
    }

    fn read_string(&mut self, quote: char) -> TokenType {
        let mut value = String::new();
        while let Some(c) = self.advance() {
            if c == quote {
                return TokenType::String(value);
            }
            match c {
                '\\' => match self.advance() {
                    Some(escaped) => self.read_escape(&mut value, escaped),
                    None => break,
                },
                '\n' => return TokenType::Unterminated("string literal"),
                _ => value.push(c),
            }
        }
        TokenType::Unterminated("string literal")
    }

    /// Reads a template literal after its opening backtick. Interpolations are
    /// skipped, including any strings or templates nested inside them.
    fn read_template(&mut self) -> TokenType {
        let mut value = String::new();
        let mut interpolated = false;
        while let Some(c) = self.advance() {
            match c {
                '`' => return TokenType::Template((!interpolated).then_some(value)),
                '\\' => match self.advance() {
                    Some(escaped) => self.read_escape(&mut value, escaped),
                    None => break,
                },
                '$' if self.peek() == Some(&'{') => {
                    self.advance();
                    interpolated = true;
                    if !self.skip_interpolation() {
                        break;
                    }
                }
                _ => value.push(c),
            }
        }
        TokenType::Unterminated("template literal")
    }

    /// Consumes the body of a `${...}` up to and including its closing brace.
    /// Returns `false` when input ends first.
    fn skip_interpolation(&mut self) -> bool {
        let mut depth = 1usize;
        while let Some(c) = self.advance() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                '"' | '\'' => {
                    if matches!(self.read_string(c), TokenType::Unterminated(_)) {
                        return false;
                    }
                }
                '`' => {
                    if matches!(self.read_template(), TokenType::Unterminated(_)) {
                        return false;
                    }
                }
                _ => {}
            }
        }
        false
    }

    fn read_regex(&mut self) -> TokenType {
        let mut body = String::new();
        let mut in_class = false;
        while let Some(c) = self.advance() {
            match c {
                '\\' => {
                    body.push(c);
                    match self.advance() {
                        Some(escaped) => body.push(escaped),
                        None => break,
                    }
                }
                '[' => {
                    in_class = true;
                    body.push(c);
                }
                ']' => {
                    in_class = false;
                    body.push(c);
                }
                '/' if !in_class => {
                    while self.peek().is_some_and(char::is_ascii_alphabetic) {
                        self.advance();
                    }
                    return TokenType::Regex(body);
                }
                '\n' => break,
                _ => body.push(c),
            }
        }
        TokenType::Unterminated("regular expression")
    }

    fn read_identifier(&mut self, first_char: char) -> TokenType {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(&c) = self.peek() {
            if is_identifier_part(c) {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        TokenType::Identifier(ident)
    }

    fn read_number(&mut self, first_char: char) -> TokenType {
        let mut raw = String::new();
        raw.push(first_char);

        if first_char == '0' {
            let radix = match self.peek() {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                if let Some(marker) = self.advance() {
                    raw.push(marker);
                }
                let mut digits = String::new();
                while let Some(&c) = self.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        raw.push(c);
                        if c != '_' {
                            digits.push(c);
                        }
                        self.advance();
                    } else {
                        break;
                    }
                }
                return match u64::from_str_radix(&digits, radix) {
                    Ok(value) => TokenType::Number(value as f64),
                    Err(_) => TokenType::Punct(first_char),
                };
            }
        }

        let mut has_dot = first_char == '.';
        let mut has_exponent = false;
        while let Some(&c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                raw.push(c);
                self.advance();
            } else if c == '.' && !has_dot && !has_exponent {
                has_dot = true;
                raw.push(c);
                self.advance();
            } else if (c == 'e' || c == 'E') && !has_exponent {
                has_exponent = true;
                raw.push(c);
                self.advance();
                if let Some(&sign) = self.peek() {
                    if sign == '+' || sign == '-' {
                        raw.push(sign);
                        self.advance();
                    }
                }
            } else {
                break;
            }
        }
        // BigInt suffix
        if self.peek() == Some(&'n') {
            self.advance();
        }

        match raw.replace('_', "").parse::<f64>() {
            Ok(value) => TokenType::Number(value),
            Err(_) => TokenType::Punct(first_char),
        }
    }

    /// Appends the character a backslash escape stands for. A malformed `\x`
    /// or `\u` escape keeps its letter and the text after it is read as is.
    fn read_escape(&mut self, value: &mut String, escaped: char) {
        match escaped {
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            't' => value.push('\t'),
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'v' => value.push('\u{b}'),
            '0' => value.push('\0'),
            'x' => match self.read_hex(2) {
                Some(code) => value.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)),
                None => value.push('x'),
            },
            'u' => match self.read_unicode_escape() {
                Some(c) => value.push(c),
                None => value.push('u'),
            },
            // Line continuation
            '\n' => {}
            other => value.push(other),
        }
    }

    /// Reads the digits of a `\uXXXX` or `\u{...}` escape. A high surrogate
    /// followed by a `\uXXXX` low surrogate is combined into one character.
    fn read_unicode_escape(&mut self) -> Option<char> {
        let code = if self.peek() == Some(&'{') {
            self.read_braced_code_point()?
        } else {
            self.read_hex(4)?
        };
        if (0xD800..0xDC00).contains(&code) {
            let mut ahead = self.chars.clone();
            if ahead.next() == Some('\\') && ahead.next() == Some('u') {
                let digits: String = ahead.take(4).collect();
                if let Some(low) = hex_value(&digits, 4).filter(|low| (0xDC00..0xE000).contains(low)) {
                    for _ in 0..6 {
                        self.advance();
                    }
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined);
                }
            }
        }
        Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn read_braced_code_point(&mut self) -> Option<u32> {
        let digits: String = self
            .chars
            .clone()
            .skip(1)
            .take_while(|c| c.is_ascii_hexdigit())
            .collect();
        let closed = self.chars.clone().nth(digits.len() + 1) == Some('}');
        if !closed || digits.is_empty() {
            return None;
        }
        let code = u32::from_str_radix(&digits, 16).ok().filter(|&code| code <= 0x10FFFF)?;
        for _ in 0..digits.len() + 2 {
            self.advance();
        }
        Some(code)
    }

    /// Consumes exactly `count` hex digits, or nothing if they are not there.
    fn read_hex(&mut self, count: usize) -> Option<u32> {
        let digits: String = self.chars.clone().take(count).collect();
        let code = hex_value(&digits, count)?;
        for _ in 0..count {
            self.advance();
        }
        Some(code)
    }
}

fn hex_value(digits: &str, count: usize) -> Option<u32> {
    if digits.len() != count || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}


fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
