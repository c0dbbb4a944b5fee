use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::{Lexer, Token, TokenType};
use crate::tree::js_number_string;
use miette::NamedSource;
use std::sync::Arc;

/// Object literals deeper than this are refused instead of recursing further.
pub const MAX_NESTING: usize = 256;

/// A tolerant recursive descent parser that recovers object literals from a
/// JavaScript or TypeScript source file.
///
/// The parser does not understand statements. It scans the token stream and
/// parses every `{` that opens a well-formed object literal. A `{` that turns
/// out to be a block is skipped and scanning resumes inside it, so literals in
/// function bodies are still found.
#[derive(Debug)]
pub struct Parser<'a> {
    source: Arc<NamedSource<String>>,
    tokens: Vec<Token>,
    position: usize,
    source_text: &'a str,
    // Token index where the nesting limit was first hit.
    too_deep: Option<usize>,
}

impl<'a> Parser<'a> {
    pub fn new(source_text: &'a str) -> Result<Self, ParserError> {
        Self::new_with_name(source_text, "tailwind.config.js".to_string())
    }

    pub fn new_with_name(source_text: &'a str, name: String) -> Result<Self, ParserError> {
        let source = Arc::new(NamedSource::new(name, source_text.to_string()));
        let mut lexer = Lexer::new(source_text);
        let tokens: Vec<Token> = lexer
            .lex()
            .into_iter()
            .filter(|t| !matches!(t.ttype, TokenType::Whitespace | TokenType::Comment(_)))
            .collect();

        let parser = Self {
            source,
            tokens,
            position: 0,
            source_text,
            too_deep: None,
        };
        parser.check_literals()?;
        parser.check_delimiters()?;
        Ok(parser)
    }

    // === Main Parsing Methods ===

    /// Document ::= { Token | Object }
    pub fn parse_document(&mut self) -> Result<ConfigDocument, ParserError> {
        let mut roots = Vec::new();
        while !self.check(TokenType::Eof) {
            if self.check(TokenType::LBrace) {
                let start = self.position;
                if let Some(object) = self.parse_object(0) {
                    roots.push(object);
                    continue;
                }
                if let Some(index) = self.too_deep {
                    return Err(self.nesting_error(index));
                }
                self.position = start;
            }
            self.advance();
        }
        log::trace!("recovered {} root object literal(s)", roots.len());
        Ok(ConfigDocument { roots })
    }

    /// Object ::= "{" [ Member { "," Member } [ "," ] ] "}"
    fn parse_object(&mut self, depth: usize) -> Option<Expr> {
        if depth > MAX_NESTING {
            self.too_deep.get_or_insert(self.position);
            return None;
        }
        let start_token = self.current_token().clone();
        self.expect(TokenType::LBrace)?;
        let mut members = Vec::new();
        while !self.check(TokenType::RBrace) {
            members.push(self.parse_member(depth)?);
            if !self.match_token(TokenType::Comma) && !self.check(TokenType::RBrace) {
                return None;
            }
        }
        let end_token = self.current_token().clone();
        self.expect(TokenType::RBrace)?;
        Some(Expr {
            kind: ExprKind::Object(members),
            pos_start: start_token.pos_start,
            pos_end: end_token.pos_end,
        })
    }

    /// Array ::= "[" [ Element { "," Element } [ "," ] ] "]"
    /// Element ::= [ "..." ] Value | <hole>
    fn parse_array(&mut self, depth: usize) -> Option<Expr> {
        if depth > MAX_NESTING {
            self.too_deep.get_or_insert(self.position);
            return None;
        }
        let start_token = self.current_token().clone();
        self.expect(TokenType::LBracket)?;
        let mut values = Vec::new();
        while !self.check(TokenType::RBracket) {
            if self.match_token(TokenType::Comma) {
                continue;
            }
            let element = if self.check(TokenType::Spread) {
                let spread_token = self.current_token().clone();
                self.advance();
                let inner = self.parse_value(depth)?;
                Expr {
                    pos_start: spread_token.pos_start,
                    pos_end: inner.pos_end,
                    kind: ExprKind::Dynamic(vec![inner]),
                }
            } else {
                self.parse_value(depth)?
            };
            values.push(element);
            if !self.match_token(TokenType::Comma) && !self.check(TokenType::RBracket) {
                return None;
            }
        }
        let end_token = self.current_token().clone();
        self.expect(TokenType::RBracket)?;
        Some(Expr {
            kind: ExprKind::Array(values),
            pos_start: start_token.pos_start,
            pos_end: end_token.pos_end,
        })
    }

    /// Member ::= "..." Value | Key ":" Value | Key "(" ... ")" "{" ... "}" | Identifier
    fn parse_member(&mut self, depth: usize) -> Option<Member> {
        if self.match_token(TokenType::Spread) {
            return self.parse_value(depth).map(Member::Spread);
        }

        let key_token = self.current_token().clone();
        let (key, shorthand_allowed) = match &key_token.ttype {
            TokenType::Identifier(name) => (Some(name.clone()), true),
            TokenType::String(name) => (Some(name.clone()), false),
            TokenType::Number(value) => (Some(js_number_string(*value)), false),
            TokenType::LBracket => (None, false),
            _ => return None,
        };
        let key_end = if key.is_some() {
            self.advance();
            key_token.pos_end
        } else {
            self.skip_balanced()?
        };

        let value = if self.match_token(TokenType::Colon) {
            self.parse_value(depth)?
        } else if self.check(TokenType::LParen) {
            self.parse_method(depth)?
        } else if shorthand_allowed
            && (self.check(TokenType::Comma) || self.check(TokenType::RBrace))
        {
            Expr {
                kind: ExprKind::Dynamic(Vec::new()),
                pos_start: key_token.pos_start,
                pos_end: key_end,
            }
        } else {
            return None;
        };

        Some(Member::Pair(Pair { key, value }))
    }

    /// Method ::= "(" ... ")" "{" ... "}"
    fn parse_method(&mut self, depth: usize) -> Option<Expr> {
        let start = self.current_token().pos_start;
        self.skip_balanced()?;
        if !self.check(TokenType::LBrace) {
            return None;
        }
        let mut body = self.parse_dynamic(depth)?;
        body.pos_start = start;
        Some(body)
    }

    /// Value ::= Object | Array | String | Number | Template | Dynamic
    ///
    /// A literal only counts when the expression ends right after it;
    /// `"a" + b` or `{ ... }.key` are dynamic.
    fn parse_value(&mut self, depth: usize) -> Option<Expr> {
        let start = self.position;
        let token = self.current_token().clone();
        let literal = match &token.ttype {
            TokenType::LBrace => self.parse_object(depth + 1),
            TokenType::LBracket => self.parse_array(depth + 1),
            TokenType::String(s) => self.literal(&token, ExprKind::String(s.clone())),
            TokenType::Number(value) => self.literal(&token, ExprKind::Number(*value)),
            TokenType::Template(Some(s)) => self.literal(&token, ExprKind::Template(s.clone())),
            _ => None,
        };
        if self.too_deep.is_some() {
            return None;
        }
        if let Some(expr) = literal {
            if self.at_value_end() {
                return Some(expr);
            }
        }
        self.position = start;
        self.parse_dynamic(depth)
    }

    fn literal(&mut self, token: &Token, kind: ExprKind) -> Option<Expr> {
        self.advance();
        Some(Expr {
            kind,
            pos_start: token.pos_start,
            pos_end: token.pos_end,
        })
    }

    /// Skips one arbitrary expression up to the next `,` or closing delimiter
    /// at its own level, keeping any object literals found on the way.
    fn parse_dynamic(&mut self, depth: usize) -> Option<Expr> {
        let start = self.position;
        let pos_start = self.current_token().pos_start;
        let mut pos_end = pos_start;
        let mut nested = Vec::new();
        let mut level = 0usize;

        loop {
            let token = self.current_token().clone();
            match token.ttype {
                TokenType::Eof => break,
                TokenType::Comma
                | TokenType::RBrace
                | TokenType::RBracket
                | TokenType::RParen
                    if level == 0 =>
                {
                    break
                }
                TokenType::Semicolon if level == 0 => return None,
                TokenType::LBrace => {
                    let save = self.position;
                    if let Some(object) = self.parse_object(depth + 1) {
                        pos_end = object.pos_end;
                        nested.push(object);
                        continue;
                    }
                    if self.too_deep.is_some() {
                        return None;
                    }
                    self.position = save;
                    level += 1;
                }
                TokenType::LBracket | TokenType::LParen => level += 1,
                TokenType::RBrace | TokenType::RBracket | TokenType::RParen => level -= 1,
                _ => {}
            }
            pos_end = token.pos_end;
            self.advance();
        }

        if self.position == start {
            return None;
        }
        Some(Expr {
            kind: ExprKind::Dynamic(nested),
            pos_start,
            pos_end,
        })
    }

    // === Tokenizer Helper Methods ===

    fn current_token(&self) -> &Token {
        // The lexer always ends the stream with Eof and `advance` never moves
        // past it.
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: TokenType) -> Option<()> {
        self.match_token(expected).then_some(())
    }

    fn match_token(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, ttype: TokenType) -> bool {
        std::mem::discriminant(&self.current_token().ttype) == std::mem::discriminant(&ttype)
    }

    fn at_value_end(&self) -> bool {
        matches!(
            self.current_token().ttype,
            TokenType::Comma
                | TokenType::RBrace
                | TokenType::RBracket
                | TokenType::RParen
                | TokenType::Eof
        )
    }

    /// Skips from an opening delimiter to just past its partner and returns
    /// the byte offset where it ended.
    fn skip_balanced(&mut self) -> Option<usize> {
        let mut level = 0usize;
        loop {
            let token = self.current_token().clone();
            match token.ttype {
                TokenType::LBrace | TokenType::LBracket | TokenType::LParen => level += 1,
                TokenType::RBrace | TokenType::RBracket | TokenType::RParen => {
                    level = level.checked_sub(1)?;
                }
                TokenType::Eof => return None,
                _ => {}
            }
            self.advance();
            if level == 0 {
                return Some(token.pos_end);
            }
        }
    }

    // === Up-front Checks ===

    fn check_literals(&self) -> Result<(), ParserError> {
        for token in &self.tokens {
            if let TokenType::Unterminated(what) = token.ttype {
                return Err(ParserError::UnterminatedLiteral {
                    src: (*self.source).clone(),
                    span: (token.pos_start, token.pos_end - token.pos_start).into(),
                    what,
                });
            }
        }
        Ok(())
    }

    fn check_delimiters(&self) -> Result<(), ParserError> {
        let mut open: Vec<&Token> = Vec::new();
        for token in &self.tokens {
            let closes = match token.ttype {
                TokenType::LBrace | TokenType::LBracket | TokenType::LParen => {
                    open.push(token);
                    continue;
                }
                TokenType::RBrace => TokenType::LBrace,
                TokenType::RBracket => TokenType::LBracket,
                TokenType::RParen => TokenType::LParen,
                _ => continue,
            };
            match open.pop() {
                Some(opener) if opener.ttype == closes => {}
                opener => {
                    let expected = match opener.map(|t| &t.ttype) {
                        Some(TokenType::LBrace) => "'}'",
                        Some(TokenType::LBracket) => "']'",
                        Some(TokenType::LParen) => "')'",
                        _ => "no closing delimiter",
                    };
                    return Err(ParserError::MismatchedDelimiter {
                        src: (*self.source).clone(),
                        span: (token.pos_start, token.pos_end - token.pos_start).into(),
                        expected: expected.to_string(),
                    });
                }
            }
        }
        if let Some(opener) = open.pop() {
            return Err(ParserError::UnclosedDelimiter {
                src: (*self.source).clone(),
                span: (opener.pos_start, opener.pos_end - opener.pos_start).into(),
            });
        }
        Ok(())
    }

    fn nesting_error(&self, index: usize) -> ParserError {
        let pos = self
            .tokens
            .get(index)
            .map_or(self.source_text.len(), |t| t.pos_start);
        ParserError::NestingTooDeep {
            src: (*self.source).clone(),
            span: (pos, 1).into(),
            limit: MAX_NESTING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Report;

    fn parse_ok(source: &str) -> ConfigDocument {
        let parsed = Parser::new_with_name(source, "test.config.js".to_string())
            .and_then(|mut parser| parser.parse_document());
        match parsed {
            Ok(doc) => doc,
            Err(err) => {
                let report = Report::new(err);
                panic!("{:?}", report);
            }
        }
    }

    fn members(expr: &Expr) -> &[Member] {
        match &expr.kind {
            ExprKind::Object(m) => m,
            other => panic!("expected object, got {other:?}"),
        }
    }

    fn pair<'e>(members: &'e [Member], key: &str) -> &'e Pair {
        members
            .iter()
            .find_map(|m| match m {
                Member::Pair(p) if p.key.as_deref() == Some(key) => Some(p),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no pair named {key}"))
    }

    #[test]
    fn test_empty_object() {
        let doc = parse_ok("module.exports = {}");
        assert_eq!(doc.roots.len(), 1);
        assert_eq!(doc.roots[0].kind, ExprKind::Object(vec![]));
    }

    #[test]
    fn test_literal_values() {
        let doc = parse_ok("x = { a: 'one', b: 2, c: `three`, 'd-e': \"four\", 5: 'five' }");
        let m = members(&doc.roots[0]);
        assert_eq!(pair(m, "a").value.kind, ExprKind::String("one".to_string()));
        assert_eq!(pair(m, "b").value.kind, ExprKind::Number(2.0));
        assert_eq!(pair(m, "c").value.kind, ExprKind::Template("three".to_string()));
        assert_eq!(pair(m, "d-e").value.kind, ExprKind::String("four".to_string()));
        assert_eq!(pair(m, "5").value.kind, ExprKind::String("five".to_string()));
    }

    #[test]
    fn test_dynamic_values() {
        let doc = parse_ok("x = { a: 'x' + y, b: `${c}px`, c: theme('colors.red'), d: -1 }");
        let m = members(&doc.roots[0]);
        for key in ["a", "b", "c", "d"] {
            assert!(
                matches!(pair(m, key).value.kind, ExprKind::Dynamic(_)),
                "{key} should be dynamic"
            );
        }
    }

    #[test]
    fn test_spread_shorthand_computed_and_method() {
        let doc = parse_ok("x = { ...base, brand, [key]: 'v', render(a) { return a }, z: 1 }");
        let m = members(&doc.roots[0]);
        assert_eq!(m.len(), 5);
        assert!(matches!(m[0], Member::Spread(_)));
        assert!(matches!(pair(m, "brand").value.kind, ExprKind::Dynamic(_)));
        assert!(matches!(&m[2], Member::Pair(p) if p.key.is_none()));
        assert!(matches!(pair(m, "render").value.kind, ExprKind::Dynamic(_)));
        assert_eq!(pair(m, "z").value.kind, ExprKind::Number(1.0));
    }

    #[test]
    fn test_objects_inside_calls_are_kept() {
        let doc = parse_ok("export default defineConfig({ theme: { colors: { a: 'b' } } })");
        assert_eq!(doc.roots.len(), 1);
        let theme = pair(members(&doc.roots[0]), "theme");
        assert!(matches!(theme.value.kind, ExprKind::Object(_)));
    }

    #[test]
    fn test_nested_object_in_dynamic_value() {
        let doc = parse_ok("x = { plugins: [plugin(({ addBase }) => { addBase({ a: 1 }); })] }");
        let plugins = pair(members(&doc.roots[0]), "plugins");
        let ExprKind::Array(items) = &plugins.value.kind else {
            panic!("plugins should be an array");
        };
        let ExprKind::Dynamic(nested) = &items[0].kind else {
            panic!("call should be dynamic");
        };
        assert_eq!(nested.len(), 2);
    }

    #[test]
    fn test_function_bodies_are_scanned() {
        let source = r#"
function build() {
  const x = 1;
  return { theme: { spacing: { 4: '1rem' } } };
}
"#;
        let doc = parse_ok(source);
        assert_eq!(doc.roots.len(), 1);
        assert!(matches!(
            pair(members(&doc.roots[0]), "theme").value.kind,
            ExprKind::Object(_)
        ));
    }

    #[test]
    fn test_typescript_annotations() {
        let source = r#"
import type { Config } from 'tailwindcss'
const config: Config = {
  content: ['./src/**/*.{ts,tsx}'],
  theme: { extend: { colors: { brand: '#123456' } } },
} satisfies Config
export default config
"#;
        let doc = parse_ok(source);
        assert_eq!(doc.roots.len(), 2);
        assert!(matches!(
            pair(members(&doc.roots[1]), "theme").value.kind,
            ExprKind::Object(_)
        ));
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let err = Parser::new("x = { a: 'oops }").unwrap_err();
        assert!(matches!(
            err,
            ParserError::UnterminatedLiteral {
                what: "string literal",
                ..
            }
        ));
    }

    #[test]
    fn test_unbalanced_delimiters_are_errors() {
        assert!(matches!(
            Parser::new("x = { a: [1, 2 }").unwrap_err(),
            ParserError::MismatchedDelimiter { .. }
        ));
        assert!(matches!(
            Parser::new("x = { a: { b: 1 }").unwrap_err(),
            ParserError::UnclosedDelimiter { .. }
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let depth = MAX_NESTING + 10;
        let source = format!("x = {}{}", "{ a: ".repeat(depth), "}".repeat(depth));
        let err = Parser::new(&source)
            .and_then(|mut parser| parser.parse_document())
            .unwrap_err();
        assert!(matches!(err, ParserError::NestingTooDeep { .. }));
    }

    #[test]
    fn test_array_nesting_limit() {
        let depth = 5_000;
        let source = format!("x = {{ a: {}{} }}", "[".repeat(depth), "]".repeat(depth));
        let err = Parser::new(&source)
            .and_then(|mut parser| parser.parse_document())
            .unwrap_err();
        assert!(matches!(err, ParserError::NestingTooDeep { .. }));

        let source = format!("x = {{ a: {}1{} }}", "[".repeat(8), "]".repeat(8));
        let document = Parser::new(&source).unwrap().parse_document().unwrap();
        assert_eq!(document.roots.len(), 1);
    }
}
