//! Token classification.
//!
//! The [`Lexer`] pulls raw strings one at a time and classifies each one under
//! the [`FlagScope`] supplied by the caller on that pull. The resolver passes
//! the command it is currently scanning, so the same raw string may classify
//! differently below and above a subcommand.

use std::collections::VecDeque;

use crate::tree::{Arity, FlagName};

/// What the lexer needs to know about the command being scanned.
pub trait FlagScope {
    /// Arity of the short flag `c`, if the scope declares one.
    fn short_arity(&self, c: char) -> Option<Arity>;

    /// Whether a numeric argument is declared, so `-5` reads as a value.
    fn numeric_in_scope(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Flag(FlagName),
    Value(String),
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Index of the raw string this token came from.
    pub position: usize,
    /// Split off a flag in the same raw string (`--out=x`, `-ox`).
    pub attached: bool,
    /// Appeared after `--`.
    pub literal: bool,
    /// A dash-prefixed string that is not a known flag.
    pub dashed: bool,
}

impl Token {
    fn new(kind: TokenKind, position: usize) -> Self {
        Self {
            kind,
            position,
            attached: false,
            literal: false,
            dashed: false,
        }
    }

    fn value(text: impl Into<String>, position: usize) -> Self {
        Self::new(TokenKind::Value(text.into()), position)
    }

    fn attached_value(text: impl Into<String>, position: usize) -> Self {
        Self {
            attached: true,
            ..Self::value(text, position)
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self.kind, TokenKind::Flag(_))
    }

    pub fn as_value(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Value(text) => Some(text),
            _ => None,
        }
    }

    /// A value that may be consumed by a preceding flag, dashed ones included.
    pub fn is_plain_value(&self) -> bool {
        matches!(self.kind, TokenKind::Value(_)) && !self.attached
    }
}

/// Strings such as `-5`, `-1.5` or `-2e3`.
pub fn looks_like_negative_number(raw: &str) -> bool {
    let Some(rest) = raw.strip_prefix('-') else {
        return false;
    };
    rest.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && rest.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Lazy, restartable classifier over a borrowed argument vector.
#[derive(Debug)]
pub struct Lexer<'a, S: AsRef<str> = String> {
    argv: &'a [S],
    next: usize,
    pending: VecDeque<Token>,
    after_separator: bool,
}

impl<'a, S: AsRef<str>> Lexer<'a, S> {
    pub fn new(argv: &'a [S]) -> Self {
        Self {
            argv,
            next: 0,
            pending: VecDeque::new(),
            after_separator: false,
        }
    }

    /// Start over from the first raw string.
    pub fn reset(&mut self) {
        self.next = 0;
        self.pending.clear();
        self.after_separator = false;
    }

    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty() && self.next >= self.argv.len()
    }

    pub fn peek(&mut self, scope: &dyn FlagScope) -> Option<&Token> {
        if self.pending.is_empty() {
            self.fill(scope);
        }
        self.pending.front()
    }

    pub fn next_token(&mut self, scope: &dyn FlagScope) -> Option<Token> {
        if self.pending.is_empty() {
            self.fill(scope);
        }
        self.pending.pop_front()
    }

    /// Pull the next token only when `accept` approves it.
    pub fn next_if(
        &mut self,
        scope: &dyn FlagScope,
        accept: impl FnOnce(&Token) -> bool,
    ) -> Option<Token> {
        let take = self.peek(scope).is_some_and(accept);
        if take { self.pending.pop_front() } else { None }
    }

    /// Hand out every raw string not classified yet, with its position.
    ///
    /// Tokens already split from the current raw string stay queued.
    pub fn take_raw_rest(&mut self) -> Vec<(usize, String)> {
        let start = self.next.min(self.argv.len());
        self.next = self.argv.len();
        self.argv[start..]
            .iter()
            .enumerate()
            .map(|(i, raw)| (start + i, raw.as_ref().to_string()))
            .collect()
    }

    fn fill(&mut self, scope: &dyn FlagScope) {
        let argv = self.argv;
        let Some(raw) = argv.get(self.next) else {
            return;
        };
        let position = self.next;
        self.next += 1;
        let raw = raw.as_ref();

        if self.after_separator {
            self.pending.push_back(Token {
                literal: true,
                ..Token::value(raw, position)
            });
            return;
        }

        if raw == "--" {
            self.after_separator = true;
            self.pending
                .push_back(Token::new(TokenKind::Separator, position));
            return;
        }

        if let Some(long) = raw.strip_prefix("--") {
            let (name, value) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };
            if name.is_empty() {
                self.pending.push_back(Token {
                    dashed: true,
                    ..Token::value(raw, position)
                });
            } else {
                self.pending.push_back(Token::new(
                    TokenKind::Flag(FlagName::Long(name.to_string())),
                    position,
                ));
                if let Some(value) = value {
                    self.pending
                        .push_back(Token::attached_value(value, position));
                }
            }
            tracing::trace!(position, raw, "long flag");
            return;
        }

        if let Some(shorts) = raw.strip_prefix('-') {
            let mut chars = shorts.char_indices();
            if let Some((_, first)) = chars.next() {
                if scope.short_arity(first).is_some() {
                    self.expand_bundle(shorts, position, scope);
                    return;
                }
                let numeric = looks_like_negative_number(raw) && scope.numeric_in_scope();
                self.pending.push_back(Token {
                    dashed: !numeric,
                    ..Token::value(raw, position)
                });
                return;
            }
        }

        self.pending.push_back(Token::value(raw, position));
    }

    fn expand_bundle(&mut self, shorts: &str, position: usize, scope: &dyn FlagScope) {
        let mut iter = shorts.char_indices().peekable();
        while let Some((idx, c)) = iter.next() {
            if c == '=' {
                // Only reached after a zero-arity flag; the rest belongs to it.
                let rest = &shorts[idx + c.len_utf8()..];
                self.pending
                    .push_back(Token::attached_value(rest, position));
                break;
            }

            self.pending.push_back(Token::new(
                TokenKind::Flag(FlagName::Short(c)),
                position,
            ));

            let takes_values = scope.short_arity(c).is_some_and(|a| a.takes_values());
            if takes_values {
                let rest = &shorts[idx + c.len_utf8()..];
                let rest = rest.strip_prefix('=').unwrap_or(rest);
                if !rest.is_empty() || shorts[idx + c.len_utf8()..].starts_with('=') {
                    self.pending
                        .push_back(Token::attached_value(rest, position));
                }
                break;
            }
        }
        tracing::trace!(position, bundle = shorts, "short flags");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyScope;

    impl FlagScope for EmptyScope {
        fn short_arity(&self, _c: char) -> Option<Arity> {
            None
        }

        fn numeric_in_scope(&self) -> bool {
            false
        }
    }

    fn tokenize(argv: &[&str], scope: &dyn FlagScope) -> Vec<Token> {
        let mut lexer = Lexer::new(argv);
        std::iter::from_fn(|| lexer.next_token(scope)).collect()
    }

    struct Shorts(&'static [(char, Arity)], bool);

    impl FlagScope for Shorts {
        fn short_arity(&self, c: char) -> Option<Arity> {
            self.0.iter().find(|(s, _)| *s == c).map(|(_, a)| *a)
        }

        fn numeric_in_scope(&self) -> bool {
            self.1
        }
    }

    const ABC: Shorts = Shorts(
        &[
            ('a', Arity::NONE),
            ('b', Arity::NONE),
            ('c', Arity::exactly(1)),
        ],
        false,
    );

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind.clone()).collect()
    }

    fn short(c: char) -> TokenKind {
        TokenKind::Flag(FlagName::Short(c))
    }

    fn value(s: &str) -> TokenKind {
        TokenKind::Value(s.to_string())
    }

    #[test]
    fn long_flags_split_on_equals() {
        let tokens = tokenize(&["--out=dir", "--verbose", "--=x"], &EmptyScope);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Flag(FlagName::Long("out".into())),
                value("dir"),
                TokenKind::Flag(FlagName::Long("verbose".into())),
                value("--=x"),
            ]
        );
        assert!(tokens[1].attached);
        assert_eq!(tokens[1].position, 0);
        assert!(tokens[3].dashed);
    }

    #[test]
    fn separator_makes_everything_literal() {
        let tokens = tokenize(&["a", "--", "-a", "--", "--long"], &ABC);
        assert_eq!(tokens[1].kind, TokenKind::Separator);
        assert!(tokens[2..].iter().all(|t| t.literal && t.as_value().is_some()));
        assert_eq!(tokens[3].as_value(), Some("--"));
        assert!(!tokens[0].literal);
    }

    #[test]
    fn bundles_expand_in_order() {
        let tokens = tokenize(&["-abc", "x"], &ABC);
        assert_eq!(
            kinds(&tokens),
            vec![short('a'), short('b'), short('c'), value("x")]
        );
        assert!(!tokens[3].attached);
    }

    #[test]
    fn value_taking_flag_swallows_rest_of_bundle() {
        let tokens = tokenize(&["-acfile", "-c=x"], &ABC);
        assert_eq!(
            kinds(&tokens),
            vec![short('a'), short('c'), value("file"), short('c'), value("x")]
        );
        assert!(tokens[2].attached && tokens[4].attached);
    }

    #[test]
    fn equals_after_switch_attaches_to_it() {
        let tokens = tokenize(&["-a=yes"], &ABC);
        assert_eq!(kinds(&tokens), vec![short('a'), value("yes")]);
        assert!(tokens[1].attached);
    }

    #[test]
    fn unknown_chars_inside_bundle_stay_flags() {
        let tokens = tokenize(&["-azb"], &ABC);
        assert_eq!(kinds(&tokens), vec![short('a'), short('z'), short('b')]);
    }

    #[test]
    fn unknown_dash_strings_are_dashed_values() {
        let tokens = tokenize(&["-z", "-", "-5"], &ABC);
        assert_eq!(kinds(&tokens), vec![value("-z"), value("-"), value("-5")]);
        assert!(tokens[0].dashed);
        assert!(!tokens[1].dashed);
        assert!(tokens[2].dashed);
        assert!(tokens[0].is_plain_value());
    }

    #[test]
    fn negative_numbers_are_values_in_numeric_scope() {
        let numeric = Shorts(&[('a', Arity::NONE)], true);
        let tokens = tokenize(&["-5", "-1.5", "-2e3", "-x"], &numeric);
        assert!(!tokens[0].dashed && !tokens[1].dashed && !tokens[2].dashed);
        assert!(tokens[3].dashed);

        // A declared short digit flag wins over the number reading.
        let digit = Shorts(&[('5', Arity::NONE)], true);
        let tokens = tokenize(&["-5"], &digit);
        assert_eq!(kinds(&tokens), vec![short('5')]);
    }

    #[test]
    fn scope_is_consulted_per_pull() {
        let argv = ["-a", "-a"];
        let mut lexer = Lexer::new(&argv);
        let first = lexer.next_token(&ABC).unwrap();
        let second = lexer.next_token(&EmptyScope).unwrap();
        assert_eq!(first.kind, short('a'));
        assert_eq!(second.kind, value("-a"));
        assert!(lexer.next_token(&ABC).is_none());

        lexer.reset();
        assert_eq!(lexer.next_token(&ABC).unwrap().kind, short('a'));
    }

    #[test]
    fn raw_rest_is_verbatim() {
        let argv = ["x", "--", "-a", "sub"];
        let mut lexer = Lexer::new(&argv);
        lexer.next_token(&ABC);
        assert_eq!(
            lexer.take_raw_rest(),
            vec![
                (1, "--".to_string()),
                (2, "-a".to_string()),
                (3, "sub".to_string())
            ]
        );
        assert!(lexer.is_exhausted());
    }

    #[test]
    fn negative_number_detection() {
        assert!(looks_like_negative_number("-5"));
        assert!(looks_like_negative_number("-.5"));
        assert!(looks_like_negative_number("-2e3"));
        assert!(!looks_like_negative_number("-inf"));
        assert!(!looks_like_negative_number("-"));
        assert!(!looks_like_negative_number("5"));
    }
}
