use std::collections::BTreeSet;
use std::iter::{Enumerate, Peekable};
use std::{fmt, str};
use self::Regex::*;

/// A regular expression over `char`.
#[derive(PartialOrd, Ord, PartialEq, Eq, Debug, Clone)]
pub enum Regex {
    /// The empty string (matches exactly "").
    Epsilon,
    /// Matches exactly one character.
    Literal(char),
    /// Concatenation. Matches the left regex followed by the right one.
    Concat(Box<Regex>, Box<Regex>),
    /// Alternation. Matches any string matched by either side.
    Union(Box<Regex>, Box<Regex>),
    /// Kleene closure. Matches zero or more repetitions of the contained regex.
    Star(Box<Regex>),
    /// Matches one or more repetitions of the contained regex.
    Plus(Box<Regex>),
    /// Matches the contained regex or the empty string.
    Optional(Box<Regex>),
}

/*
Char : NORMAL
     : '\' CHAR
Atom : Char
     : '(' Alt ')'
Repeat : Atom
       : Repeat '*'
       : Repeat '+'
       : Repeat '?'
Cat :
    : Repeat Cat
Alt : Cat
    : Alt '|' Cat
*/
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    UnexpectedEof(&'static str),
    UnexpectedChar(&'static str, char, usize),
    UnmatchedParen(usize),
}

impl ParseError {
    /// Character position the error refers to, if any.
    pub fn position(&self) -> Option<usize> {
        match *self {
            ParseError::UnexpectedEof(_) => None,
            ParseError::UnexpectedChar(_, _, pos) | ParseError::UnmatchedParen(pos) => Some(pos),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::UnexpectedEof(s) => write!(f, "syntax error: {}", s),
            ParseError::UnexpectedChar(s, c, pos) => {
                write!(f, "syntax error: {}: `{}` at position {}", s, c.escape_default(), pos)
            }
            ParseError::UnmatchedParen(pos) => {
                write!(f, "syntax error: unmatched '(' at position {}", pos)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Characters that belong to regex syntax this crate does not implement.
const RESERVED: [char; 7] = ['.', '[', ']', '{', '}', '^', '$'];

struct Parser<I: Iterator<Item = char>> {
    it: Peekable<Enumerate<I>>,
}

type Res<T> = Result<T, ParseError>;

impl<I: Iterator<Item = char>> Parser<I> {
    fn peek(&mut self) -> Option<char> {
        self.it.peek().map(|&(_, c)| c)
    }

    fn char(&mut self) -> Res<char> {
        match self.it.next() {
            Some((_, '\\')) => match self.it.next() {
                Some((_, 'r')) => Ok('\r'),
                Some((_, 'n')) => Ok('\n'),
                Some((_, 't')) => Ok('\t'),
                Some((_, c)) => Ok(c),
                None => Err(ParseError::UnexpectedEof("unfollowed '\\'")),
            },
            Some((pos, c)) if c.is_whitespace() || c.is_control() => {
                Err(ParseError::UnexpectedChar("whitespace or control character", c, pos))
            }
            Some((pos, c)) if RESERVED.contains(&c) => {
                Err(ParseError::UnexpectedChar("unsupported metacharacter", c, pos))
            }
            Some((_, c)) => Ok(c),
            None => Err(ParseError::UnexpectedEof("expected a character")),
        }
    }

    fn atom_first(c: char) -> bool {
        c != '|' && c != ')' && !Self::postfix(c)
    }

    fn postfix(c: char) -> bool {
        c == '*' || c == '+' || c == '?'
    }

    fn stray(c: char, pos: usize) -> ParseError {
        if Self::postfix(c) {
            ParseError::UnexpectedChar("repetition operator without operand", c, pos)
        } else if c == ')' {
            ParseError::UnexpectedChar("unmatched ')'", c, pos)
        } else {
            ParseError::UnexpectedChar("unexpected character", c, pos)
        }
    }

    fn atom(&mut self) -> Res<Regex> {
        match self.it.peek() {
            Some(&(pos, '(')) => {
                self.it.next();
                let r = self.alt()?;
                match self.it.next() {
                    Some((_, ')')) => Ok(r),
                    Some((p, c)) => Err(Self::stray(c, p)),
                    None => Err(ParseError::UnmatchedParen(pos)),
                }
            }
            Some(_) => Ok(Literal(self.char()?)),
            None => Err(ParseError::UnexpectedEof("expected an atom")),
        }
    }

    fn repeat(&mut self) -> Res<Regex> {
        let mut r = self.atom()?;
        loop {
            match self.peek() {
                Some('*') => r = Star(Box::new(r)),
                Some('+') => r = Plus(Box::new(r)),
                Some('?') => r = Optional(Box::new(r)),
                _ => break,
            }
            self.it.next();
        }
        Ok(r)
    }

    fn cat(&mut self) -> Res<Regex> {
        let mut r: Option<Regex> = None;
        loop {
            match self.peek() {
                Some(c) if Self::atom_first(c) => {
                    let next = self.repeat()?;
                    r = Some(match r {
                        Some(prev) => Concat(Box::new(prev), Box::new(next)),
                        None => next,
                    });
                }
                _ => break,
            }
        }
        Ok(r.unwrap_or(Epsilon))
    }

    fn alt(&mut self) -> Res<Regex> {
        let mut r = self.cat()?;
        while let Some('|') = self.peek() {
            self.it.next();
            r = Union(Box::new(r), Box::new(self.cat()?));
        }
        Ok(r)
    }

    fn parse(it: I) -> Res<Regex> {
        let mut parser = Parser { it: it.enumerate().peekable() };
        let r = parser.alt()?;
        match parser.it.next() {
            None => Ok(r),
            Some((pos, c)) => Err(Self::stray(c, pos)),
        }
    }
}

impl str::FromStr for Regex {
    type Err = ParseError;
    /// Parse a string as a regular expression.
    fn from_str(s: &str) -> Result<Regex, ParseError> {
        Parser::parse(s.chars())
    }
}

impl Regex {
    /// Tests whether a regular expression is nullable, i.e. whether it matches
    /// the empty string.
    pub fn nullable(&self) -> bool {
        match *self {
            Epsilon => true,
            Literal(_) => false,
            Concat(ref l, ref r) => l.nullable() && r.nullable(),
            Union(ref l, ref r) => l.nullable() || r.nullable(),
            Star(_) | Optional(_) => true,
            Plus(ref x) => x.nullable(),
        }
    }

    /// Collects the literal symbols, in order of first occurrence.
    pub fn alphabet(&self) -> Alphabet {
        fn go(re: &Regex, out: &mut Alphabet) {
            match *re {
                Epsilon => {}
                Literal(c) => out.insert(c),
                Concat(ref l, ref r) | Union(ref l, ref r) => {
                    go(l, out);
                    go(r, out);
                }
                Star(ref x) | Plus(ref x) | Optional(ref x) => go(x, out),
            }
        }
        let mut out = Alphabet::default();
        go(self, &mut out);
        out
    }
}

/// The distinct literal symbols of an expression.
///
/// Iteration through [`Alphabet::symbols`] is in ascending code point order,
/// which is the order used for construction and rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alphabet {
    sorted: BTreeSet<char>,
    first_seen: Vec<char>,
}

impl Alphabet {
    pub fn insert(&mut self, c: char) {
        if self.sorted.insert(c) {
            self.first_seen.push(c);
        }
    }

    pub fn contains(&self, c: char) -> bool {
        self.sorted.contains(&c)
    }

    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.sorted.iter().copied()
    }

    pub fn in_order_of_appearance(&self) -> &[char] {
        &self.first_seen
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}

impl FromIterator<char> for Alphabet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        let mut a = Alphabet::default();
        for c in iter {
            a.insert(c);
        }
        a
    }
}
