//! Minimal s-expression reader for PDDL text.

/// A parsed s-expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SExpr {
    /// A bare token, lower-cased
    Atom(String),
    /// A parenthesised list
    List(Vec<SExpr>),
}

impl SExpr {
    /// Returns the atom text, if this is an atom.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExpr::Atom(s) => Some(s),
            SExpr::List(_) => None,
        }
    }

    /// Returns the list items, if this is a list.
    pub fn as_list(&self) -> Option<&[SExpr]> {
        match self {
            SExpr::List(items) => Some(items),
            SExpr::Atom(_) => None,
        }
    }

    /// Returns the head atom of a list, if any.
    pub fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_atom()
    }

    /// Parses every top-level expression in `text`.
    ///
    /// `;` starts a comment that runs to the end of the line.
    ///
    /// # Examples
    ///
    /// ```
    /// use questmaster_core::SExpr;
    ///
    /// let exprs = SExpr::parse_all("(at Hero cave) ; comment\n(free)").unwrap();
    /// assert_eq!(exprs.len(), 2);
    /// assert_eq!(exprs[0].head(), Some("at"));
    /// ```
    pub fn parse_all(text: &str) -> Result<Vec<SExpr>, String> {
        let tokens = tokenize(text);
        let mut pos = 0;
        let mut out = Vec::new();
        while pos < tokens.len() {
            out.push(read(&tokens, &mut pos)?);
        }
        Ok(out)
    }

    /// Parses exactly one expression.
    pub fn parse_one(text: &str) -> Result<SExpr, String> {
        let mut all = Self::parse_all(text)?;
        match all.len() {
            1 => Ok(all.remove(0)),
            0 => Err("empty expression".to_string()),
            n => Err(format!("expected one expression, found {}", n)),
        }
    }
}

impl std::fmt::Display for SExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SExpr::Atom(s) => write!(f, "{}", s),
            SExpr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Atom(String),
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '(' => {
                tokens.push(Token::Open);
                chars.next();
            }
            ')' => {
                tokens.push(Token::Close);
                chars.next();
            }
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut atom = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '(' || c == ')' || c == ';' || c.is_whitespace() {
                        break;
                    }
                    atom.push(c);
                    chars.next();
                }
                tokens.push(Token::Atom(atom.to_lowercase()));
            }
        }
    }
    tokens
}

fn read(tokens: &[Token], pos: &mut usize) -> Result<SExpr, String> {
    match tokens.get(*pos) {
        None => Err("unexpected end of input".to_string()),
        Some(Token::Close) => Err("unexpected ')'".to_string()),
        Some(Token::Atom(a)) => {
            *pos += 1;
            Ok(SExpr::Atom(a.clone()))
        }
        Some(Token::Open) => {
            *pos += 1;
            let mut items = Vec::new();
            loop {
                match tokens.get(*pos) {
                    None => return Err("unbalanced '(': missing ')'".to_string()),
                    Some(Token::Close) => {
                        *pos += 1;
                        return Ok(SExpr::List(items));
                    }
                    Some(_) => items.push(read(tokens, pos)?),
                }
            }
        }
    }
}
