//! Malloy tokens - the atomic units of written queries.

use std::sync::LazyLock;

use regex::Regex;

use super::WriterOptions;

static PLAIN_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

/// Words that must be backquoted when used as a name.
const RESERVED: &[&str] = &[
    "all", "and", "as", "asc", "avg", "boolean", "by", "case", "cast", "count", "date", "day",
    "days", "desc", "distinct", "else", "end", "exclude", "extend", "false", "from", "full",
    "has", "hour", "hours", "import", "inner", "is", "join", "left", "max", "min", "minute",
    "minutes", "month", "months", "not", "now", "null", "number", "on", "or", "pick", "quarter",
    "quarters", "right", "second", "seconds", "source", "string", "sum", "then", "this",
    "timestamp", "to", "true", "week", "weeks", "when", "with", "year", "years",
];

/// Backquote `name` unless it is a plain, unreserved identifier.
pub fn quote_identifier(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if PLAIN_IDENTIFIER.is_match(name) && !RESERVED.contains(&lower.as_str()) {
        name.to_string()
    } else {
        format!("`{}`", name)
    }
}

/// Malloy token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Statements ===
    Run,
    Query,
    View,
    Import,
    GroupBy,
    Aggregate,
    Nest,
    Select,
    Where,
    Having,
    OrderBy,
    Limit,

    // === Keywords ===
    Is,
    Asc,
    Desc,

    // === Punctuation ===
    Colon,
    Comma,
    Arrow,
    LBrace,
    RBrace,

    // === Whitespace / Formatting ===
    Space,
    Newline,
    Indent(usize),

    // === Dynamic Content ===
    /// A field, query or source name.
    Ident(String),
    /// Dotted field path; every segment is quoted on its own.
    Path(String),
    LitInt(u64),
    /// Double-quoted string (import paths).
    LitString(String),
    /// `# tag` annotation line content.
    Annotation(String),
    /// Expression text produced by the compiler, written as-is.
    Code(String),
    /// Text outside the language (markdown fences).
    Raw(String),
}

impl Token {
    pub fn serialize(&self, options: &WriterOptions) -> String {
        match self {
            Token::Run => "run".into(),
            Token::Query => "query".into(),
            Token::View => "view".into(),
            Token::Import => "import".into(),
            Token::GroupBy => "group_by".into(),
            Token::Aggregate => "aggregate".into(),
            Token::Nest => "nest".into(),
            Token::Select => "select".into(),
            Token::Where => "where".into(),
            Token::Having => "having".into(),
            Token::OrderBy => "order_by".into(),
            Token::Limit => "limit".into(),

            Token::Is => "is".into(),
            Token::Asc => "asc".into(),
            Token::Desc => "desc".into(),

            Token::Colon => ":".into(),
            Token::Comma => ",".into(),
            Token::Arrow => "->".into(),
            Token::LBrace => "{".into(),
            Token::RBrace => "}".into(),

            Token::Space => " ".into(),
            Token::Newline => "\n".into(),
            Token::Indent(n) => " ".repeat(n * options.indent_width),

            Token::Ident(name) => quote_identifier(name),
            Token::Path(path) => path
                .split('.')
                .map(quote_identifier)
                .collect::<Vec<_>>()
                .join("."),
            Token::LitInt(n) => n.to_string(),
            Token::LitString(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Token::Annotation(tag) => format!("# {}", tag),
            Token::Code(code) => code.clone(),
            Token::Raw(text) => text.clone(),
        }
    }
}

/// A stream of tokens that can be serialized to Malloy text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn serialize(&self, options: &WriterOptions) -> String {
        self.tokens.iter().map(|t| t.serialize(options)).collect()
    }

    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }
    pub fn indent(&mut self, n: usize) -> &mut Self {
        self.push(Token::Indent(n))
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }

    /// `keyword: ` at the start of a statement.
    pub fn statement(&mut self, keyword: Token) -> &mut Self {
        self.push(keyword).push(Token::Colon).space()
    }
}
