//! Flow document → record parsing.
//!
//! Documents look like scripts but are never executed. Recursive descent
//! over the fixed grammar treats them as data: no evaluation context
//! exists, so hand-edited or untrusted files cannot reach any ambient
//! capability.
//!
//! Grammar, in document order:
//!
//! ```text
//! const Node = { ...pretty JSON... }
//!
//! Node.<text-field> = `
//! ...escaped multi-line text...
//! `
//!
//! Node.<script-field> = async function (<params>) {
//!   ...indented body...
//! }
//!
//! module.exports = Node;
//! ```
//!
//! Any deviation is a [`Error::Parse`] carrying the 1-indexed line.

use serde_json::{Map, Value};

use crate::codec::{FUNC_INDENT, NODE_PREFIX, NODE_SUFFIX};
use crate::error::{Error, Result};
use crate::model::{Record, SCRIPT_FIELDS, TEXT_FIELDS};

/// Parse one flow document back into a record.
///
/// The inverse of [`encode`](crate::codec::encode): text fields lose the
/// one leading and one trailing newline added by the literal wrap, and
/// script bodies are de-indented by one unit. If some body line does not
/// start with the indent unit, outdenting is skipped for that field
/// (tolerates hand-edited files).
///
/// # Errors
///
/// Returns [`Error::Parse`] when the document deviates from the grammar.
pub fn decode(document: &str) -> Result<Record> {
    let source = document.strip_prefix('\u{feff}').unwrap_or(document);
    let mut scanner = Scanner::new(source);

    scanner.skip_blank();
    if !scanner.eat(NODE_PREFIX) {
        return Err(scanner.error(format!("expected `{NODE_PREFIX}`")));
    }

    let head_line = scanner.line;
    let head = scanner.scan_json_object()?;
    let mut map: Map<String, Value> = serde_json::from_str(head).map_err(|e| Error::Parse {
        line: head_line,
        message: format!("invalid record literal: {e}"),
    })?;

    loop {
        scanner.skip_blank();
        if scanner.eat(NODE_SUFFIX) {
            scanner.skip_blank();
            if !scanner.at_end() {
                return Err(scanner.error("unexpected content after trailer"));
            }
            break;
        }
        if scanner.at_end() {
            return Err(scanner.error(format!("missing `{NODE_SUFFIX}` trailer")));
        }

        if !scanner.eat("Node.") {
            return Err(scanner.error("expected `Node.<field>` assignment or trailer"));
        }
        let field = scanner.eat_ident()?.to_string();
        if !scanner.eat(" = ") {
            return Err(scanner.error(format!("expected `= ` after `Node.{field}`")));
        }

        let value = match scanner.peek() {
            Some('`') => {
                scanner.bump();
                let text = scanner.scan_template_literal()?;
                scanner.expect_line_end()?;
                if TEXT_FIELDS.contains(&field.as_str()) {
                    unwrap_text(&text).to_string()
                } else {
                    text
                }
            }
            _ if scanner.rest().starts_with("async function (") => {
                if !SCRIPT_FIELDS.contains(&field.as_str()) {
                    return Err(
                        scanner.error(format!("function assigned to non-script field `{field}`"))
                    );
                }
                scanner.scan_function_block()?
            }
            _ => {
                return Err(scanner.error(format!(
                    "expected backtick literal or `async function` after `Node.{field} = `"
                )))
            }
        };
        map.insert(field, Value::String(value));
    }

    Ok(Record::from_map(map))
}

/// Strip the one leading and one trailing newline added by the literal
/// wrap around text fields.
fn unwrap_text(text: &str) -> &str {
    let text = text.strip_prefix('\n').unwrap_or(text);
    text.strip_suffix('\n').unwrap_or(text)
}

/// Strip one indent unit from every body line. If any line does not start
/// with the unit, the body is returned unchanged: the file was hand-edited
/// away from the canonical format and re-indenting guesses would corrupt it.
fn outdent(code: &str) -> String {
    let lines: Vec<&str> = code.split('\n').collect();
    if lines.iter().any(|line| !line.starts_with(FUNC_INDENT)) {
        return code.to_string();
    }
    lines
        .iter()
        .map(|line| &line[FUNC_INDENT.len()..])
        .collect::<Vec<_>>()
        .join("\n")
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0, line: 1 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Consume `token` if the input continues with it. `token` must not
    /// contain newlines.
    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn skip_blank(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\n')) {
            self.bump();
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn eat_ident(&mut self) -> Result<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                self.bump();
            }
            _ => return Err(self.error("expected field name")),
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                self.bump();
            } else {
                break;
            }
        }
        Ok(&self.src[start..self.pos])
    }

    /// Scan a balanced `{ ... }` JSON value and return the raw slice.
    fn scan_json_object(&mut self) -> Result<&'a str> {
        if self.peek() != Some('{') {
            return Err(self.error("expected `{` to open the record literal"));
        }
        let start = self.pos;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        while let Some(c) = self.bump() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(&self.src[start..self.pos]);
                    }
                }
                _ => {}
            }
        }
        Err(self.error("unterminated record literal"))
    }

    /// Scan a backtick literal body, applying the inverse of the escape
    /// table: `\``, `\\` and `\$` collapse to their second character; a
    /// backslash before anything else is ordinary text.
    fn scan_template_literal(&mut self) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated backtick literal")),
                Some('`') => return Ok(text),
                Some('\\') => match self.peek() {
                    Some(c @ ('`' | '\\' | '$')) => {
                        text.push(c);
                        self.bump();
                    }
                    _ => text.push('\\'),
                },
                Some(c) => text.push(c),
            }
        }
    }

    /// Scan `async function (<params>) {` through the closing `}` line and
    /// return the de-indented body.
    fn scan_function_block(&mut self) -> Result<String> {
        if !self.eat("async function (") {
            return Err(self.error("expected `async function (`"));
        }
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(self.error("unterminated function parameter list"))
                }
                Some(')') => break,
                Some(_) => {
                    self.bump();
                }
            }
        }
        if !self.eat(") {") {
            return Err(self.error("expected `) {` after function parameters"));
        }
        if self.bump() != Some('\n') {
            return Err(self.error("expected newline after function header"));
        }

        let mut body_lines: Vec<&str> = Vec::new();
        loop {
            let Some(line) = self.take_line() else {
                return Err(self.error("unterminated function body, expected `}`"));
            };
            if line == "}" {
                break;
            }
            body_lines.push(line);
        }
        Ok(outdent(&body_lines.join("\n")))
    }

    /// Consume up to and including the next newline; `None` at end of input.
    fn take_line(&mut self) -> Option<&'a str> {
        if self.at_end() {
            return None;
        }
        let start = self.pos;
        let line = match self.rest().find('\n') {
            Some(offset) => {
                let line = &self.src[start..start + offset];
                self.pos = start + offset + 1;
                self.line += 1;
                line
            }
            None => {
                let line = &self.src[start..];
                self.pos = self.src.len();
                line
            }
        };
        Some(line)
    }

    /// Require nothing but whitespace up to the end of the current line.
    fn expect_line_end(&mut self) -> Result<()> {
        while matches!(self.peek(), Some(' ' | '\t' | '\r')) {
            self.bump();
        }
        match self.peek() {
            None => Ok(()),
            Some('\n') => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("unexpected `{c}` after literal"))),
        }
    }
}
