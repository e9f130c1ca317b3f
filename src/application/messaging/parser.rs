//! Argument parser - Splits command argument text in a single pass
//!
//! Turns the text after a command token into a flat positional-argument
//! list and a keyword/options mapping. Keyword form is `key:value` or
//! `key: value`; values are typed as booleans, integers, or strings, with
//! double quotes grouping words.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::Value;

static KWARG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*):(.*)$").expect("kwarg regex"));

/// Result of one parse pass over argument text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    pub args: Vec<String>,
    pub kwargs: HashMap<String, Value>,
}

/// Seam for the text-parsing collaborator
pub trait ParseArgs: Send + Sync {
    fn parse(&self, text: &str) -> ParsedArgs;
}

/// Default argument parser
#[derive(Debug, Default)]
pub struct ArgumentParser;

impl ArgumentParser {
    pub fn new() -> Self {
        Self
    }
}

impl ParseArgs for ArgumentParser {
    fn parse(&self, text: &str) -> ParsedArgs {
        let tokens = tokenize(text);
        let mut parsed = ParsedArgs::default();
        let mut iter = tokens.into_iter().peekable();
        while let Some(token) = iter.next() {
            if token.quoted {
                parsed.args.push(token.text);
                continue;
            }
            match KWARG_RE.captures(&token.text) {
                Some(caps) => {
                    let key = caps[1].to_string();
                    let rest = caps[2].to_string();
                    if !rest.is_empty() {
                        parsed.kwargs.insert(key, typed_value(&rest));
                    } else if let Some(next) = iter.peek() {
                        // `key: value` form, value in the following token
                        let value = typed_value(&next.text);
                        iter.next();
                        parsed.kwargs.insert(key, value);
                    } else {
                        // trailing `key:` with nothing after it
                        parsed.args.push(token.text);
                    }
                }
                None => parsed.args.push(token.text),
            }
        }
        parsed
    }
}

struct Token {
    text: String,
    quoted: bool,
}

/// Whitespace split with double quotes grouping words.
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut was_quoted = false;
    for ch in text.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                was_quoted = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || was_quoted {
                    tokens.push(Token {
                        text: std::mem::take(&mut current),
                        quoted: was_quoted,
                    });
                    was_quoted = false;
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() || was_quoted {
        tokens.push(Token {
            text: current,
            quoted: was_quoted,
        });
    }
    tokens
}

fn typed_value(text: &str) -> Value {
    if text == "true" {
        return Value::from(true);
    }
    if text == "false" {
        return Value::from(false);
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::from(n);
    }
    Value::from(text)
}
