use crate::error::{DriverError, Result};

/// One or more statement texts, executed in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Statements(Vec<String>);

impl Statements {
    pub fn single(statement: impl Into<String>) -> Self {
        Self(vec![statement.into()])
    }

    /// Splits a script on top-level `;`.
    /// Semicolons inside quotes, comments and dollar-quoted bodies are kept.
    pub fn parse(script: &str) -> Self {
        Self(split_statements(script))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Statements {
    fn from(value: &str) -> Self {
        Statements::single(value)
    }
}

impl From<String> for Statements {
    fn from(value: String) -> Self {
        Statements::single(value)
    }
}

impl From<Vec<String>> for Statements {
    fn from(value: Vec<String>) -> Self {
        Statements(value)
    }
}

impl From<&[&str]> for Statements {
    fn from(value: &[&str]) -> Self {
        Statements(value.iter().map(|s| s.to_string()).collect())
    }
}

/// Per-call options echoed onto every produced result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub request_id: Option<String>,
    pub label: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Paging parameters for `show_records`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowRecordsOptions {
    pub limit: u64,
    pub page: u64,
}

impl ShowRecordsOptions {
    pub fn new(limit: u64) -> Self {
        Self { limit, page: 0 }
    }

    pub fn page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    /// Rows to skip before this page. Fails when `page * limit` does not fit in a `u64`.
    pub fn offset(&self) -> Result<u64> {
        self.page
            .checked_mul(self.limit)
            .ok_or(DriverError::InvalidPage {
                page: self.page,
                limit: self.limit,
            })
    }
}

fn split_statements(sql: &str) -> Vec<String> {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut i = 0;

    let mut push = |statement: &str| {
        let statement = statement.trim();
        if !statement.is_empty() {
            statements.push(statement.to_string());
        }
    };

    while i < len {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < len {
                    if bytes[i] == quote {
                        // doubled quote is an escape
                        if bytes.get(i + 1) == Some(&quote) {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < len && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < len && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i += 2;
            }
            b'$' => match dollar_tag(&bytes[i..]) {
                Some(tag_len) => {
                    let tag = &sql[i..i + tag_len];
                    i += tag_len;
                    match sql[i..].find(tag) {
                        Some(pos) => i += pos + tag_len,
                        None => i = len,
                    }
                }
                None => i += 1,
            },
            b';' => {
                push(&sql[start..i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    push(&sql[start.min(len)..]);

    statements
}

/// Length of a `$tag$` opener at the start of `bytes`, if there is one.
fn dollar_tag(bytes: &[u8]) -> Option<usize> {
    let mut j = 1;
    while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
        if j == 1 && bytes[j].is_ascii_digit() {
            return None;
        }
        j += 1;
    }
    (bytes.get(j) == Some(&b'$')).then_some(j + 1)
}
