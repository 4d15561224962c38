//! Token list and render cache shared by every statement builder.

/// Ordered SQL tokens assembled clause by clause during `render`.
#[derive(Debug, Default)]
pub(crate) struct Commands {
    tokens: Vec<String>,
}

impl Commands {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a token; blank tokens are dropped so the output never holds
    /// double spaces.
    pub(crate) fn push(&mut self, token: impl Into<String>) -> &mut Self {
        let token = token.into();
        if !token.trim().is_empty() {
            self.tokens.push(token);
        }
        self
    }

    pub(crate) fn push_opt(&mut self, token: Option<&str>) -> &mut Self {
        if let Some(token) = token {
            self.push(token);
        }
        self
    }

    /// Remove trailing `,` from the last token of a list-rendered clause.
    pub(crate) fn strip_trailing_comma(&mut self) -> &mut Self {
        if let Some(last) = self.tokens.last_mut() {
            let trimmed_len = last.trim_end_matches(',').len();
            last.truncate(trimmed_len);
        }
        self
    }

    pub(crate) fn finish(self) -> String {
        self.tokens.join(" ")
    }
}

/// Cached SQL text plus its dirty flag.
#[derive(Debug, Clone, Default)]
pub struct RenderCache {
    sql: String,
    rendered: bool,
}

impl RenderCache {
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub(crate) fn invalidate(&mut self) {
        self.rendered = false;
    }

    pub(crate) fn store(&mut self, sql: String) -> &str {
        self.sql = sql;
        self.rendered = true;
        &self.sql
    }
}

/// Clip SQL for log lines without splitting a UTF-8 character.
pub(crate) fn truncate_for_log(sql: &str, max: usize) -> &str {
    if sql.len() <= max {
        return sql;
    }
    let mut end = max;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
