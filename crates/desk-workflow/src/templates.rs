//! Email body templates.
//!
//! Built-in HTML templates use `{{key}}` placeholders. A template directory
//! may override any of them with `<name>.html`. Substituted values are HTML
//! escaped; placeholders with no value render as empty text.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

pub const TEMPLATE_NEW_REQUESTER: &str = "task-new-requester";
pub const TEMPLATE_OLD_REQUESTER: &str = "task-old-requester";
pub const TEMPLATE_NEW_ASSIGNER: &str = "task-new-assigner";
pub const TEMPLATE_OLD_ASSIGNER: &str = "task-old-assigner";
pub const TEMPLATE_CHANGES: &str = "task-changes";

const BUILTIN: &[(&str, &str)] = &[
    (
        TEMPLATE_NEW_REQUESTER,
        "<p>{{actor}} made you the requester of task <strong>{{task_title}}</strong> ({{task_id}}).</p>",
    ),
    (
        TEMPLATE_OLD_REQUESTER,
        "<p>{{actor}} changed the requester of task <strong>{{task_title}}</strong> ({{task_id}}). You are no longer its requester.</p>",
    ),
    (
        TEMPLATE_NEW_ASSIGNER,
        "<p>{{actor}} assigned you to task <strong>{{task_title}}</strong> ({{task_id}}).</p><p>{{other_assigners}}</p>",
    ),
    (
        TEMPLATE_OLD_ASSIGNER,
        "<p>{{actor}} removed you from task <strong>{{task_title}}</strong> ({{task_id}}).</p>",
    ),
    (
        TEMPLATE_CHANGES,
        "<p>{{actor}} changed task <strong>{{task_title}}</strong> ({{task_id}}):</p><ul>{{changes}}</ul>",
    ),
];

/// Values substituted into a template. Keys map to `{{key}}`.
pub type TemplateParams = BTreeMap<String, TemplateValue>;

/// A placeholder value; `Html` is inserted verbatim, `Text` is escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    Text(String),
    Html(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unknown email template '{0}'")]
    UnknownTemplate(String),

    #[error("Failed to read template '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait TemplateRenderer: Send + Sync {
    /// Render `name` with `params` into an HTML body.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if the template is unknown or unreadable.
    fn render(&self, name: &str, params: &TemplateParams) -> Result<String, RenderError>;
}

#[derive(Debug, Clone, Default)]
pub struct Templates {
    override_dir: Option<PathBuf>,
}

impl Templates {
    #[must_use]
    pub const fn builtin() -> Self {
        Self { override_dir: None }
    }

    #[must_use]
    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
        }
    }

    fn source(&self, name: &str) -> Result<String, RenderError> {
        if let Some(dir) = &self.override_dir {
            let path = dir.join(format!("{name}.html"));
            if path.is_file() {
                return std::fs::read_to_string(&path).map_err(|source| RenderError::Io {
                    name: name.to_string(),
                    source,
                });
            }
        }
        BUILTIN
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, body)| (*body).to_string())
            .ok_or_else(|| RenderError::UnknownTemplate(name.to_string()))
    }
}

impl TemplateRenderer for Templates {
    fn render(&self, name: &str, params: &TemplateParams) -> Result<String, RenderError> {
        let source = self.source(name)?;
        Ok(substitute(&source, params))
    }
}

fn substitute(source: &str, params: &TemplateParams) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        match params.get(after[..end].trim()) {
            Some(TemplateValue::Text(text)) => out.push_str(&escape_html(text)),
            Some(TemplateValue::Html(html)) => out.push_str(html),
            None => {}
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(pairs: &[(&str, TemplateValue)]) -> TemplateParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn renders_builtin_with_escaping() {
        let body = Templates::builtin()
            .render(
                TEMPLATE_OLD_ASSIGNER,
                &params(&[
                    ("actor", TemplateValue::Text("ann".into())),
                    ("task_title", TemplateValue::Text("A<B".into())),
                    ("task_id", TemplateValue::Text("tsk-1".into())),
                ]),
            )
            .unwrap();
        assert_eq!(
            body,
            "<p>ann removed you from task <strong>A&lt;B</strong> (tsk-1).</p>"
        );
    }

    #[test]
    fn html_values_are_inserted_verbatim_and_missing_keys_vanish() {
        let out = substitute(
            "<ul>{{changes}}</ul>{{ missing }}",
            &params(&[("changes", TemplateValue::Html("<li>x</li>".into()))]),
        );
        assert_eq!(out, "<ul><li>x</li></ul>");
    }

    #[test]
    fn unterminated_placeholder_is_kept() {
        assert_eq!(substitute("a {{b", &TemplateParams::new()), "a {{b");
    }

    #[test]
    fn override_dir_wins_over_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("task-changes.html"), "custom {{task_id}}").unwrap();
        let templates = Templates::with_override_dir(dir.path());

        let body = templates
            .render(
                TEMPLATE_CHANGES,
                &params(&[("task_id", TemplateValue::Text("tsk-9".into()))]),
            )
            .unwrap();
        assert_eq!(body, "custom tsk-9");

        // names without an override file still resolve to the builtin
        assert!(templates.render(TEMPLATE_NEW_REQUESTER, &TemplateParams::new()).is_ok());
    }

    #[test]
    fn unknown_template_is_an_error() {
        let err = Templates::builtin()
            .render("nope", &TemplateParams::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate(name) if name == "nope"));
    }
}
