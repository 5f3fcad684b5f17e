//! Front matter extraction from YAML (`---`) or TOML (`+++`) blocks.
//!
//! Both syntaxes are read into one JSON-like map first, so field checks
//! are shared. `categories` also accepts a single comma-separated string.

use serde_json::{Map, Value};

use super::document::DocumentError;

/// Metadata declared at the top of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub updated: Option<String>,
    pub slug: Option<String>,
    pub categories: Vec<String>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub draft: bool,
    pub template: Option<String>,
    /// Every other key, passed through to templates
    pub extra: Map<String, Value>,
}

/// Split `content` into front matter and body.
///
/// A document without a front matter block yields default metadata and
/// the whole text as body.
pub fn extract(content: &str) -> Result<(FrontMatter, &str), DocumentError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some((block, body, is_toml)) = detect(content)? else {
        return Ok((FrontMatter::default(), content));
    };

    let fields = if is_toml {
        parse_toml(block)?
    } else {
        parse_yaml(block)?
    };
    Ok((FrontMatter::from_fields(fields)?, body))
}

/// Returns `(block, body, is_toml)` when the text opens with a fence.
fn detect(content: &str) -> Result<Option<(&str, &str, bool)>, DocumentError> {
    let trimmed = content.trim_start();

    for (fence, is_toml) in [("---", false), ("+++", true)] {
        let Some(rest) = trimmed.strip_prefix(fence) else {
            continue;
        };
        if !rest.starts_with(['\n', '\r']) {
            continue;
        }

        let closing = format!("\n{fence}");
        let end = rest.find(&closing).ok_or_else(|| {
            DocumentError::FrontMatter(format!("unterminated `{fence}` block"))
        })?;

        let block = rest[..end].trim();
        let after = &rest[end + closing.len()..];
        // Rest of the closing fence line
        let body = after.split_once('\n').map_or("", |(_, body)| body);
        return Ok(Some((block, body.trim_start_matches(['\n', '\r']), is_toml)));
    }

    Ok(None)
}

fn parse_yaml(block: &str) -> Result<Map<String, Value>, DocumentError> {
    if block.trim().is_empty() {
        return Ok(Map::new());
    }
    serde_yaml::from_str(block).map_err(|e| DocumentError::FrontMatter(format!("invalid YAML: {e}")))
}

fn parse_toml(block: &str) -> Result<Map<String, Value>, DocumentError> {
    let table: toml::Table = toml::from_str(block)
        .map_err(|e| DocumentError::FrontMatter(format!("invalid TOML: {}", e.message())))?;
    Ok(table
        .into_iter()
        .map(|(k, v)| (k, toml_to_json(v)))
        .collect())
}

/// TOML dates become their string form, so both syntaxes agree.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(t) => {
            Value::Object(t.into_iter().map(|(k, v)| (k, toml_to_json(v))).collect())
        }
    }
}

impl FrontMatter {
    fn from_fields(fields: Map<String, Value>) -> Result<Self, DocumentError> {
        let mut meta = Self::default();

        for (key, value) in fields {
            match key.as_str() {
                "title" => meta.title = text(&key, value)?,
                "date" => meta.date = text(&key, value)?,
                "updated" => meta.updated = text(&key, value)?,
                "slug" => meta.slug = text(&key, value)?,
                "summary" => meta.summary = text(&key, value)?,
                "author" => meta.author = text(&key, value)?,
                "template" => meta.template = text(&key, value)?,
                "categories" => meta.categories = strings(&key, value)?,
                "draft" => {
                    meta.draft = match value {
                        Value::Bool(b) => b,
                        Value::Null => false,
                        _ => return Err(invalid(&key, "a boolean")),
                    }
                }
                _ => {
                    meta.extra.insert(key, value);
                }
            }
        }

        Ok(meta)
    }
}

fn invalid(field: &str, expected: &'static str) -> DocumentError {
    DocumentError::InvalidField {
        field: field.to_string(),
        expected,
    }
}

/// A scalar as text; numbers are accepted so `title: 1984` works.
fn text(field: &str, value: Value) -> Result<Option<String>, DocumentError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) | Value::Object(_) => Err(invalid(field, "a string")),
    }
}

fn strings(field: &str, value: Value) -> Result<Vec<String>, DocumentError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| text(field, item).transpose())
            .collect(),
        Value::String(s) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()),
        other => Ok(text(field, other)?.into_iter().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yaml() {
        let content = "---\ntitle: Hello, world\ndate: 2013-03-14\ncategories: rust, web\n---\n\n# Body";
        let (meta, body) = extract(content).unwrap();

        assert_eq!(meta.title.as_deref(), Some("Hello, world"));
        assert_eq!(meta.date.as_deref(), Some("2013-03-14"));
        assert_eq!(meta.categories, ["rust", "web"]);
        assert_eq!(body, "# Body");
    }

    #[test]
    fn test_yaml_bracket_list_and_quotes() {
        let content = "---\ntitle: \"Quoted: yes\"\ncategories: [\"a b\", c]\ndraft: true\n---\nx";
        let (meta, _) = extract(content).unwrap();

        assert_eq!(meta.title.as_deref(), Some("Quoted: yes"));
        assert_eq!(meta.categories, ["a b", "c"]);
        assert!(meta.draft);
    }

    #[test]
    fn test_yaml_comma_in_title_is_text() {
        let (meta, _) = extract("---\ntitle: Hello, world\ndate: 2013-03-14\n---\nx").unwrap();
        assert_eq!(meta.title.as_deref(), Some("Hello, world"));
        assert!(meta.categories.is_empty());
    }

    #[test]
    fn test_yaml_block_list() {
        let content = "---\ntitle: t\ndate: 2013-03-14\ncategories:\n  - python\n  - web dev\n---\nx";
        let (meta, body) = extract(content).unwrap();
        assert_eq!(meta.categories, ["python", "web dev"]);
        assert_eq!(body, "x");
    }

    #[test]
    fn test_yaml_single_category() {
        let (meta, _) = extract("---\ntitle: t\ncategories: rust\n---\n").unwrap();
        assert_eq!(meta.categories, ["rust"]);
    }

    #[test]
    fn test_toml() {
        let content = "+++\ntitle = \"Hello\"\ndate = 2013-03-14\ncategories = [\"a\", \"b\"]\nhero = \"x.png\"\n+++\nBody";
        let (meta, body) = extract(content).unwrap();

        assert_eq!(meta.title.as_deref(), Some("Hello"));
        assert_eq!(meta.date.as_deref(), Some("2013-03-14"));
        assert_eq!(meta.categories, ["a", "b"]);
        assert_eq!(meta.extra.get("hero"), Some(&json!("x.png")));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_extra_fields() {
        let content = "---\ntitle: Hello\ncount: 42\nflag: false\nitems:\n  - x\n  - y\n---\n";
        let (meta, _) = extract(content).unwrap();

        assert_eq!(meta.extra.get("count"), Some(&json!(42)));
        assert_eq!(meta.extra.get("flag"), Some(&json!(false)));
        assert_eq!(meta.extra.get("items"), Some(&json!(["x", "y"])));
    }

    #[test]
    fn test_no_front_matter() {
        let (meta, body) = extract("# Just content\n---\n").unwrap();
        assert_eq!(meta, FrontMatter::default());
        assert_eq!(body, "# Just content\n---\n");
    }

    #[test]
    fn test_unterminated_block() {
        let err = extract("---\ntitle: x\n\nbody").unwrap_err();
        assert!(matches!(err, DocumentError::FrontMatter(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = extract("---\ntitle: x\nnot a pair\n---\n").unwrap_err();
        assert!(matches!(err, DocumentError::FrontMatter(ref m) if m.starts_with("invalid YAML")));
    }

    #[test]
    fn test_empty_yaml_block() {
        let (meta, body) = extract("---\n---\nbody").unwrap();
        assert_eq!(meta, FrontMatter::default());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_invalid_toml() {
        let err = extract("+++\ntitle = \n+++\n").unwrap_err();
        assert!(err.to_string().contains("invalid TOML"));
    }

    #[test]
    fn test_wrong_type() {
        let err = extract("+++\ntitle = [\"a\"]\n+++\n").unwrap_err();
        assert!(matches!(err, DocumentError::InvalidField { ref field, .. } if field == "title"));

        let err = extract("---\ntitle: t\ndraft: maybe\n---\n").unwrap_err();
        assert!(matches!(err, DocumentError::InvalidField { ref field, .. } if field == "draft"));
    }
}
