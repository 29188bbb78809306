//! `{{key}}` placeholder substitution for URL path templates.

use std::collections::BTreeMap;

use crate::error::TemplateError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Named values substituted into a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars(BTreeMap<String, String>);

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    /// Apply `f` to every value, keeping the keys.
    pub fn map_values(&self, f: impl Fn(&str) -> String) -> Self {
        Self(self.0.iter().map(|(k, v)| (k.clone(), f(v))).collect())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Replace every `{{key}}` in `template` with `vars[key]`.
pub fn expand(template: &str, vars: &TemplateVars) -> Result<String, TemplateError> {
    expand_with_extra(template, vars, &TemplateVars::default())
}

/// Like [`expand`], but keys present in `extra` take precedence over `vars`.
pub fn expand_with_extra(
    template: &str,
    vars: &TemplateVars,
    extra: &TemplateVars,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let end = after_open
            .find(CLOSE)
            .ok_or(TemplateError::Unterminated(offset + start))?;
        let key = &after_open[..end];
        let value = extra
            .get(key)
            .or_else(|| vars.get(key))
            .ok_or_else(|| TemplateError::missing_variable(key))?;
        out.push_str(value);

        let consumed = start + OPEN.len() + end + CLOSE.len();
        offset += consumed;
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> TemplateVars {
        TemplateVars::new().with("project", "p1").with("name", "n1")
    }

    #[test]
    fn test_expand_item_path() {
        let out = expand("projects/{{project}}/serviceAccounts/{{name}}", &vars()).unwrap();
        assert_eq!(out, "projects/p1/serviceAccounts/n1");
    }

    #[test]
    fn test_expand_without_placeholders() {
        assert_eq!(expand("projects", &vars()).unwrap(), "projects");
        assert_eq!(expand("", &TemplateVars::new()).unwrap(), "");
    }

    #[test]
    fn test_missing_variable() {
        let err = expand("projects/{{project}}/x/{{zone}}", &vars()).unwrap_err();
        assert_eq!(err, TemplateError::MissingVariable("zone".to_string()));
    }

    #[test]
    fn test_unterminated_placeholder() {
        let err = expand("projects/{{project}}/{{name", &vars()).unwrap_err();
        assert_eq!(err, TemplateError::Unterminated(21));
    }

    #[test]
    fn test_repeated_and_adjacent_placeholders() {
        let out = expand("{{name}}{{name}}-{{project}}", &vars()).unwrap();
        assert_eq!(out, "n1n1-p1");
    }

    #[test]
    fn test_values_are_not_re_expanded() {
        let v = TemplateVars::new().with("name", "{{project}}");
        assert_eq!(expand("a/{{name}}", &v).unwrap(), "a/{{project}}");
    }

    #[test]
    fn test_extra_overrides_vars() {
        let extra = TemplateVars::new().with("name", "override");
        let out = expand_with_extra("{{project}}/{{name}}", &vars(), &extra).unwrap();
        assert_eq!(out, "p1/override");
    }

    #[test]
    fn test_map_values_and_from_iter() {
        let v: TemplateVars = [("a", "x y")].into_iter().collect();
        let mapped = v.map_values(|s| s.replace(' ', "_"));
        assert_eq!(mapped.get("a"), Some("x_y"));
    }
}
