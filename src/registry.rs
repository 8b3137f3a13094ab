//! Write-once name tables
//!
//! - [`WidgetRegistry`]: `#id` → widget, filled while a description is parsed
//! - [`StringTable`]: symbolic key → text, used for `?INFO`/`!TOOLTIP` keys and
//!   for `${KEY}` substitution into description text
//!
//! Both tables reject re-registration under an existing name.

use crate::errors::RuntimeError;
use crate::widget::WidgetId;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    widgets: FxHashMap<String, WidgetId>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, widget: WidgetId) -> Result<(), RuntimeError> {
        if self.widgets.contains_key(name) {
            return Err(RuntimeError::DuplicateId {
                id: name.to_string(),
            });
        }
        self.widgets.insert(name.to_string(), widget);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<WidgetId, RuntimeError> {
        self.widgets
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::UndefinedId {
                id: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.widgets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Registered ids in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.widgets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: FxHashMap<String, String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from key/value pairs, failing on a repeated key
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self, RuntimeError>
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut table = Self::new();
        for (key, value) in pairs {
            table.define(key, value)?;
        }
        Ok(table)
    }

    pub fn define(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), RuntimeError> {
        let key = key.into();
        if self.strings.contains_key(&key) {
            return Err(RuntimeError::DuplicateString { key });
        }
        self.strings.insert(key, value.into());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<&str, RuntimeError> {
        self.strings
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| RuntimeError::UndefinedString {
                key: key.to_string(),
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.strings.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Replace every `${KEY}` in `text` with its string; `$$` yields `$`.
    ///
    /// A `$` not followed by `{` or `$` is copied as is.
    pub fn substitute(&self, text: &str) -> Result<String, RuntimeError> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(dollar) = rest.find('$') {
            out.push_str(&rest[..dollar]);
            let after = &rest[dollar + 1..];
            if let Some(tail) = after.strip_prefix('$') {
                out.push('$');
                rest = tail;
            } else if let Some(body) = after.strip_prefix('{') {
                match body.find('}') {
                    Some(close) => {
                        out.push_str(self.get(&body[..close])?);
                        rest = &body[close + 1..];
                    }
                    None => {
                        out.push_str(&rest[dollar..]);
                        rest = "";
                    }
                }
            } else {
                out.push('$');
                rest = after;
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_ids_are_write_once() {
        let mut registry = WidgetRegistry::new();
        registry.register("ok", WidgetId::from_index(0)).unwrap();
        let err = registry.register("ok", WidgetId::from_index(1)).unwrap_err();
        assert_eq!(err, RuntimeError::DuplicateId { id: "ok".into() });
        assert_eq!(registry.get("ok").unwrap(), WidgetId::from_index(0));
        assert!(matches!(
            registry.get("nope"),
            Err(RuntimeError::UndefinedId { .. })
        ));
    }

    #[test]
    fn test_strings_are_write_once() {
        let mut strings = StringTable::new();
        strings.define("FROM", "Your email address").unwrap();
        assert!(strings.define("FROM", "again").is_err());
        assert_eq!(strings.get("FROM").unwrap(), "Your email address");
    }

    #[test]
    fn test_substitute() {
        let strings = StringTable::from_pairs([("NAME", "Project"), ("ME", "me")]).unwrap();
        assert_eq!(
            strings.substitute("Edt ${NAME} [${ME}] costs $$5 and $x").unwrap(),
            "Edt Project [me] costs $5 and $x"
        );
    }

    #[test]
    fn test_substitute_undefined_key() {
        let strings = StringTable::new();
        assert_eq!(
            strings.substitute("Txt ${MISSING}").unwrap_err(),
            RuntimeError::UndefinedString {
                key: "MISSING".into()
            }
        );
    }

    #[test]
    fn test_substitute_unterminated_is_literal() {
        let strings = StringTable::new();
        assert_eq!(strings.substitute("a ${b").unwrap(), "a ${b");
    }
}
