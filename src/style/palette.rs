//! Style rules and the palette registry

use super::codes::{self, Code};
use super::FOCUS_SUFFIX;
use crate::errors::StyleError;
use ratatui::style::Style;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// A named `foreground, background, font` triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub name: String,
    pub fg: Code,
    pub bg: Code,
    pub font: Code,
}

impl StyleRule {
    /// Convert the rule into a ratatui style
    pub fn style(&self) -> Style {
        let style = self.fg.apply_fg(Style::default());
        let style = self.bg.apply_bg(style);
        self.font.apply_font(style)
    }
}

/// The outcome of resolving a widget's style candidates.
///
/// `normal` is applied when the widget is not on the focus path, `focus` when
/// it is. Either may be absent; a widget with both absent is left unstyled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub normal: Option<String>,
    pub focus: Option<String>,
}

/// Named style rules with an optional read-only parent.
///
/// Lookups that miss in this palette continue in the parent, which is how a
/// dialog layers its own rules over the default dialog palette and the
/// console palette without copying them.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    rules: FxHashMap<String, StyleRule>,
    parent: Option<Rc<Palette>>,
}

impl Palette {
    /// Parse palette text, one `name : fg, bg, font` rule per line.
    ///
    /// Tabs and commas are both accepted as separators. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, StyleError> {
        let mut rules = FxHashMap::default();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let normalized = raw.replace('\t', " ");
            let trimmed = normalized.trim();
            if trimmed.is_empty() {
                continue;
            }

            let (name, attributes) =
                trimmed
                    .split_once(':')
                    .ok_or_else(|| StyleError::MalformedRule {
                        text: trimmed.to_string(),
                        line,
                    })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(StyleError::MalformedRule {
                    text: trimmed.to_string(),
                    line,
                });
            }

            let mut fields = Vec::with_capacity(3);
            for token in attributes
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
            {
                let code = codes::lookup(token).ok_or_else(|| StyleError::UnknownCode {
                    code: token.to_string(),
                    line,
                })?;
                fields.push(code);
            }
            if fields.len() != 3 {
                return Err(StyleError::FieldCount {
                    found: fields.len(),
                    line,
                });
            }

            rules.insert(
                name.to_string(),
                StyleRule {
                    name: name.to_string(),
                    fg: fields[0],
                    bg: fields[1],
                    font: fields[2],
                },
            );
        }

        Ok(Palette {
            rules,
            parent: None,
        })
    }

    /// Layer this palette over `parent`
    pub fn with_parent(mut self, parent: Rc<Palette>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Find a rule by name in this palette or any ancestor
    pub fn get(&self, name: &str) -> Option<&StyleRule> {
        match self.rules.get(name) {
            Some(rule) => Some(rule),
            None => self.parent.as_deref().and_then(|p| p.get(name)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of rules defined directly in this palette (parents excluded)
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Return the first candidate, in caller order, that names a known style
    pub fn has_style<S: AsRef<str>>(&self, candidates: &[S]) -> Option<String> {
        candidates
            .iter()
            .map(AsRef::as_ref)
            .find(|name| self.contains(name))
            .map(str::to_string)
    }

    /// Resolve a candidate list into its unfocused and focused styles.
    ///
    /// The focused style re-tries every candidate with the focus suffix and
    /// falls back to the unfocused style.
    pub fn resolve<S: AsRef<str>>(&self, candidates: &[S]) -> Option<ResolvedStyle> {
        let normal = self.has_style(candidates);
        let focused: Vec<String> = candidates
            .iter()
            .map(|c| format!("{}{}", c.as_ref(), FOCUS_SUFFIX))
            .collect();
        let focus = self.has_style(&focused).or_else(|| normal.clone());

        if normal.is_none() && focus.is_none() {
            None
        } else {
            Some(ResolvedStyle { normal, focus })
        }
    }

    /// Ratatui style for `name`, or the default style when undefined
    pub fn style(&self, name: Option<&str>) -> Style {
        name.and_then(|n| self.get(n))
            .map(StyleRule::style)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::{Color, Modifier};

    const CONSOLE_STYLE: &str = "
Frame         : Dg,  _, SO
header        : WH, DC, BO
Button        : WH, DC, BO
Button*       : WH, DM, BO
#subject      : DM,  _, SO
";

    #[test]
    fn test_parse_rules() {
        let palette = Palette::parse(CONSOLE_STYLE).unwrap();
        assert_eq!(palette.len(), 5);

        let header = palette.get("header").unwrap();
        assert_eq!(header.fg, Code::Color(Color::White));
        assert_eq!(header.bg, Code::Color(Color::Cyan));
        assert_eq!(header.font, Code::Font(Modifier::BOLD));

        let style = header.style();
        assert_eq!(style.fg, Some(Color::White));
        assert_eq!(style.bg, Some(Color::Cyan));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_tabs_and_spaces_are_separators() {
        let palette = Palette::parse("label\t:\tLg\tDB\tSO").unwrap();
        assert!(palette.contains("label"));
    }

    #[test]
    fn test_unknown_code_names_token_and_line() {
        let err = Palette::parse("ok : WH, DB, BO\nbad : WH, QQ, BO").unwrap_err();
        assert_eq!(
            err,
            StyleError::UnknownCode {
                code: "QQ".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn test_wrong_field_count() {
        let err = Palette::parse("short : WH, DB").unwrap_err();
        assert_eq!(err, StyleError::FieldCount { found: 2, line: 1 });

        let err = Palette::parse("long : WH, DB, BO, SO").unwrap_err();
        assert_eq!(err, StyleError::FieldCount { found: 4, line: 1 });
    }

    #[test]
    fn test_missing_colon() {
        let err = Palette::parse("nocolon WH DB BO").unwrap_err();
        assert!(matches!(err, StyleError::MalformedRule { line: 1, .. }));
    }

    #[test]
    fn test_has_style_respects_caller_order() {
        let palette = Palette::parse(CONSOLE_STYLE).unwrap();
        assert_eq!(
            palette.has_style(&["#missing", "header", "Button"]),
            Some("header".to_string())
        );
        assert_eq!(palette.has_style(&["nothing", "here"]), None);
    }

    #[test]
    fn test_resolve_focus_variant_falls_back_to_normal() {
        let palette = Palette::parse(CONSOLE_STYLE).unwrap();

        let button = palette.resolve(&["#ok", "Button"]).unwrap();
        assert_eq!(button.normal.as_deref(), Some("Button"));
        assert_eq!(button.focus.as_deref(), Some("Button*"));

        let subject = palette.resolve(&["#subject", "Edit"]).unwrap();
        assert_eq!(subject.normal.as_deref(), Some("#subject"));
        assert_eq!(subject.focus.as_deref(), Some("#subject"));

        assert!(palette.resolve(&["#none", "Text"]).is_none());
    }

    #[test]
    fn test_parent_chain() {
        let base = Rc::new(Palette::parse(CONSOLE_STYLE).unwrap());
        let dialog = Palette::parse("header : BL, Lg, BO")
            .unwrap()
            .with_parent(base);

        assert_eq!(
            dialog.get("header").unwrap().fg,
            Code::Color(Color::Black)
        );
        assert!(dialog.contains("Button*"));
        assert_eq!(dialog.len(), 1);
    }
}
