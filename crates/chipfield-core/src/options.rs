//! Typed widget configuration with defaults and build-time validation.

use std::fmt;

use crate::config::{DEFAULT_FOUND_CLASS, DEFAULT_INPUT_CLASS, LookupSettings, WidgetSettings};
use crate::error::{ChipfieldError, Result};
use crate::selector::Selector;
use crate::suggestion::Suggestion;
use crate::widget::RemovedChip;

pub type FormatFn<T> = Box<dyn Fn(&T) -> String>;
pub type RemoveCallback = Box<dyn FnMut(&RemovedChip)>;

/// Options forwarded to the autocomplete capability.
pub struct AcOptions<T> {
    /// Maps a suggestion to the identifier stored on its chip.
    pub format_result: FormatFn<T>,
    /// Maps a suggestion to the text shown in the dropdown and on its chip.
    pub format_item: FormatFn<T>,
    pub min_chars: usize,
    pub max_items: usize,
    pub match_case: bool,
}

impl<T> fmt::Debug for AcOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcOptions")
            .field("min_chars", &self.min_chars)
            .field("max_items", &self.max_items)
            .field("match_case", &self.match_case)
            .finish_non_exhaustive()
    }
}

/// Validated configuration of a [`TagAutocomplete`](crate::TagAutocomplete).
pub struct WidgetConfig<T> {
    pub url_lookup: Vec<String>,
    pub ac_options: AcOptions<T>,
    pub found_class: Selector,
    pub input_class: Selector,
    pub remove_find_callback: RemoveCallback,
}

impl<T> WidgetConfig<T> {
    pub fn builder() -> WidgetConfigBuilder<T> {
        WidgetConfigBuilder::new()
    }

    /// Classes every rendered chip carries: `acfb-data` plus the found-class.
    pub fn chip_classes(&self) -> Vec<String> {
        let mut classes = vec!["acfb-data".to_string()];
        for class in &self.found_class.subject().classes {
            if !classes.contains(class) {
                classes.push(class.clone());
            }
        }
        classes
    }
}

impl<T> fmt::Debug for WidgetConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetConfig")
            .field("url_lookup", &self.url_lookup)
            .field("ac_options", &self.ac_options)
            .field("found_class", &self.found_class.to_string())
            .field("input_class", &self.input_class.to_string())
            .finish_non_exhaustive()
    }
}

/// Builder for [`WidgetConfig`]. Everything has a default except the two
/// format functions, which [`build`](Self::build) insists on.
pub struct WidgetConfigBuilder<T> {
    url_lookup: Vec<String>,
    format_result: Option<FormatFn<T>>,
    format_item: Option<FormatFn<T>>,
    lookup: LookupSettings,
    found_class: String,
    input_class: String,
    remove_find_callback: Option<RemoveCallback>,
}

impl<T> WidgetConfigBuilder<T> {
    pub fn new() -> Self {
        Self {
            url_lookup: vec![String::new()],
            format_result: None,
            format_item: None,
            lookup: LookupSettings::default(),
            found_class: DEFAULT_FOUND_CLASS.to_string(),
            input_class: DEFAULT_INPUT_CLASS.to_string(),
            remove_find_callback: None,
        }
    }

    /// Seed widget and lookup fields from the file configuration.
    pub fn settings(mut self, widget: &WidgetSettings, lookup: &LookupSettings) -> Self {
        self.url_lookup = widget.url_lookup.clone();
        self.found_class = widget.found_class.clone();
        self.input_class = widget.input_class.clone();
        self.lookup = lookup.clone();
        self
    }

    pub fn url_lookup<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.url_lookup = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn format_result(mut self, f: impl Fn(&T) -> String + 'static) -> Self {
        self.format_result = Some(Box::new(f));
        self
    }

    pub fn format_item(mut self, f: impl Fn(&T) -> String + 'static) -> Self {
        self.format_item = Some(Box::new(f));
        self
    }

    pub fn min_chars(mut self, n: usize) -> Self {
        self.lookup.min_chars = n;
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.lookup.max_items = n;
        self
    }

    pub fn match_case(mut self, on: bool) -> Self {
        self.lookup.match_case = on;
        self
    }

    pub fn found_class(mut self, selector: impl Into<String>) -> Self {
        self.found_class = selector.into();
        self
    }

    pub fn input_class(mut self, selector: impl Into<String>) -> Self {
        self.input_class = selector.into();
        self
    }

    pub fn remove_find_callback(mut self, f: impl FnMut(&RemovedChip) + 'static) -> Self {
        self.remove_find_callback = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<WidgetConfig<T>> {
        let format_result = self
            .format_result
            .ok_or(ChipfieldError::MissingOption("ac_options.format_result"))?;
        let format_item = self
            .format_item
            .ok_or(ChipfieldError::MissingOption("ac_options.format_item"))?;

        if self.lookup.max_items == 0 {
            return Err(ChipfieldError::ConfigError(
                "lookup.max_items must be at least 1".to_string(),
            ));
        }

        let found_class = Selector::parse(&self.found_class)?;
        if let Some(reason) = found_class_problem(&found_class) {
            return Err(ChipfieldError::InvalidSelector {
                selector: self.found_class,
                reason: reason.to_string(),
            });
        }
        let input_class = Selector::parse(&self.input_class)?;

        let remove_find_callback: RemoveCallback = match self.remove_find_callback {
            Some(callback) => callback,
            None => Box::new(|_: &RemovedChip| {}),
        };

        Ok(WidgetConfig {
            url_lookup: self.url_lookup,
            ac_options: AcOptions {
                format_result,
                format_item,
                min_chars: self.lookup.min_chars,
                max_items: self.lookup.max_items,
                match_case: self.lookup.match_case,
            },
            found_class,
            input_class,
            remove_find_callback,
        })
    }
}

/// Chips are rendered as `<li>` with classes only, so `found_class` must be
/// something such an element can match.
fn found_class_problem(found_class: &Selector) -> Option<&'static str> {
    let [chip] = found_class.compounds() else {
        return Some("found class must be a single compound");
    };
    if chip.classes.is_empty() {
        Some("found class must name at least one class")
    } else if chip.tag.as_deref().is_some_and(|tag| tag != "li") {
        Some("chips are <li> elements; found class may only name the li tag")
    } else if chip.id.is_some() {
        Some("found class cannot carry an #id; chips have none")
    } else {
        None
    }
}

impl WidgetConfigBuilder<Suggestion> {
    /// `format_result` = `id`, `format_item` = `name`.
    pub fn suggestion_formats(self) -> Self {
        self.format_result(|s: &Suggestion| s.id.clone())
            .format_item(|s: &Suggestion| s.name.clone())
    }
}

impl<T> Default for WidgetConfigBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_format_result_fails_fast() {
        let err = WidgetConfig::<Suggestion>::builder()
            .format_item(|s| s.name.clone())
            .build()
            .unwrap_err();
        assert!(matches!(err, ChipfieldError::MissingOption("ac_options.format_result")));
        assert!(err.to_string().contains("format_result"));
    }

    #[test]
    fn test_missing_format_item_fails_fast() {
        let err = WidgetConfig::<Suggestion>::builder()
            .format_result(|s| s.id.clone())
            .build()
            .unwrap_err();
        assert!(matches!(err, ChipfieldError::MissingOption("ac_options.format_item")));
    }

    #[test]
    fn test_defaults() {
        let cfg = WidgetConfig::<Suggestion>::builder()
            .suggestion_formats()
            .build()
            .unwrap();
        assert_eq!(cfg.url_lookup, vec![String::new()]);
        assert_eq!(cfg.found_class.to_string(), ".acfb-data");
        assert_eq!(cfg.input_class.to_string(), ".acfb-input");
        assert_eq!(cfg.ac_options.min_chars, 1);
        assert_eq!(cfg.ac_options.max_items, 10);
        assert_eq!(cfg.chip_classes(), vec!["acfb-data"]);

        let s = Suggestion::new("7", "Alice");
        assert_eq!((cfg.ac_options.format_result)(&s), "7");
        assert_eq!((cfg.ac_options.format_item)(&s), "Alice");
    }

    #[test]
    fn test_custom_found_class_adds_chip_class() {
        let cfg = WidgetConfig::<Suggestion>::builder()
            .suggestion_formats()
            .found_class("li.person")
            .build()
            .unwrap();
        assert_eq!(cfg.chip_classes(), vec!["acfb-data", "person"]);
    }

    #[test]
    fn test_bad_found_class_rejected() {
        for bad in ["li", "ul .person", "", ".a>b", "ul.person", "div.tag", "#x.tag", "li#x.tag"] {
            let res = WidgetConfig::<Suggestion>::builder()
                .suggestion_formats()
                .found_class(bad)
                .build();
            assert!(
                matches!(res, Err(ChipfieldError::InvalidSelector { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_li_found_class_accepted() {
        for good in ["li.person", "LI.person", ".person.vip"] {
            let res = WidgetConfig::<Suggestion>::builder()
                .suggestion_formats()
                .found_class(good)
                .build();
            assert!(res.is_ok(), "{good:?} should be accepted");
        }
    }

    #[test]
    fn test_zero_max_items_rejected() {
        let res = WidgetConfig::<Suggestion>::builder()
            .suggestion_formats()
            .max_items(0)
            .build();
        assert!(matches!(res, Err(ChipfieldError::ConfigError(_))));
    }

    #[test]
    fn test_settings_from_file_config() {
        let mut widget = WidgetSettings::default();
        widget.url_lookup = vec!["a.json".into(), "b.json".into()];
        widget.found_class = ".tag".into();
        let lookup = LookupSettings {
            min_chars: 0,
            max_items: 4,
            match_case: true,
        };

        let cfg = WidgetConfig::<Suggestion>::builder()
            .settings(&widget, &lookup)
            .suggestion_formats()
            .build()
            .unwrap();
        assert_eq!(cfg.url_lookup, vec!["a.json", "b.json"]);
        assert_eq!(cfg.chip_classes(), vec!["acfb-data", "tag"]);
        assert_eq!(cfg.ac_options.max_items, 4);
        assert!(cfg.ac_options.match_case);
    }
}
