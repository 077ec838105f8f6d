pub mod config;
pub mod dom;
pub mod error;
pub mod lookup;
pub mod options;
pub mod selector;
pub mod suggestion;
pub mod widget;

pub use config::{ChipfieldConfig, LookupSettings, UiSettings, WidgetSettings};
pub use dom::{Document, Element, NodeId};
pub use error::{ChipfieldError, Result};
pub use lookup::{Autocomplete, LocalLookup, LookupResult};
pub use options::{AcOptions, WidgetConfig, WidgetConfigBuilder};
pub use selector::Selector;
pub use suggestion::Suggestion;
pub use widget::{RemovedChip, TagAutocomplete, scaffold};

