//! vizij-template-core: `%{...}` label templates for chart text and hover labels
//!
//! Tokens name a key or a property path in the data (`%{x}`,
//! `%{trace[0].name}`) and may carry a d3-style number format (`%{y:$.2f}`)
//! or a date format (`%{t|%b %d, %Y}`). Unresolved keys are reported through a
//! caller-owned [`WarningThrottle`].
//!
//! ```
//! use serde_json::json;
//! use vizij_template_core::{hovertemplate_string, FormatLocale, TemplateWarnings};
//!
//! let locale = FormatLocale::default();
//! let mut warnings = TemplateWarnings::default();
//! let point = json!({ "y": 1 });
//! let text = hovertemplate_string("price: %{y:$.2f}", None, &locale, &mut warnings, &[Some(&point)]);
//! assert_eq!(text, "price: $1.00");
//! ```

pub mod display;
pub mod error;
pub mod locale;
pub mod number;
pub mod template;
pub mod throttle;
pub mod time;
pub mod token;

pub use display::{display_value, is_valid_text_value};
pub use error::FormatError;
pub use locale::{FormatLocale, ValueFormatter};
pub use number::{FormatSpecifier, NumberFormat};
pub use template::{
    hovertemplate_string, template_format_string, template_string, texttemplate_string,
    TemplateFormatter, TemplateWarnings,
};
pub use throttle::{LogSink, WarningSink, WarningThrottle, DEFAULT_MAX_WARNINGS};
pub use time::to_internal_time;
pub use token::{TemplateToken, TokenFormat};
