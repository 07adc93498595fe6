//! CSS helpers shared by the selection and animation code.

/// Values accepted by the `display` shortcuts of a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Display {
    /// `display: none`
    None,
    /// `display: block`
    Block,
    /// `display: inline`
    Inline,
    /// `display: inline-block`
    InlineBlock,
}

impl Display {
    /// The CSS keyword for this display value.
    pub fn as_str(self) -> &'static str {
        match self {
            Display::None => "none",
            Display::Block => "block",
            Display::Inline => "inline",
            Display::InlineBlock => "inline-block",
        }
    }
}

/// Values accepted by `show`/`hide`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

impl Visibility {
    /// The CSS keyword for this visibility value.
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Hidden => "hidden",
            Visibility::Visible => "visible",
        }
    }
}

/// Convert a property name to the hyphenated form expected by
/// `CSSStyleDeclaration.setProperty`.
///
/// camelCase names are hyphenated, hyphenated names pass through unchanged
/// and custom properties (`--name`) are never touched.
///
/// ## Example
///
/// ```rust
/// use appropriate::style::css_property_name;
///
/// assert_eq!(css_property_name("backgroundColor"), "background-color");
/// assert_eq!(css_property_name("margin-top"), "margin-top");
/// assert_eq!(css_property_name("WebkitTransform"), "-webkit-transform");
/// ```
pub fn css_property_name(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }

    let mut name = String::with_capacity(property.len() + 4);
    for ch in property.chars() {
        if ch.is_ascii_uppercase() {
            name.push('-');
            name.push(ch.to_ascii_lowercase());
        } else {
            name.push(ch);
        }
    }
    name
}

/// Parse the leading number of a CSS value the way `parseFloat` does.
///
/// Leading whitespace is skipped and anything after the longest numeric
/// prefix (units, keywords) is ignored. Returns `None` when the value does not
/// start with a number.
///
/// ## Example
///
/// ```rust
/// use appropriate::style::parse_css_number;
///
/// assert_eq!(parse_css_number("120px"), Some(120.0));
/// assert_eq!(parse_css_number(" -0.5em"), Some(-0.5));
/// assert_eq!(parse_css_number("auto"), None);
/// ```
pub fn parse_css_number(value: &str) -> Option<f64> {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < len && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < len && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent is only consumed when it carries at least one digit
    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < len && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < len && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Unit appended to animated numeric values.
///
/// Everything is animated in pixels except `opacity`, which is unitless.
#[inline]
pub fn animation_unit(property: &str) -> &'static str {
    if property == "opacity" {
        ""
    } else {
        "px"
    }
}

/// Format an animated value with the unit for its property.
pub fn format_css_value(property: &str, value: f64) -> String {
    format!("{}{}", value, animation_unit(property))
}

/// Value of the `transition` property used by fades and slides.
#[inline]
pub fn transition_value(property: &str, duration_ms: u32) -> String {
    format!("{} {}ms", property, duration_ms)
}
