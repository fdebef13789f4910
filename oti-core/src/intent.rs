//! Reversible intent-URI codec.
//!
//! Serialized form: an optional data-URI prefix, then a `#Intent;` fragment
//! of `key=value` segments terminated by `end`, e.g.
//!
//! ```text
//! #Intent;action=android.intent.action.MAIN;category=android.intent.category.LAUNCHER;\
//! launchFlags=0x10200000;component=com.android.contacts/.activities.DialtactsActivity;end
//! ```
//!
//! Recognized keys are `action`, `category` (repeatable), `launchFlags` and
//! `component`. Every other segment (extras, package hints, source bounds) is
//! carried through verbatim, so encode(decode(uri)) leaves unmodeled fields
//! byte-identical even after the component has been rewritten.

use crate::error::IntentParseError;
use serde::{Deserialize, Serialize};

const FRAGMENT_MARKER: &str = "#Intent;";
const FRAGMENT_END: &str = "end";

// ============================================================================
// COMPONENT NAME
// ============================================================================

/// A (package, class) pair identifying an activity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentName {
    pub package: String,
    pub class: String,
}

impl ComponentName {
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
        }
    }

    /// Parse the flattened `package/class` form. A class starting with `.`
    /// is shorthand for `package` + class suffix and is expanded here.
    pub fn unflatten(flat: &str) -> Result<Self, IntentParseError> {
        let invalid = || IntentParseError::InvalidComponent {
            value: flat.to_string(),
        };
        let (package, class) = flat.split_once('/').ok_or_else(invalid)?;
        if package.is_empty() || class.is_empty() {
            return Err(invalid());
        }
        let class = if let Some(suffix) = class.strip_prefix('.') {
            format!("{package}.{suffix}")
        } else {
            class.to_string()
        };
        Ok(Self::new(package, class))
    }

    /// Flatten to the abbreviated `package/.Suffix` form when the class lives
    /// under the package, `package/class` otherwise.
    pub fn flatten_short(&self) -> String {
        match self.class.strip_prefix(self.package.as_str()) {
            Some(suffix) if suffix.starts_with('.') => format!("{}/{}", self.package, suffix),
            _ => format!("{}/{}", self.package, self.class),
        }
    }
}

// ============================================================================
// INTENT DESCRIPTOR
// ============================================================================

/// Structured decoding of a serialized intent.
///
/// `categories` keeps encounter order; `rest` keeps unrecognized segments in
/// their original, still-escaped form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDescriptor {
    /// Data-URI prefix before the fragment, empty when absent.
    pub data: String,
    pub action: Option<String>,
    pub categories: Vec<String>,
    pub launch_flags: u32,
    pub component: Option<ComponentName>,
    /// Unrecognized `key=value` segments, carried through verbatim.
    pub rest: Vec<String>,
}

impl IntentDescriptor {
    /// Decode an intent URI. Equivalent to a plain parse with flags value 0:
    /// no scheme coercion, the fragment is taken as-is.
    pub fn decode(uri: &str) -> Result<Self, IntentParseError> {
        let start = uri.find(FRAGMENT_MARKER).ok_or(IntentParseError::MissingFragment)?;
        let mut descriptor = Self {
            data: uri[..start].to_string(),
            ..Self::default()
        };

        let body = &uri[start + FRAGMENT_MARKER.len()..];
        let mut terminated = false;
        for segment in body.split(';') {
            if segment == FRAGMENT_END {
                terminated = true;
                break;
            }
            if segment.is_empty() {
                continue;
            }
            let (key, value) =
                segment
                    .split_once('=')
                    .ok_or_else(|| IntentParseError::MalformedSegment {
                        segment: segment.to_string(),
                    })?;
            match key {
                "action" => descriptor.action = Some(unescape(value)),
                "category" => descriptor.categories.push(unescape(value)),
                "launchFlags" => descriptor.launch_flags = parse_flags(value)?,
                "component" => {
                    descriptor.component = Some(ComponentName::unflatten(&unescape(value))?)
                }
                _ => descriptor.rest.push(segment.to_string()),
            }
        }
        if !terminated {
            return Err(IntentParseError::UnterminatedFragment);
        }
        Ok(descriptor)
    }

    /// Re-serialize to intent-URI form.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.data.len() + 64);
        out.push_str(&self.data);
        out.push_str(FRAGMENT_MARKER);
        if let Some(action) = &self.action {
            out.push_str("action=");
            out.push_str(&escape(action));
            out.push(';');
        }
        for category in &self.categories {
            out.push_str("category=");
            out.push_str(&escape(category));
            out.push(';');
        }
        if self.launch_flags != 0 {
            out.push_str(&format!("launchFlags=0x{:x};", self.launch_flags));
        }
        if let Some(component) = &self.component {
            out.push_str("component=");
            out.push_str(&escape(&component.flatten_short()));
            out.push(';');
        }
        for segment in &self.rest {
            out.push_str(segment);
            out.push(';');
        }
        out.push_str(FRAGMENT_END);
        out
    }

    /// Whether the category set contains `category` (exact match).
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

fn parse_flags(value: &str) -> Result<u32, IntentParseError> {
    let invalid = || IntentParseError::InvalidLaunchFlags {
        value: value.to_string(),
    };
    if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|_| invalid())
    } else {
        value.parse::<u32>().map_err(|_| invalid())
    }
}

// ============================================================================
// PERCENT ESCAPING
// ============================================================================

/// Percent-escape the characters that would break segment framing, plus
/// whitespace and non-ASCII (escaped bytewise as UTF-8).
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'%' | b';' | b'=' => out.push_str(&format!("%{byte:02X}")),
            b if b.is_ascii_graphic() => out.push(b as char),
            b => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Reverse of [`escape`]. Lenient: a dangling or non-hex `%` sequence is kept
/// literally, and invalid UTF-8 is replaced rather than rejected.
fn unescape(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(hex) = bytes.get(i + 1..i + 3).and_then(|h| std::str::from_utf8(h).ok()) {
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    out.push(byte);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ACTION_MAIN, CATEGORY_LAUNCHER, CONTACTS_PACKAGE, OLD_DIALTACTS_CLASS};

    const OLD_SHORTCUT: &str = "#Intent;action=android.intent.action.MAIN;\
        category=android.intent.category.LAUNCHER;launchFlags=0x10200000;\
        component=com.android.contacts/.activities.DialtactsActivity;end";

    #[test]
    fn test_decode_launcher_shortcut() {
        let descriptor = IntentDescriptor::decode(OLD_SHORTCUT).unwrap();

        assert_eq!(descriptor.action.as_deref(), Some(ACTION_MAIN));
        assert!(descriptor.has_category(CATEGORY_LAUNCHER));
        assert_eq!(descriptor.launch_flags, 0x10200000);

        let component = descriptor.component.unwrap();
        assert_eq!(component.package, CONTACTS_PACKAGE);
        assert_eq!(component.class, OLD_DIALTACTS_CLASS);
    }

    #[test]
    fn test_component_short_form_expansion() {
        let component =
            ComponentName::unflatten("com.android.contacts/.activities.DialtactsActivity").unwrap();
        assert_eq!(component.class, "com.android.contacts.activities.DialtactsActivity");
        assert_eq!(
            component.flatten_short(),
            "com.android.contacts/.activities.DialtactsActivity"
        );
    }

    #[test]
    fn test_component_foreign_class_not_abbreviated() {
        let component = ComponentName::new("com.example.app", "org.other.Activity");
        assert_eq!(component.flatten_short(), "com.example.app/org.other.Activity");
        assert_eq!(
            ComponentName::unflatten("com.example.app/org.other.Activity").unwrap(),
            component
        );
    }

    #[test]
    fn test_unknown_segments_survive_reencode() {
        let uri = "#Intent;action=android.intent.action.MAIN;\
            component=com.example/.Main;S.extra_key=hello;i.count=3;end";
        let descriptor = IntentDescriptor::decode(uri).unwrap();
        assert_eq!(descriptor.rest, vec!["S.extra_key=hello", "i.count=3"]);
        assert_eq!(descriptor.encode(), uri);
    }

    #[test]
    fn test_data_prefix_preserved() {
        let uri = "content://contacts/people/1#Intent;action=android.intent.action.VIEW;end";
        let descriptor = IntentDescriptor::decode(uri).unwrap();
        assert_eq!(descriptor.data, "content://contacts/people/1");
        assert_eq!(descriptor.encode(), uri);
    }

    #[test]
    fn test_decimal_launch_flags_accepted() {
        let descriptor = IntentDescriptor::decode("#Intent;launchFlags=268435456;end").unwrap();
        assert_eq!(descriptor.launch_flags, 0x10000000);
    }

    #[test]
    fn test_missing_fragment_rejected() {
        assert_eq!(
            IntentDescriptor::decode("content://com.example/thing"),
            Err(IntentParseError::MissingFragment)
        );
    }

    #[test]
    fn test_unterminated_fragment_rejected() {
        assert_eq!(
            IntentDescriptor::decode("#Intent;action=android.intent.action.MAIN"),
            Err(IntentParseError::UnterminatedFragment)
        );
    }

    #[test]
    fn test_malformed_segment_rejected() {
        let result = IntentDescriptor::decode("#Intent;garbage;end");
        assert!(matches!(
            result,
            Err(IntentParseError::MalformedSegment { .. })
        ));
    }

    #[test]
    fn test_bad_launch_flags_rejected() {
        let result = IntentDescriptor::decode("#Intent;launchFlags=0xzz;end");
        assert!(matches!(
            result,
            Err(IntentParseError::InvalidLaunchFlags { .. })
        ));
    }

    #[test]
    fn test_bad_component_rejected() {
        let result = IntentDescriptor::decode("#Intent;component=no-slash-here;end");
        assert!(matches!(
            result,
            Err(IntentParseError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_escaped_value_round_trips() {
        let descriptor = IntentDescriptor {
            action: Some("custom;action=weird".to_string()),
            ..IntentDescriptor::default()
        };
        let encoded = descriptor.encode();
        assert_eq!(
            IntentDescriptor::decode(&encoded).unwrap().action.as_deref(),
            Some("custom;action=weird")
        );
    }

    #[test]
    fn test_component_rewrite_leaves_other_fields() {
        let mut descriptor = IntentDescriptor::decode(OLD_SHORTCUT).unwrap();
        descriptor.component = Some(ComponentName::new(
            crate::DIALER_PACKAGE,
            crate::NEW_DIALTACTS_CLASS,
        ));
        let rewritten = IntentDescriptor::decode(&descriptor.encode()).unwrap();

        assert_eq!(rewritten.action.as_deref(), Some(ACTION_MAIN));
        assert!(rewritten.has_category(CATEGORY_LAUNCHER));
        assert_eq!(rewritten.launch_flags, 0x10200000);
        let component = rewritten.component.unwrap();
        assert_eq!(component.package, crate::DIALER_PACKAGE);
        assert_eq!(component.class, crate::NEW_DIALTACTS_CLASS);
    }
}
