//! Shared page components: field error list and timed notifications

use walletweb_core::FieldErrors;
use walletweb_utils::escape_html;

/// Kind of a notification, which sets its colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnackKind {
    Error,
    Success,
}

impl SnackKind {
    fn classes(&self) -> &'static str {
        match self {
            SnackKind::Error => "bg-red-600 text-white",
            SnackKind::Success => "bg-green-600 text-white",
        }
    }
}

/// List of validation messages of one field; empty when there are none
pub fn error_message(errors: &FieldErrors) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .messages()
        .map(|message| format!("<li>{}</li>", escape_html(message)))
        .collect();
    format!(
        "<ul class='mt-2 text-sm text-red-600 space-y-1' role='alert'>{}</ul>",
        items
    )
}

/// Notification removed by the browser after `duration_ms`
pub fn snack_bar(message: &str, kind: SnackKind, duration_ms: u64) -> String {
    format!(
        r#"<div id='snackbar' role='status' data-duration='{duration}' class='fixed bottom-6 left-1/2 -translate-x-1/2 px-4 py-3 rounded-lg shadow-lg {classes}'>{message}</div>
<script>setTimeout(function() {{ var el = document.getElementById('snackbar'); if (el) {{ el.remove(); }} }}, {duration});</script>"#,
        duration = duration_ms,
        classes = kind.classes(),
        message = escape_html(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_empty() {
        assert_eq!(error_message(&FieldErrors::default()), "");
    }

    #[test]
    fn test_error_message_lists_each_rule() {
        let mut errors = FieldErrors::single("min", "El monto debe ser mayor a 0");
        errors.add("decimals", "<b>dos</b> decimales");
        let html = error_message(&errors);
        assert_eq!(html.matches("<li>").count(), 2);
        assert!(html.contains("&lt;b&gt;dos&lt;/b&gt;"));
    }

    #[test]
    fn test_snack_bar_carries_duration() {
        let html = snack_bar("Cuenta no encontrada", SnackKind::Error, 2000);
        assert!(html.contains("data-duration='2000'"));
        assert!(html.contains("}, 2000);"));
        assert!(html.contains("bg-red-600"));
        assert!(html.contains("Cuenta no encontrada"));
    }
}
