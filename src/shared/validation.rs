use validator::{ValidationErrors, ValidationErrorsKind};

/// Flatten `validator` errors into one `field: message` line per violation,
/// sorted so responses are stable.
pub fn collect_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    push_messages(errors, "", &mut messages);
    messages.sort();
    messages
}

fn push_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let detail = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.push(format!("{}: {}", path, detail));
                }
            }
            ValidationErrorsKind::Struct(inner) => push_messages(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    push_messages(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}
