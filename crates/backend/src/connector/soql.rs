//! Построение SOQL-запросов из шаблонов с `%s`

/// Экранировать значение для строкового литерала SOQL
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Подставить параметры в шаблон по порядку `%s`
///
/// Параметры вставляются как есть; экранирование выполняет вызывающий код
/// через [`escape`] или [`quoted_list`]. Лишние `%s` остаются в тексте.
pub fn format(template: &str, params: &[&str]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut params = params.iter();
    let mut rest = template;
    while let Some(pos) = rest.find("%s") {
        result.push_str(&rest[..pos]);
        match params.next() {
            Some(param) => result.push_str(param),
            None => result.push_str("%s"),
        }
        rest = &rest[pos + 2..];
    }
    result.push_str(rest);
    result
}

/// `'a', 'b', 'c'`
pub fn quoted_list<S: AsRef<str>>(ids: &[S]) -> String {
    ids.iter()
        .map(|id| format!("'{}'", escape(id.as_ref())))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_quotes_and_backslashes() {
        assert_eq!(escape("O'Brien"), "O\\'Brien");
        assert_eq!(escape("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_format_substitutes_in_order() {
        let soql = format(
            "SELECT Id FROM OpportunityLineItem WHERE OpportunityId = '%s'",
            &[escape("006x'1").as_str()],
        );
        assert_eq!(
            soql,
            "SELECT Id FROM OpportunityLineItem WHERE OpportunityId = '006x\\'1'"
        );
    }

    #[test]
    fn test_quoted_list() {
        assert_eq!(quoted_list(&["a", "b"]), "'a', 'b'");
        assert_eq!(quoted_list::<&str>(&[]), "");
    }
}
