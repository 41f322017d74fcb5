use crate::{ParamType, Result, Value};

/// Literal rendering of a value for the SQL dialect of the connection.
pub trait Quote {
    /// Connects first, quoting rules may depend on the link charset.
    ///
    /// Nulls, booleans and integers never reach the adapter: they render as
    /// `NULL`, `TRUE` / `FALSE` and their decimal digits. The remaining values
    /// dispatch on the effective type (`hint` first, then inference).
    fn quote(&self, value: &Value, hint: Option<ParamType>) -> Result<String>;
}

/// Shared quoting rules, `native` is the adapter escaping primitive.
pub(crate) fn quote_value<F>(value: &Value, hint: Option<ParamType>, native: F) -> Result<String>
where
    F: FnOnce(&[u8], ParamType) -> Result<String>,
{
    match value {
        Value::Null => return Ok("NULL".into()),
        Value::Boolean(v) => return Ok(bool_literal(*v).into()),
        Value::Int(v) => return Ok(v.to_string()),
        _ => {}
    }
    let text = value.as_text();
    Ok(match ParamType::guess(value, hint) {
        ParamType::Null => "NULL".into(),
        ParamType::Stmt => text.into_owned(),
        ParamType::Int => match value {
            Value::Float(v) => (*v as i64).to_string(),
            _ => leading_int(&text).to_string(),
        },
        ParamType::Bool => bool_literal(sniff_bool(&text)).into(),
        kind => match value {
            Value::Blob(bytes) => native(&bytes[..], kind)?,
            _ => native(text.as_bytes(), kind)?,
        },
    })
}

fn bool_literal(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

/// Empty or starting with `f` / `F` is false, anything else is true.
fn sniff_bool(text: &str) -> bool {
    !matches!(text.chars().next(), None | Some('f' | 'F'))
}

/// Integer prefix of `text`: leading whitespace, an optional sign, then
/// digits. No digits means 0, overflow saturates.
fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add((d - b'0') as i64));
    if negative { -magnitude } else { magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(value: impl Into<Value>, hint: Option<ParamType>) -> String {
        quote_value(&value.into(), hint, |v, kind| {
            Ok(match kind {
                ParamType::Lob => format!("x{:?}", v),
                _ => format!("'{}'", String::from_utf8_lossy(v).replace('\'', "''")),
            })
        })
        .unwrap()
    }

    #[test]
    fn fast_paths() {
        assert_eq!(quote(Value::Null, Some(ParamType::Str)), "NULL");
        assert_eq!(quote(true, None), "TRUE");
        assert_eq!(quote(false, Some(ParamType::Str)), "FALSE");
        assert_eq!(quote(12, Some(ParamType::Int)), "12");
        assert_eq!(quote(-7, Some(ParamType::Str)), "-7");
    }

    #[test]
    fn typed_text() {
        assert_eq!(quote("12abc", Some(ParamType::Int)), "12");
        assert_eq!(quote("  -42", Some(ParamType::Int)), "-42");
        assert_eq!(quote("abc", Some(ParamType::Int)), "0");
        assert_eq!(quote(3.9, Some(ParamType::Int)), "3");
        assert_eq!(quote("false", Some(ParamType::Bool)), "FALSE");
        assert_eq!(quote("Foo", Some(ParamType::Bool)), "FALSE");
        assert_eq!(quote("", Some(ParamType::Bool)), "FALSE");
        assert_eq!(quote("yes", Some(ParamType::Bool)), "TRUE");
        assert_eq!(quote("anything", Some(ParamType::Null)), "NULL");
        assert_eq!(quote("NOW()", Some(ParamType::Stmt)), "NOW()");
    }

    #[test]
    fn native_fallback() {
        assert_eq!(quote("it's", None), "'it''s'");
        assert_eq!(quote(1.5, None), "'1.5'");
    }

    #[test]
    fn blob_bytes_reach_the_adapter() {
        assert_eq!(quote(vec![0xffu8, 0x00], None), "x[255, 0]");
        assert_eq!(quote("ab", Some(ParamType::Lob)), "x[97, 98]");
    }

    #[test]
    fn leading_int_saturates() {
        assert_eq!(leading_int("99999999999999999999999"), i64::MAX);
        assert_eq!(leading_int("+5 apples"), 5);
    }
}
