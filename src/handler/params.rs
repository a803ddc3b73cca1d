//! Parameter extraction
//!
//! Pulls greeting parameters out of the path, the query string and the JSON
//! body. Presence follows the truthiness rules of the greeting routes: an
//! empty string, `0`, `false` and `null` all count as absent.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::error::GreetError;

pub const NAME_MISSING: &str = "Name parameter missing";

/// Decoded query string, repeated keys joined with `,`
pub type QueryParams = BTreeMap<String, String>;

/// Extract the `{name}` segment of `/greet/{name}`
///
/// The path must split into exactly three `/`-separated segments with a
/// non-empty last one.
pub fn path_name(path: &str) -> Result<String, GreetError> {
    let parts: Vec<&str> = path.split('/').collect();
    match parts.as_slice() {
        [_, _, name] if !name.is_empty() => {
            check_escapes(name)?;
            percent_decode_str(name)
                .decode_utf8()
                .map(std::borrow::Cow::into_owned)
                .map_err(|e| GreetError::Internal(format!("undecodable path name {name:?}: {e}")))
        }
        _ => Err(GreetError::MissingParameter(NAME_MISSING)),
    }
}

/// Every `%` must start a two-hex-digit escape
///
/// `percent_decode_str` passes malformed escapes through literally, so they
/// are rejected here instead.
fn check_escapes(segment: &str) -> Result<(), GreetError> {
    let bytes = segment.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(GreetError::Internal(format!(
                    "malformed percent escape in path name {segment:?}"
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// Decode an `application/x-www-form-urlencoded` query string
pub fn parse_query(query: Option<&str>) -> QueryParams {
    let mut params = QueryParams::new();
    let Some(query) = query else {
        return params;
    };

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(key.into_owned())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    params
}

/// Look up a query parameter that must be present and non-empty
pub fn required_query<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Parse a fully buffered request body as a JSON document
///
/// A `null` document is rejected like unparsable input.
pub fn parse_json_body(body: &[u8]) -> Result<Value, GreetError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) | Err(_) => Err(GreetError::MalformedBody),
        Ok(value) => Ok(value),
    }
}

/// Look up a body field that must be present and truthy, rendered as text
pub fn required_field(body: &Value, key: &str) -> Option<String> {
    body.as_object()
        .and_then(|obj| obj.get(key))
        .filter(|v| is_truthy(v))
        .map(display_value)
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a JSON value the way it reads inside a greeting sentence
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), number_to_string),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Format a number like JavaScript's `String(n)`
///
/// Shortest round-trip digits; plain notation when `1e-7 < |n| < 1e21`,
/// exponent notation (`1e+21`, `1.5e-7`) otherwise.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn number_to_string(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    // LowerExp without precision yields the shortest round-trip digits
    let sci = format!("{:e}", value.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // Position of the decimal point relative to the first digit
    let n = exp + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let e = n - 1;
        let sign = if e < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{}", e.abs())
        } else {
            format!("{first}.{rest}e{sign}{}", e.abs())
        }
    };

    if value < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_name_valid() {
        assert_eq!(path_name("/greet/John").unwrap(), "John");
    }

    #[test]
    fn test_path_name_percent_decoded() {
        assert_eq!(path_name("/greet/John%20Doe").unwrap(), "John Doe");
        assert_eq!(path_name("/greet/J%C3%BCrgen").unwrap(), "Jürgen");
        // '+' is literal in a path
        assert_eq!(path_name("/greet/a+b").unwrap(), "a+b");
    }

    #[test]
    fn test_path_name_missing() {
        for path in ["/greet/", "/greet/a/b", "/greet/a/"] {
            assert_eq!(
                path_name(path),
                Err(GreetError::MissingParameter(NAME_MISSING)),
                "path {path}"
            );
        }
    }

    #[test]
    fn test_path_name_invalid_utf8() {
        let err = path_name("/greet/%FF%FE").unwrap_err();
        assert!(matches!(err, GreetError::Internal(_)));
    }

    #[test]
    fn test_path_name_malformed_escape() {
        for path in ["/greet/%ZZ", "/greet/abc%", "/greet/a%4", "/greet/%%41"] {
            let err = path_name(path).unwrap_err();
            assert!(matches!(err, GreetError::Internal(_)), "path {path}");
        }
        assert_eq!(path_name("/greet/%41%62c").unwrap(), "Abc");
    }

    #[test]
    fn test_parse_query() {
        let params = parse_query(Some("name=Alice&age=25"));
        assert_eq!(required_query(&params, "name"), Some("Alice"));
        assert_eq!(required_query(&params, "age"), Some("25"));
        assert_eq!(required_query(&params, "other"), None);
    }

    #[test]
    fn test_parse_query_decoding() {
        let params = parse_query(Some("name=Mary+Ann&city=S%C3%A3o%20Paulo"));
        assert_eq!(params["name"], "Mary Ann");
        assert_eq!(params["city"], "São Paulo");
    }

    #[test]
    fn test_parse_query_repeated_and_empty() {
        let params = parse_query(Some("name=a&name=b&age="));
        assert_eq!(params["name"], "a,b");
        assert_eq!(required_query(&params, "age"), None);
        assert!(parse_query(None).is_empty());
        assert!(parse_query(Some("")).is_empty());
    }

    #[test]
    fn test_parse_json_body() {
        assert!(parse_json_body(br#"{"name":"Bob"}"#).is_ok());
        assert_eq!(parse_json_body(b"{not json"), Err(GreetError::MalformedBody));
        assert_eq!(parse_json_body(b""), Err(GreetError::MalformedBody));
        assert_eq!(parse_json_body(b"null"), Err(GreetError::MalformedBody));
        assert!(parse_json_body(b"42").is_ok());
    }

    #[test]
    fn test_truthiness() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&v), "{v} should be falsy");
        }
        for v in [json!(true), json!(1), json!(-2.5), json!("0"), json!([]), json!({})] {
            assert!(is_truthy(&v), "{v} should be truthy");
        }
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("Bob")), "Bob");
        assert_eq!(display_value(&json!(30)), "30");
        assert_eq!(display_value(&json!(30.0)), "30");
        assert_eq!(display_value(&json!(2.5)), "2.5");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!([1, "a", null])), "1,a,");
        assert_eq!(display_value(&json!({"a": 1})), "[object Object]");
    }

    #[test]
    fn test_number_exponent_range() {
        assert_eq!(display_value(&json!(1e21)), "1e+21");
        assert_eq!(display_value(&json!(1.5e22)), "1.5e+22");
        assert_eq!(display_value(&json!(1e20)), "100000000000000000000");
        assert_eq!(display_value(&json!(1e-7)), "1e-7");
        assert_eq!(display_value(&json!(-2.5e-8)), "-2.5e-8");
        assert_eq!(display_value(&json!(1e-6)), "0.000001");
        assert_eq!(display_value(&json!(0.1)), "0.1");
        assert_eq!(display_value(&json!(123.456)), "123.456");
        assert_eq!(display_value(&json!(-42)), "-42");
    }

    #[test]
    fn test_required_field() {
        let body = json!({"name": "Bob", "age": 30, "zero": 0});
        assert_eq!(required_field(&body, "name").as_deref(), Some("Bob"));
        assert_eq!(required_field(&body, "age").as_deref(), Some("30"));
        assert_eq!(required_field(&body, "zero"), None);
        assert_eq!(required_field(&body, "missing"), None);
        assert_eq!(required_field(&json!("Bob"), "name"), None);
    }
}
