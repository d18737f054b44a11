use std::collections::HashMap;
use std::str::FromStr;

pub use proc_macro2::{Delimiter, TokenStream, TokenTree};

use crate::config::ConfigError;
use crate::variables::Variables;

/// a value in attribute syntax: `{ key: "value", list: ["a", "b"], nested: { .. } }`
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Str(String),
    List(Vec<AttributeValue>),
    Map(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    fn kind(&self) -> &'static str {
        match self {
            AttributeValue::Str(_) => "string",
            AttributeValue::List(_) => "list",
            AttributeValue::Map(_) => "map",
        }
    }

    pub fn assert_str(self, key: &str) -> Result<String, ConfigError> {
        match self {
            AttributeValue::Str(s) => Ok(s),
            other => Err(ConfigError::ExpectedType { key: key.into(), expected: "string", found: other.kind() }),
        }
    }

    pub fn assert_map(self, key: &str) -> Result<HashMap<String, AttributeValue>, ConfigError> {
        match self {
            AttributeValue::Map(m) => Ok(m),
            other => Err(ConfigError::ExpectedType { key: key.into(), expected: "map", found: other.kind() }),
        }
    }

    pub fn assert_list(self, key: &str) -> Result<Vec<AttributeValue>, ConfigError> {
        match self {
            AttributeValue::List(l) => Ok(l),
            other => Err(ConfigError::ExpectedType { key: key.into(), expected: "list", found: other.kind() }),
        }
    }

    /// accepts `true`/`false` either bare or quoted.
    pub fn assert_bool(self, key: &str) -> Result<bool, ConfigError> {
        let s = self.assert_str(key)?;
        match s.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ConfigError::InvalidBool { key: key.into(), value: s }),
        }
    }
}

/// the value a literal spells out, with escapes and raw strings decoded.
fn literal_value(literal: proc_macro2::Literal) -> Result<String, ConfigError> {
    let text = literal.to_string();
    match syn::Lit::new(literal) {
        syn::Lit::Str(s) => Ok(s.value()),
        syn::Lit::Int(i) => Ok(i.base10_digits().to_string()),
        syn::Lit::Float(f) => Ok(f.base10_digits().to_string()),
        syn::Lit::Bool(b) => Ok(b.value.to_string()),
        _ => Err(ConfigError::Syntax(format!("Unsupported literal {text}. Expected a string, number, or boolean"))),
    }
}

fn expect_comma(next: Option<TokenTree>, context: &str) -> Result<bool, ConfigError> {
    match next {
        None => Ok(false),
        Some(TokenTree::Punct(p)) if p.as_char() == ',' => Ok(true),
        Some(other) => Err(ConfigError::Syntax(format!("Expected punctuation ',' in {context}. Instead found {other}"))),
    }
}

fn parse_map(stream: TokenStream, vars: &Variables) -> Result<AttributeValue, ConfigError> {
    let mut out = HashMap::new();
    let mut iter = stream.into_iter();
    while let Some(next) = iter.next() {
        let name = match next {
            TokenTree::Ident(i) => i.to_string(),
            TokenTree::Literal(l) => literal_value(l)?,
            other => {
                return Err(ConfigError::Syntax(format!("Expected an identifier in attribute value map. Instead found {other}")));
            }
        };
        match iter.next() {
            Some(TokenTree::Punct(p)) if p.as_char() == ':' => {}
            Some(other) => {
                return Err(ConfigError::Syntax(format!("Expected punctuation ':' after attribute value key {name:?}. Instead found {other}")));
            }
            None => {
                return Err(ConfigError::Syntax(format!("Missing value for attribute value key {name:?}")));
            }
        }
        let val = match iter.next() {
            Some(v) => get_attribute_value(v, vars)?,
            None => return Err(ConfigError::Syntax(format!("Missing value for attribute value key {name:?}"))),
        };
        out.insert(name, val);
        if !expect_comma(iter.next(), "attribute value map")? {
            break;
        }
    }
    Ok(AttributeValue::Map(out))
}

fn parse_list(stream: TokenStream, vars: &Variables) -> Result<AttributeValue, ConfigError> {
    let mut out = vec![];
    let mut iter = stream.into_iter();
    while let Some(next) = iter.next() {
        out.push(get_attribute_value(next, vars)?);
        if !expect_comma(iter.next(), "attribute value list")? {
            break;
        }
    }
    Ok(AttributeValue::List(out))
}

pub fn get_attribute_value(token: TokenTree, vars: &Variables) -> Result<AttributeValue, ConfigError> {
    match token {
        TokenTree::Group(g) => match g.delimiter() {
            Delimiter::Brace => parse_map(g.stream(), vars),
            Delimiter::Bracket => parse_list(g.stream(), vars),
            _ => Err(ConfigError::Syntax(format!("Attribute value is a group. Expected delimiter {{}} or []. Instead found {g}"))),
        },
        // bare booleans pass through, every other identifier
        // must name a previously loaded variable.
        TokenTree::Ident(id) => {
            let id_key = id.to_string();
            if id_key == "true" || id_key == "false" {
                return Ok(AttributeValue::Str(id_key));
            }
            match vars.get(&id_key) {
                Some(val) => Ok(AttributeValue::Str(val.to_string())),
                None => Err(ConfigError::UnknownVariable(id_key)),
            }
        }
        TokenTree::Literal(l) => Ok(AttributeValue::Str(literal_value(l)?)),
        TokenTree::Punct(p) => Err(ConfigError::Syntax(format!("Unexpected punctuation in attribute value {p}"))),
    }
}

pub fn parse_attributes(attr: TokenStream, vars: &Variables) -> Result<AttributeValue, ConfigError> {
    let mut iter = attr.into_iter();
    let next = match iter.next() {
        Some(n) => n,
        None => return Ok(AttributeValue::Map(HashMap::new())),
    };
    let out = get_attribute_value(next, vars)?;
    if let Some(extra) = iter.next() {
        return Err(ConfigError::Syntax(format!("Unexpected trailing tokens after attribute value: {extra}")));
    }
    Ok(out)
}

pub fn parse_attributes_str(attr: &str, vars: &Variables) -> Result<AttributeValue, ConfigError> {
    let stream = TokenStream::from_str(attr).map_err(|e| ConfigError::Syntax(format!("Failed to tokenize attributes: {e}")))?;
    parse_attributes(stream, vars)
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(s: &str) -> AttributeValue {
        parse_attributes_str(s, &Variables::new()).expect("Failed to parse")
    }

    #[test]
    fn can_parse_nested_maps_and_lists() {
        let val = parse(r#"{ name: "pname", docs: ["index.html", "error.html"], site: { comment: "hi" }, }"#);
        let mut map = val.assert_map("root").unwrap();
        assert_eq!(map.remove("name").unwrap().assert_str("name").unwrap(), "pname");
        let docs = map.remove("docs").unwrap().assert_list("docs").unwrap();
        assert_eq!(docs, vec![AttributeValue::Str("index.html".into()), AttributeValue::Str("error.html".into())]);
        let mut site = map.remove("site").unwrap().assert_map("site").unwrap();
        assert_eq!(site.remove("comment").unwrap().assert_str("comment").unwrap(), "hi");
    }

    #[test]
    fn quoted_keys_are_unquoted() {
        let mut map = parse(r#"{ "projectName": "abc" }"#).assert_map("root").unwrap();
        assert_eq!(map.remove("projectName"), Some(AttributeValue::Str("abc".into())));
    }

    #[test]
    fn string_escapes_are_decoded() {
        let mut map = parse(r##"{
            comment: "say \"hi\"\n",
            windows: "C:\\site",
            raw: r"C:\site",
            hashed: r#"a "quoted" word"#,
            count: 3,
        }"##).assert_map("root").unwrap();
        assert_eq!(map.remove("comment"), Some(AttributeValue::Str("say \"hi\"\n".into())));
        assert_eq!(map.remove("windows"), Some(AttributeValue::Str(r"C:\site".into())));
        assert_eq!(map.remove("raw"), Some(AttributeValue::Str(r"C:\site".into())));
        assert_eq!(map.remove("hashed"), Some(AttributeValue::Str(r#"a "quoted" word"#.into())));
        assert_eq!(map.remove("count"), Some(AttributeValue::Str("3".into())));
    }

    #[test]
    fn char_and_byte_literals_are_rejected() {
        let vars = Variables::new();
        assert!(matches!(parse_attributes_str("{ a: 'c' }", &vars), Err(ConfigError::Syntax(_))));
        assert!(matches!(parse_attributes_str(r#"{ a: b"bytes" }"#, &vars), Err(ConfigError::Syntax(_))));
    }

    #[test]
    fn empty_input_is_empty_map() {
        assert_eq!(parse(""), AttributeValue::Map(HashMap::new()));
    }

    #[test]
    fn bare_booleans_and_variables_resolve() {
        let mut vars = Variables::new();
        vars.set("PROJECT", "fromenv");
        let val = parse_attributes_str("{ use_cdn: true, project_name: PROJECT }", &vars).unwrap();
        let mut map = val.assert_map("root").unwrap();
        assert!(map.remove("use_cdn").unwrap().assert_bool("use_cdn").unwrap());
        assert_eq!(map.remove("project_name").unwrap().assert_str("project_name").unwrap(), "fromenv");
    }

    #[test]
    fn unknown_variable_is_an_error() {
        let err = parse_attributes_str("{ project_name: NOPE }", &Variables::new()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownVariable(ref v) if v == "NOPE"));
    }

    #[test]
    fn syntax_errors_are_reported() {
        let vars = Variables::new();
        assert!(matches!(parse_attributes_str("{ a = \"b\" }", &vars), Err(ConfigError::Syntax(_))));
        assert!(matches!(parse_attributes_str("{ a: \"b\" ; }", &vars), Err(ConfigError::Syntax(_))));
        assert!(matches!(parse_attributes_str("{ a: }", &vars), Err(ConfigError::Syntax(_))));
        assert!(matches!(parse_attributes_str("(1, 2)", &vars), Err(ConfigError::Syntax(_))));
    }

    #[test]
    fn wrong_shape_is_reported() {
        let err = parse(r#"["a"]"#).assert_map("root").unwrap_err();
        assert!(matches!(err, ConfigError::ExpectedType { expected: "map", found: "list", .. }));
        let err = AttributeValue::Str("yes".into()).assert_bool("use_cdn").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBool { .. }));
    }
}
