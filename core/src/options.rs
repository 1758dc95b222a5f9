//! Query-string encoding for list options.
//!
//! # Design
//! Each options type describes its query parameters as a table of [`Param`]
//! descriptors (external name, value, omit-empty rule, bracket repetition).
//! [`add_options`] is the single encoder that interprets those tables, so
//! every list operation shares the same zero-value and ordering rules.
//! Parameters are emitted in declaration order.

use chrono::{DateTime, Utc};
use url::form_urlencoded;

use crate::error::{EncodeError, Error};

/// Value of a single query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue<'a> {
    Int(i64),
    Bool(bool),
    Str(&'a str),
    /// Encoded as unix seconds.
    Time(Option<DateTime<Utc>>),
    List(&'a [String]),
}

impl ParamValue<'_> {
    fn is_zero(&self) -> bool {
        match self {
            ParamValue::Int(v) => *v == 0,
            ParamValue::Bool(v) => !*v,
            ParamValue::Str(v) => v.is_empty(),
            ParamValue::Time(v) => v.is_none(),
            ParamValue::List(v) => v.is_empty(),
        }
    }
}

/// Descriptor for one query parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param<'a> {
    pub name: &'static str,
    pub value: ParamValue<'a>,
    pub omit_empty: bool,
    pub brackets: bool,
}

impl<'a> Param<'a> {
    pub fn new(name: &'static str, value: ParamValue<'a>) -> Self {
        Self {
            name,
            value,
            omit_empty: false,
            brackets: false,
        }
    }

    /// Skip the parameter when its value is the zero value of its kind.
    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// Encode list values as `name[]=v1&name[]=v2`.
    pub fn brackets(mut self) -> Self {
        self.brackets = true;
        self
    }
}

/// Implemented by every options type that maps onto query parameters.
pub trait QueryOptions {
    fn params(&self) -> Vec<Param<'_>>;
}

/// Append the query parameters described by `options` to `path`.
///
/// `None` returns `path` unchanged. Parameters already present on `path` are
/// kept ahead of the new ones. When every parameter is omitted, no `?` is
/// added.
pub fn add_options<O>(path: &str, options: Option<&O>) -> Result<String, Error>
where
    O: QueryOptions + ?Sized,
{
    let Some(options) = options else {
        return Ok(path.to_string());
    };

    let query = encode_params(&options.params())?;
    if query.is_empty() {
        return Ok(path.to_string());
    }

    let (head, fragment) = match path.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (path, None),
    };
    let separator = match head.split_once('?') {
        Some((_, existing)) if existing.is_empty() => "",
        Some(_) => "&",
        None => "?",
    };

    let mut out = format!("{head}{separator}{query}");
    if let Some(frag) = fragment {
        out.push('#');
        out.push_str(frag);
    }
    Ok(out)
}

/// Encode a descriptor table into a query string without the leading `?`.
pub fn encode_params(params: &[Param<'_>]) -> Result<String, Error> {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    for param in params {
        validate_name(param.name)?;
        if param.omit_empty && param.value.is_zero() {
            continue;
        }
        match &param.value {
            ParamValue::Int(v) => {
                serializer.append_pair(param.name, &v.to_string());
            }
            ParamValue::Bool(v) => {
                serializer.append_pair(param.name, if *v { "true" } else { "false" });
            }
            ParamValue::Str(v) => {
                serializer.append_pair(param.name, v);
            }
            ParamValue::Time(Some(t)) => {
                serializer.append_pair(param.name, &t.timestamp().to_string());
            }
            ParamValue::Time(None) => {}
            ParamValue::List(values) => {
                let name = if param.brackets {
                    format!("{}[]", param.name)
                } else {
                    param.name.to_string()
                };
                for value in values.iter() {
                    serializer.append_pair(&name, value);
                }
            }
        }
    }

    Ok(serializer.finish())
}

fn validate_name(name: &str) -> Result<(), Error> {
    if name.is_empty() || name.contains(['=', '&', '?', '#']) {
        return Err(EncodeError::ParamName(name.to_string()).into());
    }
    Ok(())
}
