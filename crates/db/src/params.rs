//! Bound query parameter values.
//!
//! The composer emits SQL with positional `$n` placeholders plus an ordered
//! list of [`ParamValue`]s; the client binds them at execution time. User
//! input therefore never appears in query text, only in the bind list.

use serde::Serialize;

/// A single value bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Bound as an integer array for `= ANY($n)` membership tests.
    IntArray(Vec<i64>),
}

impl ParamValue {
    /// Render the value into the deterministic textual form used for cache
    /// keys. Not SQL: this string is hashed, never executed.
    pub fn render(&self) -> String {
        match self {
            ParamValue::Bool(v) => format!("b:{v}"),
            ParamValue::Int(v) => format!("i:{v}"),
            ParamValue::Float(v) => format!("f:{v:?}"),
            ParamValue::Text(v) => format!("t:{v}"),
            ParamValue::IntArray(values) => {
                let joined = values
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("a:[{joined}]")
            }
        }
    }
}

/// Render an ordered parameter list for cache-key hashing.
pub fn render_params(params: &[ParamValue]) -> String {
    params
        .iter()
        .map(ParamValue::render)
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_is_order_sensitive() {
        let a = render_params(&[ParamValue::Int(1), ParamValue::Int(2)]);
        let b = render_params(&[ParamValue::Int(2), ParamValue::Int(1)]);
        assert_ne!(a, b);
    }

    #[test]
    fn rendering_distinguishes_types() {
        assert_ne!(ParamValue::Int(1).render(), ParamValue::Float(1.0).render());
        assert_ne!(
            ParamValue::Text("1".into()).render(),
            ParamValue::Int(1).render()
        );
    }

    #[test]
    fn float_rendering_is_stable() {
        assert_eq!(ParamValue::Float(7.0).render(), ParamValue::Float(7.0).render());
        assert_ne!(ParamValue::Float(7.0).render(), ParamValue::Float(7.5).render());
    }

    #[test]
    fn arrays_render_members_in_order() {
        assert_eq!(ParamValue::IntArray(vec![1, 2, 3]).render(), "a:[1,2,3]");
    }
}
