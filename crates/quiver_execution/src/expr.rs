use std::collections::BTreeMap;
use std::fmt;

use quiver_error::{ErrorKind, QuiverError, Result};
use quiver_array::datatype::DataType;
use quiver_array::scalar::ScalarValue;
use quiver_array::table::Field;
use serde::{Deserialize, Serialize};

use crate::functions::registry::FunctionRegistry;

/// Per-call function options, keyed by option name.
///
/// Ordered so that structurally equal expressions print and compare
/// identically.
pub type FunctionOptions = BTreeMap<String, ScalarValue>;

/// A deferred scalar computation over columns.
///
/// Expressions are immutable trees. Construction never touches data
/// and never resolves function names; resolution is deferred to
/// execution so that unknown names can route through the fallback
/// bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Reference to a column by name.
    Column(String),
    /// A scalar literal.
    Literal(ScalarValue),
    /// A function call.
    Call {
        name: String,
        args: Vec<Expression>,
        options: FunctionOptions,
    },
}

/// Create a column reference expression.
pub fn col(name: impl Into<String>) -> Expression {
    Expression::Column(name.into())
}

/// Create a literal expression.
pub fn lit(value: impl Into<ScalarValue>) -> Expression {
    Expression::Literal(value.into())
}

/// Create a call expression with no options.
pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Expression {
    Expression::Call {
        name: name.into(),
        args,
        options: FunctionOptions::new(),
    }
}

/// Create a call expression with options.
pub fn call_with_options(
    name: impl Into<String>,
    args: Vec<Expression>,
    options: FunctionOptions,
) -> Expression {
    Expression::Call {
        name: name.into(),
        args,
        options,
    }
}

impl Expression {
    fn binary(self, name: &str, right: Expression) -> Expression {
        call(name, vec![self, right])
    }

    pub fn eq(self, right: Expression) -> Expression {
        self.binary("eq", right)
    }

    pub fn not_eq(self, right: Expression) -> Expression {
        self.binary("neq", right)
    }

    pub fn lt(self, right: Expression) -> Expression {
        self.binary("lt", right)
    }

    pub fn lt_eq(self, right: Expression) -> Expression {
        self.binary("lt_eq", right)
    }

    pub fn gt(self, right: Expression) -> Expression {
        self.binary("gt", right)
    }

    pub fn gt_eq(self, right: Expression) -> Expression {
        self.binary("gt_eq", right)
    }

    pub fn add(self, right: Expression) -> Expression {
        self.binary("add", right)
    }

    pub fn sub(self, right: Expression) -> Expression {
        self.binary("sub", right)
    }

    pub fn mul(self, right: Expression) -> Expression {
        self.binary("mul", right)
    }

    pub fn div(self, right: Expression) -> Expression {
        self.binary("div", right)
    }

    pub fn and(self, right: Expression) -> Expression {
        self.binary("and", right)
    }

    pub fn or(self, right: Expression) -> Expression {
        self.binary("or", right)
    }

    /// Columns referenced anywhere in this expression tree, in first
    /// appearance order, deduplicated.
    pub fn referenced_columns(&self) -> Vec<String> {
        fn walk(expr: &Expression, out: &mut Vec<String>) {
            match expr {
                Expression::Column(name) => {
                    if !out.iter().any(|n| n == name) {
                        out.push(name.clone());
                    }
                }
                Expression::Literal(_) => (),
                Expression::Call { args, .. } => {
                    for arg in args {
                        walk(arg, out);
                    }
                }
            }
        }

        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    /// Whether every call in this tree resolves through the registry.
    pub fn is_fully_resolvable(&self, registry: &FunctionRegistry) -> bool {
        match self {
            Expression::Column(_) | Expression::Literal(_) => true,
            Expression::Call { name, args, .. } => {
                registry.resolve(name).is_some()
                    && args.iter().all(|arg| arg.is_fully_resolvable(registry))
            }
        }
    }

    /// Statically infer the output type of this expression against a
    /// schema, without executing anything.
    ///
    /// Referencing a missing column is an `UnknownColumn` error. A
    /// call that doesn't resolve through the registry infers as
    /// `Unknown`, as does any call whose arguments infer as `Unknown`.
    pub fn output_type(
        &self,
        schema: &[Field],
        registry: &FunctionRegistry,
    ) -> Result<DataType> {
        match self {
            Expression::Column(name) => schema
                .iter()
                .find(|f| &f.name == name)
                .map(|f| f.datatype)
                .ok_or_else(|| {
                    QuiverError::with_kind(
                        ErrorKind::UnknownColumn,
                        format!("Unknown column: {name}"),
                    )
                }),
            Expression::Literal(value) => Ok(value.datatype()),
            Expression::Call { name, args, .. } => {
                let arg_types = args
                    .iter()
                    .map(|arg| arg.output_type(schema, registry))
                    .collect::<Result<Vec<_>>>()?;

                let binding = match registry.resolve(name) {
                    Some(binding) => binding,
                    None => return Ok(DataType::Unknown),
                };
                if arg_types.contains(&DataType::Unknown) {
                    return Ok(DataType::Unknown);
                }

                binding.kernel.return_type(&arg_types)
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Column(name) => write!(f, "{name}"),
            Expression::Literal(value) => match value {
                // Quote strings when printing inside an expression.
                ScalarValue::Utf8(_) => write!(f, "'{value}'"),
                _ => write!(f, "{value}"),
            },
            Expression::Call {
                name,
                args,
                options,
            } => {
                write!(f, "{name}(")?;
                let mut sep = "";
                for arg in args {
                    write!(f, "{sep}{arg}")?;
                    sep = ", ";
                }
                for (key, value) in options {
                    write!(f, "{sep}{key}={value}")?;
                    sep = ", ";
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::registry::default_registry;

    #[test]
    fn canonical_display() {
        let expr = call_with_options(
            "is_null",
            vec![col("x")],
            FunctionOptions::from([("nan_is_null".to_string(), ScalarValue::Boolean(true))]),
        );
        assert_eq!("is_null(x, nan_is_null=true)", expr.to_string());

        let expr = col("name").eq(lit("bob"));
        assert_eq!("eq(name, 'bob')", expr.to_string());
    }

    #[test]
    fn structural_equality() {
        assert_eq!(col("x").gt(lit(5i64)), col("x").gt(lit(5i64)));
        assert_ne!(col("x").gt(lit(5i64)), col("x").gt(lit(6i64)));
    }

    #[test]
    fn referenced_columns_deduplicated_in_order() {
        let expr = col("b").add(col("a")).mul(col("b"));
        assert_eq!(vec!["b".to_string(), "a".to_string()], expr.referenced_columns());
    }

    #[test]
    fn output_type_inference() {
        let registry = default_registry();
        let schema = vec![
            Field::new("x", DataType::Int64),
            Field::new("f", DataType::Float64),
        ];

        let ty = col("x").gt(lit(5i64)).output_type(&schema, &registry).unwrap();
        assert_eq!(DataType::Boolean, ty);

        let ty = col("x").add(col("f")).output_type(&schema, &registry).unwrap();
        assert_eq!(DataType::Float64, ty);

        let ty = call("pkg::custom", vec![col("x")])
            .output_type(&schema, &registry)
            .unwrap();
        assert_eq!(DataType::Unknown, ty);

        let err = col("missing").output_type(&schema, &registry).unwrap_err();
        assert_eq!(ErrorKind::UnknownColumn, err.kind());
    }

    #[test]
    fn serde_round_trip_is_structural() {
        let expr = col("x").add(lit(1i64));
        let json = serde_json::to_string(&expr).unwrap();
        let back: Expression = serde_json::from_str(&json).unwrap();
        assert_eq!(expr, back);
    }
}
