pub mod arith;
pub mod boolean;
pub mod comparison;
pub mod is;
pub mod numeric;

mod util;

use std::sync::Arc;

use quiver_array::scalar::ScalarValue;

use self::arith::{Arith, ArithOp};
use self::boolean::{And, Not, Or};
use self::comparison::{CmpOp, Compare};
use self::is::{IsNotNull, IsNull};
use self::numeric::{Abs, Negate};
use crate::expr::FunctionOptions;
use crate::functions::registry::FunctionRegistry;

/// Build a registry holding the builtin kernels and their
/// host-language aliases.
pub fn builtin_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();

    registry.register(Arc::new(Compare { op: CmpOp::Eq }));
    registry.register(Arc::new(Compare { op: CmpOp::Neq }));
    registry.register(Arc::new(Compare { op: CmpOp::Lt }));
    registry.register(Arc::new(Compare { op: CmpOp::LtEq }));
    registry.register(Arc::new(Compare { op: CmpOp::Gt }));
    registry.register(Arc::new(Compare { op: CmpOp::GtEq }));

    registry.register(Arc::new(Arith { op: ArithOp::Add }));
    registry.register(Arc::new(Arith { op: ArithOp::Sub }));
    registry.register(Arc::new(Arith { op: ArithOp::Mul }));
    registry.register(Arc::new(Arith { op: ArithOp::Div }));

    registry.register(Arc::new(And));
    registry.register(Arc::new(Or));
    registry.register(Arc::new(Not));

    registry.register(Arc::new(IsNull));
    registry.register(Arc::new(IsNotNull));

    registry.register(Arc::new(Abs));
    registry.register(Arc::new(Negate));

    let no_overlay = [
        ("==", "eq"),
        ("!=", "neq"),
        ("<", "lt"),
        ("<=", "lt_eq"),
        (">", "gt"),
        (">=", "gt_eq"),
        ("+", "add"),
        ("-", "sub"),
        ("*", "mul"),
        ("/", "div"),
        ("&", "and"),
        ("|", "or"),
        ("!", "not"),
    ];
    for (alias, canonical) in no_overlay {
        registry
            .register_alias(alias, canonical, FunctionOptions::new())
            .expect("alias targets a registered kernel");
    }

    // Host-language null checks treat NaN as missing; the overlay pins
    // that behavior.
    let nan_overlay =
        FunctionOptions::from([("nan_is_null".to_string(), ScalarValue::Boolean(true))]);
    for alias in ["is.na", "is_nan_or_null"] {
        registry
            .register_alias(alias, "is_null", nan_overlay.clone())
            .expect("alias targets a registered kernel");
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_resolve() {
        let registry = builtin_registry();
        for name in ["eq", "add", "and", "is_null", "abs", "negate"] {
            assert!(registry.resolve(name).is_some(), "missing builtin: {name}");
        }
    }

    #[test]
    fn operator_aliases_resolve() {
        let registry = builtin_registry();
        let binding = registry.resolve(">").unwrap();
        assert_eq!("gt", binding.kernel.name());
    }
}
