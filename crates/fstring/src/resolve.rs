//! Path resolution against a value map.
//!
//! A bare identifier is a direct lookup. A chain starts the same way and then
//! reads one segment at a time from the current value:
//!
//! - `name()` calls the zero-argument method `name`;
//! - `name` reads the field `name`, falling back to the getter `getName()`;
//! - once the current value is `null` the rest of the chain is skipped and
//!   the result is `null`.

use std::borrow::Cow;

use crate::cache::AccessorCache;
use crate::config::EngineConfig;
use crate::error::{AccessError, FormatError, Result};
use crate::introspect::AccessKind;
use crate::path::{getter_name, PathExpr, PathSegment};
use crate::value::{Value, ValueMap};

/// Resolves `expression` against `values`.
pub(crate) fn resolve<'v>(
    expression: &str,
    values: &'v ValueMap,
    accessors: &AccessorCache,
    config: &EngineConfig,
) -> Result<Cow<'v, Value>> {
    let path = PathExpr::parse(expression)?;

    let root = values
        .get(path.root())
        .ok_or_else(|| FormatError::KeyNotFound {
            key: path.root().to_owned(),
        })?;

    let mut current = Cow::Borrowed(root);
    for segment in path.segments() {
        if current.is_null() {
            break;
        }
        let next = read_segment(&current, segment, accessors, config).map_err(|source| {
            FormatError::Access {
                expression: expression.to_owned(),
                segment: segment.token().into_owned(),
                source,
            }
        })?;
        current = Cow::Owned(next);
    }

    Ok(current)
}

fn read_segment(
    current: &Value,
    segment: &PathSegment<'_>,
    accessors: &AccessorCache,
    config: &EngineConfig,
) -> std::result::Result<Value, AccessError> {
    let name = segment.name();
    config.check_accessor(name)?;

    let receiver = current
        .receiver()
        .ok_or(AccessError::NotIntrospectable {
            kind: current.kind(),
        })?;

    let accessor = if segment.is_call() {
        let token = segment.token();
        config.check_call(&token)?;
        accessors
            .lookup(receiver, &token, name, AccessKind::Method)
            .ok_or_else(|| AccessError::NoMethod {
                type_name: receiver.type_name(),
                method: name.to_owned(),
            })?
    } else if let Some(field) = accessors.lookup(receiver, name, name, AccessKind::Field) {
        field
    } else {
        let getter = getter_name(name);
        let token = format!("{}()", getter);
        config.check_call(&token)?;
        accessors
            .lookup(receiver, &token, &getter, AccessKind::Method)
            .ok_or_else(|| AccessError::NoFieldOrGetter {
                type_name: receiver.type_name(),
                field: name.to_owned(),
                getter,
            })?
    };

    receiver.invoke(&accessor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{Accessor, Introspectable};
    use std::sync::Arc;

    struct Account {
        owner: String,
        balance: i64,
        parent: Option<Arc<Account>>,
    }

    impl Account {
        fn age(&self) -> u32 {
            7
        }

        fn summary(&self) -> String {
            format!("{}: {}", self.owner, self.balance)
        }
    }

    impl Introspectable for Account {
        fn resolve_accessor(&self, name: &str, kind: AccessKind) -> Option<Accessor> {
            match (kind, name) {
                (AccessKind::Field, "owner") => Some(Accessor::field(0, "owner")),
                (AccessKind::Field, "balance") => Some(Accessor::field(1, "balance")),
                (AccessKind::Field, "parent") => Some(Accessor::field(2, "parent")),
                (AccessKind::Method, "getAge") => Some(Accessor::method(3, "getAge")),
                (AccessKind::Method, "summary") => Some(Accessor::method(4, "summary")),
                _ => None,
            }
        }

        fn invoke(&self, accessor: &Accessor) -> std::result::Result<Value, AccessError> {
            match accessor.slot() {
                0 => Ok(self.owner.as_str().into()),
                1 => Ok(self.balance.into()),
                2 => Ok(self.parent.clone().into()),
                3 => Ok(self.age().into()),
                4 => Ok(self.summary().into()),
                slot => Err(AccessError::UnknownSlot {
                    type_name: self.type_name(),
                    slot,
                }),
            }
        }
    }

    fn account(parent: Option<Arc<Account>>) -> Value {
        Value::object(Account {
            owner: "Ada".into(),
            balance: 10,
            parent,
        })
    }

    fn run(expression: &str, values: &ValueMap) -> Result<Value> {
        run_with(expression, values, &EngineConfig::default())
    }

    fn run_with(expression: &str, values: &ValueMap, config: &EngineConfig) -> Result<Value> {
        let accessors = AccessorCache::new();
        resolve(expression, values, &accessors, config).map(Cow::into_owned)
    }

    #[test]
    fn simple_lookup() {
        let values = ValueMap::new().with("a", "x");
        assert_eq!(run("a", &values).unwrap(), Value::from("x"));
    }

    #[test]
    fn simple_lookup_borrows() {
        let values = ValueMap::new().with("a", "x");
        let accessors = AccessorCache::new();
        let value = resolve("a", &values, &accessors, &EngineConfig::default()).unwrap();
        assert!(matches!(value, Cow::Borrowed(_)));
    }

    #[test]
    fn missing_key() {
        let err = run("a", &ValueMap::new()).unwrap_err();
        assert!(matches!(err, FormatError::KeyNotFound { key } if key == "a"));

        let err = run("a.b", &ValueMap::new()).unwrap_err();
        assert!(matches!(err, FormatError::KeyNotFound { key } if key == "a"));
    }

    #[test]
    fn null_is_a_value() {
        let values = ValueMap::new().with("a", Value::Null);
        assert_eq!(run("a", &values).unwrap(), Value::Null);
    }

    #[test]
    fn invalid_path_fails_before_lookup() {
        let err = run("a b", &ValueMap::new()).unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedExpression { .. }));
    }

    #[test]
    fn field_chain() {
        let values = ValueMap::new().with("acct", account(None));
        assert_eq!(run("acct.owner", &values).unwrap(), Value::from("Ada"));
        assert_eq!(run("acct.balance", &values).unwrap(), Value::from(10i64));
    }

    #[test]
    fn method_call() {
        let values = ValueMap::new().with("acct", account(None));
        assert_eq!(run("acct.summary()", &values).unwrap(), Value::from("Ada: 10"));
    }

    #[test]
    fn getter_fallback() {
        let values = ValueMap::new().with("acct", account(None));
        assert_eq!(run("acct.age", &values).unwrap(), Value::from(7u32));
    }

    #[test]
    fn null_short_circuits() {
        let values = ValueMap::new()
            .with("acct", account(None))
            .with("nothing", Value::Null);

        assert_eq!(run("acct.parent.owner", &values).unwrap(), Value::Null);
        assert_eq!(run("acct.parent.whatever.else()", &values).unwrap(), Value::Null);
        assert_eq!(run("nothing.anything", &values).unwrap(), Value::Null);
    }

    #[test]
    fn nested_objects() {
        let parent = Arc::new(Account {
            owner: "Grace".into(),
            balance: 99,
            parent: None,
        });
        let values = ValueMap::new().with("acct", account(Some(parent)));
        assert_eq!(run("acct.parent.owner", &values).unwrap(), Value::from("Grace"));
        assert_eq!(run("acct.parent.owner.len()", &values).unwrap(), Value::from(5usize));
    }

    #[test]
    fn missing_field_and_getter() {
        let values = ValueMap::new().with("acct", account(None));
        let err = run("acct.nickname", &values).unwrap_err();

        match err {
            FormatError::Access {
                expression,
                segment,
                source,
            } => {
                assert_eq!(expression, "acct.nickname");
                assert_eq!(segment, "nickname");
                assert!(matches!(
                    source,
                    AccessError::NoFieldOrGetter { ref getter, .. } if getter == "getNickname"
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_method() {
        let values = ValueMap::new().with("acct", account(None));
        let err = run("acct.owner()", &values).unwrap_err();
        assert!(matches!(
            err,
            FormatError::Access {
                source: AccessError::NoMethod { .. },
                ..
            }
        ));
    }

    #[test]
    fn scalars_have_no_accessors() {
        let values = ValueMap::new().with("n", 3);
        let err = run("n.value", &values).unwrap_err();
        assert!(matches!(
            err,
            FormatError::Access {
                source: AccessError::NotIntrospectable { kind: "number" },
                ..
            }
        ));
    }

    #[test]
    fn method_calls_can_be_disabled() {
        let values = ValueMap::new().with("acct", account(None));
        let config = EngineConfig::new().allow_method_calls(false);

        assert_eq!(run_with("acct.owner", &values, &config).unwrap(), Value::from("Ada"));
        for expression in ["acct.summary()", "acct.age"] {
            let err = run_with(expression, &values, &config).unwrap_err();
            assert!(matches!(
                err,
                FormatError::Access {
                    source: AccessError::Denied { .. },
                    ..
                }
            ));
        }
    }

    #[test]
    fn allow_list_restricts_segments() {
        let values = ValueMap::new().with("acct", account(None));
        let config = EngineConfig::new().allow_accessors(["owner"]);

        assert_eq!(run_with("acct.owner", &values, &config).unwrap(), Value::from("Ada"));
        let err = run_with("acct.balance", &values, &config).unwrap_err();
        assert!(err.to_string().contains("not allowed"));
    }
}
