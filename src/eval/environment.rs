
//! The per-document variable environment: last-assigned value per
//! identifier, plus the implicit `last` binding. Grounded on the
//! teacher's `expr::var::table::VarTable<T>` (a thin `HashMap`
//! wrapper) — "ordered" in the data model's sense means "last
//! assignment wins", not iteration order, so a plain hash map is
//! faithful to the teacher's own choice for the same kind of table.

use super::value::Value;

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Environment {
  bindings: HashMap<String, Value>,
  last: Option<Value>,
}

impl Environment {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, name: &str) -> Option<&Value> {
    if name == "last" {
      return self.last.as_ref();
    }
    self.bindings.get(name)
  }

  pub fn assign(&mut self, name: impl Into<String>, value: Value) {
    self.bindings.insert(name.into(), value);
  }

  /// Records the result of a non-erroring expression line as the
  /// implicit `last` binding. Assignment lines and error lines do not
  /// touch `last` — §3's lifecycle note: "errors do not mutate [the
  /// environment]".
  pub fn record_last(&mut self, value: Value) {
    self.last = Some(value);
  }

  pub fn last(&self) -> Option<&Value> {
    self.last.as_ref()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::eval::number::Number;

  #[test]
  fn test_assign_and_get() {
    let mut env = Environment::new();
    env.assign("x", Value::number(Number::from(10i64)));
    assert!(env.get("x").is_some());
    assert!(env.get("y").is_none());
  }

  #[test]
  fn test_last_binding() {
    let mut env = Environment::new();
    assert!(env.get("last").is_none());
    env.record_last(Value::number(Number::from(5i64)));
    assert!(env.get("last").is_some());
  }

  #[test]
  fn test_reassignment_shadows() {
    let mut env = Environment::new();
    env.assign("x", Value::number(Number::from(1i64)));
    env.assign("x", Value::number(Number::from(2i64)));
    let (magnitude, _) = env.get("x").unwrap().as_number().unwrap();
    assert_eq!(magnitude, &Number::from(2i64));
  }
}
