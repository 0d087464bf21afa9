// Environment: a flat mapping from identifier name to current value.
// Keys are only ever added, never removed; once a key's first value has
// a given tag, every later write under that key must share it.

use crate::ast::Value;
use crate::error::PrimError;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
        }
    }

    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), PrimError> {
        if let Some(existing) = self.values.get(name) {
            if std::mem::discriminant(existing) != std::mem::discriminant(&value) {
                return Err(PrimError::no_line("Variable type does not match."));
            }
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Value, PrimError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| PrimError::no_line("Variable not declared."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_assign_binds_type() {
        let mut env = Environment::new();
        env.assign("x", Value::Num(1)).unwrap();
        assert_eq!(env.get("x").unwrap(), Value::Num(1));
    }

    #[test]
    fn reassign_same_type_ok() {
        let mut env = Environment::new();
        env.assign("x", Value::Num(1)).unwrap();
        env.assign("x", Value::Num(2)).unwrap();
        assert_eq!(env.get("x").unwrap(), Value::Num(2));
    }

    #[test]
    fn reassign_different_type_errors() {
        let mut env = Environment::new();
        env.assign("x", Value::Num(1)).unwrap();
        let err = env.assign("x", Value::Str("a".to_string())).unwrap_err();
        assert_eq!(err.message, "Variable type does not match.");
    }

    #[test]
    fn get_undeclared_errors() {
        let env = Environment::new();
        let err = env.get("x").unwrap_err();
        assert_eq!(err.message, "Variable not declared.");
    }
}
