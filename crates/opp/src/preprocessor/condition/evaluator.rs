//! NAND condition evaluator

use std::collections::HashSet;

use log::trace;

use super::scanner::top_level_separator;
use crate::common::ErrorKind;

/// Evaluates condition expressions against the set of defined variables
pub struct ConditionEvaluator<'a> {
    variables: &'a HashSet<String>,
}

impl<'a> ConditionEvaluator<'a> {
    pub fn new(variables: &'a HashSet<String>) -> Self {
        Self { variables }
    }

    /// Evaluate a full expression, splitting at the rightmost top-level `|`
    pub fn evaluate(&self, expr: &str) -> Result<bool, ErrorKind> {
        let expr = expr.trim();

        let result = match top_level_separator(expr) {
            None => self.evaluate_term(expr)?,
            Some(pos) => {
                let left = self.evaluate_term(expr[..pos].trim())?;
                let right = self.evaluate_term(expr[pos + 1..].trim())?;
                !left || !right
            }
        };

        trace!("evaluate({:?}) = {}", expr, result);
        Ok(result)
    }

    /// Evaluate a single `~NAME` or `~(...)` term
    fn evaluate_term(&self, term: &str) -> Result<bool, ErrorKind> {
        let Some(rest) = term.strip_prefix('~') else {
            return Err(ErrorKind::MalformedTerm {
                term: term.to_string(),
            });
        };

        if rest.len() >= 2 && rest.starts_with('(') && rest.ends_with(')') {
            return self.evaluate(&rest[1..rest.len() - 1]);
        }

        Ok(self.variables.contains(rest))
    }
}
