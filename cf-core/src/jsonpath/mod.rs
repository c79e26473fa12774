mod ast;
mod eval;

use std::fmt;

use pest::Parser;
use pest_derive::Parser;
use serde_json::Value;

pub use self::ast::{
    CmpOp,
    FilterExpr,
    Operand,
    Segment,
    Selector,
};
use self::eval::eval_segments;

#[allow(dead_code)]
#[derive(Parser)]
#[grammar = "src/jsonpath/jsonpath.pest"]
struct JsonPathParser;

// A compiled JSONPath expression.  Parsing happens once up front so that a bad expression is
// reported before we start polling anything.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonPath {
    expr: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn parse(expr: &str) -> anyhow::Result<JsonPath> {
        let mut parsed = JsonPathParser::parse(Rule::path, expr)
            .map_err(|err| anyhow::anyhow!("invalid JSONPath expression {expr:?}: {err}"))?;

        let segments = match parsed.next() {
            Some(path) => ast::parse_path(path)?,
            None => vec![],
        };
        Ok(JsonPath { expr: expr.into(), segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn query<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        eval_segments(&self.segments, root)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

#[cfg(test)]
mod tests;
