use std::cmp::Ordering;

use serde_json::Value;

use super::ast::*;

pub(super) fn eval_segments<'a>(segments: &[Segment], root: &'a Value) -> Vec<&'a Value> {
    let mut nodes = vec![root];
    for seg in segments {
        nodes = nodes.into_iter().flat_map(|n| apply_segment(seg, n)).collect();
    }
    nodes
}

fn apply_segment<'a>(seg: &Segment, node: &'a Value) -> Vec<&'a Value> {
    match seg {
        Segment::Child(sel) => select(sel, node),
        Segment::Descendant(sel) => {
            let mut out = vec![];
            visit_descendants(node, &mut |n| out.extend(select(sel, n)));
            out
        },
    }
}

// Pre-order walk over a node and everything underneath it
fn visit_descendants<'a>(node: &'a Value, f: &mut impl FnMut(&'a Value)) {
    f(node);
    match node {
        Value::Array(items) => items.iter().for_each(|v| visit_descendants(v, f)),
        Value::Object(fields) => fields.values().for_each(|v| visit_descendants(v, f)),
        _ => (),
    }
}

fn select<'a>(sel: &Selector, node: &'a Value) -> Vec<&'a Value> {
    match (sel, node) {
        (Selector::Name(name), Value::Object(fields)) => fields.get(name).into_iter().collect(),
        (Selector::Wildcard, Value::Object(fields)) => fields.values().collect(),
        (Selector::Wildcard, Value::Array(items)) => items.iter().collect(),
        (Selector::Index(i), Value::Array(items)) => normalize(*i, items.len()).and_then(|i| items.get(i)).into_iter().collect(),
        (Selector::Slice { start, end, step }, Value::Array(items)) => slice(items, *start, *end, *step),
        (Selector::Union(sels), _) => sels.iter().flat_map(|s| select(s, node)).collect(),
        (Selector::Filter(expr), Value::Array(items)) => items.iter().filter(|v| matches(expr, v)).collect(),
        (Selector::Filter(expr), Value::Object(fields)) => fields.values().filter(|v| matches(expr, v)).collect(),
        _ => vec![],
    }
}

fn normalize(i: i64, len: usize) -> Option<usize> {
    let idx = if i < 0 { len as i64 + i } else { i };
    usize::try_from(idx).ok()
}

// Python-style slicing: negative bounds count from the end, and a zero step selects nothing
fn slice(items: &[Value], start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Vec<&Value> {
    let len = items.len() as i64;
    let step = step.unwrap_or(1);
    let bound = |i: i64| if i < 0 { len + i } else { i };

    let mut out = vec![];
    match step.cmp(&0) {
        Ordering::Equal => (),
        Ordering::Greater => {
            let mut i = start.map(bound).unwrap_or(0).clamp(0, len);
            let hi = end.map(bound).unwrap_or(len).clamp(0, len);
            while i < hi {
                out.push(&items[i as usize]);
                let Some(next) = i.checked_add(step) else { break };
                i = next;
            }
        },
        Ordering::Less => {
            let mut i = start.map(bound).unwrap_or(len - 1).clamp(-1, len - 1);
            let lo = end.map(bound).unwrap_or(-1).clamp(-1, len - 1);
            while i > lo {
                out.push(&items[i as usize]);
                let Some(next) = i.checked_add(step) else { break };
                i = next;
            }
        },
    }
    out
}

fn matches(expr: &FilterExpr, current: &Value) -> bool {
    match expr {
        FilterExpr::Or(exprs) => exprs.iter().any(|e| matches(e, current)),
        FilterExpr::And(exprs) => exprs.iter().all(|e| matches(e, current)),
        FilterExpr::Not(e) => !matches(e, current),
        FilterExpr::Exists(path) => !eval_segments(path, current).is_empty(),
        FilterExpr::Compare { lhs, op, rhs } => {
            let (lhs, rhs) = (resolve(lhs, current), resolve(rhs, current));
            match op {
                CmpOp::Eq => values_equal(lhs, rhs),
                CmpOp::Ne => !values_equal(lhs, rhs),
                CmpOp::Lt => compare(lhs, rhs) == Some(Ordering::Less),
                CmpOp::Le => matches!(compare(lhs, rhs), Some(Ordering::Less | Ordering::Equal)),
                CmpOp::Gt => compare(lhs, rhs) == Some(Ordering::Greater),
                CmpOp::Ge => matches!(compare(lhs, rhs), Some(Ordering::Greater | Ordering::Equal)),
            }
        },
    }
}

// A path operand that selects nothing resolves to None; if it selects several nodes, the first one
// is used
fn resolve<'a>(operand: &'a Operand, current: &'a Value) -> Option<&'a Value> {
    match operand {
        Operand::Literal(v) => Some(v),
        Operand::Path(path) => eval_segments(path, current).into_iter().next(),
    }
}

fn values_equal(lhs: Option<&Value>, rhs: Option<&Value>) -> bool {
    match (lhs, rhs) {
        (Some(Value::Number(l)), Some(Value::Number(r))) => l.as_f64() == r.as_f64(),
        (Some(l), Some(r)) => l == r,
        (None, None) => true,
        _ => false,
    }
}

fn compare(lhs: Option<&Value>, rhs: Option<&Value>) -> Option<Ordering> {
    match (lhs?, rhs?) {
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) if l == r => Some(Ordering::Equal),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}
