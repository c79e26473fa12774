use anyhow::{
    anyhow,
    bail,
};
use pest::iterators::Pair;
use serde_json::Value;

use super::Rule;

#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Child(Selector),
    Descendant(Selector),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Selector {
    Name(String),
    Wildcard,
    Index(i64),
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },
    Union(Vec<Selector>),
    Filter(FilterExpr),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Path(Vec<Segment>),
    Literal(Value),
}

#[derive(Clone, Debug, PartialEq)]
pub enum FilterExpr {
    Or(Vec<FilterExpr>),
    And(Vec<FilterExpr>),
    Not(Box<FilterExpr>),
    Exists(Vec<Segment>),
    Compare {
        lhs: Operand,
        op: CmpOp,
        rhs: Operand,
    },
}

pub(super) fn parse_path(path: Pair<Rule>) -> anyhow::Result<Vec<Segment>> {
    let mut segments = vec![];
    for p in path.into_inner() {
        match p.as_rule() {
            Rule::root | Rule::lone_dot | Rule::EOI => (),
            Rule::leading_name => segments.push(Segment::Child(Selector::Name(p.as_str().into()))),
            Rule::child | Rule::descendant => segments.push(parse_segment(p)?),
            rule => bail!("unexpected token in JSONPath: {rule:?}"),
        }
    }
    Ok(segments)
}

fn parse_segment(seg: Pair<Rule>) -> anyhow::Result<Segment> {
    let rule = seg.as_rule();
    let sel = parse_selector(first_inner(seg)?)?;
    match rule {
        Rule::child => Ok(Segment::Child(sel)),
        Rule::descendant => Ok(Segment::Descendant(sel)),
        _ => bail!("unexpected segment in JSONPath: {rule:?}"),
    }
}

fn parse_selector(sel: Pair<Rule>) -> anyhow::Result<Selector> {
    match sel.as_rule() {
        Rule::name => Ok(Selector::Name(sel.as_str().into())),
        Rule::wildcard => Ok(Selector::Wildcard),
        Rule::filter => Ok(Selector::Filter(parse_filter_expr(first_inner(sel)?)?)),
        Rule::union => {
            let mut elems = sel.into_inner().map(parse_union_elem).collect::<anyhow::Result<Vec<_>>>()?;
            if elems.len() == 1 {
                // the grammar never produces an empty union
                Ok(elems.remove(0))
            } else {
                Ok(Selector::Union(elems))
            }
        },
        rule => bail!("unexpected selector in JSONPath: {rule:?}"),
    }
}

fn parse_union_elem(elem: Pair<Rule>) -> anyhow::Result<Selector> {
    match elem.as_rule() {
        Rule::index => Ok(Selector::Index(parse_int(first_inner(elem)?)?)),
        Rule::sq_string | Rule::dq_string => Ok(Selector::Name(parse_quoted(elem)?)),
        Rule::wildcard => Ok(Selector::Wildcard),
        Rule::slice => {
            let (mut start, mut end, mut step) = (None, None, None);
            for part in elem.into_inner() {
                let rule = part.as_rule();
                let val = Some(parse_int(first_inner(part)?)?);
                match rule {
                    Rule::slice_start => start = val,
                    Rule::slice_end => end = val,
                    Rule::slice_step => step = val,
                    _ => bail!("unexpected slice component in JSONPath: {rule:?}"),
                }
            }
            Ok(Selector::Slice { start, end, step })
        },
        rule => bail!("unexpected bracket selector in JSONPath: {rule:?}"),
    }
}

fn parse_filter_expr(expr: Pair<Rule>) -> anyhow::Result<FilterExpr> {
    match expr.as_rule() {
        Rule::or_expr => collapse(expr, FilterExpr::Or),
        Rule::and_expr => collapse(expr, FilterExpr::And),
        Rule::not_expr => Ok(FilterExpr::Not(Box::new(parse_filter_expr(first_inner(expr)?)?))),
        Rule::exists => Ok(FilterExpr::Exists(parse_rel_path(first_inner(expr)?)?)),
        Rule::comparison => {
            let mut parts = expr.into_inner();
            let (Some(lhs), Some(op), Some(rhs)) = (parts.next(), parts.next(), parts.next()) else {
                bail!("incomplete comparison in JSONPath filter");
            };
            Ok(FilterExpr::Compare {
                lhs: parse_operand(lhs)?,
                op: parse_cmp_op(op.as_str())?,
                rhs: parse_operand(rhs)?,
            })
        },
        rule => bail!("unexpected filter expression in JSONPath: {rule:?}"),
    }
}

// Or and And nodes with a single child are just that child
fn collapse(expr: Pair<Rule>, build: fn(Vec<FilterExpr>) -> FilterExpr) -> anyhow::Result<FilterExpr> {
    let mut children = expr.into_inner().map(parse_filter_expr).collect::<anyhow::Result<Vec<_>>>()?;
    if children.len() == 1 { Ok(children.remove(0)) } else { Ok(build(children)) }
}

fn parse_rel_path(path: Pair<Rule>) -> anyhow::Result<Vec<Segment>> {
    path.into_inner().map(parse_segment).collect()
}

fn parse_operand(operand: Pair<Rule>) -> anyhow::Result<Operand> {
    Ok(match operand.as_rule() {
        Rule::rel_path => Operand::Path(parse_rel_path(operand)?),
        Rule::sq_string | Rule::dq_string => Operand::Literal(Value::String(parse_quoted(operand)?)),
        Rule::number => Operand::Literal(serde_json::from_str(operand.as_str())?),
        Rule::true_lit => Operand::Literal(Value::Bool(true)),
        Rule::false_lit => Operand::Literal(Value::Bool(false)),
        Rule::null_lit => Operand::Literal(Value::Null),
        rule => bail!("unexpected operand in JSONPath filter: {rule:?}"),
    })
}

fn parse_cmp_op(op: &str) -> anyhow::Result<CmpOp> {
    Ok(match op {
        "==" => CmpOp::Eq,
        "!=" => CmpOp::Ne,
        "<" => CmpOp::Lt,
        "<=" => CmpOp::Le,
        ">" => CmpOp::Gt,
        ">=" => CmpOp::Ge,
        _ => bail!("unknown comparison operator: {op}"),
    })
}

fn parse_int(int: Pair<Rule>) -> anyhow::Result<i64> {
    int.as_str()
        .parse()
        .map_err(|err| anyhow!("invalid integer {:?} in JSONPath: {err}", int.as_str()))
}

fn parse_quoted(quoted: Pair<Rule>) -> anyhow::Result<String> {
    let raw = first_inner(quoted)?.as_str();
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn first_inner(pair: Pair<Rule>) -> anyhow::Result<Pair<Rule>> {
    let rule = pair.as_rule();
    pair.into_inner()
        .next()
        .ok_or_else(|| anyhow!("malformed JSONPath: {rule:?} is empty"))
}
