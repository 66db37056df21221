use sqlparser::ast as sql;

use super::query::convert_query;
use crate::ast::{BinaryOperator, ColumnRef, Expr, Function, Literal, UnaryOperator};

pub fn convert_expr(expr: &sql::Expr) -> Expr {
    match expr {
        sql::Expr::Identifier(ident) => Expr::column(&ident.value),
        sql::Expr::CompoundIdentifier(parts) => {
            let len = parts.len();
            Expr::Column(ColumnRef {
                qualifier: (len >= 2).then(|| parts[len - 2].value.as_str().into()),
                name:      parts
                    .last()
                    .map(|p| p.value.as_str().into())
                    .unwrap_or_default()
            })
        }
        sql::Expr::Value(value) => convert_value(&value.value),
        sql::Expr::TypedString(typed) => Expr::Cast {
            expr:      Box::new(convert_value(&typed.value.value)),
            data_type: typed.data_type.to_string().into()
        },
        sql::Expr::BinaryOp {
            left,
            op,
            right
        } => Expr::BinaryOp {
            left:  Box::new(convert_expr(left)),
            op:    convert_binary_op(op),
            right: Box::new(convert_expr(right))
        },
        sql::Expr::UnaryOp {
            op,
            expr
        } => match (op, expr.as_ref()) {
            (
                sql::UnaryOperator::Minus,
                sql::Expr::Value(sql::ValueWithSpan {
                    value: sql::Value::Number(n, _),
                    ..
                })
            ) => Expr::Literal(Literal::Number(format!("-{}", n).into())),
            _ => Expr::UnaryOp {
                op:   convert_unary_op(op),
                expr: Box::new(convert_expr(expr))
            }
        },
        sql::Expr::Nested(inner) => Expr::Nested(Box::new(convert_expr(inner))),
        sql::Expr::IsNull(inner) => Expr::IsNull {
            expr:    Box::new(convert_expr(inner)),
            negated: false
        },
        sql::Expr::IsNotNull(inner) => Expr::IsNull {
            expr:    Box::new(convert_expr(inner)),
            negated: true
        },
        sql::Expr::InList {
            expr,
            list,
            negated
        } => Expr::InList {
            expr:    Box::new(convert_expr(expr)),
            list:    list.iter().map(convert_expr).collect(),
            negated: *negated
        },
        sql::Expr::InSubquery {
            expr,
            subquery,
            negated
        } => Expr::InSubquery {
            expr:     Box::new(convert_expr(expr)),
            subquery: Box::new(convert_query(subquery)),
            negated:  *negated
        },
        sql::Expr::Exists {
            subquery,
            negated
        } => Expr::Exists {
            subquery: Box::new(convert_query(subquery)),
            negated:  *negated
        },
        sql::Expr::Subquery(query) => Expr::Subquery(Box::new(convert_query(query))),
        sql::Expr::Like {
            negated,
            expr,
            pattern,
            ..
        } => Expr::Like {
            expr:             Box::new(convert_expr(expr)),
            pattern:          Box::new(convert_expr(pattern)),
            negated:          *negated,
            case_insensitive: false
        },
        sql::Expr::ILike {
            negated,
            expr,
            pattern,
            ..
        } => Expr::Like {
            expr:             Box::new(convert_expr(expr)),
            pattern:          Box::new(convert_expr(pattern)),
            negated:          *negated,
            case_insensitive: true
        },
        sql::Expr::Between {
            expr,
            negated,
            low,
            high
        } => Expr::Between {
            expr:    Box::new(convert_expr(expr)),
            low:     Box::new(convert_expr(low)),
            high:    Box::new(convert_expr(high)),
            negated: *negated
        },
        sql::Expr::Function(func) => Expr::Function(convert_function(func)),
        sql::Expr::Case {
            operand,
            conditions,
            else_result,
            ..
        } => Expr::Case {
            operand:     operand.as_ref().map(|o| Box::new(convert_expr(o))),
            branches:    conditions
                .iter()
                .map(|when| (convert_expr(&when.condition), convert_expr(&when.result)))
                .collect(),
            else_result: else_result.as_ref().map(|e| Box::new(convert_expr(e)))
        },
        sql::Expr::Cast {
            expr,
            data_type,
            ..
        } => Expr::Cast {
            expr:      Box::new(convert_expr(expr)),
            data_type: data_type.to_string().into()
        },
        other => {
            tracing::debug!(sql = %other, "expression kept as opaque");
            Expr::Other(other.to_string())
        }
    }
}

fn convert_value(value: &sql::Value) -> Expr {
    let literal = match value {
        sql::Value::Number(n, _) => Literal::Number(n.as_str().into()),
        sql::Value::SingleQuotedString(s)
        | sql::Value::DoubleQuotedString(s)
        | sql::Value::TripleSingleQuotedString(s)
        | sql::Value::TripleDoubleQuotedString(s)
        | sql::Value::NationalStringLiteral(s)
        | sql::Value::EscapedStringLiteral(s) => Literal::String(s.clone()),
        sql::Value::DollarQuotedString(s) => Literal::String(s.value.clone()),
        sql::Value::Boolean(b) => Literal::Boolean(*b),
        sql::Value::Null => Literal::Null,
        sql::Value::Placeholder(p) => Literal::Placeholder(p.as_str().into()),
        other => return Expr::Other(other.to_string())
    };
    Expr::Literal(literal)
}

fn convert_function(func: &sql::Function) -> Function {
    let mut out = Function {
        name:     func.name.to_string().into(),
        args:     Vec::new(),
        wildcard: false,
        distinct: false,
        windowed: func.over.is_some()
    };
    match &func.args {
        sql::FunctionArguments::None => {}
        sql::FunctionArguments::Subquery(query) => {
            out.args
                .push(Expr::Subquery(Box::new(convert_query(query))));
        }
        sql::FunctionArguments::List(list) => {
            out.distinct = matches!(
                list.duplicate_treatment,
                Some(sql::DuplicateTreatment::Distinct)
            );
            for arg in &list.args {
                let arg = match arg {
                    sql::FunctionArg::Unnamed(arg)
                    | sql::FunctionArg::Named {
                        arg, ..
                    }
                    | sql::FunctionArg::ExprNamed {
                        arg, ..
                    } => arg
                };
                match arg {
                    sql::FunctionArgExpr::Expr(e) => out.args.push(convert_expr(e)),
                    sql::FunctionArgExpr::Wildcard | sql::FunctionArgExpr::QualifiedWildcard(_) => {
                        out.wildcard = true
                    }
                }
            }
        }
    }
    out
}

fn convert_binary_op(op: &sql::BinaryOperator) -> BinaryOperator {
    match op {
        sql::BinaryOperator::Eq => BinaryOperator::Eq,
        sql::BinaryOperator::NotEq => BinaryOperator::NotEq,
        sql::BinaryOperator::Lt => BinaryOperator::Lt,
        sql::BinaryOperator::LtEq => BinaryOperator::LtEq,
        sql::BinaryOperator::Gt => BinaryOperator::Gt,
        sql::BinaryOperator::GtEq => BinaryOperator::GtEq,
        sql::BinaryOperator::And => BinaryOperator::And,
        sql::BinaryOperator::Or => BinaryOperator::Or,
        sql::BinaryOperator::Plus => BinaryOperator::Plus,
        sql::BinaryOperator::Minus => BinaryOperator::Minus,
        sql::BinaryOperator::Multiply => BinaryOperator::Multiply,
        sql::BinaryOperator::Divide => BinaryOperator::Divide,
        sql::BinaryOperator::Modulo => BinaryOperator::Modulo,
        sql::BinaryOperator::StringConcat => BinaryOperator::Concat,
        other => BinaryOperator::Other(other.to_string().into())
    }
}

fn convert_unary_op(op: &sql::UnaryOperator) -> UnaryOperator {
    match op {
        sql::UnaryOperator::Not => UnaryOperator::Not,
        sql::UnaryOperator::Minus => UnaryOperator::Minus,
        sql::UnaryOperator::Plus => UnaryOperator::Plus,
        other => UnaryOperator::Other(other.to_string().into())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{BinaryOperator, Expr, Literal, SetExpr, Statement},
        parse::{SqlDialect, parse_statement}
    };

    fn where_expr(sql: &str) -> Expr {
        let Statement::Select(q) = parse_statement(sql, SqlDialect::Generic).unwrap() else {
            panic!("expected query");
        };
        let SetExpr::Select(select) = q.body else {
            panic!("expected select body");
        };
        select.selection.unwrap()
    }

    #[test]
    fn test_negative_number_literal() {
        let Expr::BinaryOp {
            right, ..
        } = where_expr("SELECT 1 FROM t WHERE a = -5")
        else {
            panic!("expected comparison");
        };
        assert_eq!(right.as_literal(), Some(&Literal::Number("-5".into())));
    }

    #[test]
    fn test_not_equal_spellings() {
        for sql in ["SELECT 1 FROM t WHERE a <> 1", "SELECT 1 FROM t WHERE a != 1"] {
            let Expr::BinaryOp {
                op, ..
            } = where_expr(sql)
            else {
                panic!("expected comparison");
            };
            assert_eq!(op, BinaryOperator::NotEq);
        }
    }

    #[test]
    fn test_count_star_and_distinct() {
        let Statement::Select(q) =
            parse_statement("SELECT COUNT(*), COUNT(DISTINCT a) FROM t", SqlDialect::Generic)
                .unwrap()
        else {
            panic!("expected query");
        };
        let SetExpr::Select(select) = q.body else {
            panic!("expected select body");
        };
        let funcs: Vec<_> = select
            .projection
            .iter()
            .filter_map(|item| match item {
                crate::ast::SelectItem::Expr {
                    expr: Expr::Function(f),
                    ..
                } => Some((f.wildcard, f.distinct, f.is_aggregate())),
                _ => None
            })
            .collect();
        assert_eq!(funcs, vec![(true, false, true), (false, true, true)]);
    }

    #[test]
    fn test_qualified_column() {
        let Expr::IsNull {
            expr,
            negated
        } = where_expr("SELECT 1 FROM t WHERE db.t.col IS NOT NULL")
        else {
            panic!("expected IS NULL");
        };
        assert!(negated);
        let col = expr.as_column().unwrap();
        assert_eq!(col.qualifier.as_deref(), Some("t"));
        assert_eq!(col.name, "col");
    }
}
