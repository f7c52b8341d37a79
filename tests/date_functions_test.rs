use rand::{rngs::StdRng, Rng, SeedableRng};
use sqlexpr::config::EvalConfig;
use sqlexpr::expression::{
    DateFunctions, DatePartType, ExecutorContext, Expression, ExpressionError, ExpressionUtil,
};
use sqlexpr::types::{CmpBool, DataType, Value, ValueFactory};

const DATE: &str = "2017-01-01 12:13:14.999999+00";

fn timestamp(text: &str) -> Value {
    ValueFactory::cast_as_timestamp(&ValueFactory::get_varchar_value(text)).unwrap()
}

fn extract_expr(part: DatePartType, text: &str) -> Expression {
    let part = ExpressionUtil::constant_value_factory(ValueFactory::get_integer_value(part.code()));
    let ts = ExpressionUtil::constant_value_factory(timestamp(text));
    Expression::function("extract", vec![part, ts]).unwrap()
}

#[test]
fn test_extract_table() {
    // Values match EXTRACT(<part> FROM CAST('2017-01-01 12:13:14.999999+00' AS TIMESTAMP)),
    // except DAY, which uses the legacy day numbering.
    let data = [
        (DatePartType::Century, 21.0),
        (DatePartType::Decade, 201.0),
        (DatePartType::Dow, 0.0),
        (DatePartType::Doy, 1.0),
        (DatePartType::Year, 2017.0),
        (DatePartType::Month, 1.0),
        (DatePartType::Day, 2.0),
        (DatePartType::Hour, 12.0),
        (DatePartType::Minute, 13.0),
        // With and without the trailing 's'
        (DatePartType::Second, 14.0),
        (DatePartType::SECONDS, 14.0),
        (DatePartType::Millisecond, 14999.999),
        (DatePartType::MILLISECONDS, 14999.999),
    ];

    for (part, expected) in data {
        let mut expr = extract_expr(part, DATE);
        ExpressionUtil::transform_expression(None, &mut expr);
        // DAY depends on the evaluation config and stays a call
        assert_eq!(
            expr.is_constant(),
            part != DatePartType::Day,
            "extract({}) folded to {}",
            part,
            expr
        );

        // No tuple value expressions, so no tuple or schema is needed
        let expected = ValueFactory::get_decimal_value(expected);
        let result = expr.evaluate(None, None, None).unwrap();
        assert!(!result.is_null());
        assert_eq!(
            expected.compare_equals(&result),
            CmpBool::CmpTrue,
            "extract({}) = {}, expected {}",
            part,
            result,
            expected
        );
    }
}

#[test]
fn test_extract_by_name_matches_by_code() {
    for part in DatePartType::ALL {
        let by_name = Expression::function(
            "EXTRACT",
            vec![
                Expression::constant(Value::Varchar(part.as_str().to_uppercase())),
                Expression::constant(timestamp(DATE)),
            ],
        )
        .unwrap();
        let by_code = extract_expr(part, DATE);
        assert_eq!(
            by_name.evaluate(None, None, None).unwrap(),
            by_code.evaluate(None, None, None).unwrap(),
            "{}",
            part
        );
    }
}

#[test]
fn test_civil_day_of_month() {
    let ctx = ExecutorContext::new()
        .with_config(EvalConfig::default().with_civil_day_of_month(true));
    let expr = extract_expr(DatePartType::Day, DATE);
    assert_eq!(
        expr.evaluate(None, None, Some(&ctx)).unwrap(),
        Value::Decimal(1.0)
    );

    let mut folded = expr.clone();
    ExpressionUtil::transform_expression_with_context(None, &mut folded, Some(&ctx));
    assert_eq!(folded, Expression::constant(Value::Decimal(1.0)));
}

#[test]
fn test_plain_fold_keeps_day_config_sensitive() {
    let civil = ExecutorContext::new()
        .with_config(EvalConfig::default().with_civil_day_of_month(true));
    let original = extract_expr(DatePartType::Day, "2017-01-01 00:00:00+00");

    let mut folded = original.clone();
    ExpressionUtil::transform_expression(None, &mut folded);

    for ctx in [None, Some(&civil)] {
        assert_eq!(
            folded.evaluate(None, None, ctx).unwrap(),
            original.evaluate(None, None, ctx).unwrap()
        );
    }
    assert_eq!(
        folded.evaluate(None, None, Some(&civil)).unwrap(),
        Value::Decimal(1.0)
    );
}

#[test]
fn test_null_timestamp_yields_null_decimal() {
    let null_ts = ValueFactory::get_null_value_by_type(DataType::Timestamp);
    for part in DatePartType::ALL {
        let result = DateFunctions::extract(part, &null_ts).unwrap();
        assert!(result.is_null());
        assert_eq!(result.data_type(), DataType::Decimal);
    }

    // Through the tree, with folding
    let mut expr = Expression::function(
        "extract",
        vec![
            Expression::constant(Value::Integer(DatePartType::Year.code())),
            Expression::constant(null_ts),
        ],
    )
    .unwrap();
    ExpressionUtil::transform_expression(None, &mut expr);
    assert_eq!(expr, Expression::constant(Value::Null(DataType::Decimal)));
}

#[test]
fn test_synonyms_agree_on_random_timestamps() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        // Roughly years 1900..2100
        let micros = rng.gen_range(-2_208_988_800_000_000_i64..4_102_444_800_000_000_i64);
        let ts = Value::Timestamp(micros);

        let second = DateFunctions::extract(DatePartType::Second, &ts).unwrap();
        let seconds = DateFunctions::extract(DatePartType::SECONDS, &ts).unwrap();
        assert_eq!(second.compare_equals(&seconds), CmpBool::CmpTrue);

        let milli = DateFunctions::extract(DatePartType::Millisecond, &ts).unwrap();
        let millis = DateFunctions::extract(DatePartType::MILLISECONDS, &ts).unwrap();
        assert_eq!(milli.compare_equals(&millis), CmpBool::CmpTrue);

        // Milliseconds always cover the whole-second count
        let s = second.as_decimal().unwrap();
        let ms = milli.as_decimal().unwrap();
        assert!(ms >= s * 1000.0 && ms < (s + 1.0) * 1000.0, "{} vs {}", ms, s);

        let dow = DateFunctions::extract(DatePartType::Dow, &ts).unwrap();
        assert!((0.0..=6.0).contains(&dow.as_decimal().unwrap()));
    }
}

#[test]
fn test_non_timestamp_argument_is_invalid() {
    for arg in [
        Value::Varchar(DATE.to_string()),
        Value::Integer(2017),
        Value::Decimal(1.5),
    ] {
        let expr = Expression::function(
            "extract",
            vec![
                Expression::constant(Value::Integer(DatePartType::Year.code())),
                Expression::constant(arg),
            ],
        )
        .unwrap();
        assert!(matches!(
            expr.evaluate(None, None, None),
            Err(ExpressionError::InvalidArgument { .. })
        ));
    }
}

#[test]
fn test_unknown_date_part_is_unimplemented_at_evaluation() {
    // Code 6 is not assigned to any part
    let mut expr = Expression::function(
        "extract",
        vec![
            Expression::constant(Value::Integer(6)),
            Expression::constant(timestamp(DATE)),
        ],
    )
    .unwrap();

    // Folding leaves the failing call in place
    ExpressionUtil::transform_expression(None, &mut expr);
    assert!(!expr.is_constant());

    assert!(matches!(
        expr.evaluate(None, None, None),
        Err(ExpressionError::Unimplemented { .. })
    ));
}

#[test]
fn test_unknown_function_fails_at_construction() {
    let result = Expression::function(
        "extract_everything",
        vec![
            Expression::constant(Value::Integer(DatePartType::Year.code())),
            Expression::constant(timestamp(DATE)),
        ],
    );
    assert_eq!(
        result,
        Err(ExpressionError::UnsupportedFunction {
            name: "extract_everything".to_string()
        })
    );
}

#[test]
fn test_malformed_timestamp_literal() {
    for text in [
        "2017/01/01 12:13:14",
        "2017-01-01 12:13:14+1\u{e9}1",
        "2017-01-01 12:13:14.99\u{e9}",
    ] {
        let result = ValueFactory::cast_as_timestamp(&ValueFactory::get_varchar_value(text));
        assert!(
            matches!(result, Err(ExpressionError::TypeError { .. })),
            "{:?}",
            text
        );
    }
}

#[test]
fn test_timestamp_string_round_trip() {
    for text in [
        DATE,
        "2017-01-01 12:13:14+00",
        "1999-12-31 23:59:59-08:00",
        "2024-02-29T06:30:00Z",
    ] {
        let first = ValueFactory::cast_as_varchar(&timestamp(text)).unwrap();
        let second =
            ValueFactory::cast_as_varchar(&ValueFactory::cast_as_timestamp(&first).unwrap())
                .unwrap();
        assert_eq!(first, second, "{}", text);
    }
}

#[test]
fn test_date_trunc_through_tree() {
    let expr = Expression::function(
        "date_trunc",
        vec![
            Expression::constant(Value::Varchar("month".to_string())),
            Expression::constant(timestamp(DATE)),
        ],
    )
    .unwrap();
    let result = expr.evaluate(None, None, None).unwrap();
    assert_eq!(result.to_string(), "2017-01-01 00:00:00+00");
}
