//! Date strategy: every date literal resolves to a half-open instant range
//! `[start, end)` sized by the field's granularity, and comparisons are
//! expressed against the range bounds.

use super::{CompileError, LeafScope, Operand, ResolutionContext};
use crate::{
    filter::Operator,
    model::DateGranularity,
    sql::{BinaryOp, SqlExpr, SqlLiteral},
};
use serde::Deserialize;
use serde_json::Value;
use time::{
    Date, Duration, Month, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339,
};

///
/// DateMode
///
/// Structured date literal. Point modes name one calendar day; window modes
/// are only valid with `isWithin`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(tag = "mode", rename_all = "camelCase")]
enum DateMode {
    Today,
    Tomorrow,
    Yesterday,
    ExactDate {
        #[serde(rename = "exactDate")]
        exact_date: String,
    },
    DaysAgo {
        #[serde(rename = "numberOfDays")]
        number_of_days: u32,
    },
    DaysFromNow {
        #[serde(rename = "numberOfDays")]
        number_of_days: u32,
    },
    PastWeek,
    PastMonth,
    PastYear,
    NextWeek,
    NextMonth,
    NextYear,
    PastNumberOfDays {
        #[serde(rename = "numberOfDays")]
        number_of_days: u32,
    },
    NextNumberOfDays {
        #[serde(rename = "numberOfDays")]
        number_of_days: u32,
    },
}

///
/// Span
///
/// Half-open instant range.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Span {
    start: OffsetDateTime,
    end: OffsetDateTime,
}

///
/// DateComparison
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum DateComparison {
    Is,
    IsNot,
    Before,
    After,
    OnOrBefore,
    OnOrAfter,
}

impl DateComparison {
    const fn from_operator(operator: Operator) -> Option<Self> {
        match operator {
            Operator::Is => Some(Self::Is),
            Operator::IsNot => Some(Self::IsNot),
            Operator::IsBefore | Operator::IsLess => Some(Self::Before),
            Operator::IsAfter | Operator::IsGreater => Some(Self::After),
            Operator::IsOnOrBefore | Operator::IsLessEqual => Some(Self::OnOrBefore),
            Operator::IsOnOrAfter | Operator::IsGreaterEqual => Some(Self::OnOrAfter),
            _ => None,
        }
    }

    fn against_span(self, column: SqlExpr, start: SqlExpr, end: SqlExpr) -> SqlExpr {
        match self {
            Self::Is => SqlExpr::and(vec![
                SqlExpr::binary(BinaryOp::Gte, column.clone(), start),
                SqlExpr::binary(BinaryOp::Lt, column, end),
            ]),
            Self::IsNot => SqlExpr::or(vec![
                SqlExpr::is_null(column.clone()),
                SqlExpr::binary(BinaryOp::Lt, column.clone(), start),
                SqlExpr::binary(BinaryOp::Gte, column, end),
            ]),
            Self::Before => SqlExpr::binary(BinaryOp::Lt, column, start),
            Self::After => SqlExpr::binary(BinaryOp::Gte, column, end),
            Self::OnOrBefore => SqlExpr::binary(BinaryOp::Lt, column, end),
            Self::OnOrAfter => SqlExpr::binary(BinaryOp::Gte, column, start),
        }
    }

    fn against_column(self, column: SqlExpr, other: SqlExpr) -> SqlExpr {
        match self {
            Self::Is => SqlExpr::eq(column, other),
            Self::IsNot => SqlExpr::or(vec![
                SqlExpr::is_null(column.clone()),
                SqlExpr::ne(column, other),
            ]),
            Self::Before => SqlExpr::binary(BinaryOp::Lt, column, other),
            Self::After => SqlExpr::binary(BinaryOp::Gt, column, other),
            Self::OnOrBefore => SqlExpr::binary(BinaryOp::Lte, column, other),
            Self::OnOrAfter => SqlExpr::binary(BinaryOp::Gte, column, other),
        }
    }
}

pub(super) fn compile(
    scope: &LeafScope<'_>,
    operand: &Operand<'_>,
    ctx: &ResolutionContext,
) -> Result<Option<SqlExpr>, CompileError> {
    let column = scope.column_expr();

    match scope.operator {
        Operator::IsEmpty => return Ok(Some(SqlExpr::is_null(column))),
        Operator::IsNotEmpty => return Ok(Some(SqlExpr::is_not_null(column))),
        Operator::IsWithin => {
            let value = match operand {
                Operand::Literal(value) => *value,
                Operand::Column(_) => return Err(scope.field_ref_unsupported()),
                Operand::Absent => return Ok(None),
            };
            let span = resolve_window(scope, value, ctx)?;
            let (start, end) = span_bounds(scope, span)?;

            return Ok(Some(DateComparison::Is.against_span(column, start, end)));
        }
        _ => {}
    }

    let comparison = DateComparison::from_operator(scope.operator)
        .ok_or_else(|| scope.unsupported())?;

    match operand {
        Operand::Absent => Ok(None),
        Operand::Column(other) => Ok(Some(
            comparison.against_column(column, SqlExpr::column(other.as_str())),
        )),
        Operand::Literal(value) => {
            let span = resolve_point(scope, value, ctx)?;
            let (start, end) = span_bounds(scope, span)?;

            Ok(Some(comparison.against_span(column, start, end)))
        }
    }
}

fn resolve_point(
    scope: &LeafScope<'_>,
    value: &Value,
    ctx: &ResolutionContext,
) -> Result<Span, CompileError> {
    let invalid = || scope.invalid_literal("a date, an RFC 3339 instant or a date mode");
    let today = today(ctx);

    match value {
        Value::String(text) => parse_point(scope, text, ctx.utc_offset),
        Value::Object(_) => {
            let mode: DateMode = serde_json::from_value(value.clone()).map_err(|_| invalid())?;
            let day = match mode {
                DateMode::Today => Some(today),
                DateMode::Tomorrow => today.next_day(),
                DateMode::Yesterday => today.previous_day(),
                DateMode::ExactDate { exact_date } => {
                    return parse_point(scope, &exact_date, ctx.utc_offset);
                }
                DateMode::DaysAgo { number_of_days } => {
                    shift_days(today, -i64::from(number_of_days))
                }
                DateMode::DaysFromNow { number_of_days } => {
                    shift_days(today, i64::from(number_of_days))
                }
                _ => return Err(scope.invalid_literal("a single date, not a date range")),
            };

            day.and_then(|day| day_span(day, ctx.utc_offset))
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

fn resolve_window(
    scope: &LeafScope<'_>,
    value: &Value,
    ctx: &ResolutionContext,
) -> Result<Span, CompileError> {
    let invalid = || scope.invalid_literal("a date range mode");
    let mode: DateMode = serde_json::from_value(value.clone()).map_err(|_| invalid())?;
    let today = today(ctx);
    let tomorrow = today.next_day();

    // (first day included, first day excluded)
    let days = match mode {
        DateMode::PastWeek => shift_days(today, -7).zip(tomorrow),
        DateMode::PastMonth => shift_months(today, -1).zip(tomorrow),
        DateMode::PastYear => shift_months(today, -12).zip(tomorrow),
        DateMode::NextWeek => Some(today).zip(shift_days(today, 8)),
        DateMode::NextMonth => Some(today).zip(shift_months(today, 1).and_then(Date::next_day)),
        DateMode::NextYear => Some(today).zip(shift_months(today, 12).and_then(Date::next_day)),
        DateMode::PastNumberOfDays { number_of_days } => {
            shift_days(today, -i64::from(number_of_days)).zip(tomorrow)
        }
        DateMode::NextNumberOfDays { number_of_days } => {
            Some(today).zip(shift_days(today, i64::from(number_of_days) + 1))
        }
        _ => return Err(invalid()),
    };

    let (first, past_last) = days.ok_or_else(invalid)?;
    let start = day_start(first, ctx.utc_offset);
    let end = day_start(past_last, ctx.utc_offset);

    Ok(Span { start, end })
}

// Bare `YYYY-MM-DD` names a calendar day in the context offset; anything
// else must be an RFC 3339 instant truncated to the field granularity.
fn parse_point(scope: &LeafScope<'_>, text: &str, offset: UtcOffset) -> Result<Span, CompileError> {
    let invalid = || scope.invalid_literal("an ISO 8601 date or RFC 3339 instant");

    if let Some(day) = parse_calendar_date(text) {
        return day_span(day, offset).ok_or_else(invalid);
    }

    let instant = OffsetDateTime::parse(text.trim(), &Rfc3339).map_err(|_| invalid())?;
    instant_span(instant, scope.granularity, offset).ok_or_else(invalid)
}

fn parse_calendar_date(text: &str) -> Option<Date> {
    let mut parts = text.trim().splitn(3, '-');
    let year = parts.next()?;
    let month = parts.next()?;
    let day = parts.next()?;

    if year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return None;
    }

    let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;
    Date::from_calendar_date(year.parse().ok()?, month, day.parse().ok()?).ok()
}

fn instant_span(
    instant: OffsetDateTime,
    granularity: DateGranularity,
    offset: UtcOffset,
) -> Option<Span> {
    match granularity {
        DateGranularity::Day => day_span(instant.to_offset(offset).date(), offset),
        DateGranularity::Minute => {
            let start = instant.replace_second(0).ok()?.replace_nanosecond(0).ok()?;
            let end = start.checked_add(Duration::MINUTE)?;

            Some(Span { start, end })
        }
        DateGranularity::Second => {
            let start = instant.replace_nanosecond(0).ok()?;
            let end = start.checked_add(Duration::SECOND)?;

            Some(Span { start, end })
        }
    }
}

fn today(ctx: &ResolutionContext) -> Date {
    ctx.now.to_offset(ctx.utc_offset).date()
}

fn day_start(day: Date, offset: UtcOffset) -> OffsetDateTime {
    day.midnight().assume_offset(offset)
}

fn day_span(day: Date, offset: UtcOffset) -> Option<Span> {
    Some(Span {
        start: day_start(day, offset),
        end: day_start(day.next_day()?, offset),
    })
}

fn shift_days(day: Date, days: i64) -> Option<Date> {
    day.checked_add(Duration::days(days))
}

/// Shift by whole months, clamping the day to the target month's length.
fn shift_months(day: Date, months: i32) -> Option<Date> {
    let index = day.year() * 12 + i32::from(u8::from(day.month())) - 1 + months;
    let year = index.div_euclid(12);
    let month = Month::try_from(u8::try_from(index.rem_euclid(12) + 1).ok()?).ok()?;

    (28..=day.day())
        .rev()
        .chain(std::iter::once(day.day().min(28)))
        .find_map(|candidate| Date::from_calendar_date(year, month, candidate).ok())
}

fn span_bounds(scope: &LeafScope<'_>, span: Span) -> Result<(SqlExpr, SqlExpr), CompileError> {
    Ok((timestamp(scope, span.start)?, timestamp(scope, span.end)?))
}

fn timestamp(scope: &LeafScope<'_>, instant: OffsetDateTime) -> Result<SqlExpr, CompileError> {
    instant
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map(|text| SqlExpr::Literal(SqlLiteral::Timestamp(text)))
        .map_err(|_| scope.invalid_literal("a date within the representable range"))
}
