//! Converting PostgreSQL rows into JSON records.

use std::error::Error;

use postgres_types::{FromSql, Kind, Type};
use serde_json::{Number, Value};
use sieve_query::Record;
use sieve_query::coerce::format_timestamp;
use tokio_postgres::Row;

use crate::error::{PgError, PgResult};

/// Convert a row into a record keyed by column name.
pub fn row_to_record(row: &Row) -> PgResult<Record> {
    let mut record = Record::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = column_value(row, idx, column.type_())
            .map_err(|e| PgError::deserialization(format!("column '{}': {}", column.name(), e)))?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

/// Convert every row, stopping at the first failure.
pub fn rows_to_records(rows: &[Row]) -> PgResult<Vec<Record>> {
    rows.iter().map(row_to_record).collect()
}

fn column_value(row: &Row, idx: usize, ty: &Type) -> Result<Value, Box<dyn Error + Sync + Send>> {
    fn get<'a, T: FromSql<'a>>(
        row: &'a Row,
        idx: usize,
    ) -> Result<Option<T>, Box<dyn Error + Sync + Send>> {
        Ok(row.try_get::<_, Option<T>>(idx)?)
    }

    if let Kind::Enum(_) = ty.kind() {
        return Ok(get::<EnumText>(row, idx)?.map_or(Value::Null, |e| Value::String(e.0)));
    }

    let value = match *ty {
        Type::BOOL => get::<bool>(row, idx)?.map(Value::Bool),
        Type::INT2 => get::<i16>(row, idx)?.map(Value::from),
        Type::INT4 => get::<i32>(row, idx)?.map(Value::from),
        Type::INT8 => get::<i64>(row, idx)?.map(Value::from),
        Type::FLOAT4 => get::<f32>(row, idx)?.and_then(|f| Number::from_f64(f64::from(f)).map(Value::Number)),
        Type::FLOAT8 => get::<f64>(row, idx)?.and_then(|f| Number::from_f64(f).map(Value::Number)),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            get::<String>(row, idx)?.map(Value::String)
        }
        Type::UUID => get::<uuid::Uuid>(row, idx)?.map(|u| Value::String(u.to_string())),
        Type::TIMESTAMPTZ => get::<chrono::DateTime<chrono::Utc>>(row, idx)?
            .map(|d| Value::String(format_timestamp(&d))),
        Type::TIMESTAMP => get::<chrono::NaiveDateTime>(row, idx)?
            .map(|d| Value::String(format_timestamp(&d.and_utc()))),
        Type::DATE => get::<chrono::NaiveDate>(row, idx)?
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
        Type::JSON | Type::JSONB => get::<Value>(row, idx)?,
        _ => return Err(format!("unsupported column type '{}'", ty.name()).into()),
    };

    Ok(value.unwrap_or(Value::Null))
}

/// Reads a user-defined enum column as its label.
struct EnumText(String);

impl<'a> FromSql<'a> for EnumText {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(EnumText(std::str::from_utf8(raw)?.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(ty.kind(), Kind::Enum(_))
    }
}
