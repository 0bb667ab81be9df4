//! Binding filter values to PostgreSQL statement parameters.
//!
//! Filter values arrive untyped (a date is a string, an integer column may be
//! compared against a float). The prepared statement knows each parameter's
//! type, so values are converted against that type rather than guessed.

use std::error::Error;

use bytes::BytesMut;
use postgres_types::{IsNull, Kind, ToSql, Type, to_sql_checked};
use sieve_query::FilterValue;
use sieve_query::coerce::parse_date;

use crate::error::{PgError, PgResult};

/// A boxed statement parameter.
pub type SqlParam = Box<dyn ToSql + Sync + Send>;

/// Convert a filter value into a parameter of type `ty`.
pub fn bind_param(value: &FilterValue, ty: &Type) -> PgResult<SqlParam> {
    if value.is_null() {
        return Ok(Box::new(SqlNull));
    }
    if let Kind::Enum(_) = ty.kind() {
        return match value.as_str() {
            Some(label) => Ok(Box::new(EnumLabel(label.to_string()))),
            None => Err(mismatch(value, ty)),
        };
    }

    match *ty {
        Type::BOOL => match value {
            FilterValue::Bool(b) => Ok(Box::new(*b)),
            _ => Err(mismatch(value, ty)),
        },
        Type::INT2 => integer(value, ty)
            .and_then(|i| i16::try_from(i).map_err(|_| mismatch(value, ty)))
            .map(|i| Box::new(i) as SqlParam),
        Type::INT4 => integer(value, ty)
            .and_then(|i| i32::try_from(i).map_err(|_| mismatch(value, ty)))
            .map(|i| Box::new(i) as SqlParam),
        Type::INT8 => integer(value, ty).map(|i| Box::new(i) as SqlParam),
        Type::FLOAT4 => float(value, ty).map(|f| Box::new(f as f32) as SqlParam),
        Type::FLOAT8 => float(value, ty).map(|f| Box::new(f) as SqlParam),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            match value.as_str() {
                Some(s) => Ok(Box::new(s.to_string())),
                None => Ok(Box::new(value.to_string())),
            }
        }
        Type::UUID => value
            .as_str()
            .and_then(|s| uuid::Uuid::parse_str(s).ok())
            .map(|u| Box::new(u) as SqlParam)
            .ok_or_else(|| mismatch(value, ty)),
        Type::TIMESTAMPTZ => date(value, ty).map(|d| Box::new(d) as SqlParam),
        Type::TIMESTAMP => date(value, ty).map(|d| Box::new(d.naive_utc()) as SqlParam),
        Type::DATE => date(value, ty).map(|d| Box::new(d.date_naive()) as SqlParam),
        Type::JSON | Type::JSONB => Ok(Box::new(value.to_json())),
        _ => Err(PgError::type_conversion(format!(
            "unsupported parameter type '{}'",
            ty.name()
        ))),
    }
}

/// Bind every value against the statement's parameter types.
pub fn bind_params(values: &[FilterValue], types: &[Type]) -> PgResult<Vec<SqlParam>> {
    if values.len() != types.len() {
        return Err(PgError::type_conversion(format!(
            "statement expects {} parameters, got {}",
            types.len(),
            values.len()
        )));
    }
    values
        .iter()
        .zip(types)
        .map(|(value, ty)| bind_param(value, ty))
        .collect()
}

fn mismatch(value: &FilterValue, ty: &Type) -> PgError {
    PgError::type_conversion(format!(
        "cannot bind {} value '{}' as {}",
        value.kind(),
        value,
        ty.name()
    ))
}

fn integer(value: &FilterValue, ty: &Type) -> PgResult<i64> {
    match value {
        FilterValue::Int(i) => Ok(*i),
        FilterValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
        _ => Err(mismatch(value, ty)),
    }
}

fn float(value: &FilterValue, ty: &Type) -> PgResult<f64> {
    value.as_finite_f64().ok_or_else(|| mismatch(value, ty))
}

fn date(value: &FilterValue, ty: &Type) -> PgResult<chrono::DateTime<chrono::Utc>> {
    value
        .as_str()
        .and_then(parse_date)
        .ok_or_else(|| mismatch(value, ty))
}

/// SQL NULL for a parameter of any type.
#[derive(Debug, Clone, Copy)]
pub struct SqlNull;

impl ToSql for SqlNull {
    fn to_sql(&self, _ty: &Type, _out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        Ok(IsNull::Yes)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// A label of a user-defined PostgreSQL enum.
///
/// Enum labels travel as text on the wire, but the driver only lets a type
/// bind to an enum parameter if it says so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumLabel(pub String);

impl ToSql for EnumLabel {
    fn to_sql(&self, _ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        out.extend_from_slice(self.0.as_bytes());
        Ok(IsNull::No)
    }

    fn accepts(ty: &Type) -> bool {
        matches!(ty.kind(), Kind::Enum(_))
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_type() -> Type {
        Type::new(
            "user_role".to_string(),
            90_001,
            Kind::Enum(vec!["admin".to_string(), "user".to_string()]),
            "public".to_string(),
        )
    }

    fn encode(param: &SqlParam, ty: &Type) -> (IsNull, Vec<u8>) {
        let mut out = BytesMut::new();
        let is_null = param.to_sql_checked(ty, &mut out).unwrap();
        (is_null, out.to_vec())
    }

    #[test]
    fn test_bind_integers() {
        assert!(bind_param(&FilterValue::Int(42), &Type::INT4).is_ok());
        assert!(bind_param(&FilterValue::Float(30.0), &Type::INT4).is_ok());
        assert!(bind_param(&FilterValue::Float(30.5), &Type::INT4).is_err());
        assert!(bind_param(&FilterValue::Int(i64::MAX), &Type::INT4).is_err());
        assert!(bind_param(&FilterValue::String("30".into()), &Type::INT8).is_err());
    }

    #[test]
    fn test_bind_floats() {
        let param = bind_param(&FilterValue::Int(3), &Type::FLOAT8).unwrap();
        let (_, bytes) = encode(&param, &Type::FLOAT8);
        assert_eq!(bytes, 3.0f64.to_be_bytes().to_vec());
    }

    #[test]
    fn test_bind_text_uuid_and_dates() {
        assert!(bind_param(&FilterValue::String("Ada".into()), &Type::TEXT).is_ok());
        assert!(
            bind_param(
                &FilterValue::String("550e8400-e29b-41d4-a716-446655440001".into()),
                &Type::UUID
            )
            .is_ok()
        );
        assert!(bind_param(&FilterValue::String("nope".into()), &Type::UUID).is_err());
        assert!(bind_param(&FilterValue::String("2024-01-15".into()), &Type::TIMESTAMPTZ).is_ok());
        assert!(bind_param(&FilterValue::String("2024-01-15".into()), &Type::DATE).is_ok());
        assert!(bind_param(&FilterValue::String("soon".into()), &Type::TIMESTAMP).is_err());
    }

    #[test]
    fn test_bind_enum_label() {
        let ty = role_type();
        let param = bind_param(&FilterValue::String("admin".into()), &ty).unwrap();
        let (is_null, bytes) = encode(&param, &ty);
        assert!(matches!(is_null, IsNull::No));
        assert_eq!(bytes, b"admin".to_vec());

        assert!(bind_param(&FilterValue::Int(1), &ty).is_err());
    }

    #[test]
    fn test_bind_null_any_type() {
        for ty in [Type::INT4, Type::TEXT, Type::UUID, role_type()] {
            let param = bind_param(&FilterValue::Null, &ty).unwrap();
            let (is_null, _) = encode(&param, &ty);
            assert!(matches!(is_null, IsNull::Yes));
        }
    }

    #[test]
    fn test_bind_params_arity() {
        let values = vec![FilterValue::Int(1)];
        assert!(bind_params(&values, &[Type::INT4]).is_ok());
        assert!(bind_params(&values, &[Type::INT4, Type::INT4]).is_err());
    }

    #[test]
    fn test_unsupported_type() {
        let err = bind_param(&FilterValue::Int(1), &Type::BYTEA).err().unwrap();
        assert!(err.to_string().contains("bytea"));
    }
}
