//! Dynamic parameter binding for the PostgreSQL wire protocol.
//!
//! Cell types are only known at runtime, so a plain `&[ScalarValue]` cannot
//! satisfy the statically typed [`ToSql`] machinery directly. [`PgParam`]
//! bridges the gap: it accepts whatever parameter type the server declared
//! and delegates the encoding to the matching native impl, narrowing
//! integers and floats where the declared type asks for it.

use bytes::BytesMut;
use postgres::types::{to_sql_checked, IsNull, ToSql, Type};

use smelter_core::ScalarValue;

/// One bound statement parameter, borrowing its cell value.
#[derive(Debug)]
pub(crate) struct PgParam<'a>(pub(crate) &'a ScalarValue);

impl ToSql for PgParam<'_> {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self.0 {
            ScalarValue::Null => Ok(IsNull::Yes),
            ScalarValue::Bool(v) => v.to_sql(ty, out),
            ScalarValue::Int(v) => {
                if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            ScalarValue::Float(v) => {
                if *ty == Type::FLOAT4 {
                    #[allow(clippy::cast_possible_truncation)]
                    (*v as f32).to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            ScalarValue::Text(v) => v.to_sql(ty, out),
            ScalarValue::Blob(v) => v.to_sql(ty, out),
            ScalarValue::Uuid(v) => v.to_sql(ty, out),
            ScalarValue::Timestamp(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // The server's declared parameter type wins; mismatches surface as
        // execution errors, not bind-time panics.
        true
    }

    to_sql_checked!();
}
