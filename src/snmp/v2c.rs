use anyhow::{Context, Result};
use snmp2::{AsyncSession, Oid, Value};

const STARTING_REQ_ID: i32 = 2;

pub struct SnmpClientV2c {
    session: AsyncSession,
}

impl SnmpClientV2c {
    pub async fn new(target: &str, community: &[u8]) -> Result<Self> {
        let session = AsyncSession::new_v2c(target, community, STARTING_REQ_ID)
            .await
            .context(format!("Не удалось создать SNMP сессию с {}", target))?;

        Ok(Self { session })
    }

    /// SNMP GET одного OID с приведением ответа к целому
    pub async fn get_integer(&mut self, oid: &Oid<'_>) -> Result<i64> {
        let resp = self
            .session
            .get(oid)
            .await
            .context("SNMP GET запрос не удался")?;

        if resp.error_status != 0 {
            anyhow::bail!(
                "SNMP ошибка {} (индекс {})",
                error_status_name(resp.error_status),
                resp.error_index
            );
        }

        let (_, value) = resp
            .varbinds
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("SNMP ответ пустой"))?;

        value_to_i64(&value)
    }
}

fn error_status_name(status: u32) -> &'static str {
    match status {
        1 => "tooBig",
        2 => "noSuchName",
        3 => "badValue",
        4 => "readOnly",
        5 => "genErr",
        6 => "noAccess",
        7 => "wrongType",
        8 => "wrongLength",
        9 => "wrongEncoding",
        10 => "wrongValue",
        11 => "noCreation",
        12 => "inconsistentValue",
        13 => "resourceUnavailable",
        14 => "commitFailed",
        15 => "undoFailed",
        16 => "authorizationError",
        17 => "notWritable",
        18 => "inconsistentName",
        _ => "unknown",
    }
}

/// Приводит SNMP значение к целому числу
fn value_to_i64(value: &Value<'_>) -> Result<i64> {
    match value {
        Value::Integer(v) => Ok(*v),
        Value::Counter32(v) | Value::Unsigned32(v) | Value::Timeticks(v) => Ok(i64::from(*v)),
        // Counter64 переинтерпретируется; дельты считаются с переполнением
        Value::Counter64(v) => Ok(*v as i64),
        Value::OctetString(bytes) => parse_numeric_text(bytes),
        Value::NoSuchObject => anyhow::bail!("noSuchObject"),
        Value::NoSuchInstance => anyhow::bail!("noSuchInstance"),
        Value::EndOfMibView => anyhow::bail!("endOfMibView"),
        other => anyhow::bail!("Значение не приводится к целому: {:?}", other),
    }
}

fn parse_numeric_text(bytes: &[u8]) -> Result<i64> {
    let text = std::str::from_utf8(bytes).context("Строковое значение не в UTF-8")?;
    text.trim()
        .parse::<i64>()
        .context(format!("Строковое значение не число: {:?}", text))
}
