use anyhow::Result;
use async_trait::async_trait;

pub mod oid;
pub mod v2c;

pub use oid::{resolve, to_snmp_oid};
pub use v2c::SnmpClientV2c;

/// Источник значений метрик: одно значение по одному OID.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Читает текущее значение `oid` (или объекта `mib`) с устройства.
    /// Ошибка несёт человекочитаемое описание.
    async fn get(
        &self,
        address: &str,
        port: u16,
        oid: &str,
        mib: Option<&str>,
        community: &str,
    ) -> Result<i64>;
}

/// `MetricSource` поверх SNMPv2c: новая сессия на каждый запрос
#[derive(Debug, Clone, Copy, Default)]
pub struct SnmpSource;

impl SnmpSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetricSource for SnmpSource {
    async fn get(
        &self,
        address: &str,
        port: u16,
        oid: &str,
        mib: Option<&str>,
        community: &str,
    ) -> Result<i64> {
        let arcs = resolve(oid, mib)?;
        let snmp_oid = to_snmp_oid(&arcs)?;
        let target = socket_target(address, port);

        let mut client = SnmpClientV2c::new(&target, community.as_bytes()).await?;
        client.get_integer(&snmp_oid).await
    }
}

fn socket_target(address: &str, port: u16) -> String {
    if address.contains(':') && !address.starts_with('[') {
        format!("[{}]:{}", address, port)
    } else {
        format!("{}:{}", address, port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_target() {
        assert_eq!(socket_target("10.0.0.1", 161), "10.0.0.1:161");
        assert_eq!(socket_target("sw1.example.net", 1161), "sw1.example.net:1161");
        assert_eq!(socket_target("fe80::1", 161), "[fe80::1]:161");
    }

    #[tokio::test]
    async fn test_unknown_symbol_fails_before_network() {
        let source = SnmpSource::new();
        let result = source
            .get("127.0.0.1", 161, "noSuchThing", Some("IF-MIB"), "public")
            .await;
        assert!(result.is_err());
    }
}
