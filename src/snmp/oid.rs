use anyhow::{Context, Result};
use snmp2::Oid;

/// Объекты MIB, которые можно указывать по имени вместе с `mib`
const MIB_OBJECTS: &[(&str, &str, &[u64])] = &[
    ("SNMPv2-MIB", "sysDescr", &[1, 3, 6, 1, 2, 1, 1, 1]),
    ("SNMPv2-MIB", "sysObjectID", &[1, 3, 6, 1, 2, 1, 1, 2]),
    ("SNMPv2-MIB", "sysUpTime", &[1, 3, 6, 1, 2, 1, 1, 3]),
    ("SNMPv2-MIB", "sysContact", &[1, 3, 6, 1, 2, 1, 1, 4]),
    ("SNMPv2-MIB", "sysName", &[1, 3, 6, 1, 2, 1, 1, 5]),
    ("SNMPv2-MIB", "sysLocation", &[1, 3, 6, 1, 2, 1, 1, 6]),
    ("SNMPv2-MIB", "snmpInPkts", &[1, 3, 6, 1, 2, 1, 11, 1]),
    ("SNMPv2-MIB", "snmpOutPkts", &[1, 3, 6, 1, 2, 1, 11, 2]),
    ("IF-MIB", "ifNumber", &[1, 3, 6, 1, 2, 1, 2, 1]),
    ("IF-MIB", "ifIndex", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 1]),
    ("IF-MIB", "ifMtu", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 4]),
    ("IF-MIB", "ifSpeed", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 5]),
    ("IF-MIB", "ifAdminStatus", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 7]),
    ("IF-MIB", "ifOperStatus", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 8]),
    ("IF-MIB", "ifInOctets", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 10]),
    ("IF-MIB", "ifInUcastPkts", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 11]),
    ("IF-MIB", "ifInDiscards", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 13]),
    ("IF-MIB", "ifInErrors", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 14]),
    ("IF-MIB", "ifOutOctets", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 16]),
    ("IF-MIB", "ifOutUcastPkts", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 17]),
    ("IF-MIB", "ifOutDiscards", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 19]),
    ("IF-MIB", "ifOutErrors", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 20]),
    ("IF-MIB", "ifHCInOctets", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 6]),
    ("IF-MIB", "ifHCInUcastPkts", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 7]),
    ("IF-MIB", "ifHCOutOctets", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 10]),
    ("IF-MIB", "ifHCOutUcastPkts", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 11]),
    ("IF-MIB", "ifHighSpeed", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 15]),
    ("HOST-RESOURCES-MIB", "hrSystemUptime", &[1, 3, 6, 1, 2, 1, 25, 1, 1]),
    ("HOST-RESOURCES-MIB", "hrSystemNumUsers", &[1, 3, 6, 1, 2, 1, 25, 1, 5]),
    ("HOST-RESOURCES-MIB", "hrSystemProcesses", &[1, 3, 6, 1, 2, 1, 25, 1, 6]),
    ("HOST-RESOURCES-MIB", "hrMemorySize", &[1, 3, 6, 1, 2, 1, 25, 2, 2]),
    ("HOST-RESOURCES-MIB", "hrProcessorLoad", &[1, 3, 6, 1, 2, 1, 25, 3, 3, 1, 2]),
    ("UCD-SNMP-MIB", "memTotalReal", &[1, 3, 6, 1, 4, 1, 2021, 4, 5]),
    ("UCD-SNMP-MIB", "memAvailReal", &[1, 3, 6, 1, 4, 1, 2021, 4, 6]),
    ("UCD-SNMP-MIB", "memTotalFree", &[1, 3, 6, 1, 4, 1, 2021, 4, 11]),
    ("UCD-SNMP-MIB", "laLoadInt", &[1, 3, 6, 1, 4, 1, 2021, 10, 1, 5]),
    ("UCD-SNMP-MIB", "ssCpuRawUser", &[1, 3, 6, 1, 4, 1, 2021, 11, 50]),
    ("UCD-SNMP-MIB", "ssCpuRawSystem", &[1, 3, 6, 1, 4, 1, 2021, 11, 52]),
    ("UCD-SNMP-MIB", "ssCpuRawIdle", &[1, 3, 6, 1, 4, 1, 2021, 11, 53]),
];

/// Разбирает числовой OID вида "1.3.6.1.2.1.1.3.0"
pub fn parse_arcs(s: &str) -> Result<Vec<u64>> {
    let parts: Result<Vec<u64>, _> = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect();

    let parts = parts.context(format!("Невалидный OID: {}", s))?;
    if parts.is_empty() {
        anyhow::bail!("Пустой OID");
    }
    Ok(parts)
}

pub fn to_snmp_oid(arcs: &[u64]) -> Result<Oid<'static>> {
    Oid::from(arcs).map_err(|e| anyhow::anyhow!("Не удалось создать Oid: {:?}", e))
}

/// Превращает описание метрики в числовой OID.
///
/// Без MIB строка используется как есть. С MIB первая часть - имя объекта,
/// остаток после точки - индекс экземпляра; если индекса нет, берётся 0
/// (скалярное значение).
pub fn resolve(oid: &str, mib: Option<&str>) -> Result<Vec<u64>> {
    let Some(mib) = mib else {
        return parse_arcs(oid);
    };

    let oid = oid.trim();
    if oid.starts_with(|c: char| c.is_ascii_digit()) {
        return parse_arcs(oid);
    }

    let (symbol, index) = match oid.split_once('.') {
        Some((symbol, index)) => (symbol, parse_arcs(index)?),
        None => (oid, vec![0]),
    };

    let base = MIB_OBJECTS
        .iter()
        .find(|(m, name, _)| *m == mib && *name == symbol)
        .map(|(_, _, arcs)| *arcs)
        .ok_or_else(|| anyhow::anyhow!("Неизвестный объект {}::{}", mib, symbol))?;

    let mut arcs = base.to_vec();
    arcs.extend(index);
    Ok(arcs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_oid_verbatim() {
        assert_eq!(
            resolve("1.3.6.1.2.1.1.3.0", None).unwrap(),
            vec![1, 3, 6, 1, 2, 1, 1, 3, 0]
        );
        assert_eq!(resolve(".1.3.6.1", None).unwrap(), vec![1, 3, 6, 1]);
    }

    #[test]
    fn test_invalid_numeric_oid() {
        assert!(resolve("1.3.x.1", None).is_err());
        assert!(resolve("", None).is_err());
        assert!(resolve("sysUpTime", None).is_err());
    }

    #[test]
    fn test_symbol_defaults_to_scalar_index() {
        assert_eq!(
            resolve("sysUpTime", Some("SNMPv2-MIB")).unwrap(),
            vec![1, 3, 6, 1, 2, 1, 1, 3, 0]
        );
    }

    #[test]
    fn test_symbol_with_explicit_index() {
        assert_eq!(
            resolve("ifInOctets.3", Some("IF-MIB")).unwrap(),
            vec![1, 3, 6, 1, 2, 1, 2, 2, 1, 10, 3]
        );
        assert_eq!(
            resolve("ifHCOutOctets.10001", Some("IF-MIB")).unwrap(),
            vec![1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 10, 10001]
        );
    }

    #[test]
    fn test_unknown_symbol() {
        assert!(resolve("ifBogus.1", Some("IF-MIB")).is_err());
        assert!(resolve("sysUpTime", Some("NO-SUCH-MIB")).is_err());
    }

    #[test]
    fn test_numeric_oid_with_mib() {
        assert_eq!(
            resolve("1.3.6.1.2.1.1.5.0", Some("SNMPv2-MIB")).unwrap(),
            vec![1, 3, 6, 1, 2, 1, 1, 5, 0]
        );
    }
}
