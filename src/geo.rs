use std::net::IpAddr;
use std::str::FromStr;

use maxminddb::geoip2;

/// Country lookup against a GeoLite2 database. Optional at boot: without a
/// configured database every lookup returns None and the fingerprint falls
/// back to the CF-IPCountry header.
pub struct GeoReader {
    reader: Option<maxminddb::Reader<Vec<u8>>>,
}

impl GeoReader {
    pub fn open(path: Option<&str>) -> Self {
        let reader = match path {
            Some(p) => match maxminddb::Reader::open_readfile(p) {
                Ok(r) => {
                    log::info!("GeoLite2 database loaded from {}", p);
                    Some(r)
                }
                Err(e) => {
                    log::warn!("GeoLite2 database unavailable ({}): country lookups disabled", e);
                    None
                }
            },
            None => None,
        };
        GeoReader { reader }
    }

    pub fn disabled() -> Self {
        GeoReader { reader: None }
    }

    /// ISO 3166-1 alpha-2 country code for an IP, if resolvable.
    pub fn country(&self, ip: &str) -> Option<String> {
        let reader = self.reader.as_ref()?;
        let addr = IpAddr::from_str(ip).ok()?;
        let country: geoip2::Country = reader.lookup(addr).ok()?;
        country
            .country
            .and_then(|c| c.iso_code)
            .map(|code| code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_reader_returns_none() {
        let geo = GeoReader::disabled();
        assert!(geo.country("8.8.8.8").is_none());
    }

    #[test]
    fn test_missing_db_path_is_tolerated() {
        let geo = GeoReader::open(Some("/nonexistent/GeoLite2-Country.mmdb"));
        assert!(geo.country("8.8.8.8").is_none());
    }

    #[test]
    fn test_garbage_ip_is_tolerated() {
        let geo = GeoReader::disabled();
        assert!(geo.country("not-an-ip").is_none());
    }
}
