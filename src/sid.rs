//! FDSN Source Identifier (SID) carried by miniSEED v3 records.
//!
//! The identifier has the form `FDSN:NET_STA_LOC_BAND_SOURCE_SUBSOURCE`.
//! A v2-style channel code (e.g. "BHZ") is rebuilt from band ("B"),
//! source ("H") and subsource ("Z").

use std::fmt;

/// FDSN Source Identifier.
///
/// # Examples
///
/// ```
/// use msdemux::SourceId;
///
/// let sid = SourceId::parse("FDSN:IU_ANMO_00_B_H_Z");
/// let nslc = sid.to_nslc().unwrap();
/// assert_eq!(nslc, ("IU".into(), "ANMO".into(), "00".into(), "BHZ".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceId {
    raw: String,
}

impl SourceId {
    /// Wrap an identifier string, adding the `FDSN:` prefix if missing.
    pub fn parse(s: &str) -> Self {
        let raw = if s.starts_with("FDSN:") {
            s.to_string()
        } else {
            format!("FDSN:{s}")
        };
        Self { raw }
    }

    /// Return the raw source identifier string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Split into (network, station, location, channel).
    ///
    /// Returns `None` when the identifier has fewer than six components.
    /// Single-character band/source/subsource codes are concatenated into
    /// a SEED channel; longer ones are joined with underscores.
    pub fn to_nslc(&self) -> Option<(String, String, String, String)> {
        let body = self.raw.strip_prefix("FDSN:").unwrap_or(&self.raw);
        let mut parts = body.splitn(4, '_');
        let network = parts.next()?;
        let station = parts.next()?;
        let location = parts.next()?;
        let channel_parts: Vec<&str> = parts.next()?.split('_').collect();
        if channel_parts.len() != 3 {
            return None;
        }

        let channel = if channel_parts.iter().all(|p| p.chars().count() == 1) {
            channel_parts.concat()
        } else {
            channel_parts.join("_")
        };

        Some((
            network.to_string(),
            station.to_string(),
            location.to_string(),
            channel,
        ))
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
