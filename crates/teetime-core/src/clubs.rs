use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ConfigError;

/// Golfpang region code a club's listing is queried under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Gyeonggi,
    Chungcheong,
    Gangwon,
    Jeolla,
}

impl Sector {
    /// Maps a Korean street address to its sector by province prefix.
    ///
    /// Returns `None` for provinces the listing endpoint is not queried for.
    #[must_use]
    pub fn from_address(address: &str) -> Option<Self> {
        let address = address.trim_start();
        if address.starts_with("경기") {
            Some(Sector::Gyeonggi)
        } else if ["충청", "충북", "충남"].iter().any(|p| address.starts_with(p)) {
            Some(Sector::Chungcheong)
        } else if address.starts_with("강원") {
            Some(Sector::Gangwon)
        } else if ["전라", "전북", "전남"].iter().any(|p| address.starts_with(p)) {
            Some(Sector::Jeolla)
        } else {
            None
        }
    }

    /// Value sent in the listing form's `sector` field.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Sector::Gyeonggi => "5",
            Sector::Chungcheong => "4",
            Sector::Gangwon => "8",
            Sector::Jeolla => "16",
        }
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sector::Gyeonggi => write!(f, "gyeonggi"),
            Sector::Chungcheong => write!(f, "chungcheong"),
            Sector::Gangwon => write!(f, "gangwon"),
            Sector::Jeolla => write!(f, "jeolla"),
        }
    }
}

/// One row of the on-disk club list, as shipped with the front-end.
///
/// `seq` and `Golpang_code` appear as numbers in some entries and strings in
/// others, and either may be missing.
#[derive(Debug, Clone, Deserialize)]
pub struct ClubEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub seq: Option<String>,
    #[serde(
        default,
        rename = "Golpang_code",
        alias = "golfpang_code",
        deserialize_with = "lenient_id"
    )]
    pub golfpang_code: Option<String>,
    #[serde(default)]
    pub address: String,
}

/// A venue with the lookup keys each upstream needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Club {
    pub name: String,
    /// Teescanner `golfclub_seq`.
    pub teescanner_seq: Option<String>,
    /// Golfpang `clubname` code.
    pub golfpang_code: Option<String>,
    pub address: String,
    /// `None` when the address does not map to a known sector.
    pub sector: Option<Sector>,
}

/// Read-only club lookup table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ClubDirectory {
    clubs: Vec<Club>,
}

impl ClubDirectory {
    /// Builds the directory from raw entries, keeping the first entry for each
    /// display name and dropping entries without a name.
    #[must_use]
    pub fn from_entries(entries: Vec<ClubEntry>) -> Self {
        let mut seen = HashSet::new();
        let mut clubs = Vec::with_capacity(entries.len());

        for entry in entries {
            let Some(name) = entry.name.map(|n| n.trim().to_string()) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            if !seen.insert(name.clone()) {
                tracing::debug!(club = %name, "duplicate club entry ignored");
                continue;
            }
            let sector = Sector::from_address(&entry.address);
            clubs.push(Club {
                name,
                teescanner_seq: entry.seq.filter(|s| !s.is_empty()),
                golfpang_code: entry.golfpang_code.filter(|s| !s.is_empty()),
                address: entry.address,
                sector,
            });
        }

        Self { clubs }
    }

    #[must_use]
    pub fn clubs(&self) -> &[Club] {
        &self.clubs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clubs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clubs.is_empty()
    }

    /// Display names in ascending order.
    #[must_use]
    pub fn display_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clubs.iter().map(|c| c.name.clone()).collect();
        names.sort();
        names
    }
}

/// Load the club directory from a JSON file (or YAML, by extension).
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_clubs(path: &Path) -> Result<ClubDirectory, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ClubsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let entries: Vec<ClubEntry> = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ClubsFileParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| ConfigError::ClubsFileParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?
    };

    let directory = ClubDirectory::from_entries(entries);
    tracing::info!(
        path = %path.display(),
        clubs = directory.len(),
        "club directory loaded"
    );
    Ok(directory)
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Text(String),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Int(n)) => Some(n.to_string()),
        Some(RawId::Text(s)) => Some(s.trim().to_string()),
        None => None,
    })
}

#[cfg(test)]
#[path = "clubs_test.rs"]
mod tests;
