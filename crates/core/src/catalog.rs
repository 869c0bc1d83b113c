//! Read-only reference catalogs used to populate selectable references in
//! step configuration and wizard reward sections.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Games,
    Skills,
    Badges,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 3] = [Self::Games, Self::Skills, Self::Badges];

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "games" => Ok(Self::Games),
            "skills" => Ok(Self::Skills),
            "badges" => Ok(Self::Badges),
            _ => Err(CoreError::Validation(format!(
                "Unknown catalog '{s}'. Must be one of: games, skills, badges"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Games => "games",
            Self::Skills => "skills",
            Self::Badges => "badges",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_roundtrip() {
        for kind in CatalogKind::ALL {
            assert_eq!(CatalogKind::from_str_db(kind.as_str()).unwrap(), kind);
        }
        let err = CatalogKind::from_str_db("weapons").unwrap_err().to_string();
        assert!(err.contains("weapons"));
    }
}
