use std::{fs, path::Path};

use client::Session;
use engine::Owner;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What survives between invocations: the signed-in session and the last
/// active owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalState {
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub owner: Option<Owner>,
}

impl LocalState {
    pub fn load(path: &str) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let parent = Path::new(path).parent();
        if let Some(parent) = parent {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("finance-{}-{name}", std::process::id()))
            .join("state.json")
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn missing_file_is_empty_state() {
        let state = LocalState::load(&temp_path("missing")).unwrap();
        assert_eq!(state, LocalState::default());
    }

    #[test]
    fn state_round_trips_through_disk() {
        let path = temp_path("roundtrip");
        let state = LocalState {
            session: Some(Session {
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
                expires_at: Utc::now() + Duration::hours(1),
                user_id: "6f1c2a7e-3a55-4c51-9b7d-0d2f5c1e8a90".parse().unwrap(),
                email: "fernanda@example.com".to_string(),
            }),
            owner: Some(Owner::Fernanda),
        };
        state.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"FERNANDA\""));
        assert_eq!(LocalState::load(&path).unwrap(), state);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        fs::create_dir_all(Path::new(&path).parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();
        assert!(LocalState::load(&path).is_err());
        let _ = fs::remove_file(&path);
    }
}
