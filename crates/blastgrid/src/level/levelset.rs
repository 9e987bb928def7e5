//! Level-set descriptors: what the enemies of a set of levels are like.
//!
//! ```json
//! {
//!   "name": "demo",
//!   "enemies": {
//!     "1": { "ai": "random", "speed": 1.0 },
//!     "3": { "ai": "follow", "attack": { "kind": "ranged", "bullet_id": 1 } }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entities::enemy::EnemyInfo;
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSetInfo {
    pub name: String,
    /// Enemy descriptors by enemy id (1 to 10).
    pub enemies: HashMap<u32, EnemyInfo>,
}

impl LevelSetInfo {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let set = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        log::info!(
            "loaded level set '{}' ({} enemies) from {}",
            set.name,
            set.enemies.len(),
            path.display()
        );
        Ok(set)
    }

    pub fn enemy_info(&self, id: u32) -> Result<&EnemyInfo> {
        self.enemies
            .get(&id)
            .ok_or(SimError::UnknownDescriptor { kind: "enemy", id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiKind, AttackKind};

    const SET: &str = r#"{
        "name": "demo",
        "enemies": {
            "1": { "ai": "random" },
            "3": { "ai": "follow", "attack": { "kind": "ranged", "bullet_id": 2 } }
        }
    }"#;

    #[test]
    fn parses_enemies_by_id() {
        let set = LevelSetInfo::from_json_str(SET).unwrap();
        assert_eq!(set.name, "demo");
        assert_eq!(set.enemy_info(1).unwrap().ai, AiKind::Random);
        let three = set.enemy_info(3).unwrap();
        assert_eq!(three.attack.kind, AttackKind::Ranged);
        assert_eq!(three.attack.bullet_id, 2);
    }

    #[test]
    fn unknown_enemy_is_an_error() {
        let set = LevelSetInfo::from_json_str(SET).unwrap();
        assert!(matches!(
            set.enemy_info(7),
            Err(SimError::UnknownDescriptor { kind: "enemy", id: 7 })
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("set.json");
        std::fs::write(&path, SET).unwrap();
        assert_eq!(LevelSetInfo::from_file(&path).unwrap().enemies.len(), 2);
        assert!(matches!(
            LevelSetInfo::from_json_str("{ \"enemies\": 3 }"),
            Err(SimError::Config(_))
        ));
    }
}
