use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::models::{Beacon, BeaconParticipant};

const BEACONS_FILE: &str = "beacons.json";

/// Token-addressed beacon records, persisted as one JSON file.
///
/// Writes hold the lock until the snapshot is on disk, so concurrent joins
/// to the same beacon serialise and each sees every earlier participant.
/// Memory only changes once the snapshot has been saved.
pub struct BeaconStore {
    beacons: RwLock<HashMap<String, Beacon>>,
    data_dir: Option<PathBuf>,
}

impl BeaconStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            beacons: RwLock::new(HashMap::new()),
            data_dir: Some(data_dir.into()),
        }
    }

    /// No persistence; used by tests.
    pub fn in_memory() -> Self {
        Self {
            beacons: RwLock::new(HashMap::new()),
            data_dir: None,
        }
    }

    pub async fn create(&self, beacon: Beacon) -> Result<Beacon> {
        let mut beacons = self.beacons.write().await;
        let mut next = beacons.clone();
        next.insert(beacon.token.clone(), beacon.clone());
        self.save(&next).await?;
        *beacons = next;
        Ok(beacon)
    }

    pub async fn get(&self, token: &str) -> Option<Beacon> {
        self.beacons.read().await.get(token).cloned()
    }

    /// Append and read back in one step. `None` if the token is unknown.
    pub async fn append_participant(
        &self,
        token: &str,
        participant: BeaconParticipant,
    ) -> Result<Option<Beacon>> {
        let mut beacons = self.beacons.write().await;
        let Some(current) = beacons.get(token) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        updated.participants.push(participant);

        let mut next = beacons.clone();
        next.insert(token.to_string(), updated.clone());
        self.save(&next).await?;
        *beacons = next;
        Ok(Some(updated))
    }

    pub async fn count(&self) -> usize {
        self.beacons.read().await.len()
    }

    async fn save(&self, beacons: &HashMap<String, Beacon>) -> Result<()> {
        let Some(dir) = &self.data_dir else {
            return Ok(());
        };
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let json = serde_json::to_string_pretty(beacons)?;
        let tmp = dir.join(format!("{BEACONS_FILE}.tmp"));
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, dir.join(BEACONS_FILE)).await?;
        Ok(())
    }

    /// Load persisted beacons, replacing what is in memory. Returns how many
    /// were loaded; a missing file is not an error.
    pub async fn load(&self) -> Result<usize> {
        let Some(dir) = &self.data_dir else {
            return Ok(0);
        };
        let path = dir.join(BEACONS_FILE);
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
        };
        let loaded: HashMap<String, Beacon> = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let count = loaded.len();
        *self.beacons.write().await = loaded;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn beacon(token: &str) -> Beacon {
        Beacon {
            token: token.into(),
            creator_name: "Ana".into(),
            creator_lat: 51.5,
            creator_lng: -0.1,
            categories: vec!["cafe".into()],
            image_path: None,
            participants: vec![],
            created_at: Utc::now(),
        }
    }

    fn joiner(name: &str) -> BeaconParticipant {
        BeaconParticipant {
            name: name.into(),
            lat: 51.52,
            lng: -0.08,
            image_path: None,
            joined_at: Utc::now(),
        }
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("beacon-store-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_append_unknown_token() {
        let store = BeaconStore::in_memory();
        assert!(store.append_participant("nope", joiner("Ben")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_reads_back() {
        let store = BeaconStore::in_memory();
        store.create(beacon("t1")).await.unwrap();

        let updated = store.append_participant("t1", joiner("Ben")).await.unwrap().unwrap();
        assert_eq!(updated.participants.len(), 1);
        assert_eq!(store.get("t1").await.unwrap(), updated);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_joins_are_not_lost() {
        let store = std::sync::Arc::new(BeaconStore::in_memory());
        store.create(beacon("t1")).await.unwrap();

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.append_participant("t1", joiner(&format!("p{i}"))).await.unwrap();
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.get("t1").await.unwrap().participants.len(), 20);
    }

    #[tokio::test]
    async fn test_persists_and_reloads() {
        let dir = temp_dir();
        let store = BeaconStore::new(&dir);
        store.create(beacon("t1")).await.unwrap();
        store.append_participant("t1", joiner("Ben")).await.unwrap();

        let reloaded = BeaconStore::new(&dir);
        assert_eq!(reloaded.load().await.unwrap(), 1);
        let b = reloaded.get("t1").await.unwrap();
        assert_eq!(b.participants[0].name, "Ben");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_load_without_file() {
        let store = BeaconStore::new(temp_dir());
        assert_eq!(store.load().await.unwrap(), 0);
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_memory_untouched() {
        let dir = temp_dir();
        let mut store = BeaconStore::new(&dir);
        store.create(beacon("t1")).await.unwrap();
        store.append_participant("t1", joiner("Ben")).await.unwrap();

        // A regular file where the data directory should be.
        let blocker = temp_dir();
        std::fs::write(&blocker, b"not a directory").unwrap();
        store.data_dir = Some(blocker.clone());

        assert!(store.append_participant("t1", joiner("Cat")).await.is_err());
        let b = store.get("t1").await.unwrap();
        assert_eq!(b.participants.len(), 1);
        assert_eq!(b.participants[0].name, "Ben");

        assert!(store.create(beacon("t2")).await.is_err());
        assert!(store.get("t2").await.is_none());
        assert_eq!(store.count().await, 1);

        // Retrying once the disk is back appends exactly once.
        store.data_dir = Some(dir.clone());
        let b = store.append_participant("t1", joiner("Cat")).await.unwrap().unwrap();
        assert_eq!(b.participants.len(), 2);

        let _ = std::fs::remove_file(&blocker);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
