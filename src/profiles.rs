//! Persistent bank balances, one record per player name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ProfileError;
use crate::utilities::validate_name;

/// Chips a new profile starts with.
pub const STARTING_BANK: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    name: String,
    pub bank: u64,
}

impl Profile {
    pub fn new(name: &str) -> Result<Self, ProfileError> {
        validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            bank: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Takes up to `amount` out of the bank and returns what was taken.
    pub fn withdraw(&mut self, amount: u64) -> u64 {
        let taken = amount.min(self.bank);
        self.bank -= taken;
        taken
    }

    /// Takes exactly `amount` to sit at a table.
    pub fn buy_in(&mut self, amount: u64) -> Result<u64, ProfileError> {
        if amount > self.bank {
            return Err(ProfileError::InsufficientBank {
                name: self.name.clone(),
                bank: self.bank,
                requested: amount,
            });
        }
        Ok(self.withdraw(amount))
    }

    pub fn deposit(&mut self, amount: u64) {
        self.bank += amount;
    }
}

pub trait ProfileStore {
    fn load(&self, name: &str) -> Result<Profile, ProfileError>;
    fn save(&self, profile: &Profile) -> Result<(), ProfileError>;
    fn exists(&self, name: &str) -> bool;
    /// Returns whether there was anything to delete.
    fn delete(&self, name: &str) -> Result<bool, ProfileError>;

    /// Saves a new profile holding the starting bank.
    fn create(&self, name: &str) -> Result<Profile, ProfileError> {
        if self.exists(name) {
            return Err(ProfileError::Exists(name.to_string()));
        }
        let mut profile = Profile::new(name)?;
        profile.deposit(STARTING_BANK);
        self.save(&profile)?;
        log::info!("created profile {}", name);
        Ok(profile)
    }
}

/// Keeps each profile in `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    dir: PathBuf,
}

impl JsonProfileStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, ProfileError> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl ProfileStore for JsonProfileStore {
    fn load(&self, name: &str) -> Result<Profile, ProfileError> {
        validate_name(name)?;
        if !self.exists(name) {
            return Err(ProfileError::NotFound(name.to_string()));
        }
        let data = fs::read_to_string(self.path(name))?;
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&self, profile: &Profile) -> Result<(), ProfileError> {
        let data = serde_json::to_string_pretty(profile)?;
        fs::write(self.path(profile.name()), data)?;
        log::debug!("saved profile {} with bank {}", profile.name(), profile.bank);
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.path(name).is_file()
    }

    fn delete(&self, name: &str) -> Result<bool, ProfileError> {
        if !self.exists(name) {
            return Ok(false);
        }
        fs::remove_file(self.path(name))?;
        Ok(true)
    }
}
