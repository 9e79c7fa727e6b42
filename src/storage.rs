//! Persistent settings on the nRF52840's internal flash.
//!
//! Uses the `sequential-storage` map over the NVMC to hold one small
//! record per [`SettingKey`], so a write only touches the key that
//! changed and wear levelling is handled by the crate.
//!
//! Storage layout:
//!   - Key: the one-byte `SettingKey::id()`.
//!   - Value: the integer as 4 little-endian bytes.
//!
//! All keys are read once at boot into a RAM cache; reads are served
//! from the cache and writes go through to flash before the cache is
//! updated.  The UI is single-threaded, so flash access is driven with
//! `block_on` and the store stays synchronous.

use core::ops::Range;
use defmt::{debug, error, info, warn};
use embassy_futures::block_on;
use embedded_storage_async::nor_flash::NorFlash;
use glowring::config::{SETTINGS_FLASH_END, SETTINGS_FLASH_START};
use glowring::{SettingKey, SettingsStore, StorageError};
use sequential_storage::cache::NoCache;
use sequential_storage::map::{fetch_item, store_item};

/// Scratch buffer for one map item (key + 4-byte value + header).
const ITEM_BUF_SIZE: usize = 32;

const FLASH_RANGE: Range<u32> = SETTINGS_FLASH_START..SETTINGS_FLASH_END;

pub struct FlashStore<F: NorFlash> {
    flash: F,
    cache: [Option<i32>; SettingKey::COUNT],
}

impl<F: NorFlash> FlashStore<F> {
    /// Open the settings region and load every key.
    ///
    /// A corrupted region is erased, so the device boots with defaults
    /// instead of failing.
    pub fn open(flash: F) -> Self {
        let mut store = Self {
            flash,
            cache: [None; SettingKey::COUNT],
        };

        if let Err(e) = store.load_all() {
            error!("Settings read failed: {:?} - erasing region", defmt::Debug2Format(&e));
            store.cache = [None; SettingKey::COUNT];
            if let Err(e) = block_on(sequential_storage::erase_all(
                &mut store.flash,
                FLASH_RANGE,
            )) {
                error!("Settings erase failed: {:?}", defmt::Debug2Format(&e));
            }
        }

        let stored = store.cache.iter().filter(|v| v.is_some()).count();
        info!("Loaded {} of {} settings from flash", stored, SettingKey::COUNT);
        store
    }

    fn load_all(&mut self) -> Result<(), sequential_storage::Error<F::Error>> {
        let mut buf = [0u8; ITEM_BUF_SIZE];
        for key in SettingKey::ALL {
            let value = block_on(fetch_item::<u8, &[u8], _>(
                &mut self.flash,
                FLASH_RANGE,
                &mut NoCache::new(),
                &mut buf,
                &key.id(),
            ))?;

            self.cache[key.index()] = match value.map(<[u8; 4]>::try_from) {
                Some(Ok(bytes)) => Some(i32::from_le_bytes(bytes)),
                Some(Err(_)) => {
                    warn!("Setting {} has a malformed value - ignoring", key.name());
                    None
                }
                None => None,
            };
        }
        Ok(())
    }
}

impl<F: NorFlash> SettingsStore for FlashStore<F> {
    fn get_int(&mut self, key: SettingKey, default: i32) -> i32 {
        self.cache[key.index()].unwrap_or(default)
    }

    fn put_int(&mut self, key: SettingKey, value: i32) -> Result<(), StorageError> {
        if self.cache[key.index()] == Some(value) {
            debug!("Setting {} unchanged", key.name());
            return Ok(());
        }

        let mut buf = [0u8; ITEM_BUF_SIZE];
        let bytes = value.to_le_bytes();
        let item: &[u8] = &bytes;

        block_on(store_item::<u8, &[u8], _>(
            &mut self.flash,
            FLASH_RANGE,
            &mut NoCache::new(),
            &mut buf,
            &key.id(),
            &item,
        ))
        .map_err(|e| {
            error!("Flash write error for {}: {:?}", key.name(), defmt::Debug2Format(&e));
            match e {
                sequential_storage::Error::FullStorage => StorageError::Full,
                _ => StorageError::WriteFailed,
            }
        })?;

        self.cache[key.index()] = Some(value);
        debug!("Setting {} = {}", key.name(), value);
        Ok(())
    }
}
