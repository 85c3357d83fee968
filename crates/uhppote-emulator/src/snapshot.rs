//! On-disk device snapshots.
//!
//! One pretty-printed JSON file per device, named `<serial>.json`, or
//! `<serial>.json.gz` when gzip compressed. Compression is inferred from the
//! extension on both load and save.
//!
//! ```json
//! {
//!   "serial-number": 405419896,
//!   "address": "192.168.1.100",
//!   "subnet": "255.255.255.0",
//!   "gateway": "192.168.1.1",
//!   "MAC": "00:12:23:34:45:56",
//!   "version": "0892",
//!   "offset": 0,
//!   "doors": { "1": { "delay": 5, "control": 3 } },
//!   "listener": null,
//!   "cards": [],
//!   "events": { "index": 0, "events": [] }
//! }
//! ```

use crate::entities::{CardStore, Door, EventLog, Listener};
use crate::error::{SnapshotError, SnapshotResult};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use uhppote_core::constants::DOOR_COUNT;
use uhppote_core::{MacAddress, SerialNumber, Version};

/// Persisted state of one simulated controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Snapshot {
    pub serial_number: SerialNumber,
    pub address: Ipv4Addr,
    pub subnet: Ipv4Addr,
    pub gateway: Ipv4Addr,
    #[serde(rename = "MAC")]
    pub mac_address: MacAddress,
    #[serde(default)]
    pub version: Version,
    /// Device clock minus host clock, in seconds.
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub doors: BTreeMap<u8, Door>,
    #[serde(default)]
    pub listener: Listener,
    #[serde(default)]
    pub state: u8,
    #[serde(default)]
    pub packet_number: u32,
    #[serde(default)]
    pub backup: u32,
    #[serde(default)]
    pub special_message: u8,
    #[serde(default)]
    pub battery: u8,
    #[serde(default)]
    pub fire_alarm: u8,
    #[serde(default)]
    pub cards: CardStore,
    #[serde(default)]
    pub events: EventLog,
}

impl Snapshot {
    /// A factory fresh controller: unconfigured address, four doors at the
    /// default delay, no cards and no events.
    pub fn new(serial_number: SerialNumber, mac_address: MacAddress) -> Self {
        let mut snapshot = Snapshot {
            serial_number,
            address: Ipv4Addr::UNSPECIFIED,
            subnet: Ipv4Addr::new(255, 255, 255, 0),
            gateway: Ipv4Addr::UNSPECIFIED,
            mac_address,
            version: Version::default(),
            offset: 0,
            doors: BTreeMap::new(),
            listener: Listener::default(),
            state: 0,
            packet_number: 0,
            backup: 0,
            special_message: 0,
            battery: 0,
            fire_alarm: 0,
            cards: CardStore::new(),
            events: EventLog::new(),
        };
        snapshot.fill_doors();
        snapshot
    }

    /// Read a snapshot, decompressing `.gz` files.
    ///
    /// # Errors
    /// Returns `SnapshotError::Io` if the file cannot be read and
    /// `SnapshotError::Json` if it is not a valid snapshot.
    pub fn load(path: &Path) -> SnapshotResult<Self> {
        let file = File::open(path).map_err(|e| io_error(path, e))?;
        let reader: Box<dyn Read> = if is_compressed(path) {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        let mut snapshot: Snapshot =
            serde_json::from_reader(reader).map_err(|e| json_error(path, e))?;
        snapshot.fill_doors();
        Ok(snapshot)
    }

    /// Write the snapshot, replacing any existing file.
    ///
    /// # Errors
    /// Returns `SnapshotError::Io` or `SnapshotError::Json` on failure.
    pub fn save(&self, path: &Path) -> SnapshotResult<()> {
        let file = File::create(path).map_err(|e| io_error(path, e))?;
        self.write_to(file, path)
    }

    /// Write the snapshot to a new file, refusing to overwrite.
    ///
    /// # Errors
    /// Returns `SnapshotError::AlreadyExists` if `path` exists.
    pub fn create(&self, path: &Path) -> SnapshotResult<()> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => SnapshotError::AlreadyExists(path.to_path_buf()),
                _ => io_error(path, e),
            })?;
        self.write_to(file, path)
    }

    fn write_to(&self, file: File, path: &Path) -> SnapshotResult<()> {
        let writer = BufWriter::new(file);
        if is_compressed(path) {
            let mut encoder = GzEncoder::new(writer, Compression::default());
            serde_json::to_writer_pretty(&mut encoder, self).map_err(|e| json_error(path, e))?;
            encoder
                .finish()
                .and_then(|mut w| w.flush())
                .map_err(|e| io_error(path, e))
        } else {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, self).map_err(|e| json_error(path, e))?;
            writer.flush().map_err(|e| io_error(path, e))
        }
    }

    /// Keep exactly doors 1 to 4: drop any other numbers found in the file
    /// and add defaults for the missing ones.
    fn fill_doors(&mut self) {
        self.doors.retain(|door, _| (1..=DOOR_COUNT).contains(door));
        for door in 1..=DOOR_COUNT {
            self.doors.entry(door).or_default();
        }
    }
}

/// Whether a snapshot path is gzip compressed.
pub fn is_compressed(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Snapshot file name for a controller.
pub fn file_name(serial_number: SerialNumber, compressed: bool) -> String {
    if compressed {
        format!("{serial_number}.json.gz")
    } else {
        format!("{serial_number}.json")
    }
}

/// List snapshot files in `dir`, in lexical order. Not recursive.
///
/// # Errors
/// Returns `SnapshotError::Io` if the directory cannot be read.
pub fn discover(dir: &Path) -> SnapshotResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if path.is_file() && (name.ends_with(".json") || name.ends_with(".json.gz")) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn io_error(path: &Path, source: std::io::Error) -> SnapshotError {
    SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> SnapshotError {
    SnapshotError::Json {
        path: path.to_path_buf(),
        source,
    }
}
