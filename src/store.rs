//! Optional JSON snapshot persistence for issued tokens.
//!
//! Tokens live in memory. When a snapshot path is configured, the service can write its
//! outstanding tokens to disk and adopt them again after a restart so download links handed out
//! before the restart keep resolving until they expire.

// std
use std::{
	ffi::OsString,
	fs::{self, File},
	io::{self, Write},
	path::{Path, PathBuf},
};
// self
use crate::{_prelude::*, token::Token};

const STAGING_SUFFIX: &str = ".staging";

/// Error type produced by [`FileSnapshot`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced while encoding or decoding a snapshot.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Filesystem failure.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Token snapshot stored as a JSON array, replaced atomically on every save.
///
/// Saves through one handle are serialized: the staging file is written and renamed over the
/// snapshot while a per-handle lock is held.
#[derive(Debug)]
pub struct FileSnapshot {
	path: PathBuf,
	write_lock: Mutex<()>,
}
impl FileSnapshot {
	/// Points a snapshot at `path`, creating its parent directory if needed.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		ensure_parent_exists(&path)?;

		Ok(Self { path, write_lock: Mutex::new(()) })
	}

	/// Location of the snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Loads every token in the snapshot; a missing or empty file yields no tokens.
	pub fn load(&self) -> Result<Vec<Token>, StoreError> {
		let bytes = match fs::read(&self.path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(backend("read", &self.path, e)),
		};

		if bytes.is_empty() {
			return Ok(Vec::new());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("{} does not hold a token snapshot: {e}", self.path.display()),
		})
	}

	/// Replaces the snapshot with `tokens`.
	pub fn save(&self, tokens: &[Token]) -> Result<(), StoreError> {
		let _guard = self.write_lock.lock();

		self.replace(tokens)
	}

	/// Collects tokens and replaces the snapshot with them under the same lock, so a slower
	/// save can never publish an older view over a newer one. Returns how many were written.
	pub fn save_with<F>(&self, collect: F) -> Result<usize, StoreError>
	where
		F: FnOnce() -> Vec<Token>,
	{
		let _guard = self.write_lock.lock();
		let tokens = collect();

		self.replace(&tokens)?;

		Ok(tokens.len())
	}

	fn replace(&self, tokens: &[Token]) -> Result<(), StoreError> {
		ensure_parent_exists(&self.path)?;

		let payload = serde_json::to_vec(tokens).map_err(|e| StoreError::Serialization {
			message: format!("Token snapshot could not be encoded: {e}"),
		})?;
		let staging = self.staging_path();
		let mut file = File::create(&staging).map_err(|e| backend("create", &staging, e))?;

		file.write_all(&payload)
			.and_then(|()| file.sync_all())
			.map_err(|e| backend("write", &staging, e))?;
		drop(file);

		fs::rename(&staging, &self.path).map_err(|e| backend("publish", &self.path, e))
	}

	fn staging_path(&self) -> PathBuf {
		let mut name = self.path.file_name().map(OsString::from).unwrap_or_default();

		name.push(STAGING_SUFFIX);

		self.path.with_file_name(name)
	}
}

fn backend(action: &str, path: &Path, e: io::Error) -> StoreError {
	StoreError::Backend { message: format!("Could not {action} {}: {e}", path.display()) }
}

fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
	match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() =>
			fs::create_dir_all(parent).map_err(|e| backend("create directory", parent, e)),
		_ => Ok(()),
	}
}
