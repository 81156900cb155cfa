//! Structures and serialization/deserialization for WORM³ log files.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::Digest;
use wormcube_core::{ChaosLevel, ScrambleParams, ScrambleType, Timestamp, Victory};

mod recorder;
pub mod verify;

pub use recorder::Recorder;

/// Log file version. This **MUST** be incremented whenever breaking changes are
/// made to the log file format.
pub const LOG_FILE_VERSION: u64 = 1;

/// Non-fatal problem encountered while loading a log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Human-readable description.
    pub msg: String,
}
impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg)
    }
}
impl Warning {
    fn new(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        Self { msg }
    }
}

/// Top-level log file structure.
///
/// A single log file may contain multiple sessions.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Information about the software that created the log file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<Program>,
    /// List of sessions.
    #[serde(default)]
    pub sessions: Vec<LoggedSession>,
}
impl LogFile {
    /// Serializes the log file to a string, with the format version first.
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Versioned<'a> {
            version: u64,
            #[serde(flatten)]
            contents: &'a LogFile,
        }

        let mut s = serde_json::to_string_pretty(&Versioned {
            version: LOG_FILE_VERSION,
            contents: self,
        })?;
        s.push('\n');
        Ok(s)
    }

    /// Deserializes a log file from a string.
    pub fn deserialize(s: &str) -> Result<(Self, Vec<Warning>), serde_json::Error> {
        let mut doc: serde_json::Map<String, serde_json::Value> = serde_json::from_str(s)?;

        // Reject if no version number
        let Some(version_value) = doc.remove("version") else {
            return Ok((
                Self::default(),
                vec![Warning::new("missing log file format version number")],
            ));
        };
        let Some(version_number) = version_value.as_u64() else {
            return Ok((
                Self::default(),
                vec![Warning::new("invalid log file format version number")],
            ));
        };

        let mut warnings = vec![];

        // Check version number
        if version_number > LOG_FILE_VERSION {
            warnings.push(Warning::new(
                "this file was saved using a newer version, and might not load correctly",
            ));
        }

        let log_file = serde_json::from_value(serde_json::Value::Object(doc))?;
        Ok((log_file, warnings))
    }
}

/// Information about the software that created the log file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Name of the program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Version number.
    ///
    /// There should be no leading `v`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// One play session on a single cube.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggedSession {
    /// Number of layers along each axis.
    pub size: u8,
    /// Chaos level at the start of the session.
    #[serde(default)]
    pub chaos_level: ChaosLevel,
    /// Victory conditions reached since the scramble.
    ///
    /// This is always empty if the cube was never scrambled. Each victory
    /// corresponds to a [`LogEvent::Victory`] in `log`.
    #[serde(default)]
    pub victories: Vec<Victory>,
    /// Number of milliseconds that the session was open for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    /// Scramble.
    ///
    /// This is applied to the cube with [`LogEvent::Scramble`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scramble: Option<Scramble>,
    /// List of events, in the order they happened.
    ///
    /// Undone moves are kept, followed by [`LogEvent::Undo`].
    #[serde(default)]
    pub log: Vec<LogEvent>,
}
impl LoggedSession {
    /// Returns a SHA-256 digest of the events of the session, in JSON.
    pub fn digest_v1(&self) -> Result<Vec<u8>, serde_json::Error> {
        let serialized_log = serde_json::to_string(&self.log)?;
        Ok(sha2::Sha256::digest(&serialized_log).as_slice().to_vec())
    }

    /// Returns [`LoggedSession::digest_v1()`] as a hexadecimal string.
    pub fn digest_v1_hex(&self) -> Result<String, serde_json::Error> {
        self.digest_v1().map(hex::encode)
    }
}

/// Scramble info.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Scramble {
    /// Scramble type selected by the user.
    pub ty: ScrambleType,
    /// Optional timestamp at which the scramble was generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Timestamp>,
    /// Optional random seed which, in conjunction with the timestamp,
    /// deterministically generates the twist sequence.
    ///
    /// If this is not present, then the scramble is assumed to have been
    /// generated nondeterministically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    /// Twist sequence to apply to the cube, in move notation.
    pub twists: String,
}
impl Scramble {
    /// Returns the parameters used to deterministically generate the twist
    /// sequence.
    ///
    /// Returns `None` if the scramble was generated nondeterministically.
    pub fn params(&self) -> Option<ScrambleParams> {
        Some(ScrambleParams {
            ty: self.ty,
            time: self.time?,
            seed: self.seed.clone()?,
        })
    }
    /// Constructs a scramble from scramble parameters and a twist sequence.
    pub fn new(params: ScrambleParams, twists: String) -> Self {
        Self {
            ty: params.ty,
            time: Some(params.time),
            seed: Some(params.seed),
            twists,
        }
    }
}

/// Event in a session log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogEvent {
    /// Application of the scramble sequence.
    Scramble {
        /// Event timestamp.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
    },
    /// Sequence of twists and flips separated by spaces.
    Moves(String),
    /// Undo of the most recent move.
    Undo {
        /// Event timestamp.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
    },
    /// Redo of the most recently undone move.
    Redo {
        /// Event timestamp.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
    },
    /// Flips made by one chaos tick. This clears the undo history.
    Chaos {
        /// Event timestamp.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
        /// Flips separated by spaces, in move notation.
        flips: String,
    },
    /// Change of chaos level.
    SetChaosLevel {
        /// Event timestamp.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
        /// New chaos level.
        level: ChaosLevel,
    },
    /// First time that a victory condition held after the scramble.
    ///
    /// This comes immediately after the event that caused it, and may only
    /// appear once per condition.
    Victory {
        /// Event timestamp.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
        /// Number of milliseconds since the start of the session.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<i64>,
        /// Condition that was reached.
        condition: Victory,
    },
    /// Beginning of session.
    StartSession {
        /// Timestamp at which the session started.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
    },
    /// End of session.
    ///
    /// This marks when the log file was saved.
    EndSession {
        /// Timestamp at which the session ended.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<Timestamp>,
    },
}
