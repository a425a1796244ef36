use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub engines: EngineConfig,
    #[serde(default)]
    pub links: LinkConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body, uploads included.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    200 * 1024 * 1024
}

/// Transient store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the `uploads`, `midis`, `wavs` and `frames` subdirectories.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from(".")
}

/// Remote URL acquisition configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Whole-request timeout in seconds (default: 30)
    #[serde(default = "default_download_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_download_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_download_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Worker dispatch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatcherConfig {
    /// Maximum conversions running on the blocking pool at once.
    #[serde(default = "default_max_parallel")]
    pub max_parallel_conversions: usize,
    /// Per-conversion limit. Unset means conversions may run indefinitely.
    #[serde(default)]
    pub conversion_timeout_secs: Option<u64>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_parallel_conversions: default_max_parallel(),
            conversion_timeout_secs: None,
        }
    }
}

fn default_max_parallel() -> usize {
    4
}

/// External engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    #[serde(default = "default_basic_pitch_path")]
    pub basic_pitch_path: PathBuf,
    /// Extra arguments placed before the output directory on the basic-pitch command line.
    #[serde(default)]
    pub basic_pitch_args: Vec<String>,
    /// Candidate names for the MIDI file the pitch engine writes, tried in order.
    /// `{stem}` is replaced with the input file stem.
    #[serde(default = "default_midi_output_templates")]
    pub midi_output_templates: Vec<String>,
    /// Extra files the pitch engine may leave next to the MIDI output.
    #[serde(default = "default_midi_side_output_templates")]
    pub midi_side_output_templates: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            basic_pitch_path: default_basic_pitch_path(),
            basic_pitch_args: Vec::new(),
            midi_output_templates: default_midi_output_templates(),
            midi_side_output_templates: default_midi_side_output_templates(),
        }
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_basic_pitch_path() -> PathBuf {
    PathBuf::from("basic-pitch")
}

fn default_midi_output_templates() -> Vec<String> {
    vec![
        "{stem}_basic_pitch.mid".to_string(),
        "{stem}.mid".to_string(),
        "{stem}_transcription.mid".to_string(),
    ]
}

fn default_midi_side_output_templates() -> Vec<String> {
    vec![
        "{stem}_basic_pitch.csv".to_string(),
        "{stem}_basic_pitch.npz".to_string(),
        "{stem}_basic_pitch_sonif.wav".to_string(),
    ]
}

/// Download link configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkConfig {
    /// Path prefix the service is mounted under behind the reverse proxy.
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    /// Hosts served over HTTPS. Any other host gets a plain HTTP link.
    #[serde(default = "default_https_hosts")]
    pub https_hosts: Vec<String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            path_prefix: default_path_prefix(),
            https_hosts: default_https_hosts(),
        }
    }
}

fn default_path_prefix() -> String {
    "/mp3-converter".to_string()
}

fn default_https_hosts() -> Vec<String> {
    vec!["accentoracle.online".to_string()]
}
