use std::path::Path;

use serde::{Deserialize, Serialize};

/// Semantic file types recognized by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Document,
    Spreadsheet,
    Presentation,
    Image,
    Audio,
    Video,
    Archive,
    Executable,
    Code,
    Config,
    Temporary,
    Unknown,
}

impl FileType {
    pub fn label(&self) -> &'static str {
        match self {
            FileType::Document => "document",
            FileType::Spreadsheet => "spreadsheet",
            FileType::Presentation => "presentation",
            FileType::Image => "image",
            FileType::Audio => "audio",
            FileType::Video => "video",
            FileType::Archive => "archive",
            FileType::Executable => "executable",
            FileType::Code => "code",
            FileType::Config => "config",
            FileType::Temporary => "temporary",
            FileType::Unknown => "unknown",
        }
    }
}

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "md", "rtf", "odt", "epub"];
const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx", "csv", "ods", "tsv"];
const PRESENTATION_EXTENSIONS: &[&str] = &["ppt", "pptx", "key", "odp"];
const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "svg", "webp", "heic", "tiff", "ico",
];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "aac", "ogg", "m4a", "wma"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "wmv", "flv"];
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "tar", "gz", "bz2", "xz", "7z", "rar", "zst"];
const EXECUTABLE_EXTENSIONS: &[&str] = &["exe", "msi", "app", "dmg", "pkg", "deb", "rpm", "appimage"];
const CODE_EXTENSIONS: &[&str] = &[
    "rs", "py", "java", "c", "cpp", "h", "hpp", "go", "rb", "js", "ts", "php", "swift", "kt",
    "sh", "ipynb", "html", "css",
];
const CONFIG_EXTENSIONS: &[&str] = &[
    "json", "yaml", "yml", "toml", "ini", "conf", "cfg", "xml", "plist", "env",
];
const TEMPORARY_EXTENSIONS: &[&str] = &[
    "tmp", "temp", "cache", "log", "bak", "swp", "part", "partial", "crdownload", "download",
];

/// Filename suffixes that mark a file as temporary regardless of what the
/// extension table would say.
const TEMPORARY_NAME_SUFFIXES: &[&str] = &[".tmp", ".cache", ".log", ".bak", ".swp", "~"];

/// Classify a file name into a `FileType`. Total: every input maps to some
/// type, with `Unknown` as the fallback.
pub fn classify(path: &Path) -> FileType {
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_lowercase();

    // Temporary name patterns win over the extension table
    if TEMPORARY_NAME_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        return FileType::Temporary;
    }

    classify_extension(&extension_of(path))
}

/// Lowercased extension without the dot, empty when absent.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn classify_extension(ext: &str) -> FileType {
    let tables: &[(&[&str], FileType)] = &[
        (TEMPORARY_EXTENSIONS, FileType::Temporary),
        (DOCUMENT_EXTENSIONS, FileType::Document),
        (SPREADSHEET_EXTENSIONS, FileType::Spreadsheet),
        (PRESENTATION_EXTENSIONS, FileType::Presentation),
        (IMAGE_EXTENSIONS, FileType::Image),
        (AUDIO_EXTENSIONS, FileType::Audio),
        (VIDEO_EXTENSIONS, FileType::Video),
        (ARCHIVE_EXTENSIONS, FileType::Archive),
        (EXECUTABLE_EXTENSIONS, FileType::Executable),
        (CODE_EXTENSIONS, FileType::Code),
        (CONFIG_EXTENSIONS, FileType::Config),
    ];

    for (extensions, file_type) in tables {
        if extensions.contains(&ext) {
            return *file_type;
        }
    }

    FileType::Unknown
}
