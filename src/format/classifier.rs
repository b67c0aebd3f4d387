use crate::format::ArchiveCommand;
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

/// Canonical archive/compression families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveFormat {
    TarBzip2,
    TarGzip,
    TarXz,
    TarZstd,
    Tar,
    Rar,
    Lha,
    SevenZip,
    Zip,
    Rpm,
    Deb,
    Bzip2,
    Gzip,
    Xz,
    Zstd,
}

impl ArchiveFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveFormat::TarBzip2 => "tar+bzip2",
            ArchiveFormat::TarGzip => "tar+gzip",
            ArchiveFormat::TarXz => "tar+xz",
            ArchiveFormat::TarZstd => "tar+zstd",
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::Rar => "rar",
            ArchiveFormat::Lha => "lha",
            ArchiveFormat::SevenZip => "7z",
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Rpm => "rpm",
            ArchiveFormat::Deb => "deb",
            ArchiveFormat::Bzip2 => "bzip2",
            ArchiveFormat::Gzip => "gzip",
            ArchiveFormat::Xz => "xz",
            ArchiveFormat::Zstd => "zstd",
        }
    }

    pub fn command(&self) -> ArchiveCommand {
        match self {
            ArchiveFormat::TarBzip2 => ArchiveCommand::stdin("tar -xvjf -"),
            ArchiveFormat::TarGzip => ArchiveCommand::stdin("tar -xvzf -"),
            ArchiveFormat::TarXz => ArchiveCommand::stdin("tar -xvJf -"),
            ArchiveFormat::TarZstd => ArchiveCommand::stdin("tar --zstd -xvf -"),
            ArchiveFormat::Tar => ArchiveCommand::stdin("tar -xvf -"),
            ArchiveFormat::Rar => ArchiveCommand::path_arg("unrar x"),
            ArchiveFormat::Lha => ArchiveCommand::path_arg("lha x"),
            ArchiveFormat::SevenZip => ArchiveCommand::path_arg("7z x"),
            ArchiveFormat::Zip => ArchiveCommand::path_arg("unzip"),
            ArchiveFormat::Rpm => ArchiveCommand::piped("rpm2cpio -", "cpio -idvm"),
            ArchiveFormat::Deb => ArchiveCommand::path_arg("ar -x"),
            ArchiveFormat::Bzip2 => ArchiveCommand::stream("bzip2 -d -c -"),
            ArchiveFormat::Gzip => ArchiveCommand::stream("gzip -d -c -"),
            ArchiveFormat::Xz => ArchiveCommand::stream("xz -d -c -"),
            ArchiveFormat::Zstd => ArchiveCommand::stream("zstd -d -c -"),
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered pattern table. The first matching pattern wins, so compound
/// suffixes must stay ahead of the bare compression suffixes they end with.
pub const FORMAT_TABLE: &[(&str, ArchiveFormat)] = &[
    ("*.tar.bz2", ArchiveFormat::TarBzip2),
    ("*.tbz2", ArchiveFormat::TarBzip2),
    ("*.tbz", ArchiveFormat::TarBzip2),
    ("*.tar.gz", ArchiveFormat::TarGzip),
    ("*.tgz", ArchiveFormat::TarGzip),
    ("*.tar.xz", ArchiveFormat::TarXz),
    ("*.txz", ArchiveFormat::TarXz),
    ("*.tar.lzma", ArchiveFormat::TarXz),
    ("*.tar.zst", ArchiveFormat::TarZstd),
    ("*.tar", ArchiveFormat::Tar),
    ("*.rar", ArchiveFormat::Rar),
    ("*.lzh", ArchiveFormat::Lha),
    ("*.7z", ArchiveFormat::SevenZip),
    ("*.zip", ArchiveFormat::Zip),
    ("*.jar", ArchiveFormat::Zip),
    ("*.rpm", ArchiveFormat::Rpm),
    ("*.deb", ArchiveFormat::Deb),
    ("*.bz2", ArchiveFormat::Bzip2),
    ("*.gz", ArchiveFormat::Gzip),
    ("*.Z", ArchiveFormat::Gzip),
    ("*.xz", ArchiveFormat::Xz),
    ("*.lzma", ArchiveFormat::Xz),
    ("*.zst", ArchiveFormat::Zstd),
];

/// Suffixes removed when deriving the extraction target name.
pub const KNOWN_SUFFIXES: &[&str] = &[
    ".tbz2", ".tbz", ".tgz", ".txz", ".tar", ".rar", ".lzh", ".7z", ".zip", ".jar", ".rpm",
    ".deb", ".bz2", ".gz", ".Z", ".xz", ".lzma", ".zst",
];

/// Matches `*.ext` style patterns against a bare file name. Matching is
/// case sensitive (`.Z` is not `.z`) and the `*` must cover at least one
/// character.
fn pattern_matches(pattern: &str, filename: &str) -> bool {
    match pattern.strip_prefix('*') {
        Some(suffix) => filename.len() > suffix.len() && filename.ends_with(suffix),
        None => pattern == filename,
    }
}

pub fn classify(filename: &str) -> Option<ArchiveFormat> {
    FORMAT_TABLE
        .iter()
        .find(|(pattern, _)| pattern_matches(pattern, filename))
        .map(|(_, format)| *format)
}

/// Classifies by the final path component only; directories never influence the match.
pub fn classify_path(path: &Path) -> Option<ArchiveFormat> {
    path.file_name()
        .and_then(OsStr::to_str)
        .and_then(classify)
}

/// Name left on disk once an archive's suffixes are removed.
///
/// Suffixes are stripped from the outside in and stripping stops at the
/// first one that is not in [`KNOWN_SUFFIXES`]. Only the file name is
/// returned; callers join it onto the extraction directory.
pub fn strip_known_suffixes(path: &Path) -> PathBuf {
    let Some(name) = path.file_name() else {
        return path.to_path_buf();
    };
    let Some(mut target) = name.to_str() else {
        return PathBuf::from(name);
    };

    while let Some(dot) = target.rfind('.') {
        // A leading dot names a hidden file, not a suffix.
        if dot == 0 || !KNOWN_SUFFIXES.contains(&&target[dot..]) {
            break;
        }
        target = &target[..dot];
    }

    PathBuf::from(target)
}
