/// The closed set of artifact kinds (§4.A) and their filesystem mapping
/// and allowed extensions (§6 "Artifact filesystem layout").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Log,
    Screenshot,
    Video,
    Report,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log => "LOG",
            Self::Screenshot => "SCREENSHOT",
            Self::Video => "VIDEO",
            Self::Report => "REPORT",
        }
    }

    /// Directory name under the artifact root (§6).
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Log => "logs",
            Self::Screenshot => "screenshots",
            Self::Video => "videos",
            Self::Report => "reports",
        }
    }

    /// Allow-listed extensions for this kind; a `put` with any other
    /// extension is rejected.
    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Log => &["log", "txt"],
            Self::Screenshot => &["png", "jpg", "jpeg"],
            Self::Video => &["webm", "mp4"],
            Self::Report => &["json", "html", "xml"],
        }
    }

    pub fn all() -> [ArtifactKind; 4] {
        [Self::Log, Self::Screenshot, Self::Video, Self::Report]
    }
}
