//! 업로드 허용 형식(MIME 허용 목록)

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Png,
    Jpeg,
    Pdf,
}

impl MediaKind {
    /// 선언된 Content-Type으로 형식을 판별합니다. 허용 목록 밖이면 None
    pub fn from_mime(mime: &str) -> Option<Self> {
        // "image/png; charset=binary"처럼 파라미터가 붙어 올 수 있습니다.
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Some(MediaKind::Png),
            "image/jpeg" | "image/jpg" => Some(MediaKind::Jpeg),
            "application/pdf" => Some(MediaKind::Pdf),
            _ => None,
        }
    }

    /// 스테이징 파일의 확장자로 형식을 되찾습니다.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(MediaKind::Png),
            "jpg" | "jpeg" => Some(MediaKind::Jpeg),
            "pdf" => Some(MediaKind::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Png => "png",
            MediaKind::Jpeg => "jpg",
            MediaKind::Pdf => "pdf",
        }
    }

    pub fn is_image(&self) -> bool {
        !matches!(self, MediaKind::Pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlist() {
        assert_eq!(MediaKind::from_mime("image/png"), Some(MediaKind::Png));
        assert_eq!(MediaKind::from_mime("IMAGE/JPEG"), Some(MediaKind::Jpeg));
        assert_eq!(
            MediaKind::from_mime("application/pdf; version=1.7"),
            Some(MediaKind::Pdf)
        );
        assert_eq!(MediaKind::from_mime("image/gif"), None);
        assert_eq!(MediaKind::from_mime("text/plain"), None);
        assert_eq!(MediaKind::from_mime(""), None);
    }

    #[test]
    fn extension_round_trip() {
        for kind in [MediaKind::Png, MediaKind::Jpeg, MediaKind::Pdf] {
            assert_eq!(MediaKind::from_extension(kind.extension()), Some(kind));
        }
        assert_eq!(MediaKind::from_extension("exe"), None);
    }
}
