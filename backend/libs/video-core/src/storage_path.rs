//! Canonical `{bucket}/video/{videoId}/{context}/{resourceId}` naming.

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathContext {
    File,
    Parts,
    Prints,
}

impl PathContext {
    fn as_str(&self) -> &'static str {
        match self {
            PathContext::File => "file",
            PathContext::Parts => "parts",
            PathContext::Prints => "prints",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "file" => Some(PathContext::File),
            "parts" => Some(PathContext::Parts),
            "prints" => Some(PathContext::Prints),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    pub bucket: String,
    pub video_id: Uuid,
    pub context: PathContext,
    pub resource_id: String,
}

pub fn video_file(bucket: &str, video_id: Uuid, filename: &str) -> String {
    format!("{bucket}/video/{video_id}/file/{filename}")
}

pub fn video_part(bucket: &str, video_id: Uuid, part_id: &str) -> String {
    format!("{bucket}/video/{video_id}/parts/{part_id}")
}

pub fn video_print(bucket: &str, video_id: Uuid, print_id: &str) -> String {
    format!("{bucket}/video/{video_id}/prints/{print_id}")
}

/// Parses a full path into its components. Requires at least 5 `/`-separated
/// segments, segment 1 literal `video`, segment 3 a known context.
pub fn parse(full_path: &str) -> Option<ParsedPath> {
    let segments: Vec<&str> = full_path.splitn(5, '/').collect();
    if segments.len() < 5 {
        return None;
    }
    let [bucket, literal_video, video_id_str, context_str, resource_id] =
        [segments[0], segments[1], segments[2], segments[3], segments[4]];

    if literal_video != "video" {
        return None;
    }
    let video_id = Uuid::parse_str(video_id_str).ok()?;
    let context = PathContext::parse(context_str)?;

    Some(ParsedPath {
        bucket: bucket.to_string(),
        video_id,
        context,
        resource_id: resource_id.to_string(),
    })
}

pub fn extract_video_id(full_path: &str) -> Option<Uuid> {
    parse(full_path).map(|p| p.video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_path_round_trips() {
        let id = Uuid::new_v4();
        let path = video_file("bucket", id, "clip.mp4");
        let parsed = parse(&path).unwrap();
        assert_eq!(parsed.video_id, id);
        assert_eq!(parsed.context, PathContext::File);
        assert_eq!(parsed.resource_id, "clip.mp4");
    }

    #[test]
    fn parts_path_round_trips() {
        let id = Uuid::new_v4();
        let path = video_part("bucket", id, "segment_0001.mp4");
        assert_eq!(extract_video_id(&path), Some(id));
    }

    #[test]
    fn rejects_wrong_literal_segment() {
        let id = Uuid::new_v4();
        let path = format!("bucket/notvideo/{id}/file/clip.mp4");
        assert!(parse(&path).is_none());
    }

    #[test]
    fn rejects_unknown_context() {
        let id = Uuid::new_v4();
        let path = format!("bucket/video/{id}/thumbnails/clip.jpg");
        assert!(parse(&path).is_none());
    }

    #[test]
    fn rejects_too_few_segments() {
        assert!(parse("bucket/video/only-three-segments").is_none());
    }

    #[test]
    fn rejects_malformed_video_id() {
        let path = "bucket/video/not-a-uuid/file/clip.mp4";
        assert!(parse(path).is_none());
    }
}
