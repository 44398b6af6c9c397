use rendition_core::SourceDescriptor;

pub const PORTRAIT_MP4: &str =
    "https://videos.example.com/video-files/5927708/5927708-hd_1080_1920_30fps.mp4";
pub const PORTRAIT_DASH: &str = "https://videos.example.com/streams/7121413/manifest.dash";
pub const PORTRAIT_HLS: &str = "https://videos.example.com/streams/7121414/playlist.hls";

pub fn source(url: &str) -> SourceDescriptor {
    SourceDescriptor::new(url, 1080.0, 1920.0, 4698.624).expect("valid fixture source")
}
