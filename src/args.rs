use clap::Parser;

#[derive(Clone, Parser)]
#[clap(
    name = "camshift-rs",
    about = "Interactive CamShift Object Tracker",
    version,
    author
)]
pub struct Args {
    /// Path to optional video file, the default camera is used otherwise
    #[clap(short = 'v', long = "video")]
    pub video: Option<String>,
}

pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_is_default() {
        let args = Args::try_parse_from(["camshift-rs"]).unwrap();
        assert!(args.video.is_none());
    }

    #[test]
    fn video_path() {
        let args = Args::try_parse_from(["camshift-rs", "--video", "test.mov"]).unwrap();
        assert_eq!(args.video.as_deref(), Some("test.mov"));

        let args = Args::try_parse_from(["camshift-rs", "-v", "clip.mp4"]).unwrap();
        assert_eq!(args.video.as_deref(), Some("clip.mp4"));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Args::try_parse_from(["camshift-rs", "--bins", "32"]).is_err());
    }
}
