use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
pub struct Args {
    /// JSON5 file overriding colors, camera and rotation speed
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Window width in pixels (the window fills the screen when omitted)
    #[arg(long, requires = "height")]
    pub width: Option<u32>,
    /// Window height in pixels
    #[arg(long, requires = "width")]
    pub height: Option<u32>,
}

impl Args {
    pub fn window_size(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_full_screen() {
        let args = Args::try_parse_from(["triangle"]).unwrap();

        assert!(args.config.is_none());
        assert_eq!(args.window_size(), None);
    }

    #[test]
    fn explicit_size_needs_both_dimensions() {
        let args = Args::try_parse_from(["triangle", "--width", "800", "--height", "600"]).unwrap();
        assert_eq!(args.window_size(), Some((800, 600)));

        assert!(Args::try_parse_from(["triangle", "--width", "800"]).is_err());
    }
}
