//! Command-line argument parsing.

use clap::Parser;

use crate::params::RenderConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "agent-orb")]
#[command(about = "Audio-reactive 3D presence for an AI agent in a live call", long_about = None)]
pub struct Args {
    /// Equirectangular environment map for the sphere reflections
    #[arg(long, value_name = "PATH", default_value = "assets/piz_compressed.exr")]
    pub env_map: String,

    /// Participant display name (window title)
    #[arg(long, value_name = "NAME", default_value = "AI Assistant")]
    pub name: String,

    /// Capture device for the participant (input) voice
    #[arg(long, value_name = "DEVICE")]
    pub input_device: Option<String>,

    /// Capture device for the agent (output) voice; defaults to the input stream
    #[arg(long, value_name = "DEVICE", conflicts_with = "output_wav")]
    pub output_device: Option<String>,

    /// WAV clip played as the agent (output) voice
    #[arg(long, value_name = "PATH")]
    pub output_wav: Option<String>,

    /// Loop the output WAV clip
    #[arg(long, requires = "output_wav")]
    pub loop_wav: bool,

    /// Append an FXAA pass after bloom
    #[arg(long)]
    pub fxaa: bool,

    /// Seed for the backdrop noise
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Initial window width (logical pixels)
    #[arg(long, value_name = "PIXELS", default_value = "1280")]
    pub width: u32,

    /// Initial window height (logical pixels)
    #[arg(long, value_name = "PIXELS", default_value = "720")]
    pub height: u32,
}

impl Args {
    /// Fold the arguments into a render configuration
    pub fn render_config(&self) -> RenderConfig {
        let defaults = RenderConfig::default();
        RenderConfig {
            window_width: self.width.max(1),
            window_height: self.height.max(1),
            fxaa: self.fxaa,
            environment_path: self.env_map.clone(),
            noise_seed: self.seed.unwrap_or(defaults.noise_seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["agent-orb"]);
        assert_eq!(args.name, "AI Assistant");
        assert!(args.output_wav.is_none());

        let config = args.render_config();
        assert_eq!(config.environment_path, "assets/piz_compressed.exr");
        assert_eq!((config.window_width, config.window_height), (1280, 720));
        assert!(!config.fxaa);
        assert_eq!(config.noise_seed, RenderConfig::default().noise_seed);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "agent-orb", "--fxaa", "--seed", "9", "--width", "640", "--height", "0", "--name",
            "Ada",
        ]);
        let config = args.render_config();
        assert!(config.fxaa);
        assert_eq!(config.noise_seed, 9);
        assert_eq!((config.window_width, config.window_height), (640, 1));
        assert_eq!(args.name, "Ada");
    }

    #[test]
    fn test_loop_requires_clip() {
        assert!(Args::try_parse_from(["agent-orb", "--loop-wav"]).is_err());
        assert!(Args::try_parse_from(["agent-orb", "--output-wav", "a.wav", "--loop-wav"]).is_ok());
    }

    #[test]
    fn test_output_sources_conflict() {
        let args = ["agent-orb", "--output-wav", "a.wav", "--output-device", "mic"];
        assert!(Args::try_parse_from(args).is_err());
    }
}
