use std::path::PathBuf;

use eclipse_platform::Result;

pub const USAGE: &str = "\
usage: eclipse [options]
  --settings PATH        settings file, JSON or .toml (default: settings.json)
  --width N              framebuffer width in pixels (default: 1920)
  --height N             framebuffer height in pixels (default: 1080)
  --frames N             stop after N frames
  --snapshot-dir DIR     write PNG snapshots into DIR
  --snapshot-every N     write every N-th frame (needs --snapshot-dir)
  --no-shell             do not read commands from stdin
  --headless             never take over the desktop, even where a desktop backend exists";

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub settings_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub frames: Option<u64>,
    pub snapshot_dir: Option<PathBuf>,
    pub snapshot_every: Option<u64>,
    pub stdin_shell: bool,
    pub headless: bool,
    pub help: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from("settings.json"),
            width: 1920,
            height: 1080,
            frames: None,
            snapshot_dir: None,
            snapshot_every: None,
            stdin_shell: true,
            headless: false,
            help: false,
        }
    }
}

impl RunOptions {
    /// Parse arguments, excluding the program name.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        fn value(flag: &str, next: Option<String>) -> Result<String> {
            next.ok_or_else(|| format!("{flag} needs a value").into())
        }

        fn number<T: std::str::FromStr>(flag: &str, next: Option<String>) -> Result<T> {
            let raw = value(flag, next)?;
            raw.parse()
                .map_err(|_| format!("{flag}: `{raw}` is not a valid number").into())
        }

        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--settings" => options.settings_path = value(&arg, args.next())?.into(),
                "--width" => options.width = number(&arg, args.next())?,
                "--height" => options.height = number(&arg, args.next())?,
                "--frames" => options.frames = Some(number(&arg, args.next())?),
                "--snapshot-dir" => options.snapshot_dir = Some(value(&arg, args.next())?.into()),
                "--snapshot-every" => options.snapshot_every = Some(number(&arg, args.next())?),
                "--no-shell" => options.stdin_shell = false,
                "--headless" => options.headless = true,
                "-h" | "--help" => options.help = true,
                other => return Err(format!("unknown argument `{other}`\n{USAGE}").into()),
            }
        }

        if options.width == 0 || options.height == 0 {
            return Err("--width and --height must be positive".into());
        }
        if options.snapshot_every.is_some() && options.snapshot_dir.is_none() {
            return Err("--snapshot-every needs --snapshot-dir".into());
        }
        Ok(options)
    }
}
