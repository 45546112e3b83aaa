use clap::ValueEnum;
use tern::Mode;

/// Build mode
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum ModeArg {
    #[value(name = "development")]
    Development,

    #[value(name = "production")]
    Production,

    /// No mode-specific defaults
    #[value(name = "none")]
    None,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Development => Mode::Development,
            ModeArg::Production => Mode::Production,
            ModeArg::None => Mode::None,
        }
    }
}
