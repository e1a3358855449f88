use spd_common::Settings;

/// How an external tool is launched: a program plus fixed leading arguments.
///
/// Both acquisition tools run as `python -m <module>` so no PATH executable is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub leading_args: Vec<String>,
}

impl ToolInvocation {
    pub fn python_module(python: &str, module: &str) -> Self {
        Self {
            program: python.to_string(),
            leading_args: vec!["-m".to_string(), module.to_string()],
        }
    }

    pub fn spotdl(settings: &Settings) -> Self {
        Self::python_module(&settings.python, "spotdl")
    }

    pub fn yt_dlp(settings: &Settings) -> Self {
        Self::python_module(&settings.python, "yt_dlp")
    }

    /// Full token sequence: program, leading args, then `args`.
    pub fn command<I, S>(&self, args: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cmd = Vec::with_capacity(1 + self.leading_args.len());
        cmd.push(self.program.clone());
        cmd.extend(self.leading_args.iter().cloned());
        cmd.extend(args.into_iter().map(Into::into));
        cmd
    }
}
