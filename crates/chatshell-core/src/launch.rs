pub const MINIMIZED_FLAG: &str = "--min";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    pub start_minimized: bool,
}

impl LaunchOptions {
    /// Unknown arguments are ignored.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            start_minimized: args.into_iter().any(|arg| arg.as_ref() == MINIMIZED_FLAG),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_flag_anywhere() {
        assert!(LaunchOptions::from_args(["/opt/ChatGPT/chatshell", "--min"]).start_minimized);
        assert!(LaunchOptions::from_args(["app", "--foo", "--min", "bar"]).start_minimized);
    }

    #[test]
    fn no_flag_or_lookalikes() {
        assert!(!LaunchOptions::from_args(["app"]).start_minimized);
        assert!(!LaunchOptions::from_args(["app", "--minimized", "-min", "--MIN"]).start_minimized);
        assert!(!LaunchOptions::from_args(Vec::<String>::new()).start_minimized);
    }
}
