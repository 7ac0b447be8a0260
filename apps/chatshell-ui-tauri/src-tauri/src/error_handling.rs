use std::error::Error;

/// Joins an error and all of its sources, one per line.
pub fn format_error_chain<E: Error + ?Sized>(error: &E) -> String {
    let mut chain = vec![error.to_string()];
    let mut source = error.source();

    while let Some(err) = source {
        chain.push(format!("  caused by: {}", err));
        source = err.source();
    }

    chain.join("\n")
}

pub fn log_error<E: Error + ?Sized>(context: &str, error: &E) {
    let error_chain = format_error_chain(error);
    tracing::error!(
        context = context,
        error = %error_chain,
        "error occurred"
    );
}

/// For command return values; the settings form shows the string as-is.
pub fn result_to_string<T, E: Error>(result: Result<T, E>) -> Result<T, String> {
    result.map_err(|e| format_error_chain(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "failed to save proxy config")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn chain_includes_sources() {
        let err = Outer(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"));
        assert_eq!(
            format_error_chain(&err),
            "failed to save proxy config\n  caused by: read-only"
        );
    }

    #[test]
    fn result_to_string_keeps_ok() {
        let ok: Result<u8, std::io::Error> = Ok(7);
        assert_eq!(result_to_string(ok), Ok(7));
    }
}
