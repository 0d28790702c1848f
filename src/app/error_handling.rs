//! Error handling utilities

use tracing::error;

/// Handle fatal errors and exit with appropriate status code
///
/// - For `RelishError`: shows the user message always, the developer
///   message with the full source chain in verbose mode
/// - For other errors: shows the error and exits with 1
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    use crate::error::RelishError;

    error!("Fatal error: {}", error);

    let exit_code = if let Some(relish_err) = error.downcast_ref::<RelishError>() {
        eprintln!("{}", relish_err.user_message());

        if verbose >= 1 {
            eprintln!("\nContext Chain:\n{}", relish_err.developer_message());
        }

        relish_err.exit_code()
    } else {
        eprintln!("Error: {error}");

        if verbose >= 1 {
            eprintln!("\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                eprintln!("  {}: {}", i, cause);
            }
        }

        1
    };

    std::process::exit(exit_code)
}
