/// Error code registry for relishplus
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Credential errors
/// - 3000-3999: Session errors
/// - 4000-4999: Executor errors
/// - 5000-5999: Ordering errors
/// - 9000-9999: Other errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_YAML: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1003;
    pub const CONFIG_INVALID_BUDGET: u16 = 1004;
    pub const CONFIG_INVALID_URL: u16 = 1005;
    pub const CONFIG_IO_ERROR: u16 = 1006;

    // Credential errors (2000-2999)
    pub const CREDENTIALS_GENERIC: u16 = 2000;
    pub const CREDENTIALS_MISSING: u16 = 2001;

    // Session errors (3000-3999)
    pub const SESSION_GENERIC: u16 = 3000;
    pub const SESSION_LOGIN_FAILED: u16 = 3001;
    pub const SESSION_LOGIN_CONTROL_MISSING: u16 = 3002;
    pub const SESSION_CANCELLED: u16 = 3003;

    // Executor errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_TIMEOUT: u16 = 4001;
    pub const EXEC_SPAWN_FAILED: u16 = 4002;
    pub const EXEC_PROTOCOL_ERROR: u16 = 4003;
    pub const EXEC_DRIVER_EXITED: u16 = 4004;
    pub const EXEC_ACTION_FAILED: u16 = 4005;

    // Ordering errors (5000-5999)
    pub const ORDER_GENERIC: u16 = 5000;
    pub const ORDER_EMPTY_CART: u16 = 5001;
    pub const ORDER_CHECKOUT_FAILED: u16 = 5002;
    pub const ORDER_VERIFICATION_FAILED: u16 = 5003;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
    pub const OTHER_INTERNAL_ERROR: u16 = 9001;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        1000 => "Generic configuration error",
        1001 => "Configuration file not found",
        1002 => "Invalid YAML syntax in configuration",
        1003 => "Invalid configuration value",
        1004 => "Budget limits are inconsistent",
        1005 => "Invalid site URL",
        1006 => "Could not read configuration file",

        2000 => "Generic credential error",
        2001 => "Credentials are not available",

        3000 => "Generic session error",
        3001 => "Login was rejected after retry",
        3002 => "Login form control could not be found",
        3003 => "Run was cancelled",

        4000 => "Generic executor error",
        4001 => "Executor action timed out",
        4002 => "Failed to start the browser driver",
        4003 => "Browser driver sent an invalid response",
        4004 => "Browser driver exited unexpectedly",
        4005 => "Browser driver reported an action failure",

        5000 => "Generic ordering error",
        5001 => "Cart was empty at checkout",
        5002 => "Checkout failed after retry",
        5003 => "Order could not be verified after checkout",

        9000 => "Generic error",
        9001 => "Internal error",

        _ => "Unknown error code",
    }
}
