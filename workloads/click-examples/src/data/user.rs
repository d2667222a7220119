//! Demo accounts for the login example.

/// Session attribute holding the signed-in user name.
pub const USER_ATTRIBUTE: &str = "user";

const ACCOUNTS: &[(&str, &str)] = &[("admin", "admin123"), ("guest", "guest123")];

/// Check a user name and password against the demo accounts.
pub fn authenticate(username: &str, password: &str) -> bool {
    ACCOUNTS
        .iter()
        .any(|(user, pass)| *user == username.trim() && *pass == password)
}
