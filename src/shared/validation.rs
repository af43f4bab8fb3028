use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for URL slugs (categories, listings)
    /// Must be lowercase alphanumeric with single hyphens between words
    /// - Valid: "telefoane-mobile", "iphone-13-pro", "auto"
    /// - Invalid: "-auto", "auto-", "auto--moto", "Auto", "auto_moto"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for validating username fields
    /// Must start with letter or underscore and contain only alphanumeric characters and underscores
    /// - Valid: "john_doe", "user123", "_admin", "JohnDoe"
    /// - Invalid: "123user", "-user", "user-name", "user name"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();

    /// Loose phone pattern: optional leading +, digits, spaces, dashes
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 \-]{5,19}$").unwrap();
}
